//! Recursive resolution core
//!
//! Two mutually recursive operations: `resolve` fetches a request and
//! invokes its handler on the response; `interpret` turns the handler's
//! [`HandlerFlow`] into a [`Resolved`] value, recursing into every
//! follow-up request it names. The traversal is depth-first and strictly
//! sequential; recursion goes through a boxed future.

use futures::future::BoxFuture;

use crate::engine::Engine;
use crate::flow::{Handler, HandlerFlow, Step};
use crate::http::{Request, Response};
use crate::spider::Spider;
use crate::{CrawlError, Result};

/// Outcome of resolving one request descriptor.
///
/// An explicit sum type, so the merge step never has to infer "splice or
/// append" from the incidental shape of a value: `Many` is always spliced
/// into the parent sequence one level deep, `One` is appended as a single
/// element, and `Nothing` contributes nothing. An empty `Many` therefore
/// also contributes nothing.
pub enum Resolved<T> {
    /// The branch produced no value.
    Nothing,
    /// The branch produced a single terminal value.
    One(T),
    /// The branch bottomed out in a sequence and produced these values.
    Many(Vec<T>),
}

impl<T> Resolved<T> {
    /// Flattens into a plain list, for the top of the run.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Resolved::Nothing => Vec::new(),
            Resolved::One(value) => vec![value],
            Resolved::Many(values) => values,
        }
    }
}

impl<S: Spider> Engine<S> {
    /// Fetches a request and resolves its handler's flow to completion.
    ///
    /// The request's metadata and URI are propagated onto the response so
    /// the handler can correlate the two. Each descriptor passes through
    /// here exactly once; nothing is re-fetched or re-invoked.
    pub(crate) fn resolve(
        &self,
        request: Request<S>,
    ) -> BoxFuture<'_, Result<Resolved<S::Output>>> {
        Box::pin(async move {
            let (wire, handler, meta) = request.into_parts();
            let uri = wire.url.clone();

            tracing::debug!(url = %uri, "resolving request");
            let transport_response = self.transport().send(wire).await?;
            let response = Response::from_transport(transport_response, uri, meta);

            let flow = self.invoke(&handler, response)?;
            self.interpret(flow).await
        })
    }

    /// Calls a handler on a response, surfacing its failure as
    /// [`CrawlError::Handler`].
    fn invoke(&self, handler: &Handler<S>, response: Response<S::Meta>) -> Result<HandlerFlow<S>> {
        let flow = match handler {
            Handler::Noop => Ok(HandlerFlow::Done),
            Handler::Parse => self.spider().parse(response),
            Handler::Func(f) => f(self.spider(), response),
        };
        flow.map_err(CrawlError::Handler)
    }

    /// Interprets one handler invocation result.
    ///
    /// A `Follow` is resolved in place: the nested resolution's value *is*
    /// this invocation's value, with no wrapping. A `Seq` is drained in
    /// order into a single flat list: sub-resolutions that produced a list
    /// are spliced (one level only), single values are appended, and
    /// absent values are suppressed.
    pub(crate) async fn interpret(&self, flow: HandlerFlow<S>) -> Result<Resolved<S::Output>> {
        match flow {
            HandlerFlow::Done => Ok(Resolved::Nothing),
            HandlerFlow::Item(value) => Ok(Resolved::One(value)),
            HandlerFlow::Follow(request) => self.resolve(request).await,
            HandlerFlow::Seq(steps) => {
                let mut ret = Vec::new();
                for step in steps {
                    match step {
                        Step::Item(value) => ret.push(value),
                        Step::Follow(request) => match self.resolve(request).await? {
                            Resolved::Many(values) => ret.extend(values),
                            Resolved::One(value) => ret.push(value),
                            Resolved::Nothing => {}
                        },
                    }
                }
                Ok(Resolved::Many(ret))
            }
        }
    }
}
