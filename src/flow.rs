//! Handler representation and handler invocation results
//!
//! The source of truth for what a handler call may yield. Handlers return
//! an explicit [`HandlerFlow`] variant instead of the engine inspecting the
//! runtime shape of an arbitrary value, so a bare empty list or a `None`
//! never needs to be disambiguated by structure.

use std::fmt;
use std::sync::Arc;

use crate::http::{Request, Response};
use crate::spider::Spider;

/// The handler attached to a request descriptor.
pub enum Handler<S: Spider> {
    /// Built-in no-op. Requests built without an explicit handler carry
    /// this; the start-point normalizer replaces it with [`Handler::Parse`].
    /// Invoked mid-traversal it yields [`HandlerFlow::Done`].
    Noop,

    /// Dispatch to the spider's [`Spider::parse`] method.
    Parse,

    /// A user-supplied closure.
    #[allow(clippy::type_complexity)]
    Func(Arc<dyn Fn(&S, Response<S::Meta>) -> anyhow::Result<HandlerFlow<S>> + Send + Sync>),
}

impl<S: Spider> Handler<S> {
    /// Whether this is the built-in no-op handler.
    pub fn is_noop(&self) -> bool {
        matches!(self, Handler::Noop)
    }

    /// Wraps a closure as a custom handler.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&S, Response<S::Meta>) -> anyhow::Result<HandlerFlow<S>> + Send + Sync + 'static,
    {
        Handler::Func(Arc::new(f))
    }
}

impl<S: Spider> Clone for Handler<S> {
    fn clone(&self) -> Self {
        match self {
            Handler::Noop => Handler::Noop,
            Handler::Parse => Handler::Parse,
            Handler::Func(f) => Handler::Func(Arc::clone(f)),
        }
    }
}

impl<S: Spider> fmt::Debug for Handler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Noop => f.write_str("Handler::Noop"),
            Handler::Parse => f.write_str("Handler::Parse"),
            Handler::Func(_) => f.write_str("Handler::Func(..)"),
        }
    }
}

/// What one handler invocation yields.
pub enum HandlerFlow<S: Spider> {
    /// Nothing; contributes no element to the output.
    Done,

    /// One terminal value, included in the output as-is.
    Item(S::Output),

    /// One follow-up request. The engine fetches and resolves it, and the
    /// invocation's value becomes that resolution's value, unwrapped.
    Follow(Request<S>),

    /// An ordered, lazily-produced sequence of terminal values and
    /// follow-up requests. Must terminate; the engine drains it fully.
    Seq(Box<dyn Iterator<Item = Step<S>> + Send>),
}

impl<S: Spider> HandlerFlow<S> {
    /// Builds a sequence flow from anything iterable over [`Step`]s.
    pub fn seq<I>(steps: I) -> Self
    where
        I: IntoIterator<Item = Step<S>>,
        I::IntoIter: Send + 'static,
    {
        HandlerFlow::Seq(Box::new(steps.into_iter()))
    }
}

impl<S: Spider> From<Request<S>> for HandlerFlow<S> {
    fn from(request: Request<S>) -> Self {
        HandlerFlow::Follow(request)
    }
}

/// One element of a [`HandlerFlow::Seq`].
pub enum Step<S: Spider> {
    /// A terminal value, appended to the output directly.
    Item(S::Output),

    /// A request to fetch and resolve; its resolution merges into the
    /// output at this position.
    Follow(Request<S>),
}

impl<S: Spider> From<Request<S>> for Step<S> {
    fn from(request: Request<S>) -> Self {
        Step::Follow(request)
    }
}
