//! Crawl driver and start-point normalization
//!
//! The engine wires the spider, the start-point normalizer and the
//! recursive resolver together for one run: normalize the declared entry
//! point(s) into fully-formed requests, resolve each depth-first, and
//! flatten everything the handler chain produced into one ordered list.

mod resolver;

pub use resolver::Resolved;

use std::sync::Arc;

use url::Url;

use crate::flow::{Handler, HandlerFlow, Step};
use crate::http::{ClientConfig, Request, ReqwestTransport, Transport};
use crate::logging;
use crate::spider::{Entry, Spider, StartPoint};
use crate::{CrawlError, Result};

/// Executes one crawl run for a spider.
///
/// The transport is the only shared object across the run; it is injected
/// at construction and never mutated. Execution is strictly sequential and
/// depth-first: each fetch completes and its handler runs to completion,
/// including draining any sequence it yields, before control returns.
pub struct Engine<S: Spider> {
    spider: S,
    transport: Arc<dyn Transport>,
}

impl<S: Spider> Engine<S> {
    /// Creates an engine with the default transport
    /// ([`ReqwestTransport`] built from [`ClientConfig::default`]).
    pub fn new(spider: S) -> Result<Self> {
        let transport = ReqwestTransport::new(ClientConfig::default())?;
        Ok(Self::with_transport(spider, Arc::new(transport)))
    }

    /// Creates an engine with an injected transport.
    pub fn with_transport(spider: S, transport: Arc<dyn Transport>) -> Self {
        Self { spider, transport }
    }

    /// The spider driven by this engine.
    pub fn spider(&self) -> &S {
        &self.spider
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Runs the crawl to completion.
    ///
    /// Normalizes every declared entry point (failing with
    /// [`CrawlError::InvalidEntryPoint`] before any fetch if one is
    /// malformed), resolves them in declaration order, and returns the
    /// flattened outputs. Any transport or handler failure anywhere in the
    /// traversal aborts the run with no partial output.
    pub async fn start(&self) -> Result<Vec<S::Output>> {
        logging::init_default();

        self.spider.before_start();

        let entries = self.spider.start_point().into_entries();
        tracing::debug!(entries = entries.len(), "starting crawl");

        let mut requests = Vec::with_capacity(entries.len());
        for entry in entries {
            requests.push(normalize_entry(entry)?);
        }

        // A single entry resolves directly; multiple entries behave as a
        // synthetic sequence yielding each request in declaration order.
        let flow = if requests.len() == 1 {
            HandlerFlow::Follow(requests.remove(0))
        } else {
            HandlerFlow::seq(requests.into_iter().map(Step::Follow))
        };

        let resolved = self.interpret(flow).await?;
        Ok(resolved.into_vec())
    }
}

/// Normalizes one declared entry point into a fully-formed request.
///
/// A request whose handler is the built-in no-op (which is also what a
/// request built without a handler carries) gets the spider's default
/// handler; any other handler is left untouched, so normalizing an
/// already-normalized request changes nothing. A bare URI becomes a GET
/// request with the default handler.
fn normalize_entry<S: Spider>(entry: Entry<S>) -> Result<Request<S>> {
    match entry {
        Entry::Request(request) => {
            if request.handler().is_noop() {
                Ok(request.with_callback(Handler::Parse))
            } else {
                Ok(request)
            }
        }
        Entry::Uri(uri) => match Url::parse(&uri) {
            Ok(url) => Ok(Request::get(url).with_callback(Handler::Parse)),
            Err(source) => Err(CrawlError::InvalidEntryPoint { uri, source }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Response;
    use reqwest::Method;

    struct TestSpider;

    impl Spider for TestSpider {
        type Output = String;
        type Meta = ();

        fn start_point(&self) -> StartPoint<Self> {
            "https://example.test/".into()
        }

        fn parse(&self, _response: Response<()>) -> anyhow::Result<HandlerFlow<Self>> {
            Ok(HandlerFlow::Done)
        }
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_uri_entry_becomes_get_with_default_handler() {
        let request =
            normalize_entry::<TestSpider>(Entry::Uri("https://example.test/a".into())).unwrap();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.url().as_str(), "https://example.test/a");
        assert!(matches!(request.handler(), Handler::Parse));
    }

    #[test]
    fn test_noop_handler_replaced_with_default() {
        let entry = Entry::Request(Request::<TestSpider>::get(url("https://example.test/a")));
        let request = normalize_entry(entry).unwrap();
        assert!(matches!(request.handler(), Handler::Parse));
    }

    #[test]
    fn test_custom_handler_left_untouched() {
        let entry = Entry::Request(
            Request::<TestSpider>::get(url("https://example.test/a"))
                .with_handler(|_, _| Ok(HandlerFlow::Done)),
        );
        let request = normalize_entry(entry).unwrap();
        assert!(matches!(request.handler(), Handler::Func(_)));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let entry = Entry::Request(
            Request::<TestSpider>::get(url("https://example.test/a"))
                .with_callback(Handler::Parse),
        );
        let request = normalize_entry(entry).unwrap();
        let request = normalize_entry(Entry::Request(request)).unwrap();
        assert!(matches!(request.handler(), Handler::Parse));
    }

    #[test]
    fn test_invalid_entry_point() {
        let result = normalize_entry::<TestSpider>(Entry::Uri("not a url".into()));
        assert!(matches!(
            result,
            Err(CrawlError::InvalidEntryPoint { .. })
        ));
    }
}
