//! Request descriptors
//!
//! A request descriptor names one HTTP call plus the handler that will
//! process its response and an opaque metadata payload carried through the
//! round trip. Descriptors are immutable: the `with_*` builders consume the
//! descriptor and return the updated value, so a descriptor observed by the
//! engine never changes underneath it.

use std::fmt;

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use reqwest::Method;
use url::Url;

use crate::flow::{Handler, HandlerFlow};
use crate::http::transport::WireRequest;
use crate::http::Response;
use crate::spider::Spider;

/// An immutable descriptor for one HTTP call.
///
/// Constructed without an explicit handler, a request carries the built-in
/// no-op handler; the start-point normalizer swaps that for the spider's
/// default [`parse`](Spider::parse) when such a request is used as an entry
/// point.
///
/// Each descriptor is consumed exactly once by the engine: fetched, handed
/// to its handler, then discarded.
pub struct Request<S: Spider> {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    handler: Handler<S>,
    meta: Option<S::Meta>,
}

impl<S: Spider> Request<S> {
    /// Creates a descriptor with the given method and target URL.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            handler: Handler::Noop,
            meta: None,
        }
    }

    /// Creates a GET descriptor.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Creates a POST descriptor.
    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    /// Returns a descriptor with the given handler closure attached.
    ///
    /// The closure receives the spider and the response wrapper, and
    /// returns the [`HandlerFlow`] describing what the crawl does next.
    pub fn with_handler<F>(self, f: F) -> Self
    where
        F: Fn(&S, Response<S::Meta>) -> anyhow::Result<HandlerFlow<S>> + Send + Sync + 'static,
    {
        self.with_callback(Handler::func(f))
    }

    /// Returns a descriptor with the given handler representation attached.
    pub fn with_callback(mut self, handler: Handler<S>) -> Self {
        self.handler = handler;
        self
    }

    /// Returns a descriptor carrying the given metadata payload.
    ///
    /// The engine copies the payload onto the response wrapper so the
    /// handler can correlate response to intent without bookkeeping.
    pub fn with_meta(mut self, meta: S::Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Returns a descriptor with one header added.
    pub fn with_header<K>(mut self, name: K, value: HeaderValue) -> Self
    where
        K: IntoHeaderName,
    {
        self.headers.insert(name, value);
        self
    }

    /// Returns a descriptor with its header map replaced.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Returns a descriptor with the given body payload.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Target URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Request body, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// The handler that will process this request's response.
    pub fn handler(&self) -> &Handler<S> {
        &self.handler
    }

    /// The metadata payload, if any.
    pub fn meta(&self) -> Option<&S::Meta> {
        self.meta.as_ref()
    }

    /// Splits the descriptor into its wire-level parts, its handler and its
    /// metadata. Used by the engine when the descriptor is consumed.
    pub(crate) fn into_parts(self) -> (WireRequest, Handler<S>, Option<S::Meta>) {
        (
            WireRequest {
                method: self.method,
                url: self.url,
                headers: self.headers,
                body: self.body,
            },
            self.handler,
            self.meta,
        )
    }
}

impl<S: Spider> Clone for Request<S> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
            handler: self.handler.clone(),
            meta: self.meta.clone(),
        }
    }
}

impl<S: Spider> fmt::Debug for Request<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .field("handler", &self.handler)
            .finish_non_exhaustive()
    }
}
