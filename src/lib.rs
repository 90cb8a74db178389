//! Spinneret: a callback-driven web crawling engine
//!
//! This crate implements a recursive crawl execution engine: a [`Spider`]
//! declares one or more entry points, each fetch produces a [`Response`]
//! that is handed to the request's handler, and every follow-up [`Request`]
//! the handler yields is resolved recursively. The engine flattens the
//! values produced by the whole handler chain into a single ordered list.

pub mod engine;
pub mod flow;
pub mod http;
pub mod logging;
pub mod spider;

use thiserror::Error;

/// Main error type for a crawl run
#[derive(Debug, Error)]
pub enum CrawlError {
    /// An entry point URI could not be parsed as an absolute URL.
    ///
    /// This is a programmer error in the spider definition and is raised
    /// before any request is sent.
    #[error("invalid entry point `{uri}`: {source}")]
    InvalidEntryPoint {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    /// The transport failed while fetching a request.
    #[error("transport error: {0}")]
    Transport(#[from] http::TransportError),

    /// A handler returned an error while processing a response.
    #[error("handler error: {0}")]
    Handler(#[source] anyhow::Error),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use engine::Engine;
pub use flow::{Handler, HandlerFlow, Step};
pub use http::{
    ClientConfig, Request, ReqwestTransport, Response, Transport, TransportError,
    TransportResponse, WireRequest,
};
pub use spider::{Entry, Spider, StartPoint};
