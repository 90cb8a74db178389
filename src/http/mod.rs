//! HTTP data model and transport capability
//!
//! This module contains the wire-facing half of the engine:
//! - Request descriptors carrying a handler and opaque metadata
//! - Response wrappers with redirect-aware URI accessors
//! - The injected transport capability and its default reqwest-backed
//!   implementation

mod request;
mod response;
mod transport;

pub use request::Request;
pub use response::Response;
pub use transport::{
    ClientConfig, ReqwestTransport, Transport, TransportError, TransportResponse, WireRequest,
};
