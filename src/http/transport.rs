//! HTTP transport capability
//!
//! The engine never talks to the network directly; it sends wire-level
//! requests through a [`Transport`] and receives wire-level responses back.
//! The default implementation wraps a `reqwest` client and follows
//! redirects manually so it can report the ordered redirect chain, which
//! the response wrapper needs to compute the effective URI.

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::header::{
    HeaderMap, AUTHORIZATION, COOKIE, LOCATION, PROXY_AUTHORIZATION, WWW_AUTHENTICATE,
};
use reqwest::redirect::Policy;
use reqwest::{Client, Method, StatusCode, Version};
use thiserror::Error;
use url::Url;

/// Wire-level request parts, stripped of handler and metadata.
#[derive(Debug, Clone)]
pub struct WireRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// Wire-level response, including the redirect chain that led to it.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: String,
    /// Each redirect target visited, in order. Empty without redirects;
    /// the last element is the URI that served the final response.
    pub redirects: Vec<Url>,
}

/// Transport-layer errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("too many redirects from {url}")]
    RedirectLimit { url: String },

    #[error("redirect loop detected at {url}")]
    RedirectLoop { url: String },

    #[error("invalid redirect location `{location}` at {url}: {source}")]
    InvalidLocation {
        url: String,
        location: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP status {status} for {url}")]
    Status { status: StatusCode, url: String },
}

/// The injected HTTP transport capability.
///
/// Must be safe to invoke repeatedly; the engine shares one transport
/// across the whole run and never mutates it.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: WireRequest,
    ) -> BoxFuture<'_, Result<TransportResponse, TransportError>>;
}

/// Configuration for the default transport.
///
/// [`Engine::new`](crate::Engine::new) uses `ClientConfig::default()`:
/// a crate-identifying user agent, 30s request / 10s connect timeouts, at
/// most 10 redirect hops, a cookie jar, and non-2xx statuses treated as
/// successful fetches.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Total per-request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Maximum redirect hops before the fetch fails.
    pub max_redirects: usize,
    /// Whether to keep a cookie jar across requests.
    pub cookies: bool,
    /// When set, non-2xx final statuses become [`TransportError::Status`]
    /// instead of successful responses.
    pub error_for_status: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("spinneret/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_redirects: 10,
            cookies: true,
            error_for_status: false,
        }
    }
}

/// Default transport backed by a `reqwest` client.
pub struct ReqwestTransport {
    client: Client,
    config: ClientConfig,
}

impl ReqwestTransport {
    /// Builds the transport from an explicit configuration.
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(Policy::none()) // followed manually to record the chain
            .gzip(true)
            .brotli(true);

        if config.cookies {
            builder = builder.cookie_store(true);
        }

        let client = builder.build().map_err(TransportError::Client)?;
        Ok(Self { client, config })
    }

    async fn send_inner(
        &self,
        request: WireRequest,
    ) -> Result<TransportResponse, TransportError> {
        let WireRequest {
            mut method,
            url,
            mut headers,
            mut body,
        } = request;

        let origin = url.clone();
        let mut current = url;
        let mut redirects: Vec<Url> = Vec::new();

        loop {
            tracing::debug!(%method, url = %current, "sending request");

            let mut builder = self
                .client
                .request(method.clone(), current.clone())
                .headers(headers.clone());
            if let Some(bytes) = &body {
                builder = builder.body(bytes.clone());
            }

            let response = builder.send().await.map_err(|source| TransportError::Http {
                url: current.to_string(),
                source,
            })?;

            let status = response.status();
            if status.is_redirection() {
                // A redirect without a Location header is served as-is.
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);

                if let Some(location) = location {
                    if redirects.len() >= self.config.max_redirects {
                        return Err(TransportError::RedirectLimit {
                            url: origin.to_string(),
                        });
                    }

                    let next =
                        current
                            .join(&location)
                            .map_err(|source| TransportError::InvalidLocation {
                                url: current.to_string(),
                                location: location.clone(),
                                source,
                            })?;

                    if next == origin || redirects.contains(&next) {
                        return Err(TransportError::RedirectLoop {
                            url: next.to_string(),
                        });
                    }

                    tracing::debug!(from = %current, to = %next, status = %status, "following redirect");

                    // Credentials set for the original host must not travel
                    // to whatever host the redirect names.
                    if !same_origin(&current, &next) {
                        strip_sensitive_headers(&mut headers);
                    }

                    // 303 always downgrades to GET; so do 301/302 for
                    // non-GET methods. 307/308 preserve method and body.
                    let preserve = status == StatusCode::TEMPORARY_REDIRECT
                        || status == StatusCode::PERMANENT_REDIRECT;
                    if status == StatusCode::SEE_OTHER || (!preserve && method != Method::GET) {
                        method = Method::GET;
                        body = None;
                    }

                    redirects.push(next.clone());
                    current = next;
                    continue;
                }
            }

            if self.config.error_for_status
                && (status.is_client_error() || status.is_server_error())
            {
                return Err(TransportError::Status {
                    status,
                    url: current.to_string(),
                });
            }

            let version = response.version();
            let response_headers = response.headers().clone();
            let text = response.text().await.map_err(|source| TransportError::Http {
                url: current.to_string(),
                source,
            })?;

            return Ok(TransportResponse {
                status,
                version,
                headers: response_headers,
                body: text,
                redirects,
            });
        }
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: WireRequest,
    ) -> BoxFuture<'_, Result<TransportResponse, TransportError>> {
        Box::pin(self.send_inner(request))
    }
}

/// Whether two URLs share scheme, host and (effective) port.
fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}

/// Removes credential-bearing headers before a cross-origin hop.
fn strip_sensitive_headers(headers: &mut HeaderMap) {
    for name in [AUTHORIZATION, COOKIE, PROXY_AUTHORIZATION, WWW_AUTHENTICATE] {
        headers.remove(&name);
    }
}
