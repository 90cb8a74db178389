//! Response wrappers
//!
//! A response wrapper pairs the fetched HTTP response with the originating
//! request's URI and metadata, and adds the derived accessors handlers work
//! with: the effective URI after redirects, the declared charset, relative
//! link resolution, and parsed-body views.

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{StatusCode, Version};
use scraper::Html;
use serde::de::DeserializeOwned;
use url::Url;

use crate::http::transport::TransportResponse;

/// The result of fetching one request descriptor.
///
/// Exactly one wrapper exists per executed request; it is handed to the
/// request's handler and not retained afterward. `M` is the spider's opaque
/// metadata type.
pub struct Response<M> {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: String,
    uri: Url,
    redirects: Vec<Url>,
    meta: Option<M>,
}

impl<M> Response<M> {
    /// Wraps a transport response, attaching the originating request's URI
    /// and metadata.
    pub(crate) fn from_transport(response: TransportResponse, uri: Url, meta: Option<M>) -> Self {
        Self {
            status: response.status,
            version: response.version,
            headers: response.headers,
            body: response.body,
            uri,
            redirects: response.redirects,
            meta,
        }
    }

    /// HTTP status of the final response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// HTTP protocol version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Response body as text.
    pub fn text(&self) -> &str {
        &self.body
    }

    /// URI of the originating request, before any redirect.
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Ordered redirect chain reported by the transport. Empty when the
    /// request was served directly.
    pub fn redirects(&self) -> &[Url] {
        &self.redirects
    }

    /// The URI that actually served this response: the final URI of the
    /// redirect chain, or the request URI when there was no redirect.
    pub fn effective_uri(&self) -> &Url {
        self.redirects.last().unwrap_or(&self.uri)
    }

    /// Metadata carried over from the originating request.
    pub fn meta(&self) -> Option<&M> {
        self.meta.as_ref()
    }

    /// Resolves a possibly-relative reference against the effective URI,
    /// so links found in a page resolve relative to the page actually
    /// served (post-redirect).
    pub fn resolve(&self, href: &str) -> Result<Url, url::ParseError> {
        self.effective_uri().join(href)
    }

    /// The charset declared in the `Content-Type` header(s), if any.
    ///
    /// When several charset tokens appear, across parameters or repeated
    /// headers, the last one wins.
    pub fn charset(&self) -> Option<String> {
        let mut found = None;
        for value in self.headers.get_all(CONTENT_TYPE) {
            if let Ok(value) = value.to_str() {
                if let Some(charset) = charset_in(value) {
                    found = Some(charset.to_string());
                }
            }
        }
        found
    }

    /// Parses the body as an HTML document.
    pub fn html(&self) -> Html {
        Html::parse_document(&self.body)
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Extracts the last `charset=<token>` value from a header value.
///
/// Token characters are alphanumerics plus `:`, `_`, `.` and `-`; the
/// `charset` keyword and the surrounding whitespace are matched
/// case-insensitively.
fn charset_in(value: &str) -> Option<&str> {
    const NEEDLE: &str = "charset";

    let lower = value.to_ascii_lowercase();
    let bytes = value.as_bytes();
    let mut last = None;
    let mut from = 0;

    while let Some(found) = lower[from..].find(NEEDLE) {
        let mut i = from + found + NEEDLE.len();
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            let start = i;
            while i < bytes.len() && is_charset_char(bytes[i]) {
                i += 1;
            }
            if i > start {
                last = Some(&value[start..i]);
            }
        }
        from = from + found + NEEDLE.len();
    }

    last
}

fn is_charset_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b':' | b'_' | b'.' | b'-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn make_response(content_type: Option<&str>, body: &str, redirects: Vec<Url>) -> Response<()> {
        let mut headers = HeaderMap::new();
        if let Some(value) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_str(value).unwrap());
        }
        Response::from_transport(
            TransportResponse {
                status: StatusCode::OK,
                version: Version::HTTP_11,
                headers,
                body: body.to_string(),
                redirects,
            },
            url("https://example.test/page"),
            None,
        )
    }

    #[test]
    fn test_charset_simple() {
        let response = make_response(Some("text/html; charset=utf-8"), "", vec![]);
        assert_eq!(response.charset().as_deref(), Some("utf-8"));
    }

    #[test]
    fn test_charset_case_and_spaces() {
        let response = make_response(Some("text/html; Charset = ISO-8859-1"), "", vec![]);
        assert_eq!(response.charset().as_deref(), Some("ISO-8859-1"));
    }

    #[test]
    fn test_charset_last_match_wins() {
        let response = make_response(
            Some("text/html; charset=utf-8; charset=gbk"),
            "",
            vec![],
        );
        assert_eq!(response.charset().as_deref(), Some("gbk"));
    }

    #[test]
    fn test_charset_absent() {
        let response = make_response(Some("text/html"), "", vec![]);
        assert_eq!(response.charset(), None);

        let response = make_response(None, "", vec![]);
        assert_eq!(response.charset(), None);
    }

    #[test]
    fn test_charset_keyword_without_value() {
        let response = make_response(Some("text/html; charset="), "", vec![]);
        assert_eq!(response.charset(), None);
    }

    #[test]
    fn test_effective_uri_defaults_to_request_uri() {
        let response = make_response(None, "", vec![]);
        assert_eq!(
            response.effective_uri().as_str(),
            "https://example.test/page"
        );
    }

    #[test]
    fn test_effective_uri_is_last_redirect() {
        let chain = vec![
            url("https://example.test/hop"),
            url("https://example.test/final"),
        ];
        let response = make_response(None, "", chain);
        assert_eq!(
            response.effective_uri().as_str(),
            "https://example.test/final"
        );
    }

    #[test]
    fn test_resolve_relative_to_effective_uri() {
        let chain = vec![url("https://moved.test/dir/index.html")];
        let response = make_response(None, "", chain);
        let resolved = response.resolve("item/1").unwrap();
        assert_eq!(resolved.as_str(), "https://moved.test/dir/item/1");
    }

    #[test]
    fn test_json_accessor() {
        let response = make_response(Some("application/json"), r#"{"title": "hello"}"#, vec![]);
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["title"], "hello");
    }

    #[test]
    fn test_html_accessor() {
        let response = make_response(
            Some("text/html; charset=utf-8"),
            "<html><head><title>Hi</title></head></html>",
            vec![],
        );
        let document = response.html();
        let selector = scraper::Selector::parse("title").unwrap();
        let title = document.select(&selector).next().unwrap();
        assert_eq!(title.inner_html(), "Hi");
    }
}
