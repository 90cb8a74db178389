//! Spider trait and entry-point types
//!
//! A spider is the crawler author's surface: it declares where a crawl
//! starts, supplies the default handler attached to entry points that do
//! not name one, and may run setup work before any request is sent.

use crate::flow::HandlerFlow;
use crate::http::{Request, Response};

/// A crawl definition.
///
/// The engine drives a spider by normalizing its [`start_point`] into
/// requests, fetching each one and feeding the response to the request's
/// handler. Handlers attached explicitly via [`Request::with_handler`] run
/// as-is; entry points without a handler get [`parse`] as their default.
///
/// [`start_point`]: Spider::start_point
/// [`parse`]: Spider::parse
///
/// # Example
///
/// ```no_run
/// use spinneret::{Engine, HandlerFlow, Spider, StartPoint};
/// use spinneret::http::Response;
///
/// struct TitleSpider;
///
/// impl Spider for TitleSpider {
///     type Output = String;
///     type Meta = ();
///
///     fn start_point(&self) -> StartPoint<Self> {
///         "https://example.com/".into()
///     }
///
///     fn parse(&self, response: Response<()>) -> anyhow::Result<HandlerFlow<Self>> {
///         let document = response.html();
///         let selector = scraper::Selector::parse("title").unwrap();
///         match document.select(&selector).next() {
///             Some(title) => Ok(HandlerFlow::Item(title.inner_html())),
///             None => Ok(HandlerFlow::Done),
///         }
///     }
/// }
///
/// # async fn run() -> spinneret::Result<()> {
/// let results = Engine::new(TitleSpider)?.start().await?;
/// # Ok(())
/// # }
/// ```
pub trait Spider: Send + Sync + Sized + 'static {
    /// Terminal value type collected into the final result list.
    type Output: Send + 'static;

    /// Opaque metadata carried from a request onto its response.
    ///
    /// Spiders that do not correlate requests and responses use `()`.
    type Meta: Clone + Send + Sync + 'static;

    /// Declares the entry point(s) of the crawl.
    fn start_point(&self) -> StartPoint<Self>;

    /// Default handler, attached to entry points that carry none.
    fn parse(&self, response: Response<Self::Meta>) -> anyhow::Result<HandlerFlow<Self>>;

    /// Runs once before any request is sent. Setup only; the return has no
    /// effect on control flow.
    fn before_start(&self) {}
}

/// One declared entry point: a bare URI string or a prepared request.
pub enum Entry<S: Spider> {
    /// A URI to fetch with GET and the spider's default handler.
    Uri(String),
    /// A prepared request descriptor.
    Request(Request<S>),
}

/// What [`Spider::start_point`] returns: one entry or an ordered list.
///
/// Multiple entries are resolved in declaration order and their outputs are
/// concatenated in that same order.
pub enum StartPoint<S: Spider> {
    One(Entry<S>),
    Many(Vec<Entry<S>>),
}

impl<S: Spider> From<&str> for Entry<S> {
    fn from(uri: &str) -> Self {
        Entry::Uri(uri.to_string())
    }
}

impl<S: Spider> From<String> for Entry<S> {
    fn from(uri: String) -> Self {
        Entry::Uri(uri)
    }
}

impl<S: Spider> From<Request<S>> for Entry<S> {
    fn from(request: Request<S>) -> Self {
        Entry::Request(request)
    }
}

impl<S: Spider> From<&str> for StartPoint<S> {
    fn from(uri: &str) -> Self {
        StartPoint::One(Entry::Uri(uri.to_string()))
    }
}

impl<S: Spider> From<String> for StartPoint<S> {
    fn from(uri: String) -> Self {
        StartPoint::One(Entry::Uri(uri))
    }
}

impl<S: Spider> From<Request<S>> for StartPoint<S> {
    fn from(request: Request<S>) -> Self {
        StartPoint::One(Entry::Request(request))
    }
}

impl<S: Spider> From<Entry<S>> for StartPoint<S> {
    fn from(entry: Entry<S>) -> Self {
        StartPoint::One(entry)
    }
}

impl<S: Spider> From<Vec<Entry<S>>> for StartPoint<S> {
    fn from(entries: Vec<Entry<S>>) -> Self {
        StartPoint::Many(entries)
    }
}

impl<S: Spider> FromIterator<Entry<S>> for StartPoint<S> {
    fn from_iter<I: IntoIterator<Item = Entry<S>>>(iter: I) -> Self {
        StartPoint::Many(iter.into_iter().collect())
    }
}

impl<S: Spider> StartPoint<S> {
    /// Builds a multi-entry start point from anything convertible to entries.
    pub fn many<I, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Entry<S>>,
    {
        StartPoint::Many(entries.into_iter().map(Into::into).collect())
    }

    /// Flattens into the list of declared entries, preserving order.
    pub(crate) fn into_entries(self) -> Vec<Entry<S>> {
        match self {
            StartPoint::One(entry) => vec![entry],
            StartPoint::Many(entries) => entries,
        }
    }
}
