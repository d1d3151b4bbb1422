//! Main-content extraction for fetched pages.
//!
//! The content-extraction source only returns links and short
//! descriptions; the Trafilatura adapter replaces the description with the
//! readable text of the linked page when it can. [`ContentExtractor`] is
//! the seam for that capability; [`HttpContentExtractor`] is the default,
//! fetching through the shared client and extracting with [`extract_content`].

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::client::RateLimitedClient;
use crate::error::{Result, SearchError};
use crate::types::PageContent;

/// Elements removed, with their content, before extraction.
const BOILERPLATE_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "svg", "iframe",
];

/// Candidate content roots, most specific first.
const CONTENT_ROOTS: &[&str] = &["article", "main", "[role=\"main\"]", "body"];

/// Fetch a page and return its main readable content.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched or has no readable text.
    async fn fetch_and_extract(&self, url: &str) -> Result<PageContent>;
}

/// Default extractor: GET via [`RateLimitedClient::fetch_text`], then
/// [`extract_content`].
pub struct HttpContentExtractor {
    client: Arc<RateLimitedClient>,
}

impl HttpContentExtractor {
    pub fn new(client: Arc<RateLimitedClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContentExtractor for HttpContentExtractor {
    async fn fetch_and_extract(&self, url: &str) -> Result<PageContent> {
        let html = self.client.fetch_text(url).await?;
        extract_content(&html, url)
    }
}

/// Extract readable text content from raw HTML.
///
/// Strips boilerplate elements, takes the first non-empty of `<article>`,
/// `<main>`, `[role="main"]` and `<body>`, and collapses whitespace.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if no extractable content is found.
pub fn extract_content(html: &str, url: &str) -> Result<PageContent> {
    let document = Html::parse_document(&strip_boilerplate(html));

    let text = main_text(&document);
    if text.is_empty() {
        return Err(SearchError::Parse("no extractable content found".into()));
    }

    Ok(PageContent {
        url: url.to_owned(),
        title: title(&document),
        word_count: text.split_whitespace().count(),
        text,
    })
}

fn title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };
    document
        .select(&selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default()
}

fn main_text(document: &Html) -> String {
    CONTENT_ROOTS
        .iter()
        .filter_map(|root| Selector::parse(root).ok())
        .filter_map(|selector| {
            let element = document.select(&selector).next()?;
            let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
            (!text.is_empty()).then_some(text)
        })
        .next()
        .unwrap_or_default()
}

/// Collapse every whitespace run to a single space and trim.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_boilerplate(html: &str) -> String {
    BOILERPLATE_TAGS
        .iter()
        .fold(html.to_owned(), |acc, tag| strip_element(&acc, tag))
}

/// Remove every `<tag ...>...</tag>` span, matching the tag name
/// case-insensitively and only on a name boundary (`<nav>` but not `<navbar>`).
fn strip_element(html: &str, tag: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(offset) = lower[pos..].find(&open) {
        let start = pos + offset;
        let name_end = start + open.len();
        let on_boundary = lower
            .as_bytes()
            .get(name_end)
            .is_none_or(|b| matches!(b, b' ' | b'>' | b'/' | b'\n' | b'\r' | b'\t'));

        if !on_boundary {
            out.push_str(&html[pos..name_end]);
            pos = name_end;
            continue;
        }

        out.push_str(&html[pos..start]);
        pos = match lower[start..].find(&close) {
            Some(end) => start + end + close.len(),
            // Unclosed element: drop only the opening tag.
            None => lower[start..]
                .find('>')
                .map_or(html.len(), |end| start + end + 1),
        };
    }
    out.push_str(&html[pos..]);
    out
}
