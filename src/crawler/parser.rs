//! HTML parser for extracting anchors, text and metadata
//!
//! This module handles parsing HTML content to extract:
//! - Anchors with an `href` attribute, in document order
//! - The page title
//! - Visible text nodes, for scanning free-text addresses
//!
//! The parsed document is not `Send`, so a [`ParsedPage`] is built and
//! consumed between two awaits, never held across one.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("title selector is valid"));

/// Elements whose text content is never rendered
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "template"];

/// A parsed HTML page
pub struct ParsedPage {
    document: Html,
    title: Option<String>,
}

impl ParsedPage {
    /// Parses HTML content
    ///
    /// Parsing is lenient: malformed markup yields a best-effort tree.
    ///
    /// # Example
    ///
    /// ```
    /// use email_harvester::crawler::ParsedPage;
    ///
    /// let page = ParsedPage::parse(r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#);
    /// assert_eq!(page.title(), Some("Test"));
    /// assert_eq!(page.anchors().count(), 1);
    /// ```
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let title = extract_title(&document);
        Self { document, title }
    }

    /// The trimmed page title, if present and non-empty
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// All anchors carrying an `href` attribute, in document order
    pub fn anchors(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.document.select(&ANCHOR_SELECTOR)
    }

    /// Trimmed, non-empty text nodes outside `script`, `style` and `template`
    pub fn text_fragments(&self) -> Vec<&str> {
        self.document
            .tree
            .root()
            .descendants()
            .filter_map(|node| {
                let text = node.value().as_text()?;
                let hidden = node
                    .parent()
                    .and_then(ElementRef::wrap)
                    .map(|parent| INVISIBLE_ELEMENTS.contains(&parent.value().name()))
                    .unwrap_or(false);
                if hidden {
                    return None;
                }

                let trimmed = text.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            })
            .collect()
    }
}

/// The raw `href` of an anchor
pub fn anchor_href<'a>(anchor: &ElementRef<'a>) -> Option<&'a str> {
    anchor.value().attr("href")
}

/// The visible text of an anchor, whitespace-trimmed
pub fn anchor_text(anchor: &ElementRef<'_>) -> String {
    anchor.text().collect::<String>().trim().to_string()
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}
