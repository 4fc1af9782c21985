//! Context resolution for harvested addresses
//!
//! An address on its own says little about who it belongs to. This module
//! looks at the text surrounding a `mailto:` anchor and picks a short
//! snippet (a name, a department, a page title) to store next to it.
//!
//! # Search Order
//!
//! 1. Text of the anchor's next sibling node, unless it merely repeats the
//!    anchor's own text
//! 2. Text of the anchor's previous sibling node
//! 3. For each of the nearest `ancestor_depth` ancestor elements: its own
//!    text, then the text of the first `h1`-`h6` inside it
//! 4. The document title
//!
//! Each candidate goes through [`clean_text`]; the first one that survives
//! wins. When nothing survives the literal [`ERROR_MARKER`] is used so the
//! address is still recorded.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Selector};

/// Context stored when no candidate text was usable
pub const ERROR_MARKER: &str = "Error";

/// Shortest accepted context, in characters
const MIN_CONTEXT_LEN: usize = 4;

/// Longest accepted context, in characters
const MAX_CONTEXT_LEN: usize = 59;

static NOISE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"['"|.;:`~#$%^&*]"#).expect("noise pattern is valid"));

static BOILERPLATE_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(send|email|contact)\b").expect("boilerplate pattern is valid"));

static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("heading selector is valid"));

#[derive(Debug, Clone, Copy)]
enum Sibling {
    Next,
    Previous,
}

/// Reduces raw text to a short, presentable snippet
///
/// Keeps the first line, removes quoting and punctuation noise and the
/// words "send", "email" and "contact", then trims. The result is only
/// accepted when it is 4 to 59 characters long.
///
/// # Examples
///
/// ```
/// use email_harvester::email::clean_text;
///
/// assert_eq!(clean_text("  Jane Doe\nHead of Sales").as_deref(), Some("Jane Doe"));
/// assert_eq!(clean_text("Email us"), None);
/// ```
pub fn clean_text(raw: &str) -> Option<String> {
    let first_line = raw.trim().lines().next().unwrap_or_default();
    let without_noise = NOISE_CHARS.replace_all(first_line, "");
    let without_boilerplate = BOILERPLATE_WORDS.replace_all(&without_noise, "");
    let cleaned = without_boilerplate.trim();

    let len = cleaned.chars().count();
    if (MIN_CONTEXT_LEN..=MAX_CONTEXT_LEN).contains(&len) {
        Some(cleaned.to_string())
    } else {
        None
    }
}

/// Derives a context snippet for an anchor
///
/// # Arguments
///
/// * `link` - The anchor element
/// * `title` - The document title, if the page has one
/// * `ancestor_depth` - How many enclosing elements to inspect
///
/// # Returns
///
/// The first usable snippet, or [`ERROR_MARKER`] when every fallback failed
pub fn resolve_context(link: ElementRef<'_>, title: Option<&str>, ancestor_depth: usize) -> String {
    let link_text = clean_text(&link.text().collect::<String>());

    let next = sibling_text(link, Sibling::Next)
        .and_then(|text| clean_text(&text))
        .filter(|context| Some(context) != link_text.as_ref());
    if let Some(context) = next {
        return context;
    }

    if let Some(context) = sibling_text(link, Sibling::Previous).and_then(|text| clean_text(&text)) {
        return context;
    }

    if let Some(context) = ancestor_text(link, ancestor_depth) {
        return context;
    }

    title
        .and_then(clean_text)
        .unwrap_or_else(|| ERROR_MARKER.to_string())
}

/// Context for an address found in free text rather than in an anchor
///
/// Uses the cleaned title, falling back to the title's first line as-is.
pub fn title_context(title: Option<&str>) -> String {
    let title = match title {
        Some(title) => title,
        None => return ERROR_MARKER.to_string(),
    };

    if let Some(cleaned) = clean_text(title) {
        return cleaned;
    }

    match title.trim().lines().next().map(str::trim) {
        Some(line) if !line.is_empty() => line.to_string(),
        _ => ERROR_MARKER.to_string(),
    }
}

fn sibling_text(link: ElementRef<'_>, direction: Sibling) -> Option<String> {
    let node = match direction {
        Sibling::Next => link.next_sibling(),
        Sibling::Previous => link.prev_sibling(),
    }?;

    match node.value() {
        Node::Text(text) => Some(String::from(&**text)),
        Node::Element(_) => ElementRef::wrap(node).map(|el| el.text().collect()),
        _ => None,
    }
}

fn ancestor_text(link: ElementRef<'_>, ancestor_depth: usize) -> Option<String> {
    for ancestor in link
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(ancestor_depth)
    {
        if let Some(context) = clean_text(&ancestor.text().collect::<String>()) {
            return Some(context);
        }

        let heading = ancestor
            .select(&HEADING_SELECTOR)
            .next()
            .and_then(|h| clean_text(&h.text().collect::<String>()));
        if heading.is_some() {
            return heading;
        }
    }

    None
}
