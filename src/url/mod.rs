//! URL handling module for Email-Harvester
//!
//! This module provides link normalization, crawl scope filtering and
//! link classification.

mod filter;
mod normalize;

// Re-export main functions
pub use filter::is_in_scope;
pub use normalize::{normalize, site_origin};

/// Pseudo-protocols whose links are neither followed nor harvested
const PSEUDO_PROTOCOLS: &[&str] = &["javascript:", "tel:", "data:", "ftp:"];

/// What an anchor's `href` points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// A `mailto:` address - harvested, never fetched
    Mailto,
    /// A same-page anchor (`#...`)
    Fragment,
    /// A script or other non-page protocol
    PseudoProtocol,
    /// Anything else - a candidate page to crawl
    Page,
}

/// Classifies a raw `href` attribute
///
/// # Examples
///
/// ```
/// use email_harvester::url::{classify_link, LinkKind};
///
/// assert_eq!(classify_link("mailto:info@example.com"), LinkKind::Mailto);
/// assert_eq!(classify_link("#top"), LinkKind::Fragment);
/// assert_eq!(classify_link("javascript:void(0)"), LinkKind::PseudoProtocol);
/// assert_eq!(classify_link("/about"), LinkKind::Page);
/// ```
pub fn classify_link(href: &str) -> LinkKind {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();

    if lower.starts_with("mailto:") {
        LinkKind::Mailto
    } else if href.is_empty() || href.starts_with('#') {
        LinkKind::Fragment
    } else if PSEUDO_PROTOCOLS.iter().any(|p| lower.starts_with(p)) {
        LinkKind::PseudoProtocol
    } else {
        LinkKind::Page
    }
}
