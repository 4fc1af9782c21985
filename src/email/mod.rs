//! Email extraction module
//!
//! This module finds addresses in page text and `mailto:` links, and
//! derives the context snippet stored next to each address.

mod context;
mod matcher;

pub use context::{clean_text, resolve_context, title_context, ERROR_MARKER};
pub use matcher::{email_key, from_mailto, match_all};
