use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Conservative email-shaped token: local part, `@`, dotted domain with an
/// alphabetic top-level label of at least two characters
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("email pattern is valid")
});

/// Extracts every distinct email address found in a block of text
///
/// Case is preserved as found; two spellings differing only in case are
/// both returned. Use [`email_key`] for deduplication.
///
/// # Examples
///
/// ```
/// use email_harvester::email::match_all;
///
/// let found = match_all("Contact jane.doe@example.org or call us");
/// assert_eq!(found.len(), 1);
/// assert!(found.contains("jane.doe@example.org"));
/// ```
pub fn match_all(text: &str) -> BTreeSet<String> {
    EMAIL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Extracts the address from a `mailto:` href
///
/// The scheme is removed (case-insensitively), anything after `?` such as
/// `subject=` is dropped, and whitespace is trimmed.
///
/// # Returns
///
/// * `Some(String)` - The address as written in the link
/// * `None` - The href is not a mailto link or carries no address
///
/// # Examples
///
/// ```
/// use email_harvester::email::from_mailto;
///
/// assert_eq!(
///     from_mailto("mailto:Sales@Example.com?subject=Hi").as_deref(),
///     Some("Sales@Example.com")
/// );
/// assert_eq!(from_mailto("mailto:"), None);
/// ```
pub fn from_mailto(href: &str) -> Option<String> {
    let href = href.trim();
    let prefix = href.get(..7)?;
    if !prefix.eq_ignore_ascii_case("mailto:") {
        return None;
    }

    let address = href[7..].split('?').next().unwrap_or_default().trim();
    if address.is_empty() {
        None
    } else {
        Some(address.to_string())
    }
}

/// The case-insensitive key an address is deduplicated under
pub fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_single_address_in_sentence() {
        let found = match_all("Contact jane.doe@example.org or call us");
        assert_eq!(
            found.into_iter().collect::<Vec<_>>(),
            vec!["jane.doe@example.org".to_string()]
        );
    }

    #[test]
    fn test_match_multiple_and_duplicates() {
        let found = match_all("a@x.com, b+tag@mail.y.co.uk; again a@x.com");
        assert_eq!(found.len(), 2);
        assert!(found.contains("a@x.com"));
        assert!(found.contains("b+tag@mail.y.co.uk"));
    }

    #[test]
    fn test_match_preserves_case() {
        let found = match_all("Write to Info@Example.COM today");
        assert!(found.contains("Info@Example.COM"));
    }

    #[test]
    fn test_match_trailing_punctuation() {
        let found = match_all("Email: office@example.com.");
        assert!(found.contains("office@example.com"));
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_no_partial_matches() {
        assert!(match_all("user@localhost").is_empty());
        assert!(match_all("name@domain.c").is_empty());
        assert!(match_all("@example.com").is_empty());
        assert!(match_all("price 5@3.50").is_empty());
        assert!(match_all("no addresses here").is_empty());
    }

    #[test]
    fn test_from_mailto() {
        assert_eq!(
            from_mailto("mailto:info@example.com").as_deref(),
            Some("info@example.com")
        );
        assert_eq!(
            from_mailto("MailTo: info@example.com ?subject=hello").as_deref(),
            Some("info@example.com")
        );
    }

    #[test]
    fn test_from_mailto_rejects_other_links() {
        assert_eq!(from_mailto("https://example.com"), None);
        assert_eq!(from_mailto("mail"), None);
        assert_eq!(from_mailto("mailto:?subject=x"), None);
    }

    #[test]
    fn test_email_key() {
        assert_eq!(email_key(" Foo@Example.com "), "foo@example.com");
        assert_eq!(email_key("foo@example.com"), email_key("FOO@EXAMPLE.COM"));
    }
}
