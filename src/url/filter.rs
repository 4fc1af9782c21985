use url::Url;

/// Decides whether a normalized URL belongs to the crawl
///
/// A URL is in scope when:
/// - its last path segment does not carry an excluded extension
///   (compared case-insensitively, query and fragment ignored)
/// - it starts with the root URL, where a `www.` host prefix on the
///   candidate is ignored unless the root itself uses `www.`
///
/// URLs that do not parse are never in scope.
///
/// # Arguments
///
/// * `url` - The normalized candidate URL
/// * `root_url` - The root URL of the crawl
/// * `excluded_extensions` - Extensions (without the dot) to skip
///
/// # Examples
///
/// ```
/// use email_harvester::url::is_in_scope;
///
/// let excluded = vec!["pdf".to_string(), "docx".to_string()];
/// let root = "https://example.com";
/// assert!(is_in_scope("https://example.com/page", root, &excluded));
/// assert!(!is_in_scope("https://example.com/file.pdf?x=1", root, &excluded));
/// assert!(!is_in_scope("https://other.com/page", root, &excluded));
/// ```
pub fn is_in_scope(url: &str, root_url: &str, excluded_extensions: &[String]) -> bool {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };

    if let Some(ext) = extension_of(&parsed) {
        if excluded_extensions
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(&ext))
        {
            return false;
        }
    }

    let root = root_url.to_lowercase();
    let mut candidate = url.to_lowercase();
    if !root.contains("://www.") {
        candidate = candidate.replacen("://www.", "://", 1);
    }

    candidate.starts_with(&root)
}

/// Returns the extension of the last path segment, if it has one
fn extension_of(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.last()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}
