use crate::UrlError;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Matches a leading URI scheme such as `https:` or `mailto:`
static SCHEME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9+.\-]*:").expect("scheme pattern is valid"));

/// Normalizes a link found on a page into an absolute, lower-cased URL
///
/// # Normalization Steps
///
/// 1. Trim whitespace and drop the fragment (everything after `#`)
/// 2. Lower-case the href
/// 3. Resolve it:
///    - `//host/path` takes the scheme of the root URL
///    - `/path` is joined to the scheme and host of the root URL
///    - an href with its own scheme is kept as-is (HTTP(S) only)
///    - anything else is appended to the referring page, with the referer's
///      query string removed and a trailing `/` guaranteed
/// 4. Collapse repeated `/` that are not part of `://`
///
/// # Arguments
///
/// * `raw_href` - The `href` attribute as found in the page
/// * `referer_url` - The URL of the page the link was found on
/// * `root_url` - The root URL of the crawl
///
/// # Returns
///
/// * `Ok(String)` - The absolute URL
/// * `Err(UrlError)` - The href is empty, uses another scheme, or does not
///   form a valid URL; callers treat this as out of scope
///
/// # Examples
///
/// ```
/// use email_harvester::url::normalize;
///
/// let root = "https://example.com";
/// let referer = "https://example.com/contact/";
/// assert_eq!(normalize("/about", referer, root).unwrap(), "https://example.com/about");
/// assert_eq!(normalize("team", referer, root).unwrap(), "https://example.com/contact/team");
/// assert_eq!(normalize("https://example.com/x#y", referer, root).unwrap(), "https://example.com/x");
/// ```
pub fn normalize(raw_href: &str, referer_url: &str, root_url: &str) -> Result<String, UrlError> {
    let href = strip_fragment(raw_href.trim());
    if href.is_empty() {
        return Err(UrlError::Empty);
    }
    let href = href.to_lowercase();

    let absolute = if let Some(rest) = href.strip_prefix("//") {
        format!("{}://{}", root_scheme(root_url)?, rest)
    } else if href.starts_with('/') {
        format!("{}{}", site_origin(root_url)?, href)
    } else if let Some(scheme) = SCHEME_PATTERN.find(&href) {
        let scheme = scheme.as_str().trim_end_matches(':');
        if scheme != "http" && scheme != "https" {
            return Err(UrlError::InvalidScheme(scheme.to_string()));
        }
        href
    } else {
        let base = referer_url
            .split('?')
            .next()
            .map(strip_fragment)
            .unwrap_or_default()
            .to_lowercase();
        if base.ends_with('/') {
            format!("{}{}", base, href)
        } else {
            format!("{}/{}", base, href)
        }
    };

    let normalized = collapse_separators(&absolute);

    let parsed = Url::parse(&normalized).map_err(|e| UrlError::Parse(format!("{}: {}", normalized, e)))?;
    if parsed.host_str().is_none() {
        return Err(UrlError::MissingHost(normalized));
    }

    Ok(normalized)
}

/// Returns `scheme://host[:port]` of a URL, lower-cased
///
/// # Examples
///
/// ```
/// use email_harvester::url::site_origin;
///
/// assert_eq!(site_origin("https://Example.com/contact/").unwrap(), "https://example.com");
/// ```
pub fn site_origin(url: &str) -> Result<String, UrlError> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse(format!("{}: {}", url, e)))?;
    if parsed.host_str().is_none() {
        return Err(UrlError::MissingHost(url.to_string()));
    }
    Ok(parsed.origin().ascii_serialization().to_lowercase())
}

fn root_scheme(root_url: &str) -> Result<String, UrlError> {
    Url::parse(root_url)
        .map(|u| u.scheme().to_string())
        .map_err(|e| UrlError::Parse(format!("{}: {}", root_url, e)))
}

fn strip_fragment(s: &str) -> &str {
    match s.find('#') {
        Some(idx) => &s[..idx],
        None => s,
    }
}

/// Collapses runs of `/` into one, leaving the `//` after a scheme intact
fn collapse_separators(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let mut run = 0usize;
    let mut after_colon = false;

    for c in url.chars() {
        if c == '/' {
            if run == 0 {
                after_colon = out.ends_with(':');
            }
            run += 1;
            let limit = if after_colon { 2 } else { 1 };
            if run <= limit {
                out.push('/');
            }
        } else {
            run = 0;
            out.push(c);
        }
    }

    out
}
