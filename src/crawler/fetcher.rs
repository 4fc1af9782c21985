//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - GET requests to fetch page content
//! - Gating on the `Content-Type` so only HTML is parsed
//! - Error classification

use crate::config::Config;
use reqwest::Client;
use std::time::Duration;

/// Content-Type prefix of the pages the crawler parses
const HTML_CONTENT_TYPE: &str = "text/html";

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Fetched an HTML page
    Page {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Canonical reason phrase for the status
        reason: String,
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Response is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// HTTP status code
        status_code: u16,
        /// Canonical reason phrase for the status
        reason: String,
        /// The actual Content-Type received
        content_type: String,
    },

    /// Transport failure (connection refused, timeout, unreadable body...)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// HTTP status of the response, if one was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Page { status_code, .. } | Self::ContentMismatch { status_code, .. } => {
                Some(*status_code)
            }
            Self::NetworkError { .. } => None,
        }
    }

    /// Returns true if a response was received with a 2xx status
    pub fn is_success(&self) -> bool {
        self.status_code()
            .map(|code| (200..300).contains(&code))
            .unwrap_or(false)
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The harvester configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use email_harvester::config::Config;
/// use email_harvester::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.crawler.request_timeout_secs);

    Client::builder()
        .user_agent(config.user_agent.value.clone())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// Redirects are followed by the client. The body is only read when the
/// response declares an HTML content type.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
///
/// # Returns
///
/// A FetchResult indicating success or the type of failure
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                format!("Request timeout: {}", e)
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    let final_url = response.url().to_string();
    let reason = status.canonical_reason().unwrap_or_default().to_string();

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html(&content_type) {
        return FetchResult::ContentMismatch {
            status_code: status.as_u16(),
            reason,
            content_type,
        };
    }

    match response.text().await {
        Ok(body) => FetchResult::Page {
            final_url,
            status_code: status.as_u16(),
            reason,
            content_type,
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: format!("Failed to read body: {}", e),
        },
    }
}

/// Checks a Content-Type header value for HTML
fn is_html(content_type: &str) -> bool {
    content_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with(HTML_CONTENT_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&Config::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_is_html() {
        assert!(is_html("text/html"));
        assert!(is_html("text/html; charset=utf-8"));
        assert!(is_html("Text/HTML"));
        assert!(!is_html("application/pdf"));
        assert!(!is_html("application/xhtml+xml"));
        assert!(!is_html(""));
    }

    #[test]
    fn test_status_helpers() {
        let ok = FetchResult::ContentMismatch {
            status_code: 200,
            reason: "OK".to_string(),
            content_type: "image/png".to_string(),
        };
        assert_eq!(ok.status_code(), Some(200));
        assert!(ok.is_success());

        let failed = FetchResult::NetworkError {
            error: "boom".to_string(),
        };
        assert_eq!(failed.status_code(), None);
        assert!(!failed.is_success());
    }

    #[tokio::test]
    async fn test_fetch_html_page_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64)"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(
                        "<html><body>hi</body></html>".as_bytes().to_vec(),
                        "text/html; charset=utf-8",
                    ),
            )
            .mount(&server)
            .await;

        let client = build_http_client(&Config::default()).unwrap();
        match fetch_url(&client, &format!("{}/", server.uri())).await {
            FetchResult::Page {
                status_code, body, ..
            } => {
                assert_eq!(status_code, 200);
                assert!(body.contains("hi"));
            }
            other => panic!("expected a page, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_non_html_is_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/logo"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(vec![0u8, 1, 2], "image/png"),
            )
            .mount(&server)
            .await;

        let client = build_http_client(&Config::default()).unwrap();
        let result = fetch_url(&client, &format!("{}/logo", server.uri())).await;
        assert!(matches!(
            result,
            FetchResult::ContentMismatch { ref content_type, .. } if content_type == "image/png"
        ));
    }

    #[tokio::test]
    async fn test_fetch_error_status_keeps_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_raw(
                        "<html><body>missing</body></html>".as_bytes().to_vec(),
                        "text/html",
                    ),
            )
            .mount(&server)
            .await;

        let client = build_http_client(&Config::default()).unwrap();
        let result = fetch_url(&client, &format!("{}/gone", server.uri())).await;
        assert_eq!(result.status_code(), Some(404));
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host() {
        let client = build_http_client(&Config::default()).unwrap();
        let result = fetch_url(&client, "http://127.0.0.1:1/").await;
        assert!(matches!(result, FetchResult::NetworkError { .. }));
    }
}
