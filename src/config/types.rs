use serde::Deserialize;

/// File types that are almost never HTML and are not worth fetching
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[
    "doc", "docx", "docm", "ppt", "ppsx", "pptx", "xls", "xlsx", "xlsm", "accdb", "png", "jpg",
    "jpeg", "mov", "mp4", "wmv", "gif", "bmp", "dgn", "pdf", "eps", "ai", "zip", "dll", "exe",
    "rss", "csv", "txt",
];

/// Main configuration structure for Email-Harvester
///
/// Every section is optional in the TOML file; missing keys fall back to
/// the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub exclusions: ExclusionConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of link hops away from the root URL
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Ceiling on outbound requests per second
    #[serde(rename = "requests-per-second", default = "default_requests_per_second")]
    pub requests_per_second: f64,

    /// How many ancestor elements the context resolver inspects
    #[serde(
        rename = "context-ancestor-depth",
        default = "default_context_ancestor_depth"
    )]
    pub context_ancestor_depth: usize,

    /// Per-request transport timeout (seconds)
    #[serde(
        rename = "request-timeout-secs",
        default = "default_request_timeout_secs"
    )]
    pub request_timeout_secs: u64,
}

/// User agent sent with every request
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(default = "default_user_agent")]
    pub value: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory holding the history and email logs
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

/// Link targets that are never fetched
#[derive(Debug, Clone, Deserialize)]
pub struct ExclusionConfig {
    /// File extensions (without the dot) treated as non-HTML
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            requests_per_second: default_requests_per_second(),
            context_ancestor_depth: default_context_ancestor_depth(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: default_user_agent(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

fn default_max_depth() -> u32 {
    10
}

fn default_requests_per_second() -> f64 {
    5.0
}

fn default_context_ancestor_depth() -> usize {
    5
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string()
}

fn default_output_directory() -> String {
    ".".to_string()
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXCLUDED_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}
