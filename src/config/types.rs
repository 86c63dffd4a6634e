use crate::rank::ConvergencePolicy;
use crate::ConfigError;
use serde::Deserialize;

/// Main configuration structure for wikirank
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub site: SiteConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of fetch workers running in parallel
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Page name the crawl starts from
    #[serde(default = "default_start")]
    pub start: String,

    /// Fetch attempts per page before it is abandoned
    #[serde(rename = "retry-attempts", default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Fixed delay between fetch attempts (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// How long a paused worker idles before checking the running flag again (milliseconds)
    #[serde(rename = "pause-poll-ms", default = "default_pause_poll_ms")]
    pub pause_poll_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Shape of the crawled wiki
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Address prefixes stripped by the normalizer; the first one is canonical
    #[serde(default = "default_prefixes")]
    pub prefixes: Vec<String>,

    /// Marker after which an address is truncated
    #[serde(rename = "query-marker", default = "default_query_marker")]
    pub query_marker: String,

    /// Id of the element holding the article body
    #[serde(rename = "content-id", default = "default_content_id")]
    pub content_id: String,

    /// Class of the anchors that count as wiki links
    #[serde(rename = "link-class", default = "default_link_class")]
    pub link_class: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the edge log written by the crawl and read by the analysis
    #[serde(rename = "edge-log")]
    pub edge_log: String,

    /// Path of the tab-separated rank file
    #[serde(rename = "rank-file", default)]
    pub rank_file: Option<String>,

    /// Path of the top-N CSV edge list
    #[serde(rename = "csv-file", default)]
    pub csv_file: Option<String>,
}

/// PageRank configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Probability of a random jump at each step
    #[serde(rename = "reset-probability", default = "default_reset_probability")]
    pub reset_probability: f64,

    /// Random-walk steps per iteration (stochastic variant)
    #[serde(rename = "steps-per-iteration", default = "default_steps_per_iteration")]
    pub steps_per_iteration: u64,

    #[serde(rename = "max-iterations", default = "default_max_iterations")]
    pub max_iterations: usize,

    /// `"rank"` for order stability, or a numeric tolerance
    ///
    /// Order stability compares full page orders and never stops before the
    /// second iteration. It settles on the ordering, not on the values, so
    /// use a tolerance when the scores themselves matter.
    #[serde(default)]
    pub convergence: ConvergenceSetting,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(rename = "top-n", default = "default_top_n")]
    pub top_n: usize,

    /// Only names starting with this prefix are written to the rank file
    #[serde(rename = "name-prefix", default)]
    pub name_prefix: Option<String>,
}

/// Raw convergence setting as written in the TOML file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConvergenceSetting {
    Mode(String),
    Tolerance(f64),
}

impl Default for ConvergenceSetting {
    fn default() -> Self {
        Self::Mode("rank".to_string())
    }
}

impl ConvergenceSetting {
    /// Resolves the setting into a convergence policy
    pub fn policy(&self) -> Result<ConvergencePolicy, ConfigError> {
        match self {
            Self::Mode(mode) if mode.eq_ignore_ascii_case("rank") => {
                Ok(ConvergencePolicy::OrderStability)
            }
            Self::Mode(other) => other
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidConvergence(other.clone()))
                .and_then(|tolerance| Self::Tolerance(tolerance).policy()),
            Self::Tolerance(tolerance) if tolerance.is_finite() && *tolerance > 0.0 => {
                Ok(ConvergencePolicy::ToleranceThreshold(*tolerance))
            }
            Self::Tolerance(tolerance) => Err(ConfigError::InvalidConvergence(format!(
                "tolerance must be a positive number, got {}",
                tolerance
            ))),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            start: default_start(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            pause_poll_ms: default_pause_poll_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            prefixes: default_prefixes(),
            query_marker: default_query_marker(),
            content_id: default_content_id(),
            link_class: default_link_class(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            reset_probability: default_reset_probability(),
            steps_per_iteration: default_steps_per_iteration(),
            max_iterations: default_max_iterations(),
            convergence: ConvergenceSetting::default(),
            seed: default_seed(),
            top_n: default_top_n(),
            name_prefix: None,
        }
    }
}

fn default_workers() -> usize {
    10
}

fn default_start() -> String {
    "Main/HomePage".to_string()
}

fn default_retry_attempts() -> u32 {
    10
}

fn default_retry_delay_ms() -> u64 {
    10_000
}

fn default_pause_poll_ms() -> u64 {
    1_000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("wikirank/{}", env!("CARGO_PKG_VERSION"))
}

fn default_prefixes() -> Vec<String> {
    vec![
        "http://tvtropes.org/pmwiki/pmwiki.php/".to_string(),
        "/pmwiki/pmwiki.php/".to_string(),
    ]
}

fn default_query_marker() -> String {
    "?from".to_string()
}

fn default_content_id() -> String {
    "wikitext".to_string()
}

fn default_link_class() -> String {
    "twikilink".to_string()
}

fn default_reset_probability() -> f64 {
    0.15
}

fn default_steps_per_iteration() -> u64 {
    100_000
}

fn default_max_iterations() -> usize {
    100
}

fn default_seed() -> u64 {
    42
}

fn default_top_n() -> usize {
    100
}
