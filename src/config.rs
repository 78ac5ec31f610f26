use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Base URL of the scraping API
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// How many jobs to request for listings
    #[serde(default = "default_jobs_limit")]
    pub jobs_limit: usize,
    /// How many scrape sessions to list
    #[serde(default = "default_sessions_limit")]
    pub sessions_limit: usize,
    /// Polling behaviour while waiting for a scrape to deliver jobs
    #[serde(default)]
    pub poll: PollConfig,
    /// Where recruiter preferences are persisted
    #[serde(default = "default_preferences_path")]
    pub preferences_path: PathBuf,
}

/// Configuration for the scrape-and-wait loop
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PollConfig {
    /// Delay before each poll in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
    /// Number of polls before giving up
    #[serde(default = "default_poll_max_attempts")]
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            max_attempts: default_poll_max_attempts(),
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout: default_timeout(),
            jobs_limit: default_jobs_limit(),
            sessions_limit: default_sessions_limit(),
            poll: PollConfig::default(),
            preferences_path: default_preferences_path(),
        }
    }
}

// Default value functions
fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_jobs_limit() -> usize {
    1000
}

fn default_sessions_limit() -> usize {
    20
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_poll_max_attempts() -> u32 {
    30
}

fn default_preferences_path() -> PathBuf {
    PathBuf::from("job-scraper-prefs.json")
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with JOBSCRAPER__ prefix
    /// 2. jobscraper.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: JOBSCRAPER__POLL__MAX_ATTEMPTS
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Load configuration from file and environment variables
///
/// See [`AppConfig::load`] for the precedence rules.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("jobscraper").required(false))
        // Use double underscore for nested: JOBSCRAPER__POLL__INTERVAL_MS
        .add_source(
            Environment::with_prefix("JOBSCRAPER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
