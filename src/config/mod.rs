use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::scraper::http_client::{Backoff, CourtesyDelay, RetryPolicy};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
}

/// Scraper configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Category code in the listing path, e.g. `ACE` for engine-related.
    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_backoff_step_ms")]
    pub backoff_step_ms: u64,

    #[serde(default = "default_delay_min_ms")]
    pub delay_min_ms: u64,

    #[serde(default = "default_delay_max_ms")]
    pub delay_max_ms: u64,
}

/// Page cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

/// Crawl configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlConfig {
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "https://aviation-safety.net".to_string()
}
fn default_category() -> String {
    "ACE".to_string()
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; asn-scrape/0.1; aviation incident research)".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_attempts() -> u32 {
    3
}
fn default_backoff_step_ms() -> u64 {
    1500
}
fn default_delay_min_ms() -> u64 {
    1200
}
fn default_delay_max_ms() -> u64 {
    2500
}
fn default_cache_dir() -> PathBuf {
    PathBuf::from("asn_cache")
}
fn default_max_pages() -> u32 {
    2000
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            category: default_category(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            backoff_step_ms: default_backoff_step_ms(),
            delay_min_ms: default_delay_min_ms(),
            delay_max_ms: default_delay_max_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { dir: default_cache_dir() }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self { max_pages: default_max_pages() }
    }
}

impl ScraperConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: Backoff::Linear(Duration::from_millis(self.backoff_step_ms)),
        }
    }

    pub fn courtesy_delay(&self) -> CourtesyDelay {
        CourtesyDelay {
            min: Duration::from_millis(self.delay_min_ms),
            max: Duration::from_millis(self.delay_max_ms),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            // ASN_SCRAPER__CATEGORY=AFI → scraper.category
            .add_source(
                config::Environment::with_prefix("ASN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration sources")?;

        let app_cfg: AppConfig = cfg
            .try_deserialize()
            .context("Invalid configuration")?;
        app_cfg.validate()?;
        Ok(app_cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let s = &self.scraper;
        ensure!(s.max_attempts > 0, "scraper.max_attempts must be at least 1");
        ensure!(
            s.delay_min_ms <= s.delay_max_ms,
            "scraper.delay_min_ms ({}) exceeds scraper.delay_max_ms ({})",
            s.delay_min_ms,
            s.delay_max_ms
        );
        url::Url::parse(&s.base_url)
            .with_context(|| format!("scraper.base_url is not a URL: {}", s.base_url))?;
        ensure!(!s.category.trim().is_empty(), "scraper.category is empty");
        Ok(())
    }
}
