//! Crawl orchestrator: HTTP client → page cache → category crawler.
//!
//! A first run fetches every listing page over the network and leaves one
//! file per page in the cache directory. Later runs replay the cache and only
//! hit the network for pages not seen before, so re-running after an
//! interrupted crawl resumes where it stopped.

use crate::cache::{CachedSource, FileCache};
use crate::config::AppConfig;
use crate::models::ListingRow;
use crate::scraper::http_client::HttpClient;
use crate::scraper::{CategoryCrawler, StopReason};
use anyhow::{Context, Result};
use tracing::info;

pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self, max_pages: u32) -> Result<(Vec<ListingRow>, PipelineStats)> {
        let scraper_cfg = &self.config.scraper;

        let client = HttpClient::new(scraper_cfg).context("Failed to build scraper")?;
        let cache = FileCache::new(&self.config.cache.dir);
        info!(
            "Crawling category {} from {} (cache: {:?}, max {} pages)",
            scraper_cfg.category,
            scraper_cfg.base_url,
            cache.dir(),
            max_pages
        );

        let crawler = CategoryCrawler::new(
            CachedSource::new(client, cache),
            &scraper_cfg.base_url,
            &scraper_cfg.category,
        );
        let outcome = crawler.crawl(max_pages).await;

        let stats = PipelineStats {
            pages: outcome.pages,
            rows: outcome.rows.len(),
            with_registration: outcome
                .rows
                .iter()
                .filter(|r| r.registration.is_some())
                .count(),
            stop: outcome.stop,
        };

        Ok((outcome.rows, stats))
    }
}

#[derive(Debug)]
pub struct PipelineStats {
    pub pages: u32,
    pub rows: usize,
    pub with_registration: usize,
    pub stop: StopReason,
}
