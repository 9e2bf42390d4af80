pub mod cleaner;
pub mod http_client;
pub mod parsers;

use crate::models::ListingRow;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use self::parsers::parse_listing_page;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Anything that can turn a URL into page text. `None` means "no content":
/// the caller stops, it is never a fatal error.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<String>;
}

#[async_trait]
impl<T: PageSource + ?Sized> PageSource for &T {
    async fn fetch(&self, url: &str) -> Option<String> {
        (**self).fetch(url).await
    }
}

// ── Category crawler ──────────────────────────────────────────────────────────

/// Why a crawl ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source had no content for this page.
    FetchFailed(u32),
    /// This page parsed to zero rows. Usually the end of the category, but a
    /// page that failed to render its table looks the same.
    EmptyPage(u32),
    /// `max_pages` pages were crawled.
    PageLimit,
}

#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub rows: Vec<ListingRow>,
    /// Pages that contributed rows.
    pub pages: u32,
    pub stop: StopReason,
}

pub struct CategoryCrawler<S> {
    source: S,
    base_url: String,
    category: String,
}

impl<S: PageSource> CategoryCrawler<S> {
    pub fn new(source: S, base_url: &str, category: &str) -> Self {
        Self {
            source,
            base_url: base_url.trim_end_matches('/').to_string(),
            category: category.to_string(),
        }
    }

    /// Listing URL for one page. e.g. page 2 of ACE → /asndb/cat/ACE/2
    pub fn listing_url(&self, page: u32) -> String {
        format!("{}/asndb/cat/{}/{}", self.base_url, self.category, page)
    }

    /// All rows of the category, in page order then row order.
    pub async fn crawl_category(&self, max_pages: u32) -> Vec<ListingRow> {
        self.crawl(max_pages).await.rows
    }

    /// Crawl pages 1..=max_pages, stopping at the first page that fails to
    /// fetch or yields no rows.
    pub async fn crawl(&self, max_pages: u32) -> CrawlOutcome {
        let mut rows = Vec::new();
        let mut page = 1u32;

        let stop = loop {
            if page > max_pages {
                info!("Reached page limit ({}), stopping", max_pages);
                break StopReason::PageLimit;
            }

            let url = self.listing_url(page);
            debug!("Fetching listing page {} ({})", page, url);

            let Some(html) = self.source.fetch(&url).await else {
                warn!("No content for page {} — stopping", page);
                break StopReason::FetchFailed(page);
            };

            let page_rows = parse_listing_page(&html);
            if page_rows.is_empty() {
                if page == 1 {
                    warn!("First page of {} has no rows", self.category);
                } else {
                    debug!("Empty page {} — end of category", page);
                }
                break StopReason::EmptyPage(page);
            }

            info!("  Page {}: {} rows", page, page_rows.len());
            rows.extend(page_rows);
            page += 1;
        };

        info!("Total rows for {}: {}", self.category, rows.len());
        CrawlOutcome {
            rows,
            pages: page - 1,
            stop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const BASE: &str = "https://aviation-safety.net";

    /// Serves scripted pages and records every requested URL.
    #[derive(Default)]
    struct ScriptedSource {
        pages: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        fn with_page(mut self, page: u32, html: String) -> Self {
            self.pages
                .insert(format!("{BASE}/asndb/cat/ACE/{page}"), html);
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for ScriptedSource {
        async fn fetch(&self, url: &str) -> Option<String> {
            self.requested.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned()
        }
    }

    fn listing(regs: &[&str]) -> String {
        let rows: String = regs
            .iter()
            .map(|r| format!("<tr><td>1 Jan 2020</td><td>A320</td><td>{r}</td><td>Somewhere</td></tr>"))
            .collect();
        format!("<html><body><table>{rows}</table></body></html>")
    }

    fn regs(rows: &[ListingRow]) -> Vec<&str> {
        rows.iter().filter_map(|r| r.registration.as_deref()).collect()
    }

    #[test]
    fn test_listing_url() {
        let crawler = CategoryCrawler::new(ScriptedSource::default(), "https://aviation-safety.net/", "ACE");
        assert_eq!(crawler.listing_url(3), "https://aviation-safety.net/asndb/cat/ACE/3");
    }

    #[tokio::test]
    async fn test_empty_page_ends_crawl() {
        let source = ScriptedSource::default()
            .with_page(1, listing(&["EC-AAA", "EC-AAB"]))
            .with_page(2, listing(&["G-BBBB"]))
            .with_page(3, listing(&[]))
            .with_page(4, listing(&["F-CCCC"]));
        let crawler = CategoryCrawler::new(&source, BASE, "ACE");

        let outcome = crawler.crawl(2000).await;

        assert_eq!(regs(&outcome.rows), vec!["EC-AAA", "EC-AAB", "G-BBBB"]);
        assert_eq!(outcome.pages, 2);
        assert_eq!(outcome.stop, StopReason::EmptyPage(3));
        assert_eq!(source.requested().len(), 3);
        assert!(source.requested().iter().all(|u| !u.ends_with("/4")));
    }

    #[tokio::test]
    async fn test_fetch_failure_ends_crawl() {
        let source = ScriptedSource::default().with_page(1, listing(&["PH-BXA"]));
        let crawler = CategoryCrawler::new(&source, BASE, "ACE");

        let outcome = crawler.crawl(10).await;

        assert_eq!(regs(&outcome.rows), vec!["PH-BXA"]);
        assert_eq!(outcome.stop, StopReason::FetchFailed(2));
    }

    #[tokio::test]
    async fn test_page_limit() {
        let source = ScriptedSource::default()
            .with_page(1, listing(&["D-AAAA"]))
            .with_page(2, listing(&["D-BBBB"]))
            .with_page(3, listing(&["D-CCCC"]));
        let crawler = CategoryCrawler::new(&source, BASE, "ACE");

        let outcome = crawler.crawl(2).await;

        assert_eq!(regs(&outcome.rows), vec!["D-AAAA", "D-BBBB"]);
        assert_eq!(outcome.stop, StopReason::PageLimit);
        assert_eq!(source.requested().len(), 2);
    }

    #[test]
    fn test_zero_max_pages_fetches_nothing() {
        let source = ScriptedSource::default().with_page(1, listing(&["D-AAAA"]));
        let crawler = CategoryCrawler::new(&source, BASE, "ACE");

        let rows = tokio_test::block_on(crawler.crawl_category(0));

        assert!(rows.is_empty());
        assert!(source.requested().is_empty());
    }
}
