//! Listing-page scraper for the Aviation Safety Network database.
//!
//! Crawls one incident category page by page, caches every fetched page on
//! disk, extracts the summary rows of each listing table and normalizes the
//! aircraft registrations found in them.

pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod registration;
pub mod scraper;
pub mod utils;

pub use cache::{CachedSource, FileCache, MemoryCache, PageCache, cache_key};
pub use error::{CacheError, FetchError};
pub use models::ListingRow;
pub use registration::{RegistrationShape, normalize_registration};
pub use self::scraper::parsers::parse_listing_page;
pub use self::scraper::{CategoryCrawler, CrawlOutcome, PageSource, StopReason};
