//! Write-once page cache.
//!
//! Pages are keyed by a sanitized form of their URL. An entry is written the
//! first time a fetch succeeds and is served from then on without touching the
//! network. There is no expiry and no invalidation; delete the file (or the
//! whole directory) to force a refetch.

use crate::error::CacheError;
use crate::scraper::PageSource;
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};
use tracing::{debug, warn};

static UNSAFE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]+").unwrap());

/// Cache key for a URL: trailing `/` dropped, each run of characters outside
/// `[A-Za-z0-9_-]` replaced by one `_`.
///
/// `https://aviation-safety.net/asndb/cat/ACE/2` → `https_aviation-safety_net_asndb_cat_ACE_2`
pub fn cache_key(url: &str) -> String {
    UNSAFE_RUN_RE
        .replace_all(url.trim_end_matches('/'), "_")
        .into_owned()
}

// ── Store trait ───────────────────────────────────────────────────────────────

/// Key/value store for raw page text.
pub trait PageCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, text: &str) -> Result<(), CacheError>;
}

// ── File-backed ───────────────────────────────────────────────────────────────

/// One `{key}.html` file per page under `dir`.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.html"))
    }
}

impl PageCache for FileCache {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match std::fs::read(&path) {
            // pages are not guaranteed to be valid UTF-8
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Unreadable cache entry {:?}: {}", path, e);
                None
            }
        }
    }

    fn put(&self, key: &str, text: &str) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| CacheError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(key);
        std::fs::write(&path, text).map_err(|source| CacheError::Write { path, source })
    }
}

// ── In-memory ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PageCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, text: &str) -> Result<(), CacheError> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), text.to_string());
        }
        Ok(())
    }
}

// ── Cached source ─────────────────────────────────────────────────────────────

/// A [`PageSource`] that consults a [`PageCache`] before the wrapped source
/// and stores every successful fetch.
pub struct CachedSource<S, C> {
    inner: S,
    cache: C,
}

impl<S, C> CachedSource<S, C> {
    pub fn new(inner: S, cache: C) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }
}

#[async_trait]
impl<S: PageSource, C: PageCache> PageSource for CachedSource<S, C> {
    async fn fetch(&self, url: &str) -> Option<String> {
        let key = cache_key(url);

        if let Some(text) = self.cache.get(&key) {
            debug!("Cache hit {}", key);
            return Some(text);
        }

        debug!("Cache miss {}", key);
        // an empty body is "no content": never persisted, never served
        let text = self.inner.fetch(url).await.filter(|t| !t.is_empty())?;

        if let Err(e) = self.cache.put(&key, &text) {
            warn!("{}", e);
        }
        Some(text)
    }
}
