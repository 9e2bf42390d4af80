use std::path::PathBuf;
use thiserror::Error;

/// Failure writing to or preparing the page cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("could not create cache directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not write cache entry {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Failure of a single GET attempt. Never escapes the fetch layer.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        source: reqwest::Error,
    },
}
