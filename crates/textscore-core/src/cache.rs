use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::source::ArticleSource;
use crate::types::FetchedArticle;

/// Cache entry for a single URL's extracted article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedArticle {
    pub url: String,
    pub fetched_at: String,
    pub article: FetchedArticle,
}

/// Extracted article text stored as one JSON file per URL.
#[derive(Debug, Clone)]
pub struct ArticleCache {
    dir: PathBuf,
}

impl ArticleCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Location of the entry for `url`, named by the hash of the URL.
    pub fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", compute_hash(url)))
    }

    /// Load the cached entry for `url`, if present and readable.
    pub fn get(&self, url: &str) -> Option<CachedArticle> {
        let path = self.entry_path(url);
        if !path.exists() {
            return None;
        }
        let loaded = std::fs::read_to_string(&path)
            .context("failed to read cache entry")
            .and_then(|content| {
                serde_json::from_str::<CachedArticle>(&content)
                    .context("failed to parse cache entry")
            });
        match loaded {
            Ok(entry) if entry.url == url => Some(entry),
            Ok(_) => None,
            Err(e) => {
                warn!(path = %path.display(), "ignoring cache entry: {:#}", e);
                None
            }
        }
    }

    /// Store `article` as the entry for `url`.
    pub fn insert(&self, url: &str, article: &FetchedArticle) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let entry = CachedArticle {
            url: url.to_string(),
            fetched_at: Utc::now().to_rfc3339(),
            article: article.clone(),
        };
        let content =
            serde_json::to_string_pretty(&entry).context("failed to serialize cache entry")?;
        let path = self.entry_path(url);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Compute SHA-256 hash of a string.
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// An article source that serves repeat URLs from an [`ArticleCache`].
///
/// Only successful fetches are stored.
pub struct CachedSource<S> {
    inner: S,
    cache: ArticleCache,
}

impl<S: ArticleSource> CachedSource<S> {
    pub fn new(inner: S, cache: ArticleCache) -> Self {
        Self { inner, cache }
    }
}

impl<S: ArticleSource> ArticleSource for CachedSource<S> {
    fn name(&self) -> &'static str {
        "cache"
    }

    fn fetch(&self, url: &str) -> Result<FetchedArticle, FetchError> {
        if let Some(hit) = self.cache.get(url) {
            debug!(%url, fetched_at = %hit.fetched_at, "serving article from cache");
            return Ok(hit.article);
        }

        let article = self.inner.fetch(url)?;
        if let Err(e) = self.cache.insert(url, &article) {
            warn!(%url, "failed to cache article: {:#}", e);
        }
        Ok(article)
    }
}
