use std::path::PathBuf;

use thiserror::Error;

/// Failure to build a lexicon from its word-list resource.
///
/// Callers are expected to log these and carry on with an empty lexicon;
/// see [`crate::lexicon::Lexicons::load`].
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("word-list resource not found at '{}'", path.display())]
    ResourceMissing { path: PathBuf },

    #[error("failed to read word list '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid word-list file pattern '{pattern}'")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Failure reported by an article source for a single URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid article URL '{0}'")]
    InvalidUrl(String),
}

impl FetchError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Io { .. } | FetchError::InvalidUrl(_) => false,
        }
    }
}
