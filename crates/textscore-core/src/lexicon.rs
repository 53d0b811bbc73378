use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::Glob;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::LexiconConfig;
use crate::error::LexiconError;
use crate::metrics::{compute_metrics, TextMetrics};

/// An immutable set of words used for membership tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    words: HashSet<String>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a lexicon from any collection of words, stored as given.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact, case-sensitive membership.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Drop every entry whose lower-cased form is in `stop_words`.
    fn without_stop_words(self, stop_words: &Lexicon) -> Self {
        Self {
            words: self
                .words
                .into_iter()
                .filter(|w| !stop_words.contains(&w.to_lowercase()))
                .collect(),
        }
    }
}

/// Word lists are single-byte text; map each byte straight to its code point.
fn read_latin1(path: &Path) -> Result<String, LexiconError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LexiconError::ResourceMissing {
                path: path.to_path_buf(),
            }
        } else {
            LexiconError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    Ok(bytes.iter().map(|&b| char::from(b)).collect())
}

fn entries(content: &str) -> impl Iterator<Item = &str> {
    content.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Load and union every word list in `dir` whose file name matches `pattern`.
///
/// Entries are trimmed and lower-cased. Only files directly inside `dir` are
/// read, in file-name order.
pub fn load_stop_words(dir: &Path, pattern: &str) -> Result<Lexicon, LexiconError> {
    if !dir.is_dir() {
        return Err(LexiconError::ResourceMissing {
            path: dir.to_path_buf(),
        });
    }

    let matcher = Glob::new(pattern)
        .map_err(|source| LexiconError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?
        .compile_matcher();

    let files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && matcher.is_match(e.file_name()))
        .map(|e| e.into_path())
        .collect();

    let mut words = HashSet::new();
    for file in &files {
        let content = read_latin1(file)?;
        let before = words.len();
        words.extend(entries(&content).map(str::to_lowercase));
        debug!(path = %file.display(), added = words.len() - before, "read stop-word list");
    }

    Ok(Lexicon { words })
}

/// Load a sentiment word list, keeping each entry's original case and
/// excluding entries whose lower-cased form is a stop word.
pub fn load_sentiment_words(path: &Path, stop_words: &Lexicon) -> Result<Lexicon, LexiconError> {
    let content = read_latin1(path)?;
    Ok(Lexicon::from_words(entries(&content)).without_stop_words(stop_words))
}

/// The three lexicons every metric computation reads.
///
/// Built once per batch and shared by reference; the sentiment lexicons never
/// contain a stop word.
#[derive(Debug, Clone, Default)]
pub struct Lexicons {
    stop_words: Lexicon,
    positive: Lexicon,
    negative: Lexicon,
}

impl Lexicons {
    pub fn new(stop_words: Lexicon, positive: Lexicon, negative: Lexicon) -> Self {
        let positive = positive.without_stop_words(&stop_words);
        let negative = negative.without_stop_words(&stop_words);
        Self {
            stop_words,
            positive,
            negative,
        }
    }

    /// Load all three lexicons from the configured resources.
    ///
    /// A missing or unreadable resource is logged and replaced by an empty
    /// lexicon, so scoring always proceeds (with degraded sentiment scores).
    pub fn load(config: &LexiconConfig) -> Self {
        let stop_words = load_stop_words(&config.stop_words_dir, &config.stop_words_pattern)
            .unwrap_or_else(|e| {
                warn!(error = %e, "using an empty stop-word list");
                Lexicon::new()
            });

        let load_sentiment = |path: &Path, kind: &str| {
            load_sentiment_words(path, &stop_words).unwrap_or_else(|e| {
                warn!(error = %e, "using an empty {} word list", kind);
                Lexicon::new()
            })
        };
        let positive = load_sentiment(&config.positive_words, "positive");
        let negative = load_sentiment(&config.negative_words, "negative");

        info!(
            stop_words = stop_words.len(),
            positive = positive.len(),
            negative = negative.len(),
            "lexicons loaded"
        );

        Self {
            stop_words,
            positive,
            negative,
        }
    }

    pub fn stop_words(&self) -> &Lexicon {
        &self.stop_words
    }

    pub fn positive(&self) -> &Lexicon {
        &self.positive
    }

    pub fn negative(&self) -> &Lexicon {
        &self.negative
    }

    /// Compute the metric set for one article's text.
    pub fn score(&self, text: &str) -> TextMetrics {
        compute_metrics(text, &self.stop_words, &self.positive, &self.negative)
    }
}
