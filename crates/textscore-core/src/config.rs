use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

pub const CONFIG_FILE: &str = ".textscore.toml";

/// Top-level configuration from `.textscore.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub lexicon: LexiconConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Locations of the word-list resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconConfig {
    #[serde(default = "default_stop_words_dir")]
    pub stop_words_dir: PathBuf,
    /// File-name glob selecting the stop-word lists inside `stop_words_dir`.
    #[serde(default = "default_stop_words_pattern")]
    pub stop_words_pattern: String,
    #[serde(default = "default_positive_words")]
    pub positive_words: PathBuf,
    #[serde(default = "default_negative_words")]
    pub negative_words: PathBuf,
}

fn default_stop_words_dir() -> PathBuf {
    PathBuf::from("StopWords")
}

fn default_stop_words_pattern() -> String {
    "*.txt".to_string()
}

fn default_positive_words() -> PathBuf {
    PathBuf::from("MasterDictionary/positive-words.txt")
}

fn default_negative_words() -> PathBuf {
    PathBuf::from("MasterDictionary/negative-words.txt")
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            stop_words_dir: default_stop_words_dir(),
            stop_words_pattern: default_stop_words_pattern(),
            positive_words: default_positive_words(),
            negative_words: default_negative_words(),
        }
    }
}

/// Batch input/output and worker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_input")]
    pub input: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Worker threads; 0 uses one per CPU.
    #[serde(default)]
    pub jobs: usize,
    /// Records are flushed to the output after every chunk of this many articles.
    #[serde(default = "default_checkpoint_every")]
    pub checkpoint_every: usize,
}

fn default_input() -> PathBuf {
    PathBuf::from("Input.csv")
}

fn default_output() -> PathBuf {
    PathBuf::from("Output.csv")
}

fn default_checkpoint_every() -> usize {
    16
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            jobs: 0,
            checkpoint_every: default_checkpoint_every(),
        }
    }
}

/// HTTP fetching, politeness delay, retries and HTML extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts after a transient failure.
    #[serde(default)]
    pub retries: u32,
    /// Multiplied by the attempt number between retries.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_delay_min_ms")]
    pub delay_min_ms: u64,
    #[serde(default = "default_delay_max_ms")]
    pub delay_max_ms: u64,
    #[serde(default = "default_title_selectors")]
    pub title_selectors: Vec<String>,
    #[serde(default = "default_content_selectors")]
    pub content_selectors: Vec<String>,
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_retry_backoff_ms() -> u64 {
    2000
}

fn default_delay_min_ms() -> u64 {
    1000
}

fn default_delay_max_ms() -> u64 {
    3000
}

fn default_title_selectors() -> Vec<String> {
    vec!["h1".to_string(), "title".to_string()]
}

fn default_content_selectors() -> Vec<String> {
    vec!["div.td-post-content".to_string(), "article".to_string()]
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            delay_min_ms: default_delay_min_ms(),
            delay_max_ms: default_delay_max_ms(),
            title_selectors: default_title_selectors(),
            content_selectors: default_content_selectors(),
            cache_dir: None,
        }
    }
}

impl FetchConfig {
    /// The politeness delay bounds in order, whatever order they were configured in.
    pub fn delay_range_ms(&self) -> (u64, u64) {
        if self.delay_min_ms <= self.delay_max_ms {
            (self.delay_min_ms, self.delay_max_ms)
        } else {
            (self.delay_max_ms, self.delay_min_ms)
        }
    }
}

impl Config {
    /// Load configuration from a `.textscore.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "failed to parse '{}'. Run `textscore init` to create a valid config file",
                path.display()
            )
        })?;
        Ok(config)
    }

    /// Load from `.textscore.toml` in the given directory or any ancestor, or return defaults.
    pub fn load_or_default(dir: &Path) -> Self {
        let start = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        let mut current = start.as_path();
        loop {
            let config_path = current.join(CONFIG_FILE);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => config,
                    Err(e) => {
                        warn!(
                            path = %config_path.display(),
                            "failed to load config: {:#}. Using defaults.",
                            e
                        );
                        Self::default()
                    }
                };
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        Self::default()
    }

    /// Generate default TOML content for `textscore init`.
    pub fn default_toml() -> String {
        r#"# textscore - article readability and sentiment metrics

[lexicon]
# Every file in this directory matching the pattern is read as a stop-word list
stop_words_dir = "StopWords"
stop_words_pattern = "*.txt"
positive_words = "MasterDictionary/positive-words.txt"
negative_words = "MasterDictionary/negative-words.txt"

[batch]
# CSV with URL_ID and URL columns
input = "Input.csv"
# URLs already present here are skipped on the next run
output = "Output.csv"
# Worker threads (0 = one per CPU)
jobs = 0
checkpoint_every = 16

[fetch]
timeout_secs = 15
retries = 0
retry_backoff_ms = 2000
# Random pause before each request, in milliseconds
delay_min_ms = 1000
delay_max_ms = 3000
title_selectors = ["h1", "title"]
content_selectors = ["div.td-post-content", "article"]
# Keep extracted article text on disk and reuse it on later runs
# cache_dir = ".textscore/cache"
"#
        .to_string()
    }
}
