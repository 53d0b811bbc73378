pub mod cache;
pub mod config;
pub mod error;
pub mod lexicon;
pub mod metrics;
pub mod output;
pub mod pipeline;
pub mod source;
pub mod syllable;
pub mod tokenizer;
pub mod types;

pub use cache::{ArticleCache, CachedSource};
pub use config::Config;
pub use error::{FetchError, LexiconError};
pub use lexicon::{Lexicon, Lexicons};
pub use metrics::{compute_metrics, TextMetrics};
pub use output::OutputStore;
pub use pipeline::{BatchPipeline, BatchSummary, FailedArticle};
pub use source::ArticleSource;
pub use types::*;
