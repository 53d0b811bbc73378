use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::BatchConfig;
use crate::lexicon::Lexicons;
use crate::output::{read_inputs, OutputStore};
use crate::source::ArticleSource;
use crate::types::{ArticleInput, MetricRecord};

/// An article that was skipped because its source could not be fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedArticle {
    pub id: String,
    pub url: String,
    pub error: String,
}

/// What a batch run did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub output: PathBuf,
    pub input_rows: usize,
    /// Skipped because the output already holds a record for the URL.
    pub already_recorded: usize,
    /// Skipped because the URL appeared earlier in the same input.
    pub duplicates: usize,
    pub scored: usize,
    /// Scored articles whose text yielded no words or sentences.
    pub empty_text: usize,
    pub failed: Vec<FailedArticle>,
    pub started_at: String,
    pub finished_at: String,
}

impl BatchSummary {
    pub fn skipped(&self) -> usize {
        self.already_recorded + self.duplicates
    }
}

enum Outcome {
    Scored(MetricRecord),
    Failed(FailedArticle),
}

/// Fetches and scores a list of articles, recording results to an output store.
pub struct BatchPipeline {
    source: Box<dyn ArticleSource>,
    lexicons: Lexicons,
    config: BatchConfig,
}

impl BatchPipeline {
    pub fn new(source: Box<dyn ArticleSource>, lexicons: Lexicons, config: BatchConfig) -> Self {
        Self {
            source,
            lexicons,
            config,
        }
    }

    /// Run over the configured input file, appending to the configured output.
    pub fn run(&self) -> Result<BatchSummary> {
        let inputs = read_inputs(&self.config.input)?;
        let store = OutputStore::new(&self.config.output);
        self.run_inputs(&inputs, &store)
    }

    /// Score every input whose URL has no record in `store` yet.
    ///
    /// Articles are processed in chunks of `checkpoint_every`; each chunk is
    /// fanned out over the worker pool and its records appended, in input
    /// order, before the next chunk starts.
    pub fn run_inputs(&self, inputs: &[ArticleInput], store: &OutputStore) -> Result<BatchSummary> {
        let started_at = Utc::now().to_rfc3339();
        let mut seen = store.recorded_urls()?;

        let mut summary = BatchSummary {
            output: store.path().to_path_buf(),
            input_rows: inputs.len(),
            already_recorded: 0,
            duplicates: 0,
            scored: 0,
            empty_text: 0,
            failed: Vec::new(),
            started_at,
            finished_at: String::new(),
        };

        let recorded: HashSet<String> = seen.clone();
        let mut pending = Vec::new();
        for input in inputs {
            if recorded.contains(&input.url) {
                info!(url_id = %input.id, "skipping already processed URL");
                summary.already_recorded += 1;
            } else if !seen.insert(input.url.clone()) {
                info!(url_id = %input.id, url = %input.url, "skipping duplicate URL");
                summary.duplicates += 1;
            } else {
                pending.push(input);
            }
        }

        if pending.is_empty() {
            info!("nothing to process");
            summary.finished_at = Utc::now().to_rfc3339();
            return Ok(summary);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs)
            .build()
            .context("failed to build worker pool")?;
        info!(
            articles = pending.len(),
            workers = pool.current_num_threads(),
            source = self.source.name(),
            "processing articles"
        );

        for chunk in pending.chunks(self.config.checkpoint_every.max(1)) {
            let outcomes: Vec<Outcome> =
                pool.install(|| chunk.par_iter().map(|input| self.process(input)).collect());

            let mut records = Vec::with_capacity(outcomes.len());
            for outcome in outcomes {
                match outcome {
                    Outcome::Scored(record) => {
                        if record.metrics.is_empty() {
                            summary.empty_text += 1;
                        }
                        records.push(record);
                    }
                    Outcome::Failed(failed) => summary.failed.push(failed),
                }
            }

            store.append(&records)?;
            summary.scored += records.len();
        }

        summary.finished_at = Utc::now().to_rfc3339();
        info!(
            scored = summary.scored,
            failed = summary.failed.len(),
            skipped = summary.skipped(),
            output = %summary.output.display(),
            "batch complete"
        );
        Ok(summary)
    }

    fn process(&self, input: &ArticleInput) -> Outcome {
        info!(url_id = %input.id, url = %input.url, "processing URL");
        match self.source.fetch(&input.url) {
            Ok(article) => {
                let metrics = self.lexicons.score(&article.text);
                Outcome::Scored(MetricRecord::new(input, metrics))
            }
            Err(e) => {
                warn!(url_id = %input.id, error = %e, "skipping URL due to fetch error");
                Outcome::Failed(FailedArticle {
                    id: input.id.clone(),
                    url: input.url.clone(),
                    error: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::lexicon::Lexicon;
    use crate::types::FetchedArticle;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Serves canned pages; unknown URLs fail with a 404.
    struct StaticSource {
        pages: HashMap<String, String>,
        calls: Arc<AtomicUsize>,
    }

    impl ArticleSource for StaticSource {
        fn name(&self) -> &'static str {
            "static"
        }

        fn fetch(&self, url: &str) -> Result<FetchedArticle, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.pages.get(url) {
                Some(text) => Ok(FetchedArticle {
                    title: None,
                    text: text.clone(),
                }),
                None => Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    fn pipeline(pages: &[(&str, &str)], jobs: usize) -> (BatchPipeline, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = StaticSource {
            pages: pages
                .iter()
                .map(|(u, t)| (u.to_string(), t.to_string()))
                .collect(),
            calls: Arc::clone(&calls),
        };
        let lexicons = Lexicons::new(
            Lexicon::from_words(["this", "it"]),
            Lexicon::from_words(["love", "great", "well"]),
            Lexicon::from_words(["broken"]),
        );
        let config = BatchConfig {
            jobs,
            checkpoint_every: 2,
            ..BatchConfig::default()
        };
        (BatchPipeline::new(Box::new(source), lexicons, config), calls)
    }

    fn inputs(urls: &[&str]) -> Vec<ArticleInput> {
        urls.iter()
            .enumerate()
            .map(|(i, u)| ArticleInput::new(format!("id{i}"), *u))
            .collect()
    }

    #[test]
    fn test_scores_articles_in_input_order() {
        let (pipeline, _) = pipeline(
            &[
                ("https://a", "I love this great product. It works well."),
                ("https://b", "It arrived broken."),
                ("https://c", "Plain words here."),
            ],
            3,
        );
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(dir.path().join("Output.csv"));

        let summary = pipeline
            .run_inputs(&inputs(&["https://a", "https://b", "https://c"]), &store)
            .unwrap();
        assert_eq!(summary.scored, 3);
        assert!(summary.failed.is_empty());

        let content = std::fs::read_to_string(store.path()).unwrap();
        let urls: Vec<_> = content
            .lines()
            .skip(1)
            .map(|l| l.split(',').nth(1).unwrap().to_string())
            .collect();
        assert_eq!(urls, vec!["https://a", "https://b", "https://c"]);
    }

    #[test]
    fn test_fetch_failures_are_skipped() {
        let (pipeline, _) = pipeline(&[("https://a", "Good text.")], 1);
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(dir.path().join("Output.csv"));

        let summary = pipeline
            .run_inputs(&inputs(&["https://a", "https://missing"]), &store)
            .unwrap();
        assert_eq!(summary.scored, 1);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].url, "https://missing");
        assert!(summary.failed[0].error.contains("404"));

        let urls = store.recorded_urls().unwrap();
        assert!(!urls.contains("https://missing"));
    }

    #[test]
    fn test_rerun_does_not_duplicate_records() {
        let (pipeline, calls) = pipeline(&[("https://a", "Text one."), ("https://b", "Text two.")], 2);
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(dir.path().join("Output.csv"));
        let list = inputs(&["https://a", "https://b"]);

        let first = pipeline.run_inputs(&list, &store).unwrap();
        assert_eq!(first.scored, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let second = pipeline.run_inputs(&list, &store).unwrap();
        assert_eq!(second.scored, 0);
        assert_eq!(second.already_recorded, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2, "recorded URLs are never fetched");

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_duplicate_urls_in_input_scored_once() {
        let (pipeline, calls) = pipeline(&[("https://a", "Text.")], 2);
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(dir.path().join("Output.csv"));

        let summary = pipeline
            .run_inputs(&inputs(&["https://a", "https://a"]), &store)
            .unwrap();
        assert_eq!(summary.scored, 1);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_text_yields_zero_record() {
        let (pipeline, _) = pipeline(&[("https://a", "")], 1);
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(dir.path().join("Output.csv"));

        let summary = pipeline.run_inputs(&inputs(&["https://a"]), &store).unwrap();
        assert_eq!(summary.scored, 1);
        assert_eq!(summary.empty_text, 1);
    }

    #[test]
    fn test_run_reads_configured_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("Input.csv");
        std::fs::write(&input, "URL_ID,URL\n1,https://a\n").unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let source = StaticSource {
            pages: HashMap::from([("https://a".to_string(), "We love it.".to_string())]),
            calls,
        };
        let config = BatchConfig {
            input,
            output: dir.path().join("Output.csv"),
            ..BatchConfig::default()
        };
        let pipeline = BatchPipeline::new(Box::new(source), Lexicons::default(), config);

        let summary = pipeline.run().unwrap();
        assert_eq!(summary.scored, 1);
        assert!(dir.path().join("Output.csv").exists());
    }
}
