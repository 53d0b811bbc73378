use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use rand::Rng;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use textscore_core::config::FetchConfig;
use textscore_core::error::FetchError;
use textscore_core::source::ArticleSource;
use textscore_core::types::FetchedArticle;

/// Elements whose text never counts as article content.
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Article source backed by a blocking HTTP client.
///
/// `file://` URLs are read straight from disk, without the politeness delay.
pub struct HttpArticleSource {
    client: Client,
    extractor: ArticleExtractor,
    delay_ms: Option<(u64, u64)>,
    retries: u32,
    retry_backoff: Duration,
}

impl HttpArticleSource {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        let extractor = ArticleExtractor::new(&config.title_selectors, &config.content_selectors)?;

        Ok(Self {
            client,
            extractor,
            delay_ms: Some(config.delay_range_ms()),
            retries: config.retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    /// Disable the random delay before each request.
    pub fn no_delay(mut self) -> Self {
        self.delay_ms = None;
        self
    }

    fn pause(&self) {
        let Some((min, max)) = self.delay_ms else {
            return;
        };
        if max == 0 {
            return;
        }
        let millis = rand::thread_rng().gen_range(min..=max);
        thread::sleep(Duration::from_millis(millis));
    }

    fn get(&self, url: &str) -> Result<String, FetchError> {
        let request_error = |e: reqwest::Error| FetchError::Request {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().map_err(request_error)
    }

    fn get_with_retries(&self, url: &str) -> Result<String, FetchError> {
        with_retries(url, self.retries, self.retry_backoff, || {
            self.pause();
            self.get(url)
        })
    }
}

/// Run `attempt` until it succeeds, fails permanently, or `retries` extra
/// attempts are spent. The n-th retry waits `backoff * n`.
fn with_retries<T>(
    url: &str,
    retries: u32,
    backoff: Duration,
    mut attempt: impl FnMut() -> Result<T, FetchError>,
) -> Result<T, FetchError> {
    let mut retried = 0;
    loop {
        match attempt() {
            Err(e) if e.is_transient() && retried < retries => {
                retried += 1;
                let wait = backoff * retried;
                warn!(
                    %url,
                    attempt = retried,
                    backoff_ms = wait.as_millis() as u64,
                    "retrying after error: {}",
                    e
                );
                thread::sleep(wait);
            }
            result => return result,
        }
    }
}

impl ArticleSource for HttpArticleSource {
    fn name(&self) -> &'static str {
        "http"
    }

    fn fetch(&self, url: &str) -> Result<FetchedArticle, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        let html = match parsed.scheme() {
            "http" | "https" => self.get_with_retries(url)?,
            "file" => {
                let path = parsed
                    .to_file_path()
                    .map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
                read_file(&path)?
            }
            _ => return Err(FetchError::InvalidUrl(url.to_string())),
        };
        debug!(%url, bytes = html.len(), "fetched page");
        Ok(self.extractor.extract(&html))
    }
}

fn read_file(path: &Path) -> Result<String, FetchError> {
    let bytes = std::fs::read(path).map_err(|source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Pulls the title and main text out of an HTML page.
pub struct ArticleExtractor {
    title: Vec<Selector>,
    content: Vec<Selector>,
}

impl ArticleExtractor {
    /// Compile the title and content selectors, each tried in order.
    pub fn new(title: &[String], content: &[String]) -> Result<Self> {
        Ok(Self {
            title: parse_selectors(title)?,
            content: parse_selectors(content)?,
        })
    }

    pub fn extract(&self, html: &str) -> FetchedArticle {
        let document = Html::parse_document(html);

        let title = first_match(&document, &self.title)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());

        let root = first_match(&document, &self.content).unwrap_or_else(|| document.root_element());
        let mut raw = String::new();
        collect_text(root, &mut raw);

        FetchedArticle {
            title,
            text: clean_text(&raw),
        }
    }
}

fn parse_selectors(selectors: &[String]) -> Result<Vec<Selector>> {
    selectors
        .iter()
        .map(|s| Selector::parse(s).map_err(|e| anyhow!("invalid CSS selector '{}': {}", s, e)))
        .collect()
}

fn first_match<'a>(document: &'a Html, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .find_map(|selector| document.select(selector).next())
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            if !SKIPPED_TAGS.contains(&child.value().name()) {
                collect_text(child, out);
            }
        }
    }
}

/// Trim every line and drop the blank ones.
pub fn clean_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
