use serde::{Deserialize, Serialize};
use std::fmt;

use crate::metrics::TextMetrics;

/// One row of the input list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleInput {
    #[serde(rename = "URL_ID")]
    pub id: String,
    #[serde(rename = "URL")]
    pub url: String,
}

impl ArticleInput {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

impl fmt::Display for ArticleInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.url)
    }
}

/// What an article source hands back for a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedArticle {
    pub title: Option<String>,
    pub text: String,
}

/// Metrics for one article, keyed by its input identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(rename = "URL_ID")]
    pub url_id: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(flatten)]
    pub metrics: TextMetrics,
}

impl MetricRecord {
    pub const ID_COLUMN: &'static str = "URL_ID";
    pub const URL_COLUMN: &'static str = "URL";

    pub fn new(input: &ArticleInput, metrics: TextMetrics) -> Self {
        Self {
            url_id: input.id.clone(),
            url: input.url.clone(),
            metrics,
        }
    }

    /// Header row: identity columns followed by the metric columns.
    pub fn header() -> Vec<&'static str> {
        let mut header = vec![Self::ID_COLUMN, Self::URL_COLUMN];
        header.extend(TextMetrics::COLUMNS);
        header
    }

    /// Data row aligned with [`Self::header`].
    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![self.url_id.clone(), self.url.clone()];
        row.extend(self.metrics.values());
        row
    }
}
