use serde::Serialize;

use textscore_core::metrics::TextMetrics;
use textscore_core::pipeline::BatchSummary;

/// Metrics for one text, tagged with where the text came from.
#[derive(Debug, Serialize)]
pub struct MetricsOutput<'a> {
    pub source: &'a str,
    pub metrics: &'a TextMetrics,
}

/// Format the metrics of a single text as JSON.
pub fn format_metrics(source: &str, metrics: &TextMetrics, compact: bool) -> String {
    to_json(&MetricsOutput { source, metrics }, compact)
}

/// Format a batch summary as JSON.
pub fn format_summary(summary: &BatchSummary, compact: bool) -> String {
    to_json(summary, compact)
}

fn to_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> String {
    if compact {
        serde_json::to_string(value).expect("report should be serializable")
    } else {
        serde_json::to_string_pretty(value).expect("report should be serializable")
    }
}
