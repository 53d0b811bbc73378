use textscore_core::metrics::TextMetrics;

/// Format the metrics of a single text as a Markdown table.
pub fn format_metrics(source: &str, metrics: &TextMetrics) -> String {
    let mut out = String::new();

    out.push_str("# textscore - Text Metrics\n\n");
    out.push_str(&format!("**Source:** `{source}`\n\n"));

    if metrics.is_empty() {
        out.push_str("> No scorable words found; all metrics are zero.\n\n");
    }

    out.push_str("| Metric | Value |\n");
    out.push_str("|--------|-------|\n");
    for (column, value) in TextMetrics::COLUMNS.iter().zip(metrics.values()) {
        out.push_str(&format!("| {column} | {value} |\n"));
    }

    out
}
