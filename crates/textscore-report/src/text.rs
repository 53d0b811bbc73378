use colored::Colorize;

use textscore_core::metrics::TextMetrics;
use textscore_core::pipeline::BatchSummary;

/// Format the metrics of a single text for terminal output.
pub fn format_metrics(source: &str, metrics: &TextMetrics) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", "textscore - Text Metrics".bold()));
    out.push_str(&format!("{}\n", "=".repeat(40)));
    out.push_str(&format!("{}: {}\n\n", "Source".bold(), source));

    if metrics.is_empty() {
        out.push_str(&format!(
            "{}\n\n",
            "No scorable words found; all metrics are zero.".yellow()
        ));
    }

    // Sentiment
    out.push_str(&format!("{}\n{}\n", "Sentiment".bold(), "-".repeat(40)));
    out.push_str(&format!("  Positive score:        {}\n", metrics.positive_score));
    out.push_str(&format!("  Negative score:        {}\n", metrics.negative_score));
    out.push_str(&format!(
        "  Polarity:              {}\n",
        polarity_colored(metrics.polarity_score)
    ));
    out.push_str(&format!(
        "  Subjectivity:          {:.4}\n",
        metrics.subjectivity_score
    ));

    // Readability
    out.push_str(&format!("\n{}\n{}\n", "Readability".bold(), "-".repeat(40)));
    out.push_str(&format!(
        "  Fog index:             {}\n",
        fog_colored(metrics.fog_index)
    ));
    out.push_str(&format!(
        "  Avg sentence length:   {:.2} words\n",
        metrics.avg_sentence_length
    ));
    out.push_str(&format!(
        "  Complex words:         {} ({:.2}%)\n",
        metrics.complex_word_count,
        metrics.percent_complex_words * 100.0
    ));

    // Counts
    out.push_str(&format!("\n{}\n{}\n", "Words".bold(), "-".repeat(40)));
    out.push_str(&format!("  Word count:            {}\n", metrics.word_count));
    out.push_str(&format!(
        "  Syllables per word:    {:.2}\n",
        metrics.syllables_per_word
    ));
    out.push_str(&format!(
        "  Avg word length:       {:.2}\n",
        metrics.avg_word_length
    ));
    out.push_str(&format!(
        "  Personal pronouns:     {}\n",
        metrics.personal_pronouns
    ));

    out.push('\n');
    out
}

fn polarity_colored(polarity: f64) -> String {
    let s = format!("{polarity:.4}");
    if polarity > 0.0 {
        s.green().to_string()
    } else if polarity < 0.0 {
        s.red().to_string()
    } else {
        s
    }
}

fn fog_colored(fog: f64) -> String {
    let s = format!("{fog:.2}");
    if fog < 12.0 {
        s.green().to_string()
    } else if fog < 18.0 {
        s.yellow().to_string()
    } else {
        s.red().to_string()
    }
}

/// Format the outcome of a batch run.
pub fn format_summary(summary: &BatchSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", "textscore - Batch Summary".bold()));
    out.push_str(&format!("{}\n\n", "=".repeat(40)));

    out.push_str(&format!("  Input rows:            {}\n", summary.input_rows));
    out.push_str(&format!(
        "  Scored:                {}\n",
        summary.scored.to_string().green()
    ));
    if summary.empty_text > 0 {
        out.push_str(&format!(
            "    of which empty:      {}\n",
            summary.empty_text.to_string().yellow()
        ));
    }
    out.push_str(&format!(
        "  Already recorded:      {}\n",
        summary.already_recorded
    ));
    out.push_str(&format!("  Duplicates:            {}\n", summary.duplicates));
    out.push_str(&format!(
        "  Output:                {}\n",
        summary.output.display()
    ));

    if summary.failed.is_empty() {
        out.push_str(&format!("\n{}\n", "All articles fetched.".green().bold()));
    } else {
        out.push_str(&format!(
            "\n{} ({} articles)\n{}\n",
            "Failed".red().bold(),
            summary.failed.len(),
            "-".repeat(40),
        ));
        for failed in &summary.failed {
            out.push_str(&format!("  {} {}\n", failed.id.bold(), failed.url));
            out.push_str(&format!("    {}\n", failed.error));
        }
    }

    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use textscore_core::pipeline::FailedArticle;

    fn sample_metrics() -> TextMetrics {
        TextMetrics {
            positive_score: 3,
            negative_score: 1,
            polarity_score: 0.5,
            subjectivity_score: 0.4,
            avg_sentence_length: 5.0,
            percent_complex_words: 0.2,
            fog_index: 2.08,
            avg_words_per_sentence: 5.0,
            complex_word_count: 2,
            word_count: 10,
            syllables_per_word: 1.4,
            personal_pronouns: 1,
            avg_word_length: 4.5,
        }
    }

    fn sample_summary(failed: bool) -> BatchSummary {
        BatchSummary {
            output: PathBuf::from("Output.csv"),
            input_rows: 4,
            already_recorded: 1,
            duplicates: 1,
            scored: 1,
            empty_text: 0,
            failed: if failed {
                vec![FailedArticle {
                    id: "blackassign0002".to_string(),
                    url: "https://example.com/gone".to_string(),
                    error: "https://example.com/gone responded with HTTP 404".to_string(),
                }]
            } else {
                vec![]
            },
            started_at: "2024-01-01T00:00:00+00:00".to_string(),
            finished_at: "2024-01-01T00:00:05+00:00".to_string(),
        }
    }

    #[test]
    fn test_format_metrics() {
        let out = format_metrics("article.txt", &sample_metrics());
        assert!(out.contains("article.txt"));
        assert!(out.contains("Word count:            10"));
        assert!(out.contains("Complex words:         2 (20.00%)"));
        assert!(out.contains("Personal pronouns:     1"));
        assert!(!out.contains("No scorable words"));
    }

    #[test]
    fn test_format_metrics_empty() {
        let out = format_metrics("stdin", &TextMetrics::default());
        assert!(out.contains("No scorable words"));
        assert!(out.contains("Word count:            0"));
    }

    #[test]
    fn test_format_summary_lists_failures() {
        let out = format_summary(&sample_summary(true));
        assert!(out.contains("Input rows:            4"));
        assert!(out.contains("Failed"));
        assert!(out.contains("https://example.com/gone"));
        assert!(out.contains("HTTP 404"));
    }

    #[test]
    fn test_format_summary_without_failures() {
        let out = format_summary(&sample_summary(false));
        assert!(out.contains("All articles fetched."));
        assert!(out.contains("Output.csv"));
    }
}
