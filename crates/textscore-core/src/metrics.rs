use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::lexicon::Lexicon;
use crate::syllable::{count_syllables, is_complex_word};
use crate::tokenizer::{tokenize, TokenStream};

/// Guards the sentiment ratios against a zero denominator.
const EPSILON: f64 = 0.000001;

/// Weight applied to the Gunning fog sum.
const FOG_WEIGHT: f64 = 0.4;

/// First-person pronouns, matched as whole words in the raw text.
static PERSONAL_PRONOUNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:I|we|my|ours|us)\b").expect("personal pronoun pattern is valid")
});

/// Readability and sentiment metrics for one article.
///
/// Serialized names are the column headers of the output file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    #[serde(rename = "POSITIVE SCORE")]
    pub positive_score: usize,
    #[serde(rename = "NEGATIVE SCORE")]
    pub negative_score: usize,
    #[serde(rename = "POLARITY SCORE")]
    pub polarity_score: f64,
    #[serde(rename = "SUBJECTIVITY SCORE")]
    pub subjectivity_score: f64,
    #[serde(rename = "AVG SENTENCE LENGTH")]
    pub avg_sentence_length: f64,
    /// Fraction of words that are complex, in `[0, 1]`.
    #[serde(rename = "PERCENTAGE OF COMPLEX WORDS")]
    pub percent_complex_words: f64,
    #[serde(rename = "FOG INDEX")]
    pub fog_index: f64,
    /// Same value as `avg_sentence_length`.
    #[serde(rename = "AVG NUMBER OF WORDS PER SENTENCE")]
    pub avg_words_per_sentence: f64,
    #[serde(rename = "COMPLEX WORD COUNT")]
    pub complex_word_count: usize,
    #[serde(rename = "WORD COUNT")]
    pub word_count: usize,
    #[serde(rename = "SYLLABLE PER WORD")]
    pub syllables_per_word: f64,
    #[serde(rename = "PERSONAL PRONOUNS")]
    pub personal_pronouns: usize,
    #[serde(rename = "AVG WORD LENGTH")]
    pub avg_word_length: f64,
}

impl TextMetrics {
    /// Column names, in output order.
    pub const COLUMNS: [&'static str; 13] = [
        "POSITIVE SCORE",
        "NEGATIVE SCORE",
        "POLARITY SCORE",
        "SUBJECTIVITY SCORE",
        "AVG SENTENCE LENGTH",
        "PERCENTAGE OF COMPLEX WORDS",
        "FOG INDEX",
        "AVG NUMBER OF WORDS PER SENTENCE",
        "COMPLEX WORD COUNT",
        "WORD COUNT",
        "SYLLABLE PER WORD",
        "PERSONAL PRONOUNS",
        "AVG WORD LENGTH",
    ];

    /// Values formatted for a tabular row, aligned with [`Self::COLUMNS`].
    pub fn values(&self) -> [String; 13] {
        [
            self.positive_score.to_string(),
            self.negative_score.to_string(),
            self.polarity_score.to_string(),
            self.subjectivity_score.to_string(),
            self.avg_sentence_length.to_string(),
            self.percent_complex_words.to_string(),
            self.fog_index.to_string(),
            self.avg_words_per_sentence.to_string(),
            self.complex_word_count.to_string(),
            self.word_count.to_string(),
            self.syllables_per_word.to_string(),
            self.personal_pronouns.to_string(),
            self.avg_word_length.to_string(),
        ]
    }

    /// True for the all-zero record produced when no words or sentences survive tokenization.
    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }
}

/// Compute the full metric set for `text`.
///
/// Sentiment membership is exact: tokens are lower-cased but lexicon entries
/// keep their original case, so a capitalised entry never matches. Text with
/// no surviving words or no sentences yields an all-zero record.
pub fn compute_metrics(
    text: &str,
    stop_words: &Lexicon,
    positive: &Lexicon,
    negative: &Lexicon,
) -> TextMetrics {
    let TokenStream { sentences, words } = tokenize(text, stop_words);
    if words.is_empty() || sentences.is_empty() {
        return TextMetrics::default();
    }

    let word_count = words.len();
    let total = word_count as f64;

    let positive_score = words.iter().filter(|w| positive.contains(w)).count();
    let negative_score = words.iter().filter(|w| negative.contains(w)).count();
    let sentiment_hits = (positive_score + negative_score) as f64;
    let polarity_score =
        (positive_score as f64 - negative_score as f64) / (sentiment_hits + EPSILON);
    let subjectivity_score = sentiment_hits / (total + EPSILON);

    let avg_sentence_length = total / sentences.len() as f64;

    let complex_word_count = words.iter().filter(|w| is_complex_word(w)).count();
    let percent_complex_words = complex_word_count as f64 / total;
    let fog_index = FOG_WEIGHT * (avg_sentence_length + percent_complex_words);
    let syllables_per_word =
        words.iter().map(|w| count_syllables(w)).sum::<usize>() as f64 / total;

    let personal_pronouns = PERSONAL_PRONOUNS.find_iter(text).count();
    let avg_word_length = words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / total;

    TextMetrics {
        positive_score,
        negative_score,
        polarity_score,
        subjectivity_score,
        avg_sentence_length,
        percent_complex_words,
        fog_index,
        avg_words_per_sentence: avg_sentence_length,
        complex_word_count,
        word_count,
        syllables_per_word,
        personal_pronouns,
        avg_word_length,
    }
}
