use unicode_segmentation::UnicodeSegmentation;

use crate::lexicon::Lexicon;

/// Abbreviations after which a period does not end a sentence.
/// Single-letter initials and dotted initialisms ("U.S.", "e.g.") are
/// recognised separately.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "rev", "hon", "gen", "col", "capt", "lt", "sgt", "sr", "jr",
    "st", "mt", "ft", "vs", "inc", "ltd", "corp", "co", "dept", "univ", "approx", "est", "fig",
    "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

/// Words that usually open a sentence. A single-letter initial followed by
/// one of these ends its sentence ("plan B. It worked.").
const SENTENCE_OPENERS: &[&str] = &[
    "a", "an", "the", "i", "it", "he", "she", "we", "they", "you", "this", "that", "these",
    "those", "there", "then", "but", "and", "so", "in", "on", "at", "for", "if", "as", "when",
    "while", "after", "his", "her", "its", "our", "their", "my", "what", "however",
];

/// Clitics split off the end of a word, longest first for "n't".
const CLITICS: &[&str] = &["n't", "'s", "'m", "'re", "'ve", "'ll", "'d"];

/// Fused words tokenized as two ("cannot" -> "can" + "not").
const FUSED_WORDS: &[(&str, &str, &str)] = &[
    ("cannot", "can", "not"),
    ("gimme", "gim", "me"),
    ("gonna", "gon", "na"),
    ("gotta", "got", "ta"),
    ("lemme", "lem", "me"),
    ("wanna", "wan", "na"),
];

/// Sentences and filtered word tokens of one article.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    pub sentences: Vec<String>,
    /// Lower-cased, purely alphabetic, stop words removed.
    pub words: Vec<String>,
}

/// Split `text` into sentences and into normalized word tokens.
pub fn tokenize(text: &str, stop_words: &Lexicon) -> TokenStream {
    TokenStream {
        sentences: split_sentences(text),
        words: word_tokens(text, stop_words),
    }
}

/// Split text into sentences.
///
/// Uses Unicode sentence boundaries with line breaks treated as plain
/// whitespace, then re-joins boundaries that directly follow an abbreviation
/// such as "Mr." or "U.S.", or an initial that leads into a name.
pub fn split_sentences(text: &str) -> Vec<String> {
    let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let segments: Vec<&str> = flattened.split_sentence_bounds().collect();

    let mut sentences = Vec::new();
    let mut pending = String::new();
    for (i, segment) in segments.iter().enumerate() {
        pending.push_str(segment);
        let merge = match classify_period(&pending) {
            Period::Abbreviation => true,
            Period::Initial => segments
                .get(i + 1)
                .is_some_and(|next| !opens_sentence(next)),
            Period::Terminal => false,
        };
        if merge {
            continue;
        }
        push_sentence(&mut sentences, &pending);
        pending.clear();
    }
    push_sentence(&mut sentences, &pending);

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, candidate: &str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Period {
    /// Ends the sentence.
    Terminal,
    /// Follows a known abbreviation or dotted initialism.
    Abbreviation,
    /// Follows a single letter, which may be an initial or a word like "B".
    Initial,
}

fn classify_period(segment: &str) -> Period {
    let Some(body) = segment.trim_end().strip_suffix('.') else {
        return Period::Terminal;
    };
    let last = body.rsplit(char::is_whitespace).next().unwrap_or(body);
    let last = last
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    if last.is_empty() {
        return Period::Terminal;
    }
    if ABBREVIATIONS.contains(&last.as_str()) {
        return Period::Abbreviation;
    }
    // "J", "U.S", "e.g", "p.m"
    let single_letters = last.split('.').all(|part| {
        let mut chars = part.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
    });
    match (single_letters, last.contains('.')) {
        (true, true) => Period::Abbreviation,
        (true, false) => Period::Initial,
        (false, _) => Period::Terminal,
    }
}

fn opens_sentence(segment: &str) -> bool {
    let first: String = segment
        .trim_start()
        .chars()
        .skip_while(|c| !c.is_alphabetic())
        .take_while(|c| c.is_alphabetic())
        .collect::<String>()
        .to_lowercase();
    SENTENCE_OPENERS.contains(&first.as_str())
}

/// Word tokens: alphabetic-only, lower-cased, stop words dropped.
///
/// Hyphenated words stay whole (and so are dropped as non-alphabetic), while
/// contractions and possessives keep their stem: "don't" gives "do" and
/// "company's" gives "company".
pub fn word_tokens(text: &str, stop_words: &Lexicon) -> Vec<String> {
    join_hyphenated(text)
        .iter()
        .flat_map(|token| split_clitics(token))
        .filter(|word| !word.is_empty() && word.chars().all(char::is_alphabetic))
        .filter(|word| !stop_words.contains(word))
        .collect()
}

/// Unicode word segments with letter-hyphen-letter runs re-joined.
fn join_hyphenated(text: &str) -> Vec<String> {
    let ends_alphabetic = |token: &String| token.chars().last().is_some_and(char::is_alphabetic);

    let mut tokens: Vec<String> = Vec::new();
    let mut bounds = text.split_word_bounds().peekable();
    while let Some(token) = bounds.next() {
        if token == "-" && tokens.last().is_some_and(ends_alphabetic) {
            if let Some(next) = bounds.next_if(|next| next.starts_with(char::is_alphabetic)) {
                if let Some(prev) = tokens.last_mut() {
                    prev.push('-');
                    prev.push_str(next);
                    continue;
                }
            }
        }
        tokens.push(token.to_string());
    }
    tokens
}

/// Lower-case a token and split it into stem and clitic.
fn split_clitics(token: &str) -> Vec<String> {
    let word = token.to_lowercase().replace('\u{2019}', "'");

    if let Some(&(_, first, second)) = FUSED_WORDS.iter().find(|(fused, _, _)| *fused == word) {
        return vec![first.to_string(), second.to_string()];
    }
    for clitic in CLITICS {
        if let Some(stem) = word.strip_suffix(clitic) {
            if !stem.is_empty() {
                return vec![stem.to_string(), clitic.to_string()];
            }
        }
    }
    vec![word]
}
