const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u', 'y'];

/// Words with more syllables than this count as complex.
pub const COMPLEX_WORD_SYLLABLES: usize = 2;

fn is_vowel(c: char) -> bool {
    VOWELS.contains(&c)
}

/// Estimate the number of syllables in a word.
///
/// Counts the starts of vowel groups after dropping a trailing "es" or "ed".
/// Returns 0 for an empty (or all-whitespace) word and at least 1 otherwise.
pub fn count_syllables(word: &str) -> usize {
    let word = word.trim().to_lowercase();
    if word.is_empty() {
        return 0;
    }

    let stem = word
        .strip_suffix("es")
        .or_else(|| word.strip_suffix("ed"))
        .unwrap_or(&word);

    let mut count = 0;
    let mut prev_vowel = false;
    for c in stem.chars() {
        let vowel = is_vowel(c);
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }

    count.max(1)
}

/// A word is complex when it has more than [`COMPLEX_WORD_SYLLABLES`] syllables.
pub fn is_complex_word(word: &str) -> bool {
    count_syllables(word) > COMPLEX_WORD_SYLLABLES
}
