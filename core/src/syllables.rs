//! Syllable estimation for English words.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::words::tokenize;

static EXCEPTIONS: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    [
        ("area", 3),
        ("being", 2),
        ("business", 2),
        ("create", 2),
        ("created", 3),
        ("every", 2),
        ("everything", 3),
        ("family", 3),
        ("idea", 3),
        ("naive", 2),
        ("poem", 2),
        ("poet", 2),
        ("quiet", 2),
        ("real", 1),
        ("science", 2),
        ("the", 1),
        ("whole", 1),
        ("wednesday", 2),
    ]
    .into_iter()
    .collect()
});

/// Per-token syllable counter consulted when classifying difficult words.
pub trait SyllableCounter {
    fn syllables(&self, word: &str) -> usize;
}

/// Vowel-group heuristic for English.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishSyllables;

impl SyllableCounter for EnglishSyllables {
    fn syllables(&self, word: &str) -> usize {
        count_syllables(word)
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// Estimate the syllables in a single word. Non-alphabetic characters are
/// ignored; a token without letters has no syllables.
pub fn count_syllables(word: &str) -> usize {
    let word: String = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();
    if word.is_empty() {
        return 0;
    }
    if let Some(&count) = EXCEPTIONS.get(word.as_str()) {
        return count;
    }

    let chars: Vec<char> = word.chars().collect();
    let mut count = 0usize;
    let mut prev_vowel = false;
    for &c in &chars {
        let vowel = is_vowel(c);
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }

    let n = chars.len();
    if count > 1 && n > 2 {
        let last = chars[n - 1];
        let before = chars[n - 2];
        if last == 'e' && !(before == 'l' && n > 3 && !is_vowel(chars[n - 3])) && !is_vowel(before)
        {
            // silent trailing e: "make", but not "table"
            count -= 1;
        } else if last == 'd' && before == 'e' && n > 3 && !matches!(chars[n - 3], 't' | 'd') {
            // "jumped", but not "painted"
            count -= 1;
        } else if last == 's'
            && before == 'e'
            && n > 3
            && !matches!(chars[n - 3], 's' | 'x' | 'z' | 'c' | 'g' | 'h')
            && !is_vowel(chars[n - 3])
        {
            // "makes", but not "boxes"
            count -= 1;
        }
    }

    count.max(1)
}

/// Total syllables across every token of `text`.
pub fn syllable_count(text: &str) -> usize {
    tokenize(text).iter().map(|t| count_syllables(t.text)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_syllable_words() {
        for word in ["the", "cat", "make", "jumped", "makes", "dog"] {
            assert_eq!(count_syllables(word), 1, "{word}");
        }
    }

    #[test]
    fn multi_syllable_words() {
        assert_eq!(count_syllables("table"), 2);
        assert_eq!(count_syllables("painted"), 2);
        assert_eq!(count_syllables("boxes"), 2);
        assert_eq!(count_syllables("beautiful"), 3);
        assert_eq!(count_syllables("understanding"), 4);
        assert_eq!(count_syllables("determination"), 5);
    }

    #[test]
    fn letterless_tokens_have_no_syllables() {
        assert_eq!(count_syllables("1234"), 0);
        assert_eq!(count_syllables(""), 0);
    }

    #[test]
    fn case_is_ignored() {
        assert_eq!(count_syllables("Understanding"), count_syllables("understanding"));
    }

    #[test]
    fn text_total() {
        assert_eq!(syllable_count("The cat sat on the table."), 7);
    }
}
