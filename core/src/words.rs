//! Token scanning and the easy-word dictionary.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w'’‘]+").expect("static regex"));

static BUILTIN_EASY_WORDS: Lazy<HashSet<String>> = Lazy::new(|| {
    include_str!("../data/easy_words.txt")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_lowercase)
        .collect()
});

/// A maximal run of word characters with its `[start, end)` character span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Scan `text` left to right for tokens. Offsets count characters, not bytes.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    // Regex offsets are bytes; walk forward once converting to char offsets.
    let mut byte_cursor = 0usize;
    let mut char_cursor = 0usize;
    for m in WORD_RE.find_iter(text) {
        char_cursor += text[byte_cursor..m.start()].chars().count();
        let start = char_cursor;
        let len = m.as_str().chars().count();
        char_cursor += len;
        byte_cursor = m.end();
        tokens.push(Token {
            text: m.as_str(),
            start,
            end: start + len,
        });
    }
    tokens
}

/// Static vocabulary of common words, lowercased.
#[derive(Debug, Clone)]
pub struct EasyWords {
    extra: HashSet<String>,
}

impl EasyWords {
    pub fn builtin() -> Self {
        Self {
            extra: HashSet::new(),
        }
    }

    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extra: extra
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Membership test; callers pass an already lowercased word.
    pub fn contains(&self, word: &str) -> bool {
        BUILTIN_EASY_WORDS.contains(word) || self.extra.contains(word)
    }

    pub fn len(&self) -> usize {
        let added = self
            .extra
            .iter()
            .filter(|w| !BUILTIN_EASY_WORDS.contains(*w))
            .count();
        BUILTIN_EASY_WORDS.len() + added
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EasyWords {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_carry_char_offsets() {
        let tokens = tokenize("héllo, wörld");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "héllo");
        assert_eq!((tokens[0].start, tokens[0].end), (0, 5));
        assert_eq!(tokens[1].text, "wörld");
        assert_eq!((tokens[1].start, tokens[1].end), (7, 12));
    }

    #[test]
    fn apostrophes_stay_inside_tokens() {
        let tokens: Vec<_> = tokenize("don't can’t ‘tis")
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(tokens, vec!["don't", "can’t", "‘tis"]);
    }

    #[test]
    fn digits_and_underscores_join_letters() {
        let tokens: Vec<_> = tokenize("v2_final -- 42!")
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(tokens, vec!["v2_final", "42"]);
    }

    #[test]
    fn builtin_dictionary_is_loaded() {
        let words = EasyWords::builtin();
        assert!(words.contains("the"));
        assert!(words.contains("face"));
        assert!(words.contains("jump"));
        assert!(!words.contains("determination"));
        assert!(!words.contains("understand"));
        assert!(words.len() > 2900);
        assert!(!words.is_empty());
    }

    #[test]
    fn extra_words_are_lowercased() {
        let words = EasyWords::with_extra(["Rustacean"]);
        assert!(words.contains("rustacean"));
        let builtin = EasyWords::builtin().len();
        assert_eq!(words.len(), builtin + 1);
        assert_eq!(EasyWords::with_extra(["The"]).len(), builtin);
    }
}
