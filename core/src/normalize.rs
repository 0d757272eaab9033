//! Word normalization ahead of easy-word lookups.
//!
//! This is a heuristic, not a lemmatizer. It may produce non-words; it only
//! has to raise the odds that an inflected token hits the dictionary.

use crate::inflect::singularize;
use crate::words::EasyWords;

/// Tokens shorter than this are too short to strip suffixes from safely.
pub const MIN_STRIPPABLE_LEN: usize = 6;

/// Lowercase, singularize, then de-inflect `token`.
pub fn normalize(token: &str, easy: &EasyWords) -> String {
    present_tense(&singularize(&token.to_lowercase()), easy)
}

/// Strip a trailing `ed` / `ing`, preferring the silent-e form when the
/// dictionary knows it ("forcing" -> "force").
pub fn present_tense(word: &str, easy: &EasyWords) -> String {
    if word.chars().count() < MIN_STRIPPABLE_LEN {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ed") {
        let with_e = &word[..word.len() - 1];
        if easy.contains(with_e) {
            return with_e.to_string();
        }
        return stem.to_string();
    }
    if let Some(stem) = word.strip_suffix("ing") {
        let with_e = format!("{stem}e");
        if easy.contains(&with_e) {
            return with_e;
        }
        return stem.to_string();
    }
    word.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn easy() -> EasyWords {
        EasyWords::builtin()
    }

    #[test]
    fn short_tokens_pass_through() {
        let easy = easy();
        for word in ["faced", "going", "cared", "sing", "a"] {
            assert_eq!(present_tense(word, &easy), word);
        }
    }

    #[test]
    fn ed_prefers_silent_e_form() {
        assert_eq!(present_tense("placed", &easy()), "place");
        assert_eq!(present_tense("changed", &easy()), "change");
    }

    #[test]
    fn ed_falls_back_to_bare_stem() {
        assert_eq!(present_tense("jumped", &easy()), "jump");
        assert_eq!(present_tense("painted", &easy()), "paint");
    }

    #[test]
    fn ing_prefers_silent_e_form() {
        assert_eq!(present_tense("forcing", &easy()), "force");
    }

    #[test]
    fn ing_falls_back_to_bare_stem() {
        // "jumpe" is not a word, so the suffix is simply dropped.
        assert_eq!(present_tense("jumping", &easy()), "jump");
    }

    #[test]
    fn other_tokens_are_unchanged() {
        assert_eq!(present_tense("determination", &easy()), "determination");
    }

    #[test]
    fn normalize_lowercases_and_singularizes() {
        let easy = easy();
        assert_eq!(normalize("Houses", &easy), "house");
        assert_eq!(normalize("CHILDREN", &easy), "child");
        assert_eq!(normalize("Forcing", &easy), "force");
        assert_eq!(normalize("buses", &easy), "bus");
        assert_eq!(normalize("Headaches", &easy), "headache");
    }

    #[test]
    fn normalize_is_deterministic() {
        let easy = easy();
        assert_eq!(normalize("understanding", &easy), normalize("understanding", &easy));
    }
}
