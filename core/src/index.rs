//! Difficult-word classification and the word -> spans index.

use std::collections::{BTreeSet, HashMap};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::normalize::normalize;
use crate::syllables::SyllableCounter;
use crate::words::{tokenize, EasyWords};

/// Half-open `[start, end)` character span within the analyzed text.
pub type Span = (usize, usize);

/// Threshold used for the highlighted index shown to the user.
pub const DISPLAY_THRESHOLD: usize = 3;
/// Threshold used when only the candidate set is needed (readability formulas).
pub const CANDIDATE_THRESHOLD: usize = 2;

/// Literal surface form -> every span it occurs at, in scan order.
///
/// Keys keep their exact casing; "The" and "the" are distinct entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DifficultWordMap {
    entries: Vec<(String, Vec<Span>)>,
    slots: HashMap<String, usize>,
}

impl DifficultWordMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, word: &str, span: Span) {
        match self.slots.get(word) {
            Some(&slot) => self.entries[slot].1.push(span),
            None => {
                self.slots.insert(word.to_string(), self.entries.len());
                self.entries.push((word.to_string(), vec![span]));
            }
        }
    }

    pub fn get(&self, word: &str) -> Option<&[Span]> {
        self.slots
            .get(word)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.slots.contains_key(word)
    }

    /// Keys in first-seen order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(w, _)| w.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Span])> {
        self.entries.iter().map(|(w, s)| (w.as_str(), s.as_slice()))
    }

    /// Every span under every key, grouped by key in first-seen order.
    pub fn spans(&self) -> impl Iterator<Item = Span> + '_ {
        self.entries.iter().flat_map(|(_, s)| s.iter().copied())
    }

    /// Distinct words in reverse lexicographic order ('z...' before 'a...').
    pub fn sorted_descending(&self) -> Vec<String> {
        let mut words: Vec<String> = self.words().map(str::to_string).collect();
        words.sort();
        words.reverse();
        words
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for DifficultWordMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (word, spans) in &self.entries {
            map.serialize_entry(word, spans)?;
        }
        map.end()
    }
}

/// Classifies tokens against the easy-word dictionary and a syllable counter.
pub struct DifficultWordIndex<'a, P: SyllableCounter + ?Sized> {
    easy: &'a EasyWords,
    counter: &'a P,
}

impl<'a, P: SyllableCounter + ?Sized> DifficultWordIndex<'a, P> {
    pub fn new(easy: &'a EasyWords, counter: &'a P) -> Self {
        Self { easy, counter }
    }

    /// A token is difficult when its normalized form is not an easy word and
    /// its literal form has at least `threshold` syllables.
    pub fn is_difficult(&self, token: &str, threshold: usize) -> bool {
        !self.easy.contains(&normalize(token, self.easy))
            && self.counter.syllables(token) >= threshold
    }

    /// Index every difficult token of `text` by its literal surface form.
    pub fn build(&self, text: &str, threshold: usize) -> DifficultWordMap {
        let mut map = DifficultWordMap::new();
        for token in tokenize(text) {
            if self.is_difficult(token.text, threshold) {
                map.push(token.text, (token.start, token.end));
            }
        }
        map
    }

    /// Distinct difficult tokens without spans.
    pub fn difficult_words(&self, text: &str, threshold: usize) -> BTreeSet<String> {
        tokenize(text)
            .into_iter()
            .filter(|token| self.is_difficult(token.text, threshold))
            .map(|token| token.text.to_string())
            .collect()
    }
}
