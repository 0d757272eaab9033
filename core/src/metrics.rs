//! Readability formulas over plain text.
//!
//! `Metrics` is the seam the coordinator talks to; `Readability` implements
//! the published Flesch, Kincaid, Fog, SMOG, ARI, Coleman-Liau, Linsear Write
//! and Dale-Chall formulas plus a consensus grade.

use std::collections::HashMap;
use std::sync::Arc;

use unicode_segmentation::UnicodeSegmentation;

use crate::index::{DifficultWordIndex, CANDIDATE_THRESHOLD};
use crate::syllables::{EnglishSyllables, SyllableCounter};
use crate::words::{tokenize, EasyWords};

/// Sentences with this many words or fewer are not counted.
const MIN_SENTENCE_WORDS: usize = 2;
/// Linsear Write samples the first hundred words.
const LINSEAR_SAMPLE: usize = 100;

/// Consensus grade level in numeric and human-readable form.
#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    pub level: f64,
    pub friendly: String,
}

pub trait Metrics: SyllableCounter {
    fn syllable_count(&self, text: &str) -> usize;
    fn lexicon_count(&self, text: &str) -> usize;
    fn sentence_count(&self, text: &str) -> usize;
    fn flesch_reading_ease(&self, text: &str) -> f64;
    fn flesch_kincaid_grade(&self, text: &str) -> f64;
    fn gunning_fog(&self, text: &str) -> f64;
    fn smog_index(&self, text: &str) -> f64;
    fn automated_readability_index(&self, text: &str) -> f64;
    fn coleman_liau_index(&self, text: &str) -> f64;
    fn linsear_write_formula(&self, text: &str) -> f64;
    fn dale_chall_readability_score(&self, text: &str) -> f64;
    fn text_standard(&self, text: &str) -> Grade;
}

/// Default English metrics.
///
/// Every syllable count, including the difficult-word candidates, goes
/// through one counter.
#[derive(Clone)]
pub struct Readability {
    easy: EasyWords,
    candidate_threshold: usize,
    counter: Arc<dyn SyllableCounter + Send + Sync>,
}

impl Default for Readability {
    fn default() -> Self {
        Self::new(EasyWords::builtin())
    }
}

impl Readability {
    pub fn new(easy: EasyWords) -> Self {
        Self {
            easy,
            candidate_threshold: CANDIDATE_THRESHOLD,
            counter: Arc::new(EnglishSyllables),
        }
    }

    pub fn with_counter(mut self, counter: impl SyllableCounter + Send + Sync + 'static) -> Self {
        self.counter = Arc::new(counter);
        self
    }

    /// Syllable threshold for the difficult words Dale-Chall and Fog count.
    pub fn with_candidate_threshold(mut self, threshold: usize) -> Self {
        self.candidate_threshold = threshold;
        self
    }

    fn words<'t>(&self, text: &'t str) -> Vec<&'t str> {
        tokenize(text)
            .into_iter()
            .map(|t| t.text)
            .filter(|w| w.chars().any(char::is_alphanumeric))
            .collect()
    }

    fn avg_sentence_length(&self, text: &str) -> f64 {
        ratio(self.lexicon_count(text), self.sentence_count(text))
    }

    fn avg_syllables_per_word(&self, text: &str) -> f64 {
        ratio(self.syllable_count(text), self.lexicon_count(text))
    }

    fn letter_count(&self, text: &str) -> usize {
        text.chars().filter(|c| c.is_alphanumeric()).count()
    }

    fn polysyllable_count(&self, text: &str) -> usize {
        self.words(text)
            .into_iter()
            .filter(|w| self.syllables(w) >= 3)
            .count()
    }

    fn difficult_word_count(&self, text: &str) -> usize {
        DifficultWordIndex::new(&self.easy, self)
            .difficult_words(text, self.candidate_threshold)
            .len()
    }
}

impl SyllableCounter for Readability {
    fn syllables(&self, word: &str) -> usize {
        self.counter.syllables(word)
    }
}

impl Metrics for Readability {
    fn syllable_count(&self, text: &str) -> usize {
        self.words(text)
            .into_iter()
            .map(|w| self.syllables(w))
            .sum()
    }

    fn lexicon_count(&self, text: &str) -> usize {
        self.words(text).len()
    }

    fn sentence_count(&self, text: &str) -> usize {
        let mut total = 0usize;
        let mut ignored = 0usize;
        for sentence in text.unicode_sentences() {
            if sentence.trim().is_empty() {
                continue;
            }
            total += 1;
            if self.lexicon_count(sentence) <= MIN_SENTENCE_WORDS {
                ignored += 1;
            }
        }
        total.saturating_sub(ignored).max(1)
    }

    fn flesch_reading_ease(&self, text: &str) -> f64 {
        if self.lexicon_count(text) == 0 {
            return 0.0;
        }
        let asl = self.avg_sentence_length(text);
        let asw = self.avg_syllables_per_word(text);
        round_to(206.835 - 1.015 * asl - 84.6 * asw, 2)
    }

    fn flesch_kincaid_grade(&self, text: &str) -> f64 {
        if self.lexicon_count(text) == 0 {
            return 0.0;
        }
        let asl = self.avg_sentence_length(text);
        let asw = self.avg_syllables_per_word(text);
        round_to(0.39 * asl + 11.8 * asw - 15.59, 1)
    }

    fn gunning_fog(&self, text: &str) -> f64 {
        let words = self.lexicon_count(text);
        if words == 0 {
            return 0.0;
        }
        let per_difficult = ratio(self.difficult_word_count(text), words) * 100.0;
        round_to(0.4 * (self.avg_sentence_length(text) + per_difficult), 2)
    }

    fn smog_index(&self, text: &str) -> f64 {
        let sentences = self.sentence_count(text);
        if sentences < 3 {
            return 0.0;
        }
        let poly = self.polysyllable_count(text) as f64;
        round_to(1.043 * (poly * (30.0 / sentences as f64)).sqrt() + 3.1291, 1)
    }

    fn automated_readability_index(&self, text: &str) -> f64 {
        let words = self.lexicon_count(text);
        if words == 0 {
            return 0.0;
        }
        let chars_per_word = ratio(self.letter_count(text), words);
        let words_per_sentence = ratio(words, self.sentence_count(text));
        round_to(4.71 * chars_per_word + 0.5 * words_per_sentence - 21.43, 1)
    }

    fn coleman_liau_index(&self, text: &str) -> f64 {
        let words = self.lexicon_count(text);
        if words == 0 {
            return 0.0;
        }
        let letters = ratio(self.letter_count(text), words) * 100.0;
        let sentences = ratio(self.sentence_count(text), words) * 100.0;
        round_to(0.058 * letters - 0.296 * sentences - 15.8, 2)
    }

    fn linsear_write_formula(&self, text: &str) -> f64 {
        let words = self.words(text);
        if words.is_empty() {
            return 0.0;
        }
        let sample: Vec<&str> = words.into_iter().take(LINSEAR_SAMPLE).collect();
        let mut score = 0usize;
        for word in &sample {
            score += if self.syllables(word) >= 3 { 3 } else { 1 };
        }
        let sample_text = sample.join(" ");
        // Sentence boundaries come from the original text, capped to the sample.
        let sentences = self
            .sentence_count(text)
            .min(sample_text.split_whitespace().count())
            .max(1);
        let mut number = score as f64 / sentences as f64;
        if number <= 20.0 {
            number -= 2.0;
        }
        round_to(number / 2.0, 2)
    }

    fn dale_chall_readability_score(&self, text: &str) -> f64 {
        let words = self.lexicon_count(text);
        if words == 0 {
            return 0.0;
        }
        let per_difficult = ratio(self.difficult_word_count(text), words) * 100.0;
        let mut score = 0.1579 * per_difficult + 0.0496 * self.avg_sentence_length(text);
        if per_difficult > 5.0 {
            score += 3.6365;
        }
        round_to(score, 2)
    }

    fn text_standard(&self, text: &str) -> Grade {
        let mut grades: Vec<i64> = Vec::new();
        let mut push_pair = |value: f64| {
            grades.push(value.round() as i64);
            grades.push(value.ceil() as i64);
        };

        push_pair(self.flesch_kincaid_grade(text));
        push_pair(self.smog_index(text));
        push_pair(self.coleman_liau_index(text));
        push_pair(self.automated_readability_index(text));
        push_pair(self.linsear_write_formula(text));
        push_pair(self.gunning_fog(text));

        grades.extend(flesch_grades(self.flesch_reading_ease(text)));
        grades.extend(dale_chall_grades(self.dale_chall_readability_score(text)));

        let level = most_common(&grades).unwrap_or(0);
        Grade {
            level: level as f64,
            friendly: format!("{} and {} grade", ordinal(level - 1), ordinal(level)),
        }
    }
}

fn flesch_grades(score: f64) -> Vec<i64> {
    match score {
        s if s >= 90.0 => vec![5],
        s if s >= 80.0 => vec![6],
        s if s >= 70.0 => vec![7],
        s if s >= 60.0 => vec![8, 9],
        s if s >= 50.0 => vec![10],
        s if s >= 40.0 => vec![11],
        s if s >= 30.0 => vec![12],
        _ => vec![13],
    }
}

fn dale_chall_grades(score: f64) -> Vec<i64> {
    match score {
        s if s < 5.0 => vec![4],
        s if s < 6.0 => vec![5, 6],
        s if s < 7.0 => vec![7, 8],
        s if s < 8.0 => vec![9, 10],
        s if s < 9.0 => vec![11, 12],
        _ => vec![13, 14],
    }
}

/// Most frequent value; ties go to the value seen first.
fn most_common(values: &[i64]) -> Option<i64> {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for v in values {
        *counts.entry(*v).or_default() += 1;
    }
    let mut best: Option<(i64, usize)> = None;
    for v in values {
        let count = counts[v];
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((*v, count));
        }
    }
    best.map(|(v, _)| v)
}

fn ordinal(n: i64) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
