//! Descriptive statistics over policy text: readability, lexical diversity,
//! complexity, and short extractive summaries.
//!
//! Word counts use [`tokenize`]; punctuation is never counted as a word.
//! Sentence boundaries come from `pragmatic_segmenter`.

use crate::record::Record;
use crate::tokenizer::tokenize;
use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use pragmatic_segmenter::Segmenter;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

/// Word budget for [`TextAnalyzer::summarize_words`].
pub const SUMMARY_WORDS: usize = 100;

lazy_static! {
    static ref VOWEL_GROUP: Regex = Regex::new(r"[aeiouy]+").expect("valid regex");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Difficulty {
    Easy,
    Moderate,
    Difficult,
}

/// Label a Flesch reading-ease score.
pub fn difficulty_label(reading_ease: f64) -> Difficulty {
    if reading_ease >= 80.0 {
        Difficulty::Easy
    } else if reading_ease >= 60.0 {
        Difficulty::Moderate
    } else {
        Difficulty::Difficult
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadabilityScores {
    pub flesch_reading_ease: f64,
    pub flesch_kincaid_grade: f64,
    pub automated_readability_index: f64,
    pub difficulty_label: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadabilitySummary {
    pub average_flesch_reading_ease: f64,
    pub average_flesch_kincaid_grade: f64,
    pub average_automated_readability_index: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordStats {
    pub title: String,
    pub url: String,
    pub lexical_diversity: f64,
    pub vocabulary_richness: f64,
    pub text_complexity: f64,
    pub readability: ReadabilityScores,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub title: String,
    pub summary_100_words: String,
    pub summary_one_sentence: String,
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Vowel groups in a word, at least one.
pub fn count_syllables(word: &str) -> usize {
    VOWEL_GROUP.find_iter(&word.to_lowercase()).count().max(1)
}

/// Distinct tokens over total tokens, four decimals; 0 for empty text.
pub fn lexical_diversity(text: &str) -> f64 {
    let words: Vec<String> = tokenize(text).collect();
    if words.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&String> = words.iter().collect();
    round_to(unique.len() as f64 / words.len() as f64, 4)
}

/// Distinct tokens squared over total tokens, four decimals.
pub fn vocabulary_richness(text: &str) -> f64 {
    let words: Vec<String> = tokenize(text).collect();
    if words.is_empty() {
        return 0.0;
    }
    let unique = words.iter().collect::<HashSet<_>>().len() as f64;
    round_to(unique * unique / words.len() as f64, 4)
}

struct Counts {
    words: usize,
    sentences: usize,
    syllables: usize,
    chars: usize,
}

/// Sentence-aware measures. Holds one segmenter so a batch pays its setup once.
pub struct TextAnalyzer {
    segmenter: Segmenter,
}

impl TextAnalyzer {
    pub fn new() -> Result<Self> {
        let segmenter = Segmenter::new().map_err(|e| anyhow!("segmenter init: {e:?}"))?;
        Ok(Self { segmenter })
    }

    /// Non-blank sentences, trimmed, in text order.
    pub fn sentences(&self, text: &str) -> Vec<String> {
        self.segmenter
            .segment(text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn counts(&self, text: &str) -> Counts {
        let mut counts = Counts { words: 0, sentences: self.sentences(text).len(), syllables: 0, chars: 0 };
        for word in tokenize(text) {
            counts.words += 1;
            counts.syllables += count_syllables(&word);
            counts.chars += word.chars().count();
        }
        counts
    }

    pub fn readability(&self, text: &str) -> ReadabilityScores {
        let c = self.counts(text);
        let (ease, grade, ari) = if c.words == 0 || c.sentences == 0 {
            (0.0, 0.0, 0.0)
        } else {
            let words_per_sentence = c.words as f64 / c.sentences as f64;
            let syllables_per_word = c.syllables as f64 / c.words as f64;
            let chars_per_word = c.chars as f64 / c.words as f64;
            (
                round_to(206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word, 2),
                round_to(0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59, 2),
                round_to(4.71 * chars_per_word + 0.5 * words_per_sentence - 21.43, 2),
            )
        };
        ReadabilityScores {
            flesch_reading_ease: ease,
            flesch_kincaid_grade: grade,
            automated_readability_index: ari,
            difficulty_label: difficulty_label(ease),
        }
    }

    /// Words per sentence times mean word length, two decimals.
    pub fn text_complexity(&self, text: &str) -> f64 {
        let c = self.counts(text);
        if c.words == 0 || c.sentences == 0 {
            return 0.0;
        }
        let words_per_sentence = c.words as f64 / c.sentences as f64;
        let mean_word_len = c.chars as f64 / c.words as f64;
        round_to(words_per_sentence * mean_word_len, 2)
    }

    /// The first `limit` whitespace-separated words; short texts come back unchanged.
    pub fn summarize_words(&self, text: &str, limit: usize) -> String {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() <= limit {
            return text.to_string();
        }
        words[..limit].join(" ")
    }

    /// The longest sentence; the earliest one wins a tie.
    pub fn summarize_one_sentence(&self, text: &str) -> String {
        let sentences = self.sentences(text);
        let longest = sentences.iter().rev().max_by_key(|s| s.len()).cloned().unwrap_or_default();
        WHITESPACE.replace_all(&longest, " ").into_owned()
    }

    pub fn summarize(&self, record: &Record) -> Summary {
        Summary {
            title: record.title.clone().unwrap_or_else(|| "Untitled".to_string()),
            summary_100_words: self.summarize_words(&record.text, SUMMARY_WORDS),
            summary_one_sentence: self.summarize_one_sentence(&record.text),
        }
    }

    pub fn analyze(&self, record: &Record, index: usize) -> RecordStats {
        RecordStats {
            title: record.label(index),
            url: record.url.clone().unwrap_or_default(),
            lexical_diversity: lexical_diversity(&record.text),
            vocabulary_richness: vocabulary_richness(&record.text),
            text_complexity: self.text_complexity(&record.text),
            readability: self.readability(&record.text),
        }
    }

    pub fn analyze_batch(&self, records: &[Record]) -> Vec<RecordStats> {
        let stats: Vec<RecordStats> = records.iter().enumerate().map(|(i, r)| self.analyze(r, i)).collect();
        tracing::debug!(num_records = stats.len(), "text statistics computed");
        stats
    }
}

/// Mean of each readability score, two decimals; `None` for an empty batch.
pub fn summarize_readability(scores: &[ReadabilityScores]) -> Option<ReadabilitySummary> {
    if scores.is_empty() {
        return None;
    }
    let n = scores.len() as f64;
    let mean = |f: fn(&ReadabilityScores) -> f64| round_to(scores.iter().map(f).sum::<f64>() / n, 2);
    Some(ReadabilitySummary {
        average_flesch_reading_ease: mean(|s| s.flesch_reading_ease),
        average_flesch_kincaid_grade: mean(|s| s.flesch_kincaid_grade),
        average_automated_readability_index: mean(|s| s.automated_readability_index),
    })
}
