use crate::tokenizer::tokenize;
use std::collections::hash_map::{self, HashMap};

/// Term-frequency vector: token -> occurrence count within one document.
///
/// The squared norm is accumulated while counting so similarity never has to
/// walk a vector twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermVector {
    counts: HashMap<String, u64>,
    sum_sq: u64,
}

impl TermVector {
    pub fn new() -> Self { Self::default() }

    /// Tokenize and count in one pass.
    pub fn from_text(text: &str) -> Self {
        tokenize(text).collect()
    }

    pub fn from_tokens<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for token in tokens {
            *counts.entry(token).or_insert(0) += 1;
        }
        let sum_sq = counts.values().map(|c| c * c).sum();
        Self { counts, sum_sq }
    }

    pub fn get(&self, token: &str) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize { self.counts.len() }

    pub fn is_empty(&self) -> bool { self.counts.is_empty() }

    /// Total number of tokens counted.
    pub fn total(&self) -> u64 { self.counts.values().sum() }

    /// Sum of squared counts; exact integer so symmetric products stay exact.
    pub fn squared_norm(&self) -> u64 { self.sum_sq }

    pub fn norm(&self) -> f64 { (self.sum_sq as f64).sqrt() }

    pub fn iter(&self) -> hash_map::Iter<'_, String, u64> { self.counts.iter() }
}

impl FromIterator<String> for TermVector {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::from_tokens(iter)
    }
}

impl<'a> IntoIterator for &'a TermVector {
    type Item = (&'a String, &'a u64);
    type IntoIter = hash_map::Iter<'a, String, u64>;

    fn into_iter(self) -> Self::IntoIter { self.counts.iter() }
}
