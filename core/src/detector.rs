//! Pairwise near-duplicate detection over an ordered corpus.
//!
//! Every document is vectorized exactly once; each unordered pair `(i, j)`
//! with `i < j` is compared once, and reports come back in ascending
//! `(i, j)` order regardless of which entry point is used.

use crate::similarity::cosine_similarity;
use crate::vector::TermVector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Threshold used when the caller does not pick one.
pub const DEFAULT_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityReport {
    /// Position of the left document in the corpus.
    pub left: usize,
    /// Position of the right document; always greater than `left`.
    pub right: usize,
    pub left_id: String,
    pub right_id: String,
    pub score: f64,
}

impl SimilarityReport {
    pub fn pair(&self) -> (usize, usize) { (self.left, self.right) }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetectError {
    #[error("detection cancelled after {completed_rows} of {total_rows} rows")]
    Cancelled { completed_rows: usize, total_rows: usize },
}

/// Shared cancellation flag, checked between rows of the pair loop.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self { Self::default() }
    pub fn cancel(&self) { self.0.store(true, Ordering::Relaxed); }
    pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::Relaxed) }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuplicateDetector {
    pub threshold: f64,
}

impl Default for DuplicateDetector {
    fn default() -> Self { Self { threshold: DEFAULT_THRESHOLD } }
}

impl DuplicateDetector {
    pub fn new(threshold: f64) -> Self { Self { threshold } }

    pub fn detect(&self, docs: &[Document]) -> Vec<SimilarityReport> {
        let vectors = vectorize(docs);
        let mut reports = Vec::new();
        for i in 0..docs.len() {
            self.compare_row(docs, &vectors, i, &mut reports);
        }
        log_run(docs.len(), reports.len());
        reports
    }

    /// Same result as [`detect`](Self::detect), with rows fanned out over the rayon pool.
    pub fn detect_parallel(&self, docs: &[Document]) -> Vec<SimilarityReport> {
        let vectors: Vec<TermVector> = docs.par_iter().map(|d| TermVector::from_text(&d.text)).collect();
        let mut reports: Vec<SimilarityReport> = (0..docs.len())
            .into_par_iter()
            .flat_map_iter(|i| {
                let mut row = Vec::new();
                self.compare_row(docs, &vectors, i, &mut row);
                row
            })
            .collect();
        reports.sort_unstable_by_key(SimilarityReport::pair);
        log_run(docs.len(), reports.len());
        reports
    }

    /// Sequential detection that stops at the next row boundary once `cancel` is set.
    pub fn detect_cancellable(&self, docs: &[Document], cancel: &CancelFlag) -> Result<Vec<SimilarityReport>, DetectError> {
        self.detect_until(docs, |_| cancel.is_cancelled())
    }

    /// Sequential detection that asks `should_stop(row)` before starting each
    /// row. A stop discards the rows already compared.
    pub fn detect_until<F>(&self, docs: &[Document], mut should_stop: F) -> Result<Vec<SimilarityReport>, DetectError>
    where
        F: FnMut(usize) -> bool,
    {
        let vectors = vectorize(docs);
        let mut reports = Vec::new();
        for i in 0..docs.len() {
            if should_stop(i) {
                tracing::info!(completed_rows = i, total_rows = docs.len(), "detection cancelled");
                return Err(DetectError::Cancelled { completed_rows: i, total_rows: docs.len() });
            }
            self.compare_row(docs, &vectors, i, &mut reports);
        }
        log_run(docs.len(), reports.len());
        Ok(reports)
    }

    fn compare_row(&self, docs: &[Document], vectors: &[TermVector], i: usize, out: &mut Vec<SimilarityReport>) {
        for j in (i + 1)..docs.len() {
            let score = cosine_similarity(&vectors[i], &vectors[j]);
            if score >= self.threshold {
                out.push(SimilarityReport {
                    left: i,
                    right: j,
                    left_id: docs[i].id.clone(),
                    right_id: docs[j].id.clone(),
                    score,
                });
            }
        }
    }
}

/// One term vector per document, in corpus order.
pub fn vectorize(docs: &[Document]) -> Vec<TermVector> {
    docs.iter().map(|d| TermVector::from_text(&d.text)).collect()
}

/// All pairs `(i, j)`, `i < j`, scoring at or above `threshold`, in ascending order.
pub fn detect_near_duplicates(docs: &[Document], threshold: f64) -> Vec<SimilarityReport> {
    DuplicateDetector::new(threshold).detect(docs)
}

fn log_run(num_docs: usize, reports: usize) {
    let comparisons = num_docs * num_docs.saturating_sub(1) / 2;
    tracing::debug!(num_docs, comparisons, reports, "near-duplicate detection complete");
}
