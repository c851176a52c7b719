use simcore::detector::{detect_near_duplicates, Document, DuplicateDetector, SimilarityReport};
use simcore::similarity::text_similarity;
use std::collections::HashSet;

const A: &str = "The quick brown fox jumps over the lazy dog.";
const B: &str = "A quick brown fox jumped over a very lazy dog!";
const C: &str = "An entirely different sentence without relation.";

fn fox_corpus() -> Vec<Document> {
    vec![Document::new("Doc A", A), Document::new("Doc B", B), Document::new("Doc C", C)]
}

fn samples() -> Vec<&'static str> {
    vec![A, B, C, "", "?!", "same text same text", "privacy data privacy", "data", "Terms of Service apply to data."]
}

#[test]
fn similarity_is_symmetric() {
    for x in samples() {
        for y in samples() {
            assert_eq!(text_similarity(x, y), text_similarity(y, x), "{x:?} vs {y:?}");
        }
    }
}

#[test]
fn similarity_is_bounded() {
    for x in samples() {
        for y in samples() {
            let s = text_similarity(x, y);
            assert!((0.0..=1.0).contains(&s), "{x:?} vs {y:?} -> {s}");
        }
    }
}

#[test]
fn self_similarity_is_one() {
    for x in samples().into_iter().filter(|s| simcore::tokenizer::tokenize(s).next().is_some()) {
        assert_eq!(text_similarity(x, x), 1.0, "{x:?}");
    }
}

#[test]
fn zero_token_text_scores_zero() {
    assert_eq!(text_similarity("", A), 0.0);
    assert_eq!(text_similarity(A, "!!! ..."), 0.0);
    assert_eq!(text_similarity("", ""), 0.0);
}

#[test]
fn disjoint_vocabularies_score_zero() {
    assert_eq!(text_similarity(A, C), 0.0);
    assert_eq!(text_similarity(B, C), 0.0);
}

#[test]
fn fox_sentences_follow_cosine_formula() {
    // six shared tokens; squared norms 11 and 12
    let expected = 6.0 / (11.0f64 * 12.0).sqrt();
    let s = text_similarity(A, B);
    assert!((s - expected).abs() < 1e-12, "got {s}");
    assert!(s > 0.52 && s < 0.53);
}

#[test]
fn corpus_reports_only_the_fox_pair() {
    let reports = detect_near_duplicates(&fox_corpus(), 0.5);
    assert_eq!(reports.len(), 1);
    let r = &reports[0];
    assert_eq!((r.left_id.as_str(), r.right_id.as_str()), ("Doc A", "Doc B"));
    assert_eq!(r.pair(), (0, 1));
    assert_eq!(r.score, text_similarity(A, B));

    assert!(detect_near_duplicates(&fox_corpus(), 0.7).is_empty());
}

#[test]
fn empty_document_only_reported_at_zero_threshold() {
    let docs = vec![Document::new("empty", ""), Document::new("full", A)];
    assert!(detect_near_duplicates(&docs, 0.01).is_empty());
    assert!(detect_near_duplicates(&docs, 1.0).is_empty());

    let at_zero = detect_near_duplicates(&docs, 0.0);
    assert_eq!(at_zero.len(), 1);
    assert_eq!(at_zero[0].score, 0.0);
}

#[test]
fn identical_documents_reported_at_full_threshold() {
    let docs = vec![Document::new("D1", "same text same text"), Document::new("D2", "same text same text")];
    for t in [0.0, 0.5, 0.99, 1.0] {
        let reports = detect_near_duplicates(&docs, t);
        assert_eq!(reports.len(), 1, "threshold {t}");
        assert_eq!(reports[0].score, 1.0);
    }
}

#[test]
fn out_of_range_thresholds_are_degenerate() {
    let docs = fox_corpus();
    assert_eq!(detect_near_duplicates(&docs, -1.0).len(), 3);
    assert!(detect_near_duplicates(&docs, 1.5).is_empty());
}

#[test]
fn raising_threshold_never_adds_pairs() {
    let docs: Vec<Document> = samples().iter().enumerate().map(|(i, t)| Document::new(format!("d{i}"), *t)).collect();
    let thresholds = [0.0, 0.1, 0.3, 0.5, 0.7, 0.9, 1.0];
    for w in thresholds.windows(2) {
        let lower: HashSet<(usize, usize)> = detect_near_duplicates(&docs, w[0]).iter().map(SimilarityReport::pair).collect();
        let higher: HashSet<(usize, usize)> = detect_near_duplicates(&docs, w[1]).iter().map(SimilarityReport::pair).collect();
        assert!(higher.is_subset(&lower), "{} -> {}", w[0], w[1]);
    }
}

#[test]
fn output_is_ordered_and_reproducible() {
    let docs: Vec<Document> = samples().iter().enumerate().map(|(i, t)| Document::new(format!("d{i}"), *t)).collect();
    let first = detect_near_duplicates(&docs, 0.0);
    let second = detect_near_duplicates(&docs, 0.0);
    assert_eq!(first, second);

    let n = docs.len();
    assert_eq!(first.len(), n * (n - 1) / 2);
    let pairs: Vec<(usize, usize)> = first.iter().map(SimilarityReport::pair).collect();
    let mut sorted = pairs.clone();
    sorted.sort();
    assert_eq!(pairs, sorted);
    assert!(pairs.iter().all(|(i, j)| i < j));
}

#[test]
fn parallel_detection_matches_sequential_order() {
    let docs: Vec<Document> = (0..40)
        .map(|i| Document::new(format!("d{i}"), format!("policy section {} data {} terms", i % 5, i % 3)))
        .collect();
    let detector = DuplicateDetector::new(0.6);
    assert_eq!(detector.detect(&docs), detector.detect_parallel(&docs));
}
