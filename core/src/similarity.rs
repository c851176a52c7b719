use crate::vector::TermVector;

/// Cosine similarity of two term vectors, in `[0.0, 1.0]`.
///
/// Returns 0.0 when either vector has zero norm. The dot product walks the
/// smaller key set; counts and their products are integers, so the result is
/// identical whichever side is passed first.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if small.is_empty() {
        return 0.0;
    }
    let dot: u64 = small.iter().map(|(token, count)| count * large.get(token)).sum();
    if dot == 0 {
        return 0.0;
    }
    let denom = (a.squared_norm() as f64 * b.squared_norm() as f64).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    (dot as f64 / denom).min(1.0)
}

/// Similarity of two raw texts.
pub fn text_similarity(left: &str, right: &str) -> f64 {
    cosine_similarity(&TermVector::from_text(left), &TermVector::from_text(right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_is_one() {
        assert_eq!(text_similarity("same text same text", "same text same text"), 1.0);
        assert_eq!(text_similarity("a b c d e f g", "g f e d c b a"), 1.0);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(text_similarity("", "anything"), 0.0);
        assert_eq!(text_similarity("?!", "?!"), 0.0);
    }

    #[test]
    fn partial_overlap() {
        // one shared token out of two on each side
        let s = text_similarity("x y", "x z");
        assert!((s - 0.5).abs() < 1e-12);
    }
}
