use simcore::tokenizer::tokenize;
use simcore::vector::TermVector;

#[test]
fn it_lowercases_and_splits_on_non_word_characters() {
    let words: Vec<String> = tokenize("The quick-brown FOX; snake_case_id 42!").collect();
    assert_eq!(words, vec!["the", "quick", "brown", "fox", "snake_case_id", "42"]);
}

#[test]
fn it_yields_nothing_for_empty_or_symbol_only_input() {
    assert_eq!(tokenize("").count(), 0);
    assert_eq!(tokenize("... --- !!! ???").count(), 0);
}

#[test]
fn it_keeps_unicode_letters() {
    let words: Vec<String> = tokenize("Café ÜBER").collect();
    assert_eq!(words, vec!["café", "über"]);
}

#[test]
fn vector_counts_repeat_tokens() {
    let v = TermVector::from_text("The quick brown fox jumps over the lazy dog.");
    assert_eq!(v.get("the"), 2);
    assert_eq!(v.total(), 9);
    assert_eq!(v.squared_norm(), 11);
}
