use lazy_static::lazy_static;
use regex::{Matches, Regex};

lazy_static! {
    static ref RE: Regex = Regex::new(r"[\p{L}\p{N}_]+").expect("valid regex");
}

/// Lazy stream of lowercase word tokens over a borrowed text.
///
/// A token is a maximal run of letters, numbers or underscores; everything
/// else, including combining marks and connector punctuation, is a delimiter.
#[derive(Debug)]
pub struct Tokens<'t> {
    text: &'t str,
    matches: Matches<'static, 't>,
}

impl<'t> Tokens<'t> {
    /// A fresh stream over the same text, starting from the first token.
    pub fn restart(&self) -> Tokens<'t> {
        tokenize(self.text)
    }
}

impl<'t> Iterator for Tokens<'t> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.matches.next().map(|m| m.as_str().to_lowercase())
    }
}

/// Tokenize text into lowercase words.
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens { text, matches: RE.find_iter(text) }
}
