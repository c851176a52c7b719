//! Cleanup passes for scraped policy text: script/config debris, markup, digits.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::Html;

lazy_static! {
    static ref WINDOW_ASSIGN: Regex = Regex::new(r"window\..*?;").expect("valid regex");
    static ref FUNCTION_BODY: Regex = Regex::new(r"(?s)function\s*\(.*?\)\s*\{.*?\}").expect("valid regex");
    static ref BRACES: Regex = Regex::new(r"(?s)\{.*?\}").expect("valid regex");
    static ref BRACKETS: Regex = Regex::new(r"(?s)\[.*?\]").expect("valid regex");
    static ref QUOTED_PAIR: Regex = Regex::new(r#""[^"]*"\s*:\s*"[^"]*""#).expect("valid regex");
    static ref QUOTED_KEY: Regex = Regex::new(r#""[^"]*"\s*:\s*[^,]*,?"#).expect("valid regex");
    static ref FRAMEWORK_REF: Regex = Regex::new(r#""[^"]*\.(graphql|react|rendererRef)[^"]*""#).expect("valid regex");
    static ref ESCAPED_FRAMEWORK_REF: Regex =
        Regex::new(r#"\\"[^\\"]*\\.(graphql|react|rendererRef)[^\\"]*\\""#).expect("valid regex");
    static ref CSS_TAIL: Regex = Regex::new(r#"css[\]}"]+"#).expect("valid regex");
    static ref DIGITS: Regex = Regex::new(r"[0-9]+").expect("valid regex");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid regex");
    static ref NON_ASCII: Regex = Regex::new(r"[^\x00-\x7F]+").expect("valid regex");
    static ref NON_ALPHA: Regex = Regex::new(r"[^a-z\s]").expect("valid regex");
    static ref SCRIPT: Regex = Regex::new(r"(?is)<script.*?>.*?</script>").expect("valid regex");
    static ref STYLE: Regex = Regex::new(r"(?is)<style.*?>.*?</style>").expect("valid regex");
}

/// Strip JavaScript/JSON debris, digits and non-ASCII from raw scraped text.
pub fn clean_text(text: &str) -> String {
    let passes: [&Regex; 10] = [
        &*WINDOW_ASSIGN,
        &*FUNCTION_BODY,
        &*BRACES,
        &*BRACKETS,
        &*QUOTED_PAIR,
        &*QUOTED_KEY,
        &*FRAMEWORK_REF,
        &*ESCAPED_FRAMEWORK_REF,
        &*CSS_TAIL,
        &*DIGITS,
    ];
    let mut out = text.to_string();
    for re in passes {
        out = re.replace_all(&out, "").into_owned();
    }
    let out = WHITESPACE.replace_all(&out, " ");
    let out = NON_ASCII.replace_all(&out, " ");
    out.trim().to_string()
}

/// Lowercase, keep letters and whitespace only, collapse runs of whitespace.
pub fn basic_preprocess(text: &str) -> String {
    let lower = text.to_lowercase();
    let letters = NON_ALPHA.replace_all(&lower, "");
    WHITESPACE.replace_all(&letters, " ").trim().to_string()
}

/// Markup pass for raw HTML: drop `<script>`/`<style>` blocks, keep only the
/// text nodes with entities decoded, then drop non-ASCII.
pub fn advanced_clean(text: &str) -> String {
    let out = SCRIPT.replace_all(text, "");
    let out = STYLE.replace_all(&out, "");
    let fragment = Html::parse_fragment(&out);
    let plain: String = fragment.root_element().text().collect();
    let ascii: String = plain.chars().filter(|c| c.is_ascii()).collect();
    ascii.trim().to_string()
}
