use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)[\w\p{N}]+").expect("valid regex");
}

/// Iterate over word tokens with case preserved. A token is a maximal run of Unicode word
/// characters or numerics, so `x²` and `½` are words.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> + '_ {
    RE.find_iter(text).map(|m| m.as_str())
}

/// Number of tokens in `text`. This is the document `length`.
pub fn count_tokens(text: &str) -> usize {
    tokens(text).count()
}

/// Tokens of `text`, each lower-cased. Boundaries are found on the original text so the
/// result always has `count_tokens(text)` entries.
pub fn words_lowercased(text: &str) -> Vec<String> {
    tokens(text).map(|t| t.to_lowercase()).collect()
}
