//! Canonical constant names.
//!
//! Turns a path such as `["account", "resetPassword"]` into
//! `ACCOUNT_RESET_PASSWORD`.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Lower-case letter or digit followed by an upper-case letter: `aB`, `1B`.
    static ref CAMEL_HUMP: Regex = Regex::new(r"([\p{Ll}\d])(\p{Lu})").unwrap();
    /// Acronym followed by a capitalised word: `HTTPServer` -> `HTTP Server`.
    static ref ACRONYM_END: Regex = Regex::new(r"(\p{Lu})(\p{Lu}\p{Ll})").unwrap();
    /// Anything that is not a letter or a digit separates words.
    static ref SEPARATORS: Regex = Regex::new(r"[^\p{L}\d]+").unwrap();
}

/// Splits one path segment into its words, keeping the original casing.
pub fn words(segment: &str) -> Vec<String> {
    let spaced = CAMEL_HUMP.replace_all(segment, "${1} ${2}");
    let spaced = ACRONYM_END.replace_all(&spaced, "${1} ${2}");

    SEPARATORS
        .split(&spaced)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// `resetPassword` -> `reset_password`, `HTTP-server` -> `http_server`.
pub fn snake_case(segment: &str) -> String {
    words(segment)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Upper snake case of every segment, joined with `_`.
pub fn canonical_constant<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| snake_case(s.as_ref()).to_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}
