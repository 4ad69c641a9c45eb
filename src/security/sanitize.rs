use lazy_static::lazy_static;
use regex::Regex;

pub const DEFAULT_MAX_LENGTH: usize = 255;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"<[^>]*>").expect("tag pattern is valid");
}

/// String clean-up helpers.
///
/// These only reshape text. `strip_tags` removes anything between angle
/// brackets and nothing else, so quotes, SQL and shell metacharacters pass
/// through all three functions unchanged.
pub struct Sanitizer;

impl Sanitizer {
    pub fn strip_tags(html: &str) -> String {
        TAG.replace_all(html, "").into_owned()
    }

    /// Keeps the first `max_length` characters.
    pub fn truncate(value: &str, max_length: usize) -> String {
        value.chars().take(max_length).collect()
    }

    pub fn to_lowercase(value: &str) -> String {
        value.to_lowercase()
    }
}
