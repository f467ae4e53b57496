use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("whitespace regex is valid");
}

/// Turns a room name into its id, e.g. "Late Night  Lofi" becomes "late-night-lofi".
pub fn slugify(name: &str) -> String {
    WHITESPACE
        .replace_all(name.trim(), "-")
        .to_lowercase()
}

/// Returns true if the text has no letters or digits in it.
pub fn is_emoji_only(text: &str) -> bool {
    !text.chars().any(char::is_alphanumeric)
}
