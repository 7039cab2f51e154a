use once_cell::sync::Lazy;
use regex::Regex;

/// Anything that is not a lowercase ASCII letter or whitespace
pub static NON_LETTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-z\s]").unwrap()
});

/// Byte order mark; treated as whitespace so it separates words
const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Lowercases `text` and strips every character outside `[a-z\s]`.
///
/// Lowercasing happens first, so `É` becomes `é` and is then removed.
/// U+FEFF becomes a plain space.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase().replace(BYTE_ORDER_MARK, " ");
    NON_LETTER.replace_all(&lowered, "").into_owned()
}
