//! Label normalization for free-text master fields.
//!
//! ## Summary
//! A label typed into a brand/category/storage/... field is trimmed and
//! title-cased before it is compared against existing reference entities or
//! persisted as the title of a new one.

/// Normalize a free-text label.
///
/// Trims surrounding whitespace, collapses inner whitespace runs to a single
/// space, uppercases the first character of each word and lowercases the rest.
/// Returns `None` when nothing is left after trimming.
///
/// Examples:
/// - "apple" -> "Apple"
/// - "  SPACE   gray " -> "Space Gray"
/// - "128gb" -> "128gb"
#[must_use]
pub fn normalize_label(raw: &str) -> Option<String> {
    let words: Vec<String> = raw.split_whitespace().map(title_case_word).collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Case-insensitive label comparison used for reference lookups.
#[must_use]
pub fn labels_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
