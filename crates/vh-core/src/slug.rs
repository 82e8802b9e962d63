//! URL-safe slugs derived from titles.

use unicode_normalization::UnicodeNormalization;

/// Lowercase `value`, drop punctuation, and join words with single hyphens.
///
/// The title is NFKD-decomposed first, so accented letters fall back to their
/// base letter (`é` becomes `e`) and compatibility forms such as ligatures
/// expand to plain ASCII. After that, ASCII letters, digits and `_` are kept;
/// whitespace and `-` runs collapse into one hyphen; anything else, including
/// leftover combining marks and non-Latin scripts, is removed. Leading and
/// trailing `-`/`_` are trimmed. Applying the function to its own output
/// returns the same string.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_separator = false;

    for c in value.nfkd() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else if c == '-' || c.is_whitespace() {
            pending_separator = true;
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}
