//! Escaping of ParadeDB query-syntax metacharacters.
//!
//! Free-text search input travels to the extension as a mini query language
//! (field qualifiers, boosts, ranges). Every lookup except `query_search`
//! escapes its input so user text is matched literally instead of being
//! parsed as that language.

/// Characters the pg_search query parser treats as syntax.
const RESERVED: &[char] = &[
    ':', '[', ']', '(', ')', '\'', '"', '-', '+', '*', '^', '`', '{', '}',
];

/// Backslash-escapes every reserved query-syntax character in `text`.
///
/// The backslash itself is not in the reserved set, so applying `escape`
/// to already-escaped text double-escapes it. Callers must escape exactly
/// once; the lookups in this crate do so internally.
///
/// ```
/// assert_eq!(paradedb_sql::escape("shoes(2024)"), r"shoes\(2024\)");
/// ```
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if RESERVED.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
