//! Dashboard search and listing helpers.

/// Default number of rows returned by list endpoints.
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Maximum number of rows a list endpoint will return.
pub const MAX_LIST_LIMIT: i64 = 500;

/// Clamp a caller-supplied limit into `1..=MAX_LIST_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

/// Build an `ILIKE` substring pattern from a free-text search term.
///
/// `%`, `_` and `\` in the term are escaped so they match literally.
/// Returns `None` for a blank term, meaning "no filter".
pub fn like_pattern(term: Option<&str>) -> Option<String> {
    let term = term.map(str::trim).filter(|t| !t.is_empty())?;
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}
