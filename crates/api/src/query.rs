//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Free-text search with an optional row limit (`?search=&limit=`).
///
/// The term is turned into an escaped `ILIKE` pattern and the limit clamped
/// via `attendft_core::search` before reaching a repository.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    pub limit: Option<i64>,
}
