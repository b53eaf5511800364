//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL with its click counters.
///
/// `short_code` is stored case-folded (lowercase) and is unique under
/// folding; once assigned it never changes. Counters are mutated only
/// through atomic repository updates, never in process memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: i64,
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    /// Client IP that created the link, when known.
    pub created_by: Option<String>,
    pub is_active: bool,
    pub clicks_count: i64,
    pub unique_clicks_count: i64,
}

/// Input data for creating a new link.
///
/// Counters start at zero and the link starts active; both are set by the
/// database defaults.
#[derive(Debug, Clone)]
pub struct NewLink {
    /// Case-folded short code or custom alias.
    pub short_code: String,
    /// Normalized original URL.
    pub original_url: String,
    pub created_by: Option<String>,
}
