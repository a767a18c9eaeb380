//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, SubsecRound, Utc};

/// A shortened URL with its click counter.
///
/// `short_code`, `original_url` and `created_at` are fixed at creation. The
/// only mutation a stored link ever sees is a click increment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub short_code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub clicks: u64,
}

impl Link {
    /// Creates a link record.
    pub fn new(
        short_code: String,
        original_url: String,
        created_at: DateTime<Utc>,
        clicks: u64,
    ) -> Self {
        Self {
            short_code,
            original_url,
            created_at,
            clicks,
        }
    }

    /// Creates a fresh link stamped with the current time and zero clicks.
    ///
    /// The timestamp is truncated to whole seconds, the precision it is
    /// persisted with.
    pub fn fresh(short_code: String, original_url: String) -> Self {
        Self::new(short_code, original_url, Utc::now().trunc_subsecs(0), 0)
    }
}
