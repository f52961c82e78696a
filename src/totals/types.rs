//! Types for the record-count cache.

use serde::{Deserialize, Serialize};

/// Cached record count for one table.
///
/// `Unknown` is the error sentinel: the last fetch failed. "Not yet
/// fetched" is simply the absence of the table from the cache, so consumers
/// can render the three states (loading / error / count) distinctly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Total {
    Count { value: u64 },
    Unknown,
}

impl Total {
    pub fn count(value: u64) -> Self {
        Total::Count { value }
    }

    pub fn as_count(self) -> Option<u64> {
        match self {
            Total::Count { value } => Some(value),
            Total::Unknown => None,
        }
    }

    pub fn is_unknown(self) -> bool {
        self == Total::Unknown
    }
}

/// Mutation applied to one cached count by the event reducer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TotalsUpdate {
    RecordAdded,
    RecordRemoved,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_accessors() {
        assert_eq!(Total::count(5).as_count(), Some(5));
        assert_eq!(Total::Unknown.as_count(), None);
        assert!(Total::Unknown.is_unknown());
        assert!(!Total::count(0).is_unknown());
    }
}
