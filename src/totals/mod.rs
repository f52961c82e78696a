//! On-demand aggregation: per-table record counts over the interest set.
//!
//! The cache is populated lazily for whatever tables are currently of
//! interest (the visible page, plus the filtered candidate set while a
//! count filter is active) and then kept fresh by per-table record
//! add/delete events: increment/decrement in place instead of
//! recomputation. Entries survive a table leaving the interest set
//! (stale-but-retained last-known counts); only [`TotalsCache::reset`]
//! clears them.

mod cache;
mod types;

pub use cache::TotalsCache;
pub use types::{Total, TotalsUpdate};
