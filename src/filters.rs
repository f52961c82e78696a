//! Search and count-filter predicates over table metadata, plus the
//! pagination window. Pure derived-data helpers; the UI layer composes
//! them with the live hub and the totals cache.

use crate::totals::Total;
use crate::types::{TableId, TableMeta};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Case-insensitive containment match on table name or ID. Blank search
/// text (after trimming) matches everything.
pub fn filter_by_search(list: &[TableMeta], search: &str) -> Vec<TableMeta> {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return list.to_vec();
    }
    list.iter()
        .filter(|meta| {
            meta.name.to_lowercase().contains(&needle)
                || meta.id.0.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Comparison operator for the record-count filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl TotalOp {
    pub fn matches(self, count: u64, value: u64) -> bool {
        match self {
            TotalOp::Eq => count == value,
            TotalOp::Ne => count != value,
            TotalOp::Gt => count > value,
            TotalOp::Ge => count >= value,
            TotalOp::Lt => count < value,
            TotalOp::Le => count <= value,
        }
    }
}

/// An active count filter. An inactive filter is the absence of one
/// (`Option<TotalFilter>` at the call site).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalFilter {
    pub op: TotalOp,
    pub value: u64,
}

impl TotalFilter {
    /// True only for numeric cached totals satisfying the comparison; the
    /// sentinel never matches.
    pub fn matches(&self, total: Total) -> bool {
        match total.as_count() {
            Some(count) => self.op.matches(count, self.value),
            None => false,
        }
    }
}

/// Keep rows whose cached total is numeric and satisfies the filter.
/// Rows with an unknown or not-yet-fetched total are excluded.
pub fn filter_by_total(
    list: &[TableMeta],
    totals: &HashMap<TableId, Total>,
    filter: &TotalFilter,
) -> Vec<TableMeta> {
    list.iter()
        .filter(|meta| {
            totals
                .get(&meta.id)
                .map(|total| filter.matches(*total))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// One pagination window over a filtered list. Pages are 1-based and
/// fixed-size; an out-of-range page yields an empty slice.
pub fn page_window<T>(list: &[T], page: usize, page_size: usize) -> &[T] {
    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size);
    if start >= list.len() || page_size == 0 {
        return &[];
    }
    let end = (start + page_size).min(list.len());
    &list[start..end]
}
