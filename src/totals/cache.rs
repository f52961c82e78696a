//! Lazily populated, event-maintained record-count cache.

use super::types::{Total, TotalsUpdate};
use crate::host::{EventListener, HostSdk, Unsubscribe};
use crate::types::{PageRequest, TableId};
use futures_util::future::join_all;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Page size for count probes. The page response carries the table's total
/// regardless, so one record is enough.
const PROBE_PAGE_SIZE: usize = 1;

struct TableWatch {
    add: Unsubscribe,
    del: Unsubscribe,
}

struct TotalsShared {
    host: Arc<dyn HostSdk>,
    totals: RwLock<HashMap<TableId, Total>>,
    watches: Mutex<HashMap<TableId, TableWatch>>,
}

impl TotalsShared {
    /// The single reducer for event-driven count updates.
    ///
    /// Only numeric entries move: the sentinel stays sentinel and an absent
    /// key stays absent, so a delta arriving before the initial fetch (or
    /// after a reset) cannot fabricate a count.
    fn apply(&self, id: &TableId, update: TotalsUpdate) {
        let mut totals = self.totals.write();
        if let Some(Total::Count { value }) = totals.get(id).copied() {
            let next = match update {
                TotalsUpdate::RecordAdded => value + 1,
                TotalsUpdate::RecordRemoved => value.saturating_sub(1),
            };
            totals.insert(id.clone(), Total::count(next));
        }
    }
}

/// Per-table record counts for whatever set of tables is currently of
/// interest: the visible page, plus the full filtered candidate set while a
/// count filter is active.
///
/// Counts are fetched on demand, then maintained in place by per-table
/// add/delete record events; a table's event subscriptions are torn down
/// the moment it leaves the interest set. Each table's count converges
/// independently; there is no cross-table consistency guarantee.
pub struct TotalsCache {
    shared: Arc<TotalsShared>,
    /// Serializes recomputes so a batch's fetch list can never be derived
    /// twice from the same missing set.
    recompute_gate: tokio::sync::Mutex<()>,
}

impl TotalsCache {
    pub fn new(host: Arc<dyn HostSdk>) -> Self {
        Self {
            shared: Arc::new(TotalsShared {
                host,
                totals: RwLock::new(HashMap::new()),
                watches: Mutex::new(HashMap::new()),
            }),
            recompute_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Read-only snapshot of the count mapping.
    pub fn totals(&self) -> HashMap<TableId, Total> {
        self.shared.totals.read().clone()
    }

    /// Cached entry for one table: `None` means not yet fetched.
    pub fn total(&self, id: &TableId) -> Option<Total> {
        self.shared.totals.read().get(id).copied()
    }

    /// Clear the whole count mapping and nothing else.
    ///
    /// Per-table watches are reconciled by the next [`recompute`]; until
    /// then their deltas hit absent keys and the reducer guard drops them.
    ///
    /// [`recompute`]: TotalsCache::recompute
    pub fn reset(&self) {
        self.shared.totals.write().clear();
    }

    /// Bring the cache in line with the current interest set.
    ///
    /// Fetches totals for visible IDs absent from the cache, then (while
    /// the count filter is active) for absent candidate IDs, then diffs the
    /// interest set against the per-table watches: departed tables are
    /// detached immediately, newly interesting tables get record listeners.
    pub async fn recompute(
        &self,
        visible: &[TableId],
        candidates: &[TableId],
        filter_active: bool,
    ) {
        let _gate = self.recompute_gate.lock().await;
        self.fill_missing(visible).await;
        if filter_active {
            self.fill_missing(candidates).await;
        }
        self.sync_watches(visible, candidates, filter_active).await;
    }

    /// Probe totals for the IDs in `ids` not yet cached. All probes are
    /// issued concurrently; a per-ID failure settles as [`Total::Unknown`]
    /// without disturbing its siblings. The settled batch is merged under
    /// one write-lock acquisition.
    async fn fill_missing(&self, ids: &[TableId]) {
        let missing: Vec<TableId> = {
            let totals = self.shared.totals.read();
            let mut seen = HashSet::new();
            ids.iter()
                .filter(|id| !totals.contains_key(*id) && seen.insert((*id).clone()))
                .cloned()
                .collect()
        };
        if missing.is_empty() {
            return;
        }

        tracing::debug!(count = missing.len(), "probing totals");
        let probes = missing.into_iter().map(|id| {
            let host = Arc::clone(&self.shared.host);
            async move {
                let total = probe_total(host.as_ref(), &id).await;
                (id, total)
            }
        });
        let settled = join_all(probes).await;

        let mut totals = self.shared.totals.write();
        for (id, total) in settled {
            totals.insert(id, total);
        }
    }

    /// Reconcile per-table record listeners with the interest set.
    async fn sync_watches(&self, visible: &[TableId], candidates: &[TableId], filter_active: bool) {
        let mut interest: HashSet<TableId> = visible.iter().cloned().collect();
        if filter_active {
            interest.extend(candidates.iter().cloned());
        }

        let to_add: Vec<TableId> = {
            let mut watches = self.shared.watches.lock();
            let departed: Vec<TableId> = watches
                .keys()
                .filter(|id| !interest.contains(*id))
                .cloned()
                .collect();
            for id in departed {
                if let Some(watch) = watches.remove(&id) {
                    (watch.add)();
                    (watch.del)();
                }
            }
            interest
                .into_iter()
                .filter(|id| !watches.contains_key(id))
                .collect()
        };

        for id in to_add {
            match self.shared.host.table_by_id(&id).await {
                Ok(table) => {
                    let add = table.on_record_added(delta_listener(
                        &self.shared,
                        &id,
                        TotalsUpdate::RecordAdded,
                    ));
                    let del = table.on_record_deleted(delta_listener(
                        &self.shared,
                        &id,
                        TotalsUpdate::RecordRemoved,
                    ));
                    self.shared
                        .watches
                        .lock()
                        .insert(id, TableWatch { add, del });
                }
                Err(err) => {
                    // Retried on the next recompute while the ID stays
                    // interesting.
                    tracing::debug!(table = %id, error = %err, "record watch skipped");
                }
            }
        }
    }
}

impl Drop for TotalsCache {
    fn drop(&mut self) {
        let mut watches = self.shared.watches.lock();
        for (_, watch) in watches.drain() {
            (watch.add)();
            (watch.del)();
        }
    }
}

/// Listener translating one host record event into a reducer command.
fn delta_listener(shared: &Arc<TotalsShared>, id: &TableId, update: TotalsUpdate) -> EventListener {
    let weak = Arc::downgrade(shared);
    let id = id.clone();
    Arc::new(move || {
        if let Some(shared) = weak.upgrade() {
            shared.apply(&id, update);
        }
    })
}

async fn probe_total(host: &dyn HostSdk, id: &TableId) -> Total {
    let result = async {
        let table = host.table_by_id(id).await?;
        table
            .record_id_page(PageRequest {
                page_size: PROBE_PAGE_SIZE,
            })
            .await
    }
    .await;

    match result {
        Ok(page) => Total::count(page.total),
        Err(err) => {
            tracing::warn!(table = %id, error = %err, "count probe failed");
            Total::Unknown
        }
    }
}
