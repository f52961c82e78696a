//! Per-table live views: view metadata (polled) and field metadata
//! (event-driven).

use crate::broadcast::{BroadcastStore, SubscriberId, ValueSubscription};
use crate::error::Result;
use crate::host::{EventListener, HostSdk, TableHandle, Unsubscribe};
use crate::live::poll::RefreshTask;
use crate::types::{FieldMeta, TableId, ViewId, ViewMeta};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// View metadata for one table plus the currently active view.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewsSnapshot {
    pub views: Vec<ViewMeta>,
    pub active_view_id: Option<ViewId>,
}

/// Polled live view of one table's view metadata.
///
/// The host exposes no view-change events, so freshness comes from a
/// [`RefreshTask`]; the poll publishes only when the snapshot actually
/// changed. Dropping the watch cancels the task.
pub struct ViewsWatch {
    store: Arc<BroadcastStore<ViewsSnapshot>>,
    task: RefreshTask,
}

impl ViewsWatch {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

    pub fn start(host: Arc<dyn HostSdk>, table_id: TableId, interval: Duration) -> Self {
        let store = Arc::new(BroadcastStore::new(ViewsSnapshot::default()));
        let poll_store = Arc::clone(&store);
        let task = RefreshTask::spawn(interval, move || {
            let host = Arc::clone(&host);
            let table_id = table_id.clone();
            let store = Arc::clone(&poll_store);
            async move {
                match fetch_views(host.as_ref(), &table_id).await {
                    Ok(snapshot) => {
                        if snapshot != store.get() {
                            store.set(snapshot);
                        }
                    }
                    Err(err) => {
                        tracing::warn!(table = %table_id, error = %err, "view poll failed");
                    }
                }
            }
        });
        Self { store, task }
    }

    pub fn get(&self) -> ViewsSnapshot {
        self.store.get()
    }

    pub fn subscribe(&self) -> ValueSubscription<ViewsSnapshot> {
        self.store.subscribe()
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.store.unsubscribe(id);
    }

    /// Stop polling. The last snapshot stays readable.
    pub fn stop(&mut self) {
        self.task.cancel();
    }
}

async fn fetch_views(host: &dyn HostSdk, id: &TableId) -> Result<ViewsSnapshot> {
    let table = host.table_by_id(id).await?;
    let views = table.view_meta_list().await?;
    let active_view_id = table.active_view_id().await?;
    Ok(ViewsSnapshot {
        views,
        active_view_id,
    })
}

/// Event-driven live view of one table's field metadata.
///
/// Refetches the full field list on every field added/deleted/modified
/// event. If the table handle cannot be acquired the watch stays empty and
/// inert, mirroring the hub's best-effort policy.
pub struct FieldsWatch {
    store: Arc<BroadcastStore<Vec<FieldMeta>>>,
    unsubs: Vec<Unsubscribe>,
}

impl FieldsWatch {
    pub async fn start(host: Arc<dyn HostSdk>, table_id: TableId) -> Self {
        let store = Arc::new(BroadcastStore::new(Vec::new()));
        let table = match host.table_by_id(&table_id).await {
            Ok(table) => table,
            Err(err) => {
                tracing::warn!(table = %table_id, error = %err, "fields watch could not start");
                return Self {
                    store,
                    unsubs: Vec::new(),
                };
            }
        };

        refresh_fields(table.as_ref(), store.as_ref()).await;

        let notify = refetch_listener(Arc::clone(&table), Arc::clone(&store));
        let unsubs = vec![
            table.on_field_added(Arc::clone(&notify)),
            table.on_field_deleted(Arc::clone(&notify)),
            table.on_field_modified(notify),
        ];
        Self { store, unsubs }
    }

    pub fn get(&self) -> Vec<FieldMeta> {
        self.store.get()
    }

    pub fn subscribe(&self) -> ValueSubscription<Vec<FieldMeta>> {
        self.store.subscribe()
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.store.unsubscribe(id);
    }

    /// Detach the field listeners. Idempotent; also runs on drop.
    pub fn stop(&mut self) {
        for unsub in self.unsubs.drain(..) {
            unsub();
        }
    }
}

impl Drop for FieldsWatch {
    fn drop(&mut self) {
        self.stop();
    }
}

fn refetch_listener(
    table: Arc<dyn TableHandle>,
    store: Arc<BroadcastStore<Vec<FieldMeta>>>,
) -> EventListener {
    let runtime = tokio::runtime::Handle::current();
    Arc::new(move || {
        let table = Arc::clone(&table);
        let store = Arc::clone(&store);
        runtime.spawn(async move {
            refresh_fields(table.as_ref(), store.as_ref()).await;
        });
    })
}

async fn refresh_fields(table: &dyn TableHandle, store: &BroadcastStore<Vec<FieldMeta>>) {
    match table.field_meta_list().await {
        Ok(fields) => store.set(fields),
        Err(err) => {
            tracing::warn!(table = %table.id(), error = %err, "field refresh failed");
        }
    }
}
