//! Reference-counted live views over host-owned resources.

use crate::broadcast::{BroadcastStore, SubscriberId, ValueSubscription};
use crate::error::Result;
use crate::host::{EventListener, Unsubscribe};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One host-observed resource class: how to fetch a snapshot of it, and
/// which host events invalidate that snapshot.
#[async_trait]
pub trait LiveSource: Send + Sync + 'static {
    type Value: Clone + Default + Send + Sync + 'static;

    /// Label used in log output.
    fn name(&self) -> &'static str;

    /// Fetch a full snapshot from the host.
    async fn fetch(&self) -> Result<Self::Value>;

    /// Register host change listeners. Every fire of `notify` must mean
    /// "the snapshot may be stale". Returns the unsubscribe handles.
    fn attach(&self, notify: EventListener) -> Vec<Unsubscribe>;
}

struct Lifecycle {
    refs: usize,
    unsubs: Vec<Unsubscribe>,
}

/// A [`LiveSource`] wrapped in a broadcast store and a reference-counted
/// lifecycle.
///
/// While at least one consumer holds an `ensure`, exactly one set of host
/// listeners is attached, no matter how many consumers share the resource.
/// The first `ensure` fetches the initial snapshot; each host notification
/// triggers a full refetch-and-republish (no incremental patching at this
/// layer). `stop` from the last consumer detaches the listeners but keeps
/// the last snapshot readable until the next `ensure`.
///
/// Instances are expected to live for the whole process (owned by a
/// [`LiveHub`](crate::live::LiveHub)); there is no teardown on drop.
pub struct LiveResource<S: LiveSource> {
    source: Arc<S>,
    store: Arc<BroadcastStore<S::Value>>,
    lifecycle: Mutex<Lifecycle>,
}

impl<S: LiveSource> LiveResource<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            store: Arc::new(BroadcastStore::new(S::Value::default())),
            lifecycle: Mutex::new(Lifecycle {
                refs: 0,
                unsubs: Vec::new(),
            }),
        }
    }

    /// Register interest. The 0→1 transition performs one host fetch and
    /// one listener registration; further calls only bump the count.
    /// Concurrent callers serialize on the lifecycle lock, so N concurrent
    /// `ensure`s still produce exactly one fetch.
    pub async fn ensure(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        lifecycle.refs += 1;
        if lifecycle.refs > 1 {
            return;
        }
        refresh(self.source.as_ref(), self.store.as_ref()).await;
        lifecycle.unsubs = self.source.attach(self.refresh_listener());
    }

    /// Release interest. Host listeners are detached only when the count
    /// reaches zero; the last published snapshot stays readable (stale).
    /// A `stop` with no matching `ensure` is a no-op.
    pub async fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.refs == 0 {
            return;
        }
        lifecycle.refs -= 1;
        if lifecycle.refs > 0 {
            return;
        }
        for unsub in lifecycle.unsubs.drain(..) {
            unsub();
        }
    }

    /// Whether any consumer currently holds the resource live.
    pub async fn is_live(&self) -> bool {
        self.lifecycle.lock().await.refs > 0
    }

    /// Last published snapshot (the `Default` before the first fetch).
    pub fn get(&self) -> S::Value {
        self.store.get()
    }

    /// Subscribe to snapshot updates; the current snapshot is delivered
    /// immediately.
    pub fn subscribe(&self) -> ValueSubscription<S::Value> {
        self.store.subscribe()
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.store.unsubscribe(id);
    }

    /// Host listener that refetches and republishes off the event path.
    fn refresh_listener(&self) -> EventListener {
        let source = Arc::clone(&self.source);
        let store = Arc::clone(&self.store);
        let runtime = tokio::runtime::Handle::current();
        Arc::new(move || {
            let source = Arc::clone(&source);
            let store = Arc::clone(&store);
            runtime.spawn(async move {
                refresh(source.as_ref(), store.as_ref()).await;
            });
        })
    }
}

/// Fetch and publish, best-effort. On failure the store keeps its last
/// value; the hub has no UI surface to report through.
async fn refresh<S: LiveSource>(source: &S, store: &BroadcastStore<S::Value>) {
    match source.fetch().await {
        Ok(value) => {
            tracing::debug!(resource = source.name(), "publishing refreshed snapshot");
            store.set(value);
        }
        Err(err) => {
            tracing::warn!(
                resource = source.name(),
                error = %err,
                "refresh failed, keeping last snapshot"
            );
        }
    }
}
