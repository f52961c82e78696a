//! Batch table deletion: permission partition, concurrent deletes, toast
//! summary.

use crate::error::{PanelError, Result};
use crate::host::HostSdk;
use crate::types::{PermissionRequest, TableId, Toast};
use futures_util::future::join_all;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outcome of one batch delete run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DeleteSummary {
    pub requested: usize,
    pub denied: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Deletes batches of tables through the host, reporting outcomes as toast
/// notifications.
///
/// Requested IDs are partitioned by a concurrent permission check; allowed
/// IDs are deleted concurrently with all-settled semantics, so one failure
/// never blocks its siblings. Failures are not retried. The busy flag is
/// released on every path.
pub struct BatchDeleter {
    host: Arc<dyn HostSdk>,
    busy: AtomicBool,
}

/// Clears the busy flag on drop, covering error and success paths alike.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl BatchDeleter {
    pub fn new(host: Arc<dyn HostSdk>) -> Self {
        Self {
            host,
            busy: AtomicBool::new(false),
        }
    }

    /// Whether a batch delete is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Delete `ids`, reporting denied/succeeded/failed counts as toasts.
    ///
    /// An empty input returns an all-zero summary with no host traffic.
    /// A call while another batch is in flight fails with
    /// [`PanelError::DeleteInProgress`]. A permission-check failure aborts
    /// the run with an error toast before any delete is issued.
    pub async fn delete_tables(&self, ids: &[TableId]) -> Result<DeleteSummary> {
        if ids.is_empty() {
            return Ok(DeleteSummary::default());
        }
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(PanelError::DeleteInProgress);
        }
        let _busy = BusyGuard(&self.busy);

        match self.run(ids).await {
            Ok(summary) => {
                tracing::debug!(?summary, "batch delete finished");
                Ok(summary)
            }
            Err(err) => {
                let message = match &err {
                    PanelError::Host(message) if !message.is_empty() => message.clone(),
                    _ => "Delete failed".to_string(),
                };
                self.host.show_toast(Toast::error(message));
                Err(err)
            }
        }
    }

    async fn run(&self, ids: &[TableId]) -> Result<DeleteSummary> {
        let checks = join_all(
            ids.iter()
                .map(|id| self.host.check_permission(PermissionRequest::delete_table(id))),
        )
        .await;

        let mut allowed = Vec::new();
        let mut denied = 0usize;
        for (id, check) in ids.iter().zip(checks) {
            if check? {
                allowed.push(id.clone());
            } else {
                denied += 1;
            }
        }
        if denied > 0 {
            self.host
                .show_toast(Toast::warning(format!("No permission to delete {denied} table(s)")));
        }

        let outcomes = join_all(allowed.iter().map(|id| self.host.delete_table(id))).await;
        let deleted = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
        let failed = outcomes.len() - deleted;
        if deleted > 0 {
            self.host
                .show_toast(Toast::success(format!("Deleted {deleted} table(s)")));
        }
        if failed > 0 {
            self.host
                .show_toast(Toast::error(format!("Failed to delete {failed} table(s)")));
        }

        Ok(DeleteSummary {
            requested: ids.len(),
            denied,
            deleted,
            failed,
        })
    }
}
