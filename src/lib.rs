//! # Live Base Panel Core
//!
//! Live-state synchronization and on-demand aggregation for a plugin panel
//! hosted inside a spreadsheet-like "base" document. The host application
//! owns all storage and mutation; this crate observes it through an
//! abstract SDK boundary and keeps panel state current without redundant
//! polling.
//!
//! ## Core Concepts
//!
//! - **Broadcast stores**: one current value, many subscribers, replay on
//!   subscribe
//! - **Live resources**: reference-counted host subscriptions shared by
//!   every consumer of a resource class (tables, selection, theme)
//! - **Totals cache**: per-table record counts fetched on demand for the
//!   interest set and patched in place by record add/delete events
//! - **Batch delete**: permission-partitioned concurrent deletes with toast
//!   summaries
//!
//! ## Example
//!
//! ```ignore
//! use livebase::{BatchDeleter, LiveHub, TotalsCache};
//!
//! let hub = LiveHub::new(host.clone());
//! hub.tables().ensure().await;
//!
//! let totals = TotalsCache::new(host.clone());
//! totals.recompute(&visible_ids, &[], false).await;
//!
//! for meta in hub.tables().get() {
//!     println!("{}: {:?}", meta.name, totals.total(&meta.id));
//! }
//! ```

pub mod broadcast;
pub mod delete;
pub mod error;
pub mod filters;
pub mod host;
pub mod live;
pub mod totals;
pub mod types;

// Re-exports
pub use broadcast::{BroadcastStore, SubscriberId, ValueSubscription};
pub use delete::{BatchDeleter, DeleteSummary};
pub use error::{PanelError, Result};
pub use filters::{filter_by_search, filter_by_total, page_window, TotalFilter, TotalOp};
pub use host::{EventListener, HostSdk, TableHandle, Unsubscribe};
pub use live::{
    FieldsWatch, LiveHub, LiveResource, LiveSource, RefreshTask, SelectionSource, TableListSource,
    ThemeSource, ViewsSnapshot, ViewsWatch,
};
pub use totals::{Total, TotalsCache, TotalsUpdate};
pub use types::*;
