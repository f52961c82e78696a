//! The host SDK boundary.
//!
//! The surrounding base application owns all storage and mutation; the panel
//! reaches it only through these traits. Change notifications are callback
//! registrations returning an [`Unsubscribe`] handle, matching the host's
//! event surface. Implementations live outside this crate (a real SDK bridge
//! in production, a scripted mock in tests).

use crate::error::Result;
use crate::types::{
    FieldMeta, PageRequest, PermissionRequest, RecordIdPage, Selection, TableId, TableMeta, Theme,
    Toast, ViewId, ViewMeta,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Cancels a host event registration. Invoking it detaches the listener.
pub type Unsubscribe = Box<dyn FnOnce() + Send>;

/// Listener invoked by the host when a watched event fires.
///
/// Listeners carry no payload: the panel treats every notification as an
/// invalidation and reconciles from the source of truth.
pub type EventListener = Arc<dyn Fn() + Send + Sync>;

/// Base-level host surface: metadata, selection, permissions, commands.
#[async_trait]
pub trait HostSdk: Send + Sync {
    /// List metadata for every table in the base.
    async fn table_meta_list(&self) -> Result<Vec<TableMeta>>;

    /// Get a handle to one table.
    async fn table_by_id(&self, id: &TableId) -> Result<Arc<dyn TableHandle>>;

    /// Current selection snapshot.
    async fn selection(&self) -> Result<Selection>;

    /// Current UI theme.
    async fn theme(&self) -> Result<Theme>;

    /// Ask the host whether an action is permitted.
    async fn check_permission(&self, request: PermissionRequest) -> Result<bool>;

    /// Delete a table. The returned flag is the host's own success report.
    async fn delete_table(&self, id: &TableId) -> Result<bool>;

    /// Show a toast notification through the host UI.
    fn show_toast(&self, toast: Toast);

    fn on_table_added(&self, listener: EventListener) -> Unsubscribe;

    fn on_table_deleted(&self, listener: EventListener) -> Unsubscribe;

    fn on_selection_changed(&self, listener: EventListener) -> Unsubscribe;

    fn on_theme_changed(&self, listener: EventListener) -> Unsubscribe;
}

/// Per-table host surface.
#[async_trait]
pub trait TableHandle: Send + Sync {
    fn id(&self) -> TableId;

    /// Page through record IDs. The response carries the table's total
    /// record count regardless of page size, so a `page_size` of 1 is a
    /// cheap count probe.
    async fn record_id_page(&self, request: PageRequest) -> Result<RecordIdPage>;

    /// List view metadata for this table.
    async fn view_meta_list(&self) -> Result<Vec<ViewMeta>>;

    /// ID of the currently active view, if any.
    async fn active_view_id(&self) -> Result<Option<ViewId>>;

    /// List field metadata for this table.
    async fn field_meta_list(&self) -> Result<Vec<FieldMeta>>;

    fn on_record_added(&self, listener: EventListener) -> Unsubscribe;

    fn on_record_deleted(&self, listener: EventListener) -> Unsubscribe;

    fn on_field_added(&self, listener: EventListener) -> Unsubscribe;

    fn on_field_deleted(&self, listener: EventListener) -> Unsubscribe;

    fn on_field_modified(&self, listener: EventListener) -> Unsubscribe;
}
