//! Scripted in-memory host for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use livebase::{
    EventListener, FieldMeta, HostSdk, PageRequest, PanelError, PermissionRequest, RecordId,
    RecordIdPage, Result, Selection, TableHandle, TableId, TableMeta, Theme, Toast, Unsubscribe,
    ViewId, ViewMeta,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Route tracing output through the test harness. Safe to call repeatedly.
pub fn trace_init() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A registry of host event listeners with scripted firing.
#[derive(Default)]
pub struct ListenerSet {
    next: AtomicU64,
    listeners: Mutex<HashMap<u64, EventListener>>,
}

impl ListenerSet {
    pub fn register(set: &Arc<ListenerSet>, listener: EventListener) -> Unsubscribe {
        let id = set.next.fetch_add(1, Ordering::SeqCst);
        set.listeners.lock().insert(id, listener);
        let set = Arc::clone(set);
        Box::new(move || {
            set.listeners.lock().remove(&id);
        })
    }

    /// Invoke every registered listener, as the host would.
    pub fn fire(&self) {
        let listeners: Vec<EventListener> = self.listeners.lock().values().cloned().collect();
        for listener in listeners {
            listener();
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }
}

/// One scripted table behind the mock host.
pub struct MockTable {
    id: TableId,
    total: Mutex<u64>,
    fail_pages: AtomicBool,
    page_fetches: AtomicUsize,
    views: Mutex<Vec<ViewMeta>>,
    active_view: Mutex<Option<ViewId>>,
    fields: Mutex<Vec<FieldMeta>>,
    pub record_added: Arc<ListenerSet>,
    pub record_deleted: Arc<ListenerSet>,
    pub field_added: Arc<ListenerSet>,
    pub field_deleted: Arc<ListenerSet>,
    pub field_modified: Arc<ListenerSet>,
}

impl MockTable {
    pub fn new(id: TableId, total: u64) -> Arc<Self> {
        Arc::new(Self {
            id,
            total: Mutex::new(total),
            fail_pages: AtomicBool::new(false),
            page_fetches: AtomicUsize::new(0),
            views: Mutex::new(Vec::new()),
            active_view: Mutex::new(None),
            fields: Mutex::new(Vec::new()),
            record_added: Arc::default(),
            record_deleted: Arc::default(),
            field_added: Arc::default(),
            field_deleted: Arc::default(),
            field_modified: Arc::default(),
        })
    }

    /// Make count probes fail until cleared.
    pub fn fail_pages(&self, fail: bool) {
        self.fail_pages.store(fail, Ordering::SeqCst);
    }

    /// Number of record-page calls seen so far.
    pub fn page_fetches(&self) -> usize {
        self.page_fetches.load(Ordering::SeqCst)
    }

    pub fn set_views(&self, views: Vec<ViewMeta>, active: Option<ViewId>) {
        *self.views.lock() = views;
        *self.active_view.lock() = active;
    }

    pub fn set_fields(&self, fields: Vec<FieldMeta>) {
        *self.fields.lock() = fields;
    }

    /// A record lands in the table: bump the true total, notify listeners.
    pub fn fire_record_added(&self) {
        *self.total.lock() += 1;
        self.record_added.fire();
    }

    pub fn fire_record_deleted(&self) {
        let mut total = self.total.lock();
        *total = total.saturating_sub(1);
        drop(total);
        self.record_deleted.fire();
    }

    pub fn fire_field_added(&self) {
        self.field_added.fire();
    }

    pub fn fire_field_modified(&self) {
        self.field_modified.fire();
    }
}

#[async_trait]
impl TableHandle for MockTable {
    fn id(&self) -> TableId {
        self.id.clone()
    }

    async fn record_id_page(&self, request: PageRequest) -> Result<RecordIdPage> {
        if self.fail_pages.load(Ordering::SeqCst) {
            return Err(PanelError::host("record page unavailable"));
        }
        self.page_fetches.fetch_add(1, Ordering::SeqCst);
        let total = *self.total.lock();
        let record_ids = (0..request.page_size.min(total as usize))
            .map(|i| RecordId(format!("rec{i}")))
            .collect();
        Ok(RecordIdPage { record_ids, total })
    }

    async fn view_meta_list(&self) -> Result<Vec<ViewMeta>> {
        Ok(self.views.lock().clone())
    }

    async fn active_view_id(&self) -> Result<Option<ViewId>> {
        Ok(self.active_view.lock().clone())
    }

    async fn field_meta_list(&self) -> Result<Vec<FieldMeta>> {
        Ok(self.fields.lock().clone())
    }

    fn on_record_added(&self, listener: EventListener) -> Unsubscribe {
        ListenerSet::register(&self.record_added, listener)
    }

    fn on_record_deleted(&self, listener: EventListener) -> Unsubscribe {
        ListenerSet::register(&self.record_deleted, listener)
    }

    fn on_field_added(&self, listener: EventListener) -> Unsubscribe {
        ListenerSet::register(&self.field_added, listener)
    }

    fn on_field_deleted(&self, listener: EventListener) -> Unsubscribe {
        ListenerSet::register(&self.field_deleted, listener)
    }

    fn on_field_modified(&self, listener: EventListener) -> Unsubscribe {
        ListenerSet::register(&self.field_modified, listener)
    }
}

/// Scripted base host: tables, selection, theme, permissions, toasts.
#[derive(Default)]
pub struct MockHost {
    tables: Mutex<Vec<(TableMeta, Arc<MockTable>)>>,
    selection: Mutex<Selection>,
    theme: Mutex<Theme>,
    fail_meta: AtomicBool,
    fail_permission_checks: AtomicBool,
    meta_fetches: AtomicUsize,
    selection_fetches: AtomicUsize,
    permissions: Mutex<HashMap<TableId, bool>>,
    failing_deletes: Mutex<HashSet<TableId>>,
    delete_delay: Mutex<Option<Duration>>,
    deleted: Mutex<Vec<TableId>>,
    toasts: Mutex<Vec<Toast>>,
    pub table_added: Arc<ListenerSet>,
    pub table_deleted: Arc<ListenerSet>,
    pub selection_changed: Arc<ListenerSet>,
    pub theme_changed: Arc<ListenerSet>,
}

impl MockHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Add a table without firing the table-added event; tests script the
    /// event explicitly when they want the notification path exercised.
    pub fn add_table(&self, id: &str, name: &str, total: u64) -> Arc<MockTable> {
        let table = MockTable::new(TableId::from(id), total);
        self.tables
            .lock()
            .push((TableMeta::new(id, name), Arc::clone(&table)));
        table
    }

    pub fn remove_table(&self, id: &TableId) {
        self.tables.lock().retain(|(meta, _)| meta.id != *id);
    }

    pub fn fail_meta(&self, fail: bool) {
        self.fail_meta.store(fail, Ordering::SeqCst);
    }

    pub fn fail_permission_checks(&self, fail: bool) {
        self.fail_permission_checks.store(fail, Ordering::SeqCst);
    }

    pub fn meta_fetches(&self) -> usize {
        self.meta_fetches.load(Ordering::SeqCst)
    }

    pub fn set_selection(&self, selection: Selection) {
        *self.selection.lock() = selection;
        self.selection_changed.fire();
    }

    pub fn set_theme(&self, theme: Theme) {
        *self.theme.lock() = theme;
        self.theme_changed.fire();
    }

    pub fn deny_permission(&self, id: &str) {
        self.permissions.lock().insert(TableId::from(id), false);
    }

    pub fn fail_delete_of(&self, id: &str) {
        self.failing_deletes.lock().insert(TableId::from(id));
    }

    pub fn set_delete_delay(&self, delay: Duration) {
        *self.delete_delay.lock() = Some(delay);
    }

    pub fn deleted(&self) -> Vec<TableId> {
        self.deleted.lock().clone()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().clone()
    }
}

#[async_trait]
impl HostSdk for MockHost {
    async fn table_meta_list(&self) -> Result<Vec<TableMeta>> {
        if self.fail_meta.load(Ordering::SeqCst) {
            return Err(PanelError::host("metadata unavailable"));
        }
        self.meta_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.tables.lock().iter().map(|(meta, _)| meta.clone()).collect())
    }

    async fn table_by_id(&self, id: &TableId) -> Result<Arc<dyn TableHandle>> {
        self.tables
            .lock()
            .iter()
            .find(|(meta, _)| meta.id == *id)
            .map(|(_, table)| Arc::clone(table) as Arc<dyn TableHandle>)
            .ok_or_else(|| PanelError::TableNotFound(id.clone()))
    }

    async fn selection(&self) -> Result<Selection> {
        self.selection_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.selection.lock().clone())
    }

    async fn theme(&self) -> Result<Theme> {
        Ok(*self.theme.lock())
    }

    async fn check_permission(&self, request: PermissionRequest) -> Result<bool> {
        if self.fail_permission_checks.load(Ordering::SeqCst) {
            return Err(PanelError::host("permission service down"));
        }
        let table_id = request
            .params
            .get("tableId")
            .and_then(|v| v.as_str())
            .map(TableId::from);
        Ok(match table_id {
            Some(id) => self.permissions.lock().get(&id).copied().unwrap_or(true),
            None => true,
        })
    }

    async fn delete_table(&self, id: &TableId) -> Result<bool> {
        let delay = *self.delete_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_deletes.lock().contains(id) {
            return Err(PanelError::host(format!("cannot delete {id}")));
        }
        let removed = {
            let mut tables = self.tables.lock();
            let before = tables.len();
            tables.retain(|(meta, _)| meta.id != *id);
            tables.len() < before
        };
        if !removed {
            return Err(PanelError::TableNotFound(id.clone()));
        }
        self.deleted.lock().push(id.clone());
        Ok(true)
    }

    fn show_toast(&self, toast: Toast) {
        self.toasts.lock().push(toast);
    }

    fn on_table_added(&self, listener: EventListener) -> Unsubscribe {
        ListenerSet::register(&self.table_added, listener)
    }

    fn on_table_deleted(&self, listener: EventListener) -> Unsubscribe {
        ListenerSet::register(&self.table_deleted, listener)
    }

    fn on_selection_changed(&self, listener: EventListener) -> Unsubscribe {
        ListenerSet::register(&self.selection_changed, listener)
    }

    fn on_theme_changed(&self, listener: EventListener) -> Unsubscribe {
        ListenerSet::register(&self.theme_changed, listener)
    }
}
