//! Process-wide hub of live host resources.

use crate::error::Result;
use crate::host::{EventListener, HostSdk, Unsubscribe};
use crate::live::resource::{LiveResource, LiveSource};
use crate::types::{Selection, TableMeta, Theme};
use async_trait::async_trait;
use std::sync::Arc;

/// Live view of the base's table metadata list.
pub struct TableListSource {
    host: Arc<dyn HostSdk>,
}

#[async_trait]
impl LiveSource for TableListSource {
    type Value = Vec<TableMeta>;

    fn name(&self) -> &'static str {
        "tables"
    }

    async fn fetch(&self) -> Result<Vec<TableMeta>> {
        self.host.table_meta_list().await
    }

    fn attach(&self, notify: EventListener) -> Vec<Unsubscribe> {
        vec![
            self.host.on_table_added(Arc::clone(&notify)),
            self.host.on_table_deleted(notify),
        ]
    }
}

/// Live view of the current selection.
pub struct SelectionSource {
    host: Arc<dyn HostSdk>,
}

#[async_trait]
impl LiveSource for SelectionSource {
    type Value = Selection;

    fn name(&self) -> &'static str {
        "selection"
    }

    async fn fetch(&self) -> Result<Selection> {
        self.host.selection().await
    }

    fn attach(&self, notify: EventListener) -> Vec<Unsubscribe> {
        vec![self.host.on_selection_changed(notify)]
    }
}

/// Live view of the host theme.
pub struct ThemeSource {
    host: Arc<dyn HostSdk>,
}

#[async_trait]
impl LiveSource for ThemeSource {
    type Value = Theme;

    fn name(&self) -> &'static str {
        "theme"
    }

    async fn fetch(&self) -> Result<Theme> {
        self.host.theme().await
    }

    fn attach(&self, notify: EventListener) -> Vec<Unsubscribe> {
        vec![self.host.on_theme_changed(notify)]
    }
}

/// Shared live views of host-owned collections.
///
/// One hub instance is constructed at startup and lives for the whole
/// process; every UI consumer goes through it, so each resource carries at
/// most one set of host subscriptions regardless of consumer count. Tests
/// may construct as many independent hubs as they like.
pub struct LiveHub {
    tables: LiveResource<TableListSource>,
    selection: LiveResource<SelectionSource>,
    theme: LiveResource<ThemeSource>,
}

impl LiveHub {
    pub fn new(host: Arc<dyn HostSdk>) -> Self {
        Self {
            tables: LiveResource::new(TableListSource {
                host: Arc::clone(&host),
            }),
            selection: LiveResource::new(SelectionSource {
                host: Arc::clone(&host),
            }),
            theme: LiveResource::new(ThemeSource { host }),
        }
    }

    /// Table metadata list: `ensure`/`stop`/`get`/`subscribe`.
    pub fn tables(&self) -> &LiveResource<TableListSource> {
        &self.tables
    }

    /// Selection snapshot.
    pub fn selection(&self) -> &LiveResource<SelectionSource> {
        &self.selection
    }

    /// Host theme.
    pub fn theme(&self) -> &LiveResource<ThemeSource> {
        &self.theme
    }
}
