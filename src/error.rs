//! Error types for the panel core.

use crate::types::TableId;
use thiserror::Error;

/// Main error type for panel operations.
///
/// Host-call failures inside the live layer are contained where they occur
/// (the affected value degrades to a default or sentinel); `Host` surfaces
/// only from operations with a caller to report to, such as batch deletes.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("host call failed: {0}")]
    Host(String),

    #[error("table not found: {0}")]
    TableNotFound(TableId),

    #[error("a batch delete is already in progress")]
    DeleteInProgress,
}

impl PanelError {
    /// Host-side failure with a caller-facing message.
    pub fn host(message: impl Into<String>) -> Self {
        PanelError::Host(message.into())
    }
}

/// Result type for panel operations.
pub type Result<T> = std::result::Result<T, PanelError>;
