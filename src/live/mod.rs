//! Live resource hub: shared, reference-counted views of host-owned state.
//!
//! Each resource class (table metadata, selection, theme) is wrapped in a
//! [`LiveResource`]: a broadcast store plus the glue that refreshes it from
//! the host and re-subscribes to host change events. Multiple independent
//! consumers calling `ensure` share exactly one underlying host subscription
//! and one in-memory snapshot.
//!
//! # Example
//!
//! ```ignore
//! let hub = LiveHub::new(host);
//!
//! hub.tables().ensure().await;
//! let sub = hub.tables().subscribe();
//! while let Ok(list) = sub.recv() {
//!     println!("{} tables", list.len());
//! }
//! ```

mod hub;
mod poll;
mod resource;
mod table;

pub use hub::{LiveHub, SelectionSource, TableListSource, ThemeSource};
pub use poll::RefreshTask;
pub use resource::{LiveResource, LiveSource};
pub use table::{FieldsWatch, ViewsSnapshot, ViewsWatch};
