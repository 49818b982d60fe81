//! Named header → cell mappings: on-disk records and in-memory editing.

pub mod editor;
pub mod store;

pub use editor::{HISTORY_LIMIT, MappingEditor};
pub use store::{LAST_SELECTED_FILE, MappingStore, RECORD_EXTENSION};
