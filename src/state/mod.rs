//! State Management Module
//!
//! Provides the project store, pure reducers, undo/redo history and
//! key/value persistence of project snapshots.

pub mod history;
pub mod reducer;
pub mod storage;
pub mod store;

pub use history::{History, HistoryEntry, DEFAULT_MAX_UNDO_LEVELS};
pub use reducer::{reduce, Action, Outcome};
pub use storage::{load_snapshot, save_snapshot, KeyValueStore, MemoryStore, ProjectSnapshot};
pub use store::{ListenerId, ProjectStore, Selection, StoreEvent};
