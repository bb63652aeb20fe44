//! Chestkeeper Core - inventory records and the stores that persist them
//!
//! This crate owns the data model shared by every Chestkeeper component and
//! the [`RecordStore`] contract the session layer persists through.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   RecordStore                       │
//! ├─────────────────────────────────────────────────────┤
//! │  MemoryRecordStore        │  SqliteRecordStore      │
//! │  (tests, demos)           │  (WAL, one row/record)  │
//! └─────────────────────────────────────────────────────┘
//!         ↑ load / save / delete / find_by_name / known_names
//! ```
//!
//! # Quick Start
//!
//! ```
//! use chestkeeper_core::{Identity, InventoryRecord, Item, MemoryRecordStore, RecordStore};
//!
//! let store = MemoryRecordStore::new();
//! let owner = Identity::new();
//!
//! let mut record = InventoryRecord::empty();
//! record.set(0, Some(Item::new(serde_json::json!({"id": "diamond", "count": 3})))).unwrap();
//! store.save(owner, record.slots()).unwrap();
//!
//! let loaded = InventoryRecord::from_slots(store.load(owner).unwrap().unwrap());
//! assert_eq!(loaded, record);
//! ```

#![deny(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod error;
pub mod storage;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{CoreError, Result};
pub use storage::{MemoryRecordStore, RecordStore, SqliteRecordStore};
pub use types::{Identity, InventoryRecord, Item, Slot, Timestamp, RECORD_CAPACITY};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
