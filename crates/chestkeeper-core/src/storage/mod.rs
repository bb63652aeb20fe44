//! Record storage layer
//!
//! [`RecordStore`] is the only shared mutable resource in Chestkeeper. Every
//! implementation must be safe to call concurrently from the coordination
//! path (loads, deletes) and from background save tasks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   RecordStore                       │
//! ├─────────────────────────────────────────────────────┤
//! │      records          │          players            │
//! │  (slots per identity) │  (display name per identity)│
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Name lookups only consider identities that currently have a record, so a
//! deleted record stops resolving by name.

pub mod memory_store;
pub mod sqlite_store;

pub use memory_store::MemoryRecordStore;
pub use sqlite_store::SqliteRecordStore;

use crate::{Identity, Result, Slot};

/// Durable mapping from an identity to its inventory record
pub trait RecordStore: Send + Sync {
    /// Load the stored slots, `None` if the identity has no record
    fn load(&self, identity: Identity) -> Result<Option<Vec<Slot>>>;

    /// Store the slots, replacing any previous record
    fn save(&self, identity: Identity, slots: &[Slot]) -> Result<()>;

    /// Remove the record. Deleting an absent record succeeds.
    fn delete(&self, identity: Identity) -> Result<()>;

    /// Identity whose record is stored under this exact display name
    fn find_by_name(&self, name: &str) -> Result<Option<Identity>>;

    /// Display names of every identity that currently has a record
    fn known_names(&self) -> Result<Vec<String>>;

    /// Associate a display name with an identity
    fn remember_name(&self, identity: Identity, name: &str) -> Result<()>;

    /// True when the identity has a stored record
    fn exists(&self, identity: Identity) -> Result<bool> {
        Ok(self.load(identity)?.is_some())
    }
}
