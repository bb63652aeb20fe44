//! In-memory record store

use parking_lot::RwLock;
use std::collections::HashMap;

use super::RecordStore;
use crate::{Identity, Result, Slot};

/// Display name plus the order in which it was last seen
#[derive(Debug)]
struct Sighting {
    name: String,
    seq: u64,
}

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<Identity, Vec<Slot>>,
    names: HashMap<Identity, Sighting>,
    next_seq: u64,
}

/// Record store kept entirely in memory
///
/// Used by tests and by the console binary when no database path is given.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    inner: RwLock<Inner>,
}

impl MemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn record_count(&self) -> usize {
        self.inner.read().records.len()
    }
}

impl RecordStore for MemoryRecordStore {
    fn load(&self, identity: Identity) -> Result<Option<Vec<Slot>>> {
        Ok(self.inner.read().records.get(&identity).cloned())
    }

    fn save(&self, identity: Identity, slots: &[Slot]) -> Result<()> {
        self.inner.write().records.insert(identity, slots.to_vec());
        Ok(())
    }

    fn delete(&self, identity: Identity) -> Result<()> {
        self.inner.write().records.remove(&identity);
        Ok(())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Identity>> {
        let inner = self.inner.read();
        let found = inner
            .names
            .iter()
            .filter(|(id, seen)| seen.name == name && inner.records.contains_key(id))
            .max_by_key(|(_, seen)| seen.seq)
            .map(|(id, _)| *id);
        Ok(found)
    }

    fn known_names(&self) -> Result<Vec<String>> {
        let inner = self.inner.read();
        let mut names: Vec<String> = inner
            .names
            .iter()
            .filter(|(id, _)| inner.records.contains_key(id))
            .map(|(_, seen)| seen.name.clone())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn remember_name(&self, identity: Identity, name: &str) -> Result<()> {
        let mut inner = self.inner.write();
        inner.next_seq += 1;
        let seq = inner.next_seq;
        inner.names.insert(
            identity,
            Sighting {
                name: name.to_string(),
                seq,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Item;
    use serde_json::json;

    #[test]
    fn test_missing_record_loads_as_none() {
        let store = MemoryRecordStore::new();
        assert!(store.load(Identity::new()).unwrap().is_none());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = MemoryRecordStore::new();
        let id = Identity::new();
        store.save(id, &[Some(Item::new(json!("apple")))]).unwrap();
        store.delete(id).unwrap();
        store.delete(id).unwrap();
        assert!(!store.exists(id).unwrap());
    }

    #[test]
    fn test_name_lookup_requires_record() {
        let store = MemoryRecordStore::new();
        let id = Identity::new();
        store.remember_name(id, "Steve").unwrap();
        assert_eq!(store.find_by_name("Steve").unwrap(), None);

        store.save(id, &[]).unwrap();
        assert_eq!(store.find_by_name("Steve").unwrap(), Some(id));
        assert_eq!(store.find_by_name("steve").unwrap(), None);
        assert_eq!(store.known_names().unwrap(), vec!["Steve".to_string()]);
    }
}
