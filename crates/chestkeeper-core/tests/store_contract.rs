//! Contract tests shared by every RecordStore implementation
//!
//! Each check runs against the in-memory store and a file-backed SQLite store.

use chestkeeper_core::{
    Identity, InventoryRecord, Item, MemoryRecordStore, RecordStore, Slot, SqliteRecordStore,
    RECORD_CAPACITY,
};
use serde_json::json;

fn stores() -> (tempfile::TempDir, Vec<(&'static str, Box<dyn RecordStore>)>) {
    let dir = tempfile::tempdir().expect("temp dir");
    let sqlite = SqliteRecordStore::open(dir.path().join("nested/chests.db"))
        .expect("file-backed store should open");
    let stores: Vec<(&'static str, Box<dyn RecordStore>)> = vec![
        ("memory", Box::new(MemoryRecordStore::new())),
        ("sqlite", Box::new(sqlite)),
    ];
    (dir, stores)
}

fn oversized_contents() -> Vec<Slot> {
    (0..RECORD_CAPACITY + 9)
        .map(|i| (i % 2 == 0).then(|| Item::new(json!({ "slot": i }))))
        .collect()
}

#[test]
fn saved_record_loads_back_at_full_capacity() {
    let (_dir, stores) = stores();
    for (label, store) in stores {
        let owner = Identity::new();
        let contents = oversized_contents();

        let record = InventoryRecord::from_slots(contents.clone());
        store.save(owner, record.slots()).unwrap();

        let loaded = InventoryRecord::from_slots(store.load(owner).unwrap().unwrap());
        assert_eq!(loaded.slots().len(), RECORD_CAPACITY, "{label}");
        assert_eq!(loaded.slots(), &contents[..RECORD_CAPACITY], "{label}");
    }
}

#[test]
fn deleted_record_loads_as_empty() {
    let (_dir, stores) = stores();
    for (label, store) in stores {
        let owner = Identity::new();
        store.save(owner, &[Some(Item::new(json!("shulker")))]).unwrap();
        store.delete(owner).unwrap();

        let loaded = store.load(owner).unwrap();
        assert!(loaded.is_none(), "{label}");
        let record = InventoryRecord::from_slots(loaded.unwrap_or_default());
        assert!(record.is_empty(), "{label}");
    }
}

#[test]
fn name_lookup_is_case_sensitive() {
    let (_dir, stores) = stores();
    for (label, store) in stores {
        let owner = Identity::new();
        store.remember_name(owner, "Herobrine").unwrap();
        store.save(owner, &[]).unwrap();

        assert_eq!(store.find_by_name("Herobrine").unwrap(), Some(owner), "{label}");
        assert_eq!(store.find_by_name("herobrine").unwrap(), None, "{label}");
        assert!(store.exists(owner).unwrap(), "{label}");
    }
}

#[test]
fn shared_name_resolves_to_latest_sighting() {
    let (_dir, stores) = stores();
    for (label, store) in stores {
        let first = Identity::new();
        let second = Identity::new();
        store.save(first, &[]).unwrap();
        store.save(second, &[]).unwrap();

        store.remember_name(first, "Alex").unwrap();
        store.remember_name(second, "Alex").unwrap();
        assert_eq!(store.find_by_name("Alex").unwrap(), Some(second), "{label}");

        store.remember_name(first, "Alex").unwrap();
        assert_eq!(store.find_by_name("Alex").unwrap(), Some(first), "{label}");
        assert_eq!(store.known_names().unwrap(), vec!["Alex".to_string()], "{label}");

        store.delete(first).unwrap();
        assert_eq!(store.find_by_name("Alex").unwrap(), Some(second), "{label}");
    }
}

#[test]
fn file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chests.db");
    let owner = Identity::new();

    {
        let store = SqliteRecordStore::open(&path).unwrap();
        store.remember_name(owner, "Ada").unwrap();
        store.save(owner, &[None, Some(Item::new(json!("elytra")))]).unwrap();
    }

    let reopened = SqliteRecordStore::open(&path).unwrap();
    assert_eq!(reopened.find_by_name("Ada").unwrap(), Some(owner));
    let loaded = InventoryRecord::from_slots(reopened.load(owner).unwrap().unwrap());
    assert_eq!(loaded.get(1), Some(&Some(Item::new(json!("elytra")))));
}
