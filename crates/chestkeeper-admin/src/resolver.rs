//! Identity resolution by player name

use chestkeeper_core::{Identity, RecordStore};
use std::collections::HashSet;
use std::sync::Arc;

use crate::presentation::PlayerDirectory;
use crate::{AdminError, Result};

/// Maps a player name to the identity whose record it refers to
///
/// Live sources win over the store: a connected player named "Alex" is
/// chosen even if the store still has an older "Alex" record.
#[derive(Clone)]
pub struct IdentityResolver {
    directory: Arc<dyn PlayerDirectory>,
    store: Arc<dyn RecordStore>,
}

impl IdentityResolver {
    pub fn new(directory: Arc<dyn PlayerDirectory>, store: Arc<dyn RecordStore>) -> Self {
        Self { directory, store }
    }

    /// Resolve `name`: connected players, then previously seen players, then
    /// the store's display names (exact match).
    pub fn resolve(&self, name: &str) -> Result<Identity> {
        if let Some(identity) = self.directory.online_by_name(name) {
            return Ok(identity);
        }

        if let Some(identity) = self.directory.seen_before(name) {
            return Ok(identity);
        }

        match self.store.find_by_name(name) {
            Ok(Some(identity)) => Ok(identity),
            Ok(None) => Err(AdminError::TargetNotFound(name.to_string())),
            Err(e) => {
                tracing::warn!("Store lookup for '{}' failed: {}", name, e);
                Err(AdminError::TargetNotFound(name.to_string()))
            }
        }
    }

    /// Names starting with `prefix` (case-insensitive): connected players
    /// first, then names known to the store.
    pub fn candidates(&self, prefix: &str) -> Vec<String> {
        let stored = self.store.known_names().unwrap_or_else(|e| {
            tracing::warn!("Listing stored names failed: {}", e);
            Vec::new()
        });

        let prefix = prefix.to_lowercase();
        let mut seen = HashSet::new();
        self.directory
            .online_names()
            .into_iter()
            .chain(stored)
            .filter(|name| name.to_lowercase().starts_with(&prefix))
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryDirectory;
    use chestkeeper_core::MemoryRecordStore;

    fn setup() -> (Arc<InMemoryDirectory>, Arc<MemoryRecordStore>, IdentityResolver) {
        let directory = Arc::new(InMemoryDirectory::new());
        let store = Arc::new(MemoryRecordStore::new());
        let resolver = IdentityResolver::new(directory.clone(), store.clone());
        (directory, store, resolver)
    }

    #[test]
    fn test_online_player_wins_over_stale_record() {
        let (directory, store, resolver) = setup();
        let stale = Identity::new();
        store.remember_name(stale, "Alice").unwrap();
        store.save(stale, &[]).unwrap();

        let live = directory.connect("Alice");
        assert_eq!(resolver.resolve("Alice").unwrap(), live);
    }

    #[test]
    fn test_offline_player_resolves() {
        let (directory, _store, resolver) = setup();
        let id = directory.connect("Bob");
        directory.disconnect("Bob");
        assert_eq!(resolver.resolve("Bob").unwrap(), id);
    }

    #[test]
    fn test_store_fallback_and_not_found() {
        let (_directory, store, resolver) = setup();
        let id = Identity::new();
        store.remember_name(id, "Carol").unwrap();
        store.save(id, &[]).unwrap();

        assert_eq!(resolver.resolve("Carol").unwrap(), id);
        assert!(matches!(
            resolver.resolve("carol"),
            Err(AdminError::TargetNotFound(_))
        ));
        assert!(matches!(
            resolver.resolve("Dave"),
            Err(AdminError::TargetNotFound(name)) if name == "Dave"
        ));
    }

    #[test]
    fn test_candidates_filter_and_dedup() {
        let (directory, store, resolver) = setup();
        directory.connect("Alice");
        directory.connect("Bob");
        let alice = Identity::new();
        store.remember_name(alice, "Alice").unwrap();
        store.save(alice, &[]).unwrap();
        let alfred = Identity::new();
        store.remember_name(alfred, "alfred").unwrap();
        store.save(alfred, &[]).unwrap();

        assert_eq!(
            resolver.candidates("AL"),
            vec!["Alice".to_string(), "alfred".to_string()]
        );
        assert_eq!(resolver.candidates("").len(), 3);
    }
}
