//! In-memory player directory

use chestkeeper_core::Identity;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::presentation::PlayerDirectory;

#[derive(Debug, Clone)]
struct KnownPlayer {
    name: String,
    online: bool,
}

/// Directory of players known to this process
///
/// Names match case-insensitively, the way player names do on the server.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    players: RwLock<HashMap<Identity, KnownPlayer>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a player as connected, reusing the identity a previous visit under
    /// the same name was given.
    pub fn connect(&self, name: &str) -> Identity {
        let existing = self.find(name, false);
        let identity = existing.unwrap_or_default();
        self.connect_as(identity, name);
        identity
    }

    /// Mark a specific identity as connected under `name`
    pub fn connect_as(&self, identity: Identity, name: &str) {
        self.players.write().insert(
            identity,
            KnownPlayer {
                name: name.to_string(),
                online: true,
            },
        );
    }

    /// Mark a player as disconnected. Returns false if nobody by that name is online.
    pub fn disconnect(&self, name: &str) -> bool {
        let mut players = self.players.write();
        match players
            .values_mut()
            .find(|p| p.online && p.name.eq_ignore_ascii_case(name))
        {
            Some(player) => {
                player.online = false;
                true
            }
            None => false,
        }
    }

    fn find(&self, name: &str, online_only: bool) -> Option<Identity> {
        self.players
            .read()
            .iter()
            .find(|(_, p)| (p.online || !online_only) && p.name.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id)
    }
}

impl PlayerDirectory for InMemoryDirectory {
    fn online_by_name(&self, name: &str) -> Option<Identity> {
        self.find(name, true)
    }

    fn seen_before(&self, name: &str) -> Option<Identity> {
        self.find(name, false)
    }

    fn online_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .players
            .read()
            .values()
            .filter(|p| p.online)
            .map(|p| p.name.clone())
            .collect();
        names.sort();
        names
    }
}
