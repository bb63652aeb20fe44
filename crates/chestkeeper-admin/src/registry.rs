//! Session registry: who is viewing whose chest right now

use chestkeeper_core::{Identity, Timestamp};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Session - one viewer looking at one target's record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Viewer holding the view
    pub viewer: Identity,

    /// Owner of the record being viewed
    pub target: Identity,

    /// Name the view was opened with
    pub target_name: String,

    /// Creation timestamp
    pub opened_at: Timestamp,

    /// Whether closing the view saves its contents
    pub persist_on_close: bool,
}

impl Session {
    /// Create a new session that saves on close
    pub fn new(viewer: Identity, target: Identity, target_name: impl Into<String>) -> Self {
        Self {
            viewer,
            target,
            target_name: target_name.into(),
            opened_at: Utc::now(),
            persist_on_close: true,
        }
    }

    /// Seconds since the view was opened
    pub fn age_secs(&self) -> i64 {
        (Utc::now() - self.opened_at).num_seconds()
    }
}

/// Session registry - at most one session per viewer
///
/// Every operation takes the lock once and never performs I/O while holding it.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Identity, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session, returning the one it replaced
    pub fn put(&self, session: Session) -> Option<Session> {
        let previous = self.sessions.write().insert(session.viewer, session);
        if let Some(ref prev) = previous {
            tracing::debug!("Session replaced for viewer {} (was {})", prev.viewer, prev.target);
        }
        previous
    }

    /// Remove the viewer's session
    pub fn remove(&self, viewer: Identity) -> Option<Session> {
        self.sessions.write().remove(&viewer)
    }

    /// Target the viewer is looking at
    pub fn get_target(&self, viewer: Identity) -> Option<Identity> {
        self.sessions.read().get(&viewer).map(|s| s.target)
    }

    /// Copy of the viewer's session
    pub fn get(&self, viewer: Identity) -> Option<Session> {
        self.sessions.read().get(&viewer).cloned()
    }

    /// Every `(viewer, target)` pair
    pub fn all_entries(&self) -> Vec<(Identity, Identity)> {
        self.sessions
            .read()
            .values()
            .map(|s| (s.viewer, s.target))
            .collect()
    }

    /// Viewers currently looking at `target`
    pub fn viewers_of(&self, target: Identity) -> Vec<Identity> {
        self.sessions
            .read()
            .values()
            .filter(|s| s.target == target)
            .map(|s| s.viewer)
            .collect()
    }

    /// Stop saving views of `target` on close, returning the affected viewers
    pub fn suppress_saves_for(&self, target: Identity) -> Vec<Identity> {
        let mut sessions = self.sessions.write();
        sessions
            .values_mut()
            .filter(|s| s.target == target)
            .map(|s| {
                s.persist_on_close = false;
                s.viewer
            })
            .collect()
    }

    /// Drop every session, returning how many were dropped
    pub fn clear(&self) -> usize {
        let mut sessions = self.sessions.write();
        let count = sessions.len();
        sessions.clear();
        count
    }

    /// Session count
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
