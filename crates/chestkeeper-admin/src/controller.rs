//! Session controller: opens, closes and tears down chest views
//!
//! All registry changes happen here, on the caller's coordination path. The
//! registry lock is never held while a collaborator runs, so a presenter may
//! report a close from inside `force_close`. A viewer holds at most one view:
//! opening a second one closes the first.

use chestkeeper_core::{Identity, InventoryRecord, RecordStore, Slot};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::AdminConfig;
use crate::persistence::SaveQueue;
use crate::presentation::{Cue, PlayerDirectory, Presenter};
use crate::registry::{Session, SessionRegistry};
use crate::resolver::IdentityResolver;
use crate::{AdminError, Result};

/// Settings that a reload may change
#[derive(Debug, Clone)]
struct ViewSettings {
    title_prefix: String,
    save_after_delete: bool,
}

impl From<&AdminConfig> for ViewSettings {
    fn from(config: &AdminConfig) -> Self {
        Self {
            title_prefix: config.title_prefix.clone(),
            save_after_delete: config.session.save_after_delete,
        }
    }
}

/// A view that was opened successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedView {
    pub target: Identity,
    pub title: String,
    pub record: InventoryRecord,
}

/// What a close notification led to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The viewer had no session; nothing happened
    Untracked,
    /// The contents were queued for saving under this target
    SaveQueued(Identity),
    /// The session was closed without saving (record was deleted)
    Discarded(Identity),
}

/// Result of an administrative delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub target: Identity,
    pub closed_views: usize,
    pub failed_views: usize,
}

/// Result of a reload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadOutcome {
    pub closed_views: usize,
    pub failed_views: usize,
}

/// Session controller
pub struct SessionController {
    store: Arc<dyn RecordStore>,
    resolver: IdentityResolver,
    presenter: Arc<dyn Presenter>,
    registry: SessionRegistry,
    saves: SaveQueue,
    settings: RwLock<ViewSettings>,
}

impl SessionController {
    pub fn new(
        config: &AdminConfig,
        store: Arc<dyn RecordStore>,
        directory: Arc<dyn PlayerDirectory>,
        presenter: Arc<dyn Presenter>,
        saves: SaveQueue,
    ) -> Self {
        Self {
            resolver: IdentityResolver::new(directory, store.clone()),
            store,
            presenter,
            registry: SessionRegistry::new(),
            saves,
            settings: RwLock::new(ViewSettings::from(config)),
        }
    }

    /// Build a controller whose save queue runs on the current tokio runtime
    pub fn on_current_runtime(
        config: &AdminConfig,
        store: Arc<dyn RecordStore>,
        directory: Arc<dyn PlayerDirectory>,
        presenter: Arc<dyn Presenter>,
    ) -> Result<Self> {
        config.validate()?;
        let saves = SaveQueue::on_current_runtime(store.clone(), config.session.max_in_flight_saves)?;
        Ok(Self::new(config, store, directory, presenter, saves))
    }

    /// Open `requested_name`'s record for `viewer`
    ///
    /// A missing record opens as an empty one. A view the viewer already has
    /// open is closed first through the ordinary close path, so its contents
    /// are saved under its own target.
    pub fn open(&self, viewer: Identity, requested_name: &str) -> Result<OpenedView> {
        let target = self.resolver.resolve(requested_name)?;

        let mut record = match self.store.load(target)? {
            Some(slots) => InventoryRecord::from_slots(slots),
            None => InventoryRecord::empty(),
        };

        if let Some(previous) = self.registry.get(viewer) {
            match self.force_close(viewer) {
                // The save of the closed view may still be queued.
                Ok(Some((CloseOutcome::SaveQueued(closed), contents))) if closed == target => {
                    record = contents;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(
                        "Failed to close the view of {} before opening {}: {}",
                        previous.target_name,
                        requested_name,
                        e
                    );
                    return Err(e);
                }
            }
        }

        let title = format!("{}{}", self.settings.read().title_prefix, requested_name);
        self.registry.put(Session::new(viewer, target, requested_name));

        if let Err(e) = self.presenter.present(viewer, &title, &record) {
            self.registry.remove(viewer);
            tracing::error!("Failed to present {} to {}: {}", requested_name, viewer, e);
            return Err(e);
        }

        self.presenter.play_cue(viewer, Cue::Open);
        tracing::info!(
            "{} opened the chest of {} ({}, {} item(s))",
            viewer,
            requested_name,
            target,
            record.occupied()
        );

        Ok(OpenedView {
            target,
            title,
            record,
        })
    }

    /// Handle the front-end reporting that `viewer` closed their view
    pub fn notify_closed(&self, viewer: Identity, contents: Vec<Slot>) -> CloseOutcome {
        let Some(session) = self.registry.remove(viewer) else {
            tracing::debug!("Ignoring close from {}: no tracked view", viewer);
            return CloseOutcome::Untracked;
        };

        let outcome = if session.persist_on_close {
            self.saves
                .enqueue(session.target, InventoryRecord::from_slots(contents));
            CloseOutcome::SaveQueued(session.target)
        } else {
            tracing::info!(
                "Discarding view of {} closed by {}: record was deleted",
                session.target_name,
                viewer
            );
            CloseOutcome::Discarded(session.target)
        };

        self.presenter.play_cue(viewer, Cue::Close);
        tracing::info!(
            "{} closed the chest of {} after {}s",
            viewer,
            session.target_name,
            session.age_secs()
        );
        outcome
    }

    /// Delete `name`'s record and close every view of it
    ///
    /// Views closed this way are not saved unless `save_after_delete` is set.
    /// On a store error nothing else changes.
    pub fn delete(&self, name: &str) -> Result<DeleteOutcome> {
        let target = self.resolver.resolve(name)?;

        if let Err(source) = self.store.delete(target) {
            tracing::error!("Failed to delete record for {}: {}", name, source);
            return Err(AdminError::DeleteFailed {
                name: name.to_string(),
                source,
            });
        }

        let viewers = if self.settings.read().save_after_delete {
            self.registry.viewers_of(target)
        } else {
            self.registry.suppress_saves_for(target)
        };

        let (closed_views, failed_views) = self.force_close_all(&viewers);
        tracing::info!(
            "Deleted record for {} ({}), closed {} view(s)",
            name,
            target,
            closed_views
        );

        Ok(DeleteOutcome {
            target,
            closed_views,
            failed_views,
        })
    }

    /// Close every tracked view, saving as usual, then clear the registry
    pub fn reload(&self) -> ReloadOutcome {
        let viewers: Vec<Identity> = self
            .registry
            .all_entries()
            .into_iter()
            .map(|(viewer, _)| viewer)
            .collect();

        let (closed_views, failed_views) = self.force_close_all(&viewers);

        let leftover = self.registry.clear();
        if leftover > 0 {
            tracing::warn!("Reload dropped {} session(s) that did not close", leftover);
        }
        tracing::info!("Reload closed {} view(s), {} failed", closed_views, failed_views);

        ReloadOutcome {
            closed_views,
            failed_views,
        }
    }

    /// Apply reloadable settings from a fresh configuration
    pub fn apply_config(&self, config: &AdminConfig) {
        *self.settings.write() = ViewSettings::from(config);
    }

    /// Close every view and wait for all queued saves
    pub async fn shutdown(&self) -> ReloadOutcome {
        let outcome = self.reload();
        self.saves.drain().await;
        tracing::info!("Session controller shut down, {:?}", self.saves.stats());
        outcome
    }

    /// Wait for every save queued so far
    pub async fn drain_saves(&self) {
        self.saves.drain().await;
    }

    /// Target `viewer` is currently looking at
    pub fn session_target(&self, viewer: Identity) -> Option<Identity> {
        self.registry.get_target(viewer)
    }

    /// Every `(viewer, target)` pair
    pub fn active_sessions(&self) -> Vec<(Identity, Identity)> {
        self.registry.all_entries()
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    pub fn saves(&self) -> &SaveQueue {
        &self.saves
    }

    fn force_close_all(&self, viewers: &[Identity]) -> (usize, usize) {
        let mut closed = 0;
        let mut failed = 0;
        for &viewer in viewers {
            match self.force_close(viewer) {
                Ok(_) => closed += 1,
                Err(e) => {
                    failed += 1;
                    tracing::error!("Failed to close view of {}: {}", viewer, e);
                }
            }
        }
        (closed, failed)
    }

    /// Close the viewer's view, returning the close outcome and final contents
    fn force_close(&self, viewer: Identity) -> Result<Option<(CloseOutcome, InventoryRecord)>> {
        match self.presenter.force_close(viewer)? {
            Some(contents) => {
                let record = InventoryRecord::from_slots(contents.clone());
                Ok(Some((self.notify_closed(viewer, contents), record)))
            }
            None => {
                if self.registry.remove(viewer).is_some() {
                    tracing::debug!("Dropped session of {}: no view was open", viewer);
                }
                Ok(None)
            }
        }
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("sessions", &self.registry.len())
            .field("saves", &self.saves)
            .finish_non_exhaustive()
    }
}
