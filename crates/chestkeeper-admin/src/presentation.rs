//! Collaborator contracts: the front-end that shows views and the directory
//! of known players.

use chestkeeper_core::{Identity, InventoryRecord, Slot};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Feedback cue played to a viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// A view was opened
    Open,
    /// A view was closed
    Close,
}

/// Front-end that renders chest views to viewers
///
/// When a viewer closes a view on their own, the front-end reports it through
/// [`SessionController::notify_closed`](crate::SessionController::notify_closed).
pub trait Presenter: Send + Sync {
    /// Show `record` to the viewer under `title`
    ///
    /// The controller force-closes any view the viewer already has before
    /// calling this, so an implementation never has to close one itself.
    fn present(&self, viewer: Identity, title: &str, record: &InventoryRecord) -> Result<()>;

    /// Close the viewer's view and hand back its final contents.
    ///
    /// Returns `Ok(None)` when the viewer has nothing open. An implementation
    /// that reports the close through `notify_closed` before returning is also
    /// valid; the controller ignores the second close.
    fn force_close(&self, viewer: Identity) -> Result<Option<Vec<Slot>>>;

    /// Play an open/close cue
    fn play_cue(&self, viewer: Identity, cue: Cue);

    /// Send a line of text to the viewer
    fn send_message(&self, viewer: Identity, text: &str);
}

/// Source of connected and previously seen players
pub trait PlayerDirectory: Send + Sync {
    /// Identity of a currently connected player with this name
    fn online_by_name(&self, name: &str) -> Option<Identity>;

    /// Identity of a player that has connected before, online or not
    fn seen_before(&self, name: &str) -> Option<Identity>;

    /// Names of every connected player
    fn online_names(&self) -> Vec<String>;
}
