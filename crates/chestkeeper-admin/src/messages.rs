//! Message keys and templates
//!
//! Templates use positional placeholders `%1%`, `%2%`, … filled from the
//! outcome arguments.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key of a user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKey {
    Usage,
    ViewUsage,
    OnlyPlayers,
    NoPermissionView,
    NoPermissionDelete,
    NoPermissionReload,
    NoRecordFound,
    Viewing,
    ViewFailed,
    Deleted,
    DeleteFailed,
    ConfigReloaded,
    ReloadFailed,
}

impl MessageKey {
    /// Every key, in declaration order
    pub const ALL: [MessageKey; 13] = [
        MessageKey::Usage,
        MessageKey::ViewUsage,
        MessageKey::OnlyPlayers,
        MessageKey::NoPermissionView,
        MessageKey::NoPermissionDelete,
        MessageKey::NoPermissionReload,
        MessageKey::NoRecordFound,
        MessageKey::Viewing,
        MessageKey::ViewFailed,
        MessageKey::Deleted,
        MessageKey::DeleteFailed,
        MessageKey::ConfigReloaded,
        MessageKey::ReloadFailed,
    ];

    /// Configuration key of this message
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKey::Usage => "achest-usage",
            MessageKey::ViewUsage => "view-usage",
            MessageKey::OnlyPlayers => "only-players",
            MessageKey::NoPermissionView => "no-permission-view",
            MessageKey::NoPermissionDelete => "no-permission-delete",
            MessageKey::NoPermissionReload => "no-permission-reload",
            MessageKey::NoRecordFound => "no-enderchest-found",
            MessageKey::Viewing => "viewing",
            MessageKey::ViewFailed => "view-failed",
            MessageKey::Deleted => "deleted",
            MessageKey::DeleteFailed => "delete-failed",
            MessageKey::ConfigReloaded => "config-reloaded",
            MessageKey::ReloadFailed => "reload-failed",
        }
    }

    /// Built-in template used when the configuration has none
    pub fn default_template(self) -> &'static str {
        match self {
            MessageKey::Usage => "Usage: /achest <view|delete|reload> [player]",
            MessageKey::ViewUsage => "Usage: /achest view <player>",
            MessageKey::OnlyPlayers => "Only players can view chests.",
            MessageKey::NoPermissionView => "You do not have permission to view chests.",
            MessageKey::NoPermissionDelete => "You do not have permission to delete chests.",
            MessageKey::NoPermissionReload => "You do not have permission to reload.",
            MessageKey::NoRecordFound => "No chest found for that player.",
            MessageKey::Viewing => "Viewing the chest of %1%.",
            MessageKey::ViewFailed => "Could not open the chest of %1%, check the log.",
            MessageKey::Deleted => "Deleted the chest of %1%.",
            MessageKey::DeleteFailed => "Failed to delete the chest of %1%.",
            MessageKey::ConfigReloaded => "Configuration reloaded.",
            MessageKey::ReloadFailed => "Reload failed, check the log.",
        }
    }
}

impl std::fmt::Display for MessageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolves message keys against configured templates
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    templates: HashMap<String, String>,
}

impl MessageCatalog {
    pub fn new(templates: HashMap<String, String>) -> Self {
        Self { templates }
    }

    /// Render a message, filling `%n%` with the n-th argument
    pub fn render(&self, key: MessageKey, args: &[String]) -> String {
        let Some(template) = self.templates.get(key.as_str()) else {
            return format!("Message not found: {}", key);
        };

        args.iter()
            .enumerate()
            .fold(template.clone(), |message, (i, arg)| {
                message.replace(&format!("%{}%", i + 1), arg)
            })
    }
}
