//! Admin configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::messages::MessageKey;
use crate::{AdminError, DEFAULT_MAX_IN_FLIGHT_SAVES, DEFAULT_TITLE_PREFIX};

/// Main admin configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Prefix of every view title, followed by the target name
    pub title_prefix: String,

    /// Record store configuration
    pub store: StoreSettings,

    /// Session configuration
    pub session: SessionSettings,

    /// Message templates by key
    pub messages: HashMap<String, String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            title_prefix: DEFAULT_TITLE_PREFIX.to_string(),
            store: StoreSettings::default(),
            session: SessionSettings::default(),
            messages: default_messages(),
        }
    }
}

impl AdminConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title prefix
    pub fn with_title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.title_prefix = prefix.into();
        self
    }

    /// Set the database path
    pub fn with_store_path(mut self, path: impl Into<String>) -> Self {
        self.store.path = Some(path.into());
        self
    }

    /// Set the save concurrency bound
    pub fn with_max_in_flight_saves(mut self, max: usize) -> Self {
        self.session.max_in_flight_saves = max;
        self
    }

    /// Keep saving views that a delete force-closed
    pub fn with_save_after_delete(mut self, enabled: bool) -> Self {
        self.session.save_after_delete = enabled;
        self
    }

    /// Override one message template
    pub fn with_message(mut self, key: MessageKey, template: impl Into<String>) -> Self {
        self.messages.insert(key.as_str().to_string(), template.into());
        self
    }

    /// Reject settings the controller cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.session.max_in_flight_saves == 0 {
            return Err(AdminError::InvalidConfig(
                "session.max_in_flight_saves must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a file
    ///
    /// Missing fields fall back to their defaults, and message keys absent
    /// from the file keep their default template.
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&content)?;
        for (key, template) in default_messages() {
            config.messages.entry(key).or_insert(template);
        }
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Record store settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// SQLite database path. `None` keeps records in memory.
    pub path: Option<String>,
}

/// Session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Maximum number of saves running at once
    pub max_in_flight_saves: usize,

    /// Save the contents of views force-closed by a delete
    pub save_after_delete: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_in_flight_saves: DEFAULT_MAX_IN_FLIGHT_SAVES,
            save_after_delete: false,
        }
    }
}

fn default_messages() -> HashMap<String, String> {
    MessageKey::ALL
        .iter()
        .map(|key| (key.as_str().to_string(), key.default_template().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AdminConfig::default();
        assert_eq!(config.title_prefix, DEFAULT_TITLE_PREFIX);
        assert_eq!(config.session.max_in_flight_saves, DEFAULT_MAX_IN_FLIGHT_SAVES);
        assert!(!config.session.save_after_delete);
        assert!(config.store.path.is_none());
        assert_eq!(config.messages.len(), MessageKey::ALL.len());
    }

    #[test]
    fn test_config_builder() {
        let config = AdminConfig::new()
            .with_title_prefix("Vault: ")
            .with_store_path("data/chests.db")
            .with_max_in_flight_saves(2)
            .with_save_after_delete(true);

        assert_eq!(config.title_prefix, "Vault: ");
        assert_eq!(config.store.path.as_deref(), Some("data/chests.db"));
        assert_eq!(config.session.max_in_flight_saves, 2);
        assert!(config.session.save_after_delete);
    }

    #[test]
    fn test_zero_in_flight_saves_rejected() {
        let config = AdminConfig::new().with_max_in_flight_saves(0);
        assert!(matches!(config.validate(), Err(AdminError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("admin.json");
        std::fs::write(
            &path,
            r#"{ "title_prefix": "Chest of ", "messages": { "viewing": "Looking at %1%" } }"#,
        )
        .unwrap();

        let config = AdminConfig::from_file(&path).unwrap();
        assert_eq!(config.title_prefix, "Chest of ");
        assert_eq!(config.messages["viewing"], "Looking at %1%");
        assert_eq!(
            config.messages["achest-usage"],
            MessageKey::Usage.default_template()
        );
        assert_eq!(config.session.max_in_flight_saves, DEFAULT_MAX_IN_FLIGHT_SAVES);
    }

    #[test]
    fn test_config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("admin.json");
        let config = AdminConfig::new().with_save_after_delete(true);

        config.to_file(&path).unwrap();
        let parsed = AdminConfig::from_file(&path).unwrap();
        assert!(parsed.session.save_after_delete);
        assert_eq!(parsed.title_prefix, config.title_prefix);
    }
}
