//! Administrative command surface: `reload`, `view <name>`, `delete <name>`

use chestkeeper_core::Identity;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AdminConfig;
use crate::controller::SessionController;
use crate::messages::{MessageCatalog, MessageKey};
use crate::AdminError;

/// Capability a caller must hold to run a sub-command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Reload,
    View,
    Delete,
}

impl Capability {
    /// Every capability
    pub const ALL: [Capability; 3] = [Capability::View, Capability::Delete, Capability::Reload];

    /// Sub-command this capability unlocks
    pub fn command(self) -> &'static str {
        match self {
            Capability::Reload => "reload",
            Capability::View => "view",
            Capability::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command())
    }
}

/// Whoever issued a command
#[derive(Debug, Clone)]
pub struct Caller {
    /// Display name
    pub name: String,

    /// Identity of an interactive player; `None` for headless callers
    pub identity: Option<Identity>,

    capabilities: HashSet<Capability>,
}

impl Caller {
    /// A connected player who can be shown views
    pub fn player(name: impl Into<String>, identity: Identity) -> Self {
        Self {
            name: name.into(),
            identity: Some(identity),
            capabilities: HashSet::new(),
        }
    }

    /// A headless caller such as a server console
    pub fn headless(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identity: None,
            capabilities: HashSet::new(),
        }
    }

    /// Grant one capability
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Grant every capability
    pub fn with_all_capabilities(mut self) -> Self {
        self.capabilities.extend(Capability::ALL);
        self
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Fail with `NotAuthorized` unless the capability is held
    pub fn authorize(&self, capability: Capability) -> crate::Result<()> {
        if self.has(capability) {
            Ok(())
        } else {
            Err(AdminError::NotAuthorized(capability))
        }
    }

    /// Identity of an interactive caller, `CallerMustBeInteractive` otherwise
    pub fn interactive(&self) -> crate::Result<Identity> {
        self.identity.ok_or(AdminError::CallerMustBeInteractive)
    }
}

/// Message key plus the arguments that fill its placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub key: MessageKey,
    pub args: Vec<String>,
}

impl CommandOutcome {
    pub fn new(key: MessageKey) -> Self {
        Self {
            key,
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl From<MessageKey> for CommandOutcome {
    fn from(key: MessageKey) -> Self {
        Self::new(key)
    }
}

/// Dispatches admin sub-commands to the session controller
pub struct AdminCommands {
    controller: Arc<SessionController>,
    catalog: RwLock<MessageCatalog>,
    config_path: Option<PathBuf>,
}

impl AdminCommands {
    pub fn new(controller: Arc<SessionController>, config: &AdminConfig) -> Self {
        Self {
            controller,
            catalog: RwLock::new(MessageCatalog::new(config.messages.clone())),
            config_path: None,
        }
    }

    /// Re-read configuration from `path` on every reload
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn controller(&self) -> &Arc<SessionController> {
        &self.controller
    }

    /// Run a command line split into arguments
    pub fn execute(&self, caller: &Caller, args: &[&str]) -> CommandOutcome {
        let Some(sub) = args.first() else {
            return MessageKey::Usage.into();
        };

        match sub.to_lowercase().as_str() {
            "reload" => self.reload(caller),
            "view" => match args.get(1) {
                Some(name) => self.view(caller, name),
                None => MessageKey::ViewUsage.into(),
            },
            "delete" => match args.get(1) {
                Some(name) => self.delete(caller, name),
                None => MessageKey::Usage.into(),
            },
            _ => MessageKey::Usage.into(),
        }
    }

    /// Render an outcome with the current message templates
    pub fn render(&self, outcome: &CommandOutcome) -> String {
        self.catalog.read().render(outcome.key, &outcome.args)
    }

    /// Run a command and render its outcome
    pub fn dispatch(&self, caller: &Caller, args: &[&str]) -> String {
        let outcome = self.execute(caller, args);
        self.render(&outcome)
    }

    /// Completion candidates for the argument being typed (the last one)
    pub fn complete(&self, caller: &Caller, args: &[&str]) -> Vec<String> {
        match args {
            [partial] => {
                let partial = partial.to_lowercase();
                Capability::ALL
                    .iter()
                    .filter(|c| caller.has(**c))
                    .map(|c| c.command())
                    .filter(|cmd| cmd.starts_with(&partial))
                    .map(str::to_string)
                    .collect()
            }
            [_, partial] => self.controller.resolver().candidates(partial),
            _ => Vec::new(),
        }
    }

    fn reload(&self, caller: &Caller) -> CommandOutcome {
        if let Err(e) = caller.authorize(Capability::Reload) {
            tracing::debug!("{} denied: {}", caller.name, e);
            return MessageKey::NoPermissionReload.into();
        }

        if let Some(path) = &self.config_path {
            match AdminConfig::from_file(path) {
                Ok(config) => {
                    self.controller.apply_config(&config);
                    *self.catalog.write() = MessageCatalog::new(config.messages);
                }
                Err(e) => {
                    tracing::error!("Error during reload of {}: {}", path.display(), e);
                    return MessageKey::ReloadFailed.into();
                }
            }
        }

        let outcome = self.controller.reload();
        tracing::info!("{} reloaded ({:?})", caller.name, outcome);
        MessageKey::ConfigReloaded.into()
    }

    fn view(&self, caller: &Caller, name: &str) -> CommandOutcome {
        let viewer = match caller.interactive() {
            Ok(viewer) => viewer,
            Err(e) => {
                tracing::debug!("{} denied: {}", caller.name, e);
                return MessageKey::OnlyPlayers.into();
            }
        };
        if let Err(e) = caller.authorize(Capability::View) {
            tracing::debug!("{} denied: {}", caller.name, e);
            return MessageKey::NoPermissionView.into();
        }

        match self.controller.open(viewer, name) {
            Ok(_) => CommandOutcome::new(MessageKey::Viewing).with_arg(name),
            Err(AdminError::TargetNotFound(_)) => MessageKey::NoRecordFound.into(),
            Err(e) => {
                tracing::error!("{} could not view {}: {}", caller.name, name, e);
                CommandOutcome::new(MessageKey::ViewFailed).with_arg(name)
            }
        }
    }

    fn delete(&self, caller: &Caller, name: &str) -> CommandOutcome {
        if let Err(e) = caller.authorize(Capability::Delete) {
            tracing::debug!("{} denied: {}", caller.name, e);
            return MessageKey::NoPermissionDelete.into();
        }

        match self.controller.delete(name) {
            Ok(_) => CommandOutcome::new(MessageKey::Deleted).with_arg(name),
            Err(AdminError::TargetNotFound(_)) => MessageKey::NoRecordFound.into(),
            Err(_) => CommandOutcome::new(MessageKey::DeleteFailed).with_arg(name),
        }
    }
}

impl std::fmt::Debug for AdminCommands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCommands")
            .field("config_path", &self.config_path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cue, InMemoryDirectory, Presenter};
    use chestkeeper_core::{InventoryRecord, MemoryRecordStore, RecordStore, Slot};

    struct QuietPresenter;

    impl Presenter for QuietPresenter {
        fn present(&self, _: Identity, _: &str, _: &InventoryRecord) -> crate::Result<()> {
            Ok(())
        }
        fn force_close(&self, _: Identity) -> crate::Result<Option<Vec<Slot>>> {
            Ok(None)
        }
        fn play_cue(&self, _: Identity, _: Cue) {}
        fn send_message(&self, _: Identity, _: &str) {}
    }

    struct Fixture {
        directory: Arc<InMemoryDirectory>,
        store: Arc<MemoryRecordStore>,
        commands: AdminCommands,
    }

    fn fixture() -> Fixture {
        let config = AdminConfig::default();
        let directory = Arc::new(InMemoryDirectory::new());
        let store = Arc::new(MemoryRecordStore::new());
        let controller = SessionController::on_current_runtime(
            &config,
            store.clone(),
            directory.clone(),
            Arc::new(QuietPresenter),
        )
        .unwrap();
        Fixture {
            directory,
            store,
            commands: AdminCommands::new(Arc::new(controller), &config),
        }
    }

    #[test]
    fn test_caller_checks() {
        let console = Caller::headless("console").with_capability(Capability::Delete);
        assert!(console.authorize(Capability::Delete).is_ok());
        assert!(matches!(
            console.authorize(Capability::View),
            Err(AdminError::NotAuthorized(Capability::View))
        ));
        assert!(matches!(
            console.interactive(),
            Err(AdminError::CallerMustBeInteractive)
        ));

        let id = Identity::new();
        assert_eq!(Caller::player("Mod", id).interactive().unwrap(), id);
    }

    #[tokio::test]
    async fn test_usage_keys() {
        let f = fixture();
        let admin = Caller::headless("console").with_all_capabilities();

        assert_eq!(f.commands.execute(&admin, &[]).key, MessageKey::Usage);
        assert_eq!(f.commands.execute(&admin, &["explode"]).key, MessageKey::Usage);
        assert_eq!(f.commands.execute(&admin, &["view"]).key, MessageKey::ViewUsage);
        assert_eq!(f.commands.execute(&admin, &["delete"]).key, MessageKey::Usage);
    }

    #[tokio::test]
    async fn test_view_requires_interactive_caller_first() {
        let f = fixture();
        f.directory.connect("Ana");

        let console = Caller::headless("console");
        assert_eq!(
            f.commands.execute(&console, &["view", "Ana"]).key,
            MessageKey::OnlyPlayers
        );

        let player = Caller::player("Mod", f.directory.connect("Mod"));
        assert_eq!(
            f.commands.execute(&player, &["view", "Ana"]).key,
            MessageKey::NoPermissionView
        );

        let player = player.with_capability(Capability::View);
        let outcome = f.commands.execute(&player, &["VIEW", "Ana"]);
        assert_eq!(outcome, CommandOutcome::new(MessageKey::Viewing).with_arg("Ana"));
        assert_eq!(f.commands.render(&outcome), "Viewing the chest of Ana.");
    }

    #[tokio::test]
    async fn test_view_unknown_target() {
        let f = fixture();
        let player =
            Caller::player("Mod", f.directory.connect("Mod")).with_capability(Capability::View);
        assert_eq!(
            f.commands.execute(&player, &["view", "Ghost"]).key,
            MessageKey::NoRecordFound
        );
    }

    struct UnreadableStore;

    impl RecordStore for UnreadableStore {
        fn load(&self, _: Identity) -> chestkeeper_core::Result<Option<Vec<Slot>>> {
            Err(chestkeeper_core::CoreError::backend("corrupt page"))
        }
        fn save(&self, _: Identity, _: &[Slot]) -> chestkeeper_core::Result<()> {
            Ok(())
        }
        fn delete(&self, _: Identity) -> chestkeeper_core::Result<()> {
            Ok(())
        }
        fn find_by_name(&self, _: &str) -> chestkeeper_core::Result<Option<Identity>> {
            Ok(None)
        }
        fn known_names(&self) -> chestkeeper_core::Result<Vec<String>> {
            Ok(Vec::new())
        }
        fn remember_name(&self, _: Identity, _: &str) -> chestkeeper_core::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_view_store_failure_is_not_reported_as_missing() {
        let config = AdminConfig::default();
        let directory = Arc::new(InMemoryDirectory::new());
        let controller = SessionController::on_current_runtime(
            &config,
            Arc::new(UnreadableStore),
            directory.clone(),
            Arc::new(QuietPresenter),
        )
        .unwrap();
        let commands = AdminCommands::new(Arc::new(controller), &config);
        directory.connect("Ana");

        let viewer = directory.connect("Mod");
        let player = Caller::player("Mod", viewer).with_capability(Capability::View);
        let outcome = commands.execute(&player, &["view", "Ana"]);

        assert_eq!(outcome, CommandOutcome::new(MessageKey::ViewFailed).with_arg("Ana"));
        assert_eq!(
            commands.render(&outcome),
            "Could not open the chest of Ana, check the log."
        );
        assert!(commands.controller().session_target(viewer).is_none());
        assert_eq!(
            commands.execute(&player, &["view", "Ghost"]).key,
            MessageKey::NoRecordFound
        );
    }

    #[tokio::test]
    async fn test_delete_and_reload_permissions() {
        let f = fixture();
        let nobody = Caller::headless("console");
        assert_eq!(
            f.commands.execute(&nobody, &["delete", "Ana"]).key,
            MessageKey::NoPermissionDelete
        );
        assert_eq!(
            f.commands.execute(&nobody, &["reload"]).key,
            MessageKey::NoPermissionReload
        );

        let admin = Caller::headless("console").with_all_capabilities();
        let ana = Identity::new();
        f.store.remember_name(ana, "Ana").unwrap();
        f.store.save(ana, &[]).unwrap();

        assert_eq!(
            f.commands.dispatch(&admin, &["delete", "Ana"]),
            "Deleted the chest of Ana."
        );
        assert!(f.store.load(ana).unwrap().is_none());
        assert_eq!(f.commands.execute(&admin, &["reload"]).key, MessageKey::ConfigReloaded);
    }

    #[tokio::test]
    async fn test_reload_rereads_messages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("admin.json");
        AdminConfig::default()
            .with_message(MessageKey::ConfigReloaded, "Fresh config!")
            .to_file(&path)
            .unwrap();

        let f = fixture();
        let commands = AdminCommands::new(f.commands.controller().clone(), &AdminConfig::default())
            .with_config_path(&path);
        let admin = Caller::headless("console").with_capability(Capability::Reload);

        assert_eq!(commands.dispatch(&admin, &["reload"]), "Fresh config!");

        std::fs::write(&path, "{ broken").unwrap();
        assert_eq!(commands.execute(&admin, &["reload"]).key, MessageKey::ReloadFailed);
    }

    #[tokio::test]
    async fn test_completion() {
        let f = fixture();
        f.directory.connect("Dana");
        f.directory.connect("Eli");
        let stored = Identity::new();
        f.store.remember_name(stored, "derek").unwrap();
        f.store.save(stored, &[]).unwrap();

        let viewer =
            Caller::headless("console").with_capability(Capability::View).with_capability(Capability::Delete);
        assert_eq!(f.commands.complete(&viewer, &[""]), vec!["view", "delete"]);
        assert_eq!(f.commands.complete(&viewer, &["D"]), vec!["delete"]);
        assert!(f.commands.complete(&viewer, &["r"]).is_empty());

        assert_eq!(
            f.commands.complete(&viewer, &["view", "d"]),
            vec!["Dana".to_string(), "derek".to_string()]
        );
        assert!(f.commands.complete(&viewer, &["view", "Dana", ""]).is_empty());
    }
}
