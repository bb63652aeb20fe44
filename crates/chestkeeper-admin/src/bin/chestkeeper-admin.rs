//! Chestkeeper Admin Console
//!
//! Line-oriented console for inspecting and editing chest records. The
//! operator is an interactive player holding every admin capability.
//!
//! # Usage
//! ```bash
//! chestkeeper-admin [--config admin.json] [--db chests.db] [--operator Admin] [--verbose]
//! ```

use anyhow::Context;
use chestkeeper_admin::{
    AdminCommands, AdminConfig, Caller, CloseOutcome, Cue, InMemoryDirectory, Presenter,
    SessionController,
};
use chestkeeper_core::{
    Identity, InventoryRecord, Item, MemoryRecordStore, RecordStore, Slot, SqliteRecordStore,
};
use clap::Parser;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Chestkeeper Admin - view, edit and delete stored chests
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file, re-read on `achest reload`
    #[arg(short, long)]
    config: Option<String>,

    /// SQLite database path (overrides the configuration)
    #[arg(long)]
    db: Option<String>,

    /// Name of the operator using this console
    #[arg(long, default_value = "Admin")]
    operator: String,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

struct OpenView {
    title: String,
    record: InventoryRecord,
}

/// Presenter that prints views to the terminal
#[derive(Default)]
struct TerminalPresenter {
    views: Mutex<HashMap<Identity, OpenView>>,
}

impl TerminalPresenter {
    fn edit(&self, viewer: Identity, index: usize, slot: Slot) -> anyhow::Result<()> {
        let mut views = self.views.lock();
        let view = views.get_mut(&viewer).context("no chest is open")?;
        view.record.set(index, slot)?;
        Ok(())
    }

    fn take(&self, viewer: Identity) -> Option<Vec<Slot>> {
        self.views
            .lock()
            .remove(&viewer)
            .map(|view| view.record.into_slots())
    }

    fn print(title: &str, record: &InventoryRecord) {
        println!("┌─ {} ({} item(s))", title, record.occupied());
        for (index, item) in record.items() {
            println!("│ [{:2}] {}", index, item.payload());
        }
        println!("└─");
    }
}

impl Presenter for TerminalPresenter {
    fn present(
        &self,
        viewer: Identity,
        title: &str,
        record: &InventoryRecord,
    ) -> chestkeeper_admin::Result<()> {
        Self::print(title, record);
        self.views.lock().insert(
            viewer,
            OpenView {
                title: title.to_string(),
                record: record.clone(),
            },
        );
        Ok(())
    }

    fn force_close(&self, viewer: Identity) -> chestkeeper_admin::Result<Option<Vec<Slot>>> {
        let view = self.views.lock().remove(&viewer);
        Ok(view.map(|view| {
            println!("✖ {} was closed", view.title);
            view.record.into_slots()
        }))
    }

    fn play_cue(&self, _viewer: Identity, cue: Cue) {
        match cue {
            Cue::Open => println!("♪ chest opens"),
            Cue::Close => println!("♪ chest closes"),
        }
    }

    fn send_message(&self, _viewer: Identity, text: &str) {
        println!("{}", text);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(args.verbose)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => AdminConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => AdminConfig::default(),
    };
    if let Some(db) = &args.db {
        config.store.path = Some(db.clone());
    }

    let store: Arc<dyn RecordStore> = match &config.store.path {
        Some(path) => Arc::new(
            SqliteRecordStore::open(path).with_context(|| format!("opening database {}", path))?,
        ),
        None => {
            tracing::warn!("No database configured, records are kept in memory");
            Arc::new(MemoryRecordStore::new())
        }
    };

    let directory = Arc::new(InMemoryDirectory::new());
    let presenter = Arc::new(TerminalPresenter::default());
    let controller = Arc::new(SessionController::on_current_runtime(
        &config,
        store.clone(),
        directory.clone(),
        presenter.clone(),
    )?);

    let mut commands = AdminCommands::new(controller.clone(), &config);
    if let Some(path) = &args.config {
        commands = commands.with_config_path(path);
    }

    let operator_id = directory.connect(&args.operator);
    store.remember_name(operator_id, &args.operator)?;
    let operator = Caller::player(args.operator.clone(), operator_id).with_all_capabilities();

    print_banner(&args.operator);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, rest)) = words.split_first() else {
            continue;
        };

        match head {
            "achest" => {
                let reply = commands.dispatch(&operator, rest);
                presenter.send_message(operator_id, &reply);
            }
            "tab" => println!("{}", commands.complete(&operator, rest).join("  ")),
            "set" => match parse_set(rest) {
                Ok((index, item)) => report(presenter.edit(operator_id, index, Some(item))),
                Err(e) => println!("✖ {}", e),
            },
            "clear" => match rest.first().map(|s| s.parse::<usize>()) {
                Some(Ok(index)) => report(presenter.edit(operator_id, index, None)),
                _ => println!("✖ usage: clear <slot>"),
            },
            "close" => match presenter.take(operator_id) {
                Some(slots) => match controller.notify_closed(operator_id, slots) {
                    CloseOutcome::SaveQueued(_) => println!("✔ saving"),
                    CloseOutcome::Discarded(_) => println!("✔ closed without saving"),
                    CloseOutcome::Untracked => println!("✔ closed"),
                },
                None => println!("✖ no chest is open"),
            },
            "join" => match rest.first() {
                Some(name) => {
                    let id = directory.connect(name);
                    store.remember_name(id, name)?;
                    println!("→ {} joined ({})", name, id);
                }
                None => println!("✖ usage: join <name>"),
            },
            "leave" => match rest.first() {
                Some(name) if directory.disconnect(name) => println!("← {} left", name),
                _ => println!("✖ nobody by that name is online"),
            },
            "quit" | "exit" => break,
            other => println!("✖ unknown input '{}', try: achest, tab, set, clear, close, join, leave, quit", other),
        }
    }

    let outcome = controller.shutdown().await;
    tracing::info!(
        "Closed {} view(s) on exit, {:?}",
        outcome.closed_views,
        controller.saves().stats()
    );
    Ok(())
}

fn parse_set(rest: &[&str]) -> anyhow::Result<(usize, Item)> {
    let (index, payload) = rest
        .split_first()
        .context("usage: set <slot> <json>")?;
    let index: usize = index.parse().context("slot must be a number")?;
    let payload = serde_json::from_str(&payload.join(" ")).context("item must be valid JSON")?;
    Ok((index, Item::new(payload)))
}

fn report(result: anyhow::Result<()>) {
    match result {
        Ok(()) => println!("✔"),
        Err(e) => println!("✖ {}", e),
    }
}

fn print_banner(operator: &str) {
    println!();
    println!("╔═══════════════════════════════════════════════╗");
    println!("║          CHESTKEEPER — ADMIN CONSOLE          ║");
    println!("╚═══════════════════════════════════════════════╝");
    println!();
    println!("Operator: {}", operator);
    println!("   ├─ achest view <player>     — open a chest");
    println!("   ├─ achest delete <player>   — delete a chest");
    println!("   ├─ achest reload            — reload configuration");
    println!("   ├─ set <slot> <json> / clear <slot> / close");
    println!("   ├─ join <player> / leave <player>");
    println!("   └─ tab <args>               — completions");
    println!();
}
