//! Chestkeeper Admin - session-tracked chest viewing with background saves
//!
//! This crate lets an administrator open another player's chest record, edit
//! it live, and have it persisted exactly once when the view closes, while
//! deletes and reloads safely tear down any view in progress.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   Chestkeeper Admin                      │
//! ├─────────────────────────────────────────────────────────┤
//! │              ┌─────────────────────┐                    │
//! │              │    AdminCommands    │ reload/view/delete │
//! │              └──────────┬──────────┘                    │
//! │                         │                               │
//! │              ┌──────────▼──────────┐                    │
//! │              │  SessionController  │◄── notify_closed   │
//! │              └──┬───────┬───────┬──┘                    │
//! │                 │       │       │                       │
//! │  ┌──────────────▼┐ ┌────▼────┐ ┌▼──────────┐            │
//! │  │IdentityResolver│ │Registry │ │ SaveQueue │ (bg tasks)│
//! │  └──────┬────────┘ └─────────┘ └─────┬─────┘            │
//! │         │                            │                  │
//! │   PlayerDirectory              RecordStore              │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Features
//!
//! - **Single coordination path**: all registry changes go through the controller
//! - **Background persistence**: saves never block the caller, failures are logged
//! - **Per-target ordering**: saves for the same record land in enqueue order
//! - **Forced teardown**: delete and reload close every affected view

pub mod commands;
pub mod config;
pub mod controller;
pub mod directory;
pub mod error;
pub mod messages;
pub mod persistence;
pub mod presentation;
pub mod registry;
pub mod resolver;

pub use commands::{AdminCommands, Caller, Capability, CommandOutcome};
pub use config::{AdminConfig, SessionSettings, StoreSettings};
pub use controller::{CloseOutcome, DeleteOutcome, OpenedView, ReloadOutcome, SessionController};
pub use directory::InMemoryDirectory;
pub use error::{AdminError, Result};
pub use messages::{MessageCatalog, MessageKey};
pub use persistence::{SaveQueue, SaveStats};
pub use presentation::{Cue, PlayerDirectory, Presenter};
pub use registry::{Session, SessionRegistry};
pub use resolver::IdentityResolver;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Title shown on every view opened by Chestkeeper, followed by the target name
pub const DEFAULT_TITLE_PREFIX: &str = "EnderChest - ";

/// Default number of saves allowed to run at the same time
pub const DEFAULT_MAX_IN_FLIGHT_SAVES: usize = 8;
