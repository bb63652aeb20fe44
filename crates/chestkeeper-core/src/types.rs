//! Core types for Chestkeeper
//!
//! - Identity: stable 128-bit owner token
//! - Item / Slot: opaque slot contents
//! - InventoryRecord: fixed-capacity slot sequence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{CoreError, Result};

/// Number of slots in every record (six rows of nine).
pub const RECORD_CAPACITY: usize = 54;

/// Timestamp type alias
pub type Timestamp = DateTime<Utc>;

/// Stable, globally unique identity of a player-like entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub Uuid);

impl Identity {
    /// Generate a fresh random identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for Identity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| CoreError::InvalidIdentity(format!("{}: {}", s, e)))
    }
}

/// Opaque item descriptor. Chestkeeper never looks inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(pub serde_json::Value);

impl Item {
    /// Wrap a payload
    pub fn new(payload: serde_json::Value) -> Self {
        Self(payload)
    }

    /// Borrow the payload
    pub fn payload(&self) -> &serde_json::Value {
        &self.0
    }
}

/// A single slot: empty or holding an item
pub type Slot = Option<Item>;

/// Fixed-capacity inventory record
///
/// Always holds exactly [`RECORD_CAPACITY`] slots. Shorter inputs are padded
/// with empty slots, longer inputs are truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    slots: Vec<Slot>,
}

impl InventoryRecord {
    /// Record with every slot empty
    pub fn empty() -> Self {
        Self {
            slots: vec![None; RECORD_CAPACITY],
        }
    }

    /// Build a record from stored slots, padding or truncating to capacity
    pub fn from_slots(mut slots: Vec<Slot>) -> Self {
        slots.resize(RECORD_CAPACITY, None);
        Self { slots }
    }

    /// All slots, always `RECORD_CAPACITY` long
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Consume the record into its slots
    pub fn into_slots(self) -> Vec<Slot> {
        self.slots
    }

    /// Slot at `index`, `None` when out of range
    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Replace the slot at `index`
    pub fn set(&mut self, index: usize, slot: Slot) -> Result<()> {
        match self.slots.get_mut(index) {
            Some(target) => {
                *target = slot;
                Ok(())
            }
            None => Err(CoreError::SlotOutOfRange {
                index,
                capacity: RECORD_CAPACITY,
            }),
        }
    }

    /// Number of non-empty slots
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True when every slot is empty
    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
    }

    /// Iterate `(index, item)` over occupied slots
    pub fn items(&self) -> impl Iterator<Item = (usize, &Item)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|item| (i, item)))
    }
}

impl Default for InventoryRecord {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<Slot>> for InventoryRecord {
    fn from(slots: Vec<Slot>) -> Self {
        Self::from_slots(slots)
    }
}
