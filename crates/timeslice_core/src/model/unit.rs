//! Allocation unit domain model.
//!
//! # Responsibility
//! - Define one task row's allocation state: percentage, typed hours, lock.
//! - Provide the only transitions that change lock state, so the coherence
//!   invariant cannot drift.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another unit.
//! - `locked` ⇔ `hours_override.is_some()` ⇔ `marker == Valid`.
//! - `marker == Invalid` implies the unit is unlocked with no override.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one allocation unit (task row).
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type UnitId = Uuid;

/// Render marker for the hours field of one unit.
///
/// `Valid` mirrors an accepted typed value (the unit is locked); `Invalid`
/// records a rejected input until the field is edited again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMarker {
    /// No explicit hours input was made for this unit.
    #[default]
    Neutral,
    /// The last typed hours value was accepted; the unit is locked.
    Valid,
    /// The last typed hours value was rejected and cleared.
    Invalid,
}

/// One task row of the allocation session.
///
/// The percentage is the working representation; typed hours become
/// authoritative only while the unit is locked, in which case the
/// percentage is derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationUnit {
    /// Stable row ID used by edits, rendering and FFI addressing.
    pub uuid: UnitId,
    /// Share of the session total, kept in `[0, 100]`.
    pub percentage: f64,
    /// Explicitly typed hours; authoritative while `locked`.
    pub hours_override: Option<f64>,
    /// Whether typed hours pin this unit against redistribution.
    pub locked: bool,
    /// Hours-field render marker.
    pub marker: InputMarker,
}

impl AllocationUnit {
    /// Creates a fresh unit: 0 %, unlocked, neutral marker.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// Creates a unit with a caller-provided stable ID.
    ///
    /// Used by tests and import paths where identity already exists.
    pub fn with_id(uuid: UnitId) -> Self {
        Self {
            uuid,
            percentage: 0.0,
            hours_override: None,
            locked: false,
            marker: InputMarker::Neutral,
        }
    }

    /// Pins this unit to an accepted typed hours value.
    pub fn lock_at(&mut self, hours: f64, percentage: f64) {
        self.hours_override = Some(hours);
        self.locked = true;
        self.marker = InputMarker::Valid;
        self.percentage = percentage;
    }

    /// Records a rejected hours input: field cleared, unit unlocked.
    pub fn reject_input(&mut self) {
        self.hours_override = None;
        self.locked = false;
        self.marker = InputMarker::Invalid;
    }

    /// Drops the override and returns the unit to slider control.
    ///
    /// The current percentage is kept; derived hours follow it again.
    pub fn clear_override(&mut self) {
        self.hours_override = None;
        self.locked = false;
        self.marker = InputMarker::Neutral;
    }

    /// Hours this unit currently stands for.
    ///
    /// Locked units answer with their authoritative typed hours; unlocked
    /// units derive from percentage. A missing total (`total <= 0`) yields 0.
    pub fn derived_hours(&self, total_hours: f64) -> f64 {
        if let Some(hours) = self.hours_override {
            return hours;
        }
        if total_hours > 0.0 {
            self.percentage / 100.0 * total_hours
        } else {
            0.0
        }
    }
}

impl Default for AllocationUnit {
    fn default() -> Self {
        Self::new()
    }
}
