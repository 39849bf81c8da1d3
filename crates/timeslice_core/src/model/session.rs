//! Allocation session aggregate.
//!
//! # Responsibility
//! - Own the shared total, the auto-balance flag and the ordered unit list.
//! - Enforce lifecycle guards: a session never drops below one unit.
//!
//! # Invariants
//! - `units` is never empty.
//! - `total_hours <= 0` means "missing total"; derived values read as 0 and
//!   the reconciler short-circuits instead of dividing.
//! - Mutation of unit values goes through the `reconcile` operations; this
//!   module only exposes lifecycle and read access.

use crate::model::unit::{AllocationUnit, UnitId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Sum deviation (in percentage points) still counted as balanced.
pub const BALANCE_TOLERANCE_PCT: f64 = 0.1;

/// Session lifecycle and lookup errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The addressed unit is not part of this session.
    UnitNotFound(UnitId),
    /// Removing the last remaining unit is rejected.
    LastUnit,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnitNotFound(id) => write!(f, "allocation unit not found: {id}"),
            Self::LastUnit => write!(f, "the last remaining task row cannot be removed"),
        }
    }
}

impl Error for SessionError {}

/// In-memory state of one time-entry form.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    total_hours: f64,
    auto_balance: bool,
    units: Vec<AllocationUnit>,
}

impl Session {
    /// Creates a session with one empty task row.
    ///
    /// A non-finite or negative total is stored as 0 ("missing total").
    /// Auto-balance starts enabled; redistribution on slider edits is the
    /// default behavior of the form.
    pub fn new(total_hours: f64) -> Self {
        let total = if total_hours.is_finite() && total_hours > 0.0 {
            total_hours
        } else {
            0.0
        };
        Self {
            total_hours: total,
            auto_balance: true,
            units: vec![AllocationUnit::new()],
        }
    }

    pub fn total_hours(&self) -> f64 {
        self.total_hours
    }

    /// Whether a usable total is present.
    pub fn has_total(&self) -> bool {
        self.total_hours > 0.0
    }

    pub fn auto_balance(&self) -> bool {
        self.auto_balance
    }

    pub fn units(&self) -> &[AllocationUnit] {
        &self.units
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Returns one unit by stable ID.
    pub fn unit(&self, id: UnitId) -> Option<&AllocationUnit> {
        self.units.iter().find(|unit| unit.uuid == id)
    }

    /// Sum of all units' percentages, locked shares included.
    pub fn percentage_sum(&self) -> f64 {
        self.units.iter().map(|unit| unit.percentage).sum()
    }

    /// Hours pinned by locked units.
    pub fn locked_hours(&self) -> f64 {
        self.units
            .iter()
            .filter_map(|unit| unit.hours_override)
            .sum()
    }

    /// Whether the allocation currently reaches 100 % within tolerance.
    pub fn is_balanced(&self) -> bool {
        (self.percentage_sum() - 100.0).abs() <= BALANCE_TOLERANCE_PCT
    }

    pub(crate) fn set_total_hours(&mut self, total_hours: f64) {
        self.total_hours = total_hours;
    }

    pub(crate) fn set_auto_balance(&mut self, enabled: bool) {
        self.auto_balance = enabled;
    }

    pub(crate) fn unit_mut(&mut self, id: UnitId) -> Option<&mut AllocationUnit> {
        self.units.iter_mut().find(|unit| unit.uuid == id)
    }

    pub(crate) fn units_mut(&mut self) -> &mut [AllocationUnit] {
        &mut self.units
    }

    pub(crate) fn add_unit(&mut self) -> UnitId {
        let unit = AllocationUnit::new();
        let id = unit.uuid;
        self.units.push(unit);
        id
    }

    pub(crate) fn remove_unit(&mut self, id: UnitId) -> Result<(), SessionError> {
        let index = self
            .units
            .iter()
            .position(|unit| unit.uuid == id)
            .ok_or(SessionError::UnitNotFound(id))?;
        if self.units.len() == 1 {
            return Err(SessionError::LastUnit);
        }
        self.units.remove(index);
        Ok(())
    }
}
