//! Display projection of the allocation session.
//!
//! # Responsibility
//! - Project a `Session` into the strings and markers a frontend renders.
//! - Keep presentation derivation out of the reconciler: projection is
//!   idempotent and never mutates state.
//!
//! # Invariants
//! - Percent labels are whole numbers; hours text carries one decimal.
//! - A locked unit's field shows its authoritative typed hours; an unlocked
//!   unit's field stays empty with the derived hours as placeholder.

use crate::model::session::Session;
use crate::model::unit::{AllocationUnit, InputMarker};

/// Render state of one task row.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitView {
    /// Stable row ID in string form, for frontend addressing.
    pub unit_id: String,
    /// Raw percentage value, for slider positioning.
    pub percentage: f64,
    /// Effective hours this row stands for.
    pub hours: f64,
    /// Whole-number percent label, e.g. `80%`.
    pub percent_label: String,
    /// Hours-field content: the typed value while locked, empty otherwise.
    pub hours_value: Option<String>,
    /// Derived hours shown as placeholder when the field is empty.
    pub hours_placeholder: String,
    /// Hours-field marker (`Neutral`, `Valid`, `Invalid`).
    pub marker: InputMarker,
    /// Whether this row is pinned by typed hours.
    pub locked: bool,
}

/// Render state of the whole form.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub total_hours: f64,
    pub auto_balance: bool,
    /// Whether the allocation reaches 100 % within tolerance.
    pub balanced: bool,
    /// Hours covered by the current allocation.
    pub allocated_hours: f64,
    /// Hours of the total not yet allocated (negative when over-allocated).
    pub remaining_hours: f64,
    pub units: Vec<UnitView>,
}

/// Projects the session into its render state.
pub fn project(session: &Session) -> SessionView {
    let total = session.total_hours();
    let units: Vec<UnitView> = session
        .units()
        .iter()
        .map(|unit| project_unit(unit, total))
        .collect();
    let allocated_hours: f64 = units.iter().map(|view| view.hours).sum();

    SessionView {
        total_hours: total,
        auto_balance: session.auto_balance(),
        balanced: session.is_balanced(),
        allocated_hours,
        remaining_hours: total - allocated_hours,
        units,
    }
}

fn project_unit(unit: &AllocationUnit, total_hours: f64) -> UnitView {
    let hours = unit.derived_hours(total_hours);
    UnitView {
        unit_id: unit.uuid.to_string(),
        percentage: unit.percentage,
        hours,
        percent_label: format_percent(unit.percentage),
        hours_value: unit.hours_override.map(format_hours),
        hours_placeholder: format_hours(hours),
        marker: unit.marker,
        locked: unit.locked,
    }
}

/// Formats a percentage as a whole-number label.
pub fn format_percent(value: f64) -> String {
    format!("{value:.0}%")
}

/// Formats hours with one decimal place.
pub fn format_hours(value: f64) -> String {
    format!("{value:.1}")
}

#[cfg(test)]
mod tests {
    use super::{format_hours, format_percent};

    #[test]
    fn percent_label_rounds_to_whole_numbers() {
        assert_eq!(format_percent(33.333), "33%");
        assert_eq!(format_percent(66.6), "67%");
        assert_eq!(format_percent(0.0), "0%");
    }

    #[test]
    fn hours_text_keeps_one_decimal() {
        assert_eq!(format_hours(2.0), "2.0");
        assert_eq!(format_hours(2.25), "2.2");
        assert_eq!(format_hours(8.0), "8.0");
    }
}
