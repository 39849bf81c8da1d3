//! Allocation reconciliation engine.
//!
//! # Responsibility
//! - Apply every user edit (slider drag, typed hours, total change, row
//!   add/remove, auto-balance toggle) to the session in one synchronous pass.
//! - Redistribute unallocated percentage across unlocked rows in equal
//!   shares, without ever leaving `[0, 100]`.
//!
//! # Invariants
//! - The trigger unit's value is authoritative for its pass and never
//!   receives redistribution.
//! - Locked units keep their typed hours through every operation; only their
//!   derived percentage moves.
//! - A missing total (`total <= 0`) short-circuits recomputation entirely.

use crate::model::session::{Session, SessionError, BALANCE_TOLERANCE_PCT};
use crate::model::unit::UnitId;
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Residue below this many percentage points is treated as fully absorbed.
const RESIDUE_EPSILON_PCT: f64 = 1e-9;

/// Why a typed hours value was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum HoursInputError {
    /// Input did not parse as a finite number.
    NotANumber(String),
    /// Negative hours are never a valid allocation.
    Negative(f64),
    /// Typed hours exceed the session total.
    ExceedsTotal { typed: f64, total: f64 },
}

impl Display for HoursInputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotANumber(raw) => write!(f, "`{raw}` is not a number of hours"),
            Self::Negative(typed) => write!(f, "hours must not be negative, got {typed}"),
            Self::ExceedsTotal { typed, total } => {
                write!(f, "typed hours {typed} exceed the total of {total}")
            }
        }
    }
}

impl Error for HoursInputError {}

/// Result of one typed-hours edit.
///
/// A rejection is a locally recovered condition (field cleared, unit marked
/// invalid), not an `Err`; callers still learn the cause for display.
#[derive(Debug, Clone, PartialEq)]
pub enum HoursInputOutcome {
    /// Value accepted; the unit is now locked at the derived percentage.
    Locked { percentage: f64 },
    /// Value rejected; the unit stays unlocked with a cleared field.
    Rejected(HoursInputError),
}

/// Parses user-typed hours text into a finite number.
pub fn parse_hours_text(raw: &str) -> Result<f64, HoursInputError> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(HoursInputError::NotANumber(trimmed.to_string())),
    }
}

/// Validates user-typed hours against the session total.
///
/// Rejects, in order, non-finite/non-numeric text, negative values, and
/// values that exceed the total; otherwise returns the accepted hours.
fn classify_hours_input(raw: &str, total: f64) -> Result<f64, HoursInputError> {
    let typed = parse_hours_text(raw)?;
    if typed < 0.0 {
        return Err(HoursInputError::Negative(typed));
    }
    if typed > total {
        return Err(HoursInputError::ExceedsTotal { typed, total });
    }
    Ok(typed)
}

/// Applies a slider drag to one unit.
///
/// The dragged value is clamped to `[0, 100]` and becomes authoritative. A
/// locked unit is unlocked by a slider edit: the stale override would
/// otherwise keep absorbing redistribution. Sibling rows rebalance only
/// while auto-balance is on.
pub fn slider_moved(
    session: &mut Session,
    unit: UnitId,
    percentage: f64,
) -> Result<(), SessionError> {
    let clamped = clamp_pct(percentage);
    let target = session
        .unit_mut(unit)
        .ok_or(SessionError::UnitNotFound(unit))?;
    if target.locked {
        target.clear_override();
    }
    target.percentage = clamped;

    if session.auto_balance() {
        rebalance(session, Some(unit));
    }
    Ok(())
}

/// Applies a typed hours value to one unit.
///
/// Accepted values lock the unit and rebalance the remaining unlocked rows
/// around it; rejected values clear the field and leave every other unit
/// untouched.
pub fn hours_typed(
    session: &mut Session,
    unit: UnitId,
    raw: &str,
) -> Result<HoursInputOutcome, SessionError> {
    let total = session.total_hours();
    let classified = classify_hours_input(raw, total);
    let target = session
        .unit_mut(unit)
        .ok_or(SessionError::UnitNotFound(unit))?;

    match classified {
        Err(cause) => {
            target.reject_input();
            warn!("event=hours_input module=reconcile status=rejected unit={unit} cause={cause}");
            Ok(HoursInputOutcome::Rejected(cause))
        }
        Ok(typed) => {
            let percentage = if total > 0.0 {
                clamp_pct(typed / total * 100.0)
            } else {
                0.0
            };
            target.lock_at(typed, percentage);
            rebalance(session, Some(unit));
            debug!(
                "event=hours_input module=reconcile status=locked unit={unit} hours={typed} percentage={percentage}"
            );
            Ok(HoursInputOutcome::Locked { percentage })
        }
    }
}

/// Clears the typed hours of one unit, returning it to slider control.
///
/// The current percentage is kept; siblings rebalance around it while
/// auto-balance is on.
pub fn hours_cleared(session: &mut Session, unit: UnitId) -> Result<(), SessionError> {
    let target = session
        .unit_mut(unit)
        .ok_or(SessionError::UnitNotFound(unit))?;
    target.clear_override();

    if session.auto_balance() {
        rebalance(session, Some(unit));
    }
    Ok(())
}

/// Applies a new session total.
///
/// Unlocked units keep their percentage and re-derive hours; locked units
/// keep their absolute typed hours and re-derive percentage. A non-finite or
/// non-positive total is stored as 0 and recomputation is skipped.
pub fn total_hours_changed(session: &mut Session, new_total: f64) {
    if !new_total.is_finite() || new_total <= 0.0 {
        session.set_total_hours(0.0);
        warn!("event=total_hours module=reconcile status=skipped cause=missing_total");
        return;
    }
    session.set_total_hours(new_total);
    sync_locked_percentages(session);
}

/// Switches the auto-balance flag.
///
/// Enabling it seeds zero-percentage unlocked rows with an equal share of
/// whatever percentage is still unallocated.
pub fn set_auto_balance(session: &mut Session, enabled: bool) {
    session.set_auto_balance(enabled);
    if enabled {
        seed_zero_units(session);
    }
}

/// Appends a fresh task row.
///
/// The new unit stays at 0 % and no redistribution fires, so locked units'
/// hours are never disturbed by a row add.
pub fn unit_added(session: &mut Session) -> UnitId {
    let id = session.add_unit();
    sync_locked_percentages(session);
    id
}

/// Removes a task row and lets the survivors absorb its share.
///
/// Removing the last remaining row is rejected.
pub fn unit_removed(session: &mut Session, unit: UnitId) -> Result<(), SessionError> {
    session.remove_unit(unit)?;
    rebalance(session, None);
    Ok(())
}

/// One redistribution pass.
///
/// Receivers are the unlocked units other than the trigger that carry a
/// nonzero percentage; zero rows step in only when no such receiver exists.
/// The gap between the open (non-locked) share and the current unlocked sum
/// is spread in equal shares, clamping to `[0, 100]` and re-queueing clamp
/// residue until it is absorbed.
pub(crate) fn rebalance(session: &mut Session, trigger: Option<UnitId>) {
    if !session.has_total() {
        debug!("event=rebalance module=reconcile status=skipped cause=missing_total");
        return;
    }
    sync_locked_percentages(session);

    let total = session.total_hours();
    let remaining_pct = clamp_pct((total - session.locked_hours()) / total * 100.0);

    let mut receivers: Vec<UnitId> = session
        .units()
        .iter()
        .filter(|u| !u.locked && Some(u.uuid) != trigger && u.percentage > 0.0)
        .map(|u| u.uuid)
        .collect();
    if receivers.is_empty() {
        receivers = session
            .units()
            .iter()
            .filter(|u| !u.locked && Some(u.uuid) != trigger)
            .map(|u| u.uuid)
            .collect();
    }

    if receivers.is_empty() {
        // The trigger is the only unlocked unit: its value holds, clamped to
        // the share the locked units leave open.
        if let Some(trigger_id) = trigger {
            if let Some(unit) = session.unit_mut(trigger_id) {
                if !unit.locked {
                    unit.percentage = unit.percentage.clamp(0.0, remaining_pct);
                }
            }
        }
        return;
    }

    let unlocked_sum: f64 = session
        .units()
        .iter()
        .filter(|u| !u.locked)
        .map(|u| u.percentage)
        .sum();
    let gap = remaining_pct - unlocked_sum;
    if gap.abs() < BALANCE_TOLERANCE_PCT {
        return;
    }

    distribute_equally(session, &receivers, gap);
    debug!(
        "event=rebalance module=reconcile status=ok receivers={} gap={gap:.3}",
        receivers.len()
    );
}

/// Spreads `amount` percentage points across `receivers` in equal shares.
///
/// Clamping a receiver at a bound re-queues the cut-off residue for the
/// receivers that can still move. Each round either exhausts the pool or
/// saturates at least one receiver, so `receivers.len() + 1` rounds always
/// suffice.
fn distribute_equally(session: &mut Session, receivers: &[UnitId], amount: f64) {
    let mut pool = amount;
    for _ in 0..=receivers.len() {
        if pool.abs() < RESIDUE_EPSILON_PCT {
            break;
        }
        let active: Vec<UnitId> = receivers
            .iter()
            .copied()
            .filter(|id| {
                session.unit(*id).is_some_and(|u| {
                    if pool < 0.0 {
                        u.percentage > 0.0
                    } else {
                        u.percentage < 100.0
                    }
                })
            })
            .collect();
        if active.is_empty() {
            break;
        }

        let share = pool / active.len() as f64;
        pool = 0.0;
        for id in active {
            if let Some(unit) = session.unit_mut(id) {
                let target = unit.percentage + share;
                let clamped = target.clamp(0.0, 100.0);
                pool += target - clamped;
                unit.percentage = clamped;
            }
        }
    }
}

/// Re-derives locked units' percentages from their authoritative hours.
fn sync_locked_percentages(session: &mut Session) {
    let total = session.total_hours();
    for unit in session.units_mut() {
        if let Some(hours) = unit.hours_override {
            unit.percentage = if total > 0.0 {
                clamp_pct(hours / total * 100.0)
            } else {
                0.0
            };
        }
    }
}

/// Gives zero-percentage unlocked rows an equal share of the unallocated
/// percentage, when any is left.
fn seed_zero_units(session: &mut Session) {
    if !session.has_total() {
        return;
    }
    sync_locked_percentages(session);

    let remaining = 100.0 - session.percentage_sum();
    let zero_units: Vec<UnitId> = session
        .units()
        .iter()
        .filter(|u| !u.locked && u.percentage <= 0.0)
        .map(|u| u.uuid)
        .collect();
    if zero_units.is_empty() || remaining < BALANCE_TOLERANCE_PCT {
        return;
    }

    let share = clamp_pct(remaining / zero_units.len() as f64);
    for id in zero_units {
        if let Some(unit) = session.unit_mut(id) {
            unit.percentage = share;
        }
    }
}

fn clamp_pct(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
