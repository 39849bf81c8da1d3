//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `timeslice_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use timeslice_core::{project, reconcile, Session};

fn main() {
    println!("timeslice_core ping={}", timeslice_core::ping());
    println!("timeslice_core version={}", timeslice_core::core_version());

    // Scripted allocation pass: two rows over 8 hours, one locked by typing.
    let mut session = Session::new(8.0);
    let first = session.units()[0].uuid;
    let second = reconcile::unit_added(&mut session);

    if let Err(err) = reconcile::slider_moved(&mut session, first, 50.0) {
        println!("slider edit failed: {err}");
        return;
    }
    match reconcile::hours_typed(&mut session, second, "6") {
        Ok(outcome) => println!("typed 6h -> {outcome:?}"),
        Err(err) => {
            println!("hours edit failed: {err}");
            return;
        }
    }

    let view = project(&session);
    println!(
        "total={}h allocated={:.1}h balanced={}",
        view.total_hours, view.allocated_hours, view.balanced
    );
    for (index, unit) in view.units.iter().enumerate() {
        println!(
            "row {} {} hours={} locked={}",
            index + 1,
            unit.percent_label,
            unit.hours_placeholder,
            unit.locked
        );
    }
}
