use timeslice_core::{project, reconcile, Session, UnitId};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

fn percentage(session: &Session, id: UnitId) -> f64 {
    session.unit(id).expect("unit should exist").percentage
}

#[test]
fn total_change_keeps_percentages_and_recomputes_hours() {
    let mut session = Session::new(10.0);
    let a = session.units()[0].uuid;
    let b = reconcile::unit_added(&mut session);
    let c = reconcile::unit_added(&mut session);
    reconcile::slider_moved(&mut session, a, 100.0).unwrap();

    reconcile::total_hours_changed(&mut session, 20.0);

    assert_close(percentage(&session, a), 100.0);
    assert_close(percentage(&session, b), 0.0);
    assert_close(percentage(&session, c), 0.0);

    let view = project(&session);
    assert!((view.units[0].hours - 20.0).abs() < 1e-6);
    assert!((view.units[1].hours).abs() < 1e-6);
    assert!((view.units[2].hours).abs() < 1e-6);
}

#[test]
fn locked_rows_keep_their_hours_through_a_total_change() {
    let mut session = Session::new(10.0);
    let a = session.units()[0].uuid;
    let b = reconcile::unit_added(&mut session);
    reconcile::slider_moved(&mut session, a, 50.0).unwrap();
    reconcile::hours_typed(&mut session, a, "8").unwrap();
    assert_close(percentage(&session, b), 20.0);

    reconcile::total_hours_changed(&mut session, 16.0);

    let locked = session.unit(a).unwrap();
    assert_eq!(locked.hours_override, Some(8.0));
    assert_close(locked.percentage, 50.0);

    // The unlocked row keeps its percentage; only its hours move.
    let sibling = session.unit(b).unwrap();
    assert_close(sibling.percentage, 20.0);
    assert!((sibling.derived_hours(session.total_hours()) - 3.2).abs() < 1e-6);
}

#[test]
fn shrinking_the_total_clamps_derived_locked_percentage() {
    let mut session = Session::new(10.0);
    let a = session.units()[0].uuid;
    reconcile::unit_added(&mut session);
    reconcile::hours_typed(&mut session, a, "8").unwrap();

    reconcile::total_hours_changed(&mut session, 4.0);

    let locked = session.unit(a).unwrap();
    assert_eq!(locked.hours_override, Some(8.0));
    assert_close(locked.percentage, 100.0);
}

#[test]
fn unusable_total_short_circuits_recomputation() {
    let mut session = Session::new(10.0);
    let a = session.units()[0].uuid;
    let b = reconcile::unit_added(&mut session);
    reconcile::slider_moved(&mut session, a, 60.0).unwrap();

    reconcile::total_hours_changed(&mut session, 0.0);
    assert_eq!(session.total_hours(), 0.0);
    assert!(!session.has_total());
    assert_close(percentage(&session, a), 60.0);
    assert_close(percentage(&session, b), 40.0);

    let view = project(&session);
    assert_eq!(view.units[0].hours, 0.0);
    assert_eq!(view.units[1].hours, 0.0);

    reconcile::total_hours_changed(&mut session, f64::NAN);
    assert_eq!(session.total_hours(), 0.0);
}

#[test]
fn restoring_a_total_brings_hours_back() {
    let mut session = Session::new(10.0);
    let a = session.units()[0].uuid;
    reconcile::unit_added(&mut session);
    reconcile::slider_moved(&mut session, a, 60.0).unwrap();

    reconcile::total_hours_changed(&mut session, 0.0);
    reconcile::total_hours_changed(&mut session, 5.0);

    assert_close(session.total_hours(), 5.0);
    assert_close(percentage(&session, a), 60.0);
    let view = project(&session);
    assert!((view.units[0].hours - 3.0).abs() < 1e-6);
}
