use timeslice_core::{
    reconcile, HoursInputError, HoursInputOutcome, InputMarker, Session, SessionError, UnitId,
};
use uuid::Uuid;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// total=10 with two rows at 50 % each.
fn fifty_fifty() -> (Session, UnitId, UnitId) {
    let mut session = Session::new(10.0);
    let a = session.units()[0].uuid;
    let b = reconcile::unit_added(&mut session);
    reconcile::slider_moved(&mut session, a, 50.0).unwrap();
    (session, a, b)
}

#[test]
fn typing_hours_locks_the_row_and_rebalances_the_rest() {
    let (mut session, a, b) = fifty_fifty();

    let outcome = reconcile::hours_typed(&mut session, a, "8").unwrap();
    match outcome {
        HoursInputOutcome::Locked { percentage } => assert_close(percentage, 80.0),
        other => panic!("expected lock, got {other:?}"),
    }

    let locked = session.unit(a).unwrap();
    assert!(locked.locked);
    assert_eq!(locked.hours_override, Some(8.0));
    assert_eq!(locked.marker, InputMarker::Valid);
    assert_close(locked.percentage, 80.0);

    let sibling = session.unit(b).unwrap();
    assert_close(sibling.percentage, 20.0);
    assert!((sibling.derived_hours(session.total_hours()) - 2.0).abs() < 1e-6);
    assert!(session.is_balanced());
}

#[test]
fn locking_at_the_full_total_drives_every_other_row_to_zero() {
    let mut session = Session::new(10.0);
    let a = session.units()[0].uuid;
    let b = reconcile::unit_added(&mut session);
    let c = reconcile::unit_added(&mut session);
    reconcile::set_auto_balance(&mut session, false);
    reconcile::slider_moved(&mut session, b, 30.0).unwrap();
    reconcile::slider_moved(&mut session, c, 70.0).unwrap();

    let outcome = reconcile::hours_typed(&mut session, a, "10").unwrap();
    assert!(matches!(
        outcome,
        HoursInputOutcome::Locked { percentage } if (percentage - 100.0).abs() < 1e-9
    ));
    assert_close(session.unit(b).unwrap().percentage, 0.0);
    assert_close(session.unit(c).unwrap().percentage, 0.0);
    assert_close(session.percentage_sum(), 100.0);
}

#[test]
fn non_numeric_input_is_rejected_and_cleared() {
    let (mut session, a, b) = fifty_fifty();

    let outcome = reconcile::hours_typed(&mut session, b, "abc").unwrap();
    assert!(matches!(
        outcome,
        HoursInputOutcome::Rejected(HoursInputError::NotANumber(raw)) if raw == "abc"
    ));

    let rejected = session.unit(b).unwrap();
    assert!(!rejected.locked);
    assert_eq!(rejected.hours_override, None);
    assert_eq!(rejected.marker, InputMarker::Invalid);
    assert_close(rejected.percentage, 50.0);
    assert_close(session.unit(a).unwrap().percentage, 50.0);
}

#[test]
fn negative_input_is_rejected() {
    let (mut session, _a, b) = fifty_fifty();

    let outcome = reconcile::hours_typed(&mut session, b, "-2").unwrap();
    assert!(matches!(
        outcome,
        HoursInputOutcome::Rejected(HoursInputError::Negative(typed)) if typed == -2.0
    ));
    assert_eq!(session.unit(b).unwrap().marker, InputMarker::Invalid);
}

#[test]
fn input_above_the_total_is_rejected() {
    let (mut session, _a, b) = fifty_fifty();

    let outcome = reconcile::hours_typed(&mut session, b, "12").unwrap();
    assert!(matches!(
        outcome,
        HoursInputOutcome::Rejected(HoursInputError::ExceedsTotal { typed, total })
            if typed == 12.0 && total == 10.0
    ));

    let rejected = session.unit(b).unwrap();
    assert!(!rejected.locked);
    assert_eq!(rejected.hours_override, None);
    assert_eq!(rejected.marker, InputMarker::Invalid);
}

#[test]
fn typing_zero_hours_locks_at_zero_percent() {
    let (mut session, a, b) = fifty_fifty();

    let outcome = reconcile::hours_typed(&mut session, a, "0").unwrap();
    assert!(matches!(
        outcome,
        HoursInputOutcome::Locked { percentage } if percentage == 0.0
    ));
    assert_eq!(session.unit(a).unwrap().hours_override, Some(0.0));
    assert_close(session.unit(b).unwrap().percentage, 100.0);
}

#[test]
fn clearing_typed_hours_returns_the_row_to_slider_control() {
    let (mut session, a, b) = fifty_fifty();
    reconcile::hours_typed(&mut session, a, "8").unwrap();

    reconcile::hours_cleared(&mut session, a).unwrap();

    let cleared = session.unit(a).unwrap();
    assert!(!cleared.locked);
    assert_eq!(cleared.hours_override, None);
    assert_eq!(cleared.marker, InputMarker::Neutral);
    assert_close(cleared.percentage, 80.0);
    assert_close(session.unit(b).unwrap().percentage, 20.0);
}

#[test]
fn slider_edit_on_a_locked_row_unlocks_it() {
    let (mut session, a, b) = fifty_fifty();
    reconcile::hours_typed(&mut session, a, "8").unwrap();

    reconcile::slider_moved(&mut session, a, 50.0).unwrap();

    let unlocked = session.unit(a).unwrap();
    assert!(!unlocked.locked);
    assert_eq!(unlocked.hours_override, None);
    assert_eq!(unlocked.marker, InputMarker::Neutral);
    assert_close(unlocked.percentage, 50.0);
    assert_close(session.unit(b).unwrap().percentage, 50.0);
}

#[test]
fn adding_a_row_never_disturbs_locked_hours() {
    let (mut session, a, b) = fifty_fifty();
    reconcile::hours_typed(&mut session, a, "6").unwrap();
    reconcile::hours_typed(&mut session, b, "4").unwrap();

    let c = reconcile::unit_added(&mut session);

    assert_close(session.unit(c).unwrap().percentage, 0.0);
    assert_eq!(session.unit(a).unwrap().hours_override, Some(6.0));
    assert_eq!(session.unit(b).unwrap().hours_override, Some(4.0));
}

#[test]
fn typed_hours_for_an_unknown_row_report_not_found() {
    let (mut session, _a, _b) = fifty_fifty();
    let missing = Uuid::new_v4();

    let err = reconcile::hours_typed(&mut session, missing, "3").unwrap_err();
    assert_eq!(err, SessionError::UnitNotFound(missing));
}
