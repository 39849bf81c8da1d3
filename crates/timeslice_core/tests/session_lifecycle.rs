use timeslice_core::{reconcile, AllocationUnit, InputMarker, Session, SessionError};
use uuid::Uuid;

#[test]
fn new_session_starts_with_one_empty_unit() {
    let session = Session::new(8.0);

    assert_eq!(session.total_hours(), 8.0);
    assert!(session.has_total());
    assert!(session.auto_balance());
    assert_eq!(session.unit_count(), 1);

    let unit = &session.units()[0];
    assert_eq!(unit.percentage, 0.0);
    assert_eq!(unit.hours_override, None);
    assert!(!unit.locked);
    assert_eq!(unit.marker, InputMarker::Neutral);
}

#[test]
fn unusable_totals_are_stored_as_missing() {
    assert_eq!(Session::new(-3.0).total_hours(), 0.0);
    assert_eq!(Session::new(0.0).total_hours(), 0.0);
    assert_eq!(Session::new(f64::NAN).total_hours(), 0.0);
    assert!(!Session::new(-3.0).has_total());
}

#[test]
fn added_unit_starts_at_zero_percent() {
    let mut session = Session::new(8.0);
    let id = reconcile::unit_added(&mut session);

    assert_eq!(session.unit_count(), 2);
    let unit = session.unit(id).expect("added unit should be present");
    assert_eq!(unit.percentage, 0.0);
    assert!(!unit.locked);
}

#[test]
fn removing_the_last_unit_is_rejected() {
    let mut session = Session::new(8.0);
    let only = session.units()[0].uuid;

    let err = reconcile::unit_removed(&mut session, only).unwrap_err();
    assert_eq!(err, SessionError::LastUnit);
    assert_eq!(session.unit_count(), 1);
}

#[test]
fn removing_an_unknown_unit_reports_not_found() {
    let mut session = Session::new(8.0);
    reconcile::unit_added(&mut session);
    let missing = Uuid::new_v4();

    let err = reconcile::unit_removed(&mut session, missing).unwrap_err();
    assert_eq!(err, SessionError::UnitNotFound(missing));
    assert_eq!(session.unit_count(), 2);
}

#[test]
fn unit_serialization_uses_expected_wire_fields() {
    let unit_id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let mut unit = AllocationUnit::with_id(unit_id);
    unit.lock_at(4.0, 50.0);

    let json = serde_json::to_value(&unit).unwrap();
    assert_eq!(json["uuid"], unit_id.to_string());
    assert_eq!(json["percentage"], 50.0);
    assert_eq!(json["hours_override"], 4.0);
    assert_eq!(json["locked"], true);
    assert_eq!(json["marker"], "valid");

    let decoded: AllocationUnit = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, unit);
}
