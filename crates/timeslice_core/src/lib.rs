//! Core domain logic for TimeSlice.
//! This crate is the single source of truth for allocation invariants.

pub mod catalog;
pub mod db;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod render;
pub mod repo;
pub mod service;
pub mod submit;

pub use catalog::OptionCatalog;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::session::{Session, SessionError, BALANCE_TOLERANCE_PCT};
pub use model::unit::{AllocationUnit, InputMarker, UnitId};
pub use reconcile::{
    hours_cleared, hours_typed, parse_hours_text, set_auto_balance, slider_moved,
    total_hours_changed, unit_added, unit_removed, HoursInputError, HoursInputOutcome,
};
pub use render::{format_hours, format_percent, project, SessionView, UnitView};
pub use repo::entry_repo::{
    EntryId, EntryListQuery, EntryRecord, EntryRepository, RepoError, RepoResult,
    SqliteEntryRepository, TaskRecord,
};
pub use service::entry_service::{EntryService, EntryServiceError};
pub use submit::{validate_entry, EntryDraft, TaskDraft, ValidationIssue, ValidationReport};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
