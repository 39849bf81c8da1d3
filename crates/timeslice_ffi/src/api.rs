//! FFI use-case API for frontend-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to the UI via FRB.
//! - Keep the live form session process-global and serialize access.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every failure degrades to an envelope with `ok=false`.

use log::info;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use timeslice_core::db::open_journal;
use timeslice_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, parse_hours_text,
    ping as ping_inner, project, reconcile, EntryDraft, EntryListQuery, EntryService,
    HoursInputOutcome, InputMarker, OptionCatalog, Session, SessionView, SqliteEntryRepository,
    TaskDraft, UnitId,
};
use uuid::Uuid;

const LIST_DEFAULT_LIMIT: u32 = 10;
const LIST_LIMIT_MAX: u32 = 50;
const JOURNAL_DB_FILE_NAME: &str = "timeslice_journal.sqlite3";

static JOURNAL_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static FORM_SESSION: Mutex<Option<Session>> = Mutex::new(None);
static OPTION_CATALOG: Mutex<Option<OptionCatalog>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Idempotent for the same `level + log_dir`; conflicts return an error.
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Render state of one task row, FFI shape.
#[derive(Debug, Clone, PartialEq)]
pub struct FormUnitView {
    /// Stable row ID for follow-up edits.
    pub unit_id: String,
    /// Raw percentage for slider positioning.
    pub percentage: f64,
    /// Effective hours of this row.
    pub hours: f64,
    /// Whole-number percent label, e.g. `80%`.
    pub percent_label: String,
    /// Hours-field content; `None` renders an empty field.
    pub hours_value: Option<String>,
    /// Placeholder shown while the field is empty.
    pub hours_placeholder: String,
    /// Field marker: `neutral|valid|invalid`.
    pub marker: String,
    /// Whether the row is pinned by typed hours.
    pub locked: bool,
}

/// Render state of the whole form, FFI shape.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSessionView {
    pub total_hours: f64,
    pub auto_balance: bool,
    pub balanced: bool,
    pub allocated_hours: f64,
    pub remaining_hours: f64,
    pub units: Vec<FormUnitView>,
}

/// Envelope for form interaction calls.
#[derive(Debug, Clone, PartialEq)]
pub struct FormResponse {
    /// Whether the edit was applied.
    pub ok: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
    /// Refreshed render state; `None` when no session is active.
    pub view: Option<FormSessionView>,
}

/// Generic action response envelope for submission calls.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Optional journaled entry ID.
    pub entry_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

/// One journaled entry in list form.
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySummary {
    pub entry_id: String,
    pub team_member: String,
    pub entry_date: String,
    pub total_hours: f64,
    pub task_count: u32,
    pub created_at_ms: i64,
}

/// List response envelope for journal queries.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryListResponse {
    pub items: Vec<EntrySummary>,
    pub message: String,
    pub applied_limit: u32,
}

/// One task row as the frontend submits it.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryTaskInput {
    pub category: String,
    pub product_family: String,
    pub project: String,
    pub comment: String,
    pub hours: f64,
}

/// Starts (or restarts) the live form session.
///
/// # FFI contract
/// - Sync call; replaces any previous session.
/// - A non-positive total starts the session in missing-total state.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn form_start(total_hours: f64) -> FormResponse {
    let mut slot = lock_session();
    *slot = Some(Session::new(total_hours));
    info!("event=form_start module=ffi status=ok total_hours={total_hours}");
    respond_ok(&slot, "Form session started.")
}

/// Appends a task row to the live session.
#[flutter_rust_bridge::frb(sync)]
pub fn form_add_task() -> FormResponse {
    with_session(|session| {
        let id = reconcile::unit_added(session);
        Ok(format!("Task row {id} added."))
    })
}

/// Removes a task row; the last remaining row is kept.
#[flutter_rust_bridge::frb(sync)]
pub fn form_remove_task(unit_id: String) -> FormResponse {
    with_unit(&unit_id, |session, unit| {
        reconcile::unit_removed(session, unit)
            .map(|()| "Task row removed.".to_string())
            .map_err(|err| err.to_string())
    })
}

/// Applies a slider drag to one task row.
#[flutter_rust_bridge::frb(sync)]
pub fn form_slider_moved(unit_id: String, percentage: f64) -> FormResponse {
    with_unit(&unit_id, |session, unit| {
        reconcile::slider_moved(session, unit, percentage)
            .map(|()| "Slider applied.".to_string())
            .map_err(|err| err.to_string())
    })
}

/// Applies a typed hours value to one task row.
///
/// Rejected input is reported with `ok=true` (the form recovered locally);
/// the message carries the cause and the refreshed view carries the
/// `invalid` marker.
#[flutter_rust_bridge::frb(sync)]
pub fn form_hours_typed(unit_id: String, raw: String) -> FormResponse {
    with_unit(&unit_id, |session, unit| {
        reconcile::hours_typed(session, unit, raw.as_str())
            .map(|outcome| match outcome {
                HoursInputOutcome::Locked { percentage } => {
                    format!("Hours locked at {percentage:.0}%.")
                }
                HoursInputOutcome::Rejected(cause) => format!("Hours rejected: {cause}."),
            })
            .map_err(|err| err.to_string())
    })
}

/// Clears the typed hours of one task row.
#[flutter_rust_bridge::frb(sync)]
pub fn form_hours_cleared(unit_id: String) -> FormResponse {
    with_unit(&unit_id, |session, unit| {
        reconcile::hours_cleared(session, unit)
            .map(|()| "Hours cleared.".to_string())
            .map_err(|err| err.to_string())
    })
}

/// Applies the total-hours field content.
///
/// Non-numeric or non-positive input moves the session into missing-total
/// state instead of failing.
#[flutter_rust_bridge::frb(sync)]
pub fn form_total_hours_changed(raw: String) -> FormResponse {
    with_session(|session| {
        let value = parse_hours_text(raw.as_str()).unwrap_or(f64::NAN);
        reconcile::total_hours_changed(session, value);
        if session.has_total() {
            Ok(format!("Total set to {} hours.", session.total_hours()))
        } else {
            Ok("Total hours missing; allocation paused.".to_string())
        }
    })
}

/// Switches the auto-balance behavior of the live session.
#[flutter_rust_bridge::frb(sync)]
pub fn form_set_auto_balance(enabled: bool) -> FormResponse {
    with_session(|session| {
        reconcile::set_auto_balance(session, enabled);
        Ok(if enabled {
            "Auto-balance enabled.".to_string()
        } else {
            "Auto-balance disabled.".to_string()
        })
    })
}

/// Loads the backend option catalog from its JSON shape.
///
/// # FFI contract
/// - Sync call; replaces the previous catalog.
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn set_option_catalog(json: String) -> String {
    match serde_json::from_str::<OptionCatalog>(json.as_str()) {
        Ok(catalog) => {
            let mut slot = lock_catalog();
            *slot = Some(catalog.normalized());
            String::new()
        }
        Err(err) => format!("option catalog rejected: {err}"),
    }
}

/// Validates and journals one submitted entry.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Validation failures return `ok=false` with the aggregated report as
///   message; nothing is persisted.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn submit_entry(
    team_member: String,
    entry_date: String,
    total_hours: f64,
    tasks: Vec<EntryTaskInput>,
) -> EntryActionResponse {
    let draft = EntryDraft {
        team_member,
        entry_date,
        total_hours,
        tasks: tasks
            .into_iter()
            .map(|task| TaskDraft {
                category: task.category,
                product_family: task.product_family,
                project: task.project,
                comment: task.comment,
                hours: task.hours,
            })
            .collect(),
    };
    let catalog = lock_catalog().clone().unwrap_or_default();

    match with_entry_service(|service| service.submit_entry(&draft, &catalog)) {
        Ok(record) => EntryActionResponse {
            ok: true,
            entry_id: Some(record.uuid.to_string()),
            message: "Entry submitted.".to_string(),
        },
        Err(err) => EntryActionResponse {
            ok: false,
            entry_id: None,
            message: format!("submit_entry failed: {err}"),
        },
    }
}

/// Lists journaled entries, newest first.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Returns deterministic envelope with applied limit.
#[flutter_rust_bridge::frb(sync)]
pub fn list_entries(team_member: Option<String>, limit: Option<u32>) -> EntryListResponse {
    let applied_limit = normalize_list_limit(limit);
    let query = EntryListQuery {
        team_member,
        limit: Some(applied_limit),
        offset: 0,
    };

    match with_entry_service(|service| service.list_entries(&query)) {
        Ok(entries) => {
            let items: Vec<EntrySummary> = entries
                .into_iter()
                .map(|entry| EntrySummary {
                    entry_id: entry.uuid.to_string(),
                    team_member: entry.team_member,
                    entry_date: entry.entry_date,
                    total_hours: entry.total_hours,
                    task_count: entry.tasks.len() as u32,
                    created_at_ms: entry.created_at_ms,
                })
                .collect();
            let message = if items.is_empty() {
                "No entries.".to_string()
            } else {
                format!("Found {} entry(ies).", items.len())
            };
            EntryListResponse {
                items,
                message,
                applied_limit,
            }
        }
        Err(err) => EntryListResponse {
            items: Vec::new(),
            message: format!("list_entries failed: {err}"),
            applied_limit,
        },
    }
}

fn lock_session() -> MutexGuard<'static, Option<Session>> {
    FORM_SESSION.lock().unwrap_or_else(PoisonError::into_inner)
}

fn lock_catalog() -> MutexGuard<'static, Option<OptionCatalog>> {
    OPTION_CATALOG
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn with_session(apply: impl FnOnce(&mut Session) -> Result<String, String>) -> FormResponse {
    let mut slot = lock_session();
    match slot.as_mut() {
        None => FormResponse {
            ok: false,
            message: "No form session active; call form_start first.".to_string(),
            view: None,
        },
        Some(session) => match apply(session) {
            Ok(message) => respond_ok(&slot, &message),
            Err(message) => FormResponse {
                ok: false,
                message,
                view: slot.as_ref().map(|session| to_form_view(project(session))),
            },
        },
    }
}

fn with_unit(
    unit_id: &str,
    apply: impl FnOnce(&mut Session, UnitId) -> Result<String, String>,
) -> FormResponse {
    match Uuid::parse_str(unit_id.trim()) {
        Ok(unit) => with_session(|session| apply(session, unit)),
        Err(_) => {
            let slot = lock_session();
            FormResponse {
                ok: false,
                message: format!("invalid task row id `{unit_id}`"),
                view: slot.as_ref().map(|session| to_form_view(project(session))),
            }
        }
    }
}

fn respond_ok(slot: &Option<Session>, message: &str) -> FormResponse {
    FormResponse {
        ok: true,
        message: message.to_string(),
        view: slot.as_ref().map(|session| to_form_view(project(session))),
    }
}

fn to_form_view(view: SessionView) -> FormSessionView {
    FormSessionView {
        total_hours: view.total_hours,
        auto_balance: view.auto_balance,
        balanced: view.balanced,
        allocated_hours: view.allocated_hours,
        remaining_hours: view.remaining_hours,
        units: view
            .units
            .into_iter()
            .map(|unit| FormUnitView {
                unit_id: unit.unit_id,
                percentage: unit.percentage,
                hours: unit.hours,
                percent_label: unit.percent_label,
                hours_value: unit.hours_value,
                hours_placeholder: unit.hours_placeholder,
                marker: marker_label(unit.marker).to_string(),
                locked: unit.locked,
            })
            .collect(),
    }
}

fn marker_label(marker: InputMarker) -> &'static str {
    match marker {
        InputMarker::Neutral => "neutral",
        InputMarker::Valid => "valid",
        InputMarker::Invalid => "invalid",
    }
}

fn normalize_list_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) => LIST_DEFAULT_LIMIT,
        Some(value) if value > LIST_LIMIT_MAX => LIST_LIMIT_MAX,
        Some(value) => value,
        None => LIST_DEFAULT_LIMIT,
    }
}

fn resolve_journal_db_path() -> PathBuf {
    JOURNAL_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("TIMESLICE_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(JOURNAL_DB_FILE_NAME)
        })
        .clone()
}

fn with_entry_service<T>(
    f: impl FnOnce(
        &EntryService<SqliteEntryRepository<'_>>,
    ) -> Result<T, timeslice_core::EntryServiceError>,
) -> Result<T, String> {
    let db_path = resolve_journal_db_path();
    let conn = open_journal(&db_path).map_err(|err| format!("journal open failed: {err}"))?;
    let service = EntryService::new(SqliteEntryRepository::new(&conn));
    f(&service).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, form_add_task, form_hours_typed, form_remove_task, form_slider_moved,
        form_start, form_total_hours_changed, init_logging, list_entries, ping,
        set_option_catalog, submit_entry, EntryTaskInput,
    };
    use std::time::{SystemTime, UNIX_EPOCH};
    use timeslice_core::db::open_journal;

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn set_option_catalog_rejects_invalid_json_and_accepts_empty_lists() {
        let error = set_option_catalog("{not json".to_string());
        assert!(error.contains("option catalog rejected"));

        let accepted = set_option_catalog(r#"{"projects": [" Atlas ", ""]}"#.to_string());
        assert!(accepted.is_empty());
    }

    // The live session is process-global, so the whole interaction flow is
    // exercised in one test to keep parallel test runs independent.
    #[test]
    fn form_flow_reconciles_rows_through_the_envelope_api() {
        let started = form_start(10.0);
        assert!(started.ok, "{}", started.message);
        let view = started.view.expect("session view");
        assert_eq!(view.units.len(), 1);
        let first = view.units[0].unit_id.clone();

        let added = form_add_task();
        assert!(added.ok);
        let view = added.view.expect("session view");
        assert_eq!(view.units.len(), 2);
        let second = view.units[1].unit_id.clone();

        let dragged = form_slider_moved(first.clone(), 60.0);
        assert!(dragged.ok);
        let view = dragged.view.expect("session view");
        assert!((view.units[0].percentage - 60.0).abs() < 1e-9);
        assert!((view.units[1].percentage - 40.0).abs() < 1e-9);
        assert!(view.balanced);

        let locked = form_hours_typed(second.clone(), "8".to_string());
        assert!(locked.ok);
        assert!(locked.message.contains("80%"), "{}", locked.message);
        let view = locked.view.expect("session view");
        assert_eq!(view.units[1].marker, "valid");
        assert_eq!(view.units[1].hours_value.as_deref(), Some("8.0"));
        assert!((view.units[0].percentage - 20.0).abs() < 1e-9);

        let rejected = form_hours_typed(first.clone(), "99".to_string());
        assert!(rejected.ok);
        assert!(rejected.message.contains("rejected"), "{}", rejected.message);
        let view = rejected.view.expect("session view");
        assert_eq!(view.units[0].marker, "invalid");

        let removed = form_remove_task(second);
        assert!(removed.ok);
        assert_eq!(removed.view.expect("session view").units.len(), 1);

        let missing_total = form_total_hours_changed("lots".to_string());
        assert!(missing_total.ok);
        assert!(missing_total.message.contains("missing"));
        assert_eq!(missing_total.view.expect("session view").total_hours, 0.0);

        let bad_id = form_slider_moved("not-a-uuid".to_string(), 10.0);
        assert!(!bad_id.ok);
    }

    #[test]
    fn submit_and_list_round_trip_through_the_journal() {
        let member = unique_token("ffi-submit");
        let response = submit_entry(
            member.clone(),
            "2026-08-06".to_string(),
            8.0,
            vec![EntryTaskInput {
                category: "Development".to_string(),
                product_family: "Platform".to_string(),
                project: "Atlas".to_string(),
                comment: String::new(),
                hours: 8.0,
            }],
        );
        assert!(response.ok, "{}", response.message);
        let entry_id = response.entry_id.expect("submitted entry id");

        let listing = list_entries(Some(member), Some(42));
        assert_eq!(listing.applied_limit, 42);
        assert!(listing.items.iter().any(|item| item.entry_id == entry_id));

        let conn = open_journal(super::resolve_journal_db_path()).expect("open journal");
        let task_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM entry_tasks WHERE entry_uuid = ?1;",
                [entry_id.as_str()],
                |row| row.get(0),
            )
            .expect("query task rows");
        assert_eq!(task_count, 1);
    }

    #[test]
    fn submit_blocks_on_validation_failure() {
        let response = submit_entry(String::new(), String::new(), 0.0, Vec::new());
        assert!(!response.ok);
        assert!(response.message.contains("Please select a team member."));
        assert!(response.entry_id.is_none());
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
