//! Entry submission use-case service.
//!
//! # Responsibility
//! - Gate journal writes behind the aggregated submit validation.
//! - Normalize draft fields into the persisted record shape.
//!
//! # Invariants
//! - Nothing reaches the journal unless `validate_entry` passed.
//! - Optional task fields (`project`, `comment`) persist as `NULL` when
//!   blank, never as empty strings.

use crate::catalog::OptionCatalog;
use crate::repo::entry_repo::{
    EntryId, EntryListQuery, EntryRecord, EntryRepository, RepoError, TaskRecord,
};
use crate::submit::{validate_entry, EntryDraft, ValidationReport};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Service error for entry submission use-cases.
#[derive(Debug)]
pub enum EntryServiceError {
    /// Submission blocked by required-field checks.
    Validation(ValidationReport),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Write/read-back mismatch in the journal.
    InconsistentState(&'static str),
}

impl Display for EntryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(report) => write!(f, "{report}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent journal state: {details}")
            }
        }
    }
}

impl Error for EntryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(report) => Some(report),
            Self::Repo(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<ValidationReport> for EntryServiceError {
    fn from(value: ValidationReport) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for EntryServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case facade over the entry journal.
pub struct EntryService<R: EntryRepository> {
    repo: R,
}

impl<R: EntryRepository> EntryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates a draft and journals it.
    ///
    /// # Contract
    /// - Validation failures return the full aggregated report; nothing is
    ///   persisted.
    /// - On success the journaled record is read back and returned.
    pub fn submit_entry(
        &self,
        draft: &EntryDraft,
        catalog: &OptionCatalog,
    ) -> Result<EntryRecord, EntryServiceError> {
        validate_entry(draft, catalog)?;

        let record = record_from_draft(draft);
        let id = self.repo.insert_entry(&record)?;
        info!(
            "event=entry_submitted module=entry_service status=ok entry={id} tasks={}",
            record.tasks.len()
        );

        self.repo
            .get_entry(id)?
            .ok_or(EntryServiceError::InconsistentState(
                "submitted entry missing on read-back",
            ))
    }

    /// Gets one journaled entry by stable ID.
    pub fn entry(&self, id: EntryId) -> Result<Option<EntryRecord>, EntryServiceError> {
        Ok(self.repo.get_entry(id)?)
    }

    /// Lists journaled entries, newest first.
    pub fn list_entries(
        &self,
        query: &EntryListQuery,
    ) -> Result<Vec<EntryRecord>, EntryServiceError> {
        Ok(self.repo.list_entries(query)?)
    }

    /// Deletes one journaled entry by stable ID.
    pub fn delete_entry(&self, id: EntryId) -> Result<(), EntryServiceError> {
        Ok(self.repo.delete_entry(id)?)
    }
}

fn record_from_draft(draft: &EntryDraft) -> EntryRecord {
    EntryRecord {
        uuid: Uuid::new_v4(),
        team_member: draft.team_member.trim().to_string(),
        entry_date: draft.entry_date.trim().to_string(),
        total_hours: draft.total_hours,
        created_at_ms: now_epoch_ms(),
        tasks: draft
            .tasks
            .iter()
            .map(|task| TaskRecord {
                category: task.category.trim().to_string(),
                product_family: task.product_family.trim().to_string(),
                project: optional_field(&task.project),
                comment: optional_field(&task.comment),
                hours: task.hours,
            })
            .collect(),
    }
}

fn optional_field(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
