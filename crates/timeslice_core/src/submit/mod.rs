//! Entry submission shapes and required-field validation.
//!
//! # Responsibility
//! - Define the submit-time form shape (`EntryDraft`, `TaskDraft`).
//! - Run every required-field check and aggregate the failures into one
//!   report; submission is blocked on any issue.
//!
//! # Invariants
//! - Validation never short-circuits: the report lists all issues in form
//!   order, task rows numbered from 1.
//! - Membership checks are skipped for catalog lists the backend left
//!   empty.

use crate::catalog::OptionCatalog;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static ENTRY_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid entry date regex"));

/// One task row as submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub category: String,
    pub product_family: String,
    pub project: String,
    pub comment: String,
    pub hours: f64,
}

/// The whole form as submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub team_member: String,
    /// Calendar day of the entry, shaped `YYYY-MM-DD`.
    pub entry_date: String,
    pub total_hours: f64,
    pub tasks: Vec<TaskDraft>,
}

/// One failed submit check.
///
/// `task` values are 1-based row numbers, matching what the form displays.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    MissingTeamMember,
    UnknownTeamMember(String),
    MissingEntryDate,
    MalformedEntryDate(String),
    InvalidTotalHours,
    NoTasks,
    MissingCategory { task: usize },
    UnknownCategory { task: usize, value: String },
    MissingProductFamily { task: usize },
    InvalidTaskHours { task: usize },
    NoCategorizedTasks,
}

impl Display for ValidationIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTeamMember => write!(f, "Please select a team member."),
            Self::UnknownTeamMember(value) => {
                write!(f, "Team member `{value}` is not in the team list.")
            }
            Self::MissingEntryDate => write!(f, "Please select a date."),
            Self::MalformedEntryDate(value) => {
                write!(f, "Date `{value}` must be shaped YYYY-MM-DD.")
            }
            Self::InvalidTotalHours => write!(f, "Please enter a valid number of hours."),
            Self::NoTasks => write!(f, "Please add at least one task."),
            Self::MissingCategory { task } => {
                write!(f, "Task {task}: please select a category.")
            }
            Self::UnknownCategory { task, value } => {
                write!(f, "Task {task}: category `{value}` is not in the category list.")
            }
            Self::MissingProductFamily { task } => {
                write!(f, "Task {task}: please select a product family.")
            }
            Self::InvalidTaskHours { task } => {
                write!(f, "Task {task}: please enter valid hours (must be greater than 0).")
            }
            Self::NoCategorizedTasks => {
                write!(f, "At least one task must have a category selected.")
            }
        }
    }
}

/// Aggregated submit failures, rendered one issue per line.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for issue in &self.issues {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
            first = false;
        }
        Ok(())
    }
}

impl Error for ValidationReport {}

/// Runs every submit check against the draft.
///
/// Returns `Ok(())` when the entry may be submitted, or the full aggregated
/// report otherwise.
pub fn validate_entry(
    draft: &EntryDraft,
    catalog: &OptionCatalog,
) -> Result<(), ValidationReport> {
    let mut issues = Vec::new();

    let member = draft.team_member.trim();
    if member.is_empty() {
        issues.push(ValidationIssue::MissingTeamMember);
    } else if !catalog.team_members.is_empty() && !catalog.has_team_member(member) {
        issues.push(ValidationIssue::UnknownTeamMember(member.to_string()));
    }

    let date = draft.entry_date.trim();
    if date.is_empty() {
        issues.push(ValidationIssue::MissingEntryDate);
    } else if !ENTRY_DATE_RE.is_match(date) {
        issues.push(ValidationIssue::MalformedEntryDate(date.to_string()));
    }

    if !(draft.total_hours.is_finite() && draft.total_hours > 0.0) {
        issues.push(ValidationIssue::InvalidTotalHours);
    }

    if draft.tasks.is_empty() {
        issues.push(ValidationIssue::NoTasks);
    } else {
        let mut categorized = 0usize;
        for (index, task) in draft.tasks.iter().enumerate() {
            let row = index + 1;

            let category = task.category.trim();
            if category.is_empty() {
                issues.push(ValidationIssue::MissingCategory { task: row });
            } else {
                categorized += 1;
                if !catalog.categories.is_empty() && !catalog.has_category(category) {
                    issues.push(ValidationIssue::UnknownCategory {
                        task: row,
                        value: category.to_string(),
                    });
                }
            }

            if task.product_family.trim().is_empty() {
                issues.push(ValidationIssue::MissingProductFamily { task: row });
            }

            if !(task.hours.is_finite() && task.hours > 0.0) {
                issues.push(ValidationIssue::InvalidTaskHours { task: row });
            }
        }

        if categorized == 0 {
            issues.push(ValidationIssue::NoCategorizedTasks);
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationReport { issues })
    }
}
