//! Entry journal contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/get/list/delete over submitted entries.
//! - Map journal rows back into typed records, rejecting corrupt state.
//!
//! # Invariants
//! - Task rows are ordered by their stored `position`.
//! - Listing is newest-first with `uuid` as a stable tiebreaker.

use crate::db::DbError;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one journaled entry.
pub type EntryId = Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Journal persistence and query error.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(EntryId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "entry not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted entry data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One persisted task row of an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub category: String,
    pub product_family: String,
    pub project: Option<String>,
    pub comment: Option<String>,
    pub hours: f64,
}

/// One journaled submission.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryRecord {
    pub uuid: EntryId,
    pub team_member: String,
    pub entry_date: String,
    pub total_hours: f64,
    /// Unix epoch milliseconds of the submission.
    pub created_at_ms: i64,
    pub tasks: Vec<TaskRecord>,
}

/// Query options for listing journaled entries.
#[derive(Debug, Clone, Default)]
pub struct EntryListQuery {
    pub team_member: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository contract for the entry journal.
pub trait EntryRepository {
    fn insert_entry(&self, entry: &EntryRecord) -> RepoResult<EntryId>;
    fn get_entry(&self, id: EntryId) -> RepoResult<Option<EntryRecord>>;
    fn list_entries(&self, query: &EntryListQuery) -> RepoResult<Vec<EntryRecord>>;
    fn delete_entry(&self, id: EntryId) -> RepoResult<()>;
}

/// SQLite-backed entry journal.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load_tasks(&self, entry: EntryId) -> RepoResult<Vec<TaskRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, product_family, project, comment, hours
             FROM entry_tasks
             WHERE entry_uuid = ?1
             ORDER BY position ASC;",
        )?;

        let mut rows = stmt.query([entry.to_string()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(TaskRecord {
                category: row.get("category")?,
                product_family: row.get("product_family")?,
                project: row.get("project")?,
                comment: row.get("comment")?,
                hours: row.get("hours")?,
            });
        }
        Ok(tasks)
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn insert_entry(&self, entry: &EntryRecord) -> RepoResult<EntryId> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO entries (uuid, team_member, entry_date, total_hours, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                entry.uuid.to_string(),
                entry.team_member.as_str(),
                entry.entry_date.as_str(),
                entry.total_hours,
                entry.created_at_ms,
            ],
        )?;

        for (position, task) in entry.tasks.iter().enumerate() {
            tx.execute(
                "INSERT INTO entry_tasks (
                    entry_uuid,
                    position,
                    category,
                    product_family,
                    project,
                    comment,
                    hours
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    entry.uuid.to_string(),
                    position as i64,
                    task.category.as_str(),
                    task.product_family.as_str(),
                    task.project.as_deref(),
                    task.comment.as_deref(),
                    task.hours,
                ],
            )?;
        }

        tx.commit()?;
        Ok(entry.uuid)
    }

    fn get_entry(&self, id: EntryId) -> RepoResult<Option<EntryRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, team_member, entry_date, total_hours, created_at
             FROM entries
             WHERE uuid = ?1;",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let mut entry = parse_entry_row(row)?;
            entry.tasks = self.load_tasks(entry.uuid)?;
            return Ok(Some(entry));
        }

        Ok(None)
    }

    fn list_entries(&self, query: &EntryListQuery) -> RepoResult<Vec<EntryRecord>> {
        let mut sql = String::from(
            "SELECT uuid, team_member, entry_date, total_hours, created_at
             FROM entries
             WHERE 1 = 1",
        );
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(member) = query.team_member.as_deref() {
            sql.push_str(" AND team_member = ?");
            bind_values.push(Value::Text(member.to_string()));
        }

        sql.push_str(" ORDER BY created_at DESC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }

        for entry in &mut entries {
            entry.tasks = self.load_tasks(entry.uuid)?;
        }

        Ok(entries)
    }

    fn delete_entry(&self, id: EntryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM entries WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<EntryRecord> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in entries.uuid"))
    })?;

    Ok(EntryRecord {
        uuid,
        team_member: row.get("team_member")?,
        entry_date: row.get("entry_date")?,
        total_hours: row.get("total_hours")?,
        created_at_ms: row.get("created_at")?,
        tasks: Vec::new(),
    })
}
