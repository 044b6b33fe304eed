//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access for every record kind.
//! - Keep SQL inside the persistence boundary and translate SQLite constraint
//!   failures into typed integrity errors.
//!
//! # Invariants
//! - Write paths call the record's `validate()` before any SQL mutation.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Repositories only accept connections migrated to the latest schema.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::validation::ValidationError;
use rusqlite::{ffi, Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod correction_repo;
pub mod layer_repo;
pub mod marker_repo;
pub mod page_repo;
pub mod poi_repo;
pub mod status_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Data-integrity failure reported by the storage engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    /// A unique column already holds the value.
    Duplicate { table: &'static str, column: String },
    /// A written foreign key points to a record that does not exist.
    MissingReference { table: &'static str },
    /// Delete refused because other records still reference the row.
    StillReferenced { table: &'static str, id: Uuid },
    /// Any other declared constraint (NOT NULL, CHECK).
    Constraint(String),
}

impl Display for IntegrityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate { table, column } => {
                write!(f, "duplicate value for unique column `{table}.{column}`")
            }
            Self::MissingReference { table } => {
                write!(f, "`{table}` row references a record that does not exist")
            }
            Self::StillReferenced { table, id } => {
                write!(f, "`{table}` row {id} is still referenced and cannot be deleted")
            }
            Self::Constraint(message) => write!(f, "constraint violation: {message}"),
        }
    }
}

impl Error for IntegrityError {}

/// Repository error for map persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Integrity(IntegrityError),
    Db(DbError),
    NotFound {
        kind: &'static str,
        id: Uuid,
    },
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Whether the write was refused for validation or data-integrity reasons.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Integrity(_))
    }

    /// Stable, content-free code used in log events.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::Integrity(IntegrityError::Duplicate { .. }) => "duplicate",
            Self::Integrity(IntegrityError::MissingReference { .. }) => "missing_reference",
            Self::Integrity(IntegrityError::StillReferenced { .. }) => "still_referenced",
            Self::Integrity(IntegrityError::Constraint(_)) => "constraint_violation",
            Self::Db(_) => "db_error",
            Self::NotFound { .. } => "not_found",
            Self::InvalidData(_) => "invalid_data",
            Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => "uninitialized_connection",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Integrity(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted map data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "map repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "map repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "map repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Integrity(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<IntegrityError> for RepoError {
    fn from(value: IntegrityError) -> Self {
        Self::Integrity(value)
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

/// Every map repository trait in one bound, used by the write service.
pub trait MapRepository:
    status_repo::StatusRepository
    + layer_repo::LayerRepository
    + marker_repo::MarkerRepository
    + poi_repo::PoiRepository
{
}

impl<T> MapRepository for T where
    T: status_repo::StatusRepository
        + layer_repo::LayerRepository
        + marker_repo::MarkerRepository
        + poi_repo::PoiRepository
{
}

const MAP_TABLES: &[(&str, &[&str])] = &[
    (
        "statuses",
        &["uuid", "name", "description", "show", "show_internal"],
    ),
    (
        "layers",
        &["uuid", "name", "slug", "status_uuid", "sort_order", "remark"],
    ),
    (
        "markers",
        &[
            "uuid",
            "name",
            "slug",
            "layer_uuid",
            "status_uuid",
            "default_icon",
            "min_zoom",
            "max_zoom",
            "url",
        ],
    ),
    (
        "pois",
        &[
            "uuid",
            "name",
            "marker_uuid",
            "status_uuid",
            "importance",
            "lon",
            "lat",
            "srid",
            "photo",
        ],
    ),
];

/// SQLite-backed repository for statuses, layers, marker types and points.
pub struct SqliteMapRepository<'conn> {
    pub(crate) conn: &'conn Connection,
}

impl<'conn> SqliteMapRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, MAP_TABLES)?;
        Ok(Self { conn })
    }
}

/// Kind of statement whose constraint failure is being classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteKind {
    Insert,
    Update,
    Delete(Uuid),
}

/// Maps SQLite constraint failures to `RepoError::Integrity`.
///
/// Foreign-key failures mean a dangling reference on insert/update and a
/// restricted delete on delete.
pub(crate) fn classify_write_error(
    err: rusqlite::Error,
    table: &'static str,
    kind: WriteKind,
) -> RepoError {
    let constraint = match &err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            Some((failure.extended_code, message.clone().unwrap_or_default()))
        }
        _ => None,
    };
    let Some((extended_code, message)) = constraint else {
        return err.into();
    };

    let integrity = match extended_code {
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
            IntegrityError::Duplicate {
                table,
                column: unique_column(&message),
            }
        }
        code if is_foreign_key_failure(code, &message) => match kind {
            WriteKind::Delete(id) => IntegrityError::StillReferenced { table, id },
            WriteKind::Insert | WriteKind::Update => IntegrityError::MissingReference { table },
        },
        _ => IntegrityError::Constraint(message),
    };
    RepoError::Integrity(integrity)
}

// `ON DELETE RESTRICT` fires through an internal trigger, so it surfaces as
// SQLITE_CONSTRAINT_TRIGGER rather than SQLITE_CONSTRAINT_FOREIGNKEY.
fn is_foreign_key_failure(extended_code: i32, message: &str) -> bool {
    match extended_code {
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => true,
        ffi::SQLITE_CONSTRAINT_TRIGGER => message.starts_with("FOREIGN KEY"),
        _ => message.starts_with("FOREIGN KEY constraint failed"),
    }
}

// SQLite reports `UNIQUE constraint failed: statuses.name`.
fn unique_column(message: &str) -> String {
    message
        .rsplit_once(": ")
        .map(|(_, columns)| columns)
        .unwrap_or(message)
        .split(", ")
        .map(|qualified| {
            qualified
                .rsplit_once('.')
                .map_or(qualified, |(_, column)| column)
        })
        .collect::<Vec<_>>()
        .join(",")
}

pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[(&'static str, &[&'static str])],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_flag(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn flag_to_int(value: bool) -> i64 {
    i64::from(value)
}

/// Appends `LIMIT`/`OFFSET` clauses the way SQLite expects them.
pub(crate) fn push_pagination(
    sql: &mut String,
    bind_values: &mut Vec<rusqlite::types::Value>,
    limit: Option<u32>,
    offset: u32,
) {
    use rusqlite::types::Value;

    if let Some(limit) = limit {
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));
        if offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(offset)));
        }
    } else if offset > 0 {
        sql.push_str(" LIMIT -1 OFFSET ?");
        bind_values.push(Value::Integer(i64::from(offset)));
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_write_error, unique_column, IntegrityError, RepoError, WriteKind};
    use rusqlite::ffi;
    use uuid::Uuid;

    fn constraint_failure(extended_code: i32, message: &str) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(extended_code), Some(message.to_string()))
    }

    #[test]
    fn unique_column_strips_table_prefix() {
        assert_eq!(unique_column("UNIQUE constraint failed: statuses.name"), "name");
        assert_eq!(
            unique_column("UNIQUE constraint failed: markers.slug, markers.name"),
            "slug,name"
        );
    }

    #[test]
    fn restrict_trigger_failure_on_delete_is_still_referenced() {
        let id = Uuid::new_v4();
        let err = classify_write_error(
            constraint_failure(ffi::SQLITE_CONSTRAINT_TRIGGER, "FOREIGN KEY constraint failed"),
            "statuses",
            WriteKind::Delete(id),
        );
        assert!(matches!(
            err,
            RepoError::Integrity(IntegrityError::StillReferenced { table: "statuses", id: got })
                if got == id
        ));
    }

    #[test]
    fn foreign_key_failure_on_insert_is_missing_reference() {
        let err = classify_write_error(
            constraint_failure(ffi::SQLITE_CONSTRAINT_FOREIGNKEY, "FOREIGN KEY constraint failed"),
            "pois",
            WriteKind::Insert,
        );
        assert!(matches!(
            err,
            RepoError::Integrity(IntegrityError::MissingReference { table: "pois" })
        ));
    }

    #[test]
    fn other_trigger_failures_stay_generic() {
        let err = classify_write_error(
            constraint_failure(ffi::SQLITE_CONSTRAINT_TRIGGER, "custom abort"),
            "layers",
            WriteKind::Delete(Uuid::new_v4()),
        );
        assert!(matches!(
            err,
            RepoError::Integrity(IntegrityError::Constraint(message)) if message == "custom abort"
        ));
    }
}
