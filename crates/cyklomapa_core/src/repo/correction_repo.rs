//! Correction (`upresneni`) persistence for the moderation inbox.
//!
//! # Invariants
//! - Stored status codes are limited to the closed workflow set; the table
//!   enforces it with a CHECK constraint as well.
//! - A correction keeps existing when its point is deleted (`poi_uuid` is
//!   set to NULL by the schema).

use crate::model::correction::{Correction, CorrectionId, CorrectionStatus};
use crate::model::poi::PoiId;
use crate::repo::{
    classify_write_error, ensure_connection_ready, parse_uuid, push_pagination, RepoError,
    RepoResult, WriteKind,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const CORRECTION_TABLES: &[(&str, &[&str])] = &[(
    "corrections",
    &[
        "uuid",
        "poi_uuid",
        "email",
        "status",
        "description",
        "url",
        "address",
    ],
)];

const CORRECTION_SELECT_SQL: &str = "SELECT
    uuid,
    poi_uuid,
    email,
    status,
    description,
    url,
    address
FROM corrections";

/// Query options for the moderation inbox.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectionListQuery {
    pub status: Option<CorrectionStatus>,
    pub poi_id: Option<PoiId>,
    pub limit: Option<u32>,
    pub offset: u32,
}

pub trait CorrectionRepository {
    fn create_correction(&self, correction: &Correction) -> RepoResult<CorrectionId>;
    fn update_correction(&self, correction: &Correction) -> RepoResult<()>;
    /// Moves one correction to another workflow state.
    fn set_correction_status(&self, id: CorrectionId, status: CorrectionStatus) -> RepoResult<()>;
    fn get_correction(&self, id: CorrectionId) -> RepoResult<Option<Correction>>;
    /// Lists corrections in submission order.
    fn list_corrections(&self, query: &CorrectionListQuery) -> RepoResult<Vec<Correction>>;
    fn delete_correction(&self, id: CorrectionId) -> RepoResult<()>;
}

pub struct SqliteCorrectionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCorrectionRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, CORRECTION_TABLES)?;
        Ok(Self { conn })
    }
}

impl CorrectionRepository for SqliteCorrectionRepository<'_> {
    fn create_correction(&self, correction: &Correction) -> RepoResult<CorrectionId> {
        correction.validate()?;

        self.conn
            .execute(
                "INSERT INTO corrections (
                    uuid,
                    poi_uuid,
                    email,
                    status,
                    description,
                    url,
                    address
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    correction.id.to_string(),
                    correction.poi_id.map(|id| id.to_string()),
                    correction.email.as_str(),
                    correction.status.code(),
                    correction.description.as_str(),
                    correction.url.as_deref(),
                    correction.address.as_deref(),
                ],
            )
            .map_err(|err| classify_write_error(err, "corrections", WriteKind::Insert))?;

        Ok(correction.id)
    }

    fn update_correction(&self, correction: &Correction) -> RepoResult<()> {
        correction.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE corrections
                 SET
                    poi_uuid = ?1,
                    email = ?2,
                    status = ?3,
                    description = ?4,
                    url = ?5,
                    address = ?6
                 WHERE uuid = ?7;",
                params![
                    correction.poi_id.map(|id| id.to_string()),
                    correction.email.as_str(),
                    correction.status.code(),
                    correction.description.as_str(),
                    correction.url.as_deref(),
                    correction.address.as_deref(),
                    correction.id.to_string(),
                ],
            )
            .map_err(|err| classify_write_error(err, "corrections", WriteKind::Update))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: "correction",
                id: correction.id,
            });
        }
        Ok(())
    }

    fn set_correction_status(&self, id: CorrectionId, status: CorrectionStatus) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE corrections SET status = ?1 WHERE uuid = ?2;",
                params![status.code(), id.to_string()],
            )
            .map_err(|err| classify_write_error(err, "corrections", WriteKind::Update))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: "correction",
                id,
            });
        }
        Ok(())
    }

    fn get_correction(&self, id: CorrectionId) -> RepoResult<Option<Correction>> {
        self.conn
            .query_row(
                &format!("{CORRECTION_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                |row| Ok(parse_correction_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_corrections(&self, query: &CorrectionListQuery) -> RepoResult<Vec<Correction>> {
        let mut sql = format!("{CORRECTION_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.code().to_string()));
        }
        if let Some(poi_id) = query.poi_id {
            sql.push_str(" AND poi_uuid = ?");
            bind_values.push(Value::Text(poi_id.to_string()));
        }

        sql.push_str(" ORDER BY rowid ASC");
        push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut corrections = Vec::new();
        while let Some(row) = rows.next()? {
            corrections.push(parse_correction_row(row)?);
        }
        Ok(corrections)
    }

    fn delete_correction(&self, id: CorrectionId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM corrections WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: "correction",
                id,
            });
        }
        Ok(())
    }
}

fn parse_correction_row(row: &Row<'_>) -> RepoResult<Correction> {
    let uuid_text: String = row.get("uuid")?;
    let poi_id = match row.get::<_, Option<String>>("poi_uuid")? {
        Some(value) => Some(parse_uuid(&value, "corrections.poi_uuid")?),
        None => None,
    };
    let status_text: String = row.get("status")?;
    let status = status_text.parse::<CorrectionStatus>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid correction status `{status_text}` in corrections.status"
        ))
    })?;

    let correction = Correction {
        id: parse_uuid(&uuid_text, "corrections.uuid")?,
        poi_id,
        email: row.get("email")?,
        status,
        description: row.get("description")?,
        url: row.get("url")?,
        address: row.get("address")?,
    };
    correction.validate()?;
    Ok(correction)
}
