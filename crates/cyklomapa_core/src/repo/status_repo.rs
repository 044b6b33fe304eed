//! Status persistence.

use crate::model::status::{Status, StatusId};
use crate::repo::{
    classify_write_error, flag_to_int, parse_flag, parse_uuid, RepoError, RepoResult,
    SqliteMapRepository, WriteKind,
};
use rusqlite::{params, OptionalExtension, Row};

const STATUS_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    description,
    show,
    show_internal
FROM statuses";

pub trait StatusRepository {
    fn create_status(&self, status: &Status) -> RepoResult<StatusId>;
    fn update_status(&self, status: &Status) -> RepoResult<()>;
    fn get_status(&self, id: StatusId) -> RepoResult<Option<Status>>;
    /// Lists all statuses ordered by name.
    fn list_statuses(&self) -> RepoResult<Vec<Status>>;
    /// Deletes an unreferenced status.
    fn delete_status(&self, id: StatusId) -> RepoResult<()>;
}

impl StatusRepository for SqliteMapRepository<'_> {
    fn create_status(&self, status: &Status) -> RepoResult<StatusId> {
        status.validate()?;

        self.conn
            .execute(
                "INSERT INTO statuses (uuid, name, description, show, show_internal)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    status.id.to_string(),
                    status.name.as_str(),
                    status.description.as_deref(),
                    flag_to_int(status.show),
                    flag_to_int(status.show_internal),
                ],
            )
            .map_err(|err| classify_write_error(err, "statuses", WriteKind::Insert))?;

        Ok(status.id)
    }

    fn update_status(&self, status: &Status) -> RepoResult<()> {
        status.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE statuses
                 SET
                    name = ?1,
                    description = ?2,
                    show = ?3,
                    show_internal = ?4
                 WHERE uuid = ?5;",
                params![
                    status.name.as_str(),
                    status.description.as_deref(),
                    flag_to_int(status.show),
                    flag_to_int(status.show_internal),
                    status.id.to_string(),
                ],
            )
            .map_err(|err| classify_write_error(err, "statuses", WriteKind::Update))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: "status",
                id: status.id,
            });
        }
        Ok(())
    }

    fn get_status(&self, id: StatusId) -> RepoResult<Option<Status>> {
        let row = self
            .conn
            .query_row(
                &format!("{STATUS_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                |row| Ok(parse_status_row(row)),
            )
            .optional()?;
        row.transpose()
    }

    fn list_statuses(&self) -> RepoResult<Vec<Status>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STATUS_SELECT_SQL} ORDER BY name ASC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut statuses = Vec::new();
        while let Some(row) = rows.next()? {
            statuses.push(parse_status_row(row)?);
        }
        Ok(statuses)
    }

    fn delete_status(&self, id: StatusId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM statuses WHERE uuid = ?1;", [id.to_string()])
            .map_err(|err| classify_write_error(err, "statuses", WriteKind::Delete(id)))?;

        if changed == 0 {
            return Err(RepoError::NotFound { kind: "status", id });
        }
        Ok(())
    }
}

pub(crate) fn parse_status_row(row: &Row<'_>) -> RepoResult<Status> {
    let uuid_text: String = row.get("uuid")?;
    let status = Status {
        id: parse_uuid(&uuid_text, "statuses.uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        show: parse_flag(row.get("show")?, "statuses.show")?,
        show_internal: parse_flag(row.get("show_internal")?, "statuses.show_internal")?,
    };
    status.validate()?;
    Ok(status)
}
