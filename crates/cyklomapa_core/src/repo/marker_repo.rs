//! Marker type (`znacka`) persistence.

use crate::model::layer::LayerId;
use crate::model::marker::{Marker, MarkerId};
use crate::repo::{
    classify_write_error, parse_uuid, RepoError, RepoResult, SqliteMapRepository, WriteKind,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

const MARKER_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    slug,
    layer_uuid,
    status_uuid,
    description,
    remark,
    default_icon,
    min_zoom,
    max_zoom,
    url
FROM markers";

/// Query options for listing marker types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerListQuery {
    /// Restricts the listing to one layer.
    pub layer_id: Option<LayerId>,
}

pub trait MarkerRepository {
    fn create_marker(&self, marker: &Marker) -> RepoResult<MarkerId>;
    fn update_marker(&self, marker: &Marker) -> RepoResult<()>;
    fn get_marker(&self, id: MarkerId) -> RepoResult<Option<Marker>>;
    fn get_marker_by_slug(&self, slug: &str) -> RepoResult<Option<Marker>>;
    /// Lists marker types ordered by name.
    fn list_markers(&self, query: &MarkerListQuery) -> RepoResult<Vec<Marker>>;
    fn delete_marker(&self, id: MarkerId) -> RepoResult<()>;
}

impl MarkerRepository for SqliteMapRepository<'_> {
    fn create_marker(&self, marker: &Marker) -> RepoResult<MarkerId> {
        marker.validate()?;

        self.conn
            .execute(
                "INSERT INTO markers (
                    uuid,
                    name,
                    slug,
                    layer_uuid,
                    status_uuid,
                    description,
                    remark,
                    default_icon,
                    min_zoom,
                    max_zoom,
                    url
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
                params![
                    marker.id.to_string(),
                    marker.name.as_str(),
                    marker.slug.as_str(),
                    marker.layer_id.to_string(),
                    marker.status_id.to_string(),
                    marker.description.as_deref(),
                    marker.remark.as_deref(),
                    marker.default_icon.as_deref(),
                    marker.min_zoom,
                    marker.max_zoom,
                    marker.url.as_deref(),
                ],
            )
            .map_err(|err| classify_write_error(err, "markers", WriteKind::Insert))?;

        Ok(marker.id)
    }

    fn update_marker(&self, marker: &Marker) -> RepoResult<()> {
        marker.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE markers
                 SET
                    name = ?1,
                    slug = ?2,
                    layer_uuid = ?3,
                    status_uuid = ?4,
                    description = ?5,
                    remark = ?6,
                    default_icon = ?7,
                    min_zoom = ?8,
                    max_zoom = ?9,
                    url = ?10
                 WHERE uuid = ?11;",
                params![
                    marker.name.as_str(),
                    marker.slug.as_str(),
                    marker.layer_id.to_string(),
                    marker.status_id.to_string(),
                    marker.description.as_deref(),
                    marker.remark.as_deref(),
                    marker.default_icon.as_deref(),
                    marker.min_zoom,
                    marker.max_zoom,
                    marker.url.as_deref(),
                    marker.id.to_string(),
                ],
            )
            .map_err(|err| classify_write_error(err, "markers", WriteKind::Update))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: "marker",
                id: marker.id,
            });
        }
        Ok(())
    }

    fn get_marker(&self, id: MarkerId) -> RepoResult<Option<Marker>> {
        query_one_marker(self, "uuid = ?1", id.to_string().as_str())
    }

    fn get_marker_by_slug(&self, slug: &str) -> RepoResult<Option<Marker>> {
        query_one_marker(self, "slug = ?1", slug)
    }

    fn list_markers(&self, query: &MarkerListQuery) -> RepoResult<Vec<Marker>> {
        let mut sql = format!("{MARKER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(layer_id) = query.layer_id {
            sql.push_str(" AND layer_uuid = ?");
            bind_values.push(Value::Text(layer_id.to_string()));
        }
        sql.push_str(" ORDER BY name ASC, uuid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut markers = Vec::new();
        while let Some(row) = rows.next()? {
            markers.push(parse_marker_row(row)?);
        }
        Ok(markers)
    }

    fn delete_marker(&self, id: MarkerId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM markers WHERE uuid = ?1;", [id.to_string()])
            .map_err(|err| classify_write_error(err, "markers", WriteKind::Delete(id)))?;

        if changed == 0 {
            return Err(RepoError::NotFound { kind: "marker", id });
        }
        Ok(())
    }
}

fn query_one_marker(
    repo: &SqliteMapRepository<'_>,
    condition: &str,
    value: &str,
) -> RepoResult<Option<Marker>> {
    repo.conn
        .query_row(
            &format!("{MARKER_SELECT_SQL} WHERE {condition};"),
            [value],
            |row| Ok(parse_marker_row(row)),
        )
        .optional()?
        .transpose()
}

fn parse_marker_row(row: &Row<'_>) -> RepoResult<Marker> {
    let uuid_text: String = row.get("uuid")?;
    let layer_text: String = row.get("layer_uuid")?;
    let status_text: String = row.get("status_uuid")?;

    let marker = Marker {
        id: parse_uuid(&uuid_text, "markers.uuid")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
        layer_id: parse_uuid(&layer_text, "markers.layer_uuid")?,
        status_id: parse_uuid(&status_text, "markers.status_uuid")?,
        description: row.get("description")?,
        remark: row.get("remark")?,
        default_icon: row.get("default_icon")?,
        min_zoom: parse_zoom(row.get("min_zoom")?, "markers.min_zoom")?,
        max_zoom: parse_zoom(row.get("max_zoom")?, "markers.max_zoom")?,
        url: row.get("url")?,
    };
    marker.validate()?;
    Ok(marker)
}

fn parse_zoom(value: i64, column: &str) -> RepoResult<u32> {
    u32::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid zoom `{value}` in {column}")))
}
