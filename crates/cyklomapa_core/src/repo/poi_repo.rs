//! Point of interest persistence and the visible-point query.
//!
//! # Responsibility
//! - CRUD over `pois`.
//! - Serve audience-filtered listings; the status filter comes only from
//!   `PoiVisibility::sql_predicate`.
//!
//! # Invariants
//! - Listings are deterministic: `uuid ASC`.
//! - Positions are stored as `lon`/`lat` with `srid = 4326`.

use crate::model::geometry::{GeoPoint, WGS84_SRID};
use crate::model::layer::LayerId;
use crate::model::marker::MarkerId;
use crate::model::poi::{Poi, PoiId, PoiVisibility};
use crate::repo::{
    classify_write_error, parse_uuid, push_pagination, RepoError, RepoResult,
    SqliteMapRepository, WriteKind,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

const POI_COLUMNS_SQL: &str = "p.uuid AS uuid,
    p.name AS name,
    p.marker_uuid AS marker_uuid,
    p.status_uuid AS status_uuid,
    p.importance AS importance,
    p.lon AS lon,
    p.lat AS lat,
    p.srid AS srid,
    p.description AS description,
    p.description_extra AS description_extra,
    p.url AS url,
    p.remark AS remark,
    p.photo AS photo";

const POI_JOIN_SQL: &str = "FROM pois p
    INNER JOIN statuses ps ON ps.uuid = p.status_uuid
    INNER JOIN markers m ON m.uuid = p.marker_uuid
    INNER JOIN statuses ms ON ms.uuid = m.status_uuid";

/// Query options for listing points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoiListQuery {
    pub visibility: PoiVisibility,
    pub marker_id: Option<MarkerId>,
    /// Restricts to points whose marker type lies in this layer.
    pub layer_id: Option<LayerId>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl PoiListQuery {
    /// Every point the public map shows.
    pub fn visible() -> Self {
        Self {
            visibility: PoiVisibility::Public,
            ..Self::default()
        }
    }
}

pub trait PoiRepository {
    fn create_poi(&self, poi: &Poi) -> RepoResult<PoiId>;
    fn update_poi(&self, poi: &Poi) -> RepoResult<()>;
    fn get_poi(&self, id: PoiId) -> RepoResult<Option<Poi>>;
    fn list_pois(&self, query: &PoiListQuery) -> RepoResult<Vec<Poi>>;
    fn delete_poi(&self, id: PoiId) -> RepoResult<()>;

    /// Points whose own status and marker status are both publicly shown.
    fn list_visible_pois(&self) -> RepoResult<Vec<Poi>> {
        self.list_pois(&PoiListQuery::visible())
    }
}

impl PoiRepository for SqliteMapRepository<'_> {
    fn create_poi(&self, poi: &Poi) -> RepoResult<PoiId> {
        poi.validate()?;

        self.conn
            .execute(
                "INSERT INTO pois (
                    uuid,
                    name,
                    marker_uuid,
                    status_uuid,
                    importance,
                    lon,
                    lat,
                    srid,
                    description,
                    description_extra,
                    url,
                    remark,
                    photo
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
                params![
                    poi.id.to_string(),
                    poi.name.as_deref(),
                    poi.marker_id.to_string(),
                    poi.status_id.to_string(),
                    poi.importance,
                    poi.position.lon,
                    poi.position.lat,
                    poi.position.srid(),
                    poi.description.as_deref(),
                    poi.description_extra.as_deref(),
                    poi.url.as_deref(),
                    poi.remark.as_deref(),
                    poi.photo.as_deref(),
                ],
            )
            .map_err(|err| classify_write_error(err, "pois", WriteKind::Insert))?;

        Ok(poi.id)
    }

    fn update_poi(&self, poi: &Poi) -> RepoResult<()> {
        poi.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE pois
                 SET
                    name = ?1,
                    marker_uuid = ?2,
                    status_uuid = ?3,
                    importance = ?4,
                    lon = ?5,
                    lat = ?6,
                    srid = ?7,
                    description = ?8,
                    description_extra = ?9,
                    url = ?10,
                    remark = ?11,
                    photo = ?12
                 WHERE uuid = ?13;",
                params![
                    poi.name.as_deref(),
                    poi.marker_id.to_string(),
                    poi.status_id.to_string(),
                    poi.importance,
                    poi.position.lon,
                    poi.position.lat,
                    poi.position.srid(),
                    poi.description.as_deref(),
                    poi.description_extra.as_deref(),
                    poi.url.as_deref(),
                    poi.remark.as_deref(),
                    poi.photo.as_deref(),
                    poi.id.to_string(),
                ],
            )
            .map_err(|err| classify_write_error(err, "pois", WriteKind::Update))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: "poi",
                id: poi.id,
            });
        }
        Ok(())
    }

    fn get_poi(&self, id: PoiId) -> RepoResult<Option<Poi>> {
        self.conn
            .query_row(
                &format!("SELECT {POI_COLUMNS_SQL} {POI_JOIN_SQL} WHERE p.uuid = ?1;"),
                [id.to_string()],
                |row| Ok(parse_poi_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_pois(&self, query: &PoiListQuery) -> RepoResult<Vec<Poi>> {
        let mut sql = format!(
            "SELECT {POI_COLUMNS_SQL} {POI_JOIN_SQL} WHERE {}",
            query.visibility.sql_predicate()
        );
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(marker_id) = query.marker_id {
            sql.push_str(" AND p.marker_uuid = ?");
            bind_values.push(Value::Text(marker_id.to_string()));
        }
        if let Some(layer_id) = query.layer_id {
            sql.push_str(" AND m.layer_uuid = ?");
            bind_values.push(Value::Text(layer_id.to_string()));
        }

        sql.push_str(" ORDER BY p.uuid ASC");
        push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut pois = Vec::new();
        while let Some(row) = rows.next()? {
            pois.push(parse_poi_row(row)?);
        }
        Ok(pois)
    }

    fn delete_poi(&self, id: PoiId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM pois WHERE uuid = ?1;", [id.to_string()])
            .map_err(|err| classify_write_error(err, "pois", WriteKind::Delete(id)))?;

        if changed == 0 {
            return Err(RepoError::NotFound { kind: "poi", id });
        }
        Ok(())
    }
}

fn parse_poi_row(row: &Row<'_>) -> RepoResult<Poi> {
    let uuid_text: String = row.get("uuid")?;
    let marker_text: String = row.get("marker_uuid")?;
    let status_text: String = row.get("status_uuid")?;

    let srid: i64 = row.get("srid")?;
    if srid != WGS84_SRID {
        return Err(RepoError::InvalidData(format!(
            "invalid srid `{srid}` in pois.srid"
        )));
    }
    let importance: i64 = row.get("importance")?;
    let importance = i16::try_from(importance).map_err(|_| {
        RepoError::InvalidData(format!("invalid importance `{importance}` in pois.importance"))
    })?;

    let poi = Poi {
        id: parse_uuid(&uuid_text, "pois.uuid")?,
        name: row.get("name")?,
        marker_id: parse_uuid(&marker_text, "pois.marker_uuid")?,
        status_id: parse_uuid(&status_text, "pois.status_uuid")?,
        importance,
        position: GeoPoint {
            lon: row.get("lon")?,
            lat: row.get("lat")?,
        },
        description: row.get("description")?,
        description_extra: row.get("description_extra")?,
        url: row.get("url")?,
        remark: row.get("remark")?,
        photo: row.get("photo")?,
    };
    poi.validate()?;
    Ok(poi)
}
