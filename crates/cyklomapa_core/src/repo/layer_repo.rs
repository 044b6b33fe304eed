//! Layer (`vrstva`) persistence.
//!
//! # Invariants
//! - Listing is deterministic: `sort_order ASC, uuid ASC`.

use crate::model::layer::{Layer, LayerId};
use crate::repo::{
    classify_write_error, parse_uuid, RepoError, RepoResult, SqliteMapRepository, WriteKind,
};
use rusqlite::{params, OptionalExtension, Row};

const LAYER_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    slug,
    description,
    status_uuid,
    sort_order,
    remark
FROM layers";

pub trait LayerRepository {
    fn create_layer(&self, layer: &Layer) -> RepoResult<LayerId>;
    fn update_layer(&self, layer: &Layer) -> RepoResult<()>;
    fn get_layer(&self, id: LayerId) -> RepoResult<Option<Layer>>;
    fn get_layer_by_slug(&self, slug: &str) -> RepoResult<Option<Layer>>;
    /// Lists layers in rendering order.
    fn list_layers(&self) -> RepoResult<Vec<Layer>>;
    fn delete_layer(&self, id: LayerId) -> RepoResult<()>;
}

impl LayerRepository for SqliteMapRepository<'_> {
    fn create_layer(&self, layer: &Layer) -> RepoResult<LayerId> {
        layer.validate()?;

        self.conn
            .execute(
                "INSERT INTO layers (
                    uuid,
                    name,
                    slug,
                    description,
                    status_uuid,
                    sort_order,
                    remark
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    layer.id.to_string(),
                    layer.name.as_str(),
                    layer.slug.as_str(),
                    layer.description.as_deref(),
                    layer.status_id.to_string(),
                    layer.order,
                    layer.remark.as_deref(),
                ],
            )
            .map_err(|err| classify_write_error(err, "layers", WriteKind::Insert))?;

        Ok(layer.id)
    }

    fn update_layer(&self, layer: &Layer) -> RepoResult<()> {
        layer.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE layers
                 SET
                    name = ?1,
                    slug = ?2,
                    description = ?3,
                    status_uuid = ?4,
                    sort_order = ?5,
                    remark = ?6
                 WHERE uuid = ?7;",
                params![
                    layer.name.as_str(),
                    layer.slug.as_str(),
                    layer.description.as_deref(),
                    layer.status_id.to_string(),
                    layer.order,
                    layer.remark.as_deref(),
                    layer.id.to_string(),
                ],
            )
            .map_err(|err| classify_write_error(err, "layers", WriteKind::Update))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: "layer",
                id: layer.id,
            });
        }
        Ok(())
    }

    fn get_layer(&self, id: LayerId) -> RepoResult<Option<Layer>> {
        query_one_layer(self, "uuid = ?1", id.to_string().as_str())
    }

    fn get_layer_by_slug(&self, slug: &str) -> RepoResult<Option<Layer>> {
        query_one_layer(self, "slug = ?1", slug)
    }

    fn list_layers(&self) -> RepoResult<Vec<Layer>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LAYER_SELECT_SQL} ORDER BY sort_order ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut layers = Vec::new();
        while let Some(row) = rows.next()? {
            layers.push(parse_layer_row(row)?);
        }
        Ok(layers)
    }

    fn delete_layer(&self, id: LayerId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM layers WHERE uuid = ?1;", [id.to_string()])
            .map_err(|err| classify_write_error(err, "layers", WriteKind::Delete(id)))?;

        if changed == 0 {
            return Err(RepoError::NotFound { kind: "layer", id });
        }
        Ok(())
    }
}

fn query_one_layer(
    repo: &SqliteMapRepository<'_>,
    condition: &str,
    value: &str,
) -> RepoResult<Option<Layer>> {
    repo.conn
        .query_row(
            &format!("{LAYER_SELECT_SQL} WHERE {condition};"),
            [value],
            |row| Ok(parse_layer_row(row)),
        )
        .optional()?
        .transpose()
}

fn parse_layer_row(row: &Row<'_>) -> RepoResult<Layer> {
    let uuid_text: String = row.get("uuid")?;
    let status_text: String = row.get("status_uuid")?;
    let sort_order: i64 = row.get("sort_order")?;
    let order = u32::try_from(sort_order).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid sort_order `{sort_order}` in layers.sort_order"
        ))
    })?;

    let layer = Layer {
        id: parse_uuid(&uuid_text, "layers.uuid")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
        description: row.get("description")?,
        status_id: parse_uuid(&status_text, "layers.status_uuid")?,
        order,
        remark: row.get("remark")?,
    };
    layer.validate()?;
    Ok(layer)
}
