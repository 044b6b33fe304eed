//! Map write service with response cache invalidation.
//!
//! # Responsibility
//! - Single entry point for writes to statuses, layers, marker types and
//!   points.
//! - Expose the public and editor point listings.
//!
//! # Invariants
//! - Every successful create/update/delete clears the injected cache exactly
//!   once, before the call returns.
//! - Failed writes leave both storage and cache untouched.

use crate::cache::ResponseCache;
use crate::model::layer::{Layer, LayerId};
use crate::model::marker::{Marker, MarkerId};
use crate::model::poi::{Poi, PoiId, PoiVisibility};
use crate::model::status::{Status, StatusId};
use crate::repo::marker_repo::MarkerListQuery;
use crate::repo::poi_repo::PoiListQuery;
use crate::repo::{MapRepository, RepoResult};
use log::{info, warn};
use uuid::Uuid;

/// Write service over map repositories and a shared response cache.
pub struct MapService<R: MapRepository, C: ResponseCache> {
    repo: R,
    cache: C,
}

impl<R: MapRepository, C: ResponseCache> MapService<R, C> {
    pub fn new(repo: R, cache: C) -> Self {
        Self { repo, cache }
    }

    pub fn create_status(&self, status: &Status) -> RepoResult<StatusId> {
        let result = self.repo.create_status(status);
        self.after_write("status_create", status.id, result)
    }

    pub fn update_status(&self, status: &Status) -> RepoResult<()> {
        let result = self.repo.update_status(status);
        self.after_write("status_update", status.id, result)
    }

    /// Fails with `IntegrityError::StillReferenced` while anything uses it.
    pub fn delete_status(&self, id: StatusId) -> RepoResult<()> {
        let result = self.repo.delete_status(id);
        self.after_write("status_delete", id, result)
    }

    pub fn get_status(&self, id: StatusId) -> RepoResult<Option<Status>> {
        self.repo.get_status(id)
    }

    pub fn list_statuses(&self) -> RepoResult<Vec<Status>> {
        self.repo.list_statuses()
    }

    pub fn create_layer(&self, layer: &Layer) -> RepoResult<LayerId> {
        let result = self.repo.create_layer(layer);
        self.after_write("layer_create", layer.id, result)
    }

    pub fn update_layer(&self, layer: &Layer) -> RepoResult<()> {
        let result = self.repo.update_layer(layer);
        self.after_write("layer_update", layer.id, result)
    }

    pub fn delete_layer(&self, id: LayerId) -> RepoResult<()> {
        let result = self.repo.delete_layer(id);
        self.after_write("layer_delete", id, result)
    }

    pub fn get_layer(&self, id: LayerId) -> RepoResult<Option<Layer>> {
        self.repo.get_layer(id)
    }

    pub fn get_layer_by_slug(&self, slug: &str) -> RepoResult<Option<Layer>> {
        self.repo.get_layer_by_slug(slug)
    }

    /// Layers in ascending display order.
    pub fn layers(&self) -> RepoResult<Vec<Layer>> {
        self.repo.list_layers()
    }

    pub fn create_marker(&self, marker: &Marker) -> RepoResult<MarkerId> {
        let result = self.repo.create_marker(marker);
        self.after_write("marker_create", marker.id, result)
    }

    pub fn update_marker(&self, marker: &Marker) -> RepoResult<()> {
        let result = self.repo.update_marker(marker);
        self.after_write("marker_update", marker.id, result)
    }

    pub fn delete_marker(&self, id: MarkerId) -> RepoResult<()> {
        let result = self.repo.delete_marker(id);
        self.after_write("marker_delete", id, result)
    }

    pub fn get_marker(&self, id: MarkerId) -> RepoResult<Option<Marker>> {
        self.repo.get_marker(id)
    }

    pub fn get_marker_by_slug(&self, slug: &str) -> RepoResult<Option<Marker>> {
        self.repo.get_marker_by_slug(slug)
    }

    pub fn markers_in_layer(&self, layer_id: LayerId) -> RepoResult<Vec<Marker>> {
        self.repo.list_markers(&MarkerListQuery {
            layer_id: Some(layer_id),
        })
    }

    pub fn create_poi(&self, poi: &Poi) -> RepoResult<PoiId> {
        let result = self.repo.create_poi(poi);
        self.after_write("poi_create", poi.id, result)
    }

    pub fn update_poi(&self, poi: &Poi) -> RepoResult<()> {
        let result = self.repo.update_poi(poi);
        self.after_write("poi_update", poi.id, result)
    }

    pub fn delete_poi(&self, id: PoiId) -> RepoResult<()> {
        let result = self.repo.delete_poi(id);
        self.after_write("poi_delete", id, result)
    }

    pub fn get_poi(&self, id: PoiId) -> RepoResult<Option<Poi>> {
        self.repo.get_poi(id)
    }

    /// What the public map shows.
    pub fn visible_pois(&self) -> RepoResult<Vec<Poi>> {
        self.repo.list_visible_pois()
    }

    /// What map editors see, including internally shown statuses.
    pub fn editor_pois(&self) -> RepoResult<Vec<Poi>> {
        self.repo.list_pois(&PoiListQuery {
            visibility: PoiVisibility::Internal,
            ..PoiListQuery::default()
        })
    }

    pub fn list_pois(&self, query: &PoiListQuery) -> RepoResult<Vec<Poi>> {
        self.repo.list_pois(query)
    }

    fn after_write<T>(&self, event: &'static str, id: Uuid, result: RepoResult<T>) -> RepoResult<T> {
        match result {
            Ok(value) => {
                self.cache.clear();
                info!("event={event} module=service status=ok id={id} cache=cleared");
                Ok(value)
            }
            Err(err) => {
                warn!(
                    "event={event} module=service status=error id={id} error_code={}",
                    err.error_code()
                );
                Err(err)
            }
        }
    }
}
