//! Core data model for the cyklomapa interactive map.
//! This crate is the single source of truth for map records, their
//! invariants and the write path that keeps cached map output fresh.

pub mod cache;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use cache::{MemoryResponseCache, ResponseCache};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::correction::{Correction, CorrectionId, CorrectionStatus};
pub use model::geometry::{GeoPoint, WGS84_SRID};
pub use model::layer::{Layer, LayerId};
pub use model::marker::{Marker, MarkerId};
pub use model::page::{PageId, StaticPage};
pub use model::poi::{Poi, PoiId, PoiVisibility, ALWAYS_VISIBLE_IMPORTANCE};
pub use model::status::{Status, StatusId};
pub use model::validation::ValidationError;
pub use repo::correction_repo::{
    CorrectionListQuery, CorrectionRepository, SqliteCorrectionRepository,
};
pub use repo::layer_repo::LayerRepository;
pub use repo::marker_repo::{MarkerListQuery, MarkerRepository};
pub use repo::page_repo::{PageRepository, SqlitePageRepository};
pub use repo::poi_repo::{PoiListQuery, PoiRepository};
pub use repo::status_repo::StatusRepository;
pub use repo::{IntegrityError, MapRepository, RepoError, RepoResult, SqliteMapRepository};
pub use service::correction_service::{CorrectionService, CorrectionSubmission};
pub use service::map_service::MapService;

/// Minimal health-check API for integration probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
