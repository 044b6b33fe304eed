//! Point of interest (`misto`) and visibility filters.
//!
//! # Responsibility
//! - Define the geolocated record rendered on the map.
//! - Own the single definition of which points the public and editors see.
//!
//! # Invariants
//! - `position` is always WGS84 (SRID 4326).
//! - `importance >= ALWAYS_VISIBLE_IMPORTANCE` makes a point visible at every
//!   zoom level.

use crate::model::geometry::GeoPoint;
use crate::model::marker::{Marker, MarkerId};
use crate::model::status::StatusId;
use crate::model::validation::{limit_chars, optional_url, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PoiId = Uuid;

/// Importance at which a point ignores its marker's minimum zoom.
pub const ALWAYS_VISIBLE_IMPORTANCE: i16 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub id: PoiId,
    /// Optional own name; the marker name is used when absent.
    pub name: Option<String>,
    pub marker_id: MarkerId,
    pub status_id: StatusId,
    /// Minimum-zoom modifier. Higher values show the point earlier.
    pub importance: i16,
    pub position: GeoPoint,
    pub description: Option<String>,
    /// Text for the detailed listing, outside the popup.
    pub description_extra: Option<String>,
    pub url: Option<String>,
    /// Internal note, never shown publicly.
    pub remark: Option<String>,
    /// Asset store reference of the full-resolution photo.
    pub photo: Option<String>,
}

impl Poi {
    pub fn new(marker_id: MarkerId, status_id: StatusId, position: GeoPoint) -> Self {
        Self::with_id(Uuid::new_v4(), marker_id, status_id, position)
    }

    pub fn with_id(id: PoiId, marker_id: MarkerId, status_id: StatusId, position: GeoPoint) -> Self {
        Self {
            id,
            name: None,
            marker_id,
            status_id,
            importance: 0,
            position,
            description: None,
            description_extra: None,
            url: None,
            remark: None,
            photo: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = self.name.as_deref() {
            limit_chars("name", name)?;
        }
        self.position.validate()?;
        optional_url("url", self.url.as_deref())
    }

    /// Public path of the point's detail page.
    pub fn absolute_url(&self) -> String {
        format!("/misto/{}/", self.id)
    }

    /// Own name when set and non-blank, otherwise the marker's name.
    pub fn label<'a>(&'a self, marker: &'a Marker) -> &'a str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => marker.name.as_str(),
        }
    }

    /// Zoom level from which the point is drawn.
    pub fn effective_min_zoom(&self, marker: &Marker) -> u32 {
        if self.importance >= ALWAYS_VISIBLE_IMPORTANCE {
            return 0;
        }
        let shifted = i64::from(marker.min_zoom) - i64::from(self.importance);
        u32::try_from(shifted.max(0)).unwrap_or(u32::MAX)
    }

    /// Own URL, falling back to the marker type URL.
    pub fn effective_url<'a>(&'a self, marker: &'a Marker) -> Option<&'a str> {
        self.url.as_deref().or(marker.url.as_deref())
    }
}

/// Audience filter applied when listing points.
///
/// The SQL predicates here are the only definition of what each audience
/// sees; they expect the point's status joined as `ps` and its marker's
/// status joined as `ms`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PoiVisibility {
    /// Own status and marker status are both publicly shown.
    Public,
    /// Own status and marker status are each shown publicly or to editors.
    Internal,
    /// No status filter.
    #[default]
    All,
}

impl PoiVisibility {
    pub(crate) fn sql_predicate(self) -> &'static str {
        match self {
            Self::Public => "ps.show = 1 AND ms.show = 1",
            Self::Internal => {
                "(ps.show = 1 OR ps.show_internal = 1) AND (ms.show = 1 OR ms.show_internal = 1)"
            }
            Self::All => "1 = 1",
        }
    }
}
