//! Marker type (`znacka`): a category of points with a shared icon and
//! zoom visibility range.
//!
//! # Invariants
//! - `min_zoom <= max_zoom`.
//! - `name` and `slug` are unique across all marker types.

use crate::model::layer::LayerId;
use crate::model::status::StatusId;
use crate::model::validation::{optional_url, require_name, require_slug, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type MarkerId = Uuid;

pub const DEFAULT_MIN_ZOOM: u32 = 1;
pub const DEFAULT_MAX_ZOOM: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    pub name: String,
    pub slug: String,
    /// Every marker type lies in exactly one layer.
    pub layer_id: LayerId,
    pub status_id: StatusId,
    pub description: Option<String>,
    pub remark: Option<String>,
    // TODO: make mandatory once every stored marker has an icon uploaded.
    /// Asset store reference of the base icon.
    pub default_icon: Option<String>,
    pub min_zoom: u32,
    pub max_zoom: u32,
    /// Link used for all points of this type that have no URL of their own.
    pub url: Option<String>,
}

impl Marker {
    pub fn new(
        name: impl Into<String>,
        slug: impl Into<String>,
        layer_id: LayerId,
        status_id: StatusId,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), name, slug, layer_id, status_id)
    }

    pub fn with_id(
        id: MarkerId,
        name: impl Into<String>,
        slug: impl Into<String>,
        layer_id: LayerId,
        status_id: StatusId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
            layer_id,
            status_id,
            description: None,
            remark: None,
            default_icon: None,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            url: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_name("name", &self.name)?;
        require_slug("slug", &self.slug)?;
        if self.min_zoom > self.max_zoom {
            return Err(ValidationError::InvalidZoomRange {
                min_zoom: self.min_zoom,
                max_zoom: self.max_zoom,
            });
        }
        optional_url("url", self.url.as_deref())
    }
}
