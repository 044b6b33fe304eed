//! Map layer (`vrstva`): a toggleable group of marker types.

use crate::model::status::StatusId;
use crate::model::validation::{require_name, require_slug, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type LayerId = Uuid;

/// Layer record. Layers render in ascending `order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    /// Unique URL slug.
    pub slug: String,
    pub description: Option<String>,
    pub status_id: StatusId,
    pub order: u32,
    /// Internal note, never shown publicly.
    pub remark: Option<String>,
}

impl Layer {
    pub fn new(
        name: impl Into<String>,
        slug: impl Into<String>,
        status_id: StatusId,
        order: u32,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), name, slug, status_id, order)
    }

    pub fn with_id(
        id: LayerId,
        name: impl Into<String>,
        slug: impl Into<String>,
        status_id: StatusId,
        order: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
            description: None,
            status_id,
            order,
            remark: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_name("name", &self.name)?;
        require_slug("slug", &self.slug)
    }
}
