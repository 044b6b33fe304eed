//! Visibility status shared by layers, marker types and points.
//!
//! A status ("aktivni", "navrzeny", "zruseny", ...) decides whether the
//! objects carrying it are shown to the public and to map editors.

use crate::model::validation::{require_name, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type StatusId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: StatusId,
    /// Unique display name.
    pub name: String,
    pub description: Option<String>,
    /// Shown to public map visitors.
    pub show: bool,
    /// Shown to map editors.
    pub show_internal: bool,
}

impl Status {
    pub fn new(name: impl Into<String>, show: bool, show_internal: bool) -> Self {
        Self::with_id(Uuid::new_v4(), name, show, show_internal)
    }

    pub fn with_id(id: StatusId, name: impl Into<String>, show: bool, show_internal: bool) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            show,
            show_internal,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_name("name", &self.name)
    }
}
