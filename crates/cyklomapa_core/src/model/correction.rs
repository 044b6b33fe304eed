//! User-submitted correction (`upresneni`) routed to manual moderation.
//!
//! Corrections describe a fix or an addition for a point. They are rewritten
//! into map data by hand and are never copied into `Poi` automatically.

use crate::model::poi::PoiId;
use crate::model::validation::{
    limit_chars, optional_url, require_email, require_text, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

pub type CorrectionId = Uuid;

/// Moderation workflow state. Transitions are manual only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorrectionStatus {
    #[serde(rename = "novy")]
    New,
    #[serde(rename = "reseno")]
    InProgress,
    #[serde(rename = "vyreseno")]
    Resolved,
    #[serde(rename = "zamitnuto")]
    Rejected,
}

impl CorrectionStatus {
    pub const ALL: [CorrectionStatus; 4] = [
        Self::New,
        Self::InProgress,
        Self::Resolved,
        Self::Rejected,
    ];

    /// Stored code.
    pub fn code(self) -> &'static str {
        match self {
            Self::New => "novy",
            Self::InProgress => "reseno",
            Self::Resolved => "vyreseno",
            Self::Rejected => "zamitnuto",
        }
    }

    /// Human-readable label shown to moderators.
    pub fn label(self) -> &'static str {
        match self {
            Self::New => "Nový",
            Self::InProgress => "V řešení",
            Self::Resolved => "Vyřešeno",
            Self::Rejected => "Zamítnuto",
        }
    }
}

impl FromStr for CorrectionStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == value)
            .ok_or_else(|| ValidationError::UnknownCorrectionStatus(value.to_string()))
    }
}

impl Display for CorrectionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub id: CorrectionId,
    /// Point the correction refers to; empty for suggestions of new places.
    pub poi_id: Option<PoiId>,
    /// Contributor contact, required.
    pub email: String,
    pub status: CorrectionStatus,
    /// Addition, fix or description of a new place, required.
    pub description: String,
    pub url: Option<String>,
    /// Free-text address or location description.
    pub address: Option<String>,
}

impl Correction {
    /// Creates a new submission in the `novy` state.
    pub fn new(email: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), email, description)
    }

    pub fn with_id(
        id: CorrectionId,
        email: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            poi_id: None,
            email: email.into(),
            status: CorrectionStatus::New,
            description: description.into(),
            url: None,
            address: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_email(&self.email)?;
        require_text("description", &self.description)?;
        optional_url("url", self.url.as_deref())?;
        if let Some(address) = self.address.as_deref() {
            limit_chars("address", address)?;
        }
        Ok(())
    }

    /// Moderator-facing label: `"{point} - {email}"`.
    pub fn label(&self, poi_label: Option<&str>) -> String {
        format!("{} - {}", poi_label.unwrap_or("-"), self.email)
    }
}
