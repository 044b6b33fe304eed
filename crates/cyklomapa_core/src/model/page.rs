//! Static CMS page, independent of the map entities.

use crate::model::validation::{limit_chars, require_slug, require_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PageId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticPage {
    pub id: PageId,
    /// Unique URL suffix.
    pub slug: String,
    /// Extra markup injected into the page head (css, js).
    pub head: Option<String>,
    pub title: Option<String>,
    /// Shortened HTML content used for previews.
    pub short: String,
    /// Full HTML content.
    pub content: String,
}

impl StaticPage {
    pub fn new(slug: impl Into<String>, short: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), slug, short, content)
    }

    pub fn with_id(
        id: PageId,
        slug: impl Into<String>,
        short: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            slug: slug.into(),
            head: None,
            title: None,
            short: short.into(),
            content: content.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_slug("slug", &self.slug)?;
        if let Some(title) = self.title.as_deref() {
            limit_chars("title", title)?;
        }
        require_text("short", &self.short)?;
        require_text("content", &self.content)
    }

    /// Title when set, otherwise the slug.
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(self.slug.as_str())
    }
}
