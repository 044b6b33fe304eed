//! Field validation shared by all record kinds.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum length of bounded text columns (names, titles, addresses).
pub const MAX_NAME_CHARS: usize = 255;
/// Maximum slug length.
pub const MAX_SLUG_CHARS: usize = 50;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid slug regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("valid email regex"));
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)(https?|ftp)://[^\s/?#.][^\s]*$").expect("valid url regex"));

/// Field-level validation failure raised before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required value is absent or blank.
    MissingField(&'static str),
    /// Text value exceeds the column limit.
    TooLong { field: &'static str, max_chars: usize },
    /// Value is not a URL slug (`[-a-zA-Z0-9_]+`).
    InvalidSlug { field: &'static str, value: String },
    /// Contributor email is not a plausible address.
    InvalidEmail(String),
    /// Link is not an absolute http(s)/ftp URL.
    InvalidUrl { field: &'static str, value: String },
    /// Marker zoom bounds are inverted.
    InvalidZoomRange { min_zoom: u32, max_zoom: u32 },
    /// Coordinate outside the WGS84 range or not finite.
    InvalidCoordinate { axis: &'static str, value: String },
    /// Geometry uses a reference system other than WGS84.
    UnknownSrid(i64),
    /// Geometry text/JSON cannot be parsed as a point.
    InvalidGeometry(String),
    /// Correction workflow code outside the closed set.
    UnknownCorrectionStatus(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "field `{field}` is required"),
            Self::TooLong { field, max_chars } => {
                write!(f, "field `{field}` exceeds {max_chars} characters")
            }
            Self::InvalidSlug { field, value } => {
                write!(f, "field `{field}` is not a valid slug: `{value}`")
            }
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
            Self::InvalidUrl { field, value } => {
                write!(f, "field `{field}` is not a valid URL: `{value}`")
            }
            Self::InvalidZoomRange { min_zoom, max_zoom } => write!(
                f,
                "min_zoom {min_zoom} must not be greater than max_zoom {max_zoom}"
            ),
            Self::InvalidCoordinate { axis, value } => {
                write!(f, "{axis} value {value} is outside the WGS84 range")
            }
            Self::UnknownSrid(srid) => write!(f, "unsupported SRID {srid}, expected 4326"),
            Self::InvalidGeometry(message) => write!(f, "invalid point geometry: {message}"),
            Self::UnknownCorrectionStatus(value) => write!(
                f,
                "unknown correction status `{value}`; expected novy|reseno|vyreseno|zamitnuto"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Requires a non-blank value of at most `MAX_NAME_CHARS` characters.
pub fn require_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    require_text(field, value)?;
    limit_chars(field, value)
}

/// Requires a non-blank value of unbounded length.
pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

pub fn limit_chars(field: &'static str, value: &str) -> Result<(), ValidationError> {
    limit_chars_to(field, value, MAX_NAME_CHARS)
}

fn limit_chars_to(field: &'static str, value: &str, max_chars: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max_chars {
        return Err(ValidationError::TooLong { field, max_chars });
    }
    Ok(())
}

pub fn require_slug(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    if !SLUG_RE.is_match(value) {
        return Err(ValidationError::InvalidSlug {
            field,
            value: value.to_string(),
        });
    }
    limit_chars_to(field, value, MAX_SLUG_CHARS)
}

pub fn require_email(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField("email"));
    }
    if !EMAIL_RE.is_match(value) {
        return Err(ValidationError::InvalidEmail(value.to_string()));
    }
    Ok(())
}

/// Accepts `None`; rejects present values that are not absolute URLs.
pub fn optional_url(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(url) if !URL_RE.is_match(url) => Err(ValidationError::InvalidUrl {
            field,
            value: url.to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_accepts_ascii_words_and_dashes() {
        assert!(require_slug("slug", "restaurace").is_ok());
        assert!(require_slug("slug", "pujcovny-kol_2").is_ok());
    }

    #[test]
    fn slug_rejects_spaces_and_diacritics() {
        assert!(matches!(
            require_slug("slug", "kavárna"),
            Err(ValidationError::InvalidSlug { .. })
        ));
        assert!(matches!(
            require_slug("slug", "two words"),
            Err(ValidationError::InvalidSlug { .. })
        ));
        assert_eq!(
            require_slug("slug", ""),
            Err(ValidationError::MissingField("slug"))
        );
    }

    #[test]
    fn email_requires_domain_with_dot() {
        assert!(require_email("jan@example.cz").is_ok());
        assert!(matches!(
            require_email("jan@localhost"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert_eq!(
            require_email("  "),
            Err(ValidationError::MissingField("email"))
        );
    }

    #[test]
    fn url_is_optional_but_must_be_absolute() {
        assert!(optional_url("url", None).is_ok());
        assert!(optional_url("url", Some("https://www.prahounakole.cz/")).is_ok());
        assert!(optional_url("url", Some("www.example.com")).is_err());
    }

    #[test]
    fn name_counts_characters_not_bytes() {
        let name = "ž".repeat(MAX_NAME_CHARS);
        assert!(require_name("name", &name).is_ok());
        let too_long = format!("{name}x");
        assert!(matches!(
            require_name("name", &too_long),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn slug_is_limited_to_fifty_characters() {
        assert!(require_slug("slug", &"a".repeat(MAX_SLUG_CHARS)).is_ok());
        assert_eq!(
            require_slug("slug", &"a".repeat(MAX_SLUG_CHARS + 1)),
            Err(ValidationError::TooLong {
                field: "slug",
                max_chars: MAX_SLUG_CHARS,
            })
        );
    }
}
