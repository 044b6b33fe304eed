//! Point geometry in the WGS84 reference system.
//!
//! # Invariants
//! - Axis order is always longitude, latitude (GeoJSON/WKT order).
//! - Only SRID 4326 is accepted on input and emitted on output.

use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt::{Display, Formatter};

/// EPSG code of WGS84 longitude/latitude.
pub const WGS84_SRID: i64 = 4326;

// GeoJSON `crs` names that denote WGS84 longitude/latitude.
const WGS84_CRS_NAMES: [&str; 3] = [
    "EPSG:4326",
    "urn:ogc:def:crs:EPSG::4326",
    "urn:ogc:def:crs:OGC:1.3:CRS84",
];

/// Geographic point (WGS84, SRID 4326).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    /// Creates a point after range-checking both axes.
    pub fn new(lon: f64, lat: f64) -> Result<Self, ValidationError> {
        let point = Self { lon, lat };
        point.validate()?;
        Ok(point)
    }

    pub fn srid(&self) -> i64 {
        WGS84_SRID
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_axis("lon", self.lon, 180.0)?;
        check_axis("lat", self.lat, 90.0)
    }

    /// Extended WKT with explicit SRID, e.g. `SRID=4326;POINT(14.42 50.09)`.
    pub fn to_ewkt(&self) -> String {
        format!("SRID={WGS84_SRID};{}", self.to_wkt())
    }

    pub fn to_wkt(&self) -> String {
        format!("POINT({} {})", self.lon, self.lat)
    }

    /// Parses `POINT(lon lat)` or `SRID=4326;POINT(lon lat)`.
    ///
    /// # Errors
    /// - `UnknownSrid` when an SRID prefix names another reference system.
    /// - `InvalidGeometry` for anything that is not a 2D point.
    pub fn from_wkt(text: &str) -> Result<Self, ValidationError> {
        let trimmed = text.trim();
        let body = match trimmed.split_once(';') {
            Some((prefix, rest)) => {
                let srid = prefix
                    .trim()
                    .strip_prefix("SRID=")
                    .and_then(|value| value.trim().parse::<i64>().ok())
                    .ok_or_else(|| {
                        ValidationError::InvalidGeometry(format!("malformed SRID prefix `{prefix}`"))
                    })?;
                if srid != WGS84_SRID {
                    return Err(ValidationError::UnknownSrid(srid));
                }
                rest.trim()
            }
            None => trimmed,
        };

        let upper = body.to_ascii_uppercase();
        let coords = upper
            .strip_prefix("POINT")
            .map(str::trim_start)
            .and_then(|rest| rest.strip_prefix('('))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| ValidationError::InvalidGeometry(format!("expected POINT, got `{body}`")))?;

        let mut parts = coords.split_whitespace();
        let (Some(lon), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ValidationError::InvalidGeometry(format!(
                "expected two coordinates, got `{coords}`"
            )));
        };
        Self::new(parse_axis("lon", lon)?, parse_axis("lat", lat)?)
    }

    /// GeoJSON `Point` geometry object.
    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "Point",
            "coordinates": [self.lon, self.lat],
        })
    }

    /// Reads a GeoJSON `Point`; a `crs` member, if present, must name 4326.
    pub fn from_geojson(value: &Value) -> Result<Self, ValidationError> {
        if value.get("type").and_then(Value::as_str) != Some("Point") {
            return Err(ValidationError::InvalidGeometry(
                "GeoJSON geometry type must be `Point`".to_string(),
            ));
        }
        if let Some(name) = value.pointer("/crs/properties/name").and_then(Value::as_str) {
            if !WGS84_CRS_NAMES.contains(&name) {
                return Err(ValidationError::InvalidGeometry(format!(
                    "unsupported GeoJSON crs `{name}`"
                )));
            }
        }

        let coords = value
            .get("coordinates")
            .and_then(Value::as_array)
            .filter(|coords| coords.len() == 2)
            .ok_or_else(|| {
                ValidationError::InvalidGeometry("expected `coordinates: [lon, lat]`".to_string())
            })?;
        let lon = coords[0].as_f64().ok_or_else(|| {
            ValidationError::InvalidGeometry("longitude is not a number".to_string())
        })?;
        let lat = coords[1].as_f64().ok_or_else(|| {
            ValidationError::InvalidGeometry("latitude is not a number".to_string())
        })?;
        Self::new(lon, lat)
    }
}

impl Display for GeoPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_ewkt())
    }
}

fn check_axis(axis: &'static str, value: f64, limit: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value.abs() > limit {
        return Err(ValidationError::InvalidCoordinate {
            axis,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn parse_axis(axis: &'static str, text: &str) -> Result<f64, ValidationError> {
    text.parse::<f64>()
        .map_err(|_| ValidationError::InvalidCoordinate {
            axis,
            value: text.to_string(),
        })
}
