//! Geoapify response types and the normalized [`Place`] view.
//!
//! Both the geocode and the places endpoints answer with a GeoJSON
//! `FeatureCollection`. Every field is optional in practice, so everything
//! here defaults rather than failing the whole payload.

use idmap_core::{BoundingBox, GeoPoint};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Properties,
    /// `[west, south, east, north]` when present.
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
}

/// Only point geometries are interpreted; anything else is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct Geometry {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub coordinates: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct Properties {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub formatted: Option<String>,
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub bounds: Option<Bounds>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Geometry {
    /// `[lon, lat]` of a point geometry.
    #[must_use]
    pub fn point(&self) -> Option<GeoPoint> {
        if self.kind.as_deref().is_some_and(|k| k != "Point") {
            return None;
        }
        let coords = self.coordinates.as_array()?;
        let lon = coords.first()?.as_f64()?;
        let lat = coords.get(1)?.as_f64()?;
        Some(GeoPoint::new(lat, lon))
    }
}

impl Properties {
    #[must_use]
    pub fn point(&self) -> Option<GeoPoint> {
        Some(GeoPoint::new(self.lat?, self.lon?))
    }
}

impl Feature {
    /// Point from the geometry, falling back to `properties.lat/lon`.
    #[must_use]
    pub fn geometry_point(&self) -> Option<GeoPoint> {
        self.geometry
            .as_ref()
            .and_then(Geometry::point)
            .or_else(|| self.properties.point())
            .filter(GeoPoint::is_valid)
    }

    /// Point from `properties.lat/lon`, falling back to the geometry.
    #[must_use]
    pub fn property_point(&self) -> Option<GeoPoint> {
        self.properties
            .point()
            .or_else(|| self.geometry.as_ref().and_then(Geometry::point))
            .filter(GeoPoint::is_valid)
    }

    /// Top-level `bbox`, falling back to `properties.bounds`.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        if let Some([west, south, east, north]) = self.bbox.as_deref() {
            return Some(BoundingBox {
                west: *west,
                south: *south,
                east: *east,
                north: *north,
            });
        }
        self.properties.bounds.map(|b| BoundingBox {
            west: b.west,
            south: b.south,
            east: b.east,
            north: b.north,
        })
    }
}

/// One place returned by the places backend, before the search pipeline
/// records which stage found it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: Option<String>,
    pub coords: GeoPoint,
    /// First category reported by the backend.
    pub category: Option<String>,
    pub formatted: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl Place {
    /// Converts a places feature. Features without coordinates are dropped.
    #[must_use]
    pub fn from_feature(feature: Feature) -> Option<Self> {
        let coords = feature.property_point()?;
        let p = feature.properties;
        Some(Self {
            name: non_blank(p.name),
            coords,
            category: p.categories.into_iter().next(),
            formatted: non_blank(p.formatted),
            address_line1: non_blank(p.address_line1),
            address_line2: non_blank(p.address_line2),
            city: non_blank(p.city).or_else(|| non_blank(p.county)),
            state: non_blank(p.state),
            country: non_blank(p.country),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
