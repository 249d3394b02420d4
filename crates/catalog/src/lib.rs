//! Location and product data consumed by the globe.
//!
//! The catalog is loaded once, before interaction begins, and is read-only
//! afterwards. Every location is validated on the way in so the marker layer
//! only ever sees finite, in-range coordinates.

pub mod filter;

use std::collections::BTreeMap;

use foundation::math::{GeoError, GeoPoint};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use filter::*;

const SAMPLE_LOCATIONS_JSON: &str = include_str!("../data/sample_locations.json");

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub String);

impl LocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_level")]
    pub level: u8,
}

fn default_level() -> u8 {
    1
}

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 3;

/// A location as delivered by the backend. `lat`/`lng` are untrusted until
/// [`Location::geo_point`] has accepted them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Location {
    pub fn geo_point(&self) -> Result<GeoPoint, GeoError> {
        GeoPoint::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    Parse(String),
    InvalidCoordinates { id: LocationId, source: GeoError },
    InvalidLevel { product_id: String, level: u8 },
    DuplicateId(LocationId),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Parse(msg) => write!(f, "location data malformed: {msg}"),
            CatalogError::InvalidCoordinates { id, source } => {
                write!(f, "location {id} has invalid coordinates: {source}")
            }
            CatalogError::InvalidLevel { product_id, level } => write!(
                f,
                "product {product_id} has level {level}, expected {MIN_LEVEL}..={MAX_LEVEL}"
            ),
            CatalogError::DuplicateId(id) => write!(f, "location id {id} appears more than once"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::InvalidCoordinates { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// What to do with a location that fails validation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Abort the whole load on the first bad location.
    #[default]
    Strict,
    /// Drop bad locations (logged) and keep the rest.
    SkipInvalid,
}

/// A location whose coordinates passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogLocation {
    pub location: Location,
    pub geo: GeoPoint,
}

#[derive(Debug, Clone, Default)]
pub struct LocationCatalog {
    /// Load order is preserved; it is also the marker and filter order.
    entries: Vec<CatalogLocation>,
    by_id: BTreeMap<LocationId, usize>,
    rejected: Vec<CatalogError>,
}

impl LocationCatalog {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::from_json_with(json, LoadPolicy::Strict)
    }

    pub fn from_json_with(json: &str, policy: LoadPolicy) -> Result<Self, CatalogError> {
        let locations: Vec<Location> =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_locations(locations, policy)
    }

    pub fn from_locations(
        locations: Vec<Location>,
        policy: LoadPolicy,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for location in locations {
            match validate(&location, &catalog.by_id) {
                Ok(geo) => {
                    catalog
                        .by_id
                        .insert(location.id.clone(), catalog.entries.len());
                    catalog.entries.push(CatalogLocation { location, geo });
                }
                Err(err) => match policy {
                    LoadPolicy::Strict => return Err(err),
                    LoadPolicy::SkipInvalid => {
                        warn!("skipping location: {err}");
                        catalog.rejected.push(err);
                    }
                },
            }
        }
        debug!(
            loaded = catalog.entries.len(),
            rejected = catalog.rejected.len(),
            "location catalog ready"
        );
        Ok(catalog)
    }

    /// The bundled demo data set.
    pub fn sample() -> Result<Self, CatalogError> {
        Self::from_json(SAMPLE_LOCATIONS_JSON)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &LocationId) -> Option<&CatalogLocation> {
        self.by_id.get(id).map(|&idx| &self.entries[idx])
    }

    pub fn location(&self, id: &LocationId) -> Option<&Location> {
        self.get(id).map(|e| &e.location)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogLocation> + '_ {
        self.entries.iter()
    }

    pub fn find_product(&self, product_id: &str) -> Option<&Product> {
        self.entries
            .iter()
            .flat_map(|e| e.location.products.iter())
            .find(|p| p.id == product_id)
    }

    /// Locations dropped under [`LoadPolicy::SkipInvalid`].
    pub fn rejected(&self) -> &[CatalogError] {
        &self.rejected
    }
}

fn validate(
    location: &Location,
    seen: &BTreeMap<LocationId, usize>,
) -> Result<GeoPoint, CatalogError> {
    if seen.contains_key(&location.id) {
        return Err(CatalogError::DuplicateId(location.id.clone()));
    }
    let geo = location
        .geo_point()
        .map_err(|source| CatalogError::InvalidCoordinates {
            id: location.id.clone(),
            source,
        })?;
    if let Some(p) = location
        .products
        .iter()
        .find(|p| !(MIN_LEVEL..=MAX_LEVEL).contains(&p.level))
    {
        return Err(CatalogError::InvalidLevel {
            product_id: p.id.clone(),
            level: p.level,
        });
    }
    Ok(geo)
}
