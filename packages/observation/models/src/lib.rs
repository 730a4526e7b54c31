#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Observation protocol taxonomy and normalized record types.
//!
//! Every upstream protocol returns loosely-typed records with its own field
//! naming. Normalization turns them into [`ObservationRecord`] values that
//! always carry a numeric latitude/longitude pair and a WGS84 point, grouped
//! per protocol into an [`ObservationDataset`].

use geo::Point;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// EPSG code of the coordinate reference system every dataset uses (WGS84).
pub const WGS84_EPSG: u32 = 4326;

/// One category of environmental observation collected by the GLOBE
/// citizen-science program.
///
/// Declaration order is the rendering order of the dataset layers, so the
/// derived [`Ord`] is load-bearing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Protocol {
    /// Surface temperature measurements.
    SurfaceTemperatures,
    /// Relative humidity measurements.
    Humidities,
    /// Mosquito habitat mapper sightings.
    MosquitoHabitatMapper,
    /// Precipitation measurements.
    Precipitations,
}

impl Protocol {
    /// All protocols in rendering order.
    pub const ALL: &[Self] = &[
        Self::SurfaceTemperatures,
        Self::Humidities,
        Self::MosquitoHabitatMapper,
        Self::Precipitations,
    ];

    /// Upstream API identifier (e.g. `"mosquito_habitat_mapper"`).
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::SurfaceTemperatures => "surface_temperatures",
            Self::Humidities => "humidities",
            Self::MosquitoHabitatMapper => "mosquito_habitat_mapper",
            Self::Precipitations => "precipitations",
        }
    }

    /// Human-readable name shown in the legend and hover text.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::SurfaceTemperatures => "Surface Temperature",
            Self::Humidities => "Humidity",
            Self::MosquitoHabitatMapper => "Mosquito Habitat",
            Self::Precipitations => "Precipitation",
        }
    }

    /// Stable legend group identifier.
    ///
    /// Fixed per protocol so the legend stays the same across runs no matter
    /// which protocols returned data.
    #[must_use]
    pub const fn legend_group(self) -> &'static str {
        match self {
            Self::SurfaceTemperatures => "surface_temp",
            Self::Humidities => "humidity",
            Self::MosquitoHabitatMapper => "mosquito",
            Self::Precipitations => "precipitation",
        }
    }
}

/// A single geo-located observation.
///
/// Always has a numeric latitude and longitude; records without them never
/// make it past normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Point geometry (`x` = longitude, `y` = latitude).
    pub point: Point<f64>,
    /// Every field of the raw upstream record, carried through unchanged.
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl ObservationRecord {
    /// Creates a record from resolved coordinates and the raw field map.
    #[must_use]
    pub fn new(
        latitude: f64,
        longitude: f64,
        fields: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            point: Point::new(longitude, latitude),
            fields,
        }
    }

    /// Returns an original upstream field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }
}

/// The normalized records of one protocol, in upstream order.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationDataset {
    /// Protocol the records belong to.
    pub protocol: Protocol,
    /// Normalized records. May be empty.
    pub records: Vec<ObservationRecord>,
}

impl ObservationDataset {
    /// Creates a dataset from already-normalized records.
    #[must_use]
    pub const fn new(protocol: Protocol, records: Vec<ObservationRecord>) -> Self {
        Self { protocol, records }
    }

    /// Creates an empty dataset.
    #[must_use]
    pub const fn empty(protocol: Protocol) -> Self {
        Self::new(protocol, Vec::new())
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records. Empty datasets produce no layer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Longitudes of all records, in order.
    #[must_use]
    pub fn longitudes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.longitude).collect()
    }

    /// Latitudes of all records, in order.
    #[must_use]
    pub fn latitudes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.latitude).collect()
    }
}
