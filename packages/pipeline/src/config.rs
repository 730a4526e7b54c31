//! Pipeline configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) renders the
//! India map for 2015-2026 from the public GLOBE API.

use std::path::Path;

use chrono::NaiveDate;
use globe_map_observation::fields::CoordinateFields;
use globe_map_observation::query::{DEFAULT_API_URL, ObservationQuery};
use globe_map_observation_models::Protocol;
use serde::{Deserialize, Serialize};

use crate::PipelineError;

/// Default world-countries boundary archive.
pub const DEFAULT_BOUNDARY_SOURCE: &str =
    "https://github.com/geo-di-lab/emerge-lessons/raw/refs/heads/main/docs/data/world_countries.zip";

/// Default boundary attribute holding the country name.
pub const DEFAULT_NAME_FIELD: &str = "COUNTRY";

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Country name, as it appears in the boundary source.
    pub country: String,
    /// ISO 3166-1 alpha-3 code sent to the observation API.
    pub country_code: String,
    /// First day of the observation range (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the observation range (inclusive).
    pub end_date: NaiveDate,
    /// Protocols to fetch. Layers are always drawn in protocol order.
    pub protocols: Vec<Protocol>,
    /// Observation API settings.
    pub api: ApiConfig,
    /// Boundary source settings.
    pub boundary: BoundaryConfig,
    /// Coordinate field fallback chains.
    pub fields: CoordinateFields,
}

/// Observation API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Measurement search endpoint.
    pub base_url: String,
    /// Retries for transient failures. `0` fails on the first error.
    pub max_retries: u32,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

/// Boundary source settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoundaryConfig {
    /// URL or local path of a zipped shapefile, `.shp`, or `GeoJSON` file.
    pub source: String,
    /// Attribute holding the country name.
    pub name_field: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            country: "India".to_string(),
            country_code: "IND".to_string(),
            start_date: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default(),
            protocols: Protocol::ALL.to_vec(),
            api: ApiConfig::default(),
            boundary: BoundaryConfig::default(),
            fields: CoordinateFields::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            max_retries: 0,
            timeout_secs: 120,
        }
    }
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_BOUNDARY_SOURCE.to_string(),
            name_field: DEFAULT_NAME_FIELD.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Parses a TOML document. Cross-field checks are left to
    /// [`Self::validate`] so overrides can be applied first.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Toml`] for malformed TOML, unknown keys, or
    /// unknown protocols.
    pub fn from_toml_str(text: &str) -> Result<Self, PipelineError> {
        Ok(toml::de::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] if the file cannot be read, otherwise
    /// as [`Self::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        log::debug!("Loading config from {}", path.display());
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] describing the first violation.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.country.trim().is_empty() {
            return Err(config_error("country must not be empty"));
        }
        if self.country_code.trim().is_empty() {
            return Err(config_error("country_code must not be empty"));
        }
        if self.start_date > self.end_date {
            return Err(config_error(format!(
                "start_date {} is after end_date {}",
                self.start_date, self.end_date
            )));
        }
        if self.protocols.is_empty() {
            return Err(config_error("protocols must list at least one protocol"));
        }
        for (i, protocol) in self.protocols.iter().enumerate() {
            if self.protocols[..i].contains(protocol) {
                return Err(config_error(format!("protocol '{protocol}' is listed twice")));
            }
        }
        if self.api.base_url.trim().is_empty() {
            return Err(config_error("api.base_url must not be empty"));
        }
        if self.boundary.source.trim().is_empty() {
            return Err(config_error("boundary.source must not be empty"));
        }
        if self.boundary.name_field.trim().is_empty() {
            return Err(config_error("boundary.name_field must not be empty"));
        }
        if self.fields.latitude.fields().is_empty() || self.fields.longitude.fields().is_empty() {
            return Err(config_error("coordinate field chains must not be empty"));
        }
        Ok(())
    }

    /// One query per configured protocol, in protocol order.
    #[must_use]
    pub fn queries(&self) -> Vec<ObservationQuery> {
        let mut protocols = self.protocols.clone();
        protocols.sort_unstable();
        protocols
            .into_iter()
            .map(|protocol| ObservationQuery {
                base_url: self.api.base_url.clone(),
                protocol,
                start_date: self.start_date,
                end_date: self.end_date,
                country_code: self.country_code.trim().to_string(),
            })
            .collect()
    }
}

fn config_error(message: impl Into<String>) -> PipelineError {
    PipelineError::Config {
        message: message.into(),
    }
}
