//! Upstream GLOBE measurement search query.

use chrono::NaiveDate;
use globe_map_observation_models::Protocol;

use crate::ObservationError;

/// Default GLOBE measurement search endpoint, filtered by measurement
/// country.
pub const DEFAULT_API_URL: &str =
    "https://api.globe.gov/search/v1/measurement/protocol/measureddate/measurementcountry/";

/// Date format the API expects for `startdate`/`enddate`.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single protocol search over an inclusive date range for one country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationQuery {
    /// Search endpoint URL.
    pub base_url: String,
    /// Protocol to request.
    pub protocol: Protocol,
    /// First day of the range (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the range (inclusive).
    pub end_date: NaiveDate,
    /// ISO 3166-1 alpha-3 country code (e.g. `"IND"`).
    pub country_code: String,
}

impl ObservationQuery {
    /// Query parameters in the order the API documents them.
    ///
    /// Always requests geometry-annotated output and disables upstream
    /// sampling.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("protocols", self.protocol.id().to_string()),
            ("startdate", self.start_date.format(DATE_FORMAT).to_string()),
            ("enddate", self.end_date.format(DATE_FORMAT).to_string()),
            ("countrycode", self.country_code.clone()),
            ("geojson", "TRUE".to_string()),
            ("sample", "FALSE".to_string()),
        ]
    }

    /// Full request URL.
    ///
    /// # Errors
    ///
    /// Returns [`ObservationError::InvalidQuery`] if `base_url` is not a
    /// valid URL.
    pub fn url(&self) -> Result<reqwest::Url, ObservationError> {
        reqwest::Url::parse_with_params(&self.base_url, self.params()).map_err(|e| {
            ObservationError::InvalidQuery {
                message: format!("invalid API URL '{}': {e}", self.base_url),
            }
        })
    }
}
