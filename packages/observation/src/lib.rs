#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! GLOBE observation fetching and coordinate normalization.
//!
//! Queries the GLOBE measurement search API once per [`Protocol`], then
//! normalizes the loosely-typed `results` records into an
//! [`ObservationDataset`] via declared [`fields::FieldChain`]s.

pub mod fields;
pub mod normalize;
pub mod query;
pub mod retry;

pub use globe_map_observation_models::{
    ObservationDataset, ObservationRecord, Protocol, WGS84_EPSG,
};

use crate::fields::CoordinateFields;
use crate::query::ObservationQuery;

/// Errors that can occur while fetching observations.
#[derive(Debug, thiserror::Error)]
pub enum ObservationError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    Status {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// Response body was not valid JSON.
    #[error("Malformed response from {url}: {message}")]
    MalformedResponse {
        /// Request URL.
        url: String,
        /// Parser message.
        message: String,
    },

    /// The query could not be turned into a request.
    #[error("Invalid query: {message}")]
    InvalidQuery {
        /// Description of what went wrong.
        message: String,
    },
}

/// Fetches the raw response body for one protocol query.
///
/// # Errors
///
/// Returns [`ObservationError`] on transport failure, non-success status,
/// or a body that is not JSON.
pub async fn fetch_raw(
    client: &reqwest::Client,
    query: &ObservationQuery,
    max_retries: u32,
) -> Result<serde_json::Value, ObservationError> {
    let url = query.url()?;
    log::debug!("GET {url}");
    retry::send_json(|| client.get(url.clone()), max_retries).await
}

/// Fetches one protocol and normalizes it into a dataset.
///
/// A response without a `results` array yields an empty dataset.
///
/// # Errors
///
/// Returns [`ObservationError`] if fetching fails (see [`fetch_raw`]).
pub async fn fetch_dataset(
    client: &reqwest::Client,
    query: &ObservationQuery,
    fields: &CoordinateFields,
    max_retries: u32,
) -> Result<ObservationDataset, ObservationError> {
    let body = fetch_raw(client, query, max_retries).await?;
    Ok(normalize::normalize_response(query.protocol, &body, fields))
}
