//! Normalizes raw upstream records into [`ObservationDataset`] values.
//!
//! Uses [`CoordinateFields`] to resolve latitude and longitude from each
//! record regardless of the protocol-specific field naming. Records without
//! a resolvable coordinate pair are dropped.

use globe_map_observation_models::{ObservationDataset, ObservationRecord, Protocol};

use crate::fields::CoordinateFields;

/// Name of the array holding the records in an upstream response.
pub const RESULTS_FIELD: &str = "results";

/// Normalizes raw results using the default coordinate field chains.
#[must_use]
pub fn normalize(protocol: Protocol, raw_results: &[serde_json::Value]) -> ObservationDataset {
    normalize_with(protocol, raw_results, &CoordinateFields::default())
}

/// Normalizes raw results using the given coordinate field chains.
///
/// Skips records that are not JSON objects or lack either coordinate.
#[must_use]
pub fn normalize_with(
    protocol: Protocol,
    raw_results: &[serde_json::Value],
    fields: &CoordinateFields,
) -> ObservationDataset {
    let records: Vec<ObservationRecord> = raw_results
        .iter()
        .filter_map(|raw| normalize_record(raw, fields))
        .collect();

    let dropped = raw_results.len() - records.len();
    log::info!("{protocol}: {} records", records.len());
    if dropped > 0 {
        log::debug!("{protocol}: dropped {dropped} records without coordinates");
    }

    ObservationDataset::new(protocol, records)
}

/// Normalizes the `results` array of a full upstream response body.
///
/// A body without a `results` array counts as zero records.
#[must_use]
pub fn normalize_response(
    protocol: Protocol,
    body: &serde_json::Value,
    fields: &CoordinateFields,
) -> ObservationDataset {
    let raw_results = results(body);
    log::info!("{protocol}: {} raw records", raw_results.len());
    normalize_with(protocol, raw_results, fields)
}

/// Returns the `results` array of a response body, or an empty slice.
#[must_use]
pub fn results(body: &serde_json::Value) -> &[serde_json::Value] {
    match body.get(RESULTS_FIELD).and_then(serde_json::Value::as_array) {
        Some(results) => results,
        None => {
            log::warn!("Response has no '{RESULTS_FIELD}' array, treating as zero records");
            &[]
        }
    }
}

/// Normalizes a single raw record.
fn normalize_record(
    raw: &serde_json::Value,
    fields: &CoordinateFields,
) -> Option<ObservationRecord> {
    let object = raw.as_object()?;
    let (latitude, longitude) = fields.resolve(raw)?;
    Some(ObservationRecord::new(latitude, longitude, object.clone()))
}
