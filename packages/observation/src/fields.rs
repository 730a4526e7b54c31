//! Declared coordinate field chains.
//!
//! Upstream protocols disagree on what they call their coordinate fields.
//! Instead of probing a record ad hoc, each logical coordinate is described
//! by a [`FieldChain`]: an ordered list of candidate field names tried in
//! sequence. The first candidate holding a usable value wins.

use serde::{Deserialize, Serialize};

/// Ordered candidate field names for one logical value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldChain {
    fields: Vec<String>,
}

impl FieldChain {
    /// Creates a chain from candidate names, tried in the given order.
    #[must_use]
    pub fn new(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| (*f).to_string()).collect(),
        }
    }

    /// Candidate field names in resolution order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Resolves the chain against a raw JSON record.
    ///
    /// Absent fields, `null`, and blank strings fall through to the next
    /// candidate. Returns `None` when no candidate yields a number.
    #[must_use]
    pub fn resolve(&self, record: &serde_json::Value) -> Option<f64> {
        self.fields
            .iter()
            .filter_map(|field| record.get(field))
            .find(|value| !is_blank(value))
            .and_then(coerce_f64)
    }
}

/// `null` or a whitespace-only string. Zero is not blank.
fn is_blank(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Converts a JSON number, or a string holding one, to `f64`.
fn coerce_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Field chains for both coordinates of an observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateFields {
    /// Latitude candidates.
    pub latitude: FieldChain,
    /// Longitude candidates.
    pub longitude: FieldChain,
}

impl Default for CoordinateFields {
    /// `latitude`, `lat` for latitude and `longitude`, `lon`, `lng` for
    /// longitude.
    fn default() -> Self {
        Self {
            latitude: FieldChain::new(&["latitude", "lat"]),
            longitude: FieldChain::new(&["longitude", "lon", "lng"]),
        }
    }
}

impl CoordinateFields {
    /// Resolves `(latitude, longitude)`, or `None` when either is missing.
    #[must_use]
    pub fn resolve(&self, record: &serde_json::Value) -> Option<(f64, f64)> {
        let latitude = self.latitude.resolve(record)?;
        let longitude = self.longitude.resolve(record)?;
        Some((latitude, longitude))
    }
}
