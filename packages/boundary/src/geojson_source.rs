//! `GeoJSON` `FeatureCollection` boundary reading.
//!
//! `GeoJSON` coordinates are WGS84 lon/lat by definition, so no projection
//! check is needed here.

use geojson::GeoJson;
use globe_map_boundary_models::BoundaryShape;

use crate::{BoundaryError, NamedShape};

/// Parses a `FeatureCollection` and pairs each feature's geometry with the
/// value of its name property.
///
/// Features with missing or non-polygonal geometry are kept with
/// `shape = None` so the caller can report them.
///
/// # Errors
///
/// Returns [`BoundaryError::GeoJson`] if the text is not `GeoJSON` or not a
/// `FeatureCollection`.
pub fn read_feature_collection(
    text: &str,
    name_field: &str,
) -> Result<Vec<NamedShape>, BoundaryError> {
    let geojson: GeoJson = text.parse().map_err(|e: geojson::Error| BoundaryError::GeoJson {
        message: e.to_string(),
    })?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(BoundaryError::GeoJson {
            message: "boundary GeoJSON must be a FeatureCollection".to_string(),
        });
    };

    Ok(collection
        .features
        .into_iter()
        .enumerate()
        .map(|(idx, feature)| {
            let name = feature
                .properties
                .as_ref()
                .and_then(|props| props.get(name_field))
                .and_then(serde_json::Value::as_str)
                .map(|s| s.trim().to_string());

            let shape = feature.geometry.and_then(|geometry| {
                match geo::Geometry::<f64>::try_from(geometry.value) {
                    Ok(geometry) => BoundaryShape::from_geometry(geometry),
                    Err(e) => {
                        log::warn!("Failed to convert geometry for feature {idx}: {e}");
                        None
                    }
                }
            });

            NamedShape { name, shape }
        })
        .collect())
}
