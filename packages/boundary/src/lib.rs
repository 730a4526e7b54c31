#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Country boundary loading and exterior ring extraction.
//!
//! Loads a world-countries dataset (zipped shapefile, bare shapefile, or
//! `GeoJSON`) from a URL or local path, reprojects shapefiles to WGS84
//! lon/lat, selects one country by its name attribute, and extracts the
//! exterior rings to draw.

pub mod geojson_source;
pub mod projection;
pub mod rings;
pub mod shp;

use std::path::{Path, PathBuf};

pub use globe_map_boundary_models::{
    BOUNDARY_LEGEND_GROUP, BoundaryRing, BoundaryShape, CountryBoundary,
};
pub use projection::Reprojection;
pub use rings::extract_rings;
use thiserror::Error;

/// Errors that can occur while loading boundaries.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// File read failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip archive was unreadable or incomplete.
    #[error("Archive error: {message}")]
    Archive {
        /// Description of what went wrong.
        message: String,
    },

    /// Shapefile or its attribute table was malformed.
    #[error("Shapefile error: {message}")]
    Shapefile {
        /// Description of what went wrong.
        message: String,
    },

    /// `GeoJSON` was malformed.
    #[error("GeoJSON error: {message}")]
    GeoJson {
        /// Description of what went wrong.
        message: String,
    },

    /// Source CRS cannot be converted to WGS84 lon/lat.
    #[error("Unsupported projection '{name}': {message}")]
    UnsupportedProjection {
        /// CRS name from the `.prj` file.
        name: String,
        /// Why it cannot be converted.
        message: String,
    },

    /// A vertex could not be transformed to WGS84 lon/lat.
    #[error("Reprojection failed: {message}")]
    Reprojection {
        /// Description of what went wrong.
        message: String,
    },

    /// Source location or format was not understood.
    #[error("Unsupported boundary source '{source_location}': {message}")]
    UnsupportedSource {
        /// The source as configured.
        source_location: String,
        /// Description of what went wrong.
        message: String,
    },
}

/// One feature of a boundary dataset: its name attribute and shape.
#[derive(Debug, Clone)]
pub struct NamedShape {
    /// Value of the name attribute, if present.
    pub name: Option<String>,
    /// Polygonal shape, or `None` for missing or non-polygonal geometry.
    pub shape: Option<BoundaryShape>,
}

/// File format of a boundary dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryFormat {
    /// Zip archive containing a shapefile.
    ZippedShapefile,
    /// `.shp` file with sibling `.dbf`/`.prj` (local paths only).
    Shapefile,
    /// `GeoJSON` `FeatureCollection`.
    GeoJson,
}

impl BoundaryFormat {
    /// Detects the format from a file name or URL path.
    #[must_use]
    pub fn detect(location: &str) -> Option<Self> {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or(location)
            .to_ascii_lowercase();
        if path.ends_with(".zip") {
            Some(Self::ZippedShapefile)
        } else if path.ends_with(".shp") {
            Some(Self::Shapefile)
        } else if path.ends_with(".geojson") || path.ends_with(".json") {
            Some(Self::GeoJson)
        } else {
            None
        }
    }
}

/// Where to load a boundary dataset from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundarySource {
    /// Remote dataset fetched over HTTP(S).
    Url(String),
    /// Local file.
    Path(PathBuf),
}

impl BoundarySource {
    /// Interprets a configured location: `http://`/`https://` prefixes are
    /// URLs, anything else is a local path.
    #[must_use]
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::Path(PathBuf::from(location))
        }
    }

    fn location(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Path(path) => path.display().to_string(),
        }
    }

    fn format(&self) -> Result<BoundaryFormat, BoundaryError> {
        BoundaryFormat::detect(&self.location()).ok_or_else(|| {
            BoundaryError::UnsupportedSource {
                source_location: self.location(),
                message: "expected a .zip, .shp, .geojson or .json file".to_string(),
            }
        })
    }
}

/// Loads every feature of a boundary dataset.
///
/// # Errors
///
/// Returns [`BoundaryError`] if the dataset cannot be fetched, read, or
/// parsed, or if its format is not supported for the given source kind.
pub async fn load_shapes(
    client: &reqwest::Client,
    source: &BoundarySource,
    name_field: &str,
) -> Result<Vec<NamedShape>, BoundaryError> {
    let format = source.format()?;
    log::info!("Loading boundaries from {}", source.location());

    match (source, format) {
        (BoundarySource::Url(url), BoundaryFormat::ZippedShapefile) => {
            let bytes = fetch_bytes(client, url).await?;
            shp::read_zipped(&bytes, name_field)
        }
        (BoundarySource::Url(url), BoundaryFormat::GeoJson) => {
            let bytes = fetch_bytes(client, url).await?;
            geojson_source::read_feature_collection(&String::from_utf8_lossy(&bytes), name_field)
        }
        (BoundarySource::Url(url), BoundaryFormat::Shapefile) => {
            Err(BoundaryError::UnsupportedSource {
                source_location: url.clone(),
                message: "a remote shapefile must be zipped together with its .dbf".to_string(),
            })
        }
        (BoundarySource::Path(path), BoundaryFormat::ZippedShapefile) => {
            shp::read_zipped(&std::fs::read(path)?, name_field)
        }
        (BoundarySource::Path(path), BoundaryFormat::Shapefile) => shp::read_path(path, name_field),
        (BoundarySource::Path(path), BoundaryFormat::GeoJson) => {
            geojson_source::read_feature_collection(&read_text(path)?, name_field)
        }
    }
}

/// Loads a dataset and selects one country from it.
///
/// # Errors
///
/// Returns [`BoundaryError`] if loading fails (see [`load_shapes`]). A
/// country that is not in the dataset is not an error; see
/// [`select_country`].
pub async fn load_country(
    client: &reqwest::Client,
    source: &BoundarySource,
    name_field: &str,
    country: &str,
) -> Result<CountryBoundary, BoundaryError> {
    let shapes = load_shapes(client, source, name_field).await?;
    log::info!("Loaded {} boundary features", shapes.len());
    Ok(select_country(shapes, country))
}

/// Selects the features whose name equals `country` and merges them into
/// one boundary.
///
/// Matching features with unusable geometry are skipped. When nothing
/// usable matches, the boundary has no shape and draws nothing.
#[must_use]
pub fn select_country(shapes: Vec<NamedShape>, country: &str) -> CountryBoundary {
    let country = country.trim();
    let mut matched = 0usize;
    let polygonal: Vec<BoundaryShape> = shapes
        .into_iter()
        .filter(|s| s.name.as_deref() == Some(country))
        .inspect(|_| matched += 1)
        .filter_map(|s| s.shape)
        .collect();

    if matched == 0 {
        log::warn!("Country '{country}' not found in boundary source");
    } else if polygonal.len() < matched {
        log::warn!(
            "Country '{country}': {} of {matched} features have no polygonal geometry",
            matched - polygonal.len()
        );
    }

    CountryBoundary::merge(country, polygonal)
}

async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, BoundaryError> {
    log::debug!("GET {url}");
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    log::debug!("  received {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

fn read_text(path: &Path) -> Result<String, BoundaryError> {
    Ok(std::fs::read_to_string(path)?)
}
