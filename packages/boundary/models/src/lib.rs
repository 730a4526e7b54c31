#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Country boundary shapes and drawable boundary rings.
//!
//! A [`CountryBoundary`] holds the polygonal extent of the selected country
//! as a closed [`BoundaryShape`] variant. Ring extraction turns it into
//! [`BoundaryRing`]s: exterior outlines only. Interior holes (enclaves) are
//! not drawn.

use geo::{Coord, Geometry, LineString, MultiPolygon, Polygon};

/// Legend group shared by every ring of a boundary.
pub const BOUNDARY_LEGEND_GROUP: &str = "boundary";

/// Polygonal shape of a boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryShape {
    /// A single polygon.
    Polygon(Polygon<f64>),
    /// Several disjoint polygons (mainland plus islands, exclaves).
    MultiPolygon(MultiPolygon<f64>),
}

impl BoundaryShape {
    /// Converts a generic geometry, keeping only polygonal kinds.
    ///
    /// Returns `None` for points, lines, and collections.
    #[must_use]
    pub fn from_geometry(geometry: Geometry<f64>) -> Option<Self> {
        match geometry {
            Geometry::Polygon(polygon) => Some(Self::Polygon(polygon)),
            Geometry::MultiPolygon(multi) => Some(Self::MultiPolygon(multi)),
            _ => None,
        }
    }

    /// Builds a shape from polygons, collapsing a single part to
    /// [`BoundaryShape::Polygon`].
    ///
    /// Returns `None` when there are no polygons.
    #[must_use]
    pub fn from_polygons(mut polygons: Vec<Polygon<f64>>) -> Option<Self> {
        match polygons.len() {
            0 => None,
            1 => polygons.pop().map(Self::Polygon),
            _ => Some(Self::MultiPolygon(MultiPolygon::new(polygons))),
        }
    }

    /// Consumes the shape and returns its polygons in order.
    #[must_use]
    pub fn into_polygons(self) -> Vec<Polygon<f64>> {
        match self {
            Self::Polygon(polygon) => vec![polygon],
            Self::MultiPolygon(multi) => multi.0,
        }
    }

    /// Geometry type name, as in `GeoJSON`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Polygon(_) => "Polygon",
            Self::MultiPolygon(_) => "MultiPolygon",
        }
    }
}

/// The selected country's polygonal extent.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryBoundary {
    /// Country name as it appears in the boundary source.
    pub name: String,
    /// Shape, or `None` if the source geometry was missing or not polygonal.
    pub shape: Option<BoundaryShape>,
}

impl CountryBoundary {
    /// Creates a boundary.
    #[must_use]
    pub fn new(name: impl Into<String>, shape: Option<BoundaryShape>) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }

    /// Merges the shapes of several source features of the same country
    /// into one boundary, preserving feature order.
    #[must_use]
    pub fn merge(name: impl Into<String>, shapes: Vec<BoundaryShape>) -> Self {
        let polygons = shapes
            .into_iter()
            .flat_map(BoundaryShape::into_polygons)
            .collect();
        Self::new(name, BoundaryShape::from_polygons(polygons))
    }
}

/// One closed exterior outline of a boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryRing {
    /// Vertices as `(lon, lat)`; first and last vertex are equal.
    pub coordinates: Vec<(f64, f64)>,
    /// Legend group shared by all rings of the boundary.
    pub legend_group: String,
    /// Whether this ring carries the boundary's legend entry.
    pub show_in_legend: bool,
}

impl BoundaryRing {
    /// Creates a ring from an exterior line string.
    #[must_use]
    pub fn from_exterior(exterior: &LineString<f64>, show_in_legend: bool) -> Self {
        let mut coordinates: Vec<(f64, f64)> =
            exterior.coords().map(|&Coord { x, y }| (x, y)).collect();
        if let (Some(&first), Some(&last)) = (coordinates.first(), coordinates.last())
            && first != last
        {
            coordinates.push(first);
        }
        Self {
            coordinates,
            legend_group: BOUNDARY_LEGEND_GROUP.to_string(),
            show_in_legend,
        }
    }

    /// Longitudes of the ring vertices.
    #[must_use]
    pub fn longitudes(&self) -> Vec<f64> {
        self.coordinates.iter().map(|&(lon, _)| lon).collect()
    }

    /// Latitudes of the ring vertices.
    #[must_use]
    pub fn latitudes(&self) -> Vec<f64> {
        self.coordinates.iter().map(|&(_, lat)| lat).collect()
    }
}
