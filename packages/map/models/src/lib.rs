#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Renderer-agnostic map layer types.
//!
//! A [`LayerSpec`] describes one drawable layer (a boundary ring, a dataset
//! of observation points, or a labelled city marker) with its style, legend
//! identity, and hover template. Renderers turn an ordered list of them plus
//! a [`FigureLayout`] into a concrete figure.

use globe_map_observation_models::Protocol;
use serde::Deserialize;
use strum_macros::{Display, EnumString};

/// Decimal digits used for coordinates in hover text.
pub const HOVER_COORDINATE_PRECISION: u8 = 4;

/// Where a label is drawn relative to its marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Display, EnumString)]
pub enum TextAnchor {
    /// Above and to the left of the marker.
    #[serde(rename = "top left")]
    #[strum(serialize = "top left")]
    TopLeft,
    /// Directly above the marker.
    #[serde(rename = "top center")]
    #[strum(serialize = "top center")]
    TopCenter,
    /// Above and to the right of the marker.
    #[serde(rename = "top right")]
    #[strum(serialize = "top right")]
    TopRight,
    /// Left of the marker, vertically centred.
    #[serde(rename = "middle left")]
    #[strum(serialize = "middle left")]
    MiddleLeft,
    /// Centred on the marker.
    #[serde(rename = "middle center")]
    #[strum(serialize = "middle center")]
    MiddleCenter,
    /// Right of the marker, vertically centred.
    #[serde(rename = "middle right")]
    #[strum(serialize = "middle right")]
    MiddleRight,
    /// Below and to the left of the marker.
    #[serde(rename = "bottom left")]
    #[strum(serialize = "bottom left")]
    BottomLeft,
    /// Directly below the marker.
    #[serde(rename = "bottom center")]
    #[strum(serialize = "bottom center")]
    BottomCenter,
    /// Below and to the right of the marker.
    #[serde(rename = "bottom right")]
    #[strum(serialize = "bottom right")]
    BottomRight,
}

/// A static, labelled reference point.
///
/// The label anchor is hand-picked per city so neighbouring labels do not
/// collide; it is never computed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CityMarker {
    /// City name, used as the label text.
    pub name: String,
    /// Position as `(lon, lat)`.
    pub coordinate: (f64, f64),
    /// Label placement relative to the marker.
    pub label_anchor: TextAnchor,
}

impl CityMarker {
    /// Creates a marker.
    #[must_use]
    pub fn new(name: impl Into<String>, coordinate: (f64, f64), label_anchor: TextAnchor) -> Self {
        Self {
            name: name.into(),
            coordinate,
            label_anchor,
        }
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.coordinate.0
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.coordinate.1
    }
}

/// What a layer represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// One exterior ring of the country boundary.
    Boundary,
    /// Every record of one protocol's dataset.
    Dataset(Protocol),
    /// One city marker with its label.
    CityLabel,
}

/// Filled outline style.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineStyle {
    /// Outline colour.
    pub line_color: String,
    /// Outline width in pixels.
    pub line_width: f64,
    /// Colour the enclosed area is filled with.
    pub fill_color: String,
}

/// Scatter marker style.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    /// Marker diameter in pixels.
    pub size: f64,
    /// Fill colour.
    pub color: String,
    /// Fill opacity, `0.0` to `1.0`.
    pub opacity: f64,
    /// Colour of the marker's rim.
    pub outline_color: String,
    /// Width of the marker's rim in pixels.
    pub outline_width: f64,
    /// Marker symbol name; `None` leaves the renderer default.
    pub symbol: Option<String>,
}

/// Font used for label text.
#[derive(Debug, Clone, PartialEq)]
pub struct FontStyle {
    /// Point size.
    pub size: f64,
    /// Text colour.
    pub color: String,
    /// Font family name (e.g. `"Arial Black"`).
    pub family: String,
}

/// Marker-plus-text label style.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    /// Style of the dot under the label.
    pub marker: MarkerStyle,
    /// Style of the label text.
    pub font: FontStyle,
}

/// Visual style of a layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerStyle {
    /// Closed line with a filled interior (boundary rings).
    Outline(OutlineStyle),
    /// Unlabelled scatter markers (observation datasets).
    Markers(MarkerStyle),
    /// Markers with text beside them (city labels).
    Label(LabelStyle),
}

/// Hover text shown for a point: a bold title followed by the point's
/// latitude and longitude at a fixed precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverTemplate {
    /// First line, shown in bold.
    pub title: String,
    /// Decimal digits of the latitude and longitude lines.
    pub precision: u8,
}

impl HoverTemplate {
    /// Creates a template with the standard coordinate precision.
    #[must_use]
    pub fn coordinates(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            precision: HOVER_COORDINATE_PRECISION,
        }
    }
}

/// One drawable layer, in renderer-agnostic form.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    /// What the layer represents.
    pub kind: LayerKind,
    /// Legend and trace name.
    pub name: String,
    /// Longitudes.
    pub x: Vec<f64>,
    /// Latitudes.
    pub y: Vec<f64>,
    /// Per-point label text; empty for unlabelled layers.
    pub text: Vec<String>,
    /// How the layer is drawn.
    pub style: LayerStyle,
    /// Layers sharing a group toggle together under one legend entry.
    pub legend_group: Option<String>,
    /// Whether the layer has its own legend entry.
    pub show_in_legend: bool,
    /// `None` disables hover for the layer.
    pub hover: Option<HoverTemplate>,
    /// Label placement; only set for labelled layers.
    pub text_anchor: Option<TextAnchor>,
}

impl LayerSpec {
    /// Number of points in the layer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the layer has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Figure-level layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureLayout {
    /// Figure title.
    pub title: String,
    /// Font of the title.
    pub title_font: FontStyle,
    /// Horizontal axis title.
    pub x_axis_title: String,
    /// Vertical axis title.
    pub y_axis_title: String,
    /// Figure width in pixels.
    pub width: u32,
    /// Figure height in pixels.
    pub height: u32,
    /// Legend anchor in paper coordinates; the legend's top-left corner.
    pub legend_position: (f64, f64),
    /// Legend box fill colour.
    pub legend_background: String,
    /// Legend box border colour.
    pub legend_border_color: String,
    /// Colour of the plotting area.
    pub plot_background: String,
    /// Colour of the axis grid lines.
    pub grid_color: String,
    /// Keep one degree of latitude as tall as one degree of longitude is wide.
    pub equal_aspect: bool,
}

impl FigureLayout {
    /// Default layout for a country map covering the given year range.
    #[must_use]
    pub fn for_country(country: &str, start_year: i32, end_year: i32) -> Self {
        Self {
            title: format!(
                "Factors Influencing Mosquito Distribution Across {country} ({start_year}-{end_year})"
            ),
            ..Self::default()
        }
    }
}

impl Default for FigureLayout {
    fn default() -> Self {
        Self {
            title: String::new(),
            title_font: FontStyle {
                size: 18.0,
                color: "black".to_string(),
                family: "Arial Black".to_string(),
            },
            x_axis_title: "Longitude".to_string(),
            y_axis_title: "Latitude".to_string(),
            width: 1200,
            height: 900,
            legend_position: (0.01, 0.99),
            legend_background: "rgba(255, 255, 255, 0.8)".to_string(),
            legend_border_color: "black".to_string(),
            plot_background: "white".to_string(),
            grid_color: "lightgray".to_string(),
            equal_aspect: true,
        }
    }
}
