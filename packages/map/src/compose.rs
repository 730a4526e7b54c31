//! Layer composition.
//!
//! Merges boundary rings, observation datasets, and city markers into one
//! ordered layer list: boundary rings first, then one layer per non-empty
//! dataset in [`Protocol`] order, then city labels on top.

use globe_map_boundary_models::BoundaryRing;
use globe_map_map_models::{
    CityMarker, FontStyle, HoverTemplate, LabelStyle, LayerKind, LayerSpec, LayerStyle,
    MarkerStyle, OutlineStyle,
};
use globe_map_observation_models::{ObservationDataset, Protocol};

/// Marker fill and outline colour of a protocol's points.
#[must_use]
pub const fn protocol_colors(protocol: Protocol) -> (&'static str, &'static str) {
    match protocol {
        Protocol::SurfaceTemperatures => ("orange", "darkorange"),
        Protocol::Humidities => ("blue", "darkblue"),
        Protocol::MosquitoHabitatMapper => ("red", "darkred"),
        Protocol::Precipitations => ("purple", "indigo"),
    }
}

/// Composes the full layer list.
///
/// Output depends only on the inputs. Datasets are emitted in protocol
/// order whatever order they are passed in; several datasets of the same
/// protocol become one layer with their records in input order.
#[must_use]
pub fn compose(
    country: &str,
    rings: &[BoundaryRing],
    datasets: &[ObservationDataset],
    cities: &[CityMarker],
) -> Vec<LayerSpec> {
    let mut layers: Vec<LayerSpec> = rings
        .iter()
        .map(|ring| boundary_layer(country, ring))
        .collect();

    for &protocol in Protocol::ALL {
        if let Some(layer) = dataset_layer(
            protocol,
            datasets.iter().filter(|d| d.protocol == protocol),
        ) {
            layers.push(layer);
        }
    }

    layers.extend(cities.iter().map(city_layer));

    log::debug!(
        "Composed {} layers ({} boundary, {} city)",
        layers.len(),
        rings.len(),
        cities.len()
    );

    layers
}

fn boundary_layer(country: &str, ring: &BoundaryRing) -> LayerSpec {
    LayerSpec {
        kind: LayerKind::Boundary,
        name: format!("{country} Boundary"),
        x: ring.longitudes(),
        y: ring.latitudes(),
        text: Vec::new(),
        style: LayerStyle::Outline(OutlineStyle {
            line_color: "black".to_string(),
            line_width: 2.0,
            fill_color: "lightgray".to_string(),
        }),
        legend_group: Some(ring.legend_group.clone()),
        show_in_legend: ring.show_in_legend,
        hover: None,
        text_anchor: None,
    }
}

/// Builds the layer for one protocol, or `None` when it has no records.
fn dataset_layer<'a>(
    protocol: Protocol,
    datasets: impl Iterator<Item = &'a ObservationDataset>,
) -> Option<LayerSpec> {
    let (mut x, mut y) = (Vec::new(), Vec::new());
    for dataset in datasets {
        x.extend(dataset.longitudes());
        y.extend(dataset.latitudes());
    }
    if x.is_empty() {
        log::debug!("{protocol}: no records, skipping layer");
        return None;
    }

    let (color, outline_color) = protocol_colors(protocol);
    Some(LayerSpec {
        kind: LayerKind::Dataset(protocol),
        name: protocol.display_name().to_string(),
        x,
        y,
        text: Vec::new(),
        style: LayerStyle::Markers(MarkerStyle {
            size: 8.0,
            color: color.to_string(),
            opacity: 0.6,
            outline_color: outline_color.to_string(),
            outline_width: 0.5,
            symbol: None,
        }),
        legend_group: Some(protocol.legend_group().to_string()),
        show_in_legend: true,
        hover: Some(HoverTemplate::coordinates(protocol.display_name())),
        text_anchor: None,
    })
}

fn city_layer(city: &CityMarker) -> LayerSpec {
    LayerSpec {
        kind: LayerKind::CityLabel,
        name: city.name.clone(),
        x: vec![city.longitude()],
        y: vec![city.latitude()],
        text: vec![city.name.clone()],
        style: LayerStyle::Label(LabelStyle {
            marker: MarkerStyle {
                size: 8.0,
                color: "black".to_string(),
                opacity: 1.0,
                outline_color: "white".to_string(),
                outline_width: 1.0,
                symbol: Some("circle".to_string()),
            },
            font: FontStyle {
                size: 12.0,
                color: "black".to_string(),
                family: "Arial Black".to_string(),
            },
        }),
        legend_group: None,
        show_in_legend: false,
        hover: Some(HoverTemplate::coordinates(city.name.clone())),
        text_anchor: Some(city.label_anchor),
    }
}
