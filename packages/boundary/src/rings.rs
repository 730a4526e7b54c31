//! Exterior ring extraction.
//!
//! Turns a [`CountryBoundary`] into the [`BoundaryRing`]s the composer draws
//! as filled outlines. Interior rings (holes) are never extracted.

use globe_map_boundary_models::{BoundaryRing, BoundaryShape, CountryBoundary};

/// Extracts one ring per polygon exterior, in the shape's polygon order.
///
/// Only the first ring is legend-bearing; the rest share its legend group
/// but stay out of the legend so the boundary has a single entry. A
/// boundary without a shape, or whose polygons all have empty exteriors,
/// yields no rings.
#[must_use]
pub fn extract_rings(boundary: &CountryBoundary) -> Vec<BoundaryRing> {
    let Some(shape) = &boundary.shape else {
        log::warn!(
            "Boundary '{}' has no polygonal shape, drawing no outline",
            boundary.name
        );
        return Vec::new();
    };

    let exteriors: Vec<_> = match shape {
        BoundaryShape::Polygon(polygon) => vec![polygon.exterior()],
        BoundaryShape::MultiPolygon(multi) => multi.iter().map(|p| p.exterior()).collect(),
    };

    let rings: Vec<BoundaryRing> = exteriors
        .into_iter()
        .filter(|exterior| !exterior.0.is_empty())
        .enumerate()
        .map(|(i, exterior)| BoundaryRing::from_exterior(exterior, i == 0))
        .collect();

    if rings.is_empty() {
        log::warn!(
            "Boundary '{}' ({}) has no non-empty exterior rings",
            boundary.name,
            shape.kind()
        );
    } else {
        log::debug!(
            "Boundary '{}' ({}): {} ring(s)",
            boundary.name,
            shape.kind(),
            rings.len()
        );
    }

    rings
}

#[cfg(test)]
mod tests {
    use geo::{LineString, MultiPolygon, Polygon, polygon};
    use globe_map_boundary_models::BOUNDARY_LEGEND_GROUP;

    use super::*;

    fn square(offset: f64) -> Polygon<f64> {
        polygon![
            (x: offset, y: 0.0),
            (x: offset + 1.0, y: 0.0),
            (x: offset + 1.0, y: 1.0),
            (x: offset, y: 1.0),
        ]
    }

    fn square_with_hole() -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]),
            vec![LineString::from(vec![
                (4.0, 4.0),
                (6.0, 4.0),
                (6.0, 6.0),
                (4.0, 6.0),
            ])],
        )
    }

    #[test]
    fn polygon_yields_one_legend_ring() {
        let boundary = CountryBoundary::new("India", Some(BoundaryShape::Polygon(square(0.0))));
        let rings = extract_rings(&boundary);
        assert_eq!(rings.len(), 1);
        assert!(rings[0].show_in_legend);
        assert_eq!(rings[0].coordinates.len(), 5);
    }

    #[test]
    fn multipolygon_yields_one_ring_per_part() {
        let multi = MultiPolygon::new(vec![square(0.0), square(2.0)]);
        let boundary = CountryBoundary::new("India", Some(BoundaryShape::MultiPolygon(multi)));
        let rings = extract_rings(&boundary);
        assert_eq!(rings.len(), 2);
        assert!(rings[0].show_in_legend);
        assert!(!rings[1].show_in_legend);
        assert!((rings[1].coordinates[0].0 - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn multipolygon_rings_share_one_legend_group() {
        let parts = (0..5).map(|i| square(f64::from(i) * 2.0)).collect();
        let boundary = CountryBoundary::new(
            "India",
            Some(BoundaryShape::MultiPolygon(MultiPolygon::new(parts))),
        );
        let rings = extract_rings(&boundary);
        assert_eq!(rings.len(), 5);
        assert_eq!(rings.iter().filter(|r| r.show_in_legend).count(), 1);
        assert!(rings.iter().all(|r| r.legend_group == BOUNDARY_LEGEND_GROUP));
    }

    #[test]
    fn holes_never_become_rings() {
        let boundary =
            CountryBoundary::new("India", Some(BoundaryShape::Polygon(square_with_hole())));
        let rings = extract_rings(&boundary);
        assert_eq!(rings.len(), 1);
        assert!(
            rings[0]
                .coordinates
                .iter()
                .all(|&(x, _)| x.abs() < f64::EPSILON || (x - 10.0).abs() < f64::EPSILON)
        );
    }

    #[test]
    fn missing_shape_yields_no_rings() {
        let boundary = CountryBoundary::new("Atlantis", None);
        assert!(extract_rings(&boundary).is_empty());
    }

    #[test]
    fn empty_multipolygon_yields_no_rings() {
        let boundary = CountryBoundary::new(
            "India",
            Some(BoundaryShape::MultiPolygon(MultiPolygon::new(Vec::new()))),
        );
        assert!(extract_rings(&boundary).is_empty());
    }

    #[test]
    fn legend_ring_skips_empty_leading_part() {
        let empty = Polygon::new(LineString::new(Vec::new()), Vec::new());
        let multi = MultiPolygon::new(vec![empty, square(3.0)]);
        let boundary = CountryBoundary::new("India", Some(BoundaryShape::MultiPolygon(multi)));
        let rings = extract_rings(&boundary);
        assert_eq!(rings.len(), 1);
        assert!(rings[0].show_in_legend);
    }
}
