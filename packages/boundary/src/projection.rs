//! Reprojection of shapefile boundaries to WGS84 lon/lat.
//!
//! A shapefile's `.prj` holds its CRS as WKT. The WKT is reduced to a
//! PROJ.4 definition and every vertex is transformed with `proj4rs` to
//! `+proj=longlat +datum=WGS84`. Sources already in WGS84 lon/lat need no
//! transform.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use geo::{Coord, MapCoords as _};
use globe_map_boundary_models::BoundaryShape;
use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::BoundaryError;

/// PROJ.4 definition every boundary is converted to.
pub const WGS84_LONLAT: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// Transform from a source CRS to WGS84 lon/lat.
pub struct Reprojection {
    name: String,
    definition: String,
    geographic: bool,
    source: Proj,
    target: Proj,
}

impl std::fmt::Debug for Reprojection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reprojection")
            .field("name", &self.name)
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

impl Reprojection {
    /// Builds the transform described by a `.prj` WKT.
    ///
    /// Returns `None` when the CRS already is WGS84 lon/lat.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::UnsupportedProjection`] if the WKT is
    /// malformed or names a projection, datum or unit that cannot be
    /// converted.
    pub fn from_prj(wkt: &str) -> Result<Option<Self>, BoundaryError> {
        let root = WktNode::parse(wkt).map_err(|message| BoundaryError::UnsupportedProjection {
            name: "unparseable .prj".to_string(),
            message,
        })?;
        let name = root.name().unwrap_or("unnamed CRS").to_string();
        let unsupported = |message: String| BoundaryError::UnsupportedProjection {
            name: name.clone(),
            message,
        };

        let (definition, geographic) = match root.keyword.as_str() {
            "GEOGCS" => {
                let geographic = geographic_parameters(&root).map_err(unsupported)?;
                if geographic.is_wgs84() {
                    return Ok(None);
                }
                (format!("+proj=longlat {} +no_defs", geographic.proj()), true)
            }
            "PROJCS" => (projected_definition(&root).map_err(unsupported)?, false),
            other => return Err(unsupported(format!("unsupported WKT root '{other}'"))),
        };

        Self::new(name, definition, geographic).map(Some)
    }

    fn new(name: String, definition: String, geographic: bool) -> Result<Self, BoundaryError> {
        let build = |text: &str| {
            Proj::from_proj_string(text).map_err(|e| BoundaryError::UnsupportedProjection {
                name: name.clone(),
                message: format!("{text}: {e}"),
            })
        };
        let source = build(&definition)?;
        let target = build(WGS84_LONLAT)?;
        log::info!("Reprojecting boundary from '{name}' ({definition}) to WGS84");
        Ok(Self {
            name,
            definition,
            geographic,
            source,
            target,
        })
    }

    /// Name of the source CRS.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// PROJ.4 definition of the source CRS.
    #[must_use]
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Transforms one vertex to `(lon, lat)` degrees.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::Reprojection`] if the vertex lies outside
    /// the projection's domain.
    pub fn transform_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>, BoundaryError> {
        let mut point = if self.geographic {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };
        transform(&self.source, &self.target, &mut point).map_err(|e| {
            BoundaryError::Reprojection {
                message: format!("({}, {}) from '{}': {e}", coord.x, coord.y, self.name),
            }
        })?;
        Ok(Coord {
            x: point.0.to_degrees(),
            y: point.1.to_degrees(),
        })
    }

    /// Transforms every vertex of a shape.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::Reprojection`] on the first vertex that
    /// cannot be transformed.
    pub fn apply(&self, shape: &BoundaryShape) -> Result<BoundaryShape, BoundaryError> {
        let convert = |coord| self.transform_coord(coord);
        Ok(match shape {
            BoundaryShape::Polygon(polygon) => {
                BoundaryShape::Polygon(polygon.try_map_coords(convert)?)
            }
            BoundaryShape::MultiPolygon(multi) => {
                BoundaryShape::MultiPolygon(multi.try_map_coords(convert)?)
            }
        })
    }
}

/// Datum and prime meridian of a `GEOGCS`.
#[derive(Debug, Clone, PartialEq)]
struct Geographic {
    datum: Datum,
    prime_meridian: f64,
}

#[derive(Debug, Clone, PartialEq)]
enum Datum {
    Wgs84,
    Grs80,
    Custom {
        semi_major: f64,
        inverse_flattening: f64,
        to_wgs84: Vec<f64>,
    },
}

impl Geographic {
    fn is_wgs84(&self) -> bool {
        matches!(self.datum, Datum::Wgs84) && self.prime_meridian.abs() < f64::EPSILON
    }

    fn proj(&self) -> String {
        let mut proj = match &self.datum {
            Datum::Wgs84 => "+datum=WGS84".to_string(),
            Datum::Grs80 => "+ellps=GRS80 +towgs84=0,0,0".to_string(),
            Datum::Custom {
                semi_major,
                inverse_flattening,
                to_wgs84,
            } => {
                let shape = if inverse_flattening.abs() < f64::EPSILON {
                    format!("+a={semi_major} +b={semi_major}")
                } else {
                    format!("+a={semi_major} +rf={inverse_flattening}")
                };
                let shift: Vec<String> = to_wgs84.iter().map(f64::to_string).collect();
                format!("{shape} +towgs84={}", shift.join(","))
            }
        };
        if self.prime_meridian.abs() >= f64::EPSILON {
            proj = format!("{proj} +pm={}", self.prime_meridian);
        }
        proj
    }
}

fn geographic_parameters(geogcs: &WktNode) -> Result<Geographic, String> {
    if let Some(factor) = geogcs.child("UNIT").and_then(|unit| unit.number(0))
        && (factor - PI / 180.0).abs() > 1e-12
    {
        return Err(format!("angular unit {factor} is not degrees"));
    }

    let datum_node = geogcs
        .child("DATUM")
        .ok_or_else(|| "GEOGCS has no DATUM".to_string())?;
    let datum_name = normalize(datum_node.name().unwrap_or_default());

    let datum = if datum_name.contains("wgs1984") || datum_name.contains("wgs84") {
        Datum::Wgs84
    } else if GRS80_DATUMS.iter().any(|known| datum_name.contains(known)) {
        Datum::Grs80
    } else {
        let spheroid = datum_node
            .child("SPHEROID")
            .or_else(|| datum_node.child("ELLIPSOID"));
        let to_wgs84: Vec<f64> = datum_node
            .child("TOWGS84")
            .map(|node| node.numbers().collect())
            .unwrap_or_default();
        match (spheroid.and_then(|s| s.number(0)), spheroid.and_then(|s| s.number(1))) {
            (Some(semi_major), Some(inverse_flattening)) if !to_wgs84.is_empty() => {
                Datum::Custom {
                    semi_major,
                    inverse_flattening,
                    to_wgs84,
                }
            }
            _ => {
                return Err(format!(
                    "datum '{}' has no known WGS84 shift",
                    datum_node.name().unwrap_or("unnamed")
                ));
            }
        }
    };

    Ok(Geographic {
        datum,
        prime_meridian: geogcs
            .child("PRIMEM")
            .and_then(|primem| primem.number(0))
            .unwrap_or(0.0),
    })
}

/// Datums on the GRS80 ellipsoid that coincide with WGS84 at map scale.
const GRS80_DATUMS: &[&str] = &[
    "northamerican1983",
    "nad83",
    "etrs1989",
    "europeanterrestrialreferencesystem1989",
    "etrs89",
    "geocentricdatumofaustralia1994",
    "gda94",
    "newzealandgeodeticdatum2000",
    "nzgd2000",
    "sirgas2000",
];

fn projected_definition(projcs: &WktNode) -> Result<String, String> {
    let geogcs = projcs
        .child("GEOGCS")
        .ok_or_else(|| "PROJCS has no GEOGCS".to_string())?;
    let method = normalize(
        projcs
            .child("PROJECTION")
            .and_then(WktNode::name)
            .ok_or_else(|| "PROJCS has no PROJECTION".to_string())?,
    );

    let parameters: BTreeMap<String, f64> = projcs
        .children("PARAMETER")
        .filter_map(|p| Some((normalize(p.name()?), p.number(0)?)))
        .collect();
    let param = |keys: &[&str], default: f64| {
        keys.iter()
            .find_map(|key| parameters.get(*key).copied())
            .unwrap_or(default)
    };

    let to_meter = projcs
        .child("UNIT")
        .and_then(|unit| unit.number(0))
        .unwrap_or(1.0);
    let lat_0 = param(&["latitudeoforigin", "latitudeofcenter"], 0.0);
    let lon_0 = param(&["centralmeridian", "longitudeofcenter"], 0.0);
    let k = param(&["scalefactor"], 1.0);
    let lat_1 = param(&["standardparallel1"], lat_0);
    let lat_2 = param(&["standardparallel2"], lat_1);

    let false_origin = format!(
        "+x_0={} +y_0={}",
        param(&["falseeasting"], 0.0) * to_meter,
        param(&["falsenorthing"], 0.0) * to_meter
    );

    let crs_name = normalize(projcs.name().unwrap_or_default());
    if WEB_MERCATOR_NAMES
        .iter()
        .any(|known| method == *known || crs_name.contains(known))
    {
        // Spherical formulas applied to WGS84 lon/lat, no datum shift.
        return Ok(format!(
            "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0={lon_0} +k=1 {false_origin} {} +no_defs",
            units(to_meter)
        ));
    }

    let projection = match method.as_str() {
        "transversemercator" | "gausskruger" => {
            format!("+proj=tmerc +lat_0={lat_0} +lon_0={lon_0} +k={k}")
        }
        "mercator" | "mercator1sp" | "mercatorvarianta" | "mercator2sp" | "mercatorvariantb" => {
            match parameters.get("standardparallel1") {
                Some(lat_ts) => format!("+proj=merc +lon_0={lon_0} +lat_ts={lat_ts}"),
                None => format!("+proj=merc +lon_0={lon_0} +k={k}"),
            }
        }
        "lambertconformalconic" | "lambertconformalconic1sp" | "lambertconformalconic2sp" => {
            format!("+proj=lcc +lat_1={lat_1} +lat_2={lat_2} +lat_0={lat_0} +lon_0={lon_0} +k={k}")
        }
        "albers" | "albersconicequalarea" => {
            format!("+proj=aea +lat_1={lat_1} +lat_2={lat_2} +lat_0={lat_0} +lon_0={lon_0}")
        }
        "lambertazimuthalequalarea" => format!("+proj=laea +lat_0={lat_0} +lon_0={lon_0}"),
        "equirectangular" | "equidistantcylindrical" | "platecarree" => {
            format!("+proj=eqc +lat_ts={lat_1} +lat_0={lat_0} +lon_0={lon_0}")
        }
        other => return Err(format!("projection method '{other}' is not supported")),
    };

    let geographic = geographic_parameters(geogcs)?;
    Ok(format!(
        "{projection} {false_origin} {} {} +no_defs",
        geographic.proj(),
        units(to_meter)
    ))
}

/// Method or CRS names of the spherical "Web Mercator" projection.
const WEB_MERCATOR_NAMES: &[&str] = &[
    "mercatorauxiliarysphere",
    "popularvisualisationpseudomercator",
    "pseudomercator",
    "webmercator",
];

fn units(to_meter: f64) -> String {
    if (to_meter - 1.0).abs() < 1e-12 {
        "+units=m".to_string()
    } else {
        format!("+to_meter={to_meter}")
    }
}

/// Lowercase with everything but letters and digits removed, so ESRI and
/// OGC spellings (`Central_Meridian`, `central meridian`) compare equal.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// One `KEYWORD[...]` element of a WKT CRS.
#[derive(Debug, Clone, PartialEq)]
struct WktNode {
    keyword: String,
    values: Vec<WktValue>,
}

#[derive(Debug, Clone, PartialEq)]
enum WktValue {
    Text(String),
    Number(f64),
    Node(WktNode),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    Comma,
    Quoted(String),
    Word(String),
}

impl WktNode {
    fn parse(text: &str) -> Result<Self, String> {
        let tokens = tokenize(text)?;
        let mut position = 0;
        let node = parse_node(&tokens, &mut position)?;
        if position != tokens.len() {
            return Err("trailing content after WKT".to_string());
        }
        Ok(node)
    }

    /// First quoted value, the element's name.
    fn name(&self) -> Option<&str> {
        self.values.iter().find_map(|value| match value {
            WktValue::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }

    fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(|value| match value {
            WktValue::Number(n) => Some(*n),
            _ => None,
        })
    }

    fn number(&self, index: usize) -> Option<f64> {
        self.numbers().nth(index)
    }

    fn children<'a>(&'a self, keyword: &str) -> impl Iterator<Item = &'a Self> {
        self.values.iter().filter_map(move |value| match value {
            WktValue::Node(node) if node.keyword.eq_ignore_ascii_case(keyword) => Some(node),
            _ => None,
        })
    }

    fn child(&self, keyword: &str) -> Option<&Self> {
        self.children(keyword).next()
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '[' | '(' => tokens.push(Token::Open),
            ']' | ')' => tokens.push(Token::Close),
            ',' => tokens.push(Token::Comma),
            '"' => {
                let mut quoted = String::new();
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                            quoted.push('"');
                        }
                        Some('"') => break,
                        Some(c) => quoted.push(c),
                        None => return Err("unterminated string in WKT".to_string()),
                    }
                }
                tokens.push(Token::Quoted(quoted));
            }
            c if c.is_whitespace() => {}
            c => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if matches!(next, '[' | '(' | ']' | ')' | ',' | '"') || next.is_whitespace() {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
        }
    }

    Ok(tokens)
}

fn parse_node(tokens: &[Token], position: &mut usize) -> Result<WktNode, String> {
    let Some(Token::Word(keyword)) = tokens.get(*position) else {
        return Err("expected a WKT keyword".to_string());
    };
    *position += 1;
    if tokens.get(*position) != Some(&Token::Open) {
        return Err(format!("expected '[' after {keyword}"));
    }
    *position += 1;

    let mut values = Vec::new();
    loop {
        let value = match tokens.get(*position) {
            Some(Token::Quoted(text)) => {
                *position += 1;
                WktValue::Text(text.clone())
            }
            Some(Token::Word(word)) => {
                if tokens.get(*position + 1) == Some(&Token::Open) {
                    WktValue::Node(parse_node(tokens, position)?)
                } else {
                    *position += 1;
                    word.parse::<f64>()
                        .map_or_else(|_| WktValue::Text(word.clone()), WktValue::Number)
                }
            }
            Some(Token::Close) if values.is_empty() => {
                *position += 1;
                break;
            }
            _ => return Err(format!("malformed {keyword} element")),
        };
        values.push(value);

        match tokens.get(*position) {
            Some(Token::Comma) => *position += 1,
            Some(Token::Close) => {
                *position += 1;
                break;
            }
            _ => return Err(format!("unterminated {keyword} element")),
        }
    }

    Ok(WktNode {
        keyword: keyword.to_ascii_uppercase(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use geo::polygon;

    use super::*;

    const WGS84_GEOGCS: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

    const UTM_43N: &str = r#"PROJCS["WGS_1984_UTM_Zone_43N",GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["False_Easting",500000.0],PARAMETER["False_Northing",0.0],PARAMETER["Central_Meridian",75.0],PARAMETER["Scale_Factor",0.9996],PARAMETER["Latitude_Of_Origin",0.0],UNIT["Meter",1.0]]"#;

    const WEB_MERCATOR: &str = r#"PROJCS["WGS 84 / Pseudo-Mercator",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]],PROJECTION["Mercator_1SP"],PARAMETER["central_meridian",0],PARAMETER["scale_factor",1],PARAMETER["false_easting",0],PARAMETER["false_northing",0],UNIT["metre",1,AUTHORITY["EPSG","9001"]],AXIS["Easting",EAST],AXIS["Northing",NORTH],EXTENSION["PROJ4","+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +nadgrids=@null +wktext +no_defs"],AUTHORITY["EPSG","3857"]]"#;

    const ESRI_WEB_MERCATOR: &str = r#"PROJCS["WGS_1984_Web_Mercator_Auxiliary_Sphere",GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Mercator_Auxiliary_Sphere"],PARAMETER["False_Easting",0.0],PARAMETER["False_Northing",0.0],PARAMETER["Central_Meridian",0.0],PARAMETER["Standard_Parallel_1",0.0],PARAMETER["Auxiliary_Sphere_Type",0.0],UNIT["Meter",1.0]]"#;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "{actual} differs from {expected} by more than {tolerance}"
        );
    }

    #[test]
    fn parses_nested_wkt() {
        let root = WktNode::parse(UTM_43N).unwrap();
        assert_eq!(root.keyword, "PROJCS");
        assert_eq!(root.name(), Some("WGS_1984_UTM_Zone_43N"));
        let spheroid = root.child("GEOGCS").unwrap().child("DATUM").unwrap().child("SPHEROID");
        assert_eq!(spheroid.unwrap().number(1), Some(298.257_223_563));
        assert_eq!(root.children("PARAMETER").count(), 5);
    }

    #[test]
    fn parses_bare_words_and_escaped_quotes() {
        let root = WktNode::parse(r#"AXIS["say ""north""",NORTH]"#).unwrap();
        assert_eq!(root.name(), Some(r#"say "north""#));
        assert_eq!(root.values[1], WktValue::Text("NORTH".to_string()));
    }

    #[test]
    fn rejects_malformed_wkt() {
        assert!(WktNode::parse(r#"GEOGCS["unterminated"#).is_err());
        assert!(WktNode::parse("GEOGCS[").is_err());
        assert!(matches!(
            Reprojection::from_prj("not wkt at all"),
            Err(BoundaryError::UnsupportedProjection { .. })
        ));
    }

    #[test]
    fn wgs84_lon_lat_needs_no_transform() {
        assert!(Reprojection::from_prj(WGS84_GEOGCS).unwrap().is_none());
    }

    #[test]
    fn utm_definition_carries_zone_parameters() {
        let reprojection = Reprojection::from_prj(UTM_43N).unwrap().unwrap();
        assert_eq!(reprojection.name(), "WGS_1984_UTM_Zone_43N");
        let definition = reprojection.definition();
        assert!(definition.starts_with("+proj=tmerc +lat_0=0 +lon_0=75 +k=0.9996"));
        assert!(definition.contains("+x_0=500000 +y_0=0"));
        assert!(definition.contains("+datum=WGS84"));
        assert!(definition.contains("+units=m"));
    }

    #[test]
    fn utm_coordinates_become_lon_lat() {
        let reprojection = Reprojection::from_prj(UTM_43N).unwrap().unwrap();

        let origin = reprojection
            .transform_coord(Coord {
                x: 500_000.0,
                y: 0.0,
            })
            .unwrap();
        assert_close(origin.x, 75.0, 1e-6);
        assert_close(origin.y, 0.0, 1e-6);

        let east = reprojection
            .transform_coord(Coord {
                x: 600_000.0,
                y: 0.0,
            })
            .unwrap();
        assert!(east.x > 75.8 && east.x < 76.0, "longitude {}", east.x);
        assert_close(east.y, 0.0, 1e-6);

        let north = reprojection
            .transform_coord(Coord {
                x: 500_000.0,
                y: 2_100_000.0,
            })
            .unwrap();
        assert_close(north.x, 75.0, 1e-6);
        assert!(north.y > 18.9 && north.y < 19.1, "latitude {}", north.y);
    }

    #[test]
    fn web_mercator_variants_become_lon_lat() {
        let radius = 6_378_137.0_f64;
        let y = radius * (PI / 4.0 + 45.0_f64.to_radians() / 2.0).tan().ln();
        for wkt in [WEB_MERCATOR, ESRI_WEB_MERCATOR] {
            let reprojection = Reprojection::from_prj(wkt).unwrap().unwrap();
            let coord = reprojection
                .transform_coord(Coord {
                    x: radius * PI / 2.0,
                    y,
                })
                .unwrap();
            assert_close(coord.x, 90.0, 1e-6);
            assert_close(coord.y, 45.0, 1e-6);
        }
    }

    #[test]
    fn reprojects_every_vertex_of_a_shape() {
        let reprojection = Reprojection::from_prj(UTM_43N).unwrap().unwrap();
        let shape = BoundaryShape::Polygon(polygon![
            (x: 400_000.0, y: 1_000_000.0),
            (x: 600_000.0, y: 1_000_000.0),
            (x: 600_000.0, y: 3_000_000.0),
            (x: 400_000.0, y: 3_000_000.0),
        ]);
        let BoundaryShape::Polygon(polygon) = reprojection.apply(&shape).unwrap() else {
            panic!("expected a polygon");
        };
        for coord in polygon.exterior().coords() {
            assert!(coord.x > 73.0 && coord.x < 77.0, "longitude {}", coord.x);
            assert!(coord.y > 8.0 && coord.y < 28.0, "latitude {}", coord.y);
        }
    }

    #[test]
    fn grs80_geographic_datum_is_converted() {
        let wkt = r#"GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;
        let reprojection = Reprojection::from_prj(wkt).unwrap().unwrap();
        assert!(reprojection.definition().contains("+ellps=GRS80 +towgs84=0,0,0"));
        let coord = reprojection
            .transform_coord(Coord { x: -100.0, y: 40.0 })
            .unwrap();
        assert_close(coord.x, -100.0, 1e-6);
        assert_close(coord.y, 40.0, 1e-6);
    }

    #[test]
    fn datum_with_towgs84_uses_its_spheroid() {
        let wkt = r#"GEOGCS["Kalianpur 1975",DATUM["Kalianpur_1975",SPHEROID["Everest 1830 (1975 Definition)",6377299.151,300.8017255,AUTHORITY["EPSG","7045"]],TOWGS84[295,736,257,0,0,0,0]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]]"#;
        let reprojection = Reprojection::from_prj(wkt).unwrap().unwrap();
        assert!(reprojection.definition().contains("+a=6377299.151 +rf=300.8017255"));
        assert!(reprojection.definition().contains("+towgs84=295,736,257,0,0,0,0"));
    }

    #[test]
    fn rejects_unconvertible_crs() {
        let unknown_datum = r#"GEOGCS["Local",DATUM["Local_Datum",SPHEROID["Local",6377000.0,300.0]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;
        let grads = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Grad",0.015707963267949]]"#;
        let robinson = r#"PROJCS["World_Robinson",GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Robinson"],PARAMETER["Central_Meridian",0.0],UNIT["Meter",1.0]]"#;

        for wkt in [unknown_datum, grads, robinson] {
            assert!(
                matches!(
                    Reprojection::from_prj(wkt),
                    Err(BoundaryError::UnsupportedProjection { .. })
                ),
                "{wkt}"
            );
        }
    }

    #[test]
    fn foot_units_scale_false_origin() {
        let wkt = r#"PROJCS["NAD_1983_StatePlane_Texas_Central_FIPS_4203_Feet",GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Lambert_Conformal_Conic"],PARAMETER["False_Easting",2296583.333333333],PARAMETER["False_Northing",9842500.0],PARAMETER["Central_Meridian",-100.3333333333333],PARAMETER["Standard_Parallel_1",30.11666666666667],PARAMETER["Standard_Parallel_2",31.88333333333333],PARAMETER["Latitude_Of_Origin",29.66666666666667],UNIT["Foot_US",0.3048006096012192]]"#;
        let reprojection = Reprojection::from_prj(wkt).unwrap().unwrap();
        let definition = reprojection.definition();
        assert!(definition.starts_with("+proj=lcc"));
        assert!(definition.contains("+to_meter=0.3048006096012192"));
        let x_0: f64 = definition
            .split_whitespace()
            .find_map(|part| part.strip_prefix("+x_0="))
            .unwrap()
            .parse()
            .unwrap();
        assert_close(x_0, 700_000.0, 1e-3);
    }
}
