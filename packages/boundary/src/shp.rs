//! Shapefile boundary reading, from disk or from a zip archive in memory.
//!
//! Shapefile polygons store every ring in one flat list; outer rings are
//! followed by the holes that belong to them. Rings are regrouped into
//! `geo` polygons so a feature with islands becomes a multi-part shape.

use std::io::{Cursor, Read as _};
use std::path::Path;

use geo::{Coord, LineString, Polygon};
use globe_map_boundary_models::BoundaryShape;
use shapefile::dbase::{FieldValue, Record};
use shapefile::{PolygonRing, Shape};

use crate::projection::Reprojection;
use crate::{BoundaryError, NamedShape};

/// Shapefile members pulled out of a zip archive.
#[derive(Debug, Default)]
pub struct ArchiveMembers {
    /// Geometry (`.shp`).
    pub shp: Vec<u8>,
    /// Attribute table (`.dbf`).
    pub dbf: Vec<u8>,
    /// Projection WKT (`.prj`), if the archive has one.
    pub prj: Option<String>,
}

/// Locates the `.shp`, `.dbf` and optional `.prj` members of a zip archive.
///
/// Directory entries and macOS resource forks (`__MACOSX/`, `._*`) are
/// skipped.
///
/// # Errors
///
/// Returns [`BoundaryError::Archive`] if the archive is unreadable, lacks
/// the `.shp`/`.dbf` members, or holds more than one of a kind.
pub fn archive_members(bytes: &[u8]) -> Result<ArchiveMembers, BoundaryError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| BoundaryError::Archive {
            message: e.to_string(),
        })?;

    let mut shp = None;
    let mut dbf = None;
    let mut prj = None;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| BoundaryError::Archive {
            message: format!("corrupt zip entry {i}: {e}"),
        })?;
        if entry.is_dir() || is_resource_fork(entry.name()) {
            log::trace!("Skipping archive entry {}", entry.name());
            continue;
        }
        let entry_name = entry.name().to_ascii_lowercase();
        let (extension, slot) = if entry_name.ends_with(".shp") {
            ("shp", &mut shp)
        } else if entry_name.ends_with(".dbf") {
            ("dbf", &mut dbf)
        } else if entry_name.ends_with(".prj") {
            ("prj", &mut prj)
        } else {
            continue;
        };
        if slot.is_some() {
            return Err(BoundaryError::Archive {
                message: format!("archive holds more than one .{extension} member"),
            });
        }
        let mut buf = Vec::new();
        entry.read_to_end(&mut buf)?;
        *slot = Some(buf);
    }

    Ok(ArchiveMembers {
        shp: shp.ok_or_else(|| BoundaryError::Archive {
            message: "archive has no .shp member".to_string(),
        })?,
        dbf: dbf.ok_or_else(|| BoundaryError::Archive {
            message: "archive has no .dbf member".to_string(),
        })?,
        prj: prj.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()),
    })
}

/// `__MACOSX/` metadata or an AppleDouble `._name` file.
fn is_resource_fork(entry_name: &str) -> bool {
    entry_name.starts_with("__MACOSX/")
        || entry_name.contains("/__MACOSX/")
        || entry_name
            .rsplit('/')
            .next()
            .is_some_and(|file_name| file_name.starts_with("._"))
}

/// Reads every feature of a zipped shapefile held in memory, reprojected
/// to WGS84 lon/lat when the archive's `.prj` names another CRS.
///
/// # Errors
///
/// Returns [`BoundaryError`] if the archive is unreadable or incomplete
/// (see [`archive_members`]), its CRS cannot be converted, or the
/// shapefile itself is malformed.
pub fn read_zipped(bytes: &[u8], name_field: &str) -> Result<Vec<NamedShape>, BoundaryError> {
    let members = archive_members(bytes)?;
    let reprojection = match &members.prj {
        Some(wkt) => Reprojection::from_prj(wkt)?,
        None => None,
    };

    let shape_reader =
        shapefile::ShapeReader::new(Cursor::new(members.shp)).map_err(shapefile_error)?;
    let dbase_reader = shapefile::dbase::Reader::new(Cursor::new(members.dbf)).map_err(|e| {
        BoundaryError::Shapefile {
            message: e.to_string(),
        }
    })?;
    let mut reader = shapefile::Reader::new(shape_reader, dbase_reader);

    reader
        .iter_shapes_and_records()
        .map(|result| {
            let (shape, record) = result.map_err(shapefile_error)?;
            named_shape(shape, &record, name_field, reprojection.as_ref())
        })
        .collect()
}

/// Reads every feature of a `.shp` file on disk (with its sibling `.dbf`
/// and optional `.prj`), reprojected to WGS84 lon/lat when needed.
///
/// # Errors
///
/// Returns [`BoundaryError`] if the files cannot be read, the `.prj`
/// names a CRS that cannot be converted, or the shapefile is malformed.
pub fn read_path(path: &Path, name_field: &str) -> Result<Vec<NamedShape>, BoundaryError> {
    let prj_path = path.with_extension("prj");
    let reprojection = if prj_path.exists() {
        Reprojection::from_prj(&std::fs::read_to_string(&prj_path)?)?
    } else {
        log::debug!("No .prj next to {}, assuming WGS84", path.display());
        None
    };

    let mut reader = shapefile::Reader::from_path(path).map_err(shapefile_error)?;
    reader
        .iter_shapes_and_records()
        .map(|result| {
            let (shape, record) = result.map_err(shapefile_error)?;
            named_shape(shape, &record, name_field, reprojection.as_ref())
        })
        .collect()
}

fn shapefile_error(e: shapefile::Error) -> BoundaryError {
    BoundaryError::Shapefile {
        message: e.to_string(),
    }
}

/// Pairs a shape with the value of its name attribute.
fn named_shape(
    shape: Shape,
    record: &Record,
    name_field: &str,
    reprojection: Option<&Reprojection>,
) -> Result<NamedShape, BoundaryError> {
    let name = match record.get(name_field) {
        Some(FieldValue::Character(Some(s)) | FieldValue::Memo(s)) => Some(s.trim().to_string()),
        _ => None,
    };
    let shape = match (shape_to_boundary(shape), reprojection) {
        (Some(shape), Some(reprojection)) => Some(reprojection.apply(&shape)?),
        (shape, _) => shape,
    };
    Ok(NamedShape { name, shape })
}

/// Converts a shapefile shape, keeping polygon kinds only.
fn shape_to_boundary(shape: Shape) -> Option<BoundaryShape> {
    let polygons = match shape {
        Shape::Polygon(p) => group_rings(p.rings(), |pt| Coord { x: pt.x, y: pt.y }),
        Shape::PolygonM(p) => group_rings(p.rings(), |pt| Coord { x: pt.x, y: pt.y }),
        Shape::PolygonZ(p) => group_rings(p.rings(), |pt| Coord { x: pt.x, y: pt.y }),
        _ => return None,
    };
    BoundaryShape::from_polygons(polygons)
}

/// Groups a flat ring list into polygons: each outer ring with the inner
/// rings that follow it. Inner rings before any outer ring are dropped.
fn group_rings<P>(
    rings: &[PolygonRing<P>],
    to_coord: impl Fn(&P) -> Coord<f64>,
) -> Vec<Polygon<f64>> {
    let mut polygons = Vec::new();
    let mut exterior: Option<LineString<f64>> = None;
    let mut holes = Vec::new();

    for ring in rings {
        let line: LineString<f64> = ring.points().iter().map(&to_coord).collect();
        match ring {
            PolygonRing::Outer(_) => {
                if let Some(ext) = exterior.take() {
                    polygons.push(Polygon::new(ext, std::mem::take(&mut holes)));
                }
                exterior = Some(line);
            }
            PolygonRing::Inner(_) => {
                if exterior.is_some() {
                    holes.push(line);
                }
            }
        }
    }
    if let Some(ext) = exterior {
        polygons.push(Polygon::new(ext, holes));
    }

    polygons
}
