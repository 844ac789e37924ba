use std::fs;
use std::path::{Path, PathBuf};

use kml::types::Geometry;
use kml::Kml;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::point::WGS84Point;
use crate::polygon::Polygon;

mod lockml {
    use super::*;

    fn collect_polygons(kml: &Kml, name: Option<&str>, out: &mut Vec<Polygon>) {
        match kml {
            Kml::KmlDocument(doc) => doc
                .elements
                .iter()
                .for_each(|e| collect_polygons(e, name, out)),
            Kml::Document { elements, .. } => {
                elements.iter().for_each(|e| collect_polygons(e, name, out))
            }
            Kml::Folder(z) => z.elements.iter().for_each(|e| collect_polygons(e, name, out)),
            Kml::Placemark(p) => {
                let name = p.name.as_deref().or(name);
                if let Some(g) = &p.geometry {
                    collect_geometry(g, name, out);
                }
            }
            _ => {}
        }
    }

    fn collect_geometry(geometry: &Geometry, name: Option<&str>, out: &mut Vec<Polygon>) {
        match geometry {
            Geometry::Polygon(ls) => {
                let polygon = geo::Polygon::from(ls.clone());
                let wgs: Vec<_> = polygon
                    .exterior()
                    .0
                    .iter()
                    .map(|p| WGS84Point { lon: p.x, lat: p.y })
                    .collect();
                out.push(Polygon {
                    name: name.map(str::to_string),
                    wgs,
                });
            }
            Geometry::MultiGeometry(multi) => multi
                .geometries
                .iter()
                .for_each(|g| collect_geometry(g, name, out)),
            _ => {}
        }
    }

    pub fn read(path: &Path, content: &str) -> Result<Vec<Polygon>> {
        let kml: Kml = content.parse().map_err(|e: kml::Error| Error::Kml {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut ret = Vec::new();
        collect_polygons(&kml, None, &mut ret);
        Ok(ret)
    }
}

mod locgpx {
    use super::*;
    use gpx::Gpx;
    use std::io::Cursor;

    /// Each track segment is read as a closed ring.
    pub fn read(path: &Path, content: &str) -> Result<Vec<Polygon>> {
        let gpx: Gpx = gpx::read(Cursor::new(content)).map_err(|e| Error::Gpx {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(gpx
            .tracks
            .iter()
            .flat_map(|track| {
                track.segments.iter().map(|segment| {
                    let wgs: Vec<WGS84Point> = segment
                        .points
                        .iter()
                        .map(|point| WGS84Point {
                            lon: point.point().x(),
                            lat: point.point().y(),
                        })
                        .collect();
                    Polygon {
                        name: track.name.clone(),
                        wgs,
                    }
                })
            })
            .filter(|p| !p.wgs.is_empty())
            .collect())
    }
}

mod locjson {
    use super::*;
    use geojson::{Feature, GeoJson, Geometry, Value};

    pub fn read(content: &str) -> Result<Vec<Polygon>> {
        let geojson: GeoJson = content.parse()?;

        let mut ret = Vec::new();
        match geojson {
            GeoJson::FeatureCollection(collection) => {
                for feature in &collection.features {
                    read_feature(feature, &mut ret);
                }
            }
            GeoJson::Feature(feature) => read_feature(&feature, &mut ret),
            GeoJson::Geometry(geometry) => read_geometry(&geometry, None, &mut ret),
        }
        Ok(ret)
    }

    fn read_feature(feature: &Feature, out: &mut Vec<Polygon>) {
        let name = feature
            .property("name")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        if let Some(geometry) = &feature.geometry {
            read_geometry(geometry, name, out);
        }
    }

    fn ring(coords: &[Vec<Vec<f64>>]) -> Option<Vec<WGS84Point>> {
        let exterior = coords.first()?;
        Some(
            exterior
                .iter()
                .filter(|p| p.len() >= 2)
                .map(|p| WGS84Point {
                    lon: p[0],
                    lat: p[1],
                })
                .collect(),
        )
    }

    fn read_geometry(geometry: &Geometry, name: Option<String>, out: &mut Vec<Polygon>) {
        match &geometry.value {
            Value::Polygon(coords) => {
                if let Some(wgs) = ring(coords) {
                    out.push(Polygon { name, wgs });
                }
            }
            Value::MultiPolygon(multi_coords) => {
                for coords in multi_coords {
                    if let Some(wgs) = ring(coords) {
                        out.push(Polygon {
                            name: name.clone(),
                            wgs,
                        });
                    }
                }
            }
            Value::GeometryCollection(geometries) => {
                for g in geometries {
                    read_geometry(g, name.clone(), out);
                }
            }
            _ => {}
        }
    }
}

fn is_supported(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("kml" | "gpx" | "geojson" | "json")
    )
}

/// Parses polygons from an in-memory document; the format is taken from
/// the extension of `path`.
pub fn read_str(path: &Path, content: &str) -> Result<Vec<Polygon>> {
    let mut polygons = match path.extension().and_then(|e| e.to_str()) {
        Some("kml") => lockml::read(path, content)?,
        Some("gpx") => locgpx::read(path, content)?,
        Some("geojson" | "json") => locjson::read(content)?,
        _ => return Err(Error::UnsupportedFormat(path.to_path_buf())),
    };
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("polygon");
    let count = polygons.len();
    for (i, p) in polygons.iter_mut().enumerate() {
        if p.name.is_none() {
            p.name = Some(if count == 1 {
                stem.to_string()
            } else {
                format!("{}#{}", stem, i + 1)
            });
        }
    }
    Ok(polygons)
}

pub fn read_file(path: &Path) -> Result<Vec<Polygon>> {
    let content = fs::read_to_string(path)?;
    let polygons = read_str(path, &content)?;
    if polygons.is_empty() {
        return Err(Error::NoPolygon(path.to_path_buf()));
    }
    log::debug!("{}: {} polygon(s)", path.display(), polygons.len());
    Ok(polygons)
}

/// Files below `dir` with a supported extension, sorted.
pub fn polygon_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut ret = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && is_supported(entry.path()) {
            ret.push(entry.into_path());
        } else {
            log::trace!("skipping {}", entry.path().display());
        }
    }
    Ok(ret)
}

/// Reads a file, or every supported file below a directory.
pub fn read_path(path: &Path) -> Result<Vec<Polygon>> {
    if !path.is_dir() {
        return read_file(path);
    }
    let mut ret = Vec::new();
    for file in polygon_files(path)? {
        match read_file(&file) {
            Ok(polygons) => ret.extend(polygons),
            Err(Error::NoPolygon(p)) => log::warn!("no polygon in {}", p.display()),
            Err(e) => return Err(e),
        }
    }
    if ret.is_empty() {
        return Err(Error::NoPolygon(path.to_path_buf()));
    }
    Ok(ret)
}
