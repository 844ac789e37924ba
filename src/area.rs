use geo::algorithm::geodesic_area::GeodesicArea;
use geo::orient::Direction;
use geo::{Area, Coord, Orient, Polygon};

use crate::point::{MercatorPoint, WGS84Point};

/// How polygon areas are measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum AreaMethod {
    /// On the WGS84 ellipsoid.
    #[default]
    Geodesic,
    /// In the UTM plane of the polygon's first vertex.
    Planar,
}

pub fn geodesic_area(polygon: &[WGS84Point]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let coords: Vec<Coord<f64>> = polygon
        .iter()
        .map(|p| Coord { x: p.lon, y: p.lat })
        .collect();

    // exterior ring only, holes are not modeled
    let geo_polygon = Polygon::new(coords.into(), vec![]).orient(Direction::Default);

    geo_polygon.geodesic_area_unsigned()
}

pub fn planar_area(polygon: &[MercatorPoint]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let coords: Vec<Coord<f64>> = polygon.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
    let geo_polygon = Polygon::new(coords.into(), vec![]).orient(Direction::Default);
    geo_polygon.unsigned_area()
}
