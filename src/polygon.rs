use geo::{Centroid, Coord};

use crate::area::{self, AreaMethod};
use crate::error::Result;
use crate::mercator::UtmProjection;
use crate::point::{MercatorBoundingBox, MercatorPoint, WGS84BoundingBox, WGS84Point};

/// A drawn or imported outline in WGS84 coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub name: Option<String>,
    pub wgs: Vec<WGS84Point>,
}

impl Polygon {
    pub fn new(wgs: Vec<WGS84Point>) -> Self {
        Self { name: None, wgs }
    }

    pub fn named(name: impl Into<String>, wgs: Vec<WGS84Point>) -> Self {
        Self {
            name: Some(name.into()),
            wgs,
        }
    }

    pub fn info(&self) {
        log::info!("polygon: name: {}", self.label());
        log::info!("polygon: len: {}", self.wgs.len());
        if let Some(bbox) = self.wgsbbox() {
            log::info!("polygon: wgs bbox: {}", bbox);
        }
        if let Some(c) = self.centroid() {
            log::info!("polygon: centroid: {}", c);
        }
        log::info!("polygon: geodesic area: {:.1}", self.geodesic_area());
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }

    pub fn wgsbbox(&self) -> Option<WGS84BoundingBox> {
        WGS84BoundingBox::from_points(&self.wgs)
    }

    pub fn mercatorbbox(&self) -> Result<Option<MercatorBoundingBox>> {
        Ok(MercatorBoundingBox::from_points(&self.mercator()?))
    }

    pub fn projection(&self) -> Result<Option<UtmProjection>> {
        match self.wgs.first() {
            Some(first) => Ok(Some(UtmProjection::for_point(first)?)),
            None => Ok(None),
        }
    }

    /// Vertices projected into the UTM zone of the first vertex.
    pub fn mercator(&self) -> Result<Vec<MercatorPoint>> {
        match self.projection()? {
            Some(proj) => proj.project_all(&self.wgs),
            None => Ok(Vec::new()),
        }
    }

    /// Area centroid, `None` for an empty ring.
    pub fn centroid(&self) -> Option<WGS84Point> {
        let coords: Vec<Coord<f64>> = self
            .wgs
            .iter()
            .map(|p| Coord { x: p.lon, y: p.lat })
            .collect();
        let ring = geo::Polygon::new(coords.into(), vec![]);
        ring.centroid().map(|c| WGS84Point::new(c.y(), c.x()))
    }

    pub fn geodesic_area(&self) -> f64 {
        area::geodesic_area(&self.wgs)
    }

    pub fn planar_area(&self) -> Result<f64> {
        Ok(area::planar_area(&self.mercator()?))
    }

    pub fn area(&self, method: AreaMethod) -> Result<f64> {
        match method {
            AreaMethod::Geodesic => Ok(self.geodesic_area()),
            AreaMethod::Planar => self.planar_area(),
        }
    }
}
