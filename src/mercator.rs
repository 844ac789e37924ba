use crate::error::{Error, Result};
use crate::point::{MercatorPoint, WGS84Point};

/// Projection from WGS84 to the UTM zone of a reference point.
pub struct UtmProjection {
    wgs84_spec: proj4rs::proj::Proj,
    dst_spec: proj4rs::proj::Proj,
}

impl UtmProjection {
    pub fn for_point(reference: &WGS84Point) -> Result<UtmProjection> {
        use proj4rs::proj::Proj;
        let spec = reference.to_utm_proj4();
        log::trace!("projection: {}", spec);
        let dst_spec =
            Proj::from_proj_string(spec.as_str()).map_err(|e| Error::Projection(e.to_string()))?;

        let spec = "+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs";
        let wgs84_spec = Proj::from_proj_string(spec).map_err(|e| Error::Projection(e.to_string()))?;
        Ok(UtmProjection {
            wgs84_spec,
            dst_spec,
        })
    }
    pub fn project(&self, wgs: &WGS84Point) -> Result<MercatorPoint> {
        let mut p = (wgs.lon.to_radians(), wgs.lat.to_radians());
        proj4rs::transform::transform(&self.wgs84_spec, &self.dst_spec, &mut p)
            .map_err(|e| Error::Projection(e.to_string()))?;
        Ok(MercatorPoint { x: p.0, y: p.1 })
    }
    pub fn project_all(&self, points: &[WGS84Point]) -> Result<Vec<MercatorPoint>> {
        points.iter().map(|w| self.project(w)).collect()
    }
}
