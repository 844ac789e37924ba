use crate::landuse::LandUseType;
use crate::polygon::Polygon;

/// A polygon tagged with the land use active when it was drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawnPolygon {
    pub geometry: Polygon,
    /// Square meters, as reported by the area provider.
    pub area: f64,
    pub land_use: LandUseType,
}

/// Ordered list of drawn polygons plus the land use new ones are tagged with.
#[derive(Clone, Debug, Default)]
pub struct PolygonAggregator {
    polygons: Vec<DrawnPolygon>,
    active: LandUseType,
}

impl PolygonAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends as-is: the caller's area is trusted and duplicates are kept.
    pub fn add_polygon(&mut self, geometry: Polygon, area: f64, land_use: LandUseType) {
        log::trace!("add polygon {} ({:.1} m², {})", geometry.label(), area, land_use);
        self.polygons.push(DrawnPolygon {
            geometry,
            area,
            land_use,
        });
    }

    /// Drops every polygon. Coefficients live elsewhere and are untouched.
    pub fn clear(&mut self) {
        self.polygons.clear();
    }

    pub fn polygons(&self) -> &[DrawnPolygon] {
        &self.polygons
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn count_by_type(&self, land_use: LandUseType) -> usize {
        self.polygons.iter().filter(|p| p.land_use == land_use).count()
    }

    /// Sum of all areas, `None` when nothing has been drawn.
    pub fn total_area(&self) -> Option<f64> {
        if self.polygons.is_empty() {
            return None;
        }
        Some(self.polygons.iter().map(|p| p.area).sum())
    }

    /// Sum of the areas tagged `land_use`, `None` when there are none.
    pub fn area_by_type(&self, land_use: LandUseType) -> Option<f64> {
        self.polygons
            .iter()
            .filter(|p| p.land_use == land_use)
            .map(|p| p.area)
            .fold(None, |acc, area| Some(acc.unwrap_or(0.0) + area))
    }

    pub fn active_type(&self) -> LandUseType {
        self.active
    }

    pub fn set_active_type(&mut self, land_use: LandUseType) {
        self.active = land_use;
    }

    /// Switches the land use for future polygons and returns the new one.
    pub fn toggle_type(&mut self) -> LandUseType {
        self.active = self.active.toggled();
        self.active
    }
}
