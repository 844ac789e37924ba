use serde::Serialize;

use crate::aggregator::PolygonAggregator;
use crate::coefficients::{CoefficientSet, SQUARE_METERS_PER_HECTARE};
use crate::landuse::{LandUseType, PerLandUse};

/// Horizon shown next to the annual figures.
pub const DEFAULT_PROJECTION_YEARS: u32 = 30;

/// Annual impact of the polygons of one land use.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeImpact {
    pub land_use: LandUseType,
    pub area_hectares: f64,
    /// MWh per year.
    pub energy_production: f64,
    /// tCO2e per year.
    pub carbon_offset: f64,
}

impl TypeImpact {
    pub fn new(land_use: LandUseType, area_m2: f64, coefficients: &CoefficientSet) -> Self {
        let area_hectares = area_m2 / SQUARE_METERS_PER_HECTARE;
        Self {
            land_use,
            area_hectares,
            energy_production: area_hectares * coefficients.energy_production_per_hectare,
            carbon_offset: area_hectares * coefficients.carbon_offset_per_hectare,
        }
    }
}

/// Combined annual impact over every drawn polygon.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactEstimate {
    /// MWh per year.
    pub energy_production: f64,
    /// tCO2e per year.
    pub carbon_offset: f64,
    pub by_type: Vec<TypeImpact>,
}

impl ImpactEstimate {
    /// `None` when no polygon has been drawn.
    pub fn compute(
        polygons: &PolygonAggregator,
        coefficients: &PerLandUse<CoefficientSet>,
    ) -> Option<Self> {
        polygons.total_area()?;
        let by_type: Vec<TypeImpact> = LandUseType::ALL
            .iter()
            .filter_map(|&t| {
                polygons
                    .area_by_type(t)
                    .map(|area| TypeImpact::new(t, area, coefficients.get(t)))
            })
            .collect();
        Some(Self {
            energy_production: by_type.iter().map(|i| i.energy_production).sum(),
            carbon_offset: by_type.iter().map(|i| i.carbon_offset).sum(),
            by_type,
        })
    }

    pub fn for_type(&self, land_use: LandUseType) -> Option<&TypeImpact> {
        self.by_type.iter().find(|i| i.land_use == land_use)
    }

    /// Totals over `years`, assuming constant annual values.
    pub fn over_years(&self, years: u32) -> (f64, f64) {
        let n = years as f64;
        (self.energy_production * n, self.carbon_offset * n)
    }
}
