//! Per-hectare coefficients and their validation.

use core::fmt;

use serde::Serialize;

use crate::landuse::{LandUseType, PerLandUse};

/// Square meters in one hectare.
pub const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Multipliers converting hectares to annual impact for one land use.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoefficientSet {
    /// MWh per hectare per year.
    pub energy_production_per_hectare: f64,
    /// tCO2e per hectare per year.
    pub carbon_offset_per_hectare: f64,
}

impl CoefficientSet {
    pub const SOLAR_DEFAULT: CoefficientSet = CoefficientSet {
        energy_production_per_hectare: 1850.0,
        carbon_offset_per_hectare: 650.0,
    };

    pub const REFORESTATION_DEFAULT: CoefficientSet = CoefficientSet {
        energy_production_per_hectare: 0.0,
        carbon_offset_per_hectare: 3.5,
    };

    pub fn default_for(land_use: LandUseType) -> Self {
        match land_use {
            LandUseType::Solar => Self::SOLAR_DEFAULT,
            LandUseType::Reforestation => Self::REFORESTATION_DEFAULT,
        }
    }
}

impl Default for PerLandUse<CoefficientSet> {
    fn default() -> Self {
        PerLandUse::new(
            CoefficientSet::SOLAR_DEFAULT,
            CoefficientSet::REFORESTATION_DEFAULT,
        )
    }
}

/// A numeric field of an otherwise successful response that was not applied.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValidationWarning {
    pub field: String,
    pub reason: String,
}

impl ValidationWarning {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Accepts finite, non-negative numbers.
pub(crate) fn validate_coefficient(
    field: &str,
    value: Option<&serde_json::Value>,
) -> Result<f64, ValidationWarning> {
    let value = match value {
        None | Some(serde_json::Value::Null) => {
            return Err(ValidationWarning::new(field, "missing"));
        }
        Some(v) => v,
    };
    match value.as_f64() {
        Some(x) if !x.is_finite() => Err(ValidationWarning::new(field, "not finite")),
        Some(x) if x < 0.0 => Err(ValidationWarning::new(field, format!("negative ({})", x))),
        Some(x) => Ok(x),
        None => Err(ValidationWarning::new(
            field,
            format!("not a number ({})", value),
        )),
    }
}
