//! Forest carbon-removal results returned for reforestation requests.
//!
//! The service answers with removal estimates keyed by forest category
//! ("Plantations and Woodlots", "Other Forest Types") and then by forest type.
//! Each entry is either the marker `"N/A"` or a one-year estimate plus a
//! cumulative removal sequence indexed by year.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::coefficients::ValidationWarning;

/// Marker the service uses for "no estimate".
pub const NOT_AVAILABLE: &str = "N/A";

/// Index of the year-20 value in the cumulative removal sequence.
pub const YEAR_TWENTY_INDEX: usize = 19;

/// Category -> forest type -> entry.
pub type ForestResults = BTreeMap<String, ForestCategory>;

/// Forest types of one category, or whatever the service sent instead.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ForestCategory {
    Types(BTreeMap<String, ForestEntry>),
    Other(serde_json::Value),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ForestEntry {
    Removal(RemovalEstimate),
    Marker(String),
    Malformed(serde_json::Value),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RemovalEstimate {
    #[serde(rename = "potential_removal_one_year_tCO2e")]
    pub one_year: Estimate,
    #[serde(rename = "cumulative_removal_tCO2e", default)]
    pub cumulative: Vec<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Estimate {
    Value(f64),
    Marker(String),
}

/// Removal potential of one forest type, in tCO2e per hectare.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForestRecord {
    pub category: String,
    #[serde(rename = "type")]
    pub forest_type: String,
    pub one_year_potential: f64,
    pub twenty_year_potential: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Consolidation {
    pub records: Vec<ForestRecord>,
    pub warnings: Vec<ValidationWarning>,
}

impl Consolidation {
    /// Mean one-year potential over all records, `None` when there are none.
    pub fn mean_one_year_potential(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let sum: f64 = self.records.iter().map(|r| r.one_year_potential).sum();
        Some(sum / self.records.len() as f64)
    }
}

/// Flattens the nested results into one record per forest type with an
/// estimate. `"N/A"` entries and categories are skipped silently, malformed
/// ones with a warning.
pub fn consolidate(results: &ForestResults) -> Consolidation {
    let mut ret = Consolidation::default();
    for (category, types) in results {
        let types = match types {
            ForestCategory::Types(types) => types,
            ForestCategory::Other(v) if v.as_str() == Some(NOT_AVAILABLE) => {
                log::trace!("{}: not available", category);
                continue;
            }
            ForestCategory::Other(v) => {
                let reason = format!("unexpected category value {}", v);
                log::warn!("skipping forest category {}: {}", category, reason);
                ret.warnings.push(ValidationWarning::new(category.clone(), reason));
                continue;
            }
        };
        for (forest_type, entry) in types {
            let field = format!("{}/{}", category, forest_type);
            match record(category, forest_type, entry) {
                Ok(Some(r)) => ret.records.push(r),
                Ok(None) => log::trace!("{}: not available", field),
                Err(reason) => {
                    log::warn!("skipping forest entry {}: {}", field, reason);
                    ret.warnings.push(ValidationWarning::new(field, reason));
                }
            }
        }
    }
    log::debug!(
        "consolidated {} forest records ({} skipped as malformed)",
        ret.records.len(),
        ret.warnings.len()
    );
    ret
}

fn record(
    category: &str,
    forest_type: &str,
    entry: &ForestEntry,
) -> Result<Option<ForestRecord>, String> {
    let estimate = match entry {
        ForestEntry::Marker(m) if m == NOT_AVAILABLE => return Ok(None),
        ForestEntry::Marker(m) => return Err(format!("unexpected marker {:?}", m)),
        ForestEntry::Malformed(v) => return Err(format!("unexpected value {}", v)),
        ForestEntry::Removal(estimate) => estimate,
    };
    let one_year = match &estimate.one_year {
        Estimate::Marker(m) if m == NOT_AVAILABLE => return Ok(None),
        Estimate::Marker(m) => return Err(format!("unexpected one-year marker {:?}", m)),
        Estimate::Value(x) if !x.is_finite() => return Err("one-year estimate not finite".into()),
        Estimate::Value(x) if *x < 0.0 => return Err(format!("negative one-year estimate {}", x)),
        Estimate::Value(x) => *x,
    };
    let twenty_year = estimate
        .cumulative
        .get(YEAR_TWENTY_INDEX)
        .ok_or_else(|| {
            format!(
                "cumulative sequence has {} values, need {}",
                estimate.cumulative.len(),
                YEAR_TWENTY_INDEX + 1
            )
        })?
        .as_f64()
        .filter(|x| x.is_finite())
        .ok_or("year-20 cumulative value is not a number")?;
    if twenty_year < 0.0 {
        return Err(format!("negative year-20 cumulative value {}", twenty_year));
    }
    Ok(Some(ForestRecord {
        category: category.to_string(),
        forest_type: forest_type.to_string(),
        one_year_potential: one_year,
        twenty_year_potential: twenty_year,
    }))
}
