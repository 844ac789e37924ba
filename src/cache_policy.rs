//! Decides whether moving the map warrants a new coefficient request.
//!
//! Per-hectare coefficients vary slowly with geography, so a request is only
//! issued once the location has moved at least `threshold_km` away from the
//! location of the last successful request for the same land use.

use crate::landuse::{LandUseType, PerLandUse};
use crate::point::WGS84Point;

/// Default movement in kilometers before coefficients are requested again.
pub const DEFAULT_THRESHOLD_KM: f64 = 50.0;

#[derive(Clone, Debug)]
pub struct RecalculationPolicy {
    threshold_km: f64,
    last_call: PerLandUse<Option<WGS84Point>>,
}

impl Default for RecalculationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_KM)
    }
}

impl RecalculationPolicy {
    pub fn new(threshold_km: f64) -> Self {
        Self {
            threshold_km,
            last_call: PerLandUse::new(None, None),
        }
    }

    pub fn threshold_km(&self) -> f64 {
        self.threshold_km
    }

    /// Location of the last successful request for `land_use`.
    pub fn last_call(&self, land_use: LandUseType) -> Option<WGS84Point> {
        *self.last_call.get(land_use)
    }

    pub fn should_recalculate(&self, land_use: LandUseType, location: &WGS84Point) -> bool {
        let Some(last) = self.last_call(land_use) else {
            return true;
        };
        let distance = last.distance_km(location);
        if distance < self.threshold_km {
            log::debug!(
                "{}: not recalculating, {:.2} km from last call (threshold {} km)",
                land_use,
                distance,
                self.threshold_km
            );
            return false;
        }
        log::trace!("{}: moved {:.2} km since last call", land_use, distance);
        true
    }

    pub fn record(&mut self, land_use: LandUseType, location: WGS84Point) {
        self.last_call.set(land_use, Some(location));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A point `km` kilometers due north of `origin`.
    pub(crate) fn north_of(origin: &WGS84Point, km: f64) -> WGS84Point {
        // degrees per km on the haversine sphere
        let deg = km / (6_371.0088 * std::f64::consts::PI / 180.0);
        WGS84Point::new(origin.lat + deg, origin.lon)
    }

    #[test]
    fn test_first_call_always_recalculates() {
        let policy = RecalculationPolicy::default();
        let here = WGS84Point::new(28.4, -81.58);
        for t in LandUseType::ALL {
            assert!(policy.should_recalculate(t, &here));
        }
    }

    #[test]
    fn test_close_location_is_skipped() {
        let mut policy = RecalculationPolicy::default();
        let here = WGS84Point::new(28.4, -81.58);
        policy.record(LandUseType::Solar, here);
        assert!(!policy.should_recalculate(LandUseType::Solar, &north_of(&here, 10.0)));
        assert!(!policy.should_recalculate(LandUseType::Solar, &here));
        assert!(policy.should_recalculate(LandUseType::Solar, &north_of(&here, 60.0)));
    }

    #[test]
    fn test_types_are_independent() {
        let mut policy = RecalculationPolicy::default();
        let here = WGS84Point::new(28.4, -81.58);
        policy.record(LandUseType::Solar, here);
        assert!(policy.should_recalculate(LandUseType::Reforestation, &here));
        assert_eq!(policy.last_call(LandUseType::Reforestation), None);
    }

    #[test]
    fn test_threshold_boundary() {
        let here = WGS84Point::new(10.0, 10.0);
        let there = north_of(&here, 50.0);
        let exact = here.distance_km(&there);

        let mut policy = RecalculationPolicy::new(exact);
        policy.record(LandUseType::Solar, here);
        assert!(policy.should_recalculate(LandUseType::Solar, &there));

        let mut policy = RecalculationPolicy::new(exact + 1e-6);
        policy.record(LandUseType::Solar, here);
        assert!(!policy.should_recalculate(LandUseType::Solar, &there));
    }

    #[test]
    fn test_record_replaces_location() {
        let mut policy = RecalculationPolicy::new(5.0);
        let a = WGS84Point::new(0.0, 0.0);
        let b = WGS84Point::new(1.0, 0.0);
        policy.record(LandUseType::Reforestation, a);
        policy.record(LandUseType::Reforestation, b);
        assert_eq!(policy.last_call(LandUseType::Reforestation), Some(b));
        assert!(!policy.should_recalculate(LandUseType::Reforestation, &b));
    }
}
