//! Session state of one comparison: map view, draw mode, polygons and the
//! per-land-use coefficients.
//!
//! Derived values (selected area, impact estimate) are recomputed on read.
//!
//! Coefficient requests go through [`Session::fetch_coefficients`], which
//! holds the session for the whole round trip, or through the
//! [`Session::prepare_fetch`] / [`Session::complete_fetch`] pair when several
//! requests may be in flight. Every prepared request carries a per-land-use
//! sequence number and a response is only applied if it is newer than the
//! last one applied for the same land use.

use serde::Serialize;

use crate::aggregator::PolygonAggregator;
use crate::api::{CalculationApi, CalculationRequest, CalculationResponse};
use crate::cache_policy::RecalculationPolicy;
use crate::coefficients::{validate_coefficient, CoefficientSet, ValidationWarning};
use crate::config::Config;
use crate::error::Result;
use crate::estimate::ImpactEstimate;
use crate::forest::{self, ForestRecord};
use crate::landuse::{LandUseType, PerLandUse};
use crate::point::WGS84Point;
use crate::polygon::Polygon;

pub const DEFAULT_LOCATION: WGS84Point = WGS84Point {
    lat: 28.400856773608965,
    lon: -81.57923406710395,
};

pub const DEFAULT_ZOOM: f64 = 17.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrawState {
    #[default]
    Idle,
    Drawing,
}

/// A request that passed the recalculation policy and awaits its response.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingFetch {
    pub request: CalculationRequest,
    pub sequence: u64,
}

impl PendingFetch {
    pub fn land_use(&self) -> LandUseType {
        self.request.land_use_type
    }
}

/// What a response changed.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoefficientUpdate {
    pub land_use: LandUseType,
    pub location: WGS84Point,
    /// Applied energy coefficient, `None` if the response had no usable value.
    pub energy_production: Option<f64>,
    /// Applied carbon coefficient, `None` if the response had no usable value.
    pub carbon_offset: Option<f64>,
    /// Coefficients in effect after the update.
    pub coefficients: CoefficientSet,
    pub forest_records: Vec<ForestRecord>,
    pub warnings: Vec<ValidationWarning>,
}

impl CoefficientUpdate {
    pub fn applied(&self) -> bool {
        self.energy_production.is_some() || self.carbon_offset.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    location: WGS84Point,
    center: WGS84Point,
    zoom: f64,
    draw: DrawState,
    polygons: PolygonAggregator,
    coefficients: PerLandUse<CoefficientSet>,
    policy: RecalculationPolicy,
    issued: PerLandUse<u64>,
    applied: PerLandUse<u64>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(RecalculationPolicy::default())
    }
}

impl Session {
    pub fn new(policy: RecalculationPolicy) -> Self {
        Self {
            location: DEFAULT_LOCATION,
            center: DEFAULT_LOCATION,
            zoom: DEFAULT_ZOOM,
            draw: DrawState::Idle,
            polygons: PolygonAggregator::new(),
            coefficients: PerLandUse::default(),
            policy,
            issued: PerLandUse::new(0, 0),
            applied: PerLandUse::new(0, 0),
        }
    }

    pub fn with_config(config: &Config) -> Self {
        Self::new(RecalculationPolicy::new(config.recalc_threshold_km))
    }

    pub fn location(&self) -> WGS84Point {
        self.location
    }

    /// Map center as `[lon, lat]`.
    pub fn center(&self) -> [f64; 2] {
        [self.center.lon, self.center.lat]
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn draw_state(&self) -> DrawState {
        self.draw
    }

    pub fn is_drawing(&self) -> bool {
        self.draw == DrawState::Drawing
    }

    pub fn land_use(&self) -> LandUseType {
        self.polygons.active_type()
    }

    pub fn polygons(&self) -> &PolygonAggregator {
        &self.polygons
    }

    pub fn coefficients(&self, land_use: LandUseType) -> &CoefficientSet {
        self.coefficients.get(land_use)
    }

    pub fn policy(&self) -> &RecalculationPolicy {
        &self.policy
    }

    /// Total drawn area in m², `None` when nothing is drawn.
    pub fn selected_area(&self) -> Option<f64> {
        self.polygons.total_area()
    }

    pub fn estimate(&self) -> Option<ImpactEstimate> {
        ImpactEstimate::compute(&self.polygons, &self.coefficients)
    }

    pub fn toggle_draw(&mut self) -> DrawState {
        self.draw = match self.draw {
            DrawState::Idle => DrawState::Drawing,
            DrawState::Drawing => DrawState::Idle,
        };
        self.draw
    }

    pub fn toggle_land_use_type(&mut self) -> LandUseType {
        let t = self.polygons.toggle_type();
        log::debug!("land use: {}", t);
        t
    }

    pub fn set_land_use_type(&mut self, land_use: LandUseType) {
        self.polygons.set_active_type(land_use);
    }

    /// A drawing was completed: leave draw mode, keep the polygon tagged with
    /// the active land use and return the updated estimate.
    pub fn handle_draw_end(&mut self, area: f64, geometry: Polygon) -> Option<ImpactEstimate> {
        if self.draw == DrawState::Idle {
            log::debug!("draw end received while not drawing");
        }
        self.draw = DrawState::Idle;
        let land_use = self.land_use();
        self.polygons.add_polygon(geometry, area, land_use);
        log::info!(
            "added polygon {} ({}), total area: {:.1} m²",
            self.polygons.len(),
            land_use,
            self.selected_area().unwrap_or_default()
        );
        self.estimate()
    }

    pub fn clear_polygons(&mut self) {
        self.polygons.clear();
    }

    pub fn handle_center_change(&mut self, center: WGS84Point) {
        self.center = center;
        self.location = center;
        log::trace!(
            "center: {}, coefficients: {:?}",
            center,
            self.coefficients(self.land_use())
        );
    }

    pub fn handle_zoom_change(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    /// The user moved to `location`: remember it and refresh the coefficients
    /// of the active land use.
    pub async fn handle_location_update<A: CalculationApi>(
        &mut self,
        api: &A,
        location: WGS84Point,
    ) -> Result<Option<CoefficientUpdate>> {
        self.location = location;
        let land_use = self.land_use();
        self.fetch_coefficients(api, location, land_use).await
    }

    /// Requests coefficients for `land_use` at `location` unless the last
    /// successful request for it was close enough. Failed requests leave the
    /// cached coefficients untouched.
    pub async fn fetch_coefficients<A: CalculationApi>(
        &mut self,
        api: &A,
        location: WGS84Point,
        land_use: LandUseType,
    ) -> Result<Option<CoefficientUpdate>> {
        let Some(pending) = self.prepare_fetch(land_use, location) else {
            return Ok(None);
        };
        let response = match api.calculate(&pending.request).await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("{} coefficients at {}: {}", land_use, location, e);
                return Err(e);
            }
        };
        Ok(self.complete_fetch(&pending, response))
    }

    /// Checks the recalculation policy and, if a request is warranted, numbers
    /// it. No coefficient state changes here.
    pub fn prepare_fetch(
        &mut self,
        land_use: LandUseType,
        location: WGS84Point,
    ) -> Option<PendingFetch> {
        if !self.policy.should_recalculate(land_use, &location) {
            return None;
        }
        let sequence = self.issued.get_mut(land_use);
        *sequence += 1;
        Some(PendingFetch {
            request: CalculationRequest::probe(&location, land_use),
            sequence: *sequence,
        })
    }

    /// Applies a response. Returns `None` if a newer response for the same
    /// land use was applied in the meantime.
    pub fn complete_fetch(
        &mut self,
        pending: &PendingFetch,
        response: CalculationResponse,
    ) -> Option<CoefficientUpdate> {
        let land_use = pending.land_use();
        if pending.sequence <= *self.applied.get(land_use) {
            log::debug!(
                "discarding stale {} response #{} (already applied #{})",
                land_use,
                pending.sequence,
                self.applied.get(land_use)
            );
            return None;
        }
        if response.land_use() != land_use {
            log::warn!(
                "{} response for a {} request, ignoring",
                response.land_use(),
                land_use
            );
            return None;
        }

        let location = pending.request.location();
        let mut coefficients = *self.coefficients.get(land_use);
        let mut warnings = Vec::new();
        let mut forest_records = Vec::new();
        let mut energy_production = None;
        let mut carbon_offset = None;

        match response {
            CalculationResponse::Solar(solar) => {
                match validate_coefficient("energyProduction", solar.energy_production.as_ref()) {
                    Ok(x) => energy_production = Some(x),
                    Err(w) => warnings.push(w),
                }
                match validate_coefficient("carbonOffset", solar.carbon_offset.as_ref()) {
                    Ok(x) => carbon_offset = Some(x),
                    Err(w) => warnings.push(w),
                }
            }
            CalculationResponse::Reforestation(reforestation) => {
                let consolidation = forest::consolidate(&reforestation.forest_results);
                carbon_offset = consolidation.mean_one_year_potential();
                if carbon_offset.is_none() {
                    warnings.push(ValidationWarning::new(
                        "forestResults",
                        "no forest type with a removal estimate",
                    ));
                }
                warnings.extend(consolidation.warnings);
                forest_records = consolidation.records;
            }
        }

        for w in &warnings {
            log::warn!("{} response: keeping previous value, {}", land_use, w);
        }
        if let Some(x) = energy_production {
            coefficients.energy_production_per_hectare = x;
        }
        if let Some(x) = carbon_offset {
            coefficients.carbon_offset_per_hectare = x;
        }

        let update = CoefficientUpdate {
            land_use,
            location,
            energy_production,
            carbon_offset,
            coefficients,
            forest_records,
            warnings,
        };
        if update.applied() {
            self.coefficients.set(land_use, coefficients);
            self.policy.record(land_use, location);
            self.applied.set(land_use, pending.sequence);
            log::info!(
                "{} coefficients updated: {:.2} MWh/ha/yr, {:.2} tCO2e/ha/yr",
                land_use,
                coefficients.energy_production_per_hectare,
                coefficients.carbon_offset_per_hectare
            );
        }
        Some(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SolarResponse;
    use crate::cache_policy::tests::north_of;
    use crate::error::Error;
    use crate::forest::tests::cumulative;
    use crate::polygon::tests::square;
    use approx::assert_relative_eq;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    enum Reply {
        Json(serde_json::Value),
        Status(u16),
        Garbage,
    }

    #[derive(Default)]
    struct FakeApi {
        replies: Mutex<VecDeque<Reply>>,
        requests: Mutex<Vec<CalculationRequest>>,
    }

    impl FakeApi {
        fn with(replies: Vec<Reply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }
        fn requests(&self) -> Vec<CalculationRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl CalculationApi for FakeApi {
        async fn calculate(&self, request: &CalculationRequest) -> Result<CalculationResponse> {
            self.requests.lock().unwrap().push(request.clone());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected request");
            match reply {
                Reply::Json(v) => CalculationResponse::from_value(request.land_use_type, v),
                Reply::Status(status) => Err(Error::HttpStatus { status }),
                Reply::Garbage => CalculationResponse::from_slice(request.land_use_type, b"{"),
            }
        }
    }

    fn solar(energy: f64, carbon: f64) -> Reply {
        Reply::Json(json!({ "energyProduction": energy, "carbonOffset": carbon }))
    }

    #[test]
    fn test_defaults() {
        let s = Session::default();
        assert_eq!(s.location(), DEFAULT_LOCATION);
        assert_eq!(s.center(), [-81.57923406710395, 28.400856773608965]);
        assert_eq!(s.zoom(), 17.0);
        assert_eq!(s.land_use(), LandUseType::Solar);
        assert!(!s.is_drawing());
        assert_eq!(s.selected_area(), None);
        assert_eq!(s.polygons().area_by_type(LandUseType::Solar), None);
        assert_eq!(*s.coefficients(LandUseType::Solar), CoefficientSet::SOLAR_DEFAULT);
    }

    #[test]
    fn test_draw_state_machine() {
        let mut s = Session::default();
        assert_eq!(s.toggle_draw(), DrawState::Drawing);
        let estimate = s.handle_draw_end(10_000.0, square(28.4, -81.58, 100.0)).unwrap();
        assert_eq!(s.draw_state(), DrawState::Idle);
        assert_relative_eq!(estimate.energy_production, 1850.0);
        assert_relative_eq!(estimate.carbon_offset, 650.0);
    }

    #[test]
    fn test_draw_end_tags_active_type() {
        let mut s = Session::default();
        s.handle_draw_end(100.0, square(0.0, 0.0, 10.0));
        s.toggle_land_use_type();
        s.handle_draw_end(300.0, square(0.0, 0.0, 10.0));
        assert_eq!(s.polygons().area_by_type(LandUseType::Solar), Some(100.0));
        assert_eq!(s.polygons().area_by_type(LandUseType::Reforestation), Some(300.0));
        assert_eq!(s.selected_area(), Some(400.0));
    }

    #[test]
    fn test_clear_keeps_coefficients() {
        let mut s = Session::default();
        s.handle_draw_end(100.0, square(0.0, 0.0, 10.0));
        s.clear_polygons();
        s.clear_polygons();
        assert_eq!(s.selected_area(), None);
        assert!(s.estimate().is_none());
        assert_eq!(*s.coefficients(LandUseType::Solar), CoefficientSet::SOLAR_DEFAULT);
    }

    #[test]
    fn test_view_changes() {
        let mut s = Session::default();
        s.handle_center_change(WGS84Point::new(1.0, 2.0));
        s.handle_zoom_change(12.5);
        assert_eq!(s.center(), [2.0, 1.0]);
        assert_eq!(s.location(), WGS84Point::new(1.0, 2.0));
        assert_eq!(s.zoom(), 12.5);
    }

    #[tokio::test]
    async fn test_close_location_skips_request() {
        let api = FakeApi::with(vec![solar(2000.0, 700.0)]);
        let mut s = Session::default();
        let first = s
            .fetch_coefficients(&api, DEFAULT_LOCATION, LandUseType::Solar)
            .await
            .unwrap();
        assert!(first.is_some());

        let near = north_of(&DEFAULT_LOCATION, 10.0);
        let second = s
            .fetch_coefficients(&api, near, LandUseType::Solar)
            .await
            .unwrap();
        assert!(second.is_none());
        assert_eq!(api.requests().len(), 1);
        assert_eq!(s.coefficients(LandUseType::Solar).energy_production_per_hectare, 2000.0);
        assert_eq!(s.policy().last_call(LandUseType::Solar), Some(DEFAULT_LOCATION));
    }

    #[tokio::test]
    async fn test_far_location_updates_coefficients() {
        let api = FakeApi::with(vec![solar(1900.0, 660.0), solar(2000.0, 700.0)]);
        let mut s = Session::default();
        s.fetch_coefficients(&api, DEFAULT_LOCATION, LandUseType::Solar)
            .await
            .unwrap();

        let far = north_of(&DEFAULT_LOCATION, 60.0);
        let update = s
            .handle_location_update(&api, far)
            .await
            .unwrap()
            .unwrap();
        assert!(update.applied());
        assert!(update.warnings.is_empty());
        assert_eq!(update.energy_production, Some(2000.0));
        assert_eq!(s.location(), far);

        let requests = api.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].area, 10_000.0);
        assert_eq!(requests[1].land_use_type, LandUseType::Solar);
        assert_eq!(requests[1].location(), far);

        let estimate = s.handle_draw_end(20_000.0, square(28.9, -81.58, 141.0)).unwrap();
        assert_relative_eq!(estimate.energy_production, 4000.0);
        assert_relative_eq!(estimate.carbon_offset, 1400.0);
    }

    #[tokio::test]
    async fn test_http_error_leaves_state() {
        let api = FakeApi::with(vec![Reply::Status(503), Reply::Garbage]);
        let mut s = Session::default();
        let err = s
            .fetch_coefficients(&api, DEFAULT_LOCATION, LandUseType::Solar)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::HttpStatus { status: 503 }));
        assert_eq!(s.policy().last_call(LandUseType::Solar), None);

        let err = s
            .fetch_coefficients(&api, DEFAULT_LOCATION, LandUseType::Solar)
            .await
            .unwrap_err();
        assert!(err.is_network());
        assert_eq!(*s.coefficients(LandUseType::Solar), CoefficientSet::SOLAR_DEFAULT);
        assert_eq!(s.policy().last_call(LandUseType::Solar), None);
    }

    #[tokio::test]
    async fn test_invalid_field_keeps_previous_value() {
        let api = FakeApi::with(vec![Reply::Json(
            json!({ "energyProduction": "N/A", "carbonOffset": 700 }),
        )]);
        let mut s = Session::default();
        let update = s
            .fetch_coefficients(&api, DEFAULT_LOCATION, LandUseType::Solar)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(update.energy_production, None);
        assert_eq!(update.carbon_offset, Some(700.0));
        assert_eq!(update.warnings.len(), 1);
        assert_eq!(update.warnings[0].field, "energyProduction");
        let c = s.coefficients(LandUseType::Solar);
        assert_eq!(c.energy_production_per_hectare, 1850.0);
        assert_eq!(c.carbon_offset_per_hectare, 700.0);
        assert_eq!(s.policy().last_call(LandUseType::Solar), Some(DEFAULT_LOCATION));
    }

    #[tokio::test]
    async fn test_fully_invalid_response_does_not_record_location() {
        let api = FakeApi::with(vec![Reply::Json(json!({ "message": "ok" }))]);
        let mut s = Session::default();
        let update = s
            .fetch_coefficients(&api, DEFAULT_LOCATION, LandUseType::Solar)
            .await
            .unwrap()
            .unwrap();
        assert!(!update.applied());
        assert_eq!(update.warnings.len(), 2);
        assert_eq!(s.policy().last_call(LandUseType::Solar), None);
    }

    #[tokio::test]
    async fn test_negative_forest_estimate_keeps_default() {
        let api = FakeApi::with(vec![Reply::Json(json!({
            "forestResults": {
                "Plantations and Woodlots": {
                    "Pine": {
                        "potential_removal_one_year_tCO2e": -5.0,
                        "cumulative_removal_tCO2e": cumulative(5.0)
                    }
                },
                "Other Forest Types": "N/A"
            }
        }))]);
        let mut s = Session::default();
        let update = s
            .fetch_coefficients(&api, DEFAULT_LOCATION, LandUseType::Reforestation)
            .await
            .unwrap()
            .unwrap();
        assert!(!update.applied());
        assert!(update.warnings.iter().any(|w| w.field == "Plantations and Woodlots/Pine"));
        let c = s.coefficients(LandUseType::Reforestation);
        assert_eq!(c.carbon_offset_per_hectare, 3.5);
        assert!(c.carbon_offset_per_hectare >= 0.0);
        assert_eq!(s.policy().last_call(LandUseType::Reforestation), None);
    }

    #[tokio::test]
    async fn test_category_marker_keeps_valid_records() {
        let api = FakeApi::with(vec![Reply::Json(json!({
            "forestResults": {
                "Plantations and Woodlots": {
                    "Pine": {
                        "potential_removal_one_year_tCO2e": 7.0,
                        "cumulative_removal_tCO2e": cumulative(7.0)
                    }
                },
                "Other Forest Types": "N/A"
            }
        }))]);
        let mut s = Session::default();
        let update = s
            .fetch_coefficients(&api, DEFAULT_LOCATION, LandUseType::Reforestation)
            .await
            .unwrap()
            .unwrap();
        assert!(update.warnings.is_empty());
        assert_eq!(update.forest_records.len(), 1);
        assert_eq!(s.coefficients(LandUseType::Reforestation).carbon_offset_per_hectare, 7.0);
        assert_eq!(
            s.policy().last_call(LandUseType::Reforestation),
            Some(DEFAULT_LOCATION)
        );
    }

    #[tokio::test]
    async fn test_reforestation_uses_forest_results() {
        let api = FakeApi::with(vec![Reply::Json(json!({
            "forestResults": {
                "Plantations and Woodlots": {
                    "Eucalyptus": {
                        "potential_removal_one_year_tCO2e": 12.0,
                        "cumulative_removal_tCO2e": cumulative(12.0)
                    },
                    "Teak": "N/A"
                },
                "Other Forest Types": {
                    "Natural regeneration": {
                        "potential_removal_one_year_tCO2e": 6.0,
                        "cumulative_removal_tCO2e": cumulative(6.0)
                    }
                }
            }
        }))]);
        let mut s = Session::default();
        s.toggle_land_use_type();
        let update = s
            .handle_location_update(&api, DEFAULT_LOCATION)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(update.land_use, LandUseType::Reforestation);
        assert_eq!(update.forest_records.len(), 2);
        assert_eq!(update.carbon_offset, Some(9.0));
        assert_eq!(update.energy_production, None);
        assert!(update.warnings.is_empty());
        let c = s.coefficients(LandUseType::Reforestation);
        assert_eq!(c.carbon_offset_per_hectare, 9.0);
        assert_eq!(c.energy_production_per_hectare, 0.0);
        // solar cache is independent
        assert_eq!(s.policy().last_call(LandUseType::Solar), None);

        let estimate = s.handle_draw_end(20_000.0, square(28.4, -81.58, 141.0)).unwrap();
        assert_relative_eq!(estimate.carbon_offset, 18.0);
        assert_relative_eq!(estimate.energy_production, 0.0);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut s = Session::default();
        let a = DEFAULT_LOCATION;
        let b = north_of(&a, 100.0);
        let first = s.prepare_fetch(LandUseType::Solar, a).unwrap();
        let second = s.prepare_fetch(LandUseType::Solar, b).unwrap();
        assert!(second.sequence > first.sequence);

        let newer = CalculationResponse::Solar(SolarResponse {
            energy_production: Some(json!(2000)),
            carbon_offset: Some(json!(700)),
        });
        let older = CalculationResponse::Solar(SolarResponse {
            energy_production: Some(json!(1000)),
            carbon_offset: Some(json!(300)),
        });
        assert!(s.complete_fetch(&second, newer).is_some());
        assert!(s.complete_fetch(&first, older).is_none());
        assert_eq!(s.coefficients(LandUseType::Solar).energy_production_per_hectare, 2000.0);
        assert_eq!(s.policy().last_call(LandUseType::Solar), Some(b));
    }

    #[test]
    fn test_in_order_responses_both_apply() {
        let mut s = Session::default();
        let first = s.prepare_fetch(LandUseType::Solar, DEFAULT_LOCATION).unwrap();
        let second = s.prepare_fetch(LandUseType::Solar, DEFAULT_LOCATION).unwrap();
        let r = |e: f64| {
            CalculationResponse::Solar(SolarResponse {
                energy_production: Some(json!(e)),
                carbon_offset: Some(json!(1.0)),
            })
        };
        assert!(s.complete_fetch(&first, r(10.0)).is_some());
        assert!(s.complete_fetch(&second, r(20.0)).is_some());
        assert_eq!(s.coefficients(LandUseType::Solar).energy_production_per_hectare, 20.0);
    }

    #[test]
    fn test_mismatched_response_is_ignored() {
        let mut s = Session::default();
        let pending = s.prepare_fetch(LandUseType::Solar, DEFAULT_LOCATION).unwrap();
        let r = CalculationResponse::Reforestation(Default::default());
        assert!(s.complete_fetch(&pending, r).is_none());
        assert_eq!(s.policy().last_call(LandUseType::Solar), None);
    }
}
