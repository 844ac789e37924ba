//! Wire types and transport for the remote calculation service.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::coefficients::SQUARE_METERS_PER_HECTARE;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::forest::ForestResults;
use crate::landuse::LandUseType;
use crate::point::WGS84Point;

/// Coefficients are always requested for a one-hectare probe.
pub const PROBE_AREA_M2: f64 = SQUARE_METERS_PER_HECTARE;

/// Body of the POST request.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub area: f64,
    pub land_use_type: LandUseType,
}

impl CalculationRequest {
    pub fn probe(location: &WGS84Point, land_use: LandUseType) -> Self {
        Self {
            latitude: location.lat,
            longitude: location.lon,
            area: PROBE_AREA_M2,
            land_use_type: land_use,
        }
    }

    pub fn location(&self) -> WGS84Point {
        WGS84Point::new(self.latitude, self.longitude)
    }
}

/// Solar answer. Fields stay raw JSON so that one bad value does not reject
/// the other.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarResponse {
    /// MWh per year for the probed hectare.
    #[serde(default)]
    pub energy_production: Option<serde_json::Value>,
    /// tCO2e per year for the probed hectare.
    #[serde(default)]
    pub carbon_offset: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReforestationResponse {
    #[serde(default)]
    pub forest_results: ForestResults,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CalculationResponse {
    Solar(SolarResponse),
    Reforestation(ReforestationResponse),
}

impl CalculationResponse {
    /// Decodes a body according to the land use it was requested for.
    pub fn from_slice(land_use: LandUseType, body: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        Self::from_value(land_use, value)
    }

    pub fn from_value(land_use: LandUseType, value: serde_json::Value) -> Result<Self> {
        Ok(match land_use {
            LandUseType::Solar => CalculationResponse::Solar(serde_json::from_value(value)?),
            LandUseType::Reforestation => {
                CalculationResponse::Reforestation(serde_json::from_value(value)?)
            }
        })
    }

    pub fn land_use(&self) -> LandUseType {
        match self {
            CalculationResponse::Solar(_) => LandUseType::Solar,
            CalculationResponse::Reforestation(_) => LandUseType::Reforestation,
        }
    }
}

/// Something that can answer calculation requests.
pub trait CalculationApi {
    fn calculate(
        &self,
        request: &CalculationRequest,
    ) -> impl Future<Output = Result<CalculationResponse>> + Send;
}

/// [`CalculationApi`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpCalculationClient {
    url: String,
    client: reqwest::Client,
}

impl HttpCalculationClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            url: config.api_url.clone(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl CalculationApi for HttpCalculationClient {
    async fn calculate(&self, request: &CalculationRequest) -> Result<CalculationResponse> {
        log::debug!(
            "POST {} ({}, lat {:.5}, lon {:.5})",
            self.url,
            request.land_use_type,
            request.latitude,
            request.longitude
        );
        let response = self.client.post(&self.url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("calculation service answered {}", status);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        log::trace!("response: {} bytes", body.len());
        CalculationResponse::from_slice(request.land_use_type, &body)
    }
}
