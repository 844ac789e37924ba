//! Runtime configuration, read from the environment.

use std::str::FromStr;
use std::time::Duration;

use crate::cache_policy::DEFAULT_THRESHOLD_KM;

pub const API_URL_VAR: &str = "LAND_COMPARE_API_URL";
pub const RECALC_KM_VAR: &str = "LAND_COMPARE_RECALC_KM";
pub const TIMEOUT_VAR: &str = "LAND_COMPARE_TIMEOUT_SECS";

/// Used when `LAND_COMPARE_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/calculate";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Calculation endpoint receiving the POST requests.
    pub api_url: String,
    /// Movement in km before coefficients are requested again.
    pub recalc_threshold_km: f64,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            recalc_threshold_km: DEFAULT_THRESHOLD_KM,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source. Missing variables
    /// take their default; unparseable ones are logged and take their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let api_url = lookup(API_URL_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_url);
        let recalc_threshold_km = parse_var(&lookup, RECALC_KM_VAR)
            .and_then(|km| threshold_km(RECALC_KM_VAR, km))
            .unwrap_or(defaults.recalc_threshold_km);
        let request_timeout = parse_var(&lookup, TIMEOUT_VAR)
            .and_then(|secs| timeout(TIMEOUT_VAR, secs))
            .unwrap_or(defaults.request_timeout);
        Self {
            api_url,
            recalc_threshold_km,
            request_timeout,
        }
    }

    /// Overrides the threshold; invalid values are logged and ignored.
    pub fn set_recalc_threshold_km(&mut self, source: &str, km: f64) {
        if let Some(km) = threshold_km(source, km) {
            self.recalc_threshold_km = km;
        }
    }

    /// Overrides the timeout; zero is logged and ignored.
    pub fn set_request_timeout_secs(&mut self, source: &str, secs: u64) {
        if let Some(t) = timeout(source, secs) {
            self.request_timeout = t;
        }
    }
}

fn threshold_km(source: &str, km: f64) -> Option<f64> {
    if km.is_finite() && km >= 0.0 {
        return Some(km);
    }
    log::warn!("ignoring {}={}: must be a non-negative number", source, km);
    None
}

fn timeout(source: &str, secs: u64) -> Option<Duration> {
    if secs == 0 {
        log::warn!("ignoring {}=0: timeout must be positive", source);
        return None;
    }
    Some(Duration::from_secs(secs))
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("ignoring {}={:?}: cannot parse", key, raw);
            None
        }
    }
}
