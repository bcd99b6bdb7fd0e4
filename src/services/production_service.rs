use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::{Config, PRODUCTION_KEY_ENV, ProductionConfig};
use crate::errors::ProductionError;
use crate::models::analysis::{Coordinates, ProductionResult, ProductionSource, PvWattsResponse};
use crate::services::round_to;

// Fixed installation parameters sent to PVWatts
const AZIMUTH_DEG: f64 = 180.0;
const TILT_DEG: f64 = 20.0;
const ARRAY_TYPE: u8 = 1;
const MODULE_TYPE: u8 = 1;
const SYSTEM_LOSSES_PCT: f64 = 14.0;
const API_KEY_HEADER: &str = "X-Api-Key";

/// Annual kWh per installed kW used by the offline simulation.
pub const SIMULATED_KWH_PER_KW: f64 = 1400.0;
/// Average flux (kWh/m²/day) reported by the offline simulation.
pub const SIMULATED_FLUX: f64 = 5.5;

/// Source of annual and monthly generation figures for a site.
#[async_trait]
pub trait ProductionProvider: Send + Sync {
    fn source(&self) -> ProductionSource;

    async fn estimate(&self, coordinates: Coordinates, capacity_kw: f64) -> Result<ProductionResult, ProductionError>;
}

/// Picks the provider for the whole process: the offline simulation when
/// `offline_mode` is set, PVWatts otherwise.
pub fn provider_from_config(config: &Config) -> Result<Arc<dyn ProductionProvider>, reqwest::Error> {
    if config.offline_mode {
        return Ok(Arc::new(SimulatedProduction));
    }
    if config.production.api_key.is_none() {
        warn!("{} is not set, production requests will fail until it is configured", PRODUCTION_KEY_ENV);
    }
    Ok(Arc::new(PvWattsClient::new(&config.production)?))
}

/// PVWatts v8 client
pub struct PvWattsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PvWattsClient {
    pub fn new(config: &ProductionConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl ProductionProvider for PvWattsClient {
    fn source(&self) -> ProductionSource {
        ProductionSource::Pvwatts
    }

    async fn estimate(&self, coordinates: Coordinates, capacity_kw: f64) -> Result<ProductionResult, ProductionError> {
        let api_key = self.api_key.as_deref().ok_or(ProductionError::MissingCredential(PRODUCTION_KEY_ENV))?;

        debug!("requesting PVWatts estimate for {:.4},{:.4} at {} kW", coordinates.lat, coordinates.lon, capacity_kw);
        // The key travels in a header so it never ends up in a URL
        let response = self.client.get(&self.base_url)
            .header(API_KEY_HEADER, api_key)
            .query(&[
                ("lat", coordinates.lat.to_string()),
                ("lon", coordinates.lon.to_string()),
                ("system_capacity", capacity_kw.to_string()),
                ("azimuth", AZIMUTH_DEG.to_string()),
                ("tilt", TILT_DEG.to_string()),
                ("array_type", ARRAY_TYPE.to_string()),
                ("module_type", MODULE_TYPE.to_string()),
                ("losses", SYSTEM_LOSSES_PCT.to_string()),
            ])
            .send().await?;

        // PVWatts reports most failures in the body, so the status alone is not enough
        let status = response.status();
        let body = response.text().await?;
        let parsed: PvWattsResponse = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                ProductionError::from(e)
            } else {
                ProductionError::Request(format!("HTTP {}", status))
            }
        })?;

        if !parsed.errors.is_empty() {
            return Err(ProductionError::Service(parsed.errors.join("; ")));
        }
        if !status.is_success() {
            return Err(ProductionError::Request(format!("HTTP {}", status)));
        }

        let outputs = parsed.outputs.ok_or_else(|| ProductionError::Malformed("missing outputs".to_string()))?;
        if outputs.ac_monthly.len() != 12 {
            return Err(ProductionError::Malformed(format!("expected 12 monthly values, got {}", outputs.ac_monthly.len())));
        }
        if !(outputs.solrad_annual > 0.0) {
            return Err(ProductionError::Malformed(format!("non-positive solar radiation {}", outputs.solrad_annual)));
        }

        Ok(ProductionResult {
            annual_kwh: outputs.ac_annual.trunc(),
            monthly_kwh: outputs.ac_monthly,
            flux: round_to(outputs.solrad_annual, 2),
            source: ProductionSource::Pvwatts,
        })
    }
}

/// Offline estimate derived from capacity alone. No network calls.
pub struct SimulatedProduction;

#[async_trait]
impl ProductionProvider for SimulatedProduction {
    fn source(&self) -> ProductionSource {
        ProductionSource::Simulated
    }

    async fn estimate(&self, _coordinates: Coordinates, capacity_kw: f64) -> Result<ProductionResult, ProductionError> {
        Ok(get_offline_data(capacity_kw))
    }
}

pub fn get_offline_data(capacity_kw: f64) -> ProductionResult {
    let annual_kwh = (capacity_kw * SIMULATED_KWH_PER_KW).trunc();
    ProductionResult {
        annual_kwh,
        monthly_kwh: vec![annual_kwh / 12.0; 12],
        flux: SIMULATED_FLUX,
        source: ProductionSource::Simulated,
    }
}
