use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::errors::AnalysisError;
use crate::models::analysis::{
    AnalysisInput, AnalysisReport, AnalysisRequest, Coordinates, ExploreSnapshot, LocationQuery,
};
use crate::services::benchmark::{compare_with_cities, user_yield};
use crate::services::finance::financial_summary;
use crate::services::geocoding_service::{Geocoder, NominatimClient};
use crate::services::insight_service::{GeminiClient, InsightAdvisor, InsightContext};
use crate::services::production_service::{ProductionProvider, provider_from_config};
use crate::services::projection::{generate_projections, sensitivity};
use crate::services::scoring::suitability;
use crate::services::sizing::estimate_system_size;

/// Bill (INR) and roof area (sq ft) used to size a map point.
pub const EXPLORE_BILL: f64 = 1000.0;
pub const EXPLORE_AREA: f64 = 100.0;

/// Runs the whole analysis pipeline for one request.
///
/// Holds only the collaborator handles; every run builds its own data, so one
/// `Analyzer` is shared by all concurrent requests.
pub struct Analyzer {
    geocoder: Arc<dyn Geocoder>,
    production: Arc<dyn ProductionProvider>,
    advisor: InsightAdvisor,
}

impl Analyzer {
    pub fn new(geocoder: Arc<dyn Geocoder>, production: Arc<dyn ProductionProvider>, advisor: InsightAdvisor) -> Self {
        Self { geocoder, production, advisor }
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let geocoder = Arc::new(NominatimClient::new(&config.geocoding)?);
        let production = provider_from_config(config)?;
        let advisor = InsightAdvisor::new(Arc::new(GeminiClient::new(&config.advisory)?));
        Ok(Self::new(geocoder, production, advisor))
    }

    /// Resolves the location, then runs the pipeline.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisReport, AnalysisError> {
        let (coordinates, label) = match request.location {
            LocationQuery::Name(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(AnalysisError::LocationNotFound);
                }
                let Some(coordinates) = self.geocoder.resolve(&name).await else {
                    warn!("location '{}' not found", name);
                    return Err(AnalysisError::LocationNotFound);
                };
                (coordinates, name)
            }
            LocationQuery::Point(coordinates) => {
                let coordinates = Coordinates::new(coordinates.lat, coordinates.lon)?;
                (coordinates, self.geocoder.reverse_resolve(coordinates).await)
            }
        };

        let input = AnalysisInput::new(coordinates, request.bill, request.area, label)?;
        self.analyze_input(input).await
    }

    /// Pipeline for an already located input.
    pub async fn analyze_input(&self, input: AnalysisInput) -> Result<AnalysisReport, AnalysisError> {
        let system_size_kw = estimate_system_size(input.bill(), input.area());

        let production = self.production
            .estimate(input.coordinates(), system_size_kw)
            .await
            .map_err(|e| {
                warn!("production estimate for '{}' failed: {}", input.location(), e);
                AnalysisError::from(e)
            })?;

        let financial = financial_summary(system_size_kw, production.annual_kwh);
        let projection = generate_projections(financial.annual_savings as f64, financial.gross_cost as f64);
        let yield_per_kw = user_yield(production.annual_kwh, system_size_kw);
        let comparison = compare_with_cities(yield_per_kw);
        let suitability = suitability(production.flux);

        let insights = self.advisor.insights(&InsightContext {
            location: input.location().to_string(),
            capacity_kw: system_size_kw,
            annual_savings: financial.annual_savings,
            net_cost: financial.net_cost,
            roi_years: financial.roi_years,
            flux: production.flux,
        }).await;

        info!(
            "analysis for '{}': {} kW, {} kWh/yr ({:?}), score {}",
            input.location(), system_size_kw, production.annual_kwh, production.source, suitability.score
        );

        Ok(AnalysisReport {
            input,
            system_size_kw,
            production,
            financial,
            projection,
            sensitivity: sensitivity(yield_per_kw),
            comparison,
            suitability,
            insights,
        })
    }

    /// Per-kW snapshot of a map point, sized as a small standard system.
    pub async fn explore(&self, coordinates: Coordinates) -> Result<ExploreSnapshot, AnalysisError> {
        let coordinates = Coordinates::new(coordinates.lat, coordinates.lon)?;
        let location = self.geocoder.reverse_resolve(coordinates).await;
        let input = AnalysisInput::new(coordinates, EXPLORE_BILL, EXPLORE_AREA, location)?;
        let report = self.analyze_input(input).await?;

        Ok(ExploreSnapshot {
            location: report.input.location().to_string(),
            coords: format!("{:.4}°N, {:.4}°E", coordinates.lat, coordinates.lon),
            flux: report.production.flux,
            per_kw_gen: user_yield(report.production.annual_kwh, report.system_size_kw),
            suitability: report.suitability.score,
            tag: report.suitability.tag,
        })
    }
}
