use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AnalysisError;

// ─── Core analysis data model ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, AnalysisError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(AnalysisError::InvalidInput(format!("latitude {lat} out of range")));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(AnalysisError::InvalidInput(format!("longitude {lon} out of range")));
        }
        Ok(Self { lat, lon })
    }
}

/// Where the caller wants the analysis run: a place name or a point on the map.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Name(String),
    Point(Coordinates),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub location: LocationQuery,
    pub bill: f64,
    pub area: f64,
}

/// Validated input of one analysis run. Fields are private so a value can only
/// exist once bill and area have been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisInput {
    coordinates: Coordinates,
    bill: f64,
    area: f64,
    location: String,
}

impl AnalysisInput {
    pub fn new(coordinates: Coordinates, bill: f64, area: f64, location: impl Into<String>) -> Result<Self, AnalysisError> {
        if !bill.is_finite() || bill < 0.0 {
            return Err(AnalysisError::InvalidInput(format!("monthly bill {bill} must be a non-negative number")));
        }
        if !area.is_finite() || area < 0.0 {
            return Err(AnalysisError::InvalidInput(format!("roof area {area} must be a non-negative number")));
        }
        Ok(Self { coordinates, bill, area, location: location.into() })
    }

    pub fn coordinates(&self) -> Coordinates { self.coordinates }
    pub fn bill(&self) -> f64 { self.bill }
    pub fn area(&self) -> f64 { self.area }
    pub fn location(&self) -> &str { &self.location }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProductionSource {
    /// Figures returned by the PVWatts service
    Pvwatts,
    /// Figures derived from capacity alone, offline
    Simulated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductionResult {
    /// Annual AC generation (kWh)
    pub annual_kwh: f64,
    /// Monthly AC generation, January first (kWh)
    pub monthly_kwh: Vec<f64>,
    /// Average solar radiation (kWh/m²/day)
    pub flux: f64,
    pub source: ProductionSource,
}

/// Money values are whole rupees.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialSummary {
    pub gross_cost: i64,
    pub subsidy: i64,
    pub net_cost: i64,
    pub annual_savings: i64,
    /// Payback years; 99 when there are no savings to pay back with
    pub roi_years: f64,
    /// Avoided CO2 (tonnes/year)
    pub co2_tonnes: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionSeries {
    /// Cumulative grid spend without solar, per year
    pub grid: Vec<i64>,
    /// Cumulative net position with solar, per year
    pub solar: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SensitivitySeries {
    /// Candidate system sizes (kW)
    pub sizes: Vec<u32>,
    /// Annual savings for each candidate size at the user's yield
    pub savings: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CityComparison {
    pub city: String,
    /// Reference yield of the city (kWh per kW per year)
    #[serde(rename = "yield")]
    pub reference_yield: u32,
    /// The user's yield (kWh per kW per year)
    pub user: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum SuitabilityTag {
    Good,
    Great,
    Excellent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suitability {
    pub score: u8,
    pub tag: SuitabilityTag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InsightSource {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insights {
    pub items: Vec<String>,
    pub source: InsightSource,
}

/// Everything one analysis run produced. Handed to the caller by value.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub input: AnalysisInput,
    pub system_size_kw: f64,
    pub production: ProductionResult,
    pub financial: FinancialSummary,
    pub projection: ProjectionSeries,
    pub sensitivity: SensitivitySeries,
    pub comparison: Vec<CityComparison>,
    pub suitability: Suitability,
    pub insights: Insights,
}

/// Per-kW summary of a map point.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ExploreSnapshot {
    pub location: String,
    pub coords: String,
    pub flux: f64,
    pub per_kw_gen: i64,
    pub suitability: u8,
    pub tag: SuitabilityTag,
}

// ─── PVWatts wire types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PvWattsResponse {
    #[serde(default)]
    pub errors: Vec<String>,
    pub outputs: Option<PvWattsOutputs>,
}

#[derive(Debug, Deserialize)]
pub struct PvWattsOutputs {
    pub ac_annual: f64,
    pub ac_monthly: Vec<f64>,
    pub solrad_annual: f64,
}

// ─── Gemini wire types ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

// ─── Nominatim wire types ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
}

#[derive(Debug, Deserialize)]
pub struct NominatimReverse {
    pub address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
pub struct NominatimAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub state: Option<String>,
}

// ─── REST API request / response types ───────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Place name to geocode; ignored when `lat` and `lon` are both given
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Monthly electricity bill (INR), as a number or a numeric string
    #[serde(default, deserialize_with = "number_or_numeric_string")]
    pub bill: f64,
    /// Available roof area (sq ft), as a number or a numeric string
    #[serde(default, deserialize_with = "number_or_numeric_string")]
    pub area: f64,
}

/// Form fields arrive as strings (`"3000"`) from the web front end.
fn number_or_numeric_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(value) => Ok(value),
        NumberOrString::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("expected a number, got {text:?}"))),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExploreRequest {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Metrics {
    pub system_size: f64,
    pub cost: i64,
    pub subsidy: i64,
    pub final_cost: i64,
    pub savings: i64,
    pub roi: f64,
    pub co2: f64,
    pub monthly_gen: Vec<f64>,
    pub generation: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GridVsSolar {
    pub grid: Vec<i64>,
    pub solar: Vec<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Graphs {
    pub grid_vs_solar: GridVsSolar,
    pub sensitivity: SensitivitySeries,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub location: String,
    pub coordinates: Coordinates,
    pub metrics: Metrics,
    pub graphs: Graphs,
    pub comparison: Vec<CityComparison>,
    pub ai_insights: Vec<String>,
    pub insight_source: InsightSource,
    pub production_source: ProductionSource,
    pub flux: f64,
    pub score: u8,
    pub tag: SuitabilityTag,
}

impl From<AnalysisReport> for AnalyzeResponse {
    fn from(report: AnalysisReport) -> Self {
        Self {
            success: true,
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            location: report.input.location().to_string(),
            coordinates: report.input.coordinates(),
            metrics: Metrics {
                system_size: report.system_size_kw,
                cost: report.financial.gross_cost,
                subsidy: report.financial.subsidy,
                final_cost: report.financial.net_cost,
                savings: report.financial.annual_savings,
                roi: report.financial.roi_years,
                co2: report.financial.co2_tonnes,
                monthly_gen: report.production.monthly_kwh,
                generation: report.production.annual_kwh,
            },
            graphs: Graphs {
                grid_vs_solar: GridVsSolar {
                    grid: report.projection.grid,
                    solar: report.projection.solar,
                },
                sensitivity: report.sensitivity,
            },
            comparison: report.comparison,
            ai_insights: report.insights.items,
            insight_source: report.insights.source,
            production_source: report.production.source,
            flux: report.production.flux,
            score: report.suitability.score,
            tag: report.suitability.tag,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExploreResponse {
    pub success: bool,
    #[serde(flatten)]
    pub snapshot: ExploreSnapshot,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub offline_mode: bool,
    pub production_configured: bool,
    pub advisory_configured: bool,
}
