use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::errors::AnalysisError;
use crate::models::analysis::{
    AnalysisRequest, AnalyzeRequest, AnalyzeResponse, Coordinates, ErrorResponse, ExploreRequest,
    ExploreResponse, HealthStatus, LocationQuery,
};
use crate::shared_state::AppState;

/// POST /api/analyze
/// Full solar analysis for a place
///
/// Takes either a place name or a `lat`/`lon` pair, plus the monthly bill and
/// the free roof area. Returns sizing, costs, subsidy, payback, 25-year
/// projections, city benchmarks, suitability score and advisory insights.
#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Analysis report", body = AnalyzeResponse),
        (status = 400, description = "Invalid input or location not found", body = ErrorResponse),
        (status = 502, description = "Production data unavailable", body = ErrorResponse),
        (status = 503, description = "Service not configured", body = ErrorResponse)
    )
)]
pub async fn analyze(State(state): State<AppState>, payload: Result<Json<AnalyzeRequest>, JsonRejection>) -> Response {
    let request = match analysis_request(payload) {
        Ok(request) => request,
        Err(e) => return failure(e),
    };
    info!("analyze request: {:?}", request.location);

    match state.analyzer.analyze(request).await {
        Ok(report) => (StatusCode::OK, Json(AnalyzeResponse::from(report))).into_response(),
        Err(e) => failure(e),
    }
}

/// POST /api/explore
/// Per-kW snapshot of a map point
///
/// Reverse-geocodes the point and sizes it as a 1 kW system.
#[utoipa::path(
    post,
    path = "/api/explore",
    request_body = ExploreRequest,
    responses(
        (status = 200, description = "Location snapshot", body = ExploreResponse),
        (status = 400, description = "Invalid coordinates", body = ErrorResponse),
        (status = 502, description = "Production data unavailable", body = ErrorResponse),
        (status = 503, description = "Service not configured", body = ErrorResponse)
    )
)]
pub async fn explore(State(state): State<AppState>, payload: Result<Json<ExploreRequest>, JsonRejection>) -> Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return failure(invalid_body(rejection)),
    };
    match state.analyzer.explore(Coordinates { lat: body.lat, lon: body.lon }).await {
        Ok(snapshot) => (StatusCode::OK, Json(ExploreResponse { success: true, snapshot })).into_response(),
        Err(e) => failure(e),
    }
}

/// GET /api/health
/// Service status
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service status", body = HealthStatus)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        offline_mode: state.config.offline_mode,
        production_configured: state.config.production.api_key.is_some(),
        advisory_configured: state.config.advisory.api_key.is_some(),
    })
}

fn analysis_request(payload: Result<Json<AnalyzeRequest>, JsonRejection>) -> Result<AnalysisRequest, AnalysisError> {
    let Json(body) = payload.map_err(invalid_body)?;
    let location = match (body.lat, body.lon, body.location) {
        (Some(lat), Some(lon), _) => LocationQuery::Point(Coordinates { lat, lon }),
        (_, _, Some(name)) => LocationQuery::Name(name),
        _ => return Err(AnalysisError::InvalidInput("location or lat/lon is required".to_string())),
    };
    Ok(AnalysisRequest { location, bill: body.bill, area: body.area })
}

/// Malformed bodies get the same JSON error envelope as every other failure.
fn invalid_body(rejection: JsonRejection) -> AnalysisError {
    AnalysisError::InvalidInput(rejection.body_text())
}

fn status_for(error: &AnalysisError) -> StatusCode {
    match error {
        AnalysisError::LocationNotFound | AnalysisError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AnalysisError::ProductionDataUnavailable(_) => StatusCode::BAD_GATEWAY,
        AnalysisError::ConfigurationMissing(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn failure(error: AnalysisError) -> Response {
    let status = status_for(&error);
    (status, Json(ErrorResponse { success: false, error: error.to_string() })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_status_codes() {
        assert_eq!(status_for(&AnalysisError::LocationNotFound), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&AnalysisError::InvalidInput("x".to_string())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&AnalysisError::ProductionDataUnavailable("x".to_string())), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(&AnalysisError::ConfigurationMissing("NREL_API_KEY".to_string())), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn string_form_fields_build_a_request() {
        let payload = Json::<AnalyzeRequest>::from_bytes(br#"{"location":"Mumbai","bill":"3000","area":"300"}"#);
        let request = analysis_request(payload).unwrap();

        assert_eq!(request.location, LocationQuery::Name("Mumbai".to_string()));
        assert_eq!(request.bill, 3000.0);
        assert_eq!(request.area, 300.0);
    }

    #[test]
    fn coordinates_win_over_name() {
        let payload = Json::<AnalyzeRequest>::from_bytes(br#"{"location":"Mumbai","lat":12.97,"lon":77.59,"bill":1000,"area":100}"#);
        let request = analysis_request(payload).unwrap();
        assert_eq!(request.location, LocationQuery::Point(Coordinates { lat: 12.97, lon: 77.59 }));
    }

    #[test]
    fn missing_location_is_invalid_input() {
        let payload = Json::<AnalyzeRequest>::from_bytes(br#"{"bill":1000,"area":100}"#);
        assert!(matches!(analysis_request(payload), Err(AnalysisError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn rejected_body_is_a_json_bad_request() {
        let payload = Json::<AnalyzeRequest>::from_bytes(br#"{"location":"Mumbai","bill":"lots","area":"300"}"#);
        let err = analysis_request(payload).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));

        let response = failure(err);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid input"));
    }

    #[test]
    fn failure_uses_error_status() {
        let response = failure(AnalysisError::LocationNotFound);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
