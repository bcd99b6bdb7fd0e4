use utoipa::OpenApi;
use crate::controllers::analysis_controller;
use crate::models::analysis;

#[derive(OpenApi)]
#[openapi(
    paths(
        analysis_controller::analyze,
        analysis_controller::explore,
        analysis_controller::health
    ),
    components(
        schemas(
            analysis::AnalyzeRequest,
            analysis::AnalyzeResponse,
            analysis::ExploreRequest,
            analysis::ExploreResponse,
            analysis::ErrorResponse,
            analysis::HealthStatus
        )
    ),
    tags(
        (name = "solar-sensei", description = "Rooftop solar payoff analysis API")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/api/analyze", "/api/explore", "/api/health"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
