use axum::{routing::{get, post}, Router};

use crate::controllers::analysis_controller::{analyze, explore, health};
use crate::shared_state::AppState;

/// Build the `/api/*` sub-router.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/explore", post(explore))
        .route("/health",  get(health))
        .with_state(state)
}
