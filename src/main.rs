mod routes;
mod controllers;
mod services;
mod models;
mod api_docs;
mod shared_state;
mod config;
mod errors;

use std::net::SocketAddr;
use axum::{Router, routing::get, response::Html};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use crate::api_docs::ApiDoc;
use crate::config::{ADVISORY_KEY_ENV, Config, PRODUCTION_KEY_ENV};
use crate::routes::analysis_routes::api_routes;
use crate::services::analysis_service::Analyzer;
use crate::shared_state::AppState;

#[cfg(feature = "verbose_log")]
const DEFAULT_LOG_FILTER: &str = "debug";
#[cfg(not(feature = "verbose_log"))]
const DEFAULT_LOG_FILTER: &str = "info";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .init();

    // 1. Load configuration
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load {}: {}", config_path, e);
            return;
        }
    };
    info!("{} found: {}", PRODUCTION_KEY_ENV, if config.production.api_key.is_some() { "yes" } else { "no" });
    info!("{} found: {}", ADVISORY_KEY_ENV, if config.advisory.api_key.is_some() { "yes" } else { "no" });
    if config.offline_mode {
        warn!("offline mode: production figures are simulated and flagged as such");
    }

    // 2. Build the analysis pipeline
    let analyzer = match Analyzer::from_config(&config) {
        Ok(a) => a,
        Err(e) => {
            error!("Failed to build HTTP clients: {}", e);
            return;
        }
    };
    let server_port = config.server.port;
    let state = AppState::new(config, analyzer);

    // 3. Start Axum HTTP server
    let app = Router::new()
        .nest("/api", api_routes(state))
        .route("/scalar", get(|| async {
            Html(Scalar::new(ApiDoc::openapi()).to_html())
        }))
        .fallback_service(ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], server_port));
    info!("API Server listening on http://{}", addr);
    info!("Scalar UI: http://{}/scalar", addr);

    if let Err(e) = axum_server::bind(addr).serve(app.into_make_service()).await {
        error!("HTTP server error: {}", e);
    }
}
