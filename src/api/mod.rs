pub mod download;
pub mod health;
pub mod process;
pub mod results;
pub mod sample;

use crate::config::Config;
use crate::store::ResultStore;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub results: Arc<ResultStore>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let results = Arc::new(ResultStore::new(config.result_ttl));
        Self { config, results }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/api/process", post(process::process_upload))
        .route("/v1/results/:token", get(results::get_results))
        .route("/download/:token/:table", get(download::download_table))
        .route("/sample/template.csv", get(sample::template_csv))
        .layer(body_limit)
        .layer(cors)
        .with_state(state)
}
