mod handlers;

use axum::routing::{get, post};
use axum::Router;
use playground_app::AppContext;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/analyze-challenge", post(handlers::analyze_challenge))
        .route("/analyze-kpi", post(handlers::analyze_kpi))
        .route("/analyze-website", post(handlers::analyze_website))
        .route("/analyze-retrospective", post(handlers::analyze_retrospective))
        .route("/extract", post(handlers::extract))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(ctx)
}
