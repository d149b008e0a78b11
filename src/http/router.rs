//! Route table and middleware stack.

use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let channels = Router::new()
        .route("/channels/{channel}/summary", get(handlers::get_summary))
        .route("/channels/{channel}/patterns", get(handlers::get_patterns))
        .route("/channels/{channel}/calendar", get(handlers::get_calendar))
        .route("/channels/{channel}/forecast", get(handlers::get_forecast))
        .route("/channels/{channel}/report", get(handlers::get_report))
        .route(
            "/channels/{channel}/report.md",
            get(handlers::get_report_markdown),
        )
        .route("/channels/{channel}/ab-test", post(handlers::post_ab_test))
        .route("/channels/{channel}/chat", post(handlers::post_chat));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/v1", channels)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::sources::DemoSource;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let settings = Settings::default();
        let source = Arc::new(DemoSource::new(settings.demo_seed));
        let state = AppState::new(source, None, settings);
        let _router = create_router(state);
    }
}
