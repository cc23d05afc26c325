pub mod api_routes;

use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::service::StoryService;
use api_routes::{
    abandon_handler, choose_handler, delete_story_handler, get_story_handler,
    list_stories_handler, reference_data_handler, save_session_handler, session_view_handler,
    start_story_handler, stats_handler,
};

pub fn router(service: StoryService, cors_allow_origin: Option<&str>) -> Router {
    Router::new()
        .route("/api/cultures", get(reference_data_handler))
        // Live stories
        .route("/api/sessions", post(start_story_handler))
        .route("/api/sessions/{id}", get(session_view_handler).delete(abandon_handler))
        .route("/api/sessions/{id}/choices", post(choose_handler))
        .route("/api/sessions/{id}/save", post(save_session_handler))
        // Saved stories
        .route("/api/stories", get(list_stories_handler))
        .route("/api/stories/stats", get(stats_handler))
        .route("/api/stories/{id}", get(get_story_handler).delete(delete_story_handler))
        .layer(cors_layer(cors_allow_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

fn cors_layer(allow_origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);
    match allow_origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(e)) => {
            warn!("Ignoring invalid CORS_ALLOW_ORIGIN: {e}");
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}
