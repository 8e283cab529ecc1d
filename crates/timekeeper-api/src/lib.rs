pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::config::Config;
use crate::routes::{health, meetings, root, templates};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        root::greeting,
        health::health_check,
        meetings::list_meetings,
        meetings::create_meeting,
        meetings::update_meeting,
        meetings::delete_meeting,
        templates::list_templates,
        templates::create_template,
        templates::update_template,
        templates::delete_template,
    ),
    components(schemas(
        timekeeper_types::Meeting,
        timekeeper_types::MeetingStatus,
        timekeeper_types::AgendaItem,
        timekeeper_types::Template,
        root::Greeting,
        health::HealthResponse,
    )),
    tags(
        (name = "meetings", description = "Scheduled meetings"),
        (name = "templates", description = "Reusable agenda templates"),
        (name = "health", description = "Service status")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/docs", get(openapi_json))
        // Meetings
        .route(
            "/meetings",
            get(meetings::list_meetings).post(meetings::create_meeting),
        )
        .route(
            "/meetings/:id",
            put(meetings::update_meeting).delete(meetings::delete_meeting),
        )
        // Templates
        .route(
            "/templates",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/templates/:id",
            put(templates::update_template).delete(templates::delete_template),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api", get(root::greeting))
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn(middleware::logging::log_request))
        .layer(TimeoutLayer::new(state.config.server.request_timeout()))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors.allow_origin(Any)
        } else {
            let parsed_origins: Vec<axum::http::HeaderValue> = config
                .cors
                .origins
                .iter()
                .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
                .collect();

            cors.allow_origin(parsed_origins)
        }
    } else {
        CorsLayer::permissive()
    }
}
