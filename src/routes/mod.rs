use axum::{
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::error::AppResult;
use crate::handlers::{businesses, health, map};
use crate::middleware::cors::cors_layer;
use crate::AppState;

pub fn create_router(state: AppState) -> AppResult<Router> {
    let cors = cors_layer(&state.config.api.cors_origin)?;

    // Public API routes, all JSON
    let api_routes = Router::new()
        .route("/businesses", get(businesses::list_businesses))
        .route("/locate", get(map::locate))
        .route("/map-config", get(map::map_config))
        .route("/health", get(health::health))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        ))
        .layer(cors);

    Ok(Router::new().nest("/api", api_routes).with_state(state))
}
