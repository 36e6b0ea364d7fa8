use axum::Router;
use tower_http::cors::CorsLayer;

use crate::routes::{health, market, pipeline};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/stocks", market::router())
        .nest("/api/pipeline", pipeline::router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
