pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::scheduling::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/generate-shift", post(handlers::handle_generate_shift))
        .route(
            "/api/business-calendar",
            post(handlers::handle_business_calendar),
        )
        .with_state(state)
}
