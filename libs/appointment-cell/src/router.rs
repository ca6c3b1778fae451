use std::sync::Arc;
use axum::{middleware, routing::{get, patch}, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn appointment_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(list_appointments).post(book_appointment))
        .route("/available-doctors", get(get_available_doctors))
        .route("/search", get(search_appointments))
        .route("/{id}", get(get_appointment).delete(delete_appointment))
        .route("/{id}/status", patch(update_appointment_status))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
