use std::sync::Arc;
use axum::{middleware, routing::{get, post}, Router};
use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn medical_order_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(create_medical_order))
        .route("/appointment/{appointment_id}", get(list_appointment_orders))
        .route("/{id}", get(get_medical_order).delete(delete_medical_order))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
