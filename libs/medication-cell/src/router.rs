use std::sync::Arc;
use axum::{middleware, routing::get, Router};
use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn medication_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(list_medications).post(create_medication))
        .route("/{id}", get(get_medication).delete(delete_medication))
        .layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state(config)
}
