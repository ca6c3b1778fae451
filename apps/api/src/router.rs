use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::appointment_routes;
use auth_cell::auth_routes;
use doctor_cell::doctor_routes;
use medical_order_cell::medical_order_routes;
use medication_cell::medication_routes;
use patient_cell::create_patient_router;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    let api = Router::new()
        .nest("/auth", auth_routes(state.clone()))
        .nest("/patients", create_patient_router(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/medications", medication_routes(state.clone()))
        .nest("/medical-orders", medical_order_routes(state.clone()));

    let root = Router::new().route("/", get(|| async { "Hospital API is running!" }));

    if state.api_prefix.is_empty() {
        root.merge(api)
    } else {
        root.nest(&format!("/{}", state.api_prefix), api)
    }
}
