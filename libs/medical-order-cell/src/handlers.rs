use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use axum_extra::extract::WithRejection;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{CreateMedicalOrderRequest, MedicalOrderError};
use crate::services::MedicalOrderService;

impl From<MedicalOrderError> for AppError {
    fn from(err: MedicalOrderError) -> Self {
        let code = err.code();
        match err {
            MedicalOrderError::NotFound(_) => AppError::not_found(code, err.to_string()),
            MedicalOrderError::Validation(errors) => AppError::ValidationError(errors.to_string()),
            _ => AppError::internal(code, err.to_string()),
        }
    }
}

fn parse_id(kind: &str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {} ID: {}", kind, raw)))
}

#[axum::debug_handler]
pub async fn create_medical_order(
    State(config): State<Arc<AppConfig>>,
    WithRejection(Json(request), _): WithRejection<Json<CreateMedicalOrderRequest>, AppError>,
) -> Result<Json<Value>, AppError> {
    let service = MedicalOrderService::new(&config);

    let order = service.create_medical_order(request).await?;

    Ok(Json(json!(order)))
}

#[axum::debug_handler]
pub async fn list_appointment_orders(
    State(config): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let appointment_id = parse_id("appointment", &appointment_id)?;
    let service = MedicalOrderService::new(&config);

    let orders = service.find_by_appointment(appointment_id).await?;

    Ok(Json(json!(orders)))
}

#[axum::debug_handler]
pub async fn get_medical_order(
    State(config): State<Arc<AppConfig>>,
    Path(order_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let order_id = parse_id("medical order", &order_id)?;
    let service = MedicalOrderService::new(&config);

    let order = service.get_medical_order(order_id).await?;

    Ok(Json(json!(order)))
}

#[axum::debug_handler]
pub async fn delete_medical_order(
    State(config): State<Arc<AppConfig>>,
    Path(order_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let order_id = parse_id("medical order", &order_id)?;
    let service = MedicalOrderService::new(&config);

    service.delete_medical_order(order_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
