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

use crate::models::{CreateMedicationRequest, MedicationError};
use crate::services::MedicationService;

impl From<MedicationError> for AppError {
    fn from(err: MedicationError) -> Self {
        let code = err.code();
        match err {
            MedicationError::NotFound(_) => AppError::not_found(code, err.to_string()),
            MedicationError::Validation(errors) => AppError::ValidationError(errors.to_string()),
            _ => AppError::internal(code, err.to_string()),
        }
    }
}

fn parse_medication_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid medication ID: {}", raw)))
}

#[axum::debug_handler]
pub async fn create_medication(
    State(config): State<Arc<AppConfig>>,
    WithRejection(Json(request), _): WithRejection<Json<CreateMedicationRequest>, AppError>,
) -> Result<Json<Value>, AppError> {
    let service = MedicationService::new(&config);
    let medication = service.create_medication(request).await?;
    Ok(Json(json!(medication)))
}

#[axum::debug_handler]
pub async fn list_medications(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = MedicationService::new(&config);
    let medications = service.list_medications().await?;
    Ok(Json(json!(medications)))
}

#[axum::debug_handler]
pub async fn get_medication(
    State(config): State<Arc<AppConfig>>,
    Path(medication_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let medication_id = parse_medication_id(&medication_id)?;
    let service = MedicationService::new(&config);
    let medication = service.get_medication(medication_id).await?;
    Ok(Json(json!(medication)))
}

#[axum::debug_handler]
pub async fn delete_medication(
    State(config): State<Arc<AppConfig>>,
    Path(medication_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let medication_id = parse_medication_id(&medication_id)?;
    let service = MedicationService::new(&config);
    service.delete_medication(medication_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
