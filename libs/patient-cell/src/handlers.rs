use std::sync::Arc;
use axum::{
    extract::{Path, Query, State, Extension},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use axum_extra::extract::WithRejection;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CreatePatientRequest, UpdatePatientRequest, PatientSearchQuery, PatientError};
use crate::services::PatientService;

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        let code = err.code();
        match err {
            PatientError::NotFound(_) | PatientError::IdentificationNotFound(_) => {
                AppError::not_found(code, err.to_string())
            }
            PatientError::AlreadyExists { .. } => AppError::conflict(code, err.to_string()),
            PatientError::Validation(errors) => AppError::ValidationError(errors.to_string()),
            PatientError::CreationFailed
            | PatientError::UpdateFailed
            | PatientError::DeletionFailed
            | PatientError::RetrievalFailed => AppError::internal(code, err.to_string()),
        }
    }
}

pub(crate) fn parse_patient_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid patient ID: {}", raw)))
}

#[axum::debug_handler]
pub async fn create_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    WithRejection(Json(request), _): WithRejection<Json<CreatePatientRequest>, AppError>,
) -> Result<Json<Value>, AppError> {
    debug!("User {} registering patient {}", user.username, request.identification);
    let service = PatientService::new(&config);

    let patient = service.create_patient(request).await?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn list_patients(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patients = service.list_patients().await?;

    Ok(Json(json!(patients)))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(config): State<Arc<AppConfig>>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let patient_id = parse_patient_id(&patient_id)?;
    let service = PatientService::new(&config);

    let patient = service.get_patient(patient_id).await?;

    Ok(Json(json!(patient)))
}

/// Looks a patient up by national identification number.
#[axum::debug_handler]
pub async fn search_patient(
    State(config): State<Arc<AppConfig>>,
    WithRejection(Query(query), _): WithRejection<Query<PatientSearchQuery>, AppError>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&config);

    let patient = service.find_by_identification(&query.id).await?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<String>,
    WithRejection(Json(request), _): WithRejection<Json<UpdatePatientRequest>, AppError>,
) -> Result<Json<Value>, AppError> {
    let patient_id = parse_patient_id(&patient_id)?;
    debug!("User {} updating patient {}", user.username, patient_id);
    let service = PatientService::new(&config);

    let patient = service.update_patient(patient_id, request).await?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let patient_id = parse_patient_id(&patient_id)?;
    debug!("User {} deleting patient {}", user.username, patient_id);
    let service = PatientService::new(&config);

    service.delete_patient(patient_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
