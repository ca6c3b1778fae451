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

use crate::models::{CreateDoctorRequest, UpdateDoctorRequest, DoctorSearchQuery, DoctorError};
use crate::services::DoctorService;

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        let code = err.code();
        match err {
            DoctorError::NotFound(_) | DoctorError::IdentificationNotFound(_) => {
                AppError::not_found(code, err.to_string())
            }
            DoctorError::AlreadyExists => AppError::conflict(code, err.to_string()),
            DoctorError::Validation(errors) => AppError::ValidationError(errors.to_string()),
            DoctorError::CreationFailed
            | DoctorError::UpdateFailed
            | DoctorError::DeletionFailed
            | DoctorError::RetrievalFailed => AppError::internal(code, err.to_string()),
        }
    }
}

fn parse_doctor_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid doctor ID: {}", raw)))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    WithRejection(Json(request), _): WithRejection<Json<CreateDoctorRequest>, AppError>,
) -> Result<Json<Value>, AppError> {
    debug!("User {} registering doctor {}", user.username, request.identification);
    let doctor_service = DoctorService::new(&config);

    let doctor = doctor_service.create_doctor(request).await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&config);

    let doctors = doctor_service.list_doctors().await?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = parse_doctor_id(&doctor_id)?;
    let doctor_service = DoctorService::new(&config);

    let doctor = doctor_service.get_doctor(doctor_id).await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn search_doctor(
    State(config): State<Arc<AppConfig>>,
    WithRejection(Query(query), _): WithRejection<Query<DoctorSearchQuery>, AppError>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&config);

    let doctor = doctor_service.find_by_identification(&query.id).await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<String>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateDoctorRequest>, AppError>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = parse_doctor_id(&doctor_id)?;
    debug!("User {} updating doctor {}", user.username, doctor_id);
    let doctor_service = DoctorService::new(&config);

    let doctor = doctor_service.update_doctor(doctor_id, request).await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let doctor_id = parse_doctor_id(&doctor_id)?;
    debug!("User {} deleting doctor {}", user.username, doctor_id);
    let doctor_service = DoctorService::new(&config);

    doctor_service.delete_doctor(doctor_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
