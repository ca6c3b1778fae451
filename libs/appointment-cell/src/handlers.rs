use std::sync::Arc;
use axum::{
    extract::{Path, Query, State, Extension},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use axum_extra::extract::WithRejection;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, AppointmentSearchQuery, AvailableDoctorsQuery, BookAppointmentRequest,
    UpdateAppointmentStatusRequest,
};
use crate::services::AppointmentSchedulingService;

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        let code = err.code();
        match err {
            AppointmentError::DoctorNotFound(_)
            | AppointmentError::PatientNotFound(_)
            | AppointmentError::NotFound(_) => AppError::not_found(code, err.to_string()),
            AppointmentError::DoctorNotAvailable { .. } => AppError::conflict(code, err.to_string()),
            AppointmentError::CreationFailed
            | AppointmentError::UpdateFailed
            | AppointmentError::DeletionFailed
            | AppointmentError::RetrievalFailed => AppError::internal(code, err.to_string()),
        }
    }
}

fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {}: {}", field, raw)))
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date {}, expected YYYY-MM-DD", raw)))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    WithRejection(Json(request), _): WithRejection<Json<BookAppointmentRequest>, AppError>,
) -> Result<Json<Value>, AppError> {
    debug!("User {} booking appointment for patient {}", user.username, request.patient_id);
    let scheduling_service = AppointmentSchedulingService::from_config(&config);

    let appointment = scheduling_service
        .book(request.doctor_id, request.patient_id, request.appointment_date)
        .await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let scheduling_service = AppointmentSchedulingService::from_config(&config);

    let appointments = scheduling_service.find_all().await?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn get_available_doctors(
    State(config): State<Arc<AppConfig>>,
    WithRejection(Query(query), _): WithRejection<Query<AvailableDoctorsQuery>, AppError>,
) -> Result<Json<Value>, AppError> {
    let date = parse_date(&query.date)?;
    let scheduling_service = AppointmentSchedulingService::from_config(&config);

    let doctors = scheduling_service.get_available_doctors(date).await?;

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn search_appointments(
    State(config): State<Arc<AppConfig>>,
    WithRejection(Query(query), _): WithRejection<Query<AppointmentSearchQuery>, AppError>,
) -> Result<Json<Value>, AppError> {
    let patient_id = parse_uuid("patient ID", &query.patient_id)?;
    let date = parse_date(&query.date)?;
    let scheduling_service = AppointmentSchedulingService::from_config(&config);

    let appointments = scheduling_service.find_by_patient_and_date(patient_id, date).await?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(config): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let appointment_id = parse_uuid("appointment ID", &appointment_id)?;
    let scheduling_service = AppointmentSchedulingService::from_config(&config);

    let appointment = scheduling_service.find_one(appointment_id).await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<String>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateAppointmentStatusRequest>, AppError>,
) -> Result<Json<Value>, AppError> {
    let appointment_id = parse_uuid("appointment ID", &appointment_id)?;
    debug!("User {} setting appointment {} to {}", user.username, appointment_id, request.status);
    let scheduling_service = AppointmentSchedulingService::from_config(&config);

    let appointment = scheduling_service.update_status(appointment_id, request.status).await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let appointment_id = parse_uuid("appointment ID", &appointment_id)?;
    debug!("User {} deleting appointment {}", user.username, appointment_id);
    let scheduling_service = AppointmentSchedulingService::from_config(&config);

    scheduling_service.remove(appointment_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
