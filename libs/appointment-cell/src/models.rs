use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};

use medical_order_cell::MedicalOrder;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    /// Calendar day of the visit. A doctor holds at most one appointment per day.
    pub appointment_date: NaiveDate,
    pub status: AppointmentStatus,
    /// Set on every status change, null until the first one.
    pub status_updated_at: Option<DateTime<Utc>>,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// A freshly booked appointment, not yet persisted.
    pub fn scheduled(doctor_id: Uuid, patient_id: Uuid, appointment_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            appointment_date,
            status: AppointmentStatus::Scheduled,
            status_updated_at: None,
            doctor_id,
            patient_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Appointment together with the medical orders issued during it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    #[serde(default)]
    pub medical_orders: Vec<MedicalOrder>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Attended,
    NotAttended,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "SCHEDULED"),
            AppointmentStatus::Attended => write!(f, "ATTENDED"),
            AppointmentStatus::NotAttended => write!(f, "NOT_ATTENDED"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAppointmentStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailableDoctorsQuery {
    pub date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentSearchQuery {
    pub patient_id: String,
    pub date: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Doctor with ID {0} not found")]
    DoctorNotFound(Uuid),

    #[error("Patient with ID {0} not found")]
    PatientNotFound(Uuid),

    #[error("Appointment with ID {0} not found")]
    NotFound(Uuid),

    #[error("The doctor is not available on the date {date}")]
    DoctorNotAvailable { date: NaiveDate },

    #[error("Failed to create the appointment")]
    CreationFailed,

    #[error("Error updating appointment status")]
    UpdateFailed,

    #[error("Error deleting appointment")]
    DeletionFailed,

    #[error("Error retrieving appointments")]
    RetrievalFailed,
}

impl AppointmentError {
    pub fn code(&self) -> &'static str {
        match self {
            AppointmentError::DoctorNotFound(_) => "DOCTOR_NOT_FOUND",
            AppointmentError::PatientNotFound(_) => "PATIENT_NOT_FOUND",
            AppointmentError::NotFound(_) => "APPOINTMENT_NOT_FOUND",
            AppointmentError::DoctorNotAvailable { .. } => "DOCTOR_NOT_AVAILABLE",
            AppointmentError::CreationFailed => "APPOINTMENT_CREATION_FAILED",
            AppointmentError::UpdateFailed => "APPOINTMENT_UPDATE_FAILED",
            AppointmentError::DeletionFailed => "APPOINTMENT_DELETE_FAILED",
            AppointmentError::RetrievalFailed => "APPOINTMENT_RETRIEVAL_FAILED",
        }
    }
}
