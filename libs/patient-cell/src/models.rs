use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use shared_utils::validation::{FieldValidator, ValidationErrors};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: Uuid,
    /// National identification number, digits only.
    pub identification: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    pub identification: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
}

impl CreatePatientRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        FieldValidator::new()
            .text("Identification", &self.identification, 20)
            .digits("Identification", &self.identification)
            .text("First name", &self.first_name, 90)
            .text("Last name", &self.last_name, 90)
            .text("Email", &self.email, 200)
            .email("Email", &self.email)
            .text("Phone number", &self.phone, 20)
            .digits("Phone number", &self.phone)
            .text("Address", &self.address, 200)
            .text("City", &self.city, 90)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePatientRequest {
    pub identification: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

impl UpdatePatientRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        FieldValidator::new()
            .optional(self.identification.as_deref(), |v, value| {
                v.text("Identification", value, 20).digits("Identification", value);
            })
            .optional(self.first_name.as_deref(), |v, value| { v.text("First name", value, 90); })
            .optional(self.last_name.as_deref(), |v, value| { v.text("Last name", value, 90); })
            .optional(self.email.as_deref(), |v, value| {
                v.text("Email", value, 200).email("Email", value);
            })
            .optional(self.phone.as_deref(), |v, value| {
                v.text("Phone number", value, 20).digits("Phone number", value);
            })
            .optional(self.address.as_deref(), |v, value| { v.text("Address", value, 200); })
            .optional(self.city.as_deref(), |v, value| { v.text("City", value, 90); })
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSearchQuery {
    pub id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("Patient with ID {0} not found")]
    NotFound(Uuid),

    #[error("Patient with identification {0} not found")]
    IdentificationNotFound(String),

    #[error("Patient with identification {identification} or email {email} already exists")]
    AlreadyExists { identification: String, email: String },

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Failed to create patient")]
    CreationFailed,

    #[error("Failed to update patient")]
    UpdateFailed,

    #[error("Failed to delete patient")]
    DeletionFailed,

    #[error("Failed to fetch patients")]
    RetrievalFailed,
}

impl PatientError {
    pub fn code(&self) -> &'static str {
        match self {
            PatientError::NotFound(_) | PatientError::IdentificationNotFound(_) => "PATIENT_NOT_FOUND",
            PatientError::AlreadyExists { .. } => "PATIENT_ALREADY_EXISTS",
            PatientError::Validation(_) => "VALIDATION_FAILED",
            PatientError::CreationFailed => "PATIENT_CREATION_FAILED",
            PatientError::UpdateFailed => "PATIENT_UPDATE_FAILED",
            PatientError::DeletionFailed => "PATIENT_DELETE_FAILED",
            PatientError::RetrievalFailed => "PATIENT_RETRIEVAL_FAILED",
        }
    }
}
