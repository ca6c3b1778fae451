use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc, NaiveDate};

use shared_utils::validation::{FieldValidator, ValidationErrors};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    pub id: Uuid,
    pub identification: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    /// Medical license number issued to the doctor.
    pub professional_card: String,
    /// Date the doctor joined the hospital staff.
    pub admission_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub identification: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub professional_card: String,
    pub admission_date: NaiveDate,
}

impl CreateDoctorRequest {
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
            .text("Professional card", &self.professional_card, 50)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDoctorRequest {
    pub identification: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub professional_card: Option<String>,
    pub admission_date: Option<NaiveDate>,
}

impl UpdateDoctorRequest {
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
            .optional(self.professional_card.as_deref(), |v, value| {
                v.text("Professional card", value, 50);
            })
            .finish()
    }

    /// True when the update touches a column with a uniqueness constraint.
    pub fn touches_unique_fields(&self) -> bool {
        self.identification.is_some() || self.email.is_some() || self.professional_card.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSearchQuery {
    pub id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor with ID {0} not found")]
    NotFound(Uuid),

    #[error("Doctor with identification {0} not found")]
    IdentificationNotFound(String),

    #[error("A doctor with this identification, email or professional card already exists")]
    AlreadyExists,

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Failed to create doctor")]
    CreationFailed,

    #[error("Failed to update doctor")]
    UpdateFailed,

    #[error("Failed to delete doctor")]
    DeletionFailed,

    #[error("Failed to fetch doctors")]
    RetrievalFailed,
}

impl DoctorError {
    pub fn code(&self) -> &'static str {
        match self {
            DoctorError::NotFound(_) | DoctorError::IdentificationNotFound(_) => "DOCTOR_NOT_FOUND",
            DoctorError::AlreadyExists => "DOCTOR_ALREADY_EXISTS",
            DoctorError::Validation(_) => "VALIDATION_FAILED",
            DoctorError::CreationFailed => "DOCTOR_CREATION_FAILED",
            DoctorError::UpdateFailed => "DOCTOR_UPDATE_FAILED",
            DoctorError::DeletionFailed => "DOCTOR_DELETE_FAILED",
            DoctorError::RetrievalFailed => "DOCTOR_RETRIEVAL_FAILED",
        }
    }
}
