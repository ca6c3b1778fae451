use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use shared_utils::validation::{FieldValidator, ValidationErrors};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Conditions the medication treats, free text.
    pub diseases: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMedicationRequest {
    pub name: String,
    pub description: String,
    pub diseases: String,
}

impl CreateMedicationRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        FieldValidator::new()
            .text("Name", &self.name, 200)
            .required("Description", &self.description)
            .required("Diseases", &self.diseases)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MedicationError {
    #[error("Medication with ID {0} not found")]
    NotFound(Uuid),

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Failed to create medication")]
    CreationFailed,

    #[error("Failed to delete medication")]
    DeletionFailed,

    #[error("Failed to fetch medications")]
    RetrievalFailed,
}

impl MedicationError {
    pub fn code(&self) -> &'static str {
        match self {
            MedicationError::NotFound(_) => "MEDICATION_NOT_FOUND",
            MedicationError::Validation(_) => "VALIDATION_FAILED",
            MedicationError::CreationFailed => "MEDICATION_CREATION_FAILED",
            MedicationError::DeletionFailed => "MEDICATION_DELETE_FAILED",
            MedicationError::RetrievalFailed => "MEDICATION_RETRIEVAL_FAILED",
        }
    }
}
