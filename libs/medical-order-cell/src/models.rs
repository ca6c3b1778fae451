use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};

use medication_cell::Medication;
use shared_utils::validation::{FieldValidator, ValidationErrors};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicalOrder {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub description: String,
    pub expiration_date: NaiveDate,
    pub specialty: String,
    /// Prescribed medications, embedded through the junction table.
    #[serde(default)]
    pub medications: Vec<Medication>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMedicalOrderRequest {
    pub appointment_id: Uuid,
    pub description: String,
    pub expiration_date: NaiveDate,
    pub specialty: String,
    #[serde(default)]
    pub medication_ids: Option<Vec<Uuid>>,
}

impl CreateMedicalOrderRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        FieldValidator::new()
            .required("Description", &self.description)
            .text("Specialty", &self.specialty, 100)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MedicalOrderError {
    #[error("Medical order with ID {0} not found")]
    NotFound(Uuid),

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Failed to create the medical order")]
    CreationFailed,

    #[error("Failed to delete the medical order")]
    DeletionFailed,

    #[error("Error retrieving medical orders")]
    RetrievalFailed,
}

impl MedicalOrderError {
    pub fn code(&self) -> &'static str {
        match self {
            MedicalOrderError::NotFound(_) => "MEDICAL_ORDER_NOT_FOUND",
            MedicalOrderError::Validation(_) => "VALIDATION_FAILED",
            MedicalOrderError::CreationFailed => "MEDICAL_ORDER_CREATION_FAILED",
            MedicalOrderError::DeletionFailed => "MEDICAL_ORDER_DELETE_FAILED",
            MedicalOrderError::RetrievalFailed => "MEDICAL_ORDER_RETRIEVAL_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn medication_ids_are_optional() {
        let request: CreateMedicalOrderRequest = serde_json::from_value(json!({
            "appointment_id": Uuid::new_v4(),
            "description": "Perform complete blood tests",
            "expiration_date": "2025-11-15",
            "specialty": "Clinical Laboratory"
        }))
        .unwrap();

        assert!(request.medication_ids.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn specialty_limited_to_100_characters() {
        let request = CreateMedicalOrderRequest {
            appointment_id: Uuid::new_v4(),
            description: "Rest".to_string(),
            expiration_date: NaiveDate::from_ymd_opt(2025, 11, 15).unwrap(),
            specialty: "S".repeat(101),
            medication_ids: None,
        };

        assert!(request.validate().is_err());
    }
}
