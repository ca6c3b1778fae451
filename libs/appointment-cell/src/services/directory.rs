use async_trait::async_trait;
use uuid::Uuid;

use doctor_cell::{Doctor, DoctorError, DoctorService};
use patient_cell::{Patient, PatientError, PatientService};

use crate::services::store::StoreError;

#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    async fn find_one(&self, id: Uuid) -> Result<Option<Doctor>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Doctor>, StoreError>;
}

#[async_trait]
pub trait PatientDirectory: Send + Sync {
    async fn find_one(&self, id: Uuid) -> Result<Option<Patient>, StoreError>;
}

#[async_trait]
impl DoctorDirectory for DoctorService {
    async fn find_one(&self, id: Uuid) -> Result<Option<Doctor>, StoreError> {
        match self.get_doctor(id).await {
            Ok(doctor) => Ok(Some(doctor)),
            Err(DoctorError::NotFound(_)) => Ok(None),
            Err(e) => Err(StoreError::Backend(e.to_string())),
        }
    }

    async fn find_all(&self) -> Result<Vec<Doctor>, StoreError> {
        self.list_doctors()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

#[async_trait]
impl PatientDirectory for PatientService {
    async fn find_one(&self, id: Uuid) -> Result<Option<Patient>, StoreError> {
        match self.get_patient(id).await {
            Ok(patient) => Ok(Some(patient)),
            Err(PatientError::NotFound(_)) => Ok(None),
            Err(e) => Err(StoreError::Backend(e.to_string())),
        }
    }
}
