use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, info};
use uuid::Uuid;
use chrono::Utc;

use shared_config::AppConfig;
use shared_database::supabase::{quoted, SupabaseClient};

use crate::models::{Medication, CreateMedicationRequest, MedicationError};

pub struct MedicationService {
    supabase: SupabaseClient,
}

impl MedicationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_medication(&self, request: CreateMedicationRequest) -> Result<Medication, MedicationError> {
        request.validate()?;
        debug!("Creating medication: {}", request.name);

        let now = Utc::now().to_rfc3339();
        let medication: Medication = self
            .supabase
            .insert("medications", json!({
                "name": request.name,
                "description": request.description,
                "diseases": request.diseases,
                "created_at": now,
                "updated_at": now,
            }))
            .await
            .map_err(|e| {
                error!("Error creating medication: {}", e);
                MedicationError::CreationFailed
            })?;

        info!("Medication created: {}", medication.id);
        Ok(medication)
    }

    /// Catalog ordered alphabetically by name.
    pub async fn list_medications(&self) -> Result<Vec<Medication>, MedicationError> {
        self.supabase
            .request(Method::GET, "/rest/v1/medications?order=name.asc", None)
            .await
            .map_err(|e| {
                error!("Error fetching medications: {}", e);
                MedicationError::RetrievalFailed
            })
    }

    pub async fn get_medication(&self, medication_id: Uuid) -> Result<Medication, MedicationError> {
        let path = format!("/rest/v1/medications?id=eq.{}", medication_id);
        let mut rows: Vec<Medication> = self.supabase.request(Method::GET, &path, None).await.map_err(|e| {
            error!("Error fetching medication {}: {}", medication_id, e);
            MedicationError::RetrievalFailed
        })?;

        if rows.is_empty() {
            return Err(MedicationError::NotFound(medication_id));
        }
        Ok(rows.swap_remove(0))
    }

    /// Resolves a batch of ids, silently dropping the ones that do not exist.
    pub async fn find_by_ids(&self, medication_ids: &[Uuid]) -> Result<Vec<Medication>, MedicationError> {
        if medication_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = medication_ids.iter().map(|id| quoted(&id.to_string())).collect();
        let path = format!("/rest/v1/medications?id=in.({})&order=name.asc", ids.join(","));

        self.supabase.request(Method::GET, &path, None).await.map_err(|e| {
            error!("Error resolving medications: {}", e);
            MedicationError::RetrievalFailed
        })
    }

    pub async fn delete_medication(&self, medication_id: Uuid) -> Result<(), MedicationError> {
        self.get_medication(medication_id).await?;

        let path = format!("/rest/v1/medications?id=eq.{}", medication_id);
        let _: Vec<Value> = self
            .supabase
            .write_returning(Method::DELETE, &path, None)
            .await
            .map_err(|e| {
                error!("Error deleting medication {}: {}", medication_id, e);
                MedicationError::DeletionFailed
            })?;

        info!("Medication deleted: {}", medication_id);
        Ok(())
    }
}
