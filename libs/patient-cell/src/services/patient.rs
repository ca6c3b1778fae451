use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, info};
use uuid::Uuid;
use chrono::Utc;

use shared_config::AppConfig;
use shared_database::supabase::{encoded, quoted, SupabaseClient};

use crate::models::{Patient, CreatePatientRequest, UpdatePatientRequest, PatientError};

pub struct PatientService {
    supabase: SupabaseClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        request.validate()?;
        debug!("Creating new patient: {}", request.identification);

        let duplicates = self
            .find_conflicting(Some(&request.identification), Some(&request.email))
            .await
            .map_err(|_| PatientError::CreationFailed)?;

        if !duplicates.is_empty() {
            return Err(PatientError::AlreadyExists {
                identification: request.identification,
                email: request.email,
            });
        }

        let now = Utc::now().to_rfc3339();
        let patient_data = json!({
            "identification": request.identification,
            "first_name": request.first_name,
            "last_name": request.last_name,
            "email": request.email,
            "phone": request.phone,
            "address": request.address,
            "city": request.city,
            "created_at": now,
            "updated_at": now,
        });

        let patient: Patient = self.supabase.insert("patients", patient_data).await.map_err(|e| {
            if e.is_unique_violation() {
                PatientError::AlreadyExists {
                    identification: request.identification.clone(),
                    email: request.email.clone(),
                }
            } else {
                error!("Error creating patient: {}", e);
                PatientError::CreationFailed
            }
        })?;

        info!("Patient created: {}", patient.id);
        Ok(patient)
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, PatientError> {
        self.supabase
            .request(Method::GET, "/rest/v1/patients?order=created_at.desc", None)
            .await
            .map_err(|e| {
                error!("Error fetching patients: {}", e);
                PatientError::RetrievalFailed
            })
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        debug!("Fetching patient: {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let mut rows: Vec<Patient> = self.supabase.request(Method::GET, &path, None).await.map_err(|e| {
            error!("Error fetching patient {}: {}", patient_id, e);
            PatientError::RetrievalFailed
        })?;

        if rows.is_empty() {
            return Err(PatientError::NotFound(patient_id));
        }
        Ok(rows.swap_remove(0))
    }

    pub async fn find_by_identification(&self, identification: &str) -> Result<Patient, PatientError> {
        debug!("Fetching patient by identification: {}", identification);

        let path = format!("/rest/v1/patients?identification=eq.{}", encoded(identification));
        let mut rows: Vec<Patient> = self.supabase.request(Method::GET, &path, None).await.map_err(|e| {
            error!("Error fetching patient by identification {}: {}", identification, e);
            PatientError::RetrievalFailed
        })?;

        if rows.is_empty() {
            return Err(PatientError::IdentificationNotFound(identification.to_string()));
        }
        Ok(rows.swap_remove(0))
    }

    pub async fn update_patient(
        &self,
        patient_id: Uuid,
        request: UpdatePatientRequest,
    ) -> Result<Patient, PatientError> {
        request.validate()?;
        let current = self.get_patient(patient_id).await?;
        debug!("Updating patient: {}", patient_id);

        if request.identification.is_some() || request.email.is_some() {
            let duplicates = self
                .find_conflicting(request.identification.as_deref(), request.email.as_deref())
                .await
                .map_err(|_| PatientError::UpdateFailed)?;

            if duplicates.iter().any(|id| *id != patient_id) {
                return Err(PatientError::AlreadyExists {
                    identification: request.identification.unwrap_or(current.identification),
                    email: request.email.unwrap_or(current.email),
                });
            }
        }

        let mut update_data = serde_json::Map::new();
        let fields = [
            ("identification", request.identification),
            ("first_name", request.first_name),
            ("last_name", request.last_name),
            ("email", request.email),
            ("phone", request.phone),
            ("address", request.address),
            ("city", request.city),
        ];
        for (column, value) in fields {
            if let Some(value) = value {
                update_data.insert(column.to_string(), json!(value));
            }
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let mut rows: Vec<Patient> = self
            .supabase
            .write_returning(Method::PATCH, &path, Some(Value::Object(update_data)))
            .await
            .map_err(|e| {
                error!("Error updating patient {}: {}", patient_id, e);
                PatientError::UpdateFailed
            })?;

        if rows.is_empty() {
            return Err(PatientError::NotFound(patient_id));
        }

        info!("Patient updated: {}", patient_id);
        Ok(rows.swap_remove(0))
    }

    pub async fn delete_patient(&self, patient_id: Uuid) -> Result<(), PatientError> {
        self.get_patient(patient_id).await?;

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let _: Vec<Value> = self
            .supabase
            .write_returning(Method::DELETE, &path, None)
            .await
            .map_err(|e| {
                error!("Error deleting patient {}: {}", patient_id, e);
                PatientError::DeletionFailed
            })?;

        info!("Patient deleted: {}", patient_id);
        Ok(())
    }

    /// Ids of patients already holding the given identification or email.
    async fn find_conflicting(
        &self,
        identification: Option<&str>,
        email: Option<&str>,
    ) -> Result<Vec<Uuid>, shared_database::DatabaseError> {
        let mut filters = Vec::new();
        if let Some(identification) = identification {
            filters.push(format!("identification.eq.{}", quoted(identification)));
        }
        if let Some(email) = email {
            filters.push(format!("email.eq.{}", quoted(email)));
        }
        if filters.is_empty() {
            return Ok(Vec::new());
        }

        let path = format!("/rest/v1/patients?select=id&or=({})", filters.join(","));
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await.map_err(|e| {
            error!("Error checking for duplicate patients: {}", e);
            e
        })?;

        Ok(rows
            .iter()
            .filter_map(|row| row.get("id").and_then(Value::as_str))
            .filter_map(|id| Uuid::parse_str(id).ok())
            .collect())
    }
}
