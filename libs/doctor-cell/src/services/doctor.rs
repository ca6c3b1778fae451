use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, info};
use uuid::Uuid;
use chrono::Utc;

use shared_config::AppConfig;
use shared_database::{DatabaseError, supabase::{encoded, quoted, SupabaseClient}};

use crate::models::{Doctor, CreateDoctorRequest, UpdateDoctorRequest, DoctorError};

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Register a new doctor. Identification, email and professional card
    /// must not belong to any other doctor.
    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        request.validate()?;
        debug!("Creating new doctor: {}", request.identification);

        let duplicates = self
            .find_conflicting(
                Some(&request.identification),
                Some(&request.email),
                Some(&request.professional_card),
            )
            .await
            .map_err(|_| DoctorError::CreationFailed)?;

        if !duplicates.is_empty() {
            return Err(DoctorError::AlreadyExists);
        }

        let now = Utc::now().to_rfc3339();
        let doctor_data = json!({
            "identification": request.identification,
            "first_name": request.first_name,
            "last_name": request.last_name,
            "email": request.email,
            "phone": request.phone,
            "address": request.address,
            "city": request.city,
            "professional_card": request.professional_card,
            "admission_date": request.admission_date,
            "created_at": now,
            "updated_at": now,
        });

        let doctor: Doctor = self.supabase.insert("doctors", doctor_data).await.map_err(|e| {
            if e.is_unique_violation() {
                DoctorError::AlreadyExists
            } else {
                error!("Error creating doctor: {}", e);
                DoctorError::CreationFailed
            }
        })?;

        info!("Doctor created: {}", doctor.id);
        Ok(doctor)
    }

    /// All doctors, newest first.
    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        self.supabase
            .request(Method::GET, "/rest/v1/doctors?order=created_at.desc", None)
            .await
            .map_err(|e| {
                error!("Error fetching doctors: {}", e);
                DoctorError::RetrievalFailed
            })
    }

    /// Get doctor by ID
    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor: {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let mut rows: Vec<Doctor> = self.supabase.request(Method::GET, &path, None).await.map_err(|e| {
            error!("Error fetching doctor {}: {}", doctor_id, e);
            DoctorError::RetrievalFailed
        })?;

        if rows.is_empty() {
            return Err(DoctorError::NotFound(doctor_id));
        }
        Ok(rows.swap_remove(0))
    }

    /// Get doctor by national identification number
    pub async fn find_by_identification(&self, identification: &str) -> Result<Doctor, DoctorError> {
        let path = format!("/rest/v1/doctors?identification=eq.{}", encoded(identification));
        let mut rows: Vec<Doctor> = self.supabase.request(Method::GET, &path, None).await.map_err(|e| {
            error!("Error fetching doctor by identification {}: {}", identification, e);
            DoctorError::RetrievalFailed
        })?;

        if rows.is_empty() {
            return Err(DoctorError::IdentificationNotFound(identification.to_string()));
        }
        Ok(rows.swap_remove(0))
    }

    /// Partially update a doctor profile
    pub async fn update_doctor(
        &self,
        doctor_id: Uuid,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, DoctorError> {
        request.validate()?;
        self.get_doctor(doctor_id).await?;
        debug!("Updating doctor: {}", doctor_id);

        if request.touches_unique_fields() {
            let duplicates = self
                .find_conflicting(
                    request.identification.as_deref(),
                    request.email.as_deref(),
                    request.professional_card.as_deref(),
                )
                .await
                .map_err(|_| DoctorError::UpdateFailed)?;

            if duplicates.iter().any(|id| *id != doctor_id) {
                return Err(DoctorError::AlreadyExists);
            }
        }

        let mut update_data = serde_json::to_value(&request)
            .ok()
            .and_then(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .unwrap_or_default();
        update_data.retain(|_, value| !value.is_null());
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let mut rows: Vec<Doctor> = self
            .supabase
            .write_returning(Method::PATCH, &path, Some(Value::Object(update_data)))
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    return DoctorError::AlreadyExists;
                }
                error!("Error updating doctor {}: {}", doctor_id, e);
                DoctorError::UpdateFailed
            })?;

        if rows.is_empty() {
            return Err(DoctorError::NotFound(doctor_id));
        }

        info!("Doctor updated: {}", doctor_id);
        Ok(rows.swap_remove(0))
    }

    /// Remove a doctor
    pub async fn delete_doctor(&self, doctor_id: Uuid) -> Result<(), DoctorError> {
        self.get_doctor(doctor_id).await?;

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let _: Vec<Value> = self
            .supabase
            .write_returning(Method::DELETE, &path, None)
            .await
            .map_err(|e| {
                error!("Error deleting doctor {}: {}", doctor_id, e);
                DoctorError::DeletionFailed
            })?;

        info!("Doctor deleted: {}", doctor_id);
        Ok(())
    }

    async fn find_conflicting(
        &self,
        identification: Option<&str>,
        email: Option<&str>,
        professional_card: Option<&str>,
    ) -> Result<Vec<Uuid>, DatabaseError> {
        let filters: Vec<String> = [
            ("identification", identification),
            ("email", email),
            ("professional_card", professional_card),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.map(|v| format!("{}.eq.{}", column, quoted(v))))
        .collect();

        if filters.is_empty() {
            return Ok(Vec::new());
        }

        let path = format!("/rest/v1/doctors?select=id&or=({})", filters.join(","));
        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await.map_err(|e| {
            error!("Error checking for duplicate doctors: {}", e);
            e
        })?;

        Ok(rows
            .iter()
            .filter_map(|row| row.get("id").and_then(Value::as_str))
            .filter_map(|id| Uuid::parse_str(id).ok())
            .collect())
    }
}
