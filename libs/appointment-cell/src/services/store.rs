use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{DatabaseError, SupabaseClient};

use crate::models::{Appointment, AppointmentDetail, AppointmentStatus};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Another appointment already holds the same doctor and date.
    #[error("Appointment slot already taken: {0}")]
    Conflict(String),

    #[error("Appointment store failure: {0}")]
    Backend(String),
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation(message) => StoreError::Conflict(message),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Persistent appointment collection.
///
/// `insert` must reject a second appointment for the same
/// `(doctor_id, appointment_date)` with [`StoreError::Conflict`], atomically
/// with respect to concurrent inserts.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn insert(&self, appointment: &Appointment) -> Result<Appointment, StoreError>;

    async fn find_detail(&self, id: Uuid) -> Result<Option<AppointmentDetail>, StoreError>;

    /// Every appointment, latest `appointment_date` first.
    async fn find_all(&self) -> Result<Vec<Appointment>, StoreError>;

    async fn find_by_doctor_and_date(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError>;

    /// Newest `created_at` first.
    async fn find_by_patient_and_date(
        &self,
        patient_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError>;

    /// Ids of doctors holding at least one appointment on `date`.
    async fn booked_doctor_ids(&self, date: NaiveDate) -> Result<Vec<Uuid>, StoreError>;

    /// Returns `None` when no appointment has this id.
    async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        changed_at: DateTime<Utc>,
    ) -> Result<Option<Appointment>, StoreError>;

    /// Returns `false` when no appointment has this id.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// PostgREST-backed store. The `appointments` table carries a unique
/// constraint on `(doctor_id, appointment_date)`.
#[derive(Clone)]
pub struct SupabaseAppointmentStore {
    supabase: SupabaseClient,
}

#[derive(Deserialize)]
struct DoctorIdRow {
    doctor_id: Uuid,
}

impl SupabaseAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    async fn select(&self, query: &str) -> Result<Vec<Appointment>, StoreError> {
        let path = format!("/rest/v1/appointments?{}", query);
        Ok(self.supabase.request(Method::GET, &path, None).await?)
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn insert(&self, appointment: &Appointment) -> Result<Appointment, StoreError> {
        let row = serde_json::to_value(appointment)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(self.supabase.insert("appointments", row).await?)
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<AppointmentDetail>, StoreError> {
        let path = format!(
            "/rest/v1/appointments?select=*,medical_orders(*,medications(*))&id=eq.{}",
            id
        );
        let rows: Vec<AppointmentDetail> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn find_all(&self) -> Result<Vec<Appointment>, StoreError> {
        self.select("order=appointment_date.desc").await
    }

    async fn find_by_doctor_and_date(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError> {
        self.select(&format!("doctor_id=eq.{}&appointment_date=eq.{}", doctor_id, date)).await
    }

    async fn find_by_patient_and_date(
        &self,
        patient_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError> {
        self.select(&format!(
            "patient_id=eq.{}&appointment_date=eq.{}&order=created_at.desc",
            patient_id, date
        ))
        .await
    }

    async fn booked_doctor_ids(&self, date: NaiveDate) -> Result<Vec<Uuid>, StoreError> {
        let path = format!("/rest/v1/appointments?select=doctor_id&appointment_date=eq.{}", date);
        let rows: Vec<DoctorIdRow> = self.supabase.request(Method::GET, &path, None).await?;
        debug!("{} doctors booked on {}", rows.len(), date);
        Ok(rows.into_iter().map(|row| row.doctor_id).collect())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        changed_at: DateTime<Utc>,
    ) -> Result<Option<Appointment>, StoreError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let body = json!({
            "status": status,
            "status_updated_at": changed_at,
            "updated_at": changed_at,
        });
        let rows: Vec<Appointment> = self
            .supabase
            .write_returning(Method::PATCH, &path, Some(body))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let rows: Vec<Value> = self.supabase.write_returning(Method::DELETE, &path, None).await?;
        Ok(!rows.is_empty())
    }
}
