use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info, info_span, warn, Span};
use uuid::Uuid;

use doctor_cell::{Doctor, DoctorService};
use patient_cell::PatientService;
use shared_config::AppConfig;

use crate::models::{Appointment, AppointmentDetail, AppointmentError, AppointmentStatus};
use crate::services::directory::{DoctorDirectory, PatientDirectory};
use crate::services::store::{AppointmentStore, StoreError, SupabaseAppointmentStore};

/// Books appointments and answers availability questions under the rule
/// that a doctor sees at most one appointment per calendar date.
///
/// Every event is emitted under the span handed to the constructor.
pub struct AppointmentSchedulingService {
    doctors: Arc<dyn DoctorDirectory>,
    patients: Arc<dyn PatientDirectory>,
    store: Arc<dyn AppointmentStore>,
    span: Span,
}

impl AppointmentSchedulingService {
    pub fn new(
        doctors: Arc<dyn DoctorDirectory>,
        patients: Arc<dyn PatientDirectory>,
        store: Arc<dyn AppointmentStore>,
        span: Span,
    ) -> Self {
        Self { doctors, patients, store, span }
    }

    /// Wires the Supabase-backed directories and store.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(DoctorService::new(config)),
            Arc::new(PatientService::new(config)),
            Arc::new(SupabaseAppointmentStore::new(config)),
            info_span!("appointment_scheduling"),
        )
    }

    pub async fn book(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        appointment_date: NaiveDate,
    ) -> Result<Appointment, AppointmentError> {
        debug!(parent: &self.span, "Booking doctor {} for patient {} on {}", doctor_id, patient_id, appointment_date);

        match self.doctors.find_one(doctor_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(AppointmentError::DoctorNotFound(doctor_id)),
            Err(e) => {
                error!(parent: &self.span, "Error looking up doctor {}: {}", doctor_id, e);
                return Err(AppointmentError::CreationFailed);
            }
        }

        match self.patients.find_one(patient_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(AppointmentError::PatientNotFound(patient_id)),
            Err(e) => {
                error!(parent: &self.span, "Error looking up patient {}: {}", patient_id, e);
                return Err(AppointmentError::CreationFailed);
            }
        }

        // Fast path only; the store's uniqueness constraint has the final say.
        let available = self
            .is_doctor_available(doctor_id, appointment_date)
            .await
            .map_err(|e| {
                error!(parent: &self.span, "Error checking availability of doctor {}: {}", doctor_id, e);
                AppointmentError::CreationFailed
            })?;

        if !available {
            warn!(parent: &self.span, "Doctor {} already booked on {}", doctor_id, appointment_date);
            return Err(AppointmentError::DoctorNotAvailable { date: appointment_date });
        }

        let appointment = Appointment::scheduled(doctor_id, patient_id, appointment_date);
        let saved = self.store.insert(&appointment).await.map_err(|e| match e {
            StoreError::Conflict(_) => {
                warn!(parent: &self.span, "Doctor {} was booked concurrently on {}", doctor_id, appointment_date);
                AppointmentError::DoctorNotAvailable { date: appointment_date }
            }
            other => {
                error!(parent: &self.span, "Error creating appointment: {}", other);
                AppointmentError::CreationFailed
            }
        })?;

        info!(parent: &self.span, "Appointment created: {}", saved.id);
        Ok(saved)
    }

    /// True iff no stored appointment matches the doctor and date exactly.
    pub async fn is_doctor_available(&self, doctor_id: Uuid, date: NaiveDate) -> Result<bool, StoreError> {
        let appointments = self.store.find_by_doctor_and_date(doctor_id, date).await?;
        Ok(appointments.is_empty())
    }

    /// Directory order is preserved.
    pub async fn get_available_doctors(&self, date: NaiveDate) -> Result<Vec<Doctor>, AppointmentError> {
        let booked: HashSet<Uuid> = self
            .store
            .booked_doctor_ids(date)
            .await
            .map_err(|e| {
                error!(parent: &self.span, "Error retrieving bookings on {}: {}", date, e);
                AppointmentError::RetrievalFailed
            })?
            .into_iter()
            .collect();

        let doctors = self.doctors.find_all().await.map_err(|e| {
            error!(parent: &self.span, "Error retrieving doctors: {}", e);
            AppointmentError::RetrievalFailed
        })?;

        let available: Vec<Doctor> = doctors
            .into_iter()
            .filter(|doctor| !booked.contains(&doctor.id))
            .collect();

        debug!(parent: &self.span, "{} doctors available on {}", available.len(), date);
        Ok(available)
    }

    pub async fn find_by_patient_and_date(
        &self,
        patient_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        self.store
            .find_by_patient_and_date(patient_id, date)
            .await
            .map_err(|e| {
                error!(parent: &self.span, "Error retrieving appointments for patient {} on {}: {}", patient_id, date, e);
                AppointmentError::RetrievalFailed
            })
    }

    /// Any status may follow any other; each call stamps `status_updated_at`.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let updated = self
            .store
            .update_status(id, status, Utc::now())
            .await
            .map_err(|e| {
                error!(parent: &self.span, "Error updating status of appointment {}: {}", id, e);
                AppointmentError::UpdateFailed
            })?
            .ok_or(AppointmentError::NotFound(id))?;

        info!(parent: &self.span, "Appointment status updated: {} -> {}", id, status);
        Ok(updated)
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppointmentError> {
        let deleted = self.store.delete(id).await.map_err(|e| {
            error!(parent: &self.span, "Error deleting appointment {}: {}", id, e);
            AppointmentError::DeletionFailed
        })?;

        if !deleted {
            return Err(AppointmentError::NotFound(id));
        }

        info!(parent: &self.span, "Appointment deleted: {}", id);
        Ok(())
    }

    pub async fn find_all(&self) -> Result<Vec<Appointment>, AppointmentError> {
        self.store.find_all().await.map_err(|e| {
            error!(parent: &self.span, "Error retrieving appointments list: {}", e);
            AppointmentError::RetrievalFailed
        })
    }

    pub async fn find_one(&self, id: Uuid) -> Result<AppointmentDetail, AppointmentError> {
        self.store
            .find_detail(id)
            .await
            .map_err(|e| {
                error!(parent: &self.span, "Error retrieving appointment {}: {}", id, e);
                AppointmentError::RetrievalFailed
            })?
            .ok_or(AppointmentError::NotFound(id))
    }
}
