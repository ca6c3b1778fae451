#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::Span;
use uuid::Uuid;

use appointment_cell::{
    Appointment, AppointmentDetail, AppointmentSchedulingService, AppointmentStatus,
    AppointmentStore, DoctorDirectory, PatientDirectory, StoreError,
};
use doctor_cell::Doctor;
use patient_cell::Patient;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn doctor(first_name: &str) -> Doctor {
    let now = Utc::now();
    Doctor {
        id: Uuid::new_v4(),
        identification: "9876543210".to_string(),
        first_name: first_name.to_string(),
        last_name: "Martinez".to_string(),
        email: format!("{}@hospital.com", first_name.to_lowercase()),
        phone: "3159876543".to_string(),
        address: "Carrera 7 # 32-16".to_string(),
        city: "Bogota".to_string(),
        professional_card: format!("TP-{}", first_name),
        admission_date: date(2024, 1, 15),
        created_at: now,
        updated_at: now,
    }
}

pub fn patient(first_name: &str) -> Patient {
    let now = Utc::now();
    Patient {
        id: Uuid::new_v4(),
        identification: "1234567890".to_string(),
        first_name: first_name.to_string(),
        last_name: "Perez".to_string(),
        email: format!("{}@gmail.com", first_name.to_lowercase()),
        phone: "5551234567".to_string(),
        address: "cra 10 #20-30".to_string(),
        city: "Medellin".to_string(),
        created_at: now,
        updated_at: now,
    }
}

#[derive(Default)]
pub struct InMemoryDoctors {
    pub doctors: Vec<Doctor>,
}

#[async_trait]
impl DoctorDirectory for InMemoryDoctors {
    async fn find_one(&self, id: Uuid) -> Result<Option<Doctor>, StoreError> {
        Ok(self.doctors.iter().find(|d| d.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Doctor>, StoreError> {
        Ok(self.doctors.clone())
    }
}

#[derive(Default)]
pub struct InMemoryPatients {
    pub patients: Vec<Patient>,
}

#[async_trait]
impl PatientDirectory for InMemoryPatients {
    async fn find_one(&self, id: Uuid) -> Result<Option<Patient>, StoreError> {
        Ok(self.patients.iter().find(|p| p.id == id).cloned())
    }
}

/// Enforces one appointment per doctor and date under its lock, like the
/// database's unique constraint.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: Mutex<Vec<Appointment>>,
    /// Every call fails with a backend error when set.
    pub failing: bool,
    /// Availability reads see nothing, as if a concurrent booking landed
    /// between the check and the insert.
    pub stale_reads: bool,
}

impl InMemoryAppointmentStore {
    pub fn failing() -> Self {
        Self { failing: true, ..Self::default() }
    }

    pub fn with_stale_reads() -> Self {
        Self { stale_reads: true, ..Self::default() }
    }

    pub fn len(&self) -> usize {
        self.appointments.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing {
            return Err(StoreError::Backend("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn insert(&self, appointment: &Appointment) -> Result<Appointment, StoreError> {
        self.check()?;
        let mut appointments = self.appointments.lock().unwrap();
        if appointments
            .iter()
            .any(|a| a.doctor_id == appointment.doctor_id && a.appointment_date == appointment.appointment_date)
        {
            return Err(StoreError::Conflict("appointments_doctor_id_appointment_date_key".to_string()));
        }
        appointments.push(appointment.clone());
        Ok(appointment.clone())
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<AppointmentDetail>, StoreError> {
        self.check()?;
        let appointments = self.appointments.lock().unwrap();
        Ok(appointments.iter().find(|a| a.id == id).map(|a| AppointmentDetail {
            appointment: a.clone(),
            medical_orders: Vec::new(),
        }))
    }

    async fn find_all(&self) -> Result<Vec<Appointment>, StoreError> {
        self.check()?;
        let mut all = self.appointments.lock().unwrap().clone();
        all.sort_by(|a, b| b.appointment_date.cmp(&a.appointment_date));
        Ok(all)
    }

    async fn find_by_doctor_and_date(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<Appointment>, StoreError> {
        self.check()?;
        if self.stale_reads {
            return Ok(Vec::new());
        }
        let appointments = self.appointments.lock().unwrap();
        Ok(appointments
            .iter()
            .filter(|a| a.doctor_id == doctor_id && a.appointment_date == date)
            .cloned()
            .collect())
    }

    async fn find_by_patient_and_date(&self, patient_id: Uuid, date: NaiveDate) -> Result<Vec<Appointment>, StoreError> {
        self.check()?;
        let mut found: Vec<Appointment> = self
            .appointments
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.patient_id == patient_id && a.appointment_date == date)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn booked_doctor_ids(&self, date: NaiveDate) -> Result<Vec<Uuid>, StoreError> {
        self.check()?;
        let appointments = self.appointments.lock().unwrap();
        Ok(appointments
            .iter()
            .filter(|a| a.appointment_date == date)
            .map(|a| a.doctor_id)
            .collect())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        changed_at: DateTime<Utc>,
    ) -> Result<Option<Appointment>, StoreError> {
        self.check()?;
        let mut appointments = self.appointments.lock().unwrap();
        Ok(appointments.iter_mut().find(|a| a.id == id).map(|a| {
            a.status = status;
            a.status_updated_at = Some(changed_at);
            a.updated_at = changed_at;
            a.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.check()?;
        let mut appointments = self.appointments.lock().unwrap();
        let before = appointments.len();
        appointments.retain(|a| a.id != id);
        Ok(appointments.len() != before)
    }
}

pub struct Clinic {
    pub service: AppointmentSchedulingService,
    pub store: Arc<InMemoryAppointmentStore>,
    pub doctors: Vec<Doctor>,
    pub patients: Vec<Patient>,
}

/// Two doctors and two patients over an empty store.
pub fn clinic() -> Clinic {
    clinic_with_store(InMemoryAppointmentStore::default())
}

pub fn clinic_with_store(store: InMemoryAppointmentStore) -> Clinic {
    let doctors = vec![doctor("Ana"), doctor("Luis")];
    let patients = vec![patient("Juan"), patient("Maria")];
    let store = Arc::new(store);

    let service = AppointmentSchedulingService::new(
        Arc::new(InMemoryDoctors { doctors: doctors.clone() }),
        Arc::new(InMemoryPatients { patients: patients.clone() }),
        store.clone(),
        Span::none(),
    );

    Clinic { service, store, doctors, patients }
}
