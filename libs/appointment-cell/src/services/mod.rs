pub mod directory;
pub mod scheduling;
pub mod store;

pub use directory::{DoctorDirectory, PatientDirectory};
pub use scheduling::AppointmentSchedulingService;
pub use store::{AppointmentStore, StoreError, SupabaseAppointmentStore};
