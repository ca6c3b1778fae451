pub mod medical_order;

pub use medical_order::MedicalOrderService;
