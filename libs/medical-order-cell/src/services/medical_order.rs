use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use chrono::Utc;

use medication_cell::MedicationService;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{MedicalOrder, CreateMedicalOrderRequest, MedicalOrderError};

const ORDER_SELECT: &str = "select=*,medications(*)";

pub struct MedicalOrderService {
    supabase: SupabaseClient,
    medications: MedicationService,
}

impl MedicalOrderService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            medications: MedicationService::new(config),
        }
    }

    /// Creates the order and links whichever of `medication_ids` exist.
    pub async fn create_medical_order(
        &self,
        request: CreateMedicalOrderRequest,
    ) -> Result<MedicalOrder, MedicalOrderError> {
        request.validate()?;
        debug!("Creating medical order for appointment {}", request.appointment_id);

        let medication_ids = request.medication_ids.unwrap_or_default();
        let medications = self
            .medications
            .find_by_ids(&medication_ids)
            .await
            .map_err(|_| MedicalOrderError::CreationFailed)?;

        let now = Utc::now().to_rfc3339();
        let mut order: MedicalOrder = self
            .supabase
            .insert("medical_orders", json!({
                "appointment_id": request.appointment_id,
                "description": request.description,
                "expiration_date": request.expiration_date,
                "specialty": request.specialty,
                "created_at": now,
                "updated_at": now,
            }))
            .await
            .map_err(|e| {
                error!("Error creating medical order: {}", e);
                MedicalOrderError::CreationFailed
            })?;

        if !medications.is_empty() {
            let links: Vec<Value> = medications
                .iter()
                .map(|medication| json!({ "order_id": order.id, "medication_id": medication.id }))
                .collect();

            let linked: Result<Vec<Value>, _> = self
                .supabase
                .write_returning(Method::POST, "/rest/v1/medical_order_medications", Some(Value::Array(links)))
                .await;

            if let Err(e) = linked {
                error!("Error linking medications to order {}: {}", order.id, e);
                self.discard(order.id).await;
                return Err(MedicalOrderError::CreationFailed);
            }
        }

        order.medications = medications;
        info!("Medical order created: {}", order.id);
        Ok(order)
    }

    /// Orders issued during an appointment, newest first.
    pub async fn find_by_appointment(&self, appointment_id: Uuid) -> Result<Vec<MedicalOrder>, MedicalOrderError> {
        let path = format!(
            "/rest/v1/medical_orders?{}&appointment_id=eq.{}&order=created_at.desc",
            ORDER_SELECT, appointment_id
        );

        self.supabase.request(Method::GET, &path, None).await.map_err(|e| {
            error!("Error retrieving medical orders for appointment {}: {}", appointment_id, e);
            MedicalOrderError::RetrievalFailed
        })
    }

    pub async fn get_medical_order(&self, order_id: Uuid) -> Result<MedicalOrder, MedicalOrderError> {
        let path = format!("/rest/v1/medical_orders?{}&id=eq.{}", ORDER_SELECT, order_id);
        let mut rows: Vec<MedicalOrder> = self.supabase.request(Method::GET, &path, None).await.map_err(|e| {
            error!("Error retrieving medical order {}: {}", order_id, e);
            MedicalOrderError::RetrievalFailed
        })?;

        if rows.is_empty() {
            return Err(MedicalOrderError::NotFound(order_id));
        }
        Ok(rows.swap_remove(0))
    }

    pub async fn delete_medical_order(&self, order_id: Uuid) -> Result<(), MedicalOrderError> {
        self.get_medical_order(order_id).await?;

        let path = format!("/rest/v1/medical_orders?id=eq.{}", order_id);
        let _: Vec<Value> = self
            .supabase
            .write_returning(Method::DELETE, &path, None)
            .await
            .map_err(|e| {
                error!("Error deleting medical order {}: {}", order_id, e);
                MedicalOrderError::DeletionFailed
            })?;

        info!("Medical order deleted: {}", order_id);
        Ok(())
    }

    /// Removes an order whose medication links could not be written.
    async fn discard(&self, order_id: Uuid) {
        let path = format!("/rest/v1/medical_orders?id=eq.{}", order_id);
        let removed: Result<Vec<Value>, _> = self.supabase.write_returning(Method::DELETE, &path, None).await;

        match removed {
            Ok(_) => warn!("Medical order {} rolled back after link failure", order_id),
            Err(e) => error!("Medical order {} left without medications, rollback failed: {}", order_id, e),
        }
    }
}
