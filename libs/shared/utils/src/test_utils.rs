use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use axum::extract::{Json, Query};
use axum_extra::extract::WithRejection;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::{AppConfig, Environment};
use shared_models::auth::{User, UserRole};
use shared_models::error::AppError;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_database(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            environment: Environment::Test,
            port: 0,
            api_prefix: "api/v1".to_string(),
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            jwt_expiration: StdDuration::from_secs(3600),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Wraps a body the way handlers receive it after extraction.
pub fn with_json<T>(value: T) -> WithRejection<Json<T>, AppError> {
    WithRejection(Json(value), PhantomData)
}

pub fn with_query<T>(value: T) -> WithRejection<Query<T>, AppError> {
    WithRejection(Query(value), PhantomData)
}

pub struct TestUser {
    pub id: String,
    pub username: String,
    pub role: UserRole,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: "test-user".to_string(),
            role: UserRole::Patient,
        }
    }
}

impl TestUser {
    pub fn new(username: &str, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            role,
        }
    }

    pub fn doctor(username: &str) -> Self {
        Self::new(username, UserRole::Doctor)
    }

    pub fn patient(username: &str) -> Self {
        Self::new(username, UserRole::Patient)
    }

    pub fn admin(username: &str) -> Self {
        Self::new(username, UserRole::Admin)
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            username: self.username.clone(),
            role: self.role,
            issued_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    /// Builds the token by hand so validation is not tested against its own signer.
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "username": user.username,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Canned PostgREST rows for wiremock responses.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn patient_response(patient_id: &str, identification: &str, email: &str) -> serde_json::Value {
        json!({
            "id": patient_id,
            "identification": identification,
            "first_name": "Juan",
            "last_name": "Perez",
            "email": email,
            "phone": "5551234567",
            "address": "cra 10 #20-30",
            "city": "Medellin",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn doctor_response(doctor_id: &str, identification: &str, email: &str) -> serde_json::Value {
        json!({
            "id": doctor_id,
            "identification": identification,
            "first_name": "Ana",
            "last_name": "Martinez",
            "email": email,
            "phone": "3159876543",
            "address": "Carrera 7 # 32-16",
            "city": "Bogota",
            "professional_card": format!("TP{}", identification),
            "admission_date": "2024-01-15",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn appointment_response(
        appointment_id: &str,
        doctor_id: &str,
        patient_id: &str,
        appointment_date: &str,
    ) -> serde_json::Value {
        json!({
            "id": appointment_id,
            "appointment_date": appointment_date,
            "status": "SCHEDULED",
            "status_updated_at": null,
            "doctor_id": doctor_id,
            "patient_id": patient_id,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn medication_response(medication_id: &str, name: &str) -> serde_json::Value {
        json!({
            "id": medication_id,
            "name": name,
            "description": "Non-steroidal anti-inflammatory drug",
            "diseases": "Pain, inflammation, fever",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn medical_order_response(order_id: &str, appointment_id: &str) -> serde_json::Value {
        json!({
            "id": order_id,
            "appointment_id": appointment_id,
            "description": "Perform complete blood tests",
            "expiration_date": "2025-11-15",
            "specialty": "Clinical Laboratory",
            "medications": [],
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "code": code,
            "message": message,
            "details": null,
            "hint": null
        })
    }
}
