use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::HeaderMap,
};
use tracing::debug;

use axum_extra::extract::WithRejection;

use shared_config::AppConfig;
use shared_models::auth::TokenResponse;
use shared_models::error::AppError;
use shared_utils::extractor::extract_bearer_token;
use shared_utils::jwt::validate_token as decode_token;

use crate::models::{AuthError, AuthResponse, LoginRequest, RegisterRequest};
use crate::services::AuthService;

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let code = err.code();
        match err {
            AuthError::InvalidCredentials | AuthError::InactiveUser => AppError::Auth(err.to_string()),
            AuthError::AlreadyRegistered => AppError::conflict(code, err.to_string()),
            AuthError::Validation(errors) => AppError::ValidationError(errors.to_string()),
            AuthError::Token(_) | AuthError::RegistrationFailed | AuthError::LoginFailed => {
                AppError::internal(code, err.to_string())
            }
        }
    }
}

#[axum::debug_handler]
pub async fn register(
    State(config): State<Arc<AppConfig>>,
    WithRejection(Json(request), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> Result<Json<AuthResponse>, AppError> {
    let auth_service = AuthService::new(&config);
    let response = auth_service.register(request).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    WithRejection(Json(request), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<Json<AuthResponse>, AppError> {
    let auth_service = AuthService::new(&config);
    let response = auth_service.login(request).await?;
    Ok(Json(response))
}

pub async fn validate_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = extract_bearer_token(&headers)?;
    let user = decode_token(&token, &config.jwt_secret).map_err(|e| AppError::Auth(e.to_string()))?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: user.id,
        username: user.username,
        role: user.role,
    }))
}
