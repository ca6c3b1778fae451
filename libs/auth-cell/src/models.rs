use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::auth::UserRole;
use shared_utils::jwt::JwtError;
use shared_utils::validation::{FieldValidator, ValidationErrors};

/// Row of the `users` table.
#[derive(Debug, Clone, Deserialize)]
pub struct UserAccount {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Public view of an account, never carries the hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&UserAccount> for AuthUser {
    fn from(account: &UserAccount) -> Self {
        Self {
            user_id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: AuthUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<UserRole>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        FieldValidator::new()
            .required("Username", &self.username)
            .required("Email", &self.email)
            .email("Email", &self.email)
            .required("Password", &self.password)
            .min_length("Password", &self.password, 6)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        FieldValidator::new()
            .required("Username", &self.username)
            .required("Password", &self.password)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Inactive user")]
    InactiveUser,

    #[error("The username or email is already registered")]
    AlreadyRegistered,

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Could not issue token: {0}")]
    Token(#[from] JwtError),

    #[error("Error registering user")]
    RegistrationFailed,

    #[error("Authentication error")]
    LoginFailed,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials | AuthError::InactiveUser => "UNAUTHORIZED",
            AuthError::AlreadyRegistered => "USER_ALREADY_EXISTS",
            AuthError::Validation(_) => "VALIDATION_FAILED",
            AuthError::Token(_) => "TOKEN_ISSUE_FAILED",
            AuthError::RegistrationFailed => "REGISTRATION_FAILED",
            AuthError::LoginFailed => "AUTHENTICATION_FAILED",
        }
    }
}
