use std::time::Duration;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::{quoted, SupabaseClient};
use shared_utils::jwt::issue_token;

use crate::models::{AuthError, AuthResponse, AuthUser, LoginRequest, RegisterRequest, UserAccount};
use crate::services::password::{hash_password, verify_password};

pub struct AuthService {
    supabase: SupabaseClient,
    jwt_secret: String,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            jwt_secret: config.jwt_secret.clone(),
            token_ttl: config.jwt_expiration,
        }
    }

    /// Creates an account and signs the caller in. Role defaults to `PATIENT`.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        request.validate()?;
        debug!("Registering user: {}", request.username);

        let path = format!(
            "/rest/v1/users?select=id&or=(username.eq.{},email.eq.{})",
            quoted(&request.username),
            quoted(&request.email)
        );
        let existing: Vec<Value> = self.supabase.request(Method::GET, &path, None).await.map_err(|e| {
            error!("Error checking existing users: {}", e);
            AuthError::RegistrationFailed
        })?;

        if !existing.is_empty() {
            warn!("Registration rejected, username or email taken: {}", request.username);
            return Err(AuthError::AlreadyRegistered);
        }

        let password_hash = hash_password(&request.password).map_err(|e| {
            error!("Error hashing password: {}", e);
            AuthError::RegistrationFailed
        })?;

        let now = Utc::now().to_rfc3339();
        let account: UserAccount = self
            .supabase
            .insert("users", json!({
                "username": request.username,
                "email": request.email,
                "password_hash": password_hash,
                "role": request.role.unwrap_or_default(),
                "is_active": true,
                "created_at": now,
                "updated_at": now,
            }))
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    return AuthError::AlreadyRegistered;
                }
                error!("Error registering user: {}", e);
                AuthError::RegistrationFailed
            })?;

        info!("User registered: {}", account.username);
        self.respond(&account)
    }

    /// `username` may hold either the username or the email.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        request.validate()?;

        let path = format!(
            "/rest/v1/users?or=(username.eq.{0},email.eq.{0})&limit=1",
            quoted(&request.username)
        );
        let accounts: Vec<UserAccount> = self.supabase.request(Method::GET, &path, None).await.map_err(|e| {
            error!("Error during authentication: {}", e);
            AuthError::LoginFailed
        })?;

        let account = accounts.into_iter().next().ok_or(AuthError::InvalidCredentials)?;

        let valid = verify_password(&request.password, &account.password_hash).map_err(|e| {
            error!("Stored password hash for {} is unreadable: {}", account.username, e);
            AuthError::LoginFailed
        })?;

        if !valid {
            warn!("Failed login for {}", request.username);
            return Err(AuthError::InvalidCredentials);
        }

        if !account.is_active {
            warn!("Login attempt by inactive user {}", account.username);
            return Err(AuthError::InactiveUser);
        }

        info!("User authenticated: {}", account.username);
        self.respond(&account)
    }

    fn respond(&self, account: &UserAccount) -> Result<AuthResponse, AuthError> {
        let access_token = issue_token(
            &account.id.to_string(),
            &account.username,
            account.role,
            &self.jwt_secret,
            self.token_ttl,
        )?;

        Ok(AuthResponse {
            access_token,
            user: AuthUser::from(account),
        })
    }
}
