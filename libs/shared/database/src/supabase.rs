use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use shared_config::AppConfig;

use crate::error::{DatabaseError, UNIQUE_VIOLATION};

/// Thin PostgREST client. Every request is made with the service key, the
/// API itself is responsible for authenticating callers.
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            service_key: config.supabase_service_key.clone(),
        }
    }

    fn get_headers(&self) -> Result<HeaderMap, DatabaseError> {
        let mut headers = HeaderMap::new();

        let key = HeaderValue::from_str(&self.service_key)
            .map_err(|_| DatabaseError::Configuration("service key is not a valid header value".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.service_key))
            .map_err(|_| DatabaseError::Configuration("service key is not a valid header value".to_string()))?;

        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, DatabaseError>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T, DatabaseError>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(classify_failure(status.as_u16(), error_text));
        }

        let bytes = response.bytes().await?;
        let data = serde_json::from_slice::<T>(&bytes)?;
        Ok(data)
    }

    /// Runs a write and returns the affected rows (`Prefer: return=representation`).
    pub async fn write_returning<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<Vec<T>, DatabaseError>
    where T: DeserializeOwned {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        self.request_with_headers(method, path, body, Some(headers)).await
    }

    /// Inserts a single row and returns it as stored.
    pub async fn insert<T>(&self, table: &str, row: Value) -> Result<T, DatabaseError>
    where T: DeserializeOwned {
        let path = format!("/rest/v1/{}", table);
        let mut rows: Vec<T> = self.write_returning(Method::POST, &path, Some(row)).await?;

        if rows.is_empty() {
            return Err(DatabaseError::EmptyResponse(path));
        }
        Ok(rows.swap_remove(0))
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

/// URL-encodes a value for an `eq.`-style filter.
pub fn encoded(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Double-quotes and URL-encodes a value for use inside `or=(...)` or `in.(...)` lists.
pub fn quoted(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    urlencoding::encode(&format!("\"{}\"", escaped)).into_owned()
}

fn classify_failure(status: u16, error_text: String) -> DatabaseError {
    let postgres_code = serde_json::from_str::<Value>(&error_text)
        .ok()
        .and_then(|body| body.get("code").and_then(Value::as_str).map(str::to_string));

    match status {
        401 | 403 => {
            error!("Database rejected credentials ({}): {}", status, error_text);
            DatabaseError::Auth(error_text)
        }
        404 => DatabaseError::NotFound(error_text),
        409 if postgres_code.as_deref() == Some(UNIQUE_VIOLATION) => {
            warn!("Unique constraint violation: {}", error_text);
            DatabaseError::UniqueViolation(error_text)
        }
        _ => {
            error!("API error ({}): {}", status, error_text);
            DatabaseError::Api { status, message: error_text }
        }
    }
}
