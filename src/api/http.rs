//! Shared HTTP plumbing: client construction and response decoding

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::constants::{APP_NAME, APP_VERSION, REQUEST_TIMEOUT_SECS};
use crate::error::ApiError;

/// Create an HTTP client with default configuration
pub fn create_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(format!("{}/{}", APP_NAME, APP_VERSION))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Turn a non-2xx response into an `ApiError`, reading the body for a message
pub async fn error_from_response(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ApiError::from_body(status, &body)
}

/// Decode a successful response body as JSON
pub async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(|e| ApiError::transport(&e))?;
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        ApiError::new(
            status,
            format!("Unexpected response: {}. Raw: {}", e, preview),
        )
    })
}

/// Check the status, then decode
pub async fn expect_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    read_json(response).await
}

/// Check the status and discard the body
pub async fn expect_success(response: reqwest::Response) -> Result<(), ApiError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    Ok(())
}
