//! Authenticated API client - attaches the bearer token and applies the
//! retry policy to every request

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Serialize;

use crate::api::auth::AuthApi;
use crate::api::http::{create_client, error_from_response};
use crate::config::Config;
use crate::error::{ApiError, AuthError, Result};
use crate::session::{RetryDecision, RetryState, SessionManager};
use crate::storage::TokenStore;

/// A request described as data, so it can be rebuilt for the retry
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::new(500, format!("Failed to encode request: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, session: Arc<SessionManager>) -> Self {
        ApiClient {
            http,
            base_url: base_url.into(),
            session,
        }
    }

    /// Wire up HTTP client, auth endpoints and session from configuration
    pub fn from_config(config: &Config, store: Arc<dyn TokenStore>) -> Self {
        let http = create_client();
        let auth = AuthApi::new(http.clone(), config.api_url.clone());
        let session = Arc::new(SessionManager::new(auth, store));
        ApiClient::new(http, config.api_url.clone(), session)
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    fn build(&self, request: &ApiRequest, token: Option<&str>) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        builder
    }

    /// Send with the bearer token; on 401 refresh once and reissue.
    ///
    /// When the refresh fails, or the reissued request is rejected again, the
    /// session is cleared and the original 401 error is returned.
    pub async fn send(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        if !self.session.has_session() {
            return Err(AuthError::NotAuthenticated.into());
        }

        let mut retry = RetryState::default();
        loop {
            let token = self.session.access_token();
            tracing::info!(method = %request.method, path = %request.path, retry = retry.is_retry(), "API request");

            let response = self
                .build(request, token.as_deref())
                .send()
                .await
                .map_err(|e| ApiError::transport(&e))?;

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let error = error_from_response(response).await;
            if status != StatusCode::UNAUTHORIZED {
                tracing::info!(status = status.as_u16(), path = %request.path, "API request failed");
                return Err(error.into());
            }

            match retry.on_unauthorized() {
                RetryDecision::RefreshAndRetry => {
                    if let Err(refresh_error) = self.session.refresh_after(token.as_deref()).await {
                        tracing::warn!(error = %refresh_error, path = %request.path, "Refresh failed, giving up");
                        self.session.clear();
                        return Err(error.into());
                    }
                }
                RetryDecision::GiveUp => {
                    tracing::warn!(path = %request.path, "Request rejected after refresh, session cleared");
                    self.session.clear();
                    return Err(error.into());
                }
            }
        }
    }
}
