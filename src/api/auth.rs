//! Authentication endpoints.
//!
//! These calls carry no session of their own; `SessionManager` decides what
//! to do with the tokens they return.

use crate::api::http::{error_from_response, expect_json, expect_success};
use crate::error::{ApiError, AuthError, Result};
use crate::models::{
    LoginRequest, PasswordResetRequest, RefreshRequest, RegisterRequest, TokenPair,
};

#[derive(Clone)]
pub struct AuthApi {
    http: reqwest::Client,
    base_url: String,
}

impl AuthApi {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        AuthApi {
            http,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST /auth/login/
    ///
    /// 400 and 401 mean the credentials were refused; anything else is an
    /// ordinary API failure.
    pub async fn login(&self, request: &LoginRequest) -> Result<TokenPair> {
        tracing::info!(username = %request.username, "Logging in");
        let response = self
            .http
            .post(self.url("/auth/login/"))
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::transport(&e))?;

        let status = response.status().as_u16();
        if status == 400 || status == 401 {
            let error = error_from_response(response).await;
            return Err(AuthError::InvalidCredentials(error.message).into());
        }
        Ok(expect_json(response).await?)
    }

    /// POST /auth/refresh/
    ///
    /// Every failure is reported as `AuthError::RefreshRejected`: a session
    /// whose refresh cannot complete is over.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        tracing::info!("Refreshing access token");
        let body = RefreshRequest {
            refresh: refresh_token.to_string(),
        };
        let response = self
            .http
            .post(self.url("/auth/refresh/"))
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::RefreshRejected(ApiError::transport(&e).message))?;

        expect_json(response)
            .await
            .map_err(|e| AuthError::RefreshRejected(e.message).into())
    }

    /// POST /auth/logout/ with the refresh token, bearer-authenticated
    pub async fn logout(&self, access_token: Option<&str>, refresh_token: &str) -> Result<()> {
        let body = RefreshRequest {
            refresh: refresh_token.to_string(),
        };
        let mut builder = self.http.post(self.url("/auth/logout/")).json(&body);
        if let Some(token) = access_token {
            builder = builder.bearer_auth(token);
        }
        let response = builder.send().await.map_err(|e| ApiError::transport(&e))?;
        Ok(expect_success(response).await?)
    }

    /// POST /users/
    pub async fn register(&self, request: &RegisterRequest) -> Result<()> {
        tracing::info!(username = %request.username, "Registering account");
        let response = self
            .http
            .post(self.url("/users/"))
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::transport(&e))?;
        Ok(expect_success(response).await?)
    }

    /// POST /users/request_password_reset/
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        tracing::info!("Requesting password reset");
        let body = PasswordResetRequest {
            email: email.to_string(),
        };
        let response = self
            .http
            .post(self.url("/users/request_password_reset/"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::transport(&e))?;
        Ok(expect_success(response).await?)
    }
}
