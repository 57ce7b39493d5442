//! Session lifecycle: login, logout, refresh and startup restore.
//!
//! The manager is the only writer of the token pair. Many request tasks read
//! it concurrently; writes are last-write-wins. Refreshes are serialized
//! through `refresh_gate` so that requests failing together with the same
//! stale token share a single refresh round trip.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::api::auth::AuthApi;
use crate::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::error::{AuthError, Result};
use crate::models::{LoginRequest, RegisterRequest};
use crate::session::token::{decode_claims, Claims};
use crate::storage::TokenStore;

/// The live token pair plus the decoded identity of the access token
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub claims: Claims,
}

impl Session {
    /// Fails when the access token has no decodable claims
    fn from_tokens(access_token: String, refresh_token: Option<String>) -> Result<Self> {
        let claims = decode_claims(&access_token).ok_or(AuthError::MalformedToken)?;
        Ok(Session {
            access_token,
            refresh_token,
            claims,
        })
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims.expires_at()
    }

    pub fn is_expired(&self) -> bool {
        self.claims.is_expired()
    }
}

pub struct SessionManager {
    auth: AuthApi,
    store: Arc<dyn TokenStore>,
    state: RwLock<Option<Session>>,
    refresh_gate: Mutex<()>,
}

impl SessionManager {
    /// Starts unauthenticated; call `restore` to pick up persisted tokens.
    pub fn new(auth: AuthApi, store: Arc<dyn TokenStore>) -> Self {
        SessionManager {
            auth,
            store,
            state: RwLock::new(None),
            refresh_gate: Mutex::new(()),
        }
    }

    // ========================
    // Read side
    // ========================

    /// True iff a non-expired access token is present
    pub fn is_authenticated(&self) -> bool {
        self.read().as_ref().is_some_and(|s| !s.is_expired())
    }

    /// True while a token pair is held, expired or not
    pub fn has_session(&self) -> bool {
        self.read().is_some()
    }

    pub fn session(&self) -> Option<Session> {
        self.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.access_token.clone())
    }

    pub fn current_user(&self) -> Option<Claims> {
        self.read().as_ref().map(|s| s.claims.clone())
    }

    // ========================
    // Lifecycle
    // ========================

    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let pair = self.auth.login(&request).await?;
        let session = Session::from_tokens(pair.access, pair.refresh)?;
        self.install(session.clone());
        tracing::info!(user = %session.claims.display_name(), "Logged in");
        Ok(session)
    }

    /// Best-effort server logout, then local state is always cleared
    pub async fn logout(&self) {
        let current = self.session();
        if let Some(refresh) = current.as_ref().and_then(|s| s.refresh_token.clone()) {
            let access = current.as_ref().map(|s| s.access_token.as_str());
            if let Err(e) = self.auth.logout(access, &refresh).await {
                tracing::warn!(error = %e, "Logout request failed, clearing local session anyway");
            }
        }
        self.clear();
        tracing::info!("Logged out");
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Any failure clears the session.
    pub async fn refresh(&self) -> Result<Session> {
        let _gate = self.refresh_gate.lock().await;
        self.refresh_locked().await
    }

    /// Refresh on behalf of a request that was rejected while holding `stale`.
    ///
    /// When another task already replaced that token, its result is reused
    /// instead of refreshing again.
    pub async fn refresh_after(&self, stale: Option<&str>) -> Result<Session> {
        let _gate = self.refresh_gate.lock().await;
        if let Some(current) = self.session() {
            if stale != Some(current.access_token.as_str()) && !current.is_expired() {
                tracing::debug!("Reusing token refreshed by a concurrent request");
                return Ok(current);
            }
        }
        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> Result<Session> {
        let refresh_token = self
            .read()
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
            .or_else(|| self.store.get(REFRESH_TOKEN_KEY));

        let Some(refresh_token) = refresh_token else {
            self.clear();
            return Err(AuthError::MissingRefreshToken.into());
        };

        let result = match self.auth.refresh(&refresh_token).await {
            // Servers without rotation omit the new refresh token
            Ok(pair) => Session::from_tokens(pair.access, pair.refresh.or(Some(refresh_token))),
            Err(e) => Err(e),
        };

        match result {
            Ok(session) => {
                self.install(session.clone());
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, session cleared");
                self.clear();
                Err(e)
            }
        }
    }

    /// Pick up persisted tokens at startup. Returns the resulting auth state.
    pub async fn restore(&self) -> bool {
        let Some(access) = self.store.get(ACCESS_TOKEN_KEY) else {
            tracing::debug!("No stored session");
            return false;
        };
        let refresh = self.store.get(REFRESH_TOKEN_KEY);

        let Some(claims) = decode_claims(&access) else {
            tracing::warn!("Stored access token is not decodable, discarding session");
            self.clear();
            return false;
        };

        if !claims.is_expired() {
            *self.write() = Some(Session {
                access_token: access,
                refresh_token: refresh,
                claims,
            });
            tracing::debug!("Restored stored session");
            return true;
        }

        if refresh.is_none() {
            tracing::debug!("Stored access token expired and no refresh token");
            self.clear();
            return false;
        }

        *self.write() = Some(Session {
            access_token: access,
            refresh_token: refresh,
            claims,
        });
        self.refresh().await.is_ok()
    }

    /// Drop the session from memory and storage
    pub fn clear(&self) {
        *self.write() = None;
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "Failed to clear stored tokens");
        }
    }

    // ========================
    // Account endpoints
    // ========================

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<()> {
        let request = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.auth.register(&request).await
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        self.auth.request_password_reset(email).await
    }

    // ========================
    // Internals
    // ========================

    fn install(&self, session: Session) {
        if let Err(e) = self.store.set(ACCESS_TOKEN_KEY, &session.access_token) {
            tracing::error!(error = %e, "Failed to persist access token");
        }
        let persisted = match &session.refresh_token {
            Some(refresh) => self.store.set(REFRESH_TOKEN_KEY, refresh),
            None => self.store.remove(REFRESH_TOKEN_KEY),
        };
        if let Err(e) = persisted {
            tracing::error!(error = %e, "Failed to persist refresh token");
        }
        *self.write() = Some(session);
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
