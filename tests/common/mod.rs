//! Common test utilities for integration tests.
//!
//! Builds clients wired to a `wiremock` server and hands out JWT-shaped
//! tokens the session layer can decode.

#![allow(dead_code)]

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vitals_tui::api::{ApiClient, AuthApi};
use vitals_tui::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use vitals_tui::session::SessionManager;
use vitals_tui::storage::{MemoryTokenStore, TokenStore};

/// A token whose payload decodes to `{exp, user_id, username}`.
///
/// `tag` ends up in the signature so tokens minted in the same second
/// still differ.
pub fn jwt(username: &str, expires_in_secs: i64, tag: &str) -> String {
    let exp = chrono::Utc::now().timestamp() + expires_in_secs;
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({ "exp": exp, "user_id": 1, "username": username, "token_type": "access" })
            .to_string(),
    );
    format!("{}.{}.{}", header, payload, URL_SAFE_NO_PAD.encode(tag))
}

pub fn valid_jwt(tag: &str) -> String {
    jwt("alice", 3600, tag)
}

pub fn expired_jwt(tag: &str) -> String {
    jwt("alice", -60, tag)
}

/// Client, session and store pointed at `server`
pub struct TestClient {
    pub client: ApiClient,
    pub session: Arc<SessionManager>,
    pub store: Arc<MemoryTokenStore>,
}

impl TestClient {
    pub fn new(server: &MockServer) -> Self {
        Self::with_store(server, Arc::new(MemoryTokenStore::new()))
    }

    pub fn with_store(server: &MockServer, store: Arc<MemoryTokenStore>) -> Self {
        let http = reqwest::Client::new();
        let auth = AuthApi::new(http.clone(), server.uri());
        let session = Arc::new(SessionManager::new(auth, store.clone()));
        let client = ApiClient::new(http, server.uri(), session.clone());
        TestClient {
            client,
            session,
            store,
        }
    }

    /// Seed the store with a token pair and restore it into the session
    pub async fn with_tokens(server: &MockServer, access: &str, refresh: Option<&str>) -> Self {
        let store = Arc::new(MemoryTokenStore::new());
        store.set(ACCESS_TOKEN_KEY, access).unwrap();
        if let Some(refresh) = refresh {
            store.set(REFRESH_TOKEN_KEY, refresh).unwrap();
        }
        let test_client = Self::with_store(server, store);
        test_client.session.restore().await;
        test_client
    }

    pub fn stored_access(&self) -> Option<String> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    pub fn stored_refresh(&self) -> Option<String> {
        self.store.get(REFRESH_TOKEN_KEY)
    }
}

/// Mount a login endpoint answering with `access` / `refresh`
pub async fn mount_login(server: &MockServer, access: &str, refresh: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/login/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access": access, "refresh": refresh })),
        )
        .mount(server)
        .await;
}

/// Mount a refresh endpoint that must be hit exactly `times` times
pub async fn mount_refresh(server: &MockServer, access: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": access })))
        .expect(times)
        .mount(server)
        .await;
}

pub fn record_json(id: i64, record_time: &str) -> serde_json::Value {
    json!({
        "id": id,
        "user": 1,
        "record_time": record_time,
        "weight": "70.50",
        "systolic_pressure": 120,
        "diastolic_pressure": 80,
        "heart_rate": 64,
        "height": "175.00",
        "blood_glucose": "5.60",
        "mood": "平静",
        "notes": null
    })
}
