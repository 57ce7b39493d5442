//! # Vitals TUI
//!
//! A terminal client for a personal health-records REST API.
//!
//! ## Features
//! - Login, registration and password-reset requests
//! - Token session persisted across restarts, with transparent refresh on 401
//! - Health records: list with date filter and paging, detail, create, edit, delete
//! - Statistics: averages and weight / blood-pressure / heart-rate trend charts
//! - Client-side validation of every form
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - API Layer (Tokio runtime) over a shared [`SessionManager`]

pub mod api;
pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod messages;
pub mod models;
pub mod session;
pub mod storage;
pub mod ui;
pub mod validation;

// Re-export commonly used types
pub use api::{ApiActor, ApiClient, AuthApi};
pub use app::{AppActor, AppState};
pub use config::Config;
pub use error::{ApiError, AuthError, Error, Result, ValidationError};
pub use messages::{ApiCommand, ApiResponse, RenderState, UiEvent};
pub use models::{DateRange, HealthRecord, HealthStatistics};
pub use session::{Claims, RetryDecision, RetryState, Session, SessionManager};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};
