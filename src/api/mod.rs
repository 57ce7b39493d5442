//! API layer - HTTP plumbing, auth endpoints, the authenticated client and
//! the actor that runs them
//!
//! The API actor receives commands from the app layer and sends back responses.

pub mod actor;
pub mod auth;
pub mod client;
pub mod http;
pub mod records;

pub use actor::ApiActor;
pub use auth::AuthApi;
pub use client::{ApiClient, ApiRequest};
