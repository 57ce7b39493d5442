//! Session layer - token pair ownership, claim decoding and the 401 retry policy

pub mod manager;
pub mod retry;
pub mod token;

pub use manager::{Session, SessionManager};
pub use retry::{RetryDecision, RetryState};
pub use token::{decode_claims, Claims};
