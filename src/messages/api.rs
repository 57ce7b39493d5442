//! API messages - communication between App and API layers

use crate::error::Error;
use crate::models::{DateRange, HealthRecord, HealthStatistics};
use crate::session::Claims;

/// Commands sent from App layer to API layer
#[derive(Debug, Clone)]
pub enum ApiCommand {
    // Session
    Login {
        id: u64,
        username: String,
        password: String,
    },
    Register {
        id: u64,
        username: String,
        email: String,
        password: String,
    },
    RequestPasswordReset {
        id: u64,
        email: String,
    },
    Logout {
        id: u64,
    },
    /// Pick up persisted tokens at startup
    RestoreSession {
        id: u64,
    },

    // Records
    ListRecords {
        id: u64,
        range: Option<DateRange>,
    },
    GetRecord {
        id: u64,
        record_id: i64,
    },
    CreateRecord {
        id: u64,
        record: HealthRecord,
    },
    UpdateRecord {
        id: u64,
        record_id: i64,
        record: HealthRecord,
    },
    DeleteRecord {
        id: u64,
        record_id: i64,
    },
    FetchStatistics {
        id: u64,
        range: Option<DateRange>,
    },

    /// Shutdown the API actor
    Shutdown,
}

impl ApiCommand {
    /// Commands that go through the authenticated client
    pub fn needs_session(&self) -> bool {
        matches!(
            self,
            ApiCommand::ListRecords { .. }
                | ApiCommand::GetRecord { .. }
                | ApiCommand::CreateRecord { .. }
                | ApiCommand::UpdateRecord { .. }
                | ApiCommand::DeleteRecord { .. }
                | ApiCommand::FetchStatistics { .. }
        )
    }
}

/// Responses sent from API layer to App layer
#[derive(Debug, Clone)]
pub enum ApiResponse {
    LoggedIn { id: u64, user: Claims },
    Registered { id: u64 },
    PasswordResetRequested { id: u64 },
    LoggedOut { id: u64 },
    SessionRestored { id: u64, user: Option<Claims> },
    Records { id: u64, records: Vec<HealthRecord> },
    Record { id: u64, record: HealthRecord },
    RecordSaved { id: u64, record: HealthRecord },
    RecordDeleted { id: u64, record_id: i64 },
    Statistics { id: u64, statistics: HealthStatistics },
    /// The request failed; the session is still usable
    Failed { id: u64, error: Error },
    /// The request failed and the retry policy cleared the session
    SessionExpired { id: u64, error: Error },
}

impl ApiResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            ApiResponse::LoggedIn { id, .. }
            | ApiResponse::Registered { id }
            | ApiResponse::PasswordResetRequested { id }
            | ApiResponse::LoggedOut { id }
            | ApiResponse::SessionRestored { id, .. }
            | ApiResponse::Records { id, .. }
            | ApiResponse::Record { id, .. }
            | ApiResponse::RecordSaved { id, .. }
            | ApiResponse::RecordDeleted { id, .. }
            | ApiResponse::Statistics { id, .. }
            | ApiResponse::Failed { id, .. }
            | ApiResponse::SessionExpired { id, .. } => *id,
        }
    }
}
