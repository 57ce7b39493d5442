//! API actor - runs session and record calls in the Tokio runtime

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::api::client::ApiClient;
use crate::error::Result;
use crate::messages::{ApiCommand, ApiResponse};

/// API actor that turns commands into client calls, one task per command
pub struct ApiActor {
    client: ApiClient,
    response_tx: mpsc::UnboundedSender<ApiResponse>,
    active_requests: JoinSet<()>,
}

impl ApiActor {
    pub fn new(client: ApiClient, response_tx: mpsc::UnboundedSender<ApiResponse>) -> Self {
        ApiActor {
            client,
            response_tx,
            active_requests: JoinSet::new(),
        }
    }

    /// Run the actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<ApiCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(ApiCommand::Shutdown) | None => {
                            self.active_requests.abort_all();
                            break;
                        }
                        Some(command) => {
                            let client = self.client.clone();
                            let response_tx = self.response_tx.clone();
                            self.active_requests.spawn(async move {
                                if let Some(response) = execute(&client, command).await {
                                    tracing::info!(id = response.id(), "Command completed");
                                    let _ = response_tx.send(response);
                                }
                            });
                        }
                    }
                }

                // Clean up completed tasks
                Some(_result) = self.active_requests.join_next() => {}
            }
        }
    }
}

/// Run one command to completion. `Shutdown` has no response.
pub async fn execute(client: &ApiClient, command: ApiCommand) -> Option<ApiResponse> {
    let session = client.session();
    let needs_session = command.needs_session();

    let (id, result) = match command {
        ApiCommand::Login { id, username, password } => (
            id,
            session
                .login(&username, &password)
                .await
                .map(|s| ApiResponse::LoggedIn { id, user: s.claims }),
        ),
        ApiCommand::Register { id, username, email, password } => (
            id,
            session
                .register(&username, &email, &password)
                .await
                .map(|_| ApiResponse::Registered { id }),
        ),
        ApiCommand::RequestPasswordReset { id, email } => (
            id,
            session
                .request_password_reset(&email)
                .await
                .map(|_| ApiResponse::PasswordResetRequested { id }),
        ),
        ApiCommand::Logout { id } => {
            session.logout().await;
            (id, Ok(ApiResponse::LoggedOut { id }))
        }
        ApiCommand::RestoreSession { id } => {
            let user = if session.restore().await {
                session.current_user()
            } else {
                None
            };
            (id, Ok(ApiResponse::SessionRestored { id, user }))
        }
        ApiCommand::ListRecords { id, range } => (
            id,
            client
                .list_records(range.as_ref())
                .await
                .map(|records| ApiResponse::Records { id, records }),
        ),
        ApiCommand::GetRecord { id, record_id } => (
            id,
            client
                .get_record(record_id)
                .await
                .map(|record| ApiResponse::Record { id, record }),
        ),
        ApiCommand::CreateRecord { id, record } => (
            id,
            client
                .create_record(&record)
                .await
                .map(|record| ApiResponse::RecordSaved { id, record }),
        ),
        ApiCommand::UpdateRecord { id, record_id, record } => (
            id,
            client
                .update_record(record_id, &record)
                .await
                .map(|record| ApiResponse::RecordSaved { id, record }),
        ),
        ApiCommand::DeleteRecord { id, record_id } => (
            id,
            client
                .delete_record(record_id)
                .await
                .map(|_| ApiResponse::RecordDeleted { id, record_id }),
        ),
        ApiCommand::FetchStatistics { id, range } => (
            id,
            client
                .statistics(range.as_ref())
                .await
                .map(|statistics| ApiResponse::Statistics { id, statistics }),
        ),
        ApiCommand::Shutdown => return None,
    };

    Some(finish(id, result, needs_session && !session.has_session()))
}

fn finish(id: u64, result: Result<ApiResponse>, session_lost: bool) -> ApiResponse {
    match result {
        Ok(response) => response,
        Err(error) if session_lost => {
            tracing::warn!(id, error = %error, "Session ended by failed request");
            ApiResponse::SessionExpired { id, error }
        }
        Err(error) => {
            tracing::info!(id, error = %error, "Command failed");
            ApiResponse::Failed { id, error }
        }
    }
}
