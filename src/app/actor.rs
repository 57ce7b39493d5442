//! App actor - message loop processing UI events and API responses

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::messages::{ApiCommand, ApiResponse, RenderState, UiEvent};

/// App actor that processes UI events and API responses
pub struct AppActor {
    state: AppState,
    api_tx: mpsc::UnboundedSender<ApiCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        api_tx: mpsc::UnboundedSender<ApiCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state: AppState::new(),
            api_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut api_rx: mpsc::UnboundedReceiver<ApiResponse>,
    ) {
        // Pick up a stored session before the first frame
        let restore = self.state.start();
        self.send(Some(restore));
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        // Quit signal received
                        let _ = self.api_tx.send(ApiCommand::Shutdown);
                        break;
                    }
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(response) = api_rx.recv() => {
                    let follow_up = self.state.handle_response(response);
                    self.send(follow_up);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                else => break,
            }
        }
    }

    fn send(&self, command: Option<ApiCommand>) {
        if let Some(cmd) = command {
            let _ = self.api_tx.send(cmd);
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        let command = match event {
            // Navigation
            UiEvent::SwitchScreen(screen) => self.state.navigate(screen),
            UiEvent::Back => self.state.back(),

            // Form editing
            UiEvent::NextField => {
                self.state.next_field();
                None
            }
            UiEvent::PrevField => {
                self.state.prev_field();
                None
            }
            UiEvent::CharInput(c) => {
                self.state.enter_char(c);
                None
            }
            UiEvent::Backspace => {
                self.state.delete_char();
                None
            }
            UiEvent::CursorLeft => {
                self.state.move_cursor_left();
                None
            }
            UiEvent::CursorRight => {
                self.state.move_cursor_right();
                None
            }
            UiEvent::Submit => self.state.submit(),

            // Records list
            UiEvent::SelectNext => {
                self.state.select_next();
                None
            }
            UiEvent::SelectPrev => {
                self.state.select_prev();
                None
            }
            UiEvent::NextPage => {
                self.state.next_page();
                None
            }
            UiEvent::PrevPage => {
                self.state.prev_page();
                None
            }
            UiEvent::OpenSelected => self.state.open_selected(),
            UiEvent::NewRecord => {
                self.state.new_record();
                None
            }
            UiEvent::EditRecord => self.state.edit_record(),
            UiEvent::RequestDelete => {
                self.state.request_delete();
                None
            }
            UiEvent::ConfirmDelete => self.state.confirm_delete(),
            UiEvent::CancelDelete => {
                self.state.cancel_delete();
                None
            }

            // Filters and reloads
            UiEvent::OpenFilter => {
                self.state.open_filter();
                None
            }
            UiEvent::Reload => self.state.reload(),
            UiEvent::CycleChart => {
                self.state.cycle_chart();
                None
            }

            // Session
            UiEvent::Logout => self.state.logout(),

            // Popups
            UiEvent::ToggleHelp => {
                self.state.toggle_help();
                None
            }
            UiEvent::CloseHelp => {
                self.state.close_help();
                None
            }

            // System
            UiEvent::Quit => return true,
        };

        self.send(command);
        false
    }
}
