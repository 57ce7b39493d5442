//! Command handlers - business logic for processing UI events and API responses

use chrono::Local;

use crate::app::state::{format_date, record_field, AppState, LoadState};
use crate::constants::RECORDS_PAGE_SIZE;
use crate::error::Error;
use crate::messages::ui_events::{InputMode, Screen};
use crate::messages::{ApiCommand, ApiResponse};
use crate::models::{HealthRecord, Mood, TIME_FORMAT};
use crate::validation::{self, RecordInput};

impl AppState {
    // ========================
    // Startup
    // ========================

    pub fn start(&mut self) -> ApiCommand {
        self.restoring = true;
        ApiCommand::RestoreSession { id: self.next_id() }
    }

    // ========================
    // Navigation
    // ========================

    /// Switch screens, redirecting protected screens to Login without a session
    pub fn navigate(&mut self, screen: Screen) -> Option<ApiCommand> {
        self.show_help = false;
        self.input_mode = InputMode::Normal;
        self.confirm_delete = None;

        if screen.is_protected() && !self.is_authenticated() {
            self.screen = Screen::Login;
            self.error("Please log in to continue");
            return None;
        }

        self.screen = screen;
        match screen {
            Screen::Records => self.load_records(),
            Screen::Statistics => self.load_statistics(),
            _ => None,
        }
    }

    pub fn back(&mut self) -> Option<ApiCommand> {
        if self.input_mode == InputMode::Editing {
            self.input_mode = InputMode::Normal;
            if let Some(form) = self.active_form_mut() {
                form.error = None;
            }
            return None;
        }
        match self.screen {
            Screen::Register | Screen::ResetPassword => self.navigate(Screen::Login),
            Screen::RecordDetail => self.navigate(Screen::Records),
            Screen::RecordForm => self.leave_record_form(),
            _ => None,
        }
    }

    fn leave_record_form(&mut self) -> Option<ApiCommand> {
        self.record_form.reset();
        match (self.form_origin, self.editing_record) {
            (Screen::RecordDetail, Some(record_id)) => self.open_record(record_id),
            (origin, _) => self.navigate(origin),
        }
    }

    pub fn load_records(&mut self) -> Option<ApiCommand> {
        self.records_state = LoadState::Loading;
        Some(ApiCommand::ListRecords {
            id: self.next_id(),
            range: self.records_filter,
        })
    }

    pub fn load_statistics(&mut self) -> Option<ApiCommand> {
        self.statistics_state = LoadState::Loading;
        Some(ApiCommand::FetchStatistics {
            id: self.next_id(),
            range: self.statistics_range,
        })
    }

    pub fn reload(&mut self) -> Option<ApiCommand> {
        match self.screen {
            Screen::Records => self.load_records(),
            Screen::Statistics => self.load_statistics(),
            _ => None,
        }
    }

    // ========================
    // Form editing
    // ========================

    pub fn enter_char(&mut self, c: char) {
        if let Some(input) = self.active_form_mut().and_then(|f| f.focused_input()) {
            input.insert(c);
        }
    }

    pub fn delete_char(&mut self) {
        if let Some(input) = self.active_form_mut().and_then(|f| f.focused_input()) {
            input.backspace();
        }
    }

    pub fn move_cursor_left(&mut self) {
        if let Some(input) = self.active_form_mut().and_then(|f| f.focused_input()) {
            input.move_left();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(input) = self.active_form_mut().and_then(|f| f.focused_input()) {
            input.move_right();
        }
    }

    pub fn next_field(&mut self) {
        if let Some(form) = self.active_form_mut() {
            form.next_field();
        }
    }

    pub fn prev_field(&mut self) {
        if let Some(form) = self.active_form_mut() {
            form.prev_field();
        }
    }

    /// Validate the active form and turn it into a command
    pub fn submit(&mut self) -> Option<ApiCommand> {
        match self.screen {
            Screen::Login => self.submit_login(),
            Screen::Register => self.submit_registration(),
            Screen::ResetPassword => self.submit_password_reset(),
            Screen::RecordForm => self.submit_record(),
            Screen::Records | Screen::Statistics if self.input_mode == InputMode::Editing => {
                self.apply_filter()
            }
            _ => None,
        }
    }

    fn submit_login(&mut self) -> Option<ApiCommand> {
        let form = &mut self.login_form;
        let (username, password) = (form.value(0).trim().to_string(), form.value(1).to_string());
        if let Err(e) = validation::validate_login(&username, &password) {
            form.error = Some(e.to_string());
            return None;
        }
        form.error = None;
        Some(ApiCommand::Login {
            id: self.next_id(),
            username,
            password,
        })
    }

    fn submit_registration(&mut self) -> Option<ApiCommand> {
        let form = &mut self.register_form;
        let username = form.value(0).trim().to_string();
        let email = form.value(1).trim().to_string();
        let password = form.value(2).to_string();
        if let Err(e) = validation::validate_registration(&username, &email, &password, form.value(3)) {
            form.error = Some(e.to_string());
            return None;
        }
        form.error = None;
        Some(ApiCommand::Register {
            id: self.next_id(),
            username,
            email,
            password,
        })
    }

    fn submit_password_reset(&mut self) -> Option<ApiCommand> {
        let form = &mut self.reset_form;
        let email = form.value(0).trim().to_string();
        if let Err(e) = validation::validate_email(&email) {
            form.error = Some(e.to_string());
            return None;
        }
        form.error = None;
        Some(ApiCommand::RequestPasswordReset {
            id: self.next_id(),
            email,
        })
    }

    fn submit_record(&mut self) -> Option<ApiCommand> {
        let form = &mut self.record_form;
        let input = RecordInput {
            date: form.value(record_field::DATE),
            time: form.value(record_field::TIME),
            weight: form.value(record_field::WEIGHT),
            height: form.value(record_field::HEIGHT),
            systolic: form.value(record_field::SYSTOLIC),
            diastolic: form.value(record_field::DIASTOLIC),
            heart_rate: form.value(record_field::HEART_RATE),
            blood_glucose: form.value(record_field::BLOOD_GLUCOSE),
            mood: form.value(record_field::MOOD),
            notes: form.value(record_field::NOTES),
        };
        let record = match validation::record_from_input(&input) {
            Ok(record) => record,
            Err(e) => {
                form.error = Some(e.to_string());
                return None;
            }
        };
        form.error = None;

        let id = self.next_id();
        Some(match self.editing_record {
            Some(record_id) => ApiCommand::UpdateRecord { id, record_id, record },
            None => ApiCommand::CreateRecord { id, record },
        })
    }

    fn apply_filter(&mut self) -> Option<ApiCommand> {
        let on_records = self.screen == Screen::Records;
        let form = if on_records {
            &mut self.records_filter_form
        } else {
            &mut self.statistics_filter_form
        };
        let range = match validation::parse_date_range(form.value(0), form.value(1)) {
            Ok(range) => range,
            Err(e) => {
                form.error = Some(e.to_string());
                return None;
            }
        };
        form.error = None;
        self.input_mode = InputMode::Normal;

        if on_records {
            self.records_filter = range;
            self.page = 0;
            self.selected = 0;
            self.load_records()
        } else {
            self.statistics_range = range;
            self.load_statistics()
        }
    }

    pub fn open_filter(&mut self) {
        if matches!(self.screen, Screen::Records | Screen::Statistics) {
            self.input_mode = InputMode::Editing;
            if let Some(form) = self.active_form_mut() {
                form.focused = 0;
                form.error = None;
            }
        }
    }

    // ========================
    // Records list
    // ========================

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.records.len() {
            self.selected += 1;
            self.page = self.selected / RECORDS_PAGE_SIZE;
        }
    }

    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.page = self.selected / RECORDS_PAGE_SIZE;
        }
    }

    pub fn next_page(&mut self) {
        if self.page + 1 < self.page_count() {
            self.page += 1;
            self.selected = self.page * RECORDS_PAGE_SIZE;
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 0 {
            self.page -= 1;
            self.selected = self.page * RECORDS_PAGE_SIZE;
        }
    }

    pub fn open_selected(&mut self) -> Option<ApiCommand> {
        let record_id = self.selected_record()?.id?;
        self.open_record(record_id)
    }

    fn open_record(&mut self, record_id: i64) -> Option<ApiCommand> {
        let command = self.navigate(Screen::RecordDetail);
        if self.screen != Screen::RecordDetail {
            return command;
        }
        self.detail = None;
        self.detail_state = LoadState::Loading;
        Some(ApiCommand::GetRecord {
            id: self.next_id(),
            record_id,
        })
    }

    /// The record the list or detail screen is pointing at
    fn current_record_id(&self) -> Option<i64> {
        match self.screen {
            Screen::Records => self.selected_record().and_then(|r| r.id),
            Screen::RecordDetail => self.detail.as_ref().and_then(|r| r.id),
            _ => None,
        }
    }

    pub fn new_record(&mut self) {
        if !matches!(self.screen, Screen::Records | Screen::RecordDetail) {
            return;
        }
        self.form_origin = self.screen;
        self.editing_record = None;
        self.record_form.reset();
        let now = Local::now().naive_local();
        self.record_form.set(record_field::DATE, format_date(now.date()));
        self.record_form.set(record_field::TIME, now.format(TIME_FORMAT).to_string());
        self.screen = Screen::RecordForm;
    }

    /// Open the form for the current record; it is prefilled once fetched
    pub fn edit_record(&mut self) -> Option<ApiCommand> {
        let record_id = self.current_record_id()?;
        self.form_origin = self.screen;
        self.editing_record = Some(record_id);
        self.record_form.reset();
        self.screen = Screen::RecordForm;
        Some(ApiCommand::GetRecord {
            id: self.next_id(),
            record_id,
        })
    }

    fn fill_record_form(&mut self, record: &HealthRecord) {
        let form = &mut self.record_form;
        let optional = |v: Option<i32>| v.map(|v| v.to_string()).unwrap_or_default();
        let decimal = |v: Option<f64>| v.map(|v| format!("{:.1}", v)).unwrap_or_default();
        form.set(record_field::DATE, record.date_string());
        form.set(record_field::TIME, record.time_string());
        form.set(record_field::WEIGHT, decimal(record.weight));
        form.set(record_field::HEIGHT, decimal(record.height));
        form.set(record_field::SYSTOLIC, optional(record.systolic_pressure));
        form.set(record_field::DIASTOLIC, optional(record.diastolic_pressure));
        form.set(record_field::HEART_RATE, optional(record.heart_rate));
        form.set(record_field::BLOOD_GLUCOSE, decimal(record.blood_glucose));
        // Unknown stored moods are shown as-is and rejected on submit
        let mood = record.mood.as_deref().unwrap_or_default();
        form.set(
            record_field::MOOD,
            Mood::from_wire(mood).map_or(mood, |m| m.label()),
        );
        form.set(record_field::NOTES, record.notes.clone().unwrap_or_default());
        form.focused = 0;
    }

    pub fn request_delete(&mut self) {
        self.confirm_delete = self.current_record_id();
    }

    pub fn confirm_delete(&mut self) -> Option<ApiCommand> {
        let record_id = self.confirm_delete.take()?;
        Some(ApiCommand::DeleteRecord {
            id: self.next_id(),
            record_id,
        })
    }

    pub fn cancel_delete(&mut self) {
        self.confirm_delete = None;
    }

    // ========================
    // Statistics
    // ========================

    pub fn cycle_chart(&mut self) {
        self.chart = self.chart.next();
    }

    // ========================
    // Session
    // ========================

    pub fn logout(&mut self) -> Option<ApiCommand> {
        if !self.is_authenticated() {
            return None;
        }
        Some(ApiCommand::Logout { id: self.next_id() })
    }

    fn clear_session_data(&mut self) {
        // Anything still in flight belongs to the ended session
        self.pending_request_id = None;
        self.user = None;
        self.records.clear();
        self.records_state = LoadState::Idle;
        self.selected = 0;
        self.page = 0;
        self.confirm_delete = None;
        self.detail = None;
        self.detail_state = LoadState::Idle;
        self.editing_record = None;
        self.record_form.reset();
        self.statistics = None;
        self.statistics_state = LoadState::Idle;
    }

    // ========================
    // Popups
    // ========================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    // ========================
    // API responses
    // ========================

    /// Apply a response; may trigger a follow-up command
    pub fn handle_response(&mut self, response: ApiResponse) -> Option<ApiCommand> {
        let id = response.id();

        // These apply even when a newer request has been issued since
        let response = match response {
            ApiResponse::SessionExpired { error, .. } => {
                return self.session_expired(&error);
            }
            ApiResponse::LoggedOut { .. } => {
                self.clear_session_data();
                let command = self.navigate(Screen::Login);
                self.info("Logged out");
                return command;
            }
            ApiResponse::SessionRestored { user, .. } => {
                if self.pending_request_id == Some(id) {
                    self.pending_request_id = None;
                }
                self.restoring = false;
                return match user {
                    Some(user) if !self.is_authenticated() => {
                        self.user = Some(user);
                        self.navigate(Screen::Records)
                    }
                    _ => None,
                };
            }
            other => other,
        };

        if self.pending_request_id != Some(id) {
            tracing::debug!(id, "Dropping stale response");
            return None;
        }
        self.pending_request_id = None;

        match response {
            ApiResponse::LoggedIn { user, .. } => {
                self.login_form.reset();
                let name = user.display_name();
                self.user = Some(user);
                let command = self.navigate(Screen::Records);
                self.info(format!("Welcome, {}", name));
                command
            }
            ApiResponse::Registered { .. } => {
                self.register_form.reset();
                let command = self.navigate(Screen::Login);
                self.info("Account created, please log in");
                command
            }
            ApiResponse::PasswordResetRequested { .. } => {
                self.reset_form.reset();
                let command = self.navigate(Screen::Login);
                self.info("If the email is registered, a reset link has been sent");
                command
            }
            ApiResponse::Records { records, .. } => {
                self.records = records;
                self.records_state = LoadState::Loaded;
                self.page = self.page.min(self.page_count() - 1);
                let last = self.records.len().saturating_sub(1);
                self.selected = self.selected.max(self.page * RECORDS_PAGE_SIZE).min(last);
                None
            }
            ApiResponse::Record { record, .. } => {
                if self.screen == Screen::RecordForm && self.editing_record == record.id {
                    self.fill_record_form(&record);
                } else {
                    self.detail = Some(record);
                    self.detail_state = LoadState::Loaded;
                }
                None
            }
            ApiResponse::RecordSaved { record, .. } => {
                let created = self.editing_record.is_none();
                self.record_form.reset();
                let command = match (self.form_origin, record.id) {
                    (Screen::RecordDetail, Some(record_id)) => self.open_record(record_id),
                    _ => self.navigate(Screen::Records),
                };
                self.editing_record = None;
                self.info(if created { "Record created" } else { "Record updated" });
                command
            }
            ApiResponse::RecordDeleted { .. } => {
                let command = if self.screen == Screen::RecordDetail {
                    self.navigate(Screen::Records)
                } else {
                    self.load_records()
                };
                self.info("Record deleted");
                command
            }
            ApiResponse::Statistics { statistics, .. } => {
                self.statistics = Some(statistics);
                self.statistics_state = LoadState::Loaded;
                None
            }
            ApiResponse::Failed { error, .. } => {
                self.apply_failure(&error);
                None
            }
            ApiResponse::SessionExpired { .. }
            | ApiResponse::SessionRestored { .. }
            | ApiResponse::LoggedOut { .. } => None,
        }
    }

    fn session_expired(&mut self, error: &Error) -> Option<ApiCommand> {
        self.clear_session_data();
        let command = self.navigate(Screen::Login);
        self.error(format!("Session ended: {}. Please log in again.", error.user_message()));
        command
    }

    /// Show a failure where the current screen displays errors
    fn apply_failure(&mut self, error: &Error) {
        let message = error.user_message();
        match self.screen {
            Screen::Records => self.records_state = LoadState::Failed(message.clone()),
            Screen::RecordDetail => self.detail_state = LoadState::Failed(message.clone()),
            Screen::Statistics => self.statistics_state = LoadState::Failed(message.clone()),
            _ => {}
        }
        match self.active_form_mut() {
            Some(form) => form.error = Some(message),
            None => self.error(message),
        }
    }
}
