//! App state - pure data structure with no I/O logic

use chrono::{Local, NaiveDate};

use crate::constants::{DEFAULT_STATS_WINDOW_DAYS, RECORDS_PAGE_SIZE};
use crate::messages::ui_events::{InputMode, Screen};
use crate::messages::RenderState;
use crate::models::{DateRange, HealthRecord, HealthStatistics, DATE_FORMAT};
use crate::session::Claims;

/// A single-line text input with a byte-offset cursor
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextField {
    pub value: String,
    pub cursor: usize,
    /// Rendered as asterisks
    pub masked: bool,
}

impl TextField {
    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        if self.cursor <= self.value.len() {
            self.value.insert(self.cursor, c);
            self.cursor += c.len_utf8();
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.value[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.value.remove(prev);
            self.cursor = prev;
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.value[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.value.len() {
            self.cursor = self.value[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.value.len());
        }
    }

    /// What the UI shows: the value, or asterisks for masked fields
    pub fn display(&self) -> String {
        if self.masked {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    /// Cursor position in characters, for terminal placement
    pub fn cursor_column(&self) -> usize {
        self.value[..self.cursor].chars().count()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FormField {
    pub label: &'static str,
    pub input: TextField,
}

/// An ordered set of fields with one focused, plus the last validation error
#[derive(Clone, Debug, PartialEq)]
pub struct Form {
    pub fields: Vec<FormField>,
    pub focused: usize,
    pub error: Option<String>,
}

impl Form {
    fn new(fields: &[(&'static str, bool)]) -> Self {
        Form {
            fields: fields
                .iter()
                .map(|&(label, masked)| FormField {
                    label,
                    input: TextField {
                        masked,
                        ..TextField::default()
                    },
                })
                .collect(),
            focused: 0,
            error: None,
        }
    }

    pub fn login() -> Self {
        Self::new(&[("Username", false), ("Password", true)])
    }

    pub fn register() -> Self {
        Self::new(&[
            ("Username", false),
            ("Email", false),
            ("Password", true),
            ("Confirm password", true),
        ])
    }

    pub fn reset_password() -> Self {
        Self::new(&[("Email", false)])
    }

    pub fn record() -> Self {
        Self::new(&[
            ("Date (YYYY-MM-DD)", false),
            ("Time (HH:mm)", false),
            ("Weight (kg)", false),
            ("Height (cm)", false),
            ("Systolic (mmHg)", false),
            ("Diastolic (mmHg)", false),
            ("Heart rate (bpm)", false),
            ("Blood glucose (mmol/L)", false),
            ("Mood", false),
            ("Notes", false),
        ])
    }

    pub fn date_filter() -> Self {
        Self::new(&[("Start date", false), ("End date", false)])
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields
            .get(index)
            .map(|f| f.input.value.as_str())
            .unwrap_or("")
    }

    pub fn set(&mut self, index: usize, value: impl Into<String>) {
        if let Some(field) = self.fields.get_mut(index) {
            field.input.set(value);
        }
    }

    pub fn focused_input(&mut self) -> Option<&mut TextField> {
        self.fields.get_mut(self.focused).map(|f| &mut f.input)
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focused = self.focused.checked_sub(1).unwrap_or(self.fields.len() - 1);
        }
    }

    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.input.clear();
        }
        self.focused = 0;
        self.error = None;
    }
}

/// Field order of `Form::record`
pub mod record_field {
    pub const DATE: usize = 0;
    pub const TIME: usize = 1;
    pub const WEIGHT: usize = 2;
    pub const HEIGHT: usize = 3;
    pub const SYSTOLIC: usize = 4;
    pub const DIASTOLIC: usize = 5;
    pub const HEART_RATE: usize = 6;
    pub const BLOOD_GLUCOSE: usize = 7;
    pub const MOOD: usize = 8;
    pub const NOTES: usize = 9;
}

/// `loading → success | error` for a screen's remote data
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// Which trend the statistics screen charts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChartKind {
    #[default]
    Weight,
    BloodPressure,
    HeartRate,
}

impl ChartKind {
    pub fn next(&self) -> ChartKind {
        match self {
            ChartKind::Weight => ChartKind::BloodPressure,
            ChartKind::BloodPressure => ChartKind::HeartRate,
            ChartKind::HeartRate => ChartKind::Weight,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartKind::Weight => "Weight (kg)",
            ChartKind::BloodPressure => "Blood pressure (mmHg)",
            ChartKind::HeartRate => "Heart rate (bpm)",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

/// Dismissible one-line message shown in the status bar
#[derive(Clone, Debug, PartialEq)]
pub struct StatusMessage {
    pub kind: MessageKind,
    pub text: String,
}

/// Main application state - pure data, no I/O
pub struct AppState {
    pub screen: Screen,
    pub input_mode: InputMode,
    /// Decoded identity of the current session, `None` when logged out
    pub user: Option<Claims>,
    pub message: Option<StatusMessage>,
    pub show_help: bool,

    pub next_request_id: u64,
    /// Responses for any other id are stale and dropped
    pub pending_request_id: Option<u64>,
    /// Set while startup restore is running
    pub restoring: bool,

    // Auth forms
    pub login_form: Form,
    pub register_form: Form,
    pub reset_form: Form,

    // Records list
    pub records: Vec<HealthRecord>,
    pub records_state: LoadState,
    pub selected: usize,
    pub page: usize,
    pub records_filter: Option<DateRange>,
    pub records_filter_form: Form,
    pub confirm_delete: Option<i64>,

    // Detail and form
    pub detail: Option<HealthRecord>,
    pub detail_state: LoadState,
    pub record_form: Form,
    /// Id of the record being edited, `None` when creating
    pub editing_record: Option<i64>,
    /// Where the form returns on cancel or save
    pub form_origin: Screen,

    // Statistics
    pub statistics: Option<HealthStatistics>,
    pub statistics_state: LoadState,
    /// Starts at the last 30 days; `None` after clearing the filter
    pub statistics_range: Option<DateRange>,
    pub statistics_filter_form: Form,
    pub chart: ChartKind,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        let statistics_range = Self::default_statistics_range(Local::now().date_naive());
        let mut statistics_filter_form = Form::date_filter();
        statistics_filter_form.set(0, format_date(statistics_range.start));
        statistics_filter_form.set(1, format_date(statistics_range.end));

        AppState {
            screen: Screen::Login,
            input_mode: InputMode::Normal,
            user: None,
            message: None,
            show_help: false,
            next_request_id: 1,
            pending_request_id: None,
            restoring: false,
            login_form: Form::login(),
            register_form: Form::register(),
            reset_form: Form::reset_password(),
            records: Vec::new(),
            records_state: LoadState::Idle,
            selected: 0,
            page: 0,
            records_filter: None,
            records_filter_form: Form::date_filter(),
            confirm_delete: None,
            detail: None,
            detail_state: LoadState::Idle,
            record_form: Form::record(),
            editing_record: None,
            form_origin: Screen::Records,
            statistics: None,
            statistics_state: LoadState::Idle,
            statistics_range: Some(statistics_range),
            statistics_filter_form,
            chart: ChartKind::Weight,
        }
    }

    /// Generate a unique request ID and mark it as the one awaited
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        self.pending_request_id = Some(id);
        id
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.pending_request_id.is_some()
    }

    /// The form that receives keystrokes on the current screen, if any
    pub fn active_form(&self) -> Option<&Form> {
        match self.screen {
            Screen::Login => Some(&self.login_form),
            Screen::Register => Some(&self.register_form),
            Screen::ResetPassword => Some(&self.reset_form),
            Screen::RecordForm => Some(&self.record_form),
            Screen::Records if self.input_mode == InputMode::Editing => Some(&self.records_filter_form),
            Screen::Statistics if self.input_mode == InputMode::Editing => {
                Some(&self.statistics_filter_form)
            }
            _ => None,
        }
    }

    pub fn active_form_mut(&mut self) -> Option<&mut Form> {
        match self.screen {
            Screen::Login => Some(&mut self.login_form),
            Screen::Register => Some(&mut self.register_form),
            Screen::ResetPassword => Some(&mut self.reset_form),
            Screen::RecordForm => Some(&mut self.record_form),
            Screen::Records if self.input_mode == InputMode::Editing => {
                Some(&mut self.records_filter_form)
            }
            Screen::Statistics if self.input_mode == InputMode::Editing => {
                Some(&mut self.statistics_filter_form)
            }
            _ => None,
        }
    }

    // ========================
    // Pagination
    // ========================

    pub fn page_count(&self) -> usize {
        self.records.len().div_ceil(RECORDS_PAGE_SIZE).max(1)
    }

    /// Records shown on the current page
    pub fn page_records(&self) -> &[HealthRecord] {
        let start = (self.page * RECORDS_PAGE_SIZE).min(self.records.len());
        let end = (start + RECORDS_PAGE_SIZE).min(self.records.len());
        &self.records[start..end]
    }

    pub fn selected_record(&self) -> Option<&HealthRecord> {
        self.records.get(self.selected)
    }

    /// Default statistics window ending `today`
    pub fn default_statistics_range(today: NaiveDate) -> DateRange {
        DateRange::last_days(today, DEFAULT_STATS_WINDOW_DAYS)
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            kind: MessageKind::Info,
            text: text.into(),
        });
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            kind: MessageKind::Error,
            text: text.into(),
        });
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        RenderState {
            screen: self.screen,
            input_mode: self.input_mode,
            user: self.user.clone(),
            message: self.message.clone(),
            show_help: self.show_help,
            is_loading: self.is_loading(),
            restoring: self.restoring,
            form: self.active_form().cloned(),
            records: self.page_records().to_vec(),
            records_state: self.records_state.clone(),
            records_total: self.records.len(),
            selected_on_page: self.selected.saturating_sub(self.page * RECORDS_PAGE_SIZE),
            page: self.page,
            page_count: self.page_count(),
            records_filter: self.records_filter,
            confirm_delete: self.confirm_delete,
            detail: self.detail.clone(),
            detail_state: self.detail_state.clone(),
            editing_record: self.editing_record,
            statistics: self.statistics.clone(),
            statistics_state: self.statistics_state.clone(),
            statistics_range: self.statistics_range,
            chart: self.chart,
        }
    }
}

/// `YYYY-MM-DD`, as the date fields expect it
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
