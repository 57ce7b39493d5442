//! Render state - data structure sent from App layer to UI for rendering

use crate::app::state::{ChartKind, Form, LoadState, StatusMessage};
use crate::messages::ui_events::{InputMode, Screen};
use crate::models::{DateRange, HealthRecord, HealthStatistics};
use crate::session::Claims;

/// Complete state needed by the UI to render
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    pub screen: Screen,
    pub input_mode: InputMode,
    pub user: Option<Claims>,
    pub message: Option<StatusMessage>,
    pub show_help: bool,
    pub is_loading: bool,
    pub restoring: bool,

    /// The form receiving keystrokes, if the screen has one
    pub form: Option<Form>,

    // Records list (current page only)
    pub records: Vec<HealthRecord>,
    pub records_state: LoadState,
    pub records_total: usize,
    pub selected_on_page: usize,
    pub page: usize,
    pub page_count: usize,
    pub records_filter: Option<DateRange>,
    pub confirm_delete: Option<i64>,

    // Detail
    pub detail: Option<HealthRecord>,
    pub detail_state: LoadState,
    pub editing_record: Option<i64>,

    // Statistics
    pub statistics: Option<HealthStatistics>,
    pub statistics_state: LoadState,
    pub statistics_range: Option<DateRange>,
    pub chart: ChartKind,
}
