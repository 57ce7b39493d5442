//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Application screens
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Screen {
    #[default]
    Login,
    Register,
    ResetPassword,
    Records,
    RecordDetail,
    RecordForm,
    Statistics,
    Profile,
}

impl Screen {
    /// Screens that need a session; the app redirects to Login otherwise
    pub fn is_protected(&self) -> bool {
        !matches!(self, Screen::Login | Screen::Register | Screen::ResetPassword)
    }

    /// Screens whose every key goes to a form
    pub fn is_form(&self) -> bool {
        matches!(
            self,
            Screen::Login | Screen::Register | Screen::ResetPassword | Screen::RecordForm
        )
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Login => "Login",
            Screen::Register => "Register",
            Screen::ResetPassword => "Reset password",
            Screen::Records => "Records",
            Screen::RecordDetail => "Record",
            Screen::RecordForm => "Edit record",
            Screen::Statistics => "Statistics",
            Screen::Profile => "Profile",
        }
    }
}

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Navigation
    SwitchScreen(Screen),
    Back,

    // Form editing
    NextField,
    PrevField,
    CharInput(char),
    Backspace,
    CursorLeft,
    CursorRight,
    Submit,

    // Records list
    SelectNext,
    SelectPrev,
    NextPage,
    PrevPage,
    OpenSelected,
    NewRecord,
    EditRecord,
    RequestDelete,
    ConfirmDelete,
    CancelDelete,

    // Filters and reloads
    OpenFilter,
    Reload,
    CycleChart,

    // Session
    Logout,

    // Popups
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// Input mode on list screens: Editing while the date filter has focus
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(
    key: KeyEvent,
    screen: Screen,
    input_mode: InputMode,
    show_help: bool,
    confirm_delete: bool,
) -> Option<UiEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return Some(UiEvent::Quit),
            KeyCode::Char('n') if screen == Screen::Login => {
                return Some(UiEvent::SwitchScreen(Screen::Register))
            }
            KeyCode::Char('r') if screen == Screen::Login => {
                return Some(UiEvent::SwitchScreen(Screen::ResetPassword))
            }
            _ => return None,
        }
    }

    if show_help {
        return Some(UiEvent::CloseHelp);
    }

    if confirm_delete {
        return match key.code {
            KeyCode::Char('y') | KeyCode::Enter => Some(UiEvent::ConfirmDelete),
            KeyCode::Char('n') | KeyCode::Esc => Some(UiEvent::CancelDelete),
            _ => None,
        };
    }

    if screen.is_form() || input_mode == InputMode::Editing {
        return form_keys(key);
    }

    match screen {
        Screen::Records => records_keys(key),
        Screen::RecordDetail => match key.code {
            KeyCode::Char('e') => Some(UiEvent::EditRecord),
            KeyCode::Char('d') => Some(UiEvent::RequestDelete),
            KeyCode::Esc | KeyCode::Backspace => Some(UiEvent::Back),
            _ => global_keys(key),
        },
        Screen::Statistics => match key.code {
            KeyCode::Char('c') | KeyCode::Tab => Some(UiEvent::CycleChart),
            KeyCode::Char('f') => Some(UiEvent::OpenFilter),
            KeyCode::Char('r') => Some(UiEvent::Reload),
            _ => global_keys(key),
        },
        Screen::Profile => global_keys(key),
        _ => None,
    }
}

fn form_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Esc => Some(UiEvent::Back),
        KeyCode::Enter => Some(UiEvent::Submit),
        KeyCode::Tab | KeyCode::Down => Some(UiEvent::NextField),
        KeyCode::BackTab | KeyCode::Up => Some(UiEvent::PrevField),
        KeyCode::Left => Some(UiEvent::CursorLeft),
        KeyCode::Right => Some(UiEvent::CursorRight),
        KeyCode::Backspace => Some(UiEvent::Backspace),
        KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
        _ => None,
    }
}

fn records_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::SelectNext),
        KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::SelectPrev),
        KeyCode::Right | KeyCode::PageDown => Some(UiEvent::NextPage),
        KeyCode::Left | KeyCode::PageUp => Some(UiEvent::PrevPage),
        KeyCode::Enter => Some(UiEvent::OpenSelected),
        KeyCode::Char('a') => Some(UiEvent::NewRecord),
        KeyCode::Char('e') => Some(UiEvent::EditRecord),
        KeyCode::Char('d') => Some(UiEvent::RequestDelete),
        KeyCode::Char('f') => Some(UiEvent::OpenFilter),
        KeyCode::Char('r') => Some(UiEvent::Reload),
        _ => global_keys(key),
    }
}

/// Keys shared by every non-form screen
fn global_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Char('1') => Some(UiEvent::SwitchScreen(Screen::Records)),
        KeyCode::Char('2') => Some(UiEvent::SwitchScreen(Screen::Statistics)),
        KeyCode::Char('3') => Some(UiEvent::SwitchScreen(Screen::Profile)),
        KeyCode::Char('l') => Some(UiEvent::Logout),
        KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
        KeyCode::Char('q') => Some(UiEvent::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn map(code: KeyCode, screen: Screen) -> Option<UiEvent> {
        key_to_ui_event(press(code), screen, InputMode::Normal, false, false)
    }

    #[test]
    fn test_form_screens_capture_characters() {
        assert_eq!(map(KeyCode::Char('q'), Screen::Login), Some(UiEvent::CharInput('q')));
        assert_eq!(map(KeyCode::Char('1'), Screen::RecordForm), Some(UiEvent::CharInput('1')));
        assert_eq!(map(KeyCode::Enter, Screen::Register), Some(UiEvent::Submit));
    }

    #[test]
    fn test_list_screen_shortcuts() {
        assert_eq!(map(KeyCode::Char('q'), Screen::Records), Some(UiEvent::Quit));
        assert_eq!(map(KeyCode::Char('a'), Screen::Records), Some(UiEvent::NewRecord));
        assert_eq!(
            map(KeyCode::Char('2'), Screen::Records),
            Some(UiEvent::SwitchScreen(Screen::Statistics))
        );
        assert_eq!(map(KeyCode::Tab, Screen::Statistics), Some(UiEvent::CycleChart));
    }

    #[test]
    fn test_filter_editing_routes_to_form() {
        let event = key_to_ui_event(press(KeyCode::Char('2')), Screen::Records, InputMode::Editing, false, false);
        assert_eq!(event, Some(UiEvent::CharInput('2')));
    }

    #[test]
    fn test_delete_confirmation_takes_priority() {
        let yes = key_to_ui_event(press(KeyCode::Char('y')), Screen::Records, InputMode::Normal, false, true);
        assert_eq!(yes, Some(UiEvent::ConfirmDelete));
        let other = key_to_ui_event(press(KeyCode::Char('a')), Screen::Records, InputMode::Normal, false, true);
        assert_eq!(other, None);
    }

    #[test]
    fn test_login_shortcuts_need_control() {
        let register = key_to_ui_event(
            KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL),
            Screen::Login,
            InputMode::Normal,
            false,
            false,
        );
        assert_eq!(register, Some(UiEvent::SwitchScreen(Screen::Register)));
    }
}
