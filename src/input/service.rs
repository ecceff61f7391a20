//! Focus-aware input state machine.
//!
//! Consumes crossterm events and yields domain-level [`InputAction`]s for the
//! application loop. The machine tracks which pane has focus and owns the console
//! edit buffer, so the same key can mean "type a character" in the console and
//! "move the cursor" elsewhere.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Lines moved by PageUp/PageDown.
pub const PAGE_SIZE: usize = 20;

/// The pane receiving keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Console,
    Streams,
    Logs,
    Detail,
}

impl Focus {
    /// Tab order; the detail popup is modal and not part of it.
    pub fn next(self) -> Self {
        match self {
            Focus::Console => Focus::Streams,
            Focus::Streams => Focus::Logs,
            Focus::Logs | Focus::Detail => Focus::Console,
        }
    }
}

/// High-level actions emitted by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    FocusChanged(Focus),
    CursorUp(usize),
    CursorDown(usize),
    /// Enter on the streams pane
    SelectStream,
    /// Enter on the logs pane
    OpenDetail,
    /// Enter on a detail line: AND it onto the query and search again
    ApplyDetailFilter,
    CloseDetail,
    UpdateConsole(String),
    SubmitQuery(String),
    ToggleTail,
    ClearLogs,
    ReloadStreams,
    Resize { width: u16, height: u16 },
    Quit,
    NoAction,
}

pub struct InputStateMachine {
    focus: Focus,
    console: String,
}

impl Default for InputStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl InputStateMachine {
    pub fn new() -> Self {
        Self {
            focus: Focus::Console,
            console: String::new(),
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn console(&self) -> &str {
        &self.console
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
    }

    /// Replace the console buffer, e.g. after a filter was appended to the query.
    pub fn set_console(&mut self, text: impl Into<String>) {
        self.console = text.into();
    }

    pub fn handle_event(&mut self, event: Event) -> InputAction {
        match event {
            Event::Key(key) => self.handle_key_event(key),
            Event::Resize(width, height) => InputAction::Resize { width, height },
            _ => InputAction::NoAction,
        }
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> InputAction {
        if key_event.kind != KeyEventKind::Press {
            return InputAction::NoAction;
        }

        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
        let plain = !key_event
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

        match (self.focus, key_event.code) {
            (_, KeyCode::Char('c')) if ctrl => InputAction::Quit,
            (_, KeyCode::Char('t')) if ctrl => InputAction::ToggleTail,
            (_, KeyCode::Char('l')) if ctrl => InputAction::ClearLogs,
            (_, KeyCode::Char('r')) if ctrl => InputAction::ReloadStreams,

            (Focus::Detail, KeyCode::Esc) => {
                self.focus = Focus::Logs;
                InputAction::CloseDetail
            }
            (Focus::Detail, KeyCode::Enter) => {
                self.focus = Focus::Logs;
                InputAction::ApplyDetailFilter
            }
            (Focus::Detail, KeyCode::Tab) => InputAction::NoAction,

            (focus, KeyCode::Tab) => {
                self.focus = focus.next();
                InputAction::FocusChanged(self.focus)
            }

            (Focus::Console, KeyCode::Enter) => InputAction::SubmitQuery(self.console.clone()),
            (Focus::Console, KeyCode::Backspace) => {
                self.console.pop();
                InputAction::UpdateConsole(self.console.clone())
            }
            (Focus::Console, KeyCode::Char(ch)) if plain => {
                self.console.push(ch);
                InputAction::UpdateConsole(self.console.clone())
            }
            (Focus::Console, _) => InputAction::NoAction,

            (_, KeyCode::Up) => InputAction::CursorUp(1),
            (_, KeyCode::Char('k')) if plain => InputAction::CursorUp(1),
            (_, KeyCode::Down) => InputAction::CursorDown(1),
            (_, KeyCode::Char('j')) if plain => InputAction::CursorDown(1),
            (_, KeyCode::PageUp) => InputAction::CursorUp(PAGE_SIZE),
            (_, KeyCode::PageDown) => InputAction::CursorDown(PAGE_SIZE),

            (Focus::Streams, KeyCode::Enter) => InputAction::SelectStream,
            (Focus::Logs, KeyCode::Enter) => {
                self.focus = Focus::Detail;
                InputAction::OpenDetail
            }
            (Focus::Streams | Focus::Logs, KeyCode::Char('q')) if plain => InputAction::Quit,

            _ => InputAction::NoAction,
        }
    }
}
