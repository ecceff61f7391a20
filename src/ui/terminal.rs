//! Terminal UI implementation using ratatui
//!
//! Concrete [`UIRenderer`] drawing the multi-pane layout:
//!
//! ```text
//! +- query ------------------------------------------+
//! +- streams ----+- logs ----------------------------+
//! |              |                                    |
//! +- fields -----+                                    |
//! |              |                                    |
//! +--------------+------------------------------------+
//!  [stream: x] [tail: on] [armed] status
//! ```

use crate::error::{GraytailError, Result, StatusKind};
use crate::input::Focus;
use crate::ui::{ColorTheme, DetailView, UIRenderer, ViewState};
use ratatui::crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io::{self, Stdout};

type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

const SIDEBAR_WIDTH: u16 = 30;

pub struct TerminalUI {
    terminal: Option<CrosstermTerminal>,
    theme: ColorTheme,
}

impl TerminalUI {
    pub fn new() -> Result<Self> {
        Ok(Self {
            terminal: None,
            theme: ColorTheme::default(),
        })
    }

    pub fn with_theme(theme: ColorTheme) -> Result<Self> {
        Ok(Self {
            terminal: None,
            theme,
        })
    }
}

/// Draw one frame. Kept free of terminal state so it can be exercised on a test backend.
pub fn draw(frame: &mut Frame, view_state: &ViewState, theme: &ColorTheme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(rows[1]);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[0]);

    render_console(frame, rows[0], view_state, theme);
    render_streams(frame, sidebar[0], view_state, theme);
    render_fields(frame, sidebar[1], view_state, theme);
    render_logs(frame, columns[1], view_state, theme);
    render_status(frame, rows[2], view_state, theme);

    if let Some(detail) = &view_state.detail {
        render_detail(frame, columns[1], detail, theme);
    }
}

fn pane<'a>(title: &'a str, focused: bool, theme: &ColorTheme) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if focused {
            theme.focused_border
        } else {
            theme.border
        })
}

fn render_console(frame: &mut Frame, area: Rect, view_state: &ViewState, theme: &ColorTheme) {
    let focused = view_state.focus == Focus::Console;
    let console = Paragraph::new(view_state.console.as_str())
        .block(pane("query", focused, theme));
    frame.render_widget(console, area);
}

fn render_streams(frame: &mut Frame, area: Rect, view_state: &ViewState, theme: &ColorTheme) {
    let active = view_state.snapshot.stream.as_ref().map(|s| s.id.as_str());
    let items: Vec<ListItem> = view_state
        .snapshot
        .streams
        .iter()
        .map(|stream| {
            let item = ListItem::new(stream.name.as_str());
            if Some(stream.id.as_str()) == active {
                item.style(theme.active_stream)
            } else {
                item
            }
        })
        .collect();

    let focused = view_state.focus == Focus::Streams;
    render_list(
        frame,
        area,
        items,
        pane("streams", focused, theme),
        focused.then_some(view_state.stream_cursor),
        theme,
    );
}

fn render_fields(frame: &mut Frame, area: Rect, view_state: &ViewState, theme: &ColorTheme) {
    let items: Vec<ListItem> = view_state
        .snapshot
        .fields
        .iter()
        .map(|field| ListItem::new(field.as_str()))
        .collect();
    render_list(frame, area, items, pane("fields", false, theme), None, theme);
}

fn render_logs(frame: &mut Frame, area: Rect, view_state: &ViewState, theme: &ColorTheme) {
    let items: Vec<ListItem> = view_state
        .snapshot
        .lines
        .iter()
        .map(|line| ListItem::new(line.as_str()))
        .collect();

    // Without a cursor the list would always show its head; select the newest line so
    // the pane scrolls with the tail.
    let selected = if view_state.snapshot.lines.is_empty() {
        None
    } else {
        Some(view_state.log_cursor)
    };
    let focused = matches!(view_state.focus, Focus::Logs | Focus::Detail);
    let block = pane("logs", focused, theme);
    let list = List::new(items).block(block).highlight_style(if focused {
        theme.selection
    } else {
        Style::default()
    });

    let mut state = ListState::default();
    state.select(selected);
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_list(
    frame: &mut Frame,
    area: Rect,
    items: Vec<ListItem>,
    block: Block,
    selected: Option<usize>,
    theme: &ColorTheme,
) {
    let list = List::new(items).block(block).highlight_style(theme.selection);
    let mut state = ListState::default();
    state.select(selected);
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_status(frame: &mut Frame, area: Rect, view_state: &ViewState, theme: &ColorTheme) {
    let fg = match view_state.status_kind() {
        StatusKind::Info => theme.status_fg,
        StatusKind::Transient => theme.warning_text,
        StatusKind::Prominent => theme.error_text,
    };
    let status = Paragraph::new(view_state.status_text())
        .style(Style::default().bg(theme.status_bg).fg(fg));
    frame.render_widget(status, area);
}

fn render_detail(frame: &mut Frame, area: Rect, detail: &DetailView, theme: &ColorTheme) {
    let popup = popup_area(area);
    let items: Vec<ListItem> = detail.lines().into_iter().map(ListItem::new).collect();
    let block = Block::default()
        .title(detail.title.as_str())
        .borders(Borders::ALL)
        .border_style(theme.focused_border);

    frame.render_widget(Clear, popup);
    render_list(frame, popup, items, block, Some(detail.cursor), theme);
}

fn popup_area(area: Rect) -> Rect {
    let margin_x = area.width / 10;
    let margin_y = area.height / 10;
    Rect::new(
        area.x + margin_x,
        area.y + margin_y,
        area.width.saturating_sub(margin_x * 2),
        area.height.saturating_sub(margin_y * 2),
    )
}

impl UIRenderer for TerminalUI {
    fn render(&mut self, view_state: &ViewState) -> Result<()> {
        if let Some(ref mut terminal) = self.terminal {
            let theme = &self.theme;
            terminal.draw(move |frame| draw(frame, view_state, theme))?;
        }
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        enable_raw_mode().map_err(terminal_error("cannot enable raw mode"))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(terminal_error("cannot enter alternate screen"))?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).map_err(terminal_error("cannot open terminal"))?;
        self.terminal = Some(terminal);

        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.terminal.take().is_some() {
            disable_raw_mode().map_err(terminal_error("cannot disable raw mode"))?;
            execute!(io::stdout(), LeaveAlternateScreen)
                .map_err(terminal_error("cannot leave alternate screen"))?;
        }
        Ok(())
    }

    fn get_terminal_size(&self) -> Result<(u16, u16)> {
        ratatui::crossterm::terminal::size().map_err(terminal_error("cannot read terminal size"))
    }
}

fn terminal_error(context: &'static str) -> impl FnOnce(io::Error) -> GraytailError {
    move |err| GraytailError::ui(format!("{context}: {err}"))
}

impl Drop for TerminalUI {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Stream;
    use crate::poll::{EngineSnapshot, PollPhase, Status};
    use ratatui::backend::TestBackend;

    fn render_to_text(view_state: &ViewState) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = ColorTheme::default();
        terminal
            .draw(|frame| draw(frame, view_state, &theme))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn populated_view() -> ViewState {
        let mut view = ViewState::new(100, 30);
        view.console = "level:3".to_string();
        view.apply_snapshot(EngineSnapshot {
            streams: vec![Stream {
                id: "s1".into(),
                name: "nginx-access".into(),
            }],
            stream: Some(Stream {
                id: "s1".into(),
                name: "nginx-access".into(),
            }),
            tail_enabled: true,
            phase: PollPhase::Polling,
            status: Some(Status::info("2 new messages")),
            fields: vec!["timestamp".into(), "http_status".into()],
            lines: vec!["2024-01-01T00:00:00.000Z web-1 GET /".into()],
            ..EngineSnapshot::default()
        });
        view
    }

    #[test]
    fn test_terminal_ui_creation() {
        let ui = TerminalUI::new().unwrap();
        assert!(ui.terminal.is_none());

        let ui = TerminalUI::with_theme(ColorTheme::monochrome()).unwrap();
        assert_eq!(ui.theme.status_bg, ratatui::style::Color::Black);
    }

    #[test]
    fn draws_every_pane() {
        let text = render_to_text(&populated_view());

        assert!(text.contains("level:3"));
        assert!(text.contains("nginx-access"));
        assert!(text.contains("http_status"));
        assert!(text.contains("GET /"));
        assert!(text.contains("[stream: nginx-access] [tail: on] [polling] 2 new messages"));
    }

    #[test]
    fn draws_detail_popup() {
        let mut view = populated_view();
        view.open_detail(DetailView {
            title: "Message details".into(),
            entries: vec![("http_status".into(), "502".into())],
            cursor: 0,
        });

        let text = render_to_text(&view);
        assert!(text.contains("Message details"));
        assert!(text.contains("http_status:\"502\""));
    }

    #[test]
    fn terminal_failures_are_ui_errors() {
        let err = terminal_error("cannot enable raw mode")(io::Error::other("not a tty"));
        assert!(matches!(err, GraytailError::UIError { .. }), "{err:?}");
        assert_eq!(
            err.to_string(),
            "UI operation failed: cannot enable raw mode: not a tty"
        );
    }

    #[test]
    fn popup_fits_inside_area() {
        let area = Rect::new(30, 3, 70, 26);
        let popup = popup_area(area);
        assert!(popup.x >= area.x && popup.y >= area.y);
        assert!(popup.right() <= area.right() && popup.bottom() <= area.bottom());
    }
}
