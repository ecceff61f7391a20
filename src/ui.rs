//! Terminal UI module with ratatui
//!
//! Renders the engine's state as panes (console, streams, fields, logs, status line and
//! a detail popup). Nothing here talks to the backend.

pub mod renderer;
pub mod state;
pub mod terminal;
pub mod theme;

pub use renderer::UIRenderer;
pub use state::{DetailView, ViewState};
pub use terminal::TerminalUI;
pub use theme::ColorTheme;

#[cfg(test)]
pub use renderer::tests::MockUIRenderer;
