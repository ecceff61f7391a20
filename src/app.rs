//! Application orchestration layer
//!
//! Wires terminal input, the poll scheduler and the renderer together. The poll loop
//! runs on its own task; this loop only translates keys into engine calls and redraws
//! from engine snapshots.

pub mod runtime;

use crate::error::Result;
use crate::input::{Focus, InputAction, InputStateMachine};
use crate::poll::{PollScheduler, Status, TickOutcome};
use crate::ui::{DetailView, UIRenderer, ViewState};
use log::{debug, warn};
use ratatui::crossterm::event::Event;
use runtime::spawn_input_thread;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);
const REDRAW_INTERVAL: Duration = Duration::from_millis(50);

pub struct Application {
    scheduler: PollScheduler,
    ui_renderer: Box<dyn UIRenderer>,
    input: InputStateMachine,
}

impl Application {
    pub fn new(scheduler: PollScheduler, ui_renderer: Box<dyn UIRenderer>) -> Self {
        Self {
            scheduler,
            ui_renderer,
            input: InputStateMachine::new(),
        }
    }

    pub fn scheduler(&self) -> &PollScheduler {
        &self.scheduler
    }

    /// Run until the user quits. The terminal is restored even when the loop fails.
    pub async fn run(&mut self) -> Result<()> {
        self.ui_renderer.initialize()?;

        let (width, height) = self.ui_renderer.get_terminal_size()?;
        let mut view_state = ViewState::new(width, height);

        let poll_handle = self.scheduler.spawn();
        self.scheduler.refresh_streams();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let input_shutdown = Arc::new(AtomicBool::new(false));
        let input_thread =
            spawn_input_thread(tx, Arc::clone(&input_shutdown), INPUT_POLL_INTERVAL);

        let result = self.event_loop(&mut rx, &mut view_state).await;

        input_shutdown.store(true, Ordering::SeqCst);
        self.scheduler.shutdown();
        if let Err(err) = poll_handle.await {
            warn!("poll loop ended abnormally: {err}");
        }
        if input_thread.join().is_err() {
            warn!("input thread panicked");
        }

        self.ui_renderer.cleanup()?;
        result
    }

    async fn event_loop(
        &mut self,
        rx: &mut UnboundedReceiver<Event>,
        view_state: &mut ViewState,
    ) -> Result<()> {
        let mut redraw = tokio::time::interval(REDRAW_INTERVAL);

        loop {
            tokio::select! {
                event = rx.recv() => {
                    let Some(event) = event else { break };
                    let action = self.input.handle_event(event);
                    if !self.execute_action(action, view_state) {
                        break;
                    }
                }
                _ = redraw.tick() => {}
            }
            self.refresh(view_state)?;
        }

        Ok(())
    }

    /// Pull a fresh snapshot from the engine and draw it.
    pub fn refresh(&mut self, view_state: &mut ViewState) -> Result<()> {
        view_state.apply_snapshot(self.scheduler.engine().snapshot());
        self.ui_renderer.render(view_state)
    }

    /// Apply one input action. Returns false when the application should quit.
    pub fn execute_action(&mut self, action: InputAction, view_state: &mut ViewState) -> bool {
        let engine = self.scheduler.engine().clone();

        match action {
            InputAction::Quit => return false,
            InputAction::NoAction => {}

            InputAction::FocusChanged(_) => {}
            InputAction::CursorUp(n) => view_state.move_cursor(-(n as isize)),
            InputAction::CursorDown(n) => view_state.move_cursor(n as isize),

            InputAction::SelectStream => {
                if let Some(stream) = view_state.selected_stream() {
                    engine.select_stream(stream);
                }
            }

            InputAction::OpenDetail => match view_state.selected_line().map(str::to_owned) {
                Some(line) => {
                    let record = engine.lookup_line(&line);
                    let detail = DetailView::from_record(&line, record.as_ref());
                    view_state.open_detail(detail);
                }
                None => self.input.set_focus(Focus::Logs),
            },

            InputAction::ApplyDetailFilter => {
                let term = view_state
                    .detail
                    .as_ref()
                    .and_then(DetailView::selected_filter);
                view_state.close_detail();
                if let Some(term) = term {
                    let query = engine.append_filter(&term);
                    self.input.set_console(query.clone());
                    view_state.console = query.clone();
                    self.submit_query(&query, view_state);
                }
            }

            InputAction::CloseDetail => view_state.close_detail(),

            InputAction::UpdateConsole(text) => view_state.console = text,
            InputAction::SubmitQuery(query) => self.submit_query(&query, view_state),

            InputAction::ToggleTail => {
                let enabled = engine.toggle_tail();
                engine.set_status(Status::info(if enabled { "Tail on" } else { "Tail off" }));
            }

            InputAction::ClearLogs => {
                engine.clear_messages();
                view_state.follow_logs = true;
            }

            InputAction::ReloadStreams => {
                self.scheduler.refresh_streams();
            }

            InputAction::Resize { width, height } => {
                view_state.update_terminal_size(width, height);
            }
        }

        view_state.focus = self.input.focus();
        true
    }

    /// Replace the visible messages with the results of `query`.
    fn submit_query(&self, query: &str, view_state: &mut ViewState) {
        let engine = self.scheduler.engine();
        if engine.lock().poll.stream.is_some() {
            engine.clear_messages();
            view_state.follow_logs = true;
        }

        match self.scheduler.submit_query(query) {
            Ok(TickOutcome::Busy) => debug!("search queued behind the running poll"),
            Ok(_) => {}
            Err(err) => debug!("query not submitted: {err}"),
        }
    }
}
