use crate::backend::LogBackend;
use crate::error::{GraytailError, Result};
use crate::poll::state::{Engine, PollPhase, Status};
use crate::query::{compose, SearchRequest, Sort, TimeWindow, DEFAULT_LIMIT};
use crate::store::MessageRecord;
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Default period between poll ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default window searched before any message has been seen.
pub const DEFAULT_LOOKBACK: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    pub lookback: Duration,
    pub limit: u32,
    pub sort: Sort,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            lookback: DEFAULT_LOOKBACK,
            limit: DEFAULT_LIMIT,
            sort: Sort::default(),
        }
    }
}

/// What a single tick did.
#[derive(Debug)]
pub enum TickOutcome {
    /// Nothing to do (tail off, no stream, or shutting down)
    Idle,
    /// A search was already in flight; this tick was dropped
    Busy,
    /// Composition failed before reaching the network
    Rejected,
    /// A search was started; the handle resolves once its result has been applied
    Dispatched(JoinHandle<()>),
}

/// Drives searches against the backend and feeds results into the engine.
///
/// The scheduler is a cheap handle: the background loop runs on one clone while the
/// foreground keeps another to request one-shot searches and stream reloads.
#[derive(Clone)]
pub struct PollScheduler {
    backend: Arc<dyn LogBackend>,
    engine: Engine,
    settings: PollSettings,
    shutdown: CancellationToken,
}

impl PollScheduler {
    pub fn new(backend: Arc<dyn LogBackend>, engine: Engine, settings: PollSettings) -> Self {
        Self {
            backend,
            engine,
            settings,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Spawn the poll loop onto the current runtime.
    pub fn spawn(&self) -> JoinHandle<()> {
        tokio::spawn(self.clone().run())
    }

    /// Tick at the configured interval until shutdown.
    ///
    /// Ticks that would have fired while the loop was busy are skipped rather than
    /// replayed in a burst.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("poll loop started (interval {:?})", self.settings.interval);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.tick();
                }
            }
        }

        info!("poll loop stopped");
    }

    /// Run one scheduling step.
    ///
    /// When the engine is armed this composes a request, marks the search in flight
    /// and spawns it. It never waits on the network.
    pub fn tick(&self) -> TickOutcome {
        if self.shutdown.is_cancelled() {
            return TickOutcome::Idle;
        }

        let (request, epoch) = {
            let mut state = self.engine.lock();
            match state.poll.phase() {
                PollPhase::Idle => return TickOutcome::Idle,
                PollPhase::Polling => return TickOutcome::Busy,
                PollPhase::Armed => {}
            }

            let now = Utc::now();
            let lookback = chrono::Duration::from_std(self.settings.lookback)
                .unwrap_or_else(|_| chrono::Duration::minutes(5));
            let window = if state.poll.search_requested {
                TimeWindow::relative(now, lookback)
            } else {
                TimeWindow::tail(state.poll.last_timestamp, now, lookback)
            };

            match compose(
                &state.poll.query,
                state.poll.stream.as_ref(),
                window,
                self.settings.sort.clone(),
                self.settings.limit,
            ) {
                Ok(request) => {
                    state.poll.in_flight = true;
                    state.poll.search_requested = false;
                    (request, state.poll.epoch)
                }
                Err(err) => {
                    state.poll.search_requested = false;
                    state.status = Some(Status::from_error(&err));
                    return TickOutcome::Rejected;
                }
            }
        };

        debug!(
            "searching stream {} from {} to {}",
            request.stream_id, request.window.from, request.window.to
        );

        let backend = Arc::clone(&self.backend);
        let engine = self.engine.clone();
        let shutdown = self.shutdown.clone();
        TickOutcome::Dispatched(tokio::spawn(async move {
            let mut guard = InFlightGuard {
                engine: &engine,
                applied: false,
            };
            let outcome = backend.search(&request).await;
            apply_search_outcome(&engine, &shutdown, epoch, outcome);
            guard.applied = true;
        }))
    }

    /// Set `query` as the active query and search it as soon as no other search is in
    /// flight.
    ///
    /// Fails synchronously, without touching the network, when no stream is selected.
    pub fn submit_query(&self, query: &str) -> Result<TickOutcome> {
        {
            let mut state = self.engine.lock();
            if state.poll.stream.is_none() {
                let err = GraytailError::validation("First select stream");
                state.status = Some(Status::from_error(&err));
                return Err(err);
            }
            state.poll.query = query.trim().to_string();
            state.poll.search_requested = true;
        }
        Ok(self.tick())
    }

    /// Reload the stream list in the background.
    pub fn refresh_streams(&self) -> JoinHandle<()> {
        let backend = Arc::clone(&self.backend);
        let engine = self.engine.clone();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            let outcome = backend.list_streams().await;
            if shutdown.is_cancelled() {
                return;
            }
            match outcome {
                Ok(streams) => {
                    info!("loaded {} streams", streams.len());
                    let mut state = engine.lock();
                    state.status = Some(Status::info(format!("{} streams", streams.len())));
                    state.streams = streams;
                }
                Err(err) => {
                    warn!("listing streams failed: {err}");
                    engine.set_status(Status::from_error(&err));
                }
            }
        })
    }
}

/// Releases the in-flight mark when a search task unwinds or is aborted before its
/// result is applied, so the next tick can dispatch again.
struct InFlightGuard<'a> {
    engine: &'a Engine,
    applied: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.applied {
            warn!("search task ended without a result");
            self.engine.lock().poll.in_flight = false;
        }
    }
}

/// Fold a finished search back into the engine.
///
/// Results are applied all-or-nothing. Results of a search for a stream that has since
/// been deselected are still recorded but do not move the new stream's timestamp.
fn apply_search_outcome(
    engine: &Engine,
    shutdown: &CancellationToken,
    epoch: u64,
    outcome: Result<Vec<MessageRecord>>,
) {
    let mut state = engine.lock();
    state.poll.in_flight = false;

    if shutdown.is_cancelled() {
        debug!("discarding search result after shutdown");
        return;
    }

    match outcome {
        Ok(records) => {
            let newest = records.iter().filter_map(MessageRecord::timestamp).max();
            let added = state.store.record_all(records);
            if state.poll.epoch == epoch {
                state.poll.advance_timestamp(newest);
            }
            state.polls_completed += 1;
            if added > 0 {
                debug!("recorded {added} new messages");
            }
            state.status = Some(Status::info(format!("{added} new messages")));
        }
        Err(err) => {
            warn!("search failed: {err}");
            state.status = Some(Status::from_error(&err));
        }
    }
}
