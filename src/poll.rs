//! Background polling engine.
//!
//! A fixed-interval loop that keeps at most one search in flight, tails the selected
//! stream by advancing the window's lower bound, and records results into the shared
//! message store.

pub mod scheduler;
pub mod state;

pub use scheduler::{
    PollScheduler, PollSettings, TickOutcome, DEFAULT_LOOKBACK, DEFAULT_POLL_INTERVAL,
};
pub use state::{Engine, EngineSnapshot, EngineState, PollPhase, PollState, Status};
