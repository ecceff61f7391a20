//! # graytail - Terminal Tail Client for Graylog
//!
//! Polls a Graylog-style log server for new messages in one stream and shows them in a
//! terminal, the way `tail -f` follows a file.
//!
//! ## Features
//!
//! - **Incremental tailing**: each poll searches only past the newest timestamp seen
//! - **Deduplication**: messages are keyed by a fingerprint of their display line
//! - **Bounded memory**: at most a fixed number of messages are retained
//! - **Drill-down filters**: any field of a message can be ANDed onto the query
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`backend`] - Log server client behind the [`LogBackend`] trait
//! - [`query`] - Search request composition
//! - [`store`] - Deduplicating bounded message store
//! - [`poll`] - Shared engine state and the poll scheduler
//! - [`input`] / [`ui`] - Terminal front-end
//! - [`app`] - Component coordination
//! - [`config`] - File and command-line settings

// Core modules
pub mod error;
pub mod query;
pub mod store;

// Engine
pub mod backend;
pub mod poll;

// Front-end
pub mod app;
pub mod config;
pub mod input;
pub mod ui;

pub use error::{GraytailError, Result};

pub use app::Application;
pub use backend::{HttpBackend, LogBackend, Stream};
pub use config::Config;
pub use poll::{Engine, EngineSnapshot, PollScheduler, PollSettings};
pub use query::{SearchRequest, TimeWindow};
pub use store::{Fingerprint, MessageRecord, MessageStore};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
