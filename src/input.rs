//! Input subsystem.
//!
//! Terminal events are collected on a blocking thread (see [`crate::app::runtime`]) and
//! translated into [`InputAction`]s here.

pub mod service;

pub use service::{Focus, InputAction, InputStateMachine, PAGE_SIZE};
