//! Backend client abstraction.
//!
//! The engine talks to the log server through the [`LogBackend`] trait so the poll
//! scheduler can be driven by the real HTTP client or by a scripted fake in tests.

pub mod http;
pub mod model;

pub use http::HttpBackend;
pub use model::{parse_messages, parse_streams, Stream};

use crate::error::Result;
use crate::query::SearchRequest;
use crate::store::MessageRecord;
use async_trait::async_trait;

/// Read-only access to a log-aggregation server.
///
/// Implementations perform exactly one request per call and never retry; retry policy
/// belongs to the poll scheduler.
#[async_trait]
pub trait LogBackend: Send + Sync {
    /// List the streams visible to the configured user, in server order.
    async fn list_streams(&self) -> Result<Vec<Stream>>;

    /// Run one absolute-window search.
    ///
    /// Either every returned message is decoded or the call fails; results are never
    /// partial.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<MessageRecord>>;
}
