//! Event sources
//!
//! An [`EventSource`] hands out raw order payloads one at a time. It knows
//! nothing about decoding or the store; the ingestion layer turns a source
//! into a stream of decoded events.
//!
//! - [`ChannelSource`]: in-process mpsc channel
//! - [`LineSource`]: one payload per line of any async reader (stdin)
//! - `KafkaSource`: topic consumer, behind the `kafka` feature

mod channel;
#[cfg(feature = "kafka")]
mod kafka;
mod lines;

use async_trait::async_trait;

pub use channel::ChannelSource;
#[cfg(feature = "kafka")]
pub use kafka::KafkaSource;
pub use lines::LineSource;

/// Failures reading from the underlying transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("transport connect failed: {0}")]
    Connect(String),

    #[error("transport read failed: {0}")]
    Read(String),
}

/// A transport delivering raw payloads.
///
/// Delivery is at-least-once with no ordering guarantee across partitions.
#[async_trait]
pub trait EventSource: Send {
    /// Label used in logs.
    fn name(&self) -> &str;

    /// Next payload. `Ok(None)` means the source is closed for good; a
    /// `TransportError` is transient and the caller may retry.
    async fn next_payload(&mut self) -> Result<Option<String>, TransportError>;
}
