//! Product Ranking Service
//!
//! Consumes order events and keeps a running popularity ranking of
//! products:
//! - Payload decoding (`Order (<id>) ... quantity (<n>)`)
//! - Concurrent ranking store (increment / ranked snapshot)
//! - Event sources: channel, line reader, Kafka (feature `kafka`)
//! - Ingestion stream with bounded backoff on transport failures
//! - HTTP query API (`/rankings`, `/health`, `/metrics`)
//!
//! # Architecture
//!
//! ```text
//!   EventSource
//!        │ payloads
//!    ┌───▼────┐
//!    │ Decode │  ← rejects malformed payloads
//!    └───┬────┘
//!        │ OrderEvent
//!  ┌─────▼────────┐
//!  │ RankingStore │  ← Mutex<HashMap<ProductId, OrderCount>>
//!  └─────┬────────┘
//!        │ snapshot_ranked
//!  ┌─────▼────────┐
//!  │ GET /rankings│
//!  └──────────────┘
//! ```

pub mod backoff;
pub mod config;
pub mod error;
pub mod events;
pub mod handlers;
pub mod ingestion;
pub mod metrics;
pub mod router;
pub mod source;
pub mod state;
pub mod store;

pub use crate::events::{decode, DecodeError, OrderEvent};
pub use crate::state::AppState;
pub use crate::store::{RankedItem, RankingStore};

pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_version_tracks_package() {
        assert_eq!(SERVICE_VERSION, env!("CARGO_PKG_VERSION"));
        assert!(!SERVICE_VERSION.is_empty());
    }
}
