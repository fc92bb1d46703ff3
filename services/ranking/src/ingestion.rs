//! Event ingestion layer for the ranking service
//!
//! Turns an [`EventSource`] into a lazy stream of decoded [`OrderEvent`]s
//! and applies that stream to the [`RankingStore`].
//!
//! ```text
//! EventSource ──payload──► decode ──OrderEvent──► RankingStore::increment_by
//!      │                     │
//!      │ TransportError      │ DecodeError
//!      ▼                     ▼
//!  metrics + backoff     metrics + skip
//! ```
//!
//! Decoding runs outside the store lock. A rejected payload never touches
//! the store; a failed read waits out the backoff delay and tries again.

use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backoff::Backoff;
use crate::events::{decode, OrderEvent};
use crate::metrics::ServiceMetrics;
use crate::source::EventSource;
use crate::store::RankingStore;

struct PullState<S> {
    source: S,
    backoff: Backoff,
    metrics: Arc<ServiceMetrics>,
}

/// Decoded events pulled from `source`.
///
/// The stream ends only when the source reports it is closed. It cannot be
/// restarted; build a new one from a new source.
pub fn order_events<S>(
    source: S,
    backoff: Backoff,
    metrics: Arc<ServiceMetrics>,
) -> impl Stream<Item = OrderEvent> + Send
where
    S: EventSource,
{
    let state = PullState {
        source,
        backoff,
        metrics,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            match state.source.next_payload().await {
                Ok(Some(payload)) => {
                    state.backoff.reset();
                    state.metrics.record_payload();
                    debug!(source = state.source.name(), %payload, "Order event received");

                    match decode(&payload) {
                        Ok(event) => return Some((event, state)),
                        Err(err) => {
                            state.metrics.record_decode_failure();
                            warn!(
                                source = state.source.name(),
                                reason = err.reason(),
                                error = %err,
                                %payload,
                                "Dropping malformed order event"
                            );
                        }
                    }
                }
                Ok(None) => {
                    info!(source = state.source.name(), "Event source closed");
                    return None;
                }
                Err(err) => {
                    state.metrics.record_transport_error();
                    let delay = state.backoff.next_delay();
                    warn!(
                        source = state.source.name(),
                        error = %err,
                        attempt = state.backoff.consecutive_failures(),
                        delay_ms = delay.as_millis() as u64,
                        "Event source read failed; backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    })
}

/// Apply every event of `events` to `store`. Returns the number applied
/// once the stream ends.
pub async fn run_ingestion<E>(
    events: E,
    store: Arc<RankingStore>,
    metrics: Arc<ServiceMetrics>,
) -> u64
where
    E: Stream<Item = OrderEvent>,
{
    let mut events = std::pin::pin!(events);
    let mut applied = 0u64;

    while let Some(event) = events.next().await {
        store.apply(&event);
        metrics.record_applied(event.quantity);
        applied += 1;
        debug!(
            product_id = %event.product_id,
            quantity = event.quantity,
            "Order event applied"
        );
    }

    info!(applied, "Ingestion finished");
    applied
}

/// Spawn the ingestion loop for `source` onto the runtime.
pub fn spawn_ingestion<S>(
    source: S,
    backoff: Backoff,
    store: Arc<RankingStore>,
    metrics: Arc<ServiceMetrics>,
) -> JoinHandle<u64>
where
    S: EventSource + 'static,
{
    info!(source = source.name(), "Starting order event ingestion");
    let events = order_events(source, backoff, Arc::clone(&metrics));
    tokio::spawn(run_ingestion(events, store, metrics))
}
