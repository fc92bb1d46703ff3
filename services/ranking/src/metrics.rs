//! Observability for the ranking service
//!
//! Counters for the ingestion flow (payloads, applied events, decode and
//! transport failures) and the query path (snapshots served, build
//! latency). Exported as a flat map for JSON exposition.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Core metrics for the ranking service.
pub struct ServiceMetrics {
    // Ingestion
    pub payloads_received: AtomicU64,
    pub events_applied: AtomicU64,
    pub quantity_applied: AtomicU64,
    pub decode_failures: AtomicU64,
    pub transport_errors: AtomicU64,

    // Queries
    pub snapshots_served: AtomicU64,
    pub snapshot_build_ns: Mutex<LatencyTracker>,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            payloads_received: AtomicU64::new(0),
            events_applied: AtomicU64::new(0),
            quantity_applied: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
            transport_errors: AtomicU64::new(0),
            snapshots_served: AtomicU64::new(0),
            snapshot_build_ns: Mutex::new(LatencyTracker::new(1000)),
        }
    }

    /// Record a raw payload pulled from the event source.
    pub fn record_payload(&self) {
        self.payloads_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an event applied to the store.
    pub fn record_applied(&self, quantity: u64) {
        self.events_applied.fetch_add(1, Ordering::Relaxed);
        // Wrapping add; informational only.
        self.quantity_applied.fetch_add(quantity, Ordering::Relaxed);
    }

    /// Record a payload rejected by the decoder.
    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed read from the event source.
    pub fn record_transport_error(&self) {
        self.transport_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a ranking snapshot served.
    pub fn record_snapshot(&self, build_ns: u64) {
        self.snapshots_served.fetch_add(1, Ordering::Relaxed);
        self.snapshot_build_ns
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(build_ns);
    }

    /// Export metrics as a BTreeMap for exposition.
    pub fn export(&self) -> BTreeMap<String, u64> {
        let mut m = BTreeMap::new();
        m.insert("payloads_received".to_string(), self.payloads_received.load(Ordering::Relaxed));
        m.insert("events_applied".to_string(), self.events_applied.load(Ordering::Relaxed));
        m.insert("quantity_applied".to_string(), self.quantity_applied.load(Ordering::Relaxed));
        m.insert("decode_failures".to_string(), self.decode_failures.load(Ordering::Relaxed));
        m.insert("transport_errors".to_string(), self.transport_errors.load(Ordering::Relaxed));
        m.insert("snapshots_served".to_string(), self.snapshots_served.load(Ordering::Relaxed));

        let tracker = self
            .snapshot_build_ns
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(p50) = tracker.percentile(50) {
            m.insert("snapshot_build_p50_ns".to_string(), p50);
        }
        if let Some(p99) = tracker.percentile(99) {
            m.insert("snapshot_build_p99_ns".to_string(), p99);
        }
        if let Some(avg) = tracker.average() {
            m.insert("snapshot_build_avg_ns".to_string(), avg);
        }
        drop(tracker);
        m
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Sliding window of latency samples for percentile calculation.
pub struct LatencyTracker {
    samples: VecDeque<u64>,
    max_samples: usize,
}

impl LatencyTracker {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_samples),
            max_samples,
        }
    }

    /// Record a latency sample, evicting the oldest when full.
    pub fn record(&mut self, value: u64) {
        if self.samples.len() >= self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Get a percentile value (0-100).
    pub fn percentile(&self, p: usize) -> Option<u64> {
        if self.samples.is_empty() {
            return None;
        }

        let mut sorted: Vec<u64> = self.samples.iter().copied().collect();
        sorted.sort_unstable();

        let idx = (p.min(100) as f64 / 100.0 * (sorted.len() - 1) as f64) as usize;
        Some(sorted[idx.min(sorted.len() - 1)])
    }

    pub fn average(&self) -> Option<u64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: u128 = self.samples.iter().map(|&v| v as u128).sum();
        Some((sum / self.samples.len() as u128) as u64)
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }
}
