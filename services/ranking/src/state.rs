use std::sync::Arc;

use crate::metrics::ServiceMetrics;
use crate::store::RankingStore;

/// Application context shared by the ingestion task and the HTTP handlers.
#[derive(Clone, Default)]
pub struct AppState {
    pub store: Arc<RankingStore>,
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
