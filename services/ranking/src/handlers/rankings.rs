use std::time::Instant;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;
use crate::store::RankedItem;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankingQuery {
    /// Return at most this many entries.
    pub limit: Option<usize>,
}

/// `GET /rankings`: every product by descending order count.
///
/// The array order is the ranking; clients must not re-sort it.
pub async fn get_rankings(
    State(state): State<AppState>,
    query: Result<Query<RankingQuery>, QueryRejection>,
) -> Result<Json<Vec<RankedItem>>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let started = Instant::now();
    let ranking = query
        .limit
        .map_or_else(|| state.store.snapshot_ranked(), |n| state.store.top(n));
    state
        .metrics
        .record_snapshot(started.elapsed().as_nanos() as u64);

    debug!(entries = ranking.len(), limit = ?query.limit, "Serving ranking");
    Ok(Json(ranking))
}
