//! Ranking store
//!
//! Process-lifetime aggregate of ordered quantity per product. One mutex
//! guards the whole map: increments are a read-modify-write under the lock,
//! snapshots copy every entry under the lock and sort the copy afterwards.
//!
//! Counts only grow. A product appears once it has been incremented and is
//! never removed.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::events::{OrderEvent, ProductId, Quantity};

/// Cumulative ordered quantity for one product.
pub type OrderCount = u64;

/// One entry of a ranking snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedItem {
    pub product_id: ProductId,
    pub orders: OrderCount,
}

impl RankedItem {
    pub fn new(product_id: impl Into<ProductId>, orders: OrderCount) -> Self {
        Self {
            product_id: product_id.into(),
            orders,
        }
    }
}

/// Concurrent product → order count aggregate.
///
/// Shared by handle (`Arc<RankingStore>`) between the ingestion task and
/// the query handlers. Counts saturate at [`OrderCount::MAX`].
#[derive(Debug, Default)]
pub struct RankingStore {
    counts: Mutex<HashMap<ProductId, OrderCount>>,
}

impl RankingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` to the running total for `product_id`, creating the
    /// entry if needed.
    pub fn increment_by(&self, product_id: &str, quantity: Quantity) {
        let saturated = {
            let mut counts = self.lock();
            match counts.get_mut(product_id) {
                Some(total) => match total.checked_add(quantity) {
                    Some(next) => {
                        *total = next;
                        false
                    }
                    None => {
                        *total = OrderCount::MAX;
                        true
                    }
                },
                None => {
                    counts.insert(product_id.to_owned(), quantity);
                    false
                }
            }
        };

        if saturated {
            warn!(product_id, quantity, "Order count saturated at u64::MAX");
        }
    }

    /// Apply a decoded event.
    pub fn apply(&self, event: &OrderEvent) {
        self.increment_by(&event.product_id, event.quantity);
    }

    /// Every product ordered by descending count.
    ///
    /// Products with equal counts come out in no particular order.
    pub fn snapshot_ranked(&self) -> Vec<RankedItem> {
        let counts = self.lock();
        let mut items: Vec<RankedItem> = counts
            .iter()
            .map(|(id, orders)| RankedItem::new(id.clone(), *orders))
            .collect();
        items.sort_unstable_by(|a, b| b.orders.cmp(&a.orders));
        drop(counts);
        items
    }

    /// The first `n` entries of [`snapshot_ranked`](Self::snapshot_ranked).
    pub fn top(&self, n: usize) -> Vec<RankedItem> {
        let mut items = self.snapshot_ranked();
        items.truncate(n);
        items
    }

    /// Current count for a single product.
    pub fn count_of(&self, product_id: &str) -> Option<OrderCount> {
        self.lock().get(product_id).copied()
    }

    /// Number of distinct products seen.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the guard cannot leave a half-applied entry,
    // so a poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<ProductId, OrderCount>> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn assert_descending(items: &[RankedItem]) {
        for pair in items.windows(2) {
            assert!(
                pair[0].orders >= pair[1].orders,
                "not descending: {:?} before {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_empty_store_snapshot() {
        let store = RankingStore::new();
        assert!(store.snapshot_ranked().is_empty());
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_increment_creates_and_accumulates() {
        let store = RankingStore::new();
        store.increment_by("A", 5);
        assert_eq!(store.count_of("A"), Some(5));

        store.increment_by("A", 3);
        assert_eq!(store.count_of("A"), Some(8));
        assert_eq!(store.count_of("B"), None);
    }

    #[test]
    fn test_zero_quantity_creates_entry() {
        let store = RankingStore::new();
        store.increment_by("A", 0);
        assert_eq!(store.count_of("A"), Some(0));
        assert_eq!(store.snapshot_ranked(), vec![RankedItem::new("A", 0)]);
    }

    #[test]
    fn test_ranking_scenario() {
        let store = RankingStore::new();
        store.apply(&OrderEvent::new("A", 5));
        store.apply(&OrderEvent::new("B", 10));
        store.apply(&OrderEvent::new("A", 3));

        assert_eq!(
            store.snapshot_ranked(),
            vec![RankedItem::new("B", 10), RankedItem::new("A", 8)]
        );
    }

    #[test]
    fn test_ties_permissible_in_any_order() {
        let store = RankingStore::new();
        store.increment_by("A", 4);
        store.increment_by("B", 4);
        store.increment_by("C", 9);

        let ranked = store.snapshot_ranked();
        assert_eq!(ranked[0], RankedItem::new("C", 9));

        // Tie order is unspecified; compare the tail as a set.
        let mut tail: Vec<_> = ranked[1..].iter().map(|i| i.product_id.as_str()).collect();
        tail.sort_unstable();
        assert_eq!(tail, vec!["A", "B"]);
        assert!(ranked[1..].iter().all(|i| i.orders == 4));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = RankingStore::new();
        store.increment_by("A", 1);
        let before = store.snapshot_ranked();

        store.increment_by("A", 100);
        store.increment_by("B", 1);

        assert_eq!(before, vec![RankedItem::new("A", 1)]);
        assert_eq!(store.count_of("A"), Some(101));
    }

    #[test]
    fn test_top_truncates() {
        let store = RankingStore::new();
        for (i, id) in ["A", "B", "C", "D"].iter().enumerate() {
            store.increment_by(id, (i as u64 + 1) * 10);
        }

        let top = store.top(2);
        assert_eq!(top, vec![RankedItem::new("D", 40), RankedItem::new("C", 30)]);
        assert_eq!(store.top(10).len(), 4);
        assert!(store.top(0).is_empty());
    }

    #[test]
    fn test_saturating_increment() {
        let store = RankingStore::new();
        store.increment_by("A", u64::MAX - 1);
        store.increment_by("A", 5);
        assert_eq!(store.count_of("A"), Some(u64::MAX));

        // Stays pinned
        store.increment_by("A", 1);
        assert_eq!(store.count_of("A"), Some(u64::MAX));
    }

    #[test]
    fn test_ranked_item_json_shape() {
        let json = serde_json::to_string(&RankedItem::new("sku-1", 7)).unwrap();
        assert_eq!(json, r#"{"productId":"sku-1","orders":7}"#);
    }

    #[test]
    fn test_concurrent_increments_no_lost_updates() {
        const THREADS: usize = 16;
        const PER_THREAD: usize = 250;

        let store = Arc::new(RankingStore::new());
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..PER_THREAD {
                        store.increment_by("X", 1);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.count_of("X"), Some((THREADS * PER_THREAD) as u64));
    }

    #[test]
    fn test_snapshots_during_concurrent_writes_stay_sorted() {
        let store = Arc::new(RankingStore::new());

        thread::scope(|s| {
            for w in 0..4u64 {
                let store = &store;
                s.spawn(move || {
                    for i in 0..500u64 {
                        store.increment_by(&format!("p{}", (i + w) % 25), i % 7 + 1);
                    }
                });
            }
            for _ in 0..4 {
                let store = &store;
                s.spawn(move || {
                    for _ in 0..200 {
                        assert_descending(&store.snapshot_ranked());
                    }
                });
            }
        });

        assert_eq!(store.len(), 25);
    }

    #[test]
    fn test_poisoned_lock_still_usable() {
        let store = Arc::new(RankingStore::new());
        store.increment_by("A", 2);

        let poisoner = Arc::clone(&store);
        let _ = thread::spawn(move || {
            let _guard = poisoner.counts.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        store.increment_by("A", 3);
        assert_eq!(store.count_of("A"), Some(5));
    }
}
