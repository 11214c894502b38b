//! In-process epoch cache.
//!
//! Same semantics as the Redis backend, kept behind a [`tokio::sync::RwLock`]
//! so readers never block each other.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use iss_types::{Dataset, Epoch, FeedInfo, StateVector};
use tokio::sync::RwLock;

use crate::cache::StoreSummary;
use crate::error::CacheError;

#[derive(Debug, Default)]
struct MemoryState {
    index: Vec<String>,
    vectors: HashMap<String, StateVector>,
    info: Option<FeedInfo>,
    fetched_at: Option<DateTime<Utc>>,
}

/// Epoch cache held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn store_dataset(
        &self,
        dataset: &Dataset,
        fetched_at: DateTime<Utc>,
    ) -> StoreSummary {
        let mut state = self.state.write().await;
        let mut summary = StoreSummary::default();
        let mut index = Vec::with_capacity(dataset.len());
        let mut seen = HashSet::with_capacity(dataset.len());

        for sv in &dataset.state_vectors {
            let key = sv.epoch.to_string();
            match state.vectors.get(&key) {
                None => summary.added = summary.added.saturating_add(1),
                Some(existing) if existing == sv => {
                    summary.unchanged = summary.unchanged.saturating_add(1);
                }
                Some(_) => summary.updated = summary.updated.saturating_add(1),
            }
            state.vectors.insert(key.clone(), sv.clone());
            if seen.insert(key.clone()) {
                index.push(key);
            }
        }

        let before = state.vectors.len();
        state.vectors.retain(|key, _| seen.contains(key));
        summary.removed = before.saturating_sub(state.vectors.len());

        state.index = index;
        state.info = Some(dataset.info.clone());
        state.fetched_at = Some(fetched_at);
        summary
    }

    pub(crate) async fn epoch_count(&self) -> usize {
        self.state.read().await.index.len()
    }

    pub(crate) async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.fetched_at
    }

    pub(crate) async fn get_epoch(&self, epoch: &Epoch) -> Option<StateVector> {
        self.state
            .read()
            .await
            .vectors
            .get(&epoch.to_string())
            .cloned()
    }

    pub(crate) async fn list_epochs(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<StateVector>, CacheError> {
        let state = self.state.read().await;
        state
            .index
            .iter()
            .skip(offset)
            .take(limit)
            .map(|key| {
                state.vectors.get(key).cloned().ok_or_else(|| CacheError::Corrupt {
                    key: key.clone(),
                    message: String::from("indexed epoch has no state vector"),
                })
            })
            .collect()
    }

    pub(crate) async fn epoch_index(&self) -> Vec<String> {
        self.state.read().await.index.clone()
    }

    pub(crate) async fn feed_info(&self) -> Option<FeedInfo> {
        self.state.read().await.info.clone()
    }

    pub(crate) async fn clear(&self) {
        *self.state.write().await = MemoryState::default();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use iss_types::Vector3;

    use super::*;
    use crate::cache::EpochCache;

    fn sv(epoch: &str, x: f64) -> StateVector {
        StateVector::from_components(
            Epoch::parse(epoch).unwrap(),
            Vector3::new(x, 0.0, 0.0),
            Vector3::new(0.0, 7.66, 0.0),
        )
    }

    fn dataset(vectors: Vec<StateVector>) -> Dataset {
        Dataset {
            info: FeedInfo::default(),
            state_vectors: vectors,
        }
    }

    #[tokio::test]
    async fn empty_cache_reports_nothing() {
        let cache = EpochCache::Memory(MemoryCache::new());
        assert_eq!(cache.epoch_count().await.unwrap(), 0);
        assert!(cache.fetched_at().await.unwrap().is_none());
        assert!(cache.feed_info().await.unwrap().is_none());
        assert!(cache.list_epochs(0, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_then_read_back_in_order() {
        let cache = EpochCache::Memory(MemoryCache::new());
        let now = Utc::now();
        let data = dataset(vec![
            sv("2025-063T12:00:00.000Z", 1.0),
            sv("2025-063T12:04:00.000Z", 2.0),
            sv("2025-063T12:08:00.000Z", 3.0),
        ]);

        let summary = cache.store_dataset(&data, now).await.unwrap();
        assert_eq!(summary.added, 3);
        assert_eq!(cache.epoch_count().await.unwrap(), 3);
        assert_eq!(cache.fetched_at().await.unwrap(), Some(now));

        let page = cache.list_epochs(1, 5).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].epoch.to_string(), "2025-063T12:04:00.000Z");

        let index = cache.epoch_index().await.unwrap();
        assert_eq!(index.len(), 3);
        assert!(index.windows(2).all(|w| w[0] < w[1]));

        let hit = cache.get_epoch(&index[2]).await.unwrap().unwrap();
        assert!((hit.x.value - 3.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn restore_counts_changes_and_prunes_stale() {
        let cache = EpochCache::Memory(MemoryCache::new());
        let first = dataset(vec![
            sv("2025-063T12:00:00.000Z", 1.0),
            sv("2025-063T12:04:00.000Z", 2.0),
        ]);
        cache.store_dataset(&first, Utc::now()).await.unwrap();

        let second = dataset(vec![
            sv("2025-063T12:04:00.000Z", 2.5),
            sv("2025-063T12:08:00.000Z", 3.0),
        ]);
        let summary = cache.store_dataset(&second, Utc::now()).await.unwrap();

        assert_eq!(
            summary,
            StoreSummary {
                added: 1,
                updated: 1,
                removed: 1,
                unchanged: 0,
            }
        );
        let gone = Epoch::parse("2025-063T12:00:00.000Z").unwrap();
        assert!(cache.get_epoch(&gone).await.unwrap().is_none());
        assert_eq!(cache.epoch_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn identical_restore_is_noop() {
        let cache = EpochCache::Memory(MemoryCache::new());
        let data = dataset(vec![sv("2025-063T12:00:00.000Z", 1.0)]);
        cache.store_dataset(&data, Utc::now()).await.unwrap();
        let summary = cache.store_dataset(&data, Utc::now()).await.unwrap();
        assert!(summary.is_noop());
        assert_eq!(summary.unchanged, 1);
    }

    #[tokio::test]
    async fn clear_empties_everything() {
        let cache = EpochCache::Memory(MemoryCache::new());
        let data = dataset(vec![sv("2025-063T12:00:00.000Z", 1.0)]);
        cache.store_dataset(&data, Utc::now()).await.unwrap();
        cache.clear().await.unwrap();
        assert_eq!(cache.epoch_count().await.unwrap(), 0);
        assert!(cache.fetched_at().await.unwrap().is_none());
    }
}
