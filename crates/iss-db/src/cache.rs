//! Backend dispatch for the epoch cache.
//!
//! [`EpochCache`] uses enum dispatch instead of a trait object because
//! async methods are not dyn-compatible. Both backends implement the same
//! semantics: after [`store_dataset`](EpochCache::store_dataset) the cache
//! holds exactly the stored dataset, in feed order.

use chrono::{DateTime, Utc};
use iss_types::{Dataset, Epoch, FeedInfo, StateVector};

use crate::error::CacheError;
use crate::memory::MemoryCache;
use crate::redis::RedisCache;

/// What a [`store_dataset`](EpochCache::store_dataset) call changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StoreSummary {
    /// Epochs that were not cached before.
    pub added: usize,
    /// Epochs whose cached state vector differed and was overwritten.
    pub updated: usize,
    /// Cached epochs that are no longer in the feed and were deleted.
    pub removed: usize,
    /// Epochs already cached with identical data.
    pub unchanged: usize,
}

impl StoreSummary {
    /// Whether the store changed anything.
    pub const fn is_noop(&self) -> bool {
        self.added == 0 && self.updated == 0 && self.removed == 0
    }
}

/// The epoch cache, backed by Redis or process memory.
#[derive(Clone)]
pub enum EpochCache {
    /// Shared Redis-backed cache.
    Redis(RedisCache),
    /// In-process cache.
    Memory(MemoryCache),
}

impl EpochCache {
    /// Replace the cached dataset with `dataset`, stamped `fetched_at`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend fails.
    pub async fn store_dataset(
        &self,
        dataset: &Dataset,
        fetched_at: DateTime<Utc>,
    ) -> Result<StoreSummary, CacheError> {
        match self {
            Self::Redis(cache) => cache.store_dataset(dataset, fetched_at).await,
            Self::Memory(cache) => Ok(cache.store_dataset(dataset, fetched_at).await),
        }
    }

    /// Number of cached epochs.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend fails.
    pub async fn epoch_count(&self) -> Result<usize, CacheError> {
        match self {
            Self::Redis(cache) => cache.epoch_count().await,
            Self::Memory(cache) => Ok(cache.epoch_count().await),
        }
    }

    /// When the cached dataset was stored, if ever.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend fails or the stamp is corrupt.
    pub async fn fetched_at(&self) -> Result<Option<DateTime<Utc>>, CacheError> {
        match self {
            Self::Redis(cache) => cache.fetched_at().await,
            Self::Memory(cache) => Ok(cache.fetched_at().await),
        }
    }

    /// Look up one state vector by epoch.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend fails or the entry is corrupt.
    pub async fn get_epoch(&self, epoch: &Epoch) -> Result<Option<StateVector>, CacheError> {
        match self {
            Self::Redis(cache) => cache.get_epoch(epoch).await,
            Self::Memory(cache) => Ok(cache.get_epoch(epoch).await),
        }
    }

    /// Up to `limit` state vectors starting at position `offset`, in feed order.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend fails or an entry is missing.
    pub async fn list_epochs(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<StateVector>, CacheError> {
        match self {
            Self::Redis(cache) => cache.list_epochs(offset, limit).await,
            Self::Memory(cache) => cache.list_epochs(offset, limit).await,
        }
    }

    /// All cached epochs, in feed order.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend fails or an epoch is corrupt.
    pub async fn epoch_index(&self) -> Result<Vec<Epoch>, CacheError> {
        let raw = match self {
            Self::Redis(cache) => cache.epoch_index().await?,
            Self::Memory(cache) => cache.epoch_index().await,
        };
        raw.iter()
            .map(|s| {
                Epoch::parse(s).map_err(|e| CacheError::Corrupt {
                    key: s.clone(),
                    message: e.to_string(),
                })
            })
            .collect()
    }

    /// Header, metadata, and comments of the cached feed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend fails or the entry is corrupt.
    pub async fn feed_info(&self) -> Result<Option<FeedInfo>, CacheError> {
        match self {
            Self::Redis(cache) => cache.feed_info().await,
            Self::Memory(cache) => Ok(cache.feed_info().await),
        }
    }

    /// Drop everything.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend fails.
    pub async fn clear(&self) -> Result<(), CacheError> {
        match self {
            Self::Redis(cache) => cache.clear().await,
            Self::Memory(cache) => {
                cache.clear().await;
                Ok(())
            }
        }
    }

    /// Backend name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Redis(_) => "redis",
            Self::Memory(_) => "memory",
        }
    }
}
