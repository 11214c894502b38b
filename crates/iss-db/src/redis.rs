//! Redis-backed epoch cache.
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `{prefix}:epoch:{EPOCH}` | JSON | One state vector |
//! | `{prefix}:epochs` | List | Canonical epoch strings in feed order |
//! | `{prefix}:feed` | JSON | Header, metadata, and comments |
//! | `{prefix}:fetched_at` | String | RFC 3339 time of the last store |
//!
//! The epoch list is rebuilt under a temporary key and swapped in with
//! `RENAME`, so readers see either the old order or the new one. Vectors
//! are written before the swap and stale vectors deleted after it, so
//! every epoch a visible index names has a stored vector.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use fred::prelude::*;
use iss_types::{Dataset, Epoch, FeedInfo, StateVector};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::StoreSummary;
use crate::error::CacheError;

/// Maximum keys per `MGET`/`MSET`/`DEL` round trip.
const BATCH_SIZE: usize = 500;

/// Connection handle to a Redis instance plus the key prefix in use.
///
/// Wraps a [`fred::prelude::Client`].
#[derive(Clone)]
pub struct RedisCache {
    client: Client,
    prefix: String,
}

impl RedisCache {
    /// Connect to Redis at the given URL.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Config`] if the URL cannot be parsed.
    /// Returns [`CacheError::Redis`] if the connection fails.
    pub async fn connect(url: &str, prefix: &str) -> Result<Self, CacheError> {
        let config = Config::from_url(url)
            .map_err(|e| CacheError::Config(format!("Invalid Redis URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!(prefix, "Connected to Redis");
        Ok(Self {
            client,
            prefix: prefix.to_owned(),
        })
    }

    // =========================================================================
    // Keys
    // =========================================================================

    fn epoch_key(&self, epoch: &str) -> String {
        format!("{}:epoch:{epoch}", self.prefix)
    }

    fn index_key(&self) -> String {
        format!("{}:epochs", self.prefix)
    }

    fn index_staging_key(&self) -> String {
        format!("{}:epochs:staging", self.prefix)
    }

    fn feed_key(&self) -> String {
        format!("{}:feed", self.prefix)
    }

    fn fetched_at_key(&self) -> String {
        format!("{}:fetched_at", self.prefix)
    }

    // =========================================================================
    // Generic JSON get/set
    // =========================================================================

    async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let json = serde_json::to_string(value)?;
        let _: () = self.client.set(key, json.as_str(), None, None, false).await?;
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let value: Option<String> = self.client.get(key).await?;
        value
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(CacheError::from)
    }

    // =========================================================================
    // Dataset
    // =========================================================================

    pub(crate) async fn store_dataset(
        &self,
        dataset: &Dataset,
        fetched_at: DateTime<Utc>,
    ) -> Result<StoreSummary, CacheError> {
        let previous: Vec<String> = self.client.lrange(self.index_key(), 0, -1).await?;

        let mut summary = StoreSummary::default();
        let mut index = Vec::with_capacity(dataset.len());
        let mut seen = HashSet::with_capacity(dataset.len());

        for chunk in dataset.state_vectors.chunks(BATCH_SIZE) {
            let keys: Vec<String> = chunk
                .iter()
                .map(|sv| self.epoch_key(&sv.epoch.to_string()))
                .collect();
            let existing: Vec<Option<String>> = self.client.mget(keys.clone()).await?;

            let mut writes: HashMap<String, String> = HashMap::new();
            for ((sv, key), stored) in chunk.iter().zip(keys).zip(existing) {
                match stored.map(|s| serde_json::from_str::<StateVector>(&s)) {
                    None => summary.added = summary.added.saturating_add(1),
                    Some(Ok(ref old)) if old == sv => {
                        summary.unchanged = summary.unchanged.saturating_add(1);
                        continue;
                    }
                    Some(Ok(_)) => summary.updated = summary.updated.saturating_add(1),
                    Some(Err(e)) => {
                        tracing::warn!(
                            key = %key,
                            error = %e,
                            "Overwriting unreadable cached state vector"
                        );
                        summary.updated = summary.updated.saturating_add(1);
                    }
                }
                writes.insert(key, serde_json::to_string(sv)?);
            }
            if !writes.is_empty() {
                let _: () = self.client.mset(writes).await?;
            }

            for sv in chunk {
                let epoch = sv.epoch.to_string();
                if seen.insert(epoch.clone()) {
                    index.push(epoch);
                }
            }
        }

        let stale: Vec<String> = previous
            .iter()
            .filter(|epoch| !seen.contains(*epoch))
            .map(|epoch| self.epoch_key(epoch))
            .collect();

        // Swap the index before pruning: a reader holding the old index
        // must still find every vector it names.
        self.replace_index(index).await?;
        for chunk in stale.chunks(BATCH_SIZE) {
            let deleted: usize = self.client.del(chunk.to_vec()).await?;
            summary.removed = summary.removed.saturating_add(deleted);
        }

        self.set_json(&self.feed_key(), &dataset.info).await?;
        let _: () = self
            .client
            .set(
                self.fetched_at_key(),
                fetched_at.to_rfc3339().as_str(),
                None,
                None,
                false,
            )
            .await?;

        Ok(summary)
    }

    async fn replace_index(&self, index: Vec<String>) -> Result<(), CacheError> {
        let staging = self.index_staging_key();
        let _: u32 = self.client.del(&staging).await?;
        if index.is_empty() {
            let _: u32 = self.client.del(self.index_key()).await?;
            return Ok(());
        }
        for chunk in index.chunks(BATCH_SIZE) {
            let _: u64 = self.client.rpush(&staging, chunk.to_vec()).await?;
        }
        let _: () = self.client.rename(&staging, self.index_key()).await?;
        Ok(())
    }

    pub(crate) async fn epoch_count(&self) -> Result<usize, CacheError> {
        let len: usize = self.client.llen(self.index_key()).await?;
        Ok(len)
    }

    pub(crate) async fn fetched_at(&self) -> Result<Option<DateTime<Utc>>, CacheError> {
        let key = self.fetched_at_key();
        let value: Option<String> = self.client.get(&key).await?;
        value
            .map(|s| {
                DateTime::parse_from_rfc3339(&s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| CacheError::Corrupt {
                        key: key.clone(),
                        message: e.to_string(),
                    })
            })
            .transpose()
    }

    pub(crate) async fn get_epoch(
        &self,
        epoch: &Epoch,
    ) -> Result<Option<StateVector>, CacheError> {
        self.get_json(&self.epoch_key(&epoch.to_string())).await
    }

    pub(crate) async fn list_epochs(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<StateVector>, CacheError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let start = i64::try_from(offset).unwrap_or(i64::MAX);
        let stop = i64::try_from(offset.saturating_add(limit).saturating_sub(1))
            .unwrap_or(-1);
        let epochs: Vec<String> = self.client.lrange(self.index_key(), start, stop).await?;

        let mut vectors = Vec::with_capacity(epochs.len());
        for chunk in epochs.chunks(BATCH_SIZE) {
            let keys: Vec<String> = chunk.iter().map(|e| self.epoch_key(e)).collect();
            let values: Vec<Option<String>> = self.client.mget(keys.clone()).await?;
            for (key, value) in keys.into_iter().zip(values) {
                let json = value.ok_or_else(|| CacheError::Corrupt {
                    key,
                    message: String::from("indexed epoch has no state vector"),
                })?;
                vectors.push(serde_json::from_str(&json)?);
            }
        }
        Ok(vectors)
    }

    pub(crate) async fn epoch_index(&self) -> Result<Vec<String>, CacheError> {
        let epochs: Vec<String> = self.client.lrange(self.index_key(), 0, -1).await?;
        Ok(epochs)
    }

    pub(crate) async fn feed_info(&self) -> Result<Option<FeedInfo>, CacheError> {
        self.get_json(&self.feed_key()).await
    }

    /// Delete every key this cache owns.
    pub(crate) async fn clear(&self) -> Result<(), CacheError> {
        let epochs = self.epoch_index().await?;
        let keys: Vec<String> = epochs.iter().map(|e| self.epoch_key(e)).collect();
        for chunk in keys.chunks(BATCH_SIZE) {
            let _: usize = self.client.del(chunk.to_vec()).await?;
        }
        let meta = vec![
            self.index_key(),
            self.index_staging_key(),
            self.feed_key(),
            self.fetched_at_key(),
        ];
        let _: usize = self.client.del(meta).await?;
        Ok(())
    }

    /// Return a reference to the underlying [`Client`].
    pub const fn client(&self) -> &Client {
        &self.client
    }
}
