//! The tracker service.
//!
//! [`Tracker`] owns the feed source, the epoch cache, and the geocoder.
//! Every query first calls [`Tracker::ensure_loaded`], which fetches the
//! feed when the cache is empty or older than the refresh interval.
//!
//! # Refresh rules
//!
//! - Refreshes are serialized behind one mutex. A caller that waited on
//!   another caller's refresh re-checks freshness and does not fetch again.
//! - An empty cache plus a failed fetch is an error for the caller.
//! - A stale cache plus a failed fetch serves the stale data, logs a
//!   warning, and holds off further attempts for [`FAILED_REFRESH_BACKOFF`].

use std::time::{Duration, Instant};

use chrono::Utc;
use iss_db::{CacheError, EpochCache, MemoryCache, RedisCache, StoreSummary};
use iss_feed::{FeedError, FeedSource, FileFeed, HttpFeed};
use iss_types::{
    Epoch, FeedInfo, GeodeticPosition, LocationReport, NowReport, SpeedReport, StateVector,
};
use tokio::sync::Mutex;

use crate::config::{CacheBackend, ConfigError, FeedKind, TrackerConfig};
use crate::geocode::{
    GeocodeError, Geocoder, NO_PLACE_MESSAGE, NominatimClient, UNAVAILABLE_MESSAGE,
};
use crate::lookup::{self, LookupError, Nearest, PageRequest};
use crate::physics;

/// How long to wait after a failed refresh before retrying while stale
/// data is still being served.
pub const FAILED_REFRESH_BACKOFF: Duration = Duration::from_secs(60);

/// Unit reported when the feed gives velocities without one.
const DEFAULT_SPEED_UNITS: &str = "km/s";

/// Errors from tracker queries.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The feed could not be fetched or parsed.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// The cache backend failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A pagination request was invalid.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The geocoder could not be set up.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    /// The configuration is inconsistent.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No cached state vector has this epoch.
    #[error("epoch not found: {0}")]
    EpochNotFound(Epoch),

    /// The cache holds no data to answer from.
    #[error("no trajectory data available")]
    NoData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Freshness {
    Empty,
    Stale,
    Fresh,
}

#[derive(Debug, Default)]
struct RefreshState {
    last_failure: Option<Instant>,
}

/// Answers trajectory queries from a cache that fills itself from the feed.
pub struct Tracker {
    feed: FeedSource,
    cache: EpochCache,
    geocoder: Geocoder,
    refresh_interval: Option<Duration>,
    refresh_state: Mutex<RefreshState>,
}

impl Tracker {
    /// Assemble a tracker from its parts.
    ///
    /// `refresh_interval` of `None` means the feed is only fetched into an
    /// empty cache.
    pub fn new(
        feed: FeedSource,
        cache: EpochCache,
        geocoder: Geocoder,
        refresh_interval: Option<Duration>,
    ) -> Self {
        Self {
            feed,
            cache,
            geocoder,
            refresh_interval,
            refresh_state: Mutex::new(RefreshState::default()),
        }
    }

    /// Build the feed source, connect the cache, and set up the geocoder.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if the configuration is invalid, an HTTP
    /// client cannot be built, or Redis is unreachable.
    pub async fn from_config(config: &TrackerConfig) -> Result<Self, TrackerError> {
        config.validate()?;

        let feed = match config.feed.source {
            FeedKind::Http => {
                FeedSource::Http(HttpFeed::new(&config.feed.url, config.feed.timeout())?)
            }
            FeedKind::File => {
                let path = config.feed.path.as_deref().ok_or_else(|| {
                    ConfigError::Invalid(String::from("feed.path is required for a file feed"))
                })?;
                FeedSource::File(FileFeed::new(path))
            }
        };

        let cache = match config.cache.backend {
            CacheBackend::Redis => EpochCache::Redis(
                RedisCache::connect(&config.cache.redis_url, &config.cache.key_prefix).await?,
            ),
            CacheBackend::Memory => EpochCache::Memory(MemoryCache::new()),
        };

        let geocoder = if config.geocoder.enabled {
            Geocoder::Nominatim(NominatimClient::new(
                &config.geocoder.base_url,
                &config.geocoder.user_agent,
                config.geocoder.timeout(),
            )?)
        } else {
            Geocoder::Disabled
        };

        tracing::info!(
            feed = %feed.describe(),
            cache = cache.name(),
            geocoder = geocoder.name(),
            refresh_interval_secs = ?config.feed.refresh_interval_secs,
            "Tracker configured"
        );

        Ok(Self::new(
            feed,
            cache,
            geocoder,
            config.feed.refresh_interval(),
        ))
    }

    /// The epoch cache.
    pub const fn cache(&self) -> &EpochCache {
        &self.cache
    }

    /// The feed source.
    pub const fn feed(&self) -> &FeedSource {
        &self.feed
    }

    /// The reverse geocoder.
    pub const fn geocoder(&self) -> &Geocoder {
        &self.geocoder
    }

    // =========================================================================
    // Cache population
    // =========================================================================

    async fn freshness(&self) -> Result<Freshness, TrackerError> {
        if self.cache.epoch_count().await? == 0 {
            return Ok(Freshness::Empty);
        }
        let Some(interval) = self.refresh_interval else {
            return Ok(Freshness::Fresh);
        };
        let Some(fetched_at) = self.cache.fetched_at().await? else {
            return Ok(Freshness::Stale);
        };
        // A fetch time in the future (clock skew) counts as fresh.
        let stale = Utc::now()
            .signed_duration_since(fetched_at)
            .to_std()
            .is_ok_and(|age| age >= interval);
        Ok(if stale {
            Freshness::Stale
        } else {
            Freshness::Fresh
        })
    }

    /// Make sure the cache holds data, fetching the feed if needed.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Feed`] if the cache is empty and the fetch
    /// fails, or [`TrackerError::Cache`] if the cache cannot be read.
    pub async fn ensure_loaded(&self) -> Result<(), TrackerError> {
        if self.freshness().await? == Freshness::Fresh {
            return Ok(());
        }

        let mut state = self.refresh_state.lock().await;
        match self.freshness().await? {
            Freshness::Fresh => Ok(()),
            Freshness::Empty => self.refresh_locked(&mut state).await.map(drop),
            Freshness::Stale => {
                if state
                    .last_failure
                    .is_some_and(|failed| failed.elapsed() < FAILED_REFRESH_BACKOFF)
                {
                    return Ok(());
                }
                if let Err(e) = self.refresh_locked(&mut state).await {
                    tracing::warn!(
                        error = %e,
                        feed = %self.feed.describe(),
                        "Feed refresh failed, serving stale data"
                    );
                }
                Ok(())
            }
        }
    }

    /// Fetch the feed and store it unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError`] if the fetch or the store fails.
    pub async fn refresh(&self) -> Result<StoreSummary, TrackerError> {
        let mut state = self.refresh_state.lock().await;
        self.refresh_locked(&mut state).await
    }

    async fn refresh_locked(
        &self,
        state: &mut RefreshState,
    ) -> Result<StoreSummary, TrackerError> {
        let started = Instant::now();
        match self.fetch_and_store().await {
            Ok(summary) => {
                state.last_failure = None;
                tracing::info!(
                    feed = %self.feed.describe(),
                    added = summary.added,
                    updated = summary.updated,
                    removed = summary.removed,
                    unchanged = summary.unchanged,
                    elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                    "Feed refreshed"
                );
                Ok(summary)
            }
            Err(e) => {
                state.last_failure = Some(Instant::now());
                Err(e)
            }
        }
    }

    async fn fetch_and_store(&self) -> Result<StoreSummary, TrackerError> {
        let dataset = self.feed.fetch().await?;
        let summary = self.cache.store_dataset(&dataset, Utc::now()).await?;
        Ok(summary)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// One page of state vectors in feed order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Lookup`] if the offset is past the end.
    pub async fn list(&self, request: &PageRequest) -> Result<Vec<StateVector>, TrackerError> {
        self.ensure_loaded().await?;
        let total = self.cache.epoch_count().await?;
        let page = request.resolve(total)?;
        Ok(self.cache.list_epochs(page.offset, page.limit).await?)
    }

    /// The state vector at exactly `epoch`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::EpochNotFound`] if no sample has that epoch.
    pub async fn epoch(&self, epoch: Epoch) -> Result<StateVector, TrackerError> {
        self.ensure_loaded().await?;
        self.cache
            .get_epoch(&epoch)
            .await?
            .ok_or(TrackerError::EpochNotFound(epoch))
    }

    /// Instantaneous speed at `epoch`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::EpochNotFound`] if no sample has that epoch.
    pub async fn speed(&self, epoch: Epoch) -> Result<SpeedReport, TrackerError> {
        let sv = self.epoch(epoch).await?;
        Ok(speed_report(&sv))
    }

    /// Ground position and nearest named place at `epoch`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::EpochNotFound`] if no sample has that epoch.
    /// Geocoder failures do not fail the call.
    pub async fn location(&self, epoch: Epoch) -> Result<LocationReport, TrackerError> {
        let sv = self.epoch(epoch).await?;
        let position = physics::geodetic_position(sv.position(), sv.epoch);
        let nearest_geolocation = self.describe_place(&position).await;
        Ok(LocationReport {
            epoch: sv.epoch,
            position,
            nearest_geolocation,
        })
    }

    /// The sample closest in time to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NoData`] if the cache is empty after loading.
    pub async fn nearest_to(&self, target: Epoch) -> Result<(Nearest, StateVector), TrackerError> {
        self.ensure_loaded().await?;
        let index = self.cache.epoch_index().await?;
        let hit = lookup::nearest(&index, target).ok_or(TrackerError::NoData)?;
        let sv = self
            .cache
            .get_epoch(&hit.epoch)
            .await?
            .ok_or(TrackerError::EpochNotFound(hit.epoch))?;
        Ok((hit, sv))
    }

    /// Everything known about the sample closest to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NoData`] if the cache is empty after loading.
    pub async fn report_at(&self, target: Epoch) -> Result<NowReport, TrackerError> {
        let (hit, sv) = self.nearest_to(target).await?;
        let position = physics::geodetic_position(sv.position(), sv.epoch);
        let nearest_geolocation = self.describe_place(&position).await;
        Ok(NowReport {
            epoch: sv.epoch,
            seconds_from_now: hit.offset_seconds,
            instantaneous_speed: physics::speed(sv.velocity()),
            position,
            nearest_geolocation,
        })
    }

    /// Everything known about the sample closest to the current time.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NoData`] if the cache is empty after loading.
    pub async fn now(&self) -> Result<NowReport, TrackerError> {
        self.report_at(Epoch::now()).await
    }

    /// Header, metadata, and comments of the cached feed.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NoData`] if no feed has been stored.
    pub async fn feed_info(&self) -> Result<FeedInfo, TrackerError> {
        self.ensure_loaded().await?;
        self.cache.feed_info().await?.ok_or(TrackerError::NoData)
    }

    async fn describe_place(&self, position: &GeodeticPosition) -> String {
        match self
            .geocoder
            .nearest_place(position.latitude, position.longitude)
            .await
        {
            Ok(Some(place)) => place,
            Ok(None) => String::from(NO_PLACE_MESSAGE),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    latitude = position.latitude,
                    longitude = position.longitude,
                    "Reverse geocoding failed"
                );
                String::from(UNAVAILABLE_MESSAGE)
            }
        }
    }
}

fn speed_report(sv: &StateVector) -> SpeedReport {
    let units = sv
        .x_dot
        .units
        .clone()
        .unwrap_or_else(|| String::from(DEFAULT_SPEED_UNITS));
    SpeedReport {
        epoch: sv.epoch,
        instantaneous_speed: physics::speed(sv.velocity()),
        units,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use iss_types::{Measurement, Vector3};

    #[test]
    fn speed_report_uses_feed_units() {
        let sv = StateVector::from_components(
            Epoch::parse("2025-063T12:00:00.000Z").unwrap(),
            Vector3::new(7000.0, 0.0, 0.0),
            Vector3::new(0.0, 6.0, 8.0),
        );
        let report = speed_report(&sv);
        assert!((report.instantaneous_speed - 10.0).abs() < 1e-12);
        assert_eq!(report.units, "km/s");
    }

    #[test]
    fn speed_report_defaults_units() {
        let mut sv = StateVector::from_components(
            Epoch::parse("2025-063T12:00:00.000Z").unwrap(),
            Vector3::default(),
            Vector3::new(1.0, 0.0, 0.0),
        );
        sv.x_dot = Measurement {
            value: 1.0,
            units: None,
        };
        assert_eq!(speed_report(&sv).units, DEFAULT_SPEED_UNITS);
    }
}
