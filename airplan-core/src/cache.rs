use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::debug;

use crate::model::{Forecast, Place};

/// How long a fetched forecast stays valid.
const DEFAULT_TTL_MINUTES: i64 = 30;

/// Time-boxed cache of fetched forecasts, keyed by normalized (city, country).
///
/// An explicit object rather than a memoizing wrapper: entries carry their
/// fetch time and are checked for expiry on every read. Single-process,
/// read-mostly; no locking needed.
#[derive(Debug)]
pub struct ForecastCache {
    ttl: Duration,
    entries: HashMap<(String, String), CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    fetched_at: DateTime<Utc>,
    forecast: Forecast,
}

impl ForecastCache {
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(DEFAULT_TTL_MINUTES))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl, entries: HashMap::new() }
    }

    /// Return the cached forecast for `place` if it is still fresh.
    /// Expired entries are evicted on the way out.
    pub fn get(&mut self, place: &Place, now: DateTime<Utc>) -> Option<Forecast> {
        let key = Self::key(place);

        match self.entries.get(&key) {
            Some(entry) if now - entry.fetched_at < self.ttl => {
                debug!(place = %place, "forecast cache hit");
                Some(entry.forecast.clone())
            }
            Some(_) => {
                debug!(place = %place, "forecast cache entry expired");
                self.entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&mut self, place: &Place, forecast: Forecast, now: DateTime<Utc>) {
        self.entries.insert(Self::key(place), CacheEntry { fetched_at: now, forecast });
    }

    fn key(place: &Place) -> (String, String) {
        (place.city.trim().to_lowercase(), place.country.trim().to_lowercase())
    }
}

impl Default for ForecastCache {
    fn default() -> Self {
        Self::new()
    }
}
