//! Time-limited cache for fetched feed data
//!
//! Owned by whoever fetches; there is no shared global cache. The clock is
//! injected so expiry can be driven by hand in tests.

use chrono::{DateTime, TimeDelta, Utc};

/// Feed data older than this is fetched again
pub const DEFAULT_TTL_MINUTES: i64 = 10;

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    stored_at: DateTime<Utc>,
    value: T,
}

/// Single-value cache whose entry expires `ttl` after it was stored
#[derive(Debug, Clone)]
pub struct TtlCache<T, C = SystemClock> {
    ttl: TimeDelta,
    clock: C,
    entry: Option<CacheEntry<T>>,
}

impl<T> TtlCache<T, SystemClock> {
    /// Wall-clock cache with the default ten-minute TTL
    pub fn with_default_ttl() -> Self {
        Self::new(TimeDelta::minutes(DEFAULT_TTL_MINUTES), SystemClock)
    }
}

impl<T, C: Clock> TtlCache<T, C> {
    pub fn new(ttl: TimeDelta, clock: C) -> Self {
        Self {
            ttl,
            clock,
            entry: None,
        }
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    fn is_fresh(&self, entry: &CacheEntry<T>, now: DateTime<Utc>) -> bool {
        now - entry.stored_at < self.ttl
    }

    /// The cached value, if it has not expired
    pub fn get(&self) -> Option<&T> {
        let now = self.clock.now();
        self.entry
            .as_ref()
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| &entry.value)
    }

    /// Store `value`, stamped with the current time
    pub fn insert(&mut self, value: T) {
        self.entry = Some(CacheEntry {
            stored_at: self.clock.now(),
            value,
        });
    }

    /// Drop the cached value
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Return the cached value, calling `fetch` to refresh it when missing or
    /// expired.
    ///
    /// # Errors
    /// Propagates the error of `fetch`; the previous entry is kept in that case.
    pub fn get_or_try_insert_with<E, F>(&mut self, fetch: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let now = self.clock.now();
        let entry = match self.entry.take() {
            Some(entry) if self.is_fresh(&entry, now) => entry,
            stale => match fetch() {
                Ok(value) => CacheEntry {
                    stored_at: now,
                    value,
                },
                Err(e) => {
                    self.entry = stale;
                    return Err(e);
                }
            },
        };
        Ok(&self.entry.insert(entry).value)
    }
}
