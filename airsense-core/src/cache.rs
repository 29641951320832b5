//! Time-versioned calibration cache with throttled refresh
//!
//! ## Overview
//!
//! The cache answers one question on the hot path: which calibration record
//! is effective for device `sys_id` at time `t`? Records are indexed per
//! system id and kept sorted newest-first by validity start, so resolution
//! is a short scan that stops at the first record already in effect.
//!
//! The full record set is small (calibration is a human-driven event, rare
//! relative to message volume), so the cache is rebuilt wholesale from the
//! [`CalibrationSource`] rather than updated incrementally. Rebuilds are
//! throttled: a burst of messages from a device the cache has never seen
//! triggers at most one reload per [`MIN_REFRESH_DELAY_MS`], which bounds
//! the load a miss-storm can put on the source.
//!
//! ## Concurrency
//!
//! Producers publish into the pipeline from independent threads, so the
//! index and the refresh stamp live behind a reader-writer lock. `load`
//! fetches from the source *without* holding the lock, then swaps the new
//! index in under a short write section — readers never observe a partially
//! rebuilt map.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::{
    cal::Cal,
    errors::{CacheError, CacheResult},
    time::{TimeSource, Timestamp},
};

/// Minimum delay between two cache rebuilds, in milliseconds.
pub const MIN_REFRESH_DELAY_MS: u64 = 5_000;

/// Accessor for the full calibration record set.
///
/// Consumed, not implemented, by this crate: the persistence layer provides
/// the production implementation. Only [`CalibrationCache::load`] calls it.
pub trait CalibrationSource: Send + Sync {
    /// Fetch every known calibration record.
    fn list_all(&self) -> CacheResult<Vec<Cal>>;
}

/// Index plus refresh stamp, replaced atomically on every rebuild.
struct CacheState {
    /// Records per system id, sorted descending by `valid_from`.
    by_sys_id: HashMap<u64, Vec<Arc<Cal>>>,
    /// When the last rebuild was attempted.
    last_refresh: Timestamp,
}

/// In-memory, per-device index of calibration records.
pub struct CalibrationCache {
    source: Box<dyn CalibrationSource>,
    clock: Arc<dyn TimeSource>,
    state: RwLock<CacheState>,
}

impl CalibrationCache {
    /// Build a cache and prime it from the source.
    ///
    /// A failed initial load is fatal: the pipeline must not start serving
    /// messages without at least an attempt at calibration data.
    pub fn new(
        source: Box<dyn CalibrationSource>,
        clock: Arc<dyn TimeSource>,
    ) -> CacheResult<Self> {
        let cache = Self {
            source,
            clock,
            state: RwLock::new(CacheState {
                by_sys_id: HashMap::new(),
                last_refresh: 0,
            }),
        };
        cache.load()?;
        Ok(cache)
    }

    /// Rebuild the index from the source.
    ///
    /// On failure the previous content is retained (stale-but-available)
    /// and the error is returned for the caller to log. Failed attempts
    /// stamp the refresh time as well: a miss-storm against a broken source
    /// must not hammer it faster than the throttle allows.
    pub fn load(&self) -> CacheResult<()> {
        // Fetch outside the lock so resolution is never blocked on the
        // source round-trip.
        let fetched = self.source.list_all();
        let now = self.clock.now();

        let mut state = self.state.write().map_err(|_| CacheError::LockPoisoned)?;
        state.last_refresh = now;
        state.by_sys_id = Self::index(fetched?);
        Ok(())
    }

    /// Resolve the calibration record effective for `sys_id` at `at`.
    ///
    /// `Ok(None)` is the explicit "no calibration" outcome: either the
    /// device is unknown (after at most one throttled refresh), or the
    /// sample predates every record for the device. Callers decide the
    /// fallback; no placeholder record is ever fabricated.
    pub fn resolve(&self, sys_id: u64, at: Timestamp) -> CacheResult<Option<Arc<Cal>>> {
        {
            let state = self.state.read().map_err(|_| CacheError::LockPoisoned)?;
            if let Some(entries) = state.by_sys_id.get(&sys_id) {
                return Ok(Self::effective(entries, at));
            }
            if !self.refresh_due(&state) {
                log::debug!("no calibration cached for sysid {sys_id}, refresh throttled");
                return Ok(None);
            }
        }

        // Unknown device and the throttle window has passed: refresh once
        // and retry the lookup.
        if let Err(e) = self.load() {
            log::warn!("calibration refresh failed, continuing with possibly stale data: {e}");
        }

        let state = self.state.read().map_err(|_| CacheError::LockPoisoned)?;
        match state.by_sys_id.get(&sys_id) {
            Some(entries) => Ok(Self::effective(entries, at)),
            None => {
                log::warn!(
                    "missing calibration data for sysid {sys_id} \
                     (reported at most every {} seconds)",
                    MIN_REFRESH_DELAY_MS / 1000
                );
                Ok(None)
            }
        }
    }

    /// Number of devices with at least one cached record.
    pub fn device_count(&self) -> CacheResult<usize> {
        let state = self.state.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(state.by_sys_id.len())
    }

    fn refresh_due(&self, state: &CacheState) -> bool {
        self.clock.now() >= state.last_refresh.saturating_add(MIN_REFRESH_DELAY_MS)
    }

    /// Newest record already in effect at `at`. Entries are newest-first,
    /// so the first hit is the right one and records whose validity starts
    /// later than `at` are skipped.
    fn effective(entries: &[Arc<Cal>], at: Timestamp) -> Option<Arc<Cal>> {
        entries.iter().find(|cal| cal.valid_from <= at).cloned()
    }

    fn index(cals: Vec<Cal>) -> HashMap<u64, Vec<Arc<Cal>>> {
        let mut by_sys_id: HashMap<u64, Vec<Arc<Cal>>> = HashMap::new();
        for cal in cals {
            by_sys_id.entry(cal.sys_id).or_default().push(Arc::new(cal));
        }

        // Resolution depends on newest-first order and the source's
        // ordering is not trusted.
        for entries in by_sys_id.values_mut() {
            entries.sort_by(|a, b| b.valid_from.cmp(&a.valid_from));
        }
        by_sys_id
    }
}
