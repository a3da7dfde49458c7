//! Exposure counters consulted and updated during ad placement.
//!
//! Placement reads per-creative counts and records each insertion through the
//! [`ExposureTracker`] capability, so the write side is visible in every
//! signature that needs it (`&mut impl ExposureTracker`).

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

/// Read/increment access to a session's exposure counters.
pub trait ExposureTracker {
    /// Times the creative was shown in the current session.
    fn session_exposure(&self, creative_id: &str) -> u32;

    /// Times the creative was shown in prior sessions.
    fn cross_session_exposure(&self, creative_id: &str) -> u32;

    /// Ads already shown this session before the current placement pass.
    fn session_ad_count(&self) -> u32;

    /// Records one more session showing of the creative.
    fn record_exposure(&mut self, creative_id: &str);
}

/// In-memory exposure state for one app session.
///
/// Created when the feed opens and passed to every placement pass of that
/// session (e.g., one per page) so frequency caps accumulate across pages.
/// `cross_session_exposure` and `session_ad_count` are maintained by the
/// impression-tracking layer; placement only increments `session_exposure`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdInsertionContext {
    /// Creative id to showings this session.
    pub session_exposure: HashMap<String, u32>,
    /// Creative id to showings in earlier sessions.
    pub cross_session_exposure: HashMap<String, u32>,
    /// Ads shown this session before the current pass.
    pub session_ad_count: u32,
}

impl AdInsertionContext {
    /// Creates an empty context for a fresh session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of ads already shown this session.
    pub fn with_session_ad_count(mut self, count: u32) -> Self {
        self.session_ad_count = count;
        self
    }

    /// Seeds the session count for a creative.
    pub fn with_session_exposure(mut self, creative_id: impl Into<String>, count: u32) -> Self {
        self.session_exposure.insert(creative_id.into(), count);
        self
    }

    /// Seeds the prior-session count for a creative.
    pub fn with_cross_session_exposure(
        mut self,
        creative_id: impl Into<String>,
        count: u32,
    ) -> Self {
        self.cross_session_exposure.insert(creative_id.into(), count);
        self
    }
}

impl ExposureTracker for AdInsertionContext {
    fn session_exposure(&self, creative_id: &str) -> u32 {
        self.session_exposure.get(creative_id).copied().unwrap_or(0)
    }

    fn cross_session_exposure(&self, creative_id: &str) -> u32 {
        self.cross_session_exposure
            .get(creative_id)
            .copied()
            .unwrap_or(0)
    }

    fn session_ad_count(&self) -> u32 {
        self.session_ad_count
    }

    fn record_exposure(&mut self, creative_id: &str) {
        let count = self
            .session_exposure
            .entry(creative_id.to_string())
            .or_insert(0);
        *count = count.saturating_add(1);
    }
}

/// An [`AdInsertionContext`] shared between threads.
///
/// Each increment takes the write lock, so concurrent placement passes for
/// the same session never lose an exposure. Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct SharedExposureTracker {
    inner: Arc<RwLock<AdInsertionContext>>,
}

impl SharedExposureTracker {
    /// Wraps a context for shared use.
    pub fn new(context: AdInsertionContext) -> Self {
        Self {
            inner: Arc::new(RwLock::new(context)),
        }
    }

    /// Returns a copy of the current counters.
    pub fn snapshot(&self) -> AdInsertionContext {
        self.read().clone()
    }

    // Counters are plain integers and stay valid if a writer panicked.
    fn read(&self) -> RwLockReadGuard<'_, AdInsertionContext> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AdInsertionContext> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl ExposureTracker for SharedExposureTracker {
    fn session_exposure(&self, creative_id: &str) -> u32 {
        self.read().session_exposure(creative_id)
    }

    fn cross_session_exposure(&self, creative_id: &str) -> u32 {
        self.read().cross_session_exposure(creative_id)
    }

    fn session_ad_count(&self) -> u32 {
        self.read().session_ad_count
    }

    fn record_exposure(&mut self, creative_id: &str) {
        self.write().record_exposure(creative_id);
    }
}
