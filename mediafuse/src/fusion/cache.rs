//! Best-score-per-segment cache for temporal fusion

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::models::{UNSCORED, is_unscored};

/// A cached segment score.
///
/// A segment missing from the cache has not been computed at all; `Unscored`
/// means it was computed while the segment had no score data yet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum CachedScore {
    /// Computed before any score arrived
    Unscored,

    /// Best sequence score that included the segment
    Scored(f64),
}

impl CachedScore {
    /// Interpret a raw fusion score, mapping the sentinel to `Unscored`
    pub fn from_raw(score: f64) -> Self {
        if is_unscored(score) {
            Self::Unscored
        } else {
            Self::Scored(score)
        }
    }

    /// Raw score, with [`UNSCORED`] for `Unscored`
    pub fn value(self) -> f64 {
        match self {
            Self::Unscored => UNSCORED,
            Self::Scored(score) => score,
        }
    }

    pub fn is_scored(self) -> bool {
        matches!(self, Self::Scored(_))
    }
}

/// Maps segment ids to the best sequence score found so far.
///
/// Entries only ever grow: an update replaces the stored value only when the
/// candidate is strictly larger. Scoped to one query session.
#[derive(Debug, Default)]
pub struct BestScoreCache {
    entries: RwLock<HashMap<String, CachedScore>>,
}

impl BestScoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, segment_id: &str) -> Option<CachedScore> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(segment_id)
            .copied()
    }

    /// Max-merge a candidate score, returning the value now stored
    pub fn update(&self, segment_id: &str, candidate: f64) -> CachedScore {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get_mut(segment_id) {
            Some(existing) => {
                if existing.value() < candidate {
                    tracing::trace!(
                        segment_id,
                        previous = existing.value(),
                        candidate,
                        "Raising cached segment score"
                    );
                    *existing = CachedScore::from_raw(candidate);
                }
                *existing
            }
            None => {
                tracing::trace!(segment_id, candidate, "Initializing cached segment score");
                let stored = CachedScore::from_raw(candidate);
                entries.insert(segment_id.to_string(), stored);
                stored
            }
        }
    }

    /// Drop all entries (new query session)
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of all entries, for diagnostics
    pub fn snapshot(&self) -> HashMap<String, CachedScore> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw() {
        assert_eq!(CachedScore::from_raw(-1.0), CachedScore::Unscored);
        assert_eq!(CachedScore::from_raw(0.0), CachedScore::Scored(0.0));
        assert_eq!(CachedScore::from_raw(0.7).value(), 0.7);
        assert_eq!(CachedScore::Unscored.value(), UNSCORED);
    }

    #[test]
    fn test_absent_vs_unscored() {
        let cache = BestScoreCache::new();
        assert_eq!(cache.get("s1"), None);

        cache.update("s1", UNSCORED);
        assert_eq!(cache.get("s1"), Some(CachedScore::Unscored));
        assert!(!cache.get("s1").unwrap().is_scored());
    }

    #[test]
    fn test_update_is_monotonic() {
        let cache = BestScoreCache::new();
        assert_eq!(cache.update("s1", 0.3), CachedScore::Scored(0.3));
        assert_eq!(cache.update("s1", 0.1), CachedScore::Scored(0.3));
        assert_eq!(cache.update("s1", UNSCORED), CachedScore::Scored(0.3));
        assert_eq!(cache.update("s1", 0.6), CachedScore::Scored(0.6));
        assert_eq!(cache.get("s1"), Some(CachedScore::Scored(0.6)));
    }

    #[test]
    fn test_unscored_upgrades_to_scored() {
        let cache = BestScoreCache::new();
        cache.update("s1", UNSCORED);
        assert_eq!(cache.update("s1", 0.0), CachedScore::Scored(0.0));
    }

    #[test]
    fn test_clear() {
        let cache = BestScoreCache::new();
        cache.update("s1", 0.5);
        cache.update("s2", 0.2);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.snapshot().get("s2"), Some(&CachedScore::Scored(0.2)));

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("s1"), None);
    }
}
