//! Time-windowed memory of previously produced outfits

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RecencyConfig;
use crate::domain::outfit::OutfitKey;

/// Outfit key -> time it was last returned to a caller.
///
/// Serializable so an outer collaborator can persist it between calls; the
/// engine itself never does.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecencyTracker {
    entries: BTreeMap<OutfitKey, DateTime<Utc>>,
}

impl RecencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_generated(&self, key: &OutfitKey) -> Option<DateTime<Utc>> {
        self.entries.get(key).copied()
    }

    pub fn record(&mut self, key: OutfitKey, now: DateTime<Utc>) {
        self.entries.insert(key, now);
    }

    /// Drops entries older than the window and returns how many were removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>, config: &RecencyConfig) -> usize {
        let window = window(config);
        let before = self.entries.len();
        self.entries.retain(|_, generated_at| now - *generated_at < window);
        before - self.entries.len()
    }

    /// Linear decay from 1.0 (just generated) to 0.0 (window elapsed).
    pub fn decay(&self, generated_at: DateTime<Utc>, now: DateTime<Utc>, config: &RecencyConfig) -> f64 {
        let window = window(config).num_seconds().max(1) as f64;
        let age = (now - generated_at).num_seconds().max(0) as f64;
        (1.0 - age / window).clamp(0.0, 1.0)
    }

    /// Penalty for being near-identical to any outfit still inside the window.
    pub fn near_duplicate_penalty(
        &self,
        key: &OutfitKey,
        now: DateTime<Utc>,
        config: &RecencyConfig,
    ) -> f64 {
        self.entries
            .iter()
            .filter(|(recorded, _)| recorded.similarity(key) > config.near_duplicate_threshold)
            .map(|(_, generated_at)| config.variety_penalty * self.decay(*generated_at, now, config))
            .fold(0.0_f64, f64::max)
    }

    /// Multiplicative penalty applied to the total when this exact outfit was produced recently.
    pub fn repeat_penalty(&self, key: &OutfitKey, now: DateTime<Utc>, config: &RecencyConfig) -> f64 {
        self.last_generated(key)
            .map(|generated_at| config.repeat_penalty * self.decay(generated_at, now, config))
            .unwrap_or(0.0)
    }
}

fn window(config: &RecencyConfig) -> Duration {
    Duration::days(config.window_days)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::RecencyTracker;
    use crate::config::RecencyConfig;
    use crate::domain::outfit::OutfitKey;

    fn key(value: &str) -> OutfitKey {
        OutfitKey(value.to_string())
    }

    #[test]
    fn purge_removes_entries_older_than_the_window() {
        let config = RecencyConfig::default();
        let now = Utc::now();
        let mut tracker = RecencyTracker::new();
        tracker.record(key("a|b"), now - Duration::days(8));
        tracker.record(key("c|d"), now - Duration::days(2));

        let purged = tracker.purge_expired(now, &config);

        assert_eq!(purged, 1);
        assert_eq!(tracker.len(), 1);
        assert!(tracker.last_generated(&key("c|d")).is_some());
    }

    #[test]
    fn near_duplicate_penalty_decays_linearly() {
        let config = RecencyConfig::default();
        let now = Utc::now();
        let mut tracker = RecencyTracker::new();
        tracker.record(key("a|b|c|d|e"), now - Duration::hours(84));

        let penalty = tracker.near_duplicate_penalty(&key("a|b|c|d|e"), now, &config);
        assert!((penalty - config.variety_penalty * 0.5).abs() < 1e-6);
    }

    #[test]
    fn dissimilar_outfits_are_not_penalised() {
        let config = RecencyConfig::default();
        let now = Utc::now();
        let mut tracker = RecencyTracker::new();
        tracker.record(key("a|b|c|d"), now);

        assert_eq!(tracker.near_duplicate_penalty(&key("a|b|x|y"), now, &config), 0.0);
        assert_eq!(tracker.repeat_penalty(&key("a|b|x|y"), now, &config), 0.0);
    }

    #[test]
    fn repeat_penalty_is_full_when_just_generated() {
        let config = RecencyConfig::default();
        let now = Utc::now();
        let mut tracker = RecencyTracker::new();
        tracker.record(key("a|b"), now);

        assert!((tracker.repeat_penalty(&key("a|b"), now, &config) - config.repeat_penalty).abs() < 1e-9);
    }

    #[test]
    fn tracker_round_trips_through_json() {
        let mut tracker = RecencyTracker::new();
        tracker.record(key("a|b"), Utc::now());

        let json = serde_json::to_string(&tracker).expect("serialize");
        let restored: RecencyTracker = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, tracker);
    }
}
