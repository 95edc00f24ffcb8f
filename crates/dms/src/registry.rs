//! Tracked-face registry
//!
//! The detector reuses or abandons tracking IDs without telling us, so
//! entries are evicted once they go unobserved for `stale_after_frames`.

use std::collections::HashMap;

use tracing::debug;

use crate::classifier::DrowsinessClassifier;
use crate::config::DmsConfig;
use crate::observation::{Observation, TrackId};

/// Registry entry for one tracked face
#[derive(Debug, Clone)]
pub struct TrackEntry {
    pub classifier: DrowsinessClassifier,
    /// Frame this track was last observed
    pub last_seen: u64,
}

/// Classifier state keyed by tracking ID
#[derive(Debug, Clone)]
pub struct TrackRegistry {
    config: DmsConfig,
    tracks: HashMap<TrackId, TrackEntry>,
}

impl TrackRegistry {
    pub fn new(config: DmsConfig) -> Self {
        Self {
            config,
            tracks: HashMap::new(),
        }
    }

    pub fn config(&self) -> &DmsConfig {
        &self.config
    }

    /// Look up the classifier for `id`, creating a fresh one on first sight
    pub fn get_or_create(&mut self, id: TrackId, frame: u64) -> &mut DrowsinessClassifier {
        let config = &self.config;
        let entry = self.tracks.entry(id).or_insert_with(|| {
            debug!("New track {} at frame {}", id, frame);
            TrackEntry {
                classifier: DrowsinessClassifier::new(config),
                last_seen: frame,
            }
        });
        entry.last_seen = entry.last_seen.max(frame);
        &mut entry.classifier
    }

    /// Classify one observation for `id` and return its verdict
    pub fn observe(&mut self, id: TrackId, observation: &Observation) -> bool {
        self.get_or_create(id, observation.frame).observe(observation)
    }

    /// Drop every track not seen within the staleness window; returns the evicted IDs
    pub fn evict_stale(&mut self, current_frame: u64) -> Vec<TrackId> {
        let stale_after = self.config.stale_after_frames;
        let mut evicted = Vec::new();

        self.tracks.retain(|&id, entry| {
            let keep = current_frame.saturating_sub(entry.last_seen) <= stale_after;
            if !keep {
                debug!(
                    "Evicting track {} (last seen {}, now {}, drowsy {})",
                    id,
                    entry.last_seen,
                    current_frame,
                    entry.classifier.verdict()
                );
                evicted.push(id);
            }
            keep
        });

        evicted.sort_unstable();
        evicted
    }

    /// Current verdict of every tracked face
    pub fn verdicts(&self) -> impl Iterator<Item = (TrackId, bool)> + '_ {
        self.tracks.iter().map(|(&id, entry)| (id, entry.classifier.verdict()))
    }

    pub fn get(&self, id: TrackId) -> Option<&TrackEntry> {
        self.tracks.get(&id)
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.tracks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}

impl Default for TrackRegistry {
    fn default() -> Self {
        Self::new(DmsConfig::default())
    }
}
