use std::path::PathBuf;
use std::time::Duration;

use harvest_core::DriverSettings;
use serde::{Deserialize, Serialize};

const DEFAULT_COLLECTION: &str = "posts";

/// Knobs for one harvest run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestSettings {
    pub storage_root: PathBuf,
    /// Parallel downloads.
    pub concurrency: usize,
    /// Harvested item cap; `None` is unbounded.
    pub max_items: Option<usize>,
    pub stagnation_threshold: u32,
    /// Upper bound of one wait for responses.
    pub wait_timeout_ms: u64,
    /// Extra wait after the first new item of a cycle, to batch near-simultaneous responses.
    pub settle_delay_ms: u64,
    /// Randomized pause after each download.
    pub jitter: Option<JitterRange>,
    /// Collections to harvest (e.g. `posts`, `stories`); empty harvests all.
    /// Items without a collection count as `posts`.
    pub collections: Vec<String>,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("./storage"),
            concurrency: 5,
            max_items: None,
            stagnation_threshold: 3,
            wait_timeout_ms: 4_000,
            settle_delay_ms: 500,
            jitter: None,
            collections: Vec::new(),
        }
    }
}

impl HarvestSettings {
    pub fn driver(&self) -> DriverSettings {
        DriverSettings {
            max_items: self.max_items,
            stagnation_threshold: self.stagnation_threshold,
        }
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn allows_collection(&self, collection: Option<&str>) -> bool {
        if self.collections.is_empty() {
            return true;
        }
        let collection = collection
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COLLECTION);
        self.collections
            .iter()
            .any(|allowed| allowed.trim().eq_ignore_ascii_case(collection))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JitterRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl JitterRange {
    pub fn sample(&self) -> Duration {
        use rand::Rng;

        let (low, high) = if self.min_ms <= self.max_ms {
            (self.min_ms, self.max_ms)
        } else {
            (self.max_ms, self.min_ms)
        };
        Duration::from_millis(rand::rng().random_range(low..=high))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub redirect_limit: usize,
    /// Limit for discovery payloads; media streams are not capped.
    pub max_payload_bytes: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            request_timeout_ms: 300_000,
            redirect_limit: 5,
            max_payload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl TransportSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_filter_is_case_insensitive_and_defaults_to_posts() {
        let all = HarvestSettings::default();
        let stories_only = HarvestSettings {
            collections: vec!["Stories".into(), " highlights ".into()],
            ..HarvestSettings::default()
        };

        assert!(all.allows_collection(Some("anything")));
        assert!(stories_only.allows_collection(Some("stories")));
        assert!(stories_only.allows_collection(Some("highlights")));
        assert!(!stories_only.allows_collection(Some("posts")));
        assert!(!stories_only.allows_collection(None));
        assert!(HarvestSettings {
            collections: vec!["posts".into()],
            ..HarvestSettings::default()
        }
        .allows_collection(None));
    }

    #[test]
    fn jitter_stays_in_range_even_when_reversed() {
        let range = JitterRange {
            min_ms: 20,
            max_ms: 10,
        };
        for _ in 0..50 {
            let d = range.sample();
            assert!(d >= Duration::from_millis(10) && d <= Duration::from_millis(20));
        }
    }

    #[test]
    fn partial_ron_like_json_keeps_defaults() {
        let settings: HarvestSettings =
            serde_json::from_str(r#"{"concurrency": 2, "max_items": 10}"#).unwrap();
        assert_eq!(settings.concurrency, 2);
        assert_eq!(settings.max_items, Some(10));
        assert_eq!(settings.stagnation_threshold, 3);
        assert_eq!(settings.storage_root, PathBuf::from("./storage"));
    }
}
