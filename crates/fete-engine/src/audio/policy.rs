use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::assets::catalog::keys;

/// Tunable playback numbers: per-key retrigger intervals, per-key volumes,
/// and the music defaults. Shipped defaults match the tuned product
/// values; overrides load from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackPolicy {
    /// Minimum milliseconds between two triggers of the same sound key.
    pub min_intervals_ms: HashMap<String, u64>,
    /// Fallback interval for keys without an entry.
    pub default_interval_ms: u64,
    /// Per-key one-shot volumes in [0.0, 1.0].
    pub sound_volumes: HashMap<String, f32>,
    /// Fallback one-shot volume.
    pub default_sound_volume: f32,
    /// Background track volume.
    pub music_volume: f32,
    /// Whether background tracks loop by default.
    pub music_loops: bool,
}

impl Default for PlaybackPolicy {
    fn default() -> Self {
        let min_intervals_ms = [
            // Tick fires once per second; the window must stay under that.
            (keys::COUNTDOWN_TICK, 900),
            (keys::COUNTDOWN_COMPLETE, 50),
            (keys::WORD_HOVER, 150),
            (keys::BUTTON_CLICK, 100),
            (keys::SPARKLE, 80),
            (keys::PAGE_TRANSITION, 200),
            (keys::BALLOON_POP, 100),
            (keys::CONFETTI, 150),
            (keys::CAKE_CUT, 50),
            (keys::HAPPY_BIRTHDAY, 1000),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let sound_volumes = [
            (keys::WORD_HOVER, 0.6),
            (keys::SPARKLE, 0.9),
            (keys::BUTTON_CLICK, 0.7),
            (keys::COUNTDOWN_TICK, 0.5),
            (keys::BALLOON_POP, 0.6),
            (keys::CONFETTI, 0.8),
            (keys::PAGE_TRANSITION, 0.5),
            (keys::CAKE_CUT, 0.7),
            (keys::HAPPY_BIRTHDAY, 0.8),
            (keys::COUNTDOWN_COMPLETE, 0.8),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            min_intervals_ms,
            default_interval_ms: 100,
            sound_volumes,
            default_sound_volume: 0.8,
            music_volume: 0.4,
            music_loops: true,
        }
    }
}

impl PlaybackPolicy {
    /// The retrigger window for a key.
    pub fn min_interval(&self, key: &str) -> Duration {
        let ms = self
            .min_intervals_ms
            .get(key)
            .copied()
            .unwrap_or(self.default_interval_ms);
        Duration::from_millis(ms)
    }

    /// The default volume for a one-shot key.
    pub fn sound_volume(&self, key: &str) -> f32 {
        self.sound_volumes
            .get(key)
            .copied()
            .unwrap_or(self.default_sound_volume)
    }
}
