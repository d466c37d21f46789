use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::assets::cache::{AssetCache, AudioBuffer};
use crate::assets::catalog::AssetCatalog;
use crate::audio::output::{AudioOutput, PlayRequest, TrackHandle};
use crate::audio::policy::PlaybackPolicy;
use crate::audio::throttle::RateLimiter;

/// Caller-supplied overrides for a single playback. Unset fields fall back
/// to the policy tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayOptions {
    pub volume: Option<f32>,
    pub looped: Option<bool>,
}

struct ActiveTrack {
    key: String,
    handle: Box<dyn TrackHandle>,
}

/// Turns symbolic keys into actual sound.
///
/// One-shots are fire-and-forget and may overlap with themselves; the
/// looping background track is a singleton. Resolution is two-tier: the
/// preloaded cache first, an ad hoc load from the catalog path second.
/// Every failure here degrades to silence; nothing propagates to callers.
pub struct PlaybackManager {
    catalog: Arc<AssetCatalog>,
    cache: Arc<AssetCache>,
    asset_root: PathBuf,
    policy: PlaybackPolicy,
    throttle: RateLimiter,
    output: Box<dyn AudioOutput>,
    active_track: Option<ActiveTrack>,
    // Live one-shot handles, kept so stop_all_audio can reach them.
    live_oneshots: Vec<Box<dyn TrackHandle>>,
}

impl PlaybackManager {
    pub fn new(
        catalog: Arc<AssetCatalog>,
        cache: Arc<AssetCache>,
        asset_root: PathBuf,
        policy: PlaybackPolicy,
        output: Box<dyn AudioOutput>,
    ) -> Self {
        info!("playback manager using {} output", output.backend());
        Self {
            catalog,
            cache,
            asset_root,
            policy,
            throttle: RateLimiter::new(),
            output,
            active_track: None,
            live_oneshots: Vec::new(),
        }
    }

    /// Play a short one-shot effect. Throttled per key; silently does
    /// nothing when the key retriggers inside its window.
    pub fn play_sound(&mut self, key: &str, options: PlayOptions) {
        self.prune_finished();

        let min_interval = self.policy.min_interval(key);
        if !self.throttle.try_acquire(key, min_interval) {
            debug!("throttled {key} (window {}ms)", min_interval.as_millis());
            return;
        }

        let volume = options.volume.unwrap_or_else(|| self.policy.sound_volume(key));
        let looped = options.looped.unwrap_or(false);

        if let Some(buffer) = self.cache.get(key) {
            match self.start(&buffer, volume, looped) {
                Ok(handle) => {
                    self.live_oneshots.push(handle);
                    return;
                }
                Err(e) => {
                    // One retry through the ad hoc tier, mirroring the
                    // cached-instance-then-fresh-element fallback.
                    warn!("cached play failed for {key}: {e}; retrying fresh load");
                }
            }
        } else {
            debug!("cache miss for {key}, loading from disk");
        }

        if let Some(buffer) = self.fresh_load(key) {
            match self.start(&buffer, volume, looped) {
                Ok(handle) => self.live_oneshots.push(handle),
                Err(e) => warn!("failed to play {key}: {e}"),
            }
        }
    }

    /// Start a looping background track, replacing any current one.
    /// The previous track is fully stopped before the new one begins.
    pub fn play_background_music(&mut self, key: &str, options: PlayOptions) {
        self.stop_background_music();

        let volume = options.volume.unwrap_or(self.policy.music_volume);
        let looped = options.looped.unwrap_or(self.policy.music_loops);

        let Some(buffer) = self.cache.get(key).or_else(|| self.fresh_load(key)) else {
            warn!("background track {key} unavailable, staying silent");
            return;
        };

        // No retry for music: a failed start stays silent until the next
        // play_background_music call.
        match self.start(&buffer, volume, looped) {
            Ok(handle) => {
                info!("background track: {key}");
                self.active_track = Some(ActiveTrack {
                    key: key.to_string(),
                    handle,
                });
            }
            Err(e) => warn!("failed to start background track {key}: {e}"),
        }
    }

    /// Stop the background track if one is active. Idempotent.
    pub fn stop_background_music(&mut self) {
        if let Some(track) = self.active_track.take() {
            track.handle.stop();
            debug!("stopped background track {}", track.key);
        }
    }

    /// Stop everything: the background track and any one-shot instance
    /// still audible. Never fails.
    pub fn stop_all_audio(&mut self) {
        self.stop_background_music();
        for handle in self.live_oneshots.drain(..) {
            handle.stop();
        }
    }

    /// Near-zero-volume probe that warms up the platform audio pipeline.
    /// Used once by the gesture gate; outcome is irrelevant to the caller.
    pub fn warmup(&mut self) {
        let Some(buffer) = self.cache.any() else {
            debug!("warmup skipped, cache is empty");
            return;
        };
        match self.start(&buffer, 0.0, false) {
            Ok(handle) => self.live_oneshots.push(handle),
            Err(e) => debug!("warmup probe failed: {e}"),
        }
    }

    /// The key of the currently playing background track, if any.
    pub fn active_track_key(&self) -> Option<&str> {
        self.active_track.as_ref().map(|t| t.key.as_str())
    }

    fn start(
        &self,
        buffer: &AudioBuffer,
        volume: f32,
        looped: bool,
    ) -> Result<Box<dyn TrackHandle>, crate::audio::output::PlaybackError> {
        self.output.play(&PlayRequest {
            buffer,
            volume: volume.clamp(0.0, 1.0),
            looped,
        })
    }

    /// Ad hoc load from the catalog fallback path. Returns None (logged)
    /// when the key is unknown or the file is unreadable.
    fn fresh_load(&self, key: &str) -> Option<AudioBuffer> {
        let Some(path) = self.catalog.path_of(key) else {
            warn!("unknown asset key: {key}");
            return None;
        };
        let full = self.asset_root.join(path);
        match std::fs::read(&full) {
            Ok(bytes) => Some(AudioBuffer::new(key, bytes)),
            Err(e) => {
                warn!("failed to read {}: {e}", full.display());
                None
            }
        }
    }

    fn prune_finished(&mut self) {
        self.live_oneshots.retain(|h| !h.is_finished());
    }
}
