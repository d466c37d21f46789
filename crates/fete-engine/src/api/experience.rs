use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::watch;

use crate::assets::cache::AssetCache;
use crate::assets::catalog::AssetCatalog;
use crate::assets::preloader::{LoadProgress, Preloader};
use crate::audio::gate::GestureGate;
use crate::audio::manager::{PlayOptions, PlaybackManager};
use crate::audio::output::AudioOutput;
use crate::audio::policy::PlaybackPolicy;
use crate::input::queue::InputEvent;
use crate::stage::cues;
use crate::stage::sequencer::{Stage, StageEvent, StageSequencer};

/// Configuration for the engine, provided by the application root.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory the catalog's relative asset paths resolve against.
    pub asset_root: PathBuf,
    /// Per-asset preload timeout.
    pub asset_timeout: Duration,
    /// Throttle intervals and volume tables.
    pub policy: PlaybackPolicy,
    /// Global restart shortcut, matched case-insensitively.
    pub reset_key: char,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            asset_timeout: Duration::from_secs(5),
            policy: PlaybackPolicy::default(),
            reset_key: 'r',
        }
    }
}

/// The application root of the audio core: owns the cache, the preloader,
/// the playback manager, the gesture gate, and the stage sequencer, and
/// exposes the contract the stage views call into.
pub struct Experience {
    config: EngineConfig,
    cache: Arc<AssetCache>,
    preloader: Arc<Preloader>,
    manager: PlaybackManager,
    gate: GestureGate,
    sequencer: StageSequencer,
}

impl Experience {
    pub fn new(config: EngineConfig, catalog: AssetCatalog, output: Box<dyn AudioOutput>) -> Self {
        let catalog = Arc::new(catalog);
        let cache = Arc::new(AssetCache::new());
        let preloader = Arc::new(Preloader::new(
            Arc::clone(&catalog),
            Arc::clone(&cache),
            config.asset_root.clone(),
            config.asset_timeout,
        ));
        let manager = PlaybackManager::new(
            Arc::clone(&catalog),
            Arc::clone(&cache),
            config.asset_root.clone(),
            config.policy.clone(),
            output,
        );
        Self {
            config,
            cache,
            preloader,
            manager,
            gate: GestureGate::new(),
            sequencer: StageSequencer::new(),
        }
    }

    /// Build with the built-in catalog and the default output device,
    /// degrading to the silent backend when no device is available.
    pub fn with_default_output(config: EngineConfig) -> Self {
        Self::new(
            config,
            AssetCatalog::builtin(),
            crate::audio::output::default_output(),
        )
    }

    // ---- Preloading ----

    /// Kick off the preload task. Must be called within a tokio runtime.
    /// Returns a progress subscription for the loading view.
    pub fn start_preload(&self) -> watch::Receiver<LoadProgress> {
        let preloader = Arc::clone(&self.preloader);
        tokio::spawn(async move { preloader.run().await });
        self.preloader.progress()
    }

    /// Subscribe to preload progress without starting anything.
    pub fn progress(&self) -> watch::Receiver<LoadProgress> {
        self.preloader.progress()
    }

    /// Shared cache handle, for diagnostics.
    pub fn cache(&self) -> Arc<AssetCache> {
        Arc::clone(&self.cache)
    }

    // ---- Stage contract ----

    pub fn current_stage(&self) -> Stage {
        self.sequencer.current()
    }

    pub fn reset_epoch(&self) -> u64 {
        self.sequencer.reset_epoch()
    }

    /// Stage views observe transitions and resets through this queue.
    pub fn drain_stage_events(&mut self) -> Vec<StageEvent> {
        self.sequencer.drain_events()
    }

    /// Called by the active stage view when its content is finished.
    pub fn on_stage_complete(&mut self) {
        let from = self.sequencer.current();
        if from == Stage::Preloader {
            // Loading completes through on_preloader_complete instead.
            debug!("stage-complete ignored during loading");
            return;
        }
        self.sequencer.advance();
        let to = self.sequencer.current();
        if from == to {
            return;
        }
        if let Some(cue) = cues::transition_sound(from) {
            self.manager.play_sound(cue, PlayOptions::default());
        }
        self.apply_background(to);
    }

    /// Called by the loading view once it observes `is_complete`. Hands
    /// off to the first interactive stage; ignored while loading is still
    /// in flight (use `skip_loading` for the manual escape hatch).
    pub fn on_preloader_complete(&mut self) {
        if self.sequencer.current() != Stage::Preloader {
            return;
        }
        if !self.preloader.snapshot().is_complete {
            debug!("preloader-complete signalled before loading settled");
            return;
        }
        self.sequencer.skip_to(Stage::FIRST_INTERACTIVE);
        self.apply_background(Stage::FIRST_INTERACTIVE);
    }

    /// Manual escape hatch for a stalled load: jump past the loading stage
    /// without waiting for completion.
    pub fn skip_loading(&mut self) {
        if self.sequencer.current() != Stage::Preloader {
            return;
        }
        warn!("skipping loading stage before preload settled");
        self.sequencer.skip_to(Stage::FIRST_INTERACTIVE);
        self.apply_background(Stage::FIRST_INTERACTIVE);
    }

    /// Full restart: stop all audio, return to the first interactive
    /// stage, bump the reset epoch. The gesture gate stays unlocked.
    pub fn on_request_reset(&mut self) {
        self.manager.stop_all_audio();
        self.sequencer.reset();
        self.apply_background(self.sequencer.current());
    }

    // ---- Input ----

    /// Feed one platform input event through the gate and the global
    /// shortcut handling.
    pub fn handle_input(&mut self, event: InputEvent) {
        if self.gate.observe(&event, &mut self.manager) {
            // Audio just became allowed: start the current stage's track,
            // which was deferred while the gate was locked.
            self.apply_background(self.sequencer.current());
        }
        if let InputEvent::KeyDown { key } = event {
            let is_reset = char::from_u32(key)
                .is_some_and(|c| c.eq_ignore_ascii_case(&self.config.reset_key));
            if is_reset {
                self.on_request_reset();
            }
        }
    }

    pub fn audio_unlocked(&self) -> bool {
        self.gate.is_unlocked()
    }

    // ---- Audio contract for stage views ----

    pub fn play_sound(&mut self, key: &str, options: PlayOptions) {
        self.manager.play_sound(key, options);
    }

    pub fn play_background_music(&mut self, key: &str, options: PlayOptions) {
        if !self.gate.is_unlocked() {
            debug!("background music {key} skipped, audio still locked");
            return;
        }
        self.manager.play_background_music(key, options);
    }

    pub fn stop_all_audio(&mut self) {
        self.manager.stop_all_audio();
    }

    /// The key of the active background track, if one is playing.
    pub fn current_track(&self) -> Option<&str> {
        self.manager.active_track_key()
    }

    fn apply_background(&mut self, stage: Stage) {
        if !self.gate.is_unlocked() {
            debug!("background for {} deferred, audio locked", stage.name());
            return;
        }
        match cues::background_track(stage) {
            Some(track) => self.manager.play_background_music(track, PlayOptions::default()),
            None => self.manager.stop_background_music(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::cache::AudioBuffer;
    use crate::assets::catalog::keys;
    use crate::audio::output::NullOutput;

    fn experience() -> Experience {
        let config = EngineConfig {
            asset_root: PathBuf::from("/nonexistent-assets"),
            ..EngineConfig::default()
        };
        Experience::new(config, AssetCatalog::builtin(), Box::new(NullOutput))
    }

    fn unlock(exp: &mut Experience) {
        exp.handle_input(InputEvent::PointerDown { x: 0.0, y: 0.0 });
    }

    fn seed_music_cache(exp: &Experience) {
        for key in [
            keys::AMBIENT_MAGICAL,
            keys::GENTLE_PIANO,
            keys::THEME_BIRTHDAY,
            keys::CELEBRATION,
        ] {
            exp.cache().insert(AudioBuffer::new(key, vec![0u8; 8]));
        }
    }

    #[test]
    fn starts_in_loading_stage() {
        let exp = experience();
        assert_eq!(exp.current_stage(), Stage::Preloader);
        assert!(!exp.audio_unlocked());
    }

    #[test]
    fn skip_loading_enters_countdown_with_deferred_music() {
        let mut exp = experience();
        seed_music_cache(&exp);

        // Gate still locked: entering the stage must not start a track.
        exp.skip_loading();
        assert_eq!(exp.current_stage(), Stage::Countdown);
        assert_eq!(exp.current_track(), None);

        // First gesture unlocks audio and starts the deferred track.
        unlock(&mut exp);
        assert!(exp.audio_unlocked());
        assert_eq!(exp.current_track(), Some(keys::AMBIENT_MAGICAL));
    }

    #[test]
    fn stage_completion_walks_the_narrative() {
        let mut exp = experience();
        seed_music_cache(&exp);
        unlock(&mut exp);
        exp.skip_loading();

        exp.on_stage_complete();
        assert_eq!(exp.current_stage(), Stage::Entry);
        exp.on_stage_complete();
        assert_eq!(exp.current_stage(), Stage::Message);
        assert_eq!(exp.current_track(), Some(keys::GENTLE_PIANO));
    }

    #[test]
    fn completion_during_loading_is_ignored() {
        let mut exp = experience();
        exp.on_stage_complete();
        assert_eq!(exp.current_stage(), Stage::Preloader);
    }

    #[test]
    fn preloader_complete_requires_settled_load() {
        let mut exp = experience();
        // Nothing has loaded yet: the hand-off must not happen.
        exp.on_preloader_complete();
        assert_eq!(exp.current_stage(), Stage::Preloader);
    }

    #[tokio::test]
    async fn preloader_complete_hands_off_after_settle() {
        let mut exp = experience();
        // Every builtin asset is missing under the test root; the load
        // still settles completely, with errors.
        let mut rx = exp.start_preload();
        rx.wait_for(|p| p.is_complete).await.unwrap();
        assert!(exp.progress().borrow().has_error);

        exp.on_preloader_complete();
        assert_eq!(exp.current_stage(), Stage::Countdown);
    }

    #[test]
    fn reset_key_restarts_from_any_stage() {
        let mut exp = experience();
        seed_music_cache(&exp);
        unlock(&mut exp);
        exp.skip_loading();
        exp.on_stage_complete();
        exp.on_stage_complete();
        assert_eq!(exp.current_stage(), Stage::Message);

        exp.handle_input(InputEvent::KeyDown { key: 'R' as u32 });
        assert_eq!(exp.current_stage(), Stage::Countdown);
        assert_eq!(exp.reset_epoch(), 1);
        assert_eq!(exp.current_track(), Some(keys::AMBIENT_MAGICAL));
    }

    #[test]
    fn terminal_stage_holds() {
        let mut exp = experience();
        unlock(&mut exp);
        exp.skip_loading();
        for _ in 0..20 {
            exp.on_stage_complete();
        }
        assert_eq!(exp.current_stage(), Stage::ThankYou);
    }

    #[test]
    fn direct_music_calls_respect_the_gate() {
        let mut exp = experience();
        seed_music_cache(&exp);
        exp.skip_loading();

        exp.play_background_music(keys::CELEBRATION, PlayOptions::default());
        assert_eq!(exp.current_track(), None);

        unlock(&mut exp);
        exp.play_background_music(keys::CELEBRATION, PlayOptions::default());
        assert_eq!(exp.current_track(), Some(keys::CELEBRATION));
    }

    #[test]
    fn stage_events_reach_observers() {
        let mut exp = experience();
        exp.skip_loading();
        exp.on_stage_complete();

        let events = exp.drain_stage_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            StageEvent::Entered { stage: Stage::Countdown, from: None }
        ));
        assert!(matches!(
            events[1],
            StageEvent::Entered { stage: Stage::Entry, from: Some(Stage::Countdown) }
        ));
    }
}
