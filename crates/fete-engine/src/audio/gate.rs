use log::info;

use crate::audio::manager::PlaybackManager;
use crate::input::queue::InputEvent;

/// One-way latch deferring audio activation until a genuine user input.
///
/// Platforms refuse unprompted playback, so background-music triggers must
/// check `is_unlocked` and skip rather than attempt a start that would be
/// rejected anyway. The first qualifying click or keypress fires a single
/// near-silent warmup probe and unlocks for the rest of the session; a
/// full experience restart does not re-lock.
#[derive(Debug, Default)]
pub struct GestureGate {
    unlocked: bool,
}

impl GestureGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Feed one input event through the gate. Returns true exactly once,
    /// on the event that unlocked audio.
    pub fn observe(&mut self, event: &InputEvent, manager: &mut PlaybackManager) -> bool {
        if self.unlocked || !event.is_gesture() {
            return false;
        }
        // Probe outcome doesn't matter; the gate opens either way.
        manager.warmup();
        self.unlocked = true;
        info!("audio unlocked by user gesture");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::cache::{AssetCache, AudioBuffer};
    use crate::assets::catalog::AssetCatalog;
    use crate::audio::manager::PlaybackManager;
    use crate::audio::output::NullOutput;
    use crate::audio::policy::PlaybackPolicy;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn manager() -> PlaybackManager {
        let cache = Arc::new(AssetCache::new());
        cache.insert(AudioBuffer::new("button-click", vec![0u8; 4]));
        PlaybackManager::new(
            Arc::new(AssetCatalog::builtin()),
            cache,
            PathBuf::from("assets"),
            PlaybackPolicy::default(),
            Box::new(NullOutput),
        )
    }

    #[test]
    fn unlocks_on_first_gesture_only() {
        let mut gate = GestureGate::new();
        let mut mgr = manager();
        assert!(!gate.is_unlocked());

        let click = InputEvent::PointerDown { x: 1.0, y: 1.0 };
        assert!(gate.observe(&click, &mut mgr));
        assert!(gate.is_unlocked());

        // Subsequent gestures do not re-fire the probe.
        assert!(!gate.observe(&click, &mut mgr));
        assert!(!gate.observe(&InputEvent::KeyDown { key: 110 }, &mut mgr));
        assert!(gate.is_unlocked());
    }

    #[test]
    fn non_gesture_events_do_not_unlock() {
        let mut gate = GestureGate::new();
        let mut mgr = manager();

        assert!(!gate.observe(&InputEvent::PointerUp { x: 0.0, y: 0.0 }, &mut mgr));
        assert!(!gate.observe(&InputEvent::Custom { kind: 3 }, &mut mgr));
        assert!(!gate.is_unlocked());
    }
}
