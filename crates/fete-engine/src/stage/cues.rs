//! Per-stage audio cue tables, consulted by the experience on every
//! transition. Pure lookups: no playback happens here.

use crate::assets::catalog::keys;
use crate::stage::sequencer::Stage;

/// The looping background track for a stage, or None for silence.
pub fn background_track(stage: Stage) -> Option<&'static str> {
    match stage {
        Stage::Preloader => None,
        Stage::Countdown | Stage::Entry => Some(keys::AMBIENT_MAGICAL),
        Stage::Message => Some(keys::GENTLE_PIANO),
        Stage::WordCloud => Some(keys::THEME_BIRTHDAY),
        Stage::Balloons | Stage::Cake => Some(keys::CELEBRATION),
        Stage::Gallery => Some(keys::GENTLE_PIANO),
        Stage::ThankYou => Some(keys::THEME_BIRTHDAY),
    }
}

/// The one-shot cue fired when leaving a stage through a normal advance.
pub fn transition_sound(leaving: Stage) -> Option<&'static str> {
    match leaving {
        // The loading hand-off is a jump, not an advance; keep it silent.
        Stage::Preloader => None,
        Stage::Countdown => Some(keys::COUNTDOWN_COMPLETE),
        _ => Some(keys::PAGE_TRANSITION),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preloader_is_silent() {
        assert_eq!(background_track(Stage::Preloader), None);
        assert_eq!(transition_sound(Stage::Preloader), None);
    }

    #[test]
    fn countdown_completion_has_its_own_cue() {
        assert_eq!(
            transition_sound(Stage::Countdown),
            Some(keys::COUNTDOWN_COMPLETE)
        );
        assert_eq!(transition_sound(Stage::Message), Some(keys::PAGE_TRANSITION));
    }

    #[test]
    fn every_interactive_stage_has_a_track() {
        for stage in Stage::ALL.iter().skip(1) {
            assert!(background_track(*stage).is_some(), "{} lacks a track", stage.name());
        }
    }
}
