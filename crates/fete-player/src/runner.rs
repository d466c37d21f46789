use fete_engine::{Experience, InputEvent, InputQueue, LoadProgress, Stage, StageEvent};
use tokio::sync::watch;

/// What the runner wants the main loop to do after a line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    Continue,
    Quit,
}

/// Terminal runner that wires the engine to stdin.
///
/// Each typed line becomes engine input: the first keystroke of the
/// session unlocks the audio gate, `r` is the global restart shortcut
/// (handled inside the engine), a bare Enter completes the current stage.
pub struct PlayerRunner {
    experience: Experience,
    input: InputQueue,
}

impl PlayerRunner {
    pub fn new(experience: Experience) -> Self {
        Self {
            experience,
            input: InputQueue::new(),
        }
    }

    /// Kick off preloading; the receiver drives the progress display.
    pub fn start_preload(&self) -> watch::Receiver<LoadProgress> {
        self.experience.start_preload()
    }

    pub fn current_stage(&self) -> Stage {
        self.experience.current_stage()
    }

    pub fn skip_loading(&mut self) {
        self.experience.skip_loading();
    }

    /// Hand off from the loading stage once progress reports completion.
    pub fn finish_loading(&mut self) {
        self.experience.on_preloader_complete();
    }

    /// Map one terminal line to engine input and stage signals.
    pub fn handle_line(&mut self, line: &str) -> LineAction {
        let trimmed = line.trim();

        // Every keystroke is a genuine user gesture; Enter counts too.
        let key = trimmed.chars().next().unwrap_or('\n');
        self.input.push(InputEvent::KeyDown { key: key as u32 });
        self.pump_input();

        match trimmed {
            "q" | "quit" => return LineAction::Quit,
            // Restart is already handled by the engine's reset shortcut.
            "r" | "R" => {}
            "s" | "skip" => self.experience.skip_loading(),
            "" | "n" | "next" => self.experience.on_stage_complete(),
            other => log::debug!("ignoring input: {other}"),
        }
        LineAction::Continue
    }

    /// Stage transitions accumulated since the last poll.
    pub fn poll_events(&mut self) -> Vec<StageEvent> {
        self.experience.drain_stage_events()
    }

    pub fn shutdown(&mut self) {
        self.experience.stop_all_audio();
    }

    fn pump_input(&mut self) {
        for event in self.input.drain() {
            self.experience.handle_input(event);
        }
    }
}
