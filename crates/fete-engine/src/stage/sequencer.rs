use log::{debug, info};

/// One named step of the linear narrative, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Preloader,
    Countdown,
    Entry,
    Message,
    WordCloud,
    Balloons,
    Cake,
    Gallery,
    ThankYou,
}

impl Stage {
    /// The fixed stage order.
    pub const ALL: [Stage; 9] = [
        Stage::Preloader,
        Stage::Countdown,
        Stage::Entry,
        Stage::Message,
        Stage::WordCloud,
        Stage::Balloons,
        Stage::Cake,
        Stage::Gallery,
        Stage::ThankYou,
    ];

    /// Where a full restart lands: the stage right after loading.
    pub const FIRST_INTERACTIVE: Stage = Stage::Countdown;

    pub fn name(self) -> &'static str {
        match self {
            Stage::Preloader => "preloader",
            Stage::Countdown => "countdown",
            Stage::Entry => "entry",
            Stage::Message => "message",
            Stage::WordCloud => "wordcloud",
            Stage::Balloons => "balloons",
            Stage::Cake => "cake",
            Stage::Gallery => "gallery",
            Stage::ThankYou => "thankyou",
        }
    }

    fn index(self) -> usize {
        Stage::ALL.iter().position(|&s| s == self).unwrap_or(0)
    }
}

/// Notification emitted by the sequencer for observers (views, audio cues).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    /// A new stage became current. `from` is None for direct jumps.
    Entered { stage: Stage, from: Option<Stage> },
    /// A full restart happened; consumers keyed on the epoch reinitialize.
    Reset { epoch: u64 },
}

/// Finite-state machine over the fixed stage list.
///
/// Advances linearly on explicit completion signals, supports the one-time
/// preloader hand-off jump, and resets to the first interactive stage with
/// a bumped epoch. Emitted events are queued for the caller to drain.
pub struct StageSequencer {
    current: usize,
    reset_epoch: u64,
    events: Vec<StageEvent>,
}

impl StageSequencer {
    pub fn new() -> Self {
        Self {
            current: 0,
            reset_epoch: 0,
            events: Vec::new(),
        }
    }

    pub fn current(&self) -> Stage {
        Stage::ALL[self.current]
    }

    /// Monotonic restart counter; bumps on every `reset`.
    pub fn reset_epoch(&self) -> u64 {
        self.reset_epoch
    }

    /// Whether the narrative is at its terminal stage.
    pub fn is_terminal(&self) -> bool {
        self.current == Stage::ALL.len() - 1
    }

    /// Move to the next stage. No-op at the terminal stage: no wrap, no
    /// error.
    pub fn advance(&mut self) {
        if self.is_terminal() {
            debug!("advance ignored at terminal stage {}", self.current().name());
            return;
        }
        let from = self.current();
        self.current += 1;
        let stage = self.current();
        info!("stage {} -> {}", from.name(), stage.name());
        self.events.push(StageEvent::Entered {
            stage,
            from: Some(from),
        });
    }

    /// Jump directly to a named stage. Used for the one-time hand-off from
    /// loading to the first interactive stage.
    pub fn skip_to(&mut self, stage: Stage) {
        if self.current() == stage {
            return;
        }
        info!("stage jump {} -> {}", self.current().name(), stage.name());
        self.current = stage.index();
        self.events.push(StageEvent::Entered { stage, from: None });
    }

    /// Full restart: back to the first interactive stage (loading is not
    /// repeated) with a new epoch so downstream state reinitializes.
    pub fn reset(&mut self) {
        self.current = Stage::FIRST_INTERACTIVE.index();
        self.reset_epoch += 1;
        info!(
            "reset to {} (epoch {})",
            self.current().name(),
            self.reset_epoch
        );
        self.events.push(StageEvent::Reset {
            epoch: self.reset_epoch,
        });
        self.events.push(StageEvent::Entered {
            stage: self.current(),
            from: None,
        });
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain_events(&mut self) -> Vec<StageEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for StageSequencer {
    fn default() -> Self {
        Self::new()
    }
}
