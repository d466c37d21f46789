/// Input event types the engine understands.
/// Generic — no stage-specific semantics.
#[derive(Debug, Clone, Copy)]
pub enum InputEvent {
    /// A touch/click began at screen coordinates (x, y).
    PointerDown { x: f32, y: f32 },
    /// A touch/click ended at screen coordinates (x, y).
    PointerUp { x: f32, y: f32 },
    /// A key was pressed (Unicode code point).
    KeyDown { key: u32 },
    /// A key was released.
    KeyUp { key: u32 },
    /// A custom event from the view layer (stage controls, buttons).
    Custom { kind: u32 },
}

impl InputEvent {
    /// Whether this event counts as a genuine user gesture for the purpose
    /// of unlocking audio.
    pub fn is_gesture(&self) -> bool {
        matches!(self, InputEvent::PointerDown { .. } | InputEvent::KeyDown { .. })
    }
}

/// A queue of input events.
/// The platform layer writes events; the experience drains them each tick.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    /// Push a new input event from the platform layer.
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Check if there are pending events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain() {
        let mut q = InputQueue::new();
        q.push(InputEvent::PointerDown { x: 10.0, y: 20.0 });
        q.push(InputEvent::KeyDown { key: 32 });
        assert_eq!(q.len(), 2);
        let events = q.drain();
        assert_eq!(events.len(), 2);
        assert!(q.is_empty());
    }

    #[test]
    fn gesture_classification() {
        assert!(InputEvent::PointerDown { x: 0.0, y: 0.0 }.is_gesture());
        assert!(InputEvent::KeyDown { key: 114 }.is_gesture());
        assert!(!InputEvent::PointerUp { x: 0.0, y: 0.0 }.is_gesture());
        assert!(!InputEvent::Custom { kind: 1 }.is_gesture());
    }
}
