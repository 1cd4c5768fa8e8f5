//! Keyboard input queue
//!
//! Platform code pushes key events as they arrive. The frame runner drains
//! the queue once at the start of every frame, so game code sees a stable
//! batch of input per frame.
//!
//! Events may also be posted for delivery at a later time. A drain only
//! hands out posted events whose delivery time has been reached.

use serde::{Deserialize, Serialize};

/// Keys the engine knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// A key
    A,
    /// D key
    D,
    /// S key
    S,
    /// W key
    W,
    /// Space bar
    Space,
    /// Escape key
    Escape,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
}

/// Whether a key went down or up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAction {
    /// Key pressed
    Press,
    /// Key released
    Release,
}

/// A single key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Key
    pub key: KeyCode,
    /// Transition
    pub action: KeyAction,
}

impl KeyEvent {
    /// Key went down
    pub fn press(key: KeyCode) -> Self {
        Self {
            key,
            action: KeyAction::Press,
        }
    }

    /// Key went up
    pub fn release(key: KeyCode) -> Self {
        Self {
            key,
            action: KeyAction::Release,
        }
    }
}

/// Per-frame keyboard event queue
#[derive(Debug, Default)]
pub struct InputQueue {
    immediate: Vec<KeyEvent>,
    deferred: Vec<(f64, KeyEvent)>,
}

impl InputQueue {
    /// Empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next drain
    pub fn send(&mut self, event: KeyEvent) {
        self.immediate.push(event);
    }

    /// Queue an event for the first drain at or after `delivery_time`
    pub fn post(&mut self, delivery_time: f64, event: KeyEvent) {
        self.deferred.push((delivery_time, event));
    }

    /// Take every event due at `current_time`
    ///
    /// Immediate events come first, then due deferred events in the order
    /// they were posted.
    pub fn drain(&mut self, current_time: f64) -> Vec<KeyEvent> {
        let mut events = std::mem::take(&mut self.immediate);

        let mut i = 0;
        while i < self.deferred.len() {
            if self.deferred[i].0 <= current_time {
                let (_, event) = self.deferred.remove(i);
                events.push(event);
            } else {
                i += 1;
            }
        }
        events
    }

    /// Events still waiting, immediate and deferred
    pub fn pending(&self) -> usize {
        self.immediate.len() + self.deferred.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_queue() {
        let mut queue = InputQueue::new();
        queue.send(KeyEvent::press(KeyCode::A));
        queue.send(KeyEvent::release(KeyCode::A));

        let events = queue.drain(0.0);
        assert_eq!(events, vec![KeyEvent::press(KeyCode::A), KeyEvent::release(KeyCode::A)]);
        assert!(queue.drain(0.0).is_empty());
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_deferred_delivery() {
        let mut queue = InputQueue::new();
        queue.post(2.0, KeyEvent::press(KeyCode::D));
        queue.post(1.0, KeyEvent::press(KeyCode::A));

        assert!(queue.drain(0.5).is_empty());
        assert_eq!(queue.drain(1.0), vec![KeyEvent::press(KeyCode::A)]);
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.drain(5.0), vec![KeyEvent::press(KeyCode::D)]);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_immediate_before_deferred() {
        let mut queue = InputQueue::new();
        queue.post(0.0, KeyEvent::press(KeyCode::W));
        queue.send(KeyEvent::press(KeyCode::S));
        assert_eq!(
            queue.drain(0.0),
            vec![KeyEvent::press(KeyCode::S), KeyEvent::press(KeyCode::W)]
        );
    }
}
