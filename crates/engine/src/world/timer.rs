use std::fmt;
use std::rc::Rc;

use crate::level::Level;

/// Tolerance for intervals that are not exactly representable in `f32`.
const FIRE_EPSILON: f32 = 1e-5;

pub type TimerAction = Rc<dyn Fn(&mut Level)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

struct TimedEvent {
    id: TimerId,
    interval: f32,
    repeat: bool,
    elapsed: f32,
    action: TimerAction,
}

/// Timed events that accrue only while the level is playing.
#[derive(Default)]
pub struct Timer {
    events: Vec<TimedEvent>,
    next_id: u64,
}

impl Timer {
    pub fn add(&mut self, interval: f32, repeat: bool, action: TimerAction) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.events.push(TimedEvent {
            id,
            interval: interval.max(0.0),
            repeat,
            elapsed: 0.0,
            action,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.events.len();
        self.events.retain(|event| event.id != id);
        self.events.len() != before
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn elapsed(&self, id: TimerId) -> Option<f32> {
        self.events
            .iter()
            .find(|event| event.id == id)
            .map(|event| event.elapsed)
    }

    /// Accrues `dt` on every event and returns the actions due this step.
    pub(crate) fn advance(&mut self, dt: f32) -> Vec<TimerAction> {
        let mut due = Vec::new();
        self.events.retain_mut(|event| {
            event.elapsed += dt;
            if event.elapsed + FIRE_EPSILON < event.interval {
                return true;
            }
            due.push(Rc::clone(&event.action));
            if event.repeat {
                event.elapsed = (event.elapsed - event.interval).max(0.0);
                true
            } else {
                false
            }
        });
        due
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("events", &self.events.len())
            .finish()
    }
}
