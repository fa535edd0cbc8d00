//! One-shot delayed tasks
//!
//! Every deferred effect in the game (combo lapse, text expiry, caught-object
//! removal, alarm flash, reward reveal, the level clock) is a keyed task on
//! this scheduler. A key is pending at most once: scheduling it again moves
//! the deadline, cancelling drops it.

/// Identifies a pending task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKey {
    /// Reset the combo counter
    ComboDecay,
    /// Drop a floating score text
    ExpireText(u32),
    /// Drop a caught object from the field
    RemoveObject(u32),
    /// Clear the alarm flash
    AlarmOff,
    /// Move from the win screen to the reward box
    RevealReward,
    /// One second of the level clock
    ClockTick,
}

#[derive(Debug, Clone, Copy)]
struct Task {
    key: TimerKey,
    due_ms: f64,
    seq: u64,
}

/// Deadline-ordered task set driven by the frame clock
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    tasks: Vec<Task>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `key` at `due_ms`, replacing any pending task with the same key
    pub fn schedule(&mut self, key: TimerKey, due_ms: f64) {
        self.cancel(key);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.push(Task { key, due_ms, seq });
    }

    /// Drop the pending task for `key`, if any
    pub fn cancel(&mut self, key: TimerKey) {
        self.tasks.retain(|t| t.key != key);
    }

    /// Drop every pending task
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn is_pending(&self, key: TimerKey) -> bool {
        self.tasks.iter().any(|t| t.key == key)
    }

    /// Deadline of the pending task for `key`
    pub fn due(&self, key: TimerKey) -> Option<f64> {
        self.tasks.iter().find(|t| t.key == key).map(|t| t.due_ms)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Remove and return the earliest task due at or before `now_ms`.
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<(TimerKey, f64)> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= now_ms)
            .min_by(|(_, a), (_, b)| {
                a.due_ms
                    .partial_cmp(&b.due_ms)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.seq.cmp(&b.seq))
            })
            .map(|(i, _)| i)?;
        let task = self.tasks.remove(idx);
        Some((task.key, task.due_ms))
    }
}
