//! Owned strength-decay tasks for flame effects.
//!
//! A flame has no lifetime of its own: whoever ignites it must ramp its
//! strength down and remove it. That owner creates a [`DecayTask`] next to
//! the flame and ticks it every frame; the task multiplies the strength by a
//! fixed factor on a fixed interval and reports [`DecayState::Finished`]
//! once the strength falls below the teardown threshold. The owner then
//! calls [`DecayTask::cancel`] exactly once and removes the flame.
//!
//! The task is plain frame-driven state, not a timer callback, so tearing
//! down the flame cannot leak a recurring job that references it: a
//! cancelled task never ticks again.

/// Milliseconds between decay applications.
pub const DECAY_INTERVAL_MS: f64 = 20.0;

/// Multiplier applied to the strength at each interval.
pub const DECAY_FACTOR: f32 = 0.9;

/// Strength a freshly ignited destruction flame starts at.
pub const INITIAL_STRENGTH: f32 = 0.3;

/// Below this strength the effect is invisible enough to remove.
pub const TEARDOWN_THRESHOLD: f32 = 0.15;

/// Result of ticking a decay task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayState {
    /// Still fading; apply [`DecayTask::strength`] to the flame.
    Active,
    /// Strength crossed the teardown threshold (or the task was cancelled);
    /// the owner should cancel the task and remove the flame.
    Finished,
}

/// Frame-driven geometric decay of a flame's strength multiplier.
#[derive(Debug)]
pub struct DecayTask {
    strength: f32,
    accumulated_ms: f64,
    last_ms: Option<f64>,
    cancelled: bool,
}

impl DecayTask {
    /// Start a decay from the given strength.
    pub fn new(strength: f32) -> Self {
        Self {
            strength,
            accumulated_ms: 0.0,
            last_ms: None,
            cancelled: false,
        }
    }

    /// The current decayed strength.
    #[inline]
    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Whether the task has been cancelled.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Stop the task permanently. Safe to call more than once.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Advance the task to the given absolute time, applying one decay step
    /// per elapsed interval.
    pub fn tick(&mut self, now_ms: f64) -> DecayState {
        if self.cancelled {
            return DecayState::Finished;
        }
        if let Some(last) = self.last_ms {
            self.accumulated_ms += (now_ms - last).max(0.0);
        }
        self.last_ms = Some(now_ms);

        while self.accumulated_ms >= DECAY_INTERVAL_MS {
            self.accumulated_ms -= DECAY_INTERVAL_MS;
            self.strength *= DECAY_FACTOR;
            if self.strength < TEARDOWN_THRESHOLD {
                return DecayState::Finished;
            }
        }
        DecayState::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decay_applies_per_interval() {
        let mut task = DecayTask::new(1.0);
        assert_eq!(task.tick(0.0), DecayState::Active);
        assert_eq!(task.strength(), 1.0);

        // One interval elapses: one application.
        assert_eq!(task.tick(DECAY_INTERVAL_MS), DecayState::Active);
        assert!((task.strength() - DECAY_FACTOR).abs() < 1e-6);

        // Three more intervals at once: three applications.
        assert_eq!(task.tick(DECAY_INTERVAL_MS * 4.0), DecayState::Active);
        assert!((task.strength() - DECAY_FACTOR.powi(4)).abs() < 1e-6);
    }

    #[test]
    fn test_finishes_below_threshold() {
        let mut task = DecayTask::new(INITIAL_STRENGTH);
        task.tick(0.0);

        let mut now = 0.0;
        let mut ticks = 0;
        loop {
            now += DECAY_INTERVAL_MS;
            ticks += 1;
            match task.tick(now) {
                DecayState::Active => {
                    assert!(task.strength() >= TEARDOWN_THRESHOLD);
                }
                DecayState::Finished => break,
            }
            assert!(ticks < 100, "decay never finished");
        }
        assert!(task.strength() < TEARDOWN_THRESHOLD);
        // 0.3 * 0.9^n < 0.15 first at n = 7.
        assert_eq!(ticks, 7);
    }

    #[test]
    fn test_strength_monotonically_non_increasing() {
        let mut task = DecayTask::new(INITIAL_STRENGTH);
        let mut last = task.strength();
        let mut now = 0.0;
        for _ in 0..50 {
            now += 7.0; // deliberately off-interval cadence
            task.tick(now);
            assert!(task.strength() <= last);
            last = task.strength();
        }
    }

    #[test]
    fn test_cancel_stops_ticking() {
        let mut task = DecayTask::new(1.0);
        task.tick(0.0);
        task.cancel();
        assert!(task.is_cancelled());

        let before = task.strength();
        assert_eq!(task.tick(1000.0), DecayState::Finished);
        assert_eq!(task.strength(), before);

        // Cancelling again is harmless.
        task.cancel();
        assert!(task.is_cancelled());
    }
}
