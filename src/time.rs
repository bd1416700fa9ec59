//! Frame clock for the session.
//!
//! Every component in this crate advances once per rendered frame, driven by
//! a single tick carrying elapsed and absolute time. The lifecycle motion
//! uses the per-frame delta in seconds; the particle phase math and the
//! decay tasks use absolute milliseconds.
//!
//! A fixed delta can be installed for deterministic stepping: with it set,
//! both the delta and the absolute clock advance by exactly that amount per
//! frame, independent of wall time. Tests and headless simulations rely on
//! this.

use std::time::Instant;

/// One frame's worth of time, handed to everything that updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Seconds since the previous frame.
    pub delta_secs: f32,
    /// Absolute session time in milliseconds.
    pub now_ms: f64,
}

/// Tracks frame-to-frame timing for a session.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    delta_secs: f32,
    now_ms: f64,
    frame_count: u64,
    fixed_delta: Option<f32>,
}

impl FrameClock {
    /// Create a clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta_secs: 0.0,
            now_ms: 0.0,
            frame_count: 0,
            fixed_delta: None,
        }
    }

    /// Advance to the next frame and return its tick.
    pub fn tick(&mut self) -> FrameTick {
        let now = Instant::now();
        match self.fixed_delta {
            Some(delta) => {
                self.delta_secs = delta;
                self.now_ms += delta as f64 * 1000.0;
            }
            None => {
                self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
                self.now_ms = now.duration_since(self.start).as_secs_f64() * 1000.0;
            }
        }
        self.last_frame = now;
        self.frame_count += 1;
        FrameTick {
            delta_secs: self.delta_secs,
            now_ms: self.now_ms,
        }
    }

    /// Seconds since the previous frame.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Absolute session time in milliseconds, as of the last tick.
    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Frames ticked since the clock started.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Install a fixed per-frame delta for deterministic stepping, or `None`
    /// to return to wall-clock timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
