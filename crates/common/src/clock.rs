//! Clock and timing utilities for the capture stream.
//!
//! Frames handed to a recorder are stamped relative to a monotonic epoch
//! recorded when the session starts. The compositing loop runs at the
//! display refresh rate while the capture stream samples it at a fixed
//! rate; [`RateController`] decides which composited frames are captured.

use std::time::Instant;

/// A recording clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment recording started).
#[derive(Debug, Clone)]
pub struct RecordingClock {
    /// The instant recording started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl RecordingClock {
    /// Create a new recording clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get nanoseconds elapsed since recording start.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Get seconds elapsed since recording start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at recording start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Nanoseconds between the epoch and `instant` (zero if earlier).
    pub fn ns_since_epoch(&self, instant: Instant) -> u64 {
        instant.saturating_duration_since(self.epoch).as_nanos() as u64
    }

    /// Convert an elapsed nanosecond value to seconds.
    pub fn ns_to_secs(ns: u64) -> f64 {
        ns as f64 / 1_000_000_000.0
    }
}

/// Frame rate controller for sampling the composited canvas.
///
/// Captures are due on a fixed grid anchored at the first tick. A tick
/// up to a fifth of an interval early still counts, so refresh periods that
/// truncate to whole nanoseconds do not skip a slot.
#[derive(Debug)]
pub struct RateController {
    target_interval_ns: u64,
    next_due_ns: Option<u64>,
}

impl RateController {
    /// Create a controller targeting the given Hz rate.
    pub fn new(target_hz: u32) -> Self {
        Self {
            target_interval_ns: 1_000_000_000 / target_hz.max(1) as u64,
            next_due_ns: None,
        }
    }

    /// Check if the next capture slot has been reached.
    /// Returns true and advances the grid if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        let interval = self.target_interval_ns;
        match self.next_due_ns {
            None => {
                self.next_due_ns = Some(current_ns + interval);
                true
            }
            Some(due) if current_ns + interval / 5 >= due => {
                // After a stall, re-anchor instead of bursting to catch up.
                let next = due + interval;
                self.next_due_ns = Some(if current_ns >= next {
                    current_ns + interval
                } else {
                    next
                });
                true
            }
            _ => false,
        }
    }

    /// Target interval in nanoseconds.
    pub fn interval_ns(&self) -> u64 {
        self.target_interval_ns
    }
}
