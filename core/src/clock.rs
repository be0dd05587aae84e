//! Simulation clock: owns frame count, elapsed time, and pause.

use crate::types::{Frame, RunId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub run_id:        RunId,
    pub current_frame: Frame,
    pub elapsed:       Duration,
    /// Time added per frame. This is the `dt` every actor sees.
    pub frame_dt:      Duration,
    pub paused:        bool,
}

impl SimClock {
    pub fn new(run_id: RunId, frame_dt: Duration) -> Self {
        Self {
            run_id,
            current_frame: 0,
            elapsed: Duration::ZERO,
            frame_dt,
            paused: true,
        }
    }

    /// Advance one frame. Returns the new frame number.
    /// Panics if called while paused.
    pub fn advance(&mut self) -> Frame {
        assert!(!self.paused, "advance() called on paused clock");
        self.current_frame += 1;
        self.elapsed += self.frame_dt;
        self.current_frame
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}
