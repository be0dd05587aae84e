//! Clip playback handle: the slice of an animation mixer the fish needs.
//!
//! Time is in clip seconds. A burst plays the clip `repetitions` times
//! and then stops on its own.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipPlayback {
    pub name:     String,
    duration:     f32,
    time:         f32,
    remaining:    u32,
    playing:      bool,
    completed:    u32,
}

impl ClipPlayback {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration: duration.max(f32::EPSILON),
            time: 0.0,
            remaining: 0,
            playing: false,
            completed: 0,
        }
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
    }

    /// Start playing from the current time for `repetitions` loops (min 1).
    pub fn play(&mut self, repetitions: u32) {
        self.remaining = repetitions.max(1);
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.remaining = 0;
        self.time = 0.0;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Bursts that ran to completion since creation.
    pub fn completed_bursts(&self) -> u32 {
        self.completed
    }

    /// Advance by `dt` clip seconds. Returns true when the burst finished
    /// during this call.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.playing || dt <= 0.0 {
            return false;
        }
        self.time += dt;
        while self.time >= self.duration {
            self.time -= self.duration;
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                self.playing = false;
                self.time = 0.0;
                self.completed += 1;
                return true;
            }
        }
        false
    }
}
