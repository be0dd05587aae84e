use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    error::{SimError, SimResult},
    rng::ActorRng,
};

// ── Sampling ranges ────────────────────────────────────────────────

/// Half-open millisecond range `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MsRange {
    pub min: u64,
    pub max: u64,
}

impl MsRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut ActorRng) -> Duration {
        Duration::from_millis(rng.range_u64(self.min..self.max))
    }
}

/// Half-open float range `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    pub min: f32,
    pub max: f32,
}

impl FloatRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut ActorRng) -> f32 {
        rng.range_f32(self.min..self.max)
    }
}

/// Inclusive count range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub fn sample(&self, rng: &mut ActorRng) -> u32 {
        rng.range_u64(u64::from(self.min)..u64::from(self.max) + 1) as u32
    }
}

/// Highest accepted frame rate. The frame delta must stay well above 0.
pub const MAX_FPS: u32 = 1_000;

/// Longest timer delay accepted from config (one hour).
pub const MAX_DELAY_MS: u64 = 3_600_000;

// ── Frame ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Display refresh rate the driver simulates.
    pub fps: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { fps: 60 }
    }
}

impl FrameConfig {
    pub fn frame_dt(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.fps.max(1)))
    }
}

// ── Fish ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FishConfig {
    pub spawn_position:      Vec3,
    pub scale:               f32,
    /// Height the fish swims at once hooked.
    pub swim_depth:          f32,
    /// World units per second.
    pub speed:               f32,
    /// Strictly-less-than distance to the fisherman that lands the fish.
    pub catch_distance:      f32,
    pub direction_change_ms: MsRange,
    /// Full width of the heading jitter when swimming toward the fisherman.
    pub toward_spread_deg:   f32,
    /// Full width of the heading jitter when fleeing.
    pub away_spread_deg:     f32,
    pub flop_delay_ms:       MsRange,
    pub flop_speed:          FloatRange,
    pub flop_repetitions:    CountRange,
}

impl Default for FishConfig {
    fn default() -> Self {
        Self {
            spawn_position:      Vec3::new(0.0, 2.0, 50.0),
            scale:               1.0,
            swim_depth:          -3.0,
            speed:               20.0,
            catch_distance:      30.0,
            direction_change_ms: MsRange::new(300, 1000),
            toward_spread_deg:   45.0,
            away_spread_deg:     180.0,
            flop_delay_ms:       MsRange::new(400, 2000),
            flop_speed:          FloatRange::new(0.6, 2.0),
            flop_repetitions:    CountRange { min: 1, max: 3 },
        }
    }
}

// ── Fisherman ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FishermanConfig {
    pub position:       Vec3,
    /// Rod tip relative to the fisherman's position (unrotated).
    pub rod_tip_offset: Vec3,
    pub cast_ms:        u64,
    pub fight_ms:       MsRange,
    /// Delay after a catch before the next cast. `None` stays landed.
    pub auto_reset_ms:  Option<u64>,
    /// Reel crank revolutions per second while reeling.
    pub reel_crank_rps: f32,
}

impl Default for FishermanConfig {
    fn default() -> Self {
        Self {
            position:       Vec3::new(0.0, 6.0, 0.0),
            rod_tip_offset: Vec3::new(0.0, 8.0, 4.0),
            cast_ms:        1200,
            fight_ms:       MsRange::new(1500, 3500),
            auto_reset_ms:  Some(5000),
            reel_crank_rps: 2.0,
        }
    }
}

impl FishermanConfig {
    pub fn rod_tip(&self, fisherman: Vec3) -> Vec3 {
        fisherman + self.rod_tip_offset
    }
}

// ── Bobber ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BobberConfig {
    pub cast_distance:   f32,
    pub cast_jitter_deg: f32,
    pub cast_arc_height: f32,
    pub water_level:     f32,
    pub bite_ms:         MsRange,
    pub bob_amplitude:   f32,
    pub bob_hz:          f32,
    pub dip_depth:       f32,
    /// Fraction of the gap to the fish closed per second while dipped.
    pub follow_rate:     f32,
}

impl Default for BobberConfig {
    fn default() -> Self {
        Self {
            cast_distance:   120.0,
            cast_jitter_deg: 20.0,
            cast_arc_height: 25.0,
            water_level:     0.0,
            bite_ms:         MsRange::new(2000, 6000),
            bob_amplitude:   0.3,
            bob_hz:          0.8,
            dip_depth:       2.5,
            follow_rate:     4.0,
        }
    }
}

// ── Line ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    pub segments:    usize,
    pub slack_sag:   f32,
    pub taut_sag:    f32,
    /// Stretch ratio (current / taut-start length) that reads as full tension.
    pub max_stretch: f32,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            segments:    16,
            slack_sag:   6.0,
            taut_sag:    0.5,
            max_stretch: 1.5,
        }
    }
}

// ── Scene ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub frame:     FrameConfig,
    pub fish:      FishConfig,
    pub fisherman: FishermanConfig,
    pub bobber:    BobberConfig,
    pub line:      LineConfig,
}

impl SimConfig {
    /// Load from the data/ directory. Missing fields keep their defaults.
    /// In tests, use SimConfig::default().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/scene/scene_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        let ranges = [
            ("fish.direction_change_ms", self.fish.direction_change_ms),
            ("fish.flop_delay_ms",       self.fish.flop_delay_ms),
            ("fisherman.fight_ms",       self.fisherman.fight_ms),
            ("bobber.bite_ms",           self.bobber.bite_ms),
        ];
        for (name, range) in ranges {
            if range.min > range.max {
                return Err(SimError::Config(format!(
                    "{name}: min {} > max {}", range.min, range.max
                )));
            }
            check_delay(name, range.max)?;
        }
        check_delay("fisherman.cast_ms", self.fisherman.cast_ms)?;
        if let Some(ms) = self.fisherman.auto_reset_ms {
            check_delay("fisherman.auto_reset_ms", ms)?;
        }

        let speed = self.fish.flop_speed;
        check_finite("fish.flop_speed.min", speed.min)?;
        check_finite("fish.flop_speed.max", speed.max)?;
        check_finite("fish.flop_speed width", speed.max - speed.min)?;
        if speed.min > speed.max {
            return Err(SimError::Config("fish.flop_speed: min > max".into()));
        }
        if self.fish.flop_repetitions.min > self.fish.flop_repetitions.max {
            return Err(SimError::Config("fish.flop_repetitions: min > max".into()));
        }

        let scalars = [
            ("fish.scale",               self.fish.scale),
            ("fish.swim_depth",          self.fish.swim_depth),
            ("fish.speed",               self.fish.speed),
            ("fish.catch_distance",      self.fish.catch_distance),
            ("fish.toward_spread_deg",   self.fish.toward_spread_deg),
            ("fish.away_spread_deg",     self.fish.away_spread_deg),
            ("fisherman.reel_crank_rps", self.fisherman.reel_crank_rps),
            ("bobber.cast_distance",     self.bobber.cast_distance),
            ("bobber.cast_jitter_deg",   self.bobber.cast_jitter_deg),
            ("bobber.cast_arc_height",   self.bobber.cast_arc_height),
            ("bobber.water_level",       self.bobber.water_level),
            ("bobber.bob_amplitude",     self.bobber.bob_amplitude),
            ("bobber.bob_hz",            self.bobber.bob_hz),
            ("bobber.dip_depth",         self.bobber.dip_depth),
            ("bobber.follow_rate",       self.bobber.follow_rate),
            ("line.slack_sag",           self.line.slack_sag),
            ("line.taut_sag",            self.line.taut_sag),
            ("line.max_stretch",         self.line.max_stretch),
        ];
        for (name, value) in scalars {
            check_finite(name, value)?;
        }
        let points = [
            ("fish.spawn_position",     self.fish.spawn_position),
            ("fisherman.position",      self.fisherman.position),
            ("fisherman.rod_tip_offset", self.fisherman.rod_tip_offset),
        ];
        for (name, point) in points {
            if !point.is_finite() {
                return Err(SimError::Config(format!("{name} must be finite, got {point}")));
            }
        }

        if self.frame.fps == 0 || self.frame.fps > MAX_FPS {
            return Err(SimError::Config(format!(
                "frame.fps must be in 1..={MAX_FPS}, got {}", self.frame.fps
            )));
        }
        if !(self.fish.catch_distance > 0.0) {
            return Err(SimError::Config("fish.catch_distance must be > 0".into()));
        }
        if self.line.segments == 0 {
            return Err(SimError::Config("line.segments must be > 0".into()));
        }
        Ok(())
    }
}

fn check_finite(name: &str, value: f32) -> SimResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::Config(format!("{name} must be finite, got {value}")))
    }
}

fn check_delay(name: &str, ms: u64) -> SimResult<()> {
    if ms > MAX_DELAY_MS {
        return Err(SimError::Config(format!("{name}: {ms}ms exceeds {MAX_DELAY_MS}ms")));
    }
    Ok(())
}
