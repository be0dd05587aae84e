//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through ActorRng instances derived
//! from the single master seed stored on the run record.
//!
//! Each actor gets its own RNG stream, seeded deterministically
//! from (master_seed XOR slot_index * golden ratio). This means:
//!   - Adding a new actor never changes existing actors' streams.
//!   - Each actor's stream is fully reproducible in isolation.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::collections::HashMap;
use std::ops::Range;

use crate::types::ActorSlot;

/// A deterministic RNG for a single actor.
pub struct ActorRng {
    inner: Pcg64Mcg,
}

impl ActorRng {
    /// Create an actor RNG from the master seed and a stable
    /// slot index. The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self { inner: Pcg64Mcg::seed_from_u64(derived_seed) }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f32(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    /// Uniform float in `range`. An empty range, or one whose width is
    /// not finite, yields its start.
    pub fn range_f32(&mut self, range: Range<f32>) -> f32 {
        if range.is_empty() || !(range.end - range.start).is_finite() {
            return range.start;
        }
        self.inner.gen_range(range)
    }

    /// Uniform integer in `range`. An empty range yields its start.
    pub fn range_u64(&mut self, range: Range<u64>) -> u64 {
        if range.is_empty() {
            return range.start;
        }
        self.inner.gen_range(range)
    }
}

/// All actor RNGs for a single run, created lazily per slot and kept
/// for the life of the run so streams advance across ticks.
pub struct RngBank {
    master_seed: u64,
    streams:     HashMap<ActorSlot, ActorRng>,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed, streams: HashMap::new() }
    }

    pub fn for_actor(&mut self, slot: ActorSlot) -> &mut ActorRng {
        let seed = self.master_seed;
        self.streams
            .entry(slot)
            .or_insert_with(|| ActorRng::new(seed, slot.index()))
    }
}
