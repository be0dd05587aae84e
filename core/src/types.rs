//! Shared primitive types used across the entire simulation.

/// A simulation frame. One frame = one tick of the per-frame driver.
pub type Frame = u64;

/// The canonical run identifier.
pub type RunId = String;

/// Stable identity of an actor registered with the engine.
///
/// The numeric index seeds the actor's RNG stream, so existing
/// indices must never change. `Custom` is for host- or test-defined
/// actors that are not part of the fishing scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActorSlot {
    Fisherman,
    Line,
    Bobber,
    Fish,
    Custom(u8),
}

impl ActorSlot {
    pub fn index(&self) -> u64 {
        match self {
            Self::Fisherman => 0,
            Self::Line      => 1,
            Self::Bobber    => 2,
            Self::Fish      => 3,
            Self::Custom(n) => 100 + u64::from(*n),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fisherman => "fisherman",
            Self::Line      => "line",
            Self::Bobber    => "bobber",
            Self::Fish      => "fish",
            Self::Custom(_) => "custom",
        }
    }
}
