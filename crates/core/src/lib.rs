#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod calendar;
pub mod fluid;
pub mod item;
pub mod metal;
pub mod registry;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use calendar::{time_and_date, Calendar, Month};
pub use fluid::{FluidKind, FluidStack, FluidTank, BUCKET_VOLUME};
pub use item::{CropKind, FoodType, ItemStack, ItemType, RockKind, Size, Weight, Wood};
pub use metal::{Metal, MetalItem, MetalTier, Rarity};
pub use registry::{RegistryKey, RegistryKeyError};

/// Fixed tick type (20 TPS => 50 ms per tick).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }

    /// Ticks elapsed since `earlier`, saturating at zero.
    pub fn since(self, earlier: SimTick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Helper to derive a reproducible RNG seeded by world + position + tick domains.
pub fn scoped_rng(world_seed: u64, position_hash: u64, tick: SimTick) -> StdRng {
    let seed = world_seed ^ position_hash.rotate_left(17) ^ tick.0.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(seed)
}
