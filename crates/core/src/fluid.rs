//! Fluids, fluid stacks and single-fluid tanks.

use serde::{Deserialize, Serialize};

/// Fluid held by one full bucket, in millibuckets.
pub const BUCKET_VOLUME: u32 = 1000;

/// Fluid kinds known to the content set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FluidKind {
    /// Rain and river water.
    FreshWater,
    /// Ocean water.
    SaltWater,
    /// Pickling brine.
    Brine,
    /// Vinegar.
    Vinegar,
    /// Milk.
    Milk,
    /// Limewater used for tanning.
    Limewater,
    /// Tannin extracted from bark.
    Tannin,
    /// Molten rock.
    Lava,
}

impl FluidKind {
    /// Stable name used in configs and records.
    pub fn name(self) -> &'static str {
        match self {
            FluidKind::FreshWater => "fresh_water",
            FluidKind::SaltWater => "salt_water",
            FluidKind::Brine => "brine",
            FluidKind::Vinegar => "vinegar",
            FluidKind::Milk => "milk",
            FluidKind::Limewater => "limewater",
            FluidKind::Tannin => "tannin",
            FluidKind::Lava => "lava",
        }
    }

    /// Temperature in kelvin.
    pub fn temperature(self) -> u32 {
        match self {
            FluidKind::Lava => 1300,
            _ => 300,
        }
    }
}

/// An amount of a single fluid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FluidStack {
    /// Fluid kind.
    pub kind: FluidKind,
    /// Amount in millibuckets.
    pub amount: u32,
}

impl FluidStack {
    /// Create a fluid stack.
    pub fn new(kind: FluidKind, amount: u32) -> Self {
        Self { kind, amount }
    }
}

/// Tank holding at most one fluid kind, never above capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluidTank {
    capacity: u32,
    fluid: Option<FluidStack>,
}

impl FluidTank {
    /// Empty tank with the given capacity.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            fluid: None,
        }
    }

    /// Current contents, `None` when empty.
    pub fn fluid(&self) -> Option<&FluidStack> {
        self.fluid.as_ref()
    }

    /// Amount held.
    pub fn amount(&self) -> u32 {
        self.fluid.map_or(0, |f| f.amount)
    }

    /// Maximum amount the tank can hold.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Free space.
    pub fn space(&self) -> u32 {
        self.capacity - self.amount()
    }

    /// Whether the tank holds nothing.
    pub fn is_empty(&self) -> bool {
        self.fluid.is_none()
    }

    /// Fill from `resource`, returning the accepted amount.
    ///
    /// A different fluid kind than the one already held is refused. With
    /// `execute == false` nothing changes and the would-be amount is returned.
    pub fn fill(&mut self, resource: &FluidStack, execute: bool) -> u32 {
        if resource.amount == 0 {
            return 0;
        }
        if let Some(held) = &self.fluid {
            if held.kind != resource.kind {
                return 0;
            }
        }
        let accepted = resource.amount.min(self.space());
        if execute && accepted > 0 {
            match &mut self.fluid {
                Some(held) => held.amount += accepted,
                None => self.fluid = Some(FluidStack::new(resource.kind, accepted)),
            }
        }
        accepted
    }

    /// Drain up to `max_amount`, returning what was removed.
    pub fn drain(&mut self, max_amount: u32, execute: bool) -> Option<FluidStack> {
        let held = self.fluid?;
        let drained = held.amount.min(max_amount);
        if drained == 0 {
            return None;
        }
        if execute {
            if drained == held.amount {
                self.fluid = None;
            } else if let Some(f) = &mut self.fluid {
                f.amount -= drained;
            }
        }
        Some(FluidStack::new(held.kind, drained))
    }

    /// Replace the contents, clamping to capacity. Zero amounts empty the tank.
    pub fn set_fluid(&mut self, fluid: Option<FluidStack>) {
        self.fluid = fluid
            .filter(|f| f.amount > 0)
            .map(|f| FluidStack::new(f.kind, f.amount.min(self.capacity)));
    }
}
