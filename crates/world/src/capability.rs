//! Capability traits and the block entities that expose them.
//!
//! Automation and screens talk to block entities through [`ItemHandler`] and
//! [`FluidHandler`] rather than concrete types. A handler is bound to the side
//! it was requested from (`None` for the entity's own screen), and the lock
//! rules of the underlying entity decide what that side may do.

use homestead_core::{FluidStack, ItemStack};

use crate::barrel::{Barrel, SLOT_COUNT};
use crate::barrel_recipe::BarrelRecipes;
use crate::block::Facing;
use crate::crop::SpreadingCrop;
use crate::fire_pit::FirePit;

/// Slot-based item access.
pub trait ItemHandler {
    fn slots(&self) -> usize;

    fn stack_in_slot(&self, slot: usize) -> Option<&ItemStack>;

    /// Insert `stack`, returning the part that was not accepted.
    fn insert_item(&mut self, slot: usize, stack: ItemStack, simulate: bool) -> Option<ItemStack>;

    /// Remove up to `amount` items from `slot`.
    fn extract_item(&mut self, slot: usize, amount: u32, simulate: bool) -> Option<ItemStack>;
}

/// Single-tank fluid access.
pub trait FluidHandler {
    fn contents(&self) -> Option<&FluidStack>;

    fn capacity(&self) -> u32;

    /// Returns the amount accepted.
    fn fill(&mut self, resource: &FluidStack, execute: bool) -> u32;

    fn drain(&mut self, max_amount: u32, execute: bool) -> Option<FluidStack>;
}

/// Barrel inventory seen from one side.
pub struct BarrelItems<'a> {
    barrel: &'a mut Barrel,
    side: Option<Facing>,
    recipes: &'a BarrelRecipes,
}

impl<'a> BarrelItems<'a> {
    pub fn new(barrel: &'a mut Barrel, side: Option<Facing>, recipes: &'a BarrelRecipes) -> Self {
        Self {
            barrel,
            side,
            recipes,
        }
    }
}

impl ItemHandler for BarrelItems<'_> {
    fn slots(&self) -> usize {
        SLOT_COUNT
    }

    fn stack_in_slot(&self, slot: usize) -> Option<&ItemStack> {
        self.barrel.slot(slot)
    }

    fn insert_item(&mut self, slot: usize, stack: ItemStack, simulate: bool) -> Option<ItemStack> {
        if simulate {
            let accepted = self.barrel.insert_capacity(slot, &stack, self.side);
            return (accepted < stack.count).then(|| stack.with_count(stack.count - accepted));
        }
        self.barrel.insert(slot, stack, self.side, self.recipes)
    }

    fn extract_item(&mut self, slot: usize, amount: u32, simulate: bool) -> Option<ItemStack> {
        if simulate {
            return self.barrel.peek_extract(slot, amount, self.side);
        }
        self.barrel.extract(slot, amount, self.side)
    }
}

/// Barrel tank seen from one side.
pub struct BarrelFluids<'a> {
    barrel: &'a mut Barrel,
    recipes: &'a BarrelRecipes,
}

impl<'a> BarrelFluids<'a> {
    pub fn new(barrel: &'a mut Barrel, recipes: &'a BarrelRecipes) -> Self {
        Self { barrel, recipes }
    }
}

impl FluidHandler for BarrelFluids<'_> {
    fn contents(&self) -> Option<&FluidStack> {
        self.barrel.fluid()
    }

    fn capacity(&self) -> u32 {
        self.barrel.tank().capacity()
    }

    fn fill(&mut self, resource: &FluidStack, execute: bool) -> u32 {
        if execute {
            self.barrel.fill(resource, self.recipes)
        } else {
            self.barrel.fill_capacity(resource)
        }
    }

    fn drain(&mut self, max_amount: u32, execute: bool) -> Option<FluidStack> {
        self.barrel.drain(max_amount, execute)
    }
}

/// Per-position state for blocks that need more than their block state.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockEntity {
    Barrel(Barrel),
    SpreadingCrop(SpreadingCrop),
    FirePit(FirePit),
}

impl BlockEntity {
    pub fn as_barrel(&self) -> Option<&Barrel> {
        match self {
            BlockEntity::Barrel(barrel) => Some(barrel),
            _ => None,
        }
    }

    pub fn as_barrel_mut(&mut self) -> Option<&mut Barrel> {
        match self {
            BlockEntity::Barrel(barrel) => Some(barrel),
            _ => None,
        }
    }

    pub fn as_crop(&self) -> Option<&SpreadingCrop> {
        match self {
            BlockEntity::SpreadingCrop(crop) => Some(crop),
            _ => None,
        }
    }

    pub fn as_crop_mut(&mut self) -> Option<&mut SpreadingCrop> {
        match self {
            BlockEntity::SpreadingCrop(crop) => Some(crop),
            _ => None,
        }
    }

    pub fn as_fire_pit(&self) -> Option<&FirePit> {
        match self {
            BlockEntity::FirePit(pit) => Some(pit),
            _ => None,
        }
    }

    pub fn as_fire_pit_mut(&mut self) -> Option<&mut FirePit> {
        match self {
            BlockEntity::FirePit(pit) => Some(pit),
            _ => None,
        }
    }

    /// Item access from `side`, if this entity has an inventory.
    pub fn item_handler<'a>(
        &'a mut self,
        side: Option<Facing>,
        recipes: &'a BarrelRecipes,
    ) -> Option<Box<dyn ItemHandler + 'a>> {
        match self {
            BlockEntity::Barrel(barrel) => Some(Box::new(BarrelItems::new(barrel, side, recipes))),
            _ => None,
        }
    }

    /// Fluid access from `side`, if this entity has a tank.
    ///
    /// The barrel tank is reachable from every side.
    pub fn fluid_handler<'a>(
        &'a mut self,
        _side: Option<Facing>,
        recipes: &'a BarrelRecipes,
    ) -> Option<Box<dyn FluidHandler + 'a>> {
        match self {
            BlockEntity::Barrel(barrel) => Some(Box::new(BarrelFluids::new(barrel, recipes))),
            _ => None,
        }
    }
}
