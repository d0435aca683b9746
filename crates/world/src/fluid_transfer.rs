//! Moving fluid between container items and a tank.
//!
//! Containers move whole loads: a bucket is either emptied completely into
//! the tank or filled completely from it. The used container goes to an
//! output slot, which must be free.

use homestead_core::{FluidTank, ItemStack};

/// Outcome of a successful transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct FluidTransfer {
    /// What is left in the input slot.
    pub remaining_input: Option<ItemStack>,
    /// Container to place in the output slot.
    pub output: ItemStack,
}

/// Pour one filled container from `input` into `tank`.
pub fn empty_container_into_tank(
    input: &ItemStack,
    tank: &mut FluidTank,
    output_slot: Option<&ItemStack>,
) -> Option<FluidTransfer> {
    let fluid = input.fluid.filter(|f| f.amount > 0)?;
    if !input.item_type.is_fluid_container() || output_slot.is_some() {
        return None;
    }
    if tank.fill(&fluid, false) != fluid.amount {
        return None;
    }
    tank.fill(&fluid, true);

    let mut emptied = input.with_count(1);
    emptied.fluid = None;
    Some(FluidTransfer {
        remaining_input: remainder(input),
        output: emptied,
    })
}

/// Fill one empty container from `input` out of `tank`.
pub fn fill_container_from_tank(
    input: &ItemStack,
    tank: &mut FluidTank,
    output_slot: Option<&ItemStack>,
) -> Option<FluidTransfer> {
    let capacity = input.item_type.fluid_capacity()?;
    if input.fluid.is_some() || output_slot.is_some() || tank.amount() < capacity {
        return None;
    }
    let drained = tank.drain(capacity, true)?;

    let mut filled = input.with_count(1);
    filled.fluid = Some(drained);
    Some(FluidTransfer {
        remaining_input: remainder(input),
        output: filled,
    })
}

fn remainder(input: &ItemStack) -> Option<ItemStack> {
    (input.count > 1).then(|| input.with_count(input.count - 1))
}
