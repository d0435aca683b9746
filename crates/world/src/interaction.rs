//! Player activation and block breaking.
//!
//! Activation resolves what a right-click does to a block: toggle a barrel
//! seal, light a fire pit, hammer raw rock into an anvil, or report which
//! screen would open. Screens themselves live outside the simulation.

use homestead_core::{ItemStack, ItemType, Wood};
use tracing::{debug, info};

use crate::barrel::BarrelItemTag;
use crate::block::{Block, BlockPos};
use crate::content::Content;
use crate::crop;
use crate::level::Level;

/// Screens an activation can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Barrel,
    FirePit,
    Crafting,
    Anvil,
}

/// Result of activating a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionResult {
    /// Nothing happened; the held item may be used normally.
    Pass,
    /// The block reacted and the click is used up.
    Consumed,
    OpenScreen(Screen),
}

/// Who is clicking and with what.
#[derive(Debug, Clone, Copy, Default)]
pub struct Activation<'a> {
    pub held: Option<&'a ItemStack>,
    pub sneaking: bool,
}

impl Activation<'_> {
    fn holding(&self, check: impl Fn(ItemType) -> bool) -> bool {
        self.held.is_some_and(|stack| check(stack.item_type))
    }
}

/// Something left behind by a broken block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockDrop {
    Item(ItemStack),
    /// A sealed barrel keeps its contents and seal time.
    SealedBarrel { wood: Wood, tag: BarrelItemTag },
}

impl Level {
    /// Right-click the block at `pos`.
    pub fn activate(
        &mut self,
        pos: BlockPos,
        activation: Activation<'_>,
        content: &Content,
    ) -> InteractionResult {
        match self.block(pos) {
            Block::Barrel { sealed, .. } => {
                if activation.sneaking && activation.held.is_none() {
                    let toggled = if sealed {
                        self.unseal_barrel(pos)
                    } else {
                        self.seal_barrel(pos, &content.barrel_recipes)
                    };
                    return if toggled {
                        InteractionResult::Consumed
                    } else {
                        InteractionResult::Pass
                    };
                }
                InteractionResult::OpenScreen(Screen::Barrel)
            }
            Block::SpreadingCrop { .. } => {
                let mut rng = self.rng_at(pos);
                let step = crop::grow(self, pos, &mut rng);
                debug!(?pos, ?step, "crop grown by hand");
                InteractionResult::Consumed
            }
            Block::FirePit { lit } => {
                if !lit && activation.holding(ItemType::is_fire_starter) {
                    info!(?pos, "fire pit lit");
                    self.set_block(pos, Block::FirePit { lit: true });
                    InteractionResult::Consumed
                } else if activation.sneaking {
                    InteractionResult::Pass
                } else {
                    InteractionResult::OpenScreen(Screen::FirePit)
                }
            }
            Block::Workbench(_) => InteractionResult::OpenScreen(Screen::Crafting),
            Block::StoneAnvil(_) => InteractionResult::OpenScreen(Screen::Anvil),
            Block::RawRock(rock) if activation.holding(ItemType::is_hammer) => {
                match content.registry.stone_anvil(rock) {
                    Some(anvil) => {
                        self.set_block(pos, anvil);
                        InteractionResult::OpenScreen(Screen::Anvil)
                    }
                    None => InteractionResult::Pass,
                }
            }
            _ => InteractionResult::Pass,
        }
    }

    /// Break the block at `pos`, returning what it drops.
    pub fn break_block(&mut self, pos: BlockPos) -> Vec<BlockDrop> {
        let block = self.block(pos);
        let mut drops = Vec::new();
        match block {
            Block::Barrel { wood, sealed } => {
                if let Some(barrel) = self.barrel_mut(pos) {
                    if sealed {
                        drops.push(BlockDrop::SealedBarrel {
                            wood,
                            tag: barrel.to_item_tag(),
                        });
                    } else {
                        drops.extend(barrel.take_items().into_iter().map(BlockDrop::Item));
                        drops.push(BlockDrop::Item(ItemStack::new(ItemType::Barrel(wood), 1)));
                    }
                }
            }
            Block::SpreadingCrop { crop, stage, .. } => {
                drops.extend(crop::drops(crop, stage).into_iter().map(BlockDrop::Item));
            }
            Block::Workbench(wood) => {
                drops.push(BlockDrop::Item(ItemStack::new(ItemType::Workbench(wood), 1)));
            }
            Block::RawRock(rock) | Block::StoneAnvil(rock) => {
                drops.push(BlockDrop::Item(ItemStack::new(ItemType::Rock(rock), 1)));
            }
            _ => {}
        }
        self.set_block(pos, Block::Air);
        drops
    }
}
