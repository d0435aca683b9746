//! Spreading crops (pumpkins, melons).
//!
//! A spreading crop grows up to its own ceiling, then starts pushing outward:
//! each growth step picks a random horizontal neighbour and either nudges a
//! neighbouring plant of the same crop higher or plants a new, younger crop
//! on free soil. Every generation carries the age of its parent, and once a
//! plant's age plus its stage reaches [`MAX_SPREAD_AGE`] it stops growing.

use homestead_core::{CropKind, ItemStack, ItemType};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockPos, Facing, MAX_CROP_STAGE};
use crate::capability::BlockEntity;
use crate::level::Level;
use crate::persist::{CropRecord, CROP_RECORD_VERSION};

/// Age at which a spreading crop stops growing.
pub const MAX_SPREAD_AGE: u8 = 16;

/// Stages a freshly placed crop may grow past its starting stage.
const PLACED_GROWTH_SPAN: u8 = 3;

/// Extra stages a child may grow beyond its parent's ceiling.
const CHILD_GROWTH_BONUS: u8 = 2;

/// Block entity of a spreading crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpreadingCrop {
    max_growth_stage: u8,
    base_age: u8,
}

impl SpreadingCrop {
    /// Entity for a crop placed at `stage`.
    pub fn on_placed(stage: u8) -> Self {
        Self {
            max_growth_stage: (PLACED_GROWTH_SPAN + stage).min(MAX_CROP_STAGE),
            base_age: 0,
        }
    }

    pub fn max_growth_stage(&self) -> u8 {
        self.max_growth_stage
    }

    /// Clamped to [`MAX_CROP_STAGE`].
    pub fn set_max_growth_stage(&mut self, stage: u8) {
        self.max_growth_stage = stage.min(MAX_CROP_STAGE);
    }

    pub fn base_age(&self) -> u8 {
        self.base_age
    }

    pub fn set_base_age(&mut self, age: u8) {
        self.base_age = age;
    }

    /// Whether a plant at `stage` is still young enough to grow.
    pub fn can_grow(&self, stage: u8) -> bool {
        u16::from(self.base_age) + u16::from(stage) < u16::from(MAX_SPREAD_AGE)
    }

    pub fn to_record(&self) -> CropRecord {
        CropRecord {
            version: CROP_RECORD_VERSION,
            max_growth_stage: self.max_growth_stage,
            base_age: self.base_age,
        }
    }

    pub fn from_record(record: &CropRecord) -> Self {
        let mut crop = Self::default();
        crop.set_max_growth_stage(record.max_growth_stage);
        crop.set_base_age(record.base_age);
        crop
    }
}

/// What one growth step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthStep {
    /// Too old to grow any further.
    Exhausted,
    Grew { stage: u8 },
    /// Raised the ceiling of a neighbouring plant of the same crop.
    RaisedNeighbour(BlockPos),
    Spread { pos: BlockPos, stage: u8 },
    /// The chosen neighbour had no room.
    Blocked,
}

/// Run one growth step for the spreading crop at `pos`.
///
/// Returns `None` when there is no spreading crop there.
pub fn grow<R: Rng>(level: &mut Level, pos: BlockPos, rng: &mut R) -> Option<GrowthStep> {
    let Block::SpreadingCrop { crop, stage, wild } = level.block(pos) else {
        return None;
    };
    let parent = *level.entity(pos)?.as_crop()?;

    if !parent.can_grow(stage) {
        return Some(GrowthStep::Exhausted);
    }
    if stage < parent.max_growth_stage() {
        let stage = stage + 1;
        level.set_block(pos, Block::SpreadingCrop { crop, stage, wild });
        return Some(GrowthStep::Grew { stage });
    }

    let facing = Facing::HORIZONTALS[rng.gen_range(0..Facing::HORIZONTALS.len())];
    let target = pos.offset(facing);
    let step = match level.block(target) {
        Block::SpreadingCrop { crop: other, .. } if other == crop => {
            match level.entity_mut(target).and_then(BlockEntity::as_crop_mut) {
                Some(neighbour) if neighbour.max_growth_stage() < stage => {
                    neighbour.set_max_growth_stage(neighbour.max_growth_stage() + 1);
                    GrowthStep::RaisedNeighbour(target)
                }
                _ => GrowthStep::Blocked,
            }
        }
        Block::Air if level.block(target.down()).can_sustain_plant() => {
            let child_stage = stage / 2;
            level.set_block(
                target,
                Block::SpreadingCrop {
                    crop,
                    stage: child_stage,
                    wild: false,
                },
            );
            if let Some(child) = level.entity_mut(target).and_then(BlockEntity::as_crop_mut) {
                child.set_max_growth_stage(parent.max_growth_stage() + CHILD_GROWTH_BONUS);
                child.set_base_age(parent.base_age() + stage);
            }
            GrowthStep::Spread {
                pos: target,
                stage: child_stage,
            }
        }
        _ => GrowthStep::Blocked,
    };
    Some(step)
}

/// Items dropped when a crop at `stage` is broken.
pub fn drops(crop: CropKind, stage: u8) -> Vec<ItemStack> {
    let mut items = vec![ItemStack::new(ItemType::Seeds(crop), 1)];
    items.extend(crop.food_drop(stage));
    items
}
