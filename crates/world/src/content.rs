//! Content registry: every block and item the simulation knows, by key.
//!
//! Built once at startup and passed around by reference. Device blocks that
//! exist once per material (workbenches per wood, anvils per rock) and metal
//! items per metal are indexed so callers can look them up by material
//! instead of through global tables.

use std::collections::BTreeMap;

use homestead_core::{
    CropKind, FoodType, ItemType, Metal, MetalItem, RegistryKey, RockKind, Wood,
};
use thiserror::Error;
use tracing::debug;

use crate::barrel_recipe::BarrelRecipes;
use crate::block::Block;

/// Registration failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("registry key `{0}` is already registered")]
    DuplicateKey(RegistryKey),
    #[error("there can only be one workbench per wood type ({0:?} already has `{1}`)")]
    DuplicateWorkbench(Wood, RegistryKey),
    #[error("there can only be one stone anvil per rock type ({0:?} already has `{1}`)")]
    DuplicateAnvil(RockKind, RegistryKey),
    #[error("{metal:?} cannot be made into {kind:?}: it is not a tool metal")]
    InvalidMetalItem { metal: Metal, kind: MetalItem },
}

/// Blocks and items by key, plus per-material indexes.
#[derive(Debug, Clone, Default)]
pub struct ContentRegistry {
    blocks: BTreeMap<RegistryKey, Block>,
    items: BTreeMap<RegistryKey, ItemType>,
    workbenches: BTreeMap<Wood, RegistryKey>,
    anvils: BTreeMap<RockKind, RegistryKey>,
    metal_items: BTreeMap<(Metal, MetalItem), RegistryKey>,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_block(&mut self, key: RegistryKey, block: Block) -> Result<(), RegistryError> {
        if self.blocks.contains_key(&key) {
            return Err(RegistryError::DuplicateKey(key));
        }
        debug!(%key, "registered block");
        self.blocks.insert(key, block);
        Ok(())
    }

    pub fn register_item(&mut self, key: RegistryKey, item: ItemType) -> Result<(), RegistryError> {
        if self.items.contains_key(&key) {
            return Err(RegistryError::DuplicateKey(key));
        }
        self.items.insert(key, item);
        Ok(())
    }

    /// Register the workbench for `wood`. Only one per wood type.
    pub fn register_workbench(&mut self, wood: Wood) -> Result<RegistryKey, RegistryError> {
        if let Some(existing) = self.workbenches.get(&wood) {
            return Err(RegistryError::DuplicateWorkbench(wood, existing.clone()));
        }
        let key = RegistryKey::homestead(&["workbench", wood.name()]);
        self.register_block(key.clone(), Block::Workbench(wood))?;
        self.register_item(key.clone(), ItemType::Workbench(wood))?;
        self.workbenches.insert(wood, key.clone());
        Ok(key)
    }

    /// Register the stone anvil hammered out of `rock`.
    pub fn register_stone_anvil(&mut self, rock: RockKind) -> Result<RegistryKey, RegistryError> {
        if let Some(existing) = self.anvils.get(&rock) {
            return Err(RegistryError::DuplicateAnvil(rock, existing.clone()));
        }
        let key = RegistryKey::homestead(&["anvil", rock.name()]);
        self.register_block(key.clone(), Block::StoneAnvil(rock))?;
        self.anvils.insert(rock, key.clone());
        Ok(key)
    }

    /// Register a metal item. Tools and armor need a tool metal.
    pub fn register_metal_item(
        &mut self,
        metal: Metal,
        kind: MetalItem,
    ) -> Result<RegistryKey, RegistryError> {
        if kind.requires_tool_metal() && !metal.is_tool_metal() {
            return Err(RegistryError::InvalidMetalItem { metal, kind });
        }
        let key = RegistryKey::homestead(&["metal", metal.name(), kind.name()]);
        self.register_item(key.clone(), ItemType::Metal(metal, kind))?;
        self.metal_items.insert((metal, kind), key.clone());
        Ok(key)
    }

    pub fn block(&self, key: &RegistryKey) -> Option<Block> {
        self.blocks.get(key).copied()
    }

    pub fn item(&self, key: &RegistryKey) -> Option<ItemType> {
        self.items.get(key).copied()
    }

    /// Workbench block registered for `wood`.
    pub fn workbench(&self, wood: Wood) -> Option<Block> {
        self.workbenches.get(&wood).and_then(|key| self.block(key))
    }

    /// Stone anvil block registered for `rock`.
    pub fn stone_anvil(&self, rock: RockKind) -> Option<Block> {
        self.anvils.get(&rock).and_then(|key| self.block(key))
    }

    /// Item registered for a metal/kind pair.
    pub fn metal_item(&self, metal: Metal, kind: MetalItem) -> Option<ItemType> {
        self.metal_items.get(&(metal, kind)).and_then(|key| self.item(key))
    }

    /// Registered blocks in key order.
    pub fn blocks(&self) -> impl Iterator<Item = (&RegistryKey, &Block)> {
        self.blocks.iter()
    }

    /// Registered items in key order.
    pub fn items(&self) -> impl Iterator<Item = (&RegistryKey, &ItemType)> {
        self.items.iter()
    }

    /// Registry key of an item type, if registered.
    pub fn item_key(&self, item: ItemType) -> Option<&RegistryKey> {
        self.items
            .iter()
            .find_map(|(key, registered)| (*registered == item).then_some(key))
    }
}

/// Everything the simulation reads but never mutates while ticking.
#[derive(Debug, Clone, Default)]
pub struct Content {
    pub registry: ContentRegistry,
    pub barrel_recipes: BarrelRecipes,
}

impl Content {
    /// Register the full content set.
    pub fn bootstrap() -> Result<Self, RegistryError> {
        let mut registry = ContentRegistry::new();
        let key = |segments: &[&str]| RegistryKey::homestead(segments);

        registry.register_block(key(&["dirt"]), Block::Dirt)?;
        registry.register_block(key(&["grass"]), Block::Grass)?;
        registry.register_block(key(&["farmland"]), Block::Farmland)?;
        registry.register_block(key(&["fire_pit"]), Block::FirePit { lit: false })?;

        for wood in Wood::ALL {
            registry.register_workbench(wood)?;
            registry.register_block(
                key(&["barrel", wood.name()]),
                Block::Barrel {
                    wood,
                    sealed: false,
                },
            )?;
            registry.register_item(key(&["barrel", wood.name()]), ItemType::Barrel(wood))?;
            registry.register_item(key(&["log", wood.name()]), ItemType::Log(wood))?;
        }

        for rock in RockKind::ALL {
            registry.register_block(key(&["raw", rock.name()]), Block::RawRock(rock))?;
            registry.register_stone_anvil(rock)?;
            registry.register_item(key(&["rock", rock.name()]), ItemType::Rock(rock))?;
        }

        for crop in CropKind::ALL {
            registry.register_item(key(&["seeds", crop.name()]), ItemType::Seeds(crop))?;
            if crop.is_spreading() {
                registry.register_block(
                    key(&["crop", crop.name()]),
                    Block::SpreadingCrop {
                        crop,
                        stage: 0,
                        wild: false,
                    },
                )?;
            }
        }

        for food in [
            FoodType::Wheat,
            FoodType::Tomato,
            FoodType::Pumpkin,
            FoodType::Melon,
            FoodType::Pickle,
            FoodType::Cheese,
        ] {
            registry.register_item(key(&["food", food.name()]), ItemType::Food(food))?;
        }

        registry.register_item(key(&["stick"]), ItemType::Stick)?;
        registry.register_item(key(&["salt"]), ItemType::Salt)?;
        registry.register_item(key(&["fire_starter"]), ItemType::FireStarter)?;
        registry.register_item(key(&["wooden_bucket"]), ItemType::WoodenBucket)?;

        for metal in Metal::ALL {
            for kind in MetalItem::ALL {
                if kind.requires_tool_metal() && !metal.is_tool_metal() {
                    continue;
                }
                registry.register_metal_item(metal, kind)?;
            }
        }

        Ok(Self {
            registry,
            barrel_recipes: BarrelRecipes::defaults()?,
        })
    }
}
