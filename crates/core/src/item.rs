//! Item system - food, seeds, metal goods, wooden devices and fluid containers

use serde::{Deserialize, Serialize};

use crate::fluid::{FluidStack, BUCKET_VOLUME};
use crate::metal::{Metal, MetalItem};

/// Wood types. Each one gets its own workbench and barrel.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wood {
    Oak,
    Birch,
    Chestnut,
    Maple,
    Pine,
    Willow,
}

impl Wood {
    /// Every wood type, in registration order.
    pub const ALL: [Wood; 6] = [
        Wood::Oak,
        Wood::Birch,
        Wood::Chestnut,
        Wood::Maple,
        Wood::Pine,
        Wood::Willow,
    ];

    /// Stable name used in registry keys.
    pub fn name(self) -> &'static str {
        match self {
            Wood::Oak => "oak",
            Wood::Birch => "birch",
            Wood::Chestnut => "chestnut",
            Wood::Maple => "maple",
            Wood::Pine => "pine",
            Wood::Willow => "willow",
        }
    }
}

/// Rock types. Raw rock of each type can be hammered into a stone anvil.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RockKind {
    Granite,
    Diorite,
    Gabbro,
    Basalt,
    Limestone,
    Shale,
}

impl RockKind {
    /// Every rock type, in registration order.
    pub const ALL: [RockKind; 6] = [
        RockKind::Granite,
        RockKind::Diorite,
        RockKind::Gabbro,
        RockKind::Basalt,
        RockKind::Limestone,
        RockKind::Shale,
    ];

    /// Stable name used in registry keys.
    pub fn name(self) -> &'static str {
        match self {
            RockKind::Granite => "granite",
            RockKind::Diorite => "diorite",
            RockKind::Gabbro => "gabbro",
            RockKind::Basalt => "basalt",
            RockKind::Limestone => "limestone",
            RockKind::Shale => "shale",
        }
    }
}

/// Crops. Pumpkins and melons spread to neighbouring blocks once mature.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropKind {
    Wheat,
    Tomato,
    Pumpkin,
    Melon,
}

impl CropKind {
    /// Every crop, in registration order.
    pub const ALL: [CropKind; 4] = [
        CropKind::Wheat,
        CropKind::Tomato,
        CropKind::Pumpkin,
        CropKind::Melon,
    ];

    /// Stable name used in registry keys.
    pub fn name(self) -> &'static str {
        match self {
            CropKind::Wheat => "wheat",
            CropKind::Tomato => "tomato",
            CropKind::Pumpkin => "pumpkin",
            CropKind::Melon => "melon",
        }
    }

    /// Whether the crop grows as a spreading vine.
    pub fn is_spreading(self) -> bool {
        matches!(self, CropKind::Pumpkin | CropKind::Melon)
    }

    /// Food harvested from this crop.
    pub fn food(self) -> FoodType {
        match self {
            CropKind::Wheat => FoodType::Wheat,
            CropKind::Tomato => FoodType::Tomato,
            CropKind::Pumpkin => FoodType::Pumpkin,
            CropKind::Melon => FoodType::Melon,
        }
    }

    /// First growth stage that yields food.
    pub fn ripe_stage(self) -> u8 {
        match self {
            CropKind::Wheat | CropKind::Tomato => 7,
            CropKind::Pumpkin | CropKind::Melon => 6,
        }
    }

    /// Food dropped when harvested at `stage`, if any.
    pub fn food_drop(self, stage: u8) -> Option<ItemStack> {
        if stage < self.ripe_stage() {
            return None;
        }
        let count = match self {
            CropKind::Wheat => 2,
            CropKind::Tomato => 3,
            CropKind::Pumpkin | CropKind::Melon => 1 + u32::from(stage - self.ripe_stage()),
        };
        Some(ItemStack::new(ItemType::Food(self.food()), count))
    }
}

/// Food items.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodType {
    Wheat,
    Tomato,
    Pumpkin,
    Melon,
    Pickle,
    Cheese,
}

impl FoodType {
    /// Stable name used in registry keys.
    pub fn name(self) -> &'static str {
        match self {
            FoodType::Wheat => "wheat",
            FoodType::Tomato => "tomato",
            FoodType::Pumpkin => "pumpkin",
            FoodType::Melon => "melon",
            FoodType::Pickle => "pickle",
            FoodType::Cheese => "cheese",
        }
    }
}

/// Inventory size class; bounds how many items fit in a stack.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Size {
    Tiny,
    VerySmall,
    Small,
    Normal,
    Large,
    VeryLarge,
    Huge,
}

impl Size {
    /// Largest stack for stackable items of this size.
    pub fn stack_limit(self) -> u32 {
        match self {
            Size::Tiny | Size::VerySmall => 64,
            Size::Small => 32,
            Size::Normal => 16,
            Size::Large => 8,
            Size::VeryLarge => 4,
            Size::Huge => 1,
        }
    }
}

/// Carry weight class.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weight {
    Light,
    Medium,
    Heavy,
}

/// Item type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemType {
    /// Edible item
    Food(FoodType),
    /// Seeds planting a crop
    Seeds(CropKind),
    /// Metal ingot, sheet, tool or armor piece
    Metal(Metal, MetalItem),
    /// Log of a wood type
    Log(Wood),
    /// Stick
    Stick,
    /// Salt
    Salt,
    /// Bow drill used to light fires
    FireStarter,
    /// Bucket holding up to one bucket of fluid
    WoodenBucket,
    /// Barrel block item
    Barrel(Wood),
    /// Workbench block item
    Workbench(Wood),
    /// Loose rock
    Rock(RockKind),
}

impl ItemType {
    /// Inventory size class.
    pub fn size(self) -> Size {
        match self {
            ItemType::Metal(_, kind) => kind.size(),
            ItemType::Seeds(_) | ItemType::Salt => Size::Tiny,
            ItemType::Food(_) | ItemType::Stick | ItemType::Rock(_) => Size::Small,
            ItemType::FireStarter | ItemType::WoodenBucket => Size::Normal,
            ItemType::Log(_) => Size::Large,
            ItemType::Barrel(_) | ItemType::Workbench(_) => Size::Huge,
        }
    }

    /// Carry weight class.
    pub fn weight(self) -> Weight {
        match self {
            ItemType::Metal(_, kind) => kind.weight(),
            ItemType::Barrel(_) | ItemType::Workbench(_) => Weight::Heavy,
            ItemType::Log(_) | ItemType::Rock(_) => Weight::Medium,
            _ => Weight::Light,
        }
    }

    /// Whether several of this item may share a stack.
    pub fn can_stack(self) -> bool {
        match self {
            ItemType::Metal(_, kind) => kind.can_stack(),
            ItemType::FireStarter | ItemType::WoodenBucket => false,
            _ => true,
        }
    }

    /// Maximum number of items in one stack.
    pub fn max_stack_size(self) -> u32 {
        if self.can_stack() {
            self.size().stack_limit()
        } else {
            1
        }
    }

    /// Durability for items that wear down.
    pub fn max_damage(self) -> Option<u32> {
        match self {
            ItemType::Metal(metal, kind) if kind.is_tool() => metal.tool_durability(),
            ItemType::FireStarter => Some(8),
            _ => None,
        }
    }

    /// Fluid capacity for items that carry fluid.
    pub fn fluid_capacity(self) -> Option<u32> {
        match self {
            ItemType::WoodenBucket => Some(BUCKET_VOLUME),
            _ => None,
        }
    }

    /// Whether the item can hold fluid.
    pub fn is_fluid_container(self) -> bool {
        self.fluid_capacity().is_some()
    }

    /// Whether the item works as a hammer.
    pub fn is_hammer(self) -> bool {
        matches!(self, ItemType::Metal(_, MetalItem::Hammer))
    }

    /// Whether the item can light a fire.
    pub fn is_fire_starter(self) -> bool {
        matches!(self, ItemType::FireStarter)
    }
}

/// An item stack in inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Type of item
    pub item_type: ItemType,
    /// Quantity in stack
    pub count: u32,
    /// Wear on damageable items
    #[serde(default)]
    pub damage: u32,
    /// Contents of fluid containers
    #[serde(default)]
    pub fluid: Option<FluidStack>,
}

impl ItemStack {
    /// Create a new item stack
    pub fn new(item_type: ItemType, count: u32) -> Self {
        Self {
            item_type,
            count,
            damage: 0,
            fluid: None,
        }
    }

    /// Single fluid container holding `fluid`.
    pub fn filled(item_type: ItemType, fluid: FluidStack) -> Self {
        Self {
            fluid: Some(fluid),
            ..Self::new(item_type, 1)
        }
    }

    /// Whether `other` can merge into this stack.
    pub fn can_merge(&self, other: &ItemStack) -> bool {
        self.item_type == other.item_type
            && self.item_type.can_stack()
            && self.damage == other.damage
            && self.fluid == other.fluid
    }

    /// Room left before the stack is full.
    pub fn space(&self) -> u32 {
        self.item_type.max_stack_size().saturating_sub(self.count)
    }

    /// Split off up to `amount` items, leaving the rest in place.
    ///
    /// Returns `None` when nothing could be split.
    pub fn split(&mut self, amount: u32) -> Option<ItemStack> {
        let taken = amount.min(self.count);
        if taken == 0 {
            return None;
        }
        self.count -= taken;
        Some(ItemStack {
            count: taken,
            ..self.clone()
        })
    }

    /// Copy of this stack with a different count.
    pub fn with_count(&self, count: u32) -> ItemStack {
        ItemStack {
            count,
            ..self.clone()
        }
    }

    /// Metal units recovered when this stack is melted.
    pub fn smelt_amount(&self) -> Option<u32> {
        match self.item_type {
            ItemType::Metal(_, kind) => Some(
                crate::metal::smelt_amount(kind, self.damage, self.item_type.max_damage())
                    * self.count,
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluid::FluidKind;

    #[test]
    fn buckets_do_not_stack() {
        assert_eq!(ItemType::WoodenBucket.max_stack_size(), 1);
        assert!(ItemType::WoodenBucket.is_fluid_container());
        assert!(!ItemType::Stick.is_fluid_container());
    }

    #[test]
    fn stack_limits_follow_size() {
        assert_eq!(ItemType::Seeds(CropKind::Wheat).max_stack_size(), 64);
        assert_eq!(ItemType::Food(FoodType::Pickle).max_stack_size(), 32);
        assert_eq!(ItemType::Log(Wood::Oak).max_stack_size(), 8);
        assert_eq!(ItemType::Barrel(Wood::Oak).max_stack_size(), 1);
        assert_eq!(
            ItemType::Metal(Metal::Copper, MetalItem::Ingot).max_stack_size(),
            32
        );
        assert_eq!(
            ItemType::Metal(Metal::Copper, MetalItem::Pickaxe).max_stack_size(),
            1
        );
    }

    #[test]
    fn filled_buckets_only_merge_with_identical_contents() {
        let water = ItemStack::filled(
            ItemType::WoodenBucket,
            FluidStack::new(FluidKind::FreshWater, 1000),
        );
        let empty = ItemStack::new(ItemType::WoodenBucket, 1);
        assert!(!water.can_merge(&empty));
        let a = ItemStack::new(ItemType::Salt, 3);
        let b = ItemStack::new(ItemType::Salt, 5);
        assert!(a.can_merge(&b));
    }

    #[test]
    fn split_leaves_remainder() {
        let mut stack = ItemStack::new(ItemType::Stick, 5);
        let taken = stack.split(3).expect("split");
        assert_eq!(taken.count, 3);
        assert_eq!(stack.count, 2);
        assert!(stack.split(0).is_none());
    }

    #[test]
    fn crop_food_drops_when_ripe() {
        assert!(CropKind::Pumpkin.food_drop(5).is_none());
        let drop = CropKind::Pumpkin.food_drop(7).expect("ripe");
        assert_eq!(drop.item_type, ItemType::Food(FoodType::Pumpkin));
        assert_eq!(drop.count, 2);
        assert!(CropKind::Melon.is_spreading());
        assert!(!CropKind::Wheat.is_spreading());
    }

    #[test]
    fn worn_tools_melt_for_less() {
        let mut pick = ItemStack::new(ItemType::Metal(Metal::Copper, MetalItem::Pickaxe), 1);
        assert_eq!(pick.smelt_amount(), Some(100));
        pick.damage = 300;
        assert_eq!(pick.smelt_amount(), Some(40));
        assert_eq!(ItemStack::new(ItemType::Stick, 1).smelt_amount(), None);
    }
}
