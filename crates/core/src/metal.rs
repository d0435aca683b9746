//! Metals and the items forged from them.

use serde::{Deserialize, Serialize};

use crate::item::{Size, Weight};

/// Metal tier, gating which anvils and tools can work a metal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetalTier {
    /// Copper and soft metals.
    I,
    /// Bronzes.
    II,
    /// Wrought iron.
    III,
    /// Steel.
    IV,
    /// Black, blue and red steel.
    V,
}

/// Item rarity shown in tooltips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    /// Default rarity.
    Common,
    /// Tier III metals.
    Uncommon,
    /// Tier IV metals.
    Rare,
    /// Tier V metals.
    Epic,
}

impl MetalTier {
    /// Rarity for items made of a metal of this tier.
    pub fn rarity(self) -> Rarity {
        match self {
            MetalTier::I | MetalTier::II => Rarity::Common,
            MetalTier::III => Rarity::Uncommon,
            MetalTier::IV => Rarity::Rare,
            MetalTier::V => Rarity::Epic,
        }
    }
}

/// Workable metals.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metal {
    Bismuth,
    Tin,
    Zinc,
    Gold,
    Silver,
    Copper,
    Bronze,
    BismuthBronze,
    BlackBronze,
    WroughtIron,
    Steel,
    BlackSteel,
    BlueSteel,
    RedSteel,
}

impl Metal {
    /// Every metal, in registration order.
    pub const ALL: [Metal; 14] = [
        Metal::Bismuth,
        Metal::Tin,
        Metal::Zinc,
        Metal::Gold,
        Metal::Silver,
        Metal::Copper,
        Metal::Bronze,
        Metal::BismuthBronze,
        Metal::BlackBronze,
        Metal::WroughtIron,
        Metal::Steel,
        Metal::BlackSteel,
        Metal::BlueSteel,
        Metal::RedSteel,
    ];

    /// Stable name used in registry keys.
    pub fn name(self) -> &'static str {
        match self {
            Metal::Bismuth => "bismuth",
            Metal::Tin => "tin",
            Metal::Zinc => "zinc",
            Metal::Gold => "gold",
            Metal::Silver => "silver",
            Metal::Copper => "copper",
            Metal::Bronze => "bronze",
            Metal::BismuthBronze => "bismuth_bronze",
            Metal::BlackBronze => "black_bronze",
            Metal::WroughtIron => "wrought_iron",
            Metal::Steel => "steel",
            Metal::BlackSteel => "black_steel",
            Metal::BlueSteel => "blue_steel",
            Metal::RedSteel => "red_steel",
        }
    }

    /// Tier of this metal.
    pub fn tier(self) -> MetalTier {
        match self {
            Metal::Bismuth
            | Metal::Tin
            | Metal::Zinc
            | Metal::Gold
            | Metal::Silver
            | Metal::Copper => MetalTier::I,
            Metal::Bronze | Metal::BismuthBronze | Metal::BlackBronze => MetalTier::II,
            Metal::WroughtIron => MetalTier::III,
            Metal::Steel => MetalTier::IV,
            Metal::BlackSteel | Metal::BlueSteel | Metal::RedSteel => MetalTier::V,
        }
    }

    /// Melting temperature in degrees.
    pub fn melt_temp(self) -> f32 {
        match self {
            Metal::Bismuth => 270.0,
            Metal::Tin => 230.0,
            Metal::Zinc => 420.0,
            Metal::Gold => 1060.0,
            Metal::Silver => 961.0,
            Metal::Copper => 1080.0,
            Metal::Bronze => 950.0,
            Metal::BismuthBronze => 985.0,
            Metal::BlackBronze => 1070.0,
            Metal::WroughtIron => 1535.0,
            Metal::Steel => 1540.0,
            Metal::BlackSteel => 1485.0,
            Metal::BlueSteel | Metal::RedSteel => 1540.0,
        }
    }

    /// Specific heat used by heating simulations.
    pub fn specific_heat(self) -> f32 {
        match self {
            Metal::Bismuth | Metal::Gold => 0.14,
            Metal::Tin => 0.21,
            Metal::Zinc => 0.21,
            Metal::Silver => 0.48,
            Metal::Copper => 0.35,
            Metal::Bronze | Metal::BismuthBronze | Metal::BlackBronze => 0.35,
            Metal::WroughtIron
            | Metal::Steel
            | Metal::BlackSteel
            | Metal::BlueSteel
            | Metal::RedSteel => 0.35,
        }
    }

    /// Tool durability; `None` for metals too soft for tools.
    pub fn tool_durability(self) -> Option<u32> {
        match self {
            Metal::Copper => Some(600),
            Metal::Bronze => Some(1300),
            Metal::BismuthBronze => Some(1200),
            Metal::BlackBronze => Some(1460),
            Metal::WroughtIron => Some(2200),
            Metal::Steel => Some(3300),
            Metal::BlackSteel => Some(4200),
            Metal::BlueSteel | Metal::RedSteel => Some(6500),
            _ => None,
        }
    }

    /// Whether tools, tool parts and armor can be made of this metal.
    pub fn is_tool_metal(self) -> bool {
        self.tool_durability().is_some()
    }
}

/// Shapes a metal can take.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetalItem {
    Ingot,
    DoubleIngot,
    Scrap,
    Dust,
    Nugget,
    Sheet,
    DoubleSheet,
    Anvil,
    Tuyere,
    Lamp,
    PickHead,
    Pickaxe,
    ShovelHead,
    Shovel,
    AxeHead,
    Axe,
    HoeHead,
    Hoe,
    HammerHead,
    Hammer,
    KnifeBlade,
    Knife,
    SawBlade,
    Saw,
    UnfinishedHelmet,
    Helmet,
    UnfinishedChestplate,
    Chestplate,
}

impl MetalItem {
    /// Every shape, in registration order.
    pub const ALL: [MetalItem; 28] = [
        MetalItem::Ingot,
        MetalItem::DoubleIngot,
        MetalItem::Scrap,
        MetalItem::Dust,
        MetalItem::Nugget,
        MetalItem::Sheet,
        MetalItem::DoubleSheet,
        MetalItem::Anvil,
        MetalItem::Tuyere,
        MetalItem::Lamp,
        MetalItem::PickHead,
        MetalItem::Pickaxe,
        MetalItem::ShovelHead,
        MetalItem::Shovel,
        MetalItem::AxeHead,
        MetalItem::Axe,
        MetalItem::HoeHead,
        MetalItem::Hoe,
        MetalItem::HammerHead,
        MetalItem::Hammer,
        MetalItem::KnifeBlade,
        MetalItem::Knife,
        MetalItem::SawBlade,
        MetalItem::Saw,
        MetalItem::UnfinishedHelmet,
        MetalItem::Helmet,
        MetalItem::UnfinishedChestplate,
        MetalItem::Chestplate,
    ];

    /// Stable name used in registry keys.
    pub fn name(self) -> &'static str {
        match self {
            MetalItem::Ingot => "ingot",
            MetalItem::DoubleIngot => "double_ingot",
            MetalItem::Scrap => "scrap",
            MetalItem::Dust => "dust",
            MetalItem::Nugget => "nugget",
            MetalItem::Sheet => "sheet",
            MetalItem::DoubleSheet => "double_sheet",
            MetalItem::Anvil => "anvil",
            MetalItem::Tuyere => "tuyere",
            MetalItem::Lamp => "lamp",
            MetalItem::PickHead => "pick_head",
            MetalItem::Pickaxe => "pickaxe",
            MetalItem::ShovelHead => "shovel_head",
            MetalItem::Shovel => "shovel",
            MetalItem::AxeHead => "axe_head",
            MetalItem::Axe => "axe",
            MetalItem::HoeHead => "hoe_head",
            MetalItem::Hoe => "hoe",
            MetalItem::HammerHead => "hammer_head",
            MetalItem::Hammer => "hammer",
            MetalItem::KnifeBlade => "knife_blade",
            MetalItem::Knife => "knife",
            MetalItem::SawBlade => "saw_blade",
            MetalItem::Saw => "saw",
            MetalItem::UnfinishedHelmet => "unfinished_helmet",
            MetalItem::Helmet => "helmet",
            MetalItem::UnfinishedChestplate => "unfinished_chestplate",
            MetalItem::Chestplate => "chestplate",
        }
    }

    /// Metal units recovered when melting an undamaged item.
    pub fn smelt_amount(self) -> u32 {
        match self {
            MetalItem::Nugget => 10,
            MetalItem::Ingot | MetalItem::Scrap | MetalItem::Dust | MetalItem::Lamp => 100,
            MetalItem::DoubleIngot | MetalItem::Sheet => 200,
            MetalItem::DoubleSheet | MetalItem::Tuyere | MetalItem::UnfinishedHelmet => 400,
            MetalItem::Helmet | MetalItem::UnfinishedChestplate => 400,
            MetalItem::Chestplate => 600,
            MetalItem::Anvil => 1400,
            _ => 100,
        }
    }

    /// Whether the item wears down with use.
    pub fn is_tool(self) -> bool {
        matches!(
            self,
            MetalItem::Pickaxe
                | MetalItem::Shovel
                | MetalItem::Axe
                | MetalItem::Hoe
                | MetalItem::Hammer
                | MetalItem::Knife
                | MetalItem::Saw
        )
    }

    /// Whether the item only exists for tool-grade metals.
    pub fn requires_tool_metal(self) -> bool {
        !matches!(
            self,
            MetalItem::Ingot
                | MetalItem::DoubleIngot
                | MetalItem::Scrap
                | MetalItem::Dust
                | MetalItem::Nugget
                | MetalItem::Sheet
                | MetalItem::DoubleSheet
                | MetalItem::Lamp
        )
    }

    /// Inventory size class.
    pub fn size(self) -> Size {
        match self {
            MetalItem::Hammer
            | MetalItem::Ingot
            | MetalItem::Scrap
            | MetalItem::Lamp
            | MetalItem::Tuyere
            | MetalItem::PickHead
            | MetalItem::ShovelHead
            | MetalItem::AxeHead
            | MetalItem::HoeHead
            | MetalItem::HammerHead
            | MetalItem::KnifeBlade
            | MetalItem::Knife
            | MetalItem::SawBlade => Size::Small,
            MetalItem::Saw | MetalItem::Sheet | MetalItem::DoubleSheet => Size::Normal,
            MetalItem::Anvil => Size::Huge,
            MetalItem::Dust => Size::VerySmall,
            MetalItem::Nugget => Size::Tiny,
            _ => Size::Large,
        }
    }

    /// Carry weight class.
    pub fn weight(self) -> Weight {
        match self {
            MetalItem::DoubleSheet
            | MetalItem::Anvil
            | MetalItem::Helmet
            | MetalItem::Chestplate => Weight::Heavy,
            MetalItem::Hoe
            | MetalItem::Dust
            | MetalItem::Nugget
            | MetalItem::Lamp
            | MetalItem::Tuyere
            | MetalItem::UnfinishedHelmet
            | MetalItem::UnfinishedChestplate => Weight::Light,
            _ => Weight::Medium,
        }
    }

    /// Whether several of this item may share a stack.
    pub fn can_stack(self) -> bool {
        matches!(
            self,
            MetalItem::Dust
                | MetalItem::Lamp
                | MetalItem::Anvil
                | MetalItem::Scrap
                | MetalItem::Ingot
                | MetalItem::Sheet
                | MetalItem::Nugget
                | MetalItem::AxeHead
                | MetalItem::HoeHead
                | MetalItem::PickHead
                | MetalItem::SawBlade
                | MetalItem::HammerHead
                | MetalItem::KnifeBlade
                | MetalItem::ShovelHead
                | MetalItem::DoubleIngot
                | MetalItem::DoubleSheet
        )
    }
}

/// Metal units recovered from an item worn down to `damage` of `max_damage`.
///
/// Undamaged or non-tool items return the full amount. Worn tools lose an extra
/// tenth, floored, never below zero.
pub fn smelt_amount(kind: MetalItem, damage: u32, max_damage: Option<u32>) -> u32 {
    let full = kind.smelt_amount();
    let max = match max_damage {
        Some(max) if max > 0 && kind.is_tool() && damage > 0 => max,
        _ => return full,
    };
    // remaining / max - 1/10, kept in integers.
    let numerator = 10 * i64::from(max.saturating_sub(damage)) - i64::from(max);
    if numerator < 0 {
        0
    } else {
        (i64::from(full) * numerator / (10 * i64::from(max))) as u32
    }
}
