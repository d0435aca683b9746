//! Barrel recipes and the ordered registry they are matched from.
//!
//! A recipe consumes the barrel's fluid and its item slot together. Timed
//! recipes are picked when a barrel is sealed and complete once it has stayed
//! sealed long enough; instant recipes fire as soon as the contents match.
//!
//! Matching scans recipes in registration order and returns the first hit, so
//! when two recipes accept the same contents the one registered first wins.

use homestead_core::calendar::TICKS_PER_HOUR;
use homestead_core::{CropKind, FluidKind, FluidStack, FoodType, ItemStack, ItemType, RegistryKey, RockKind, Wood};
use serde::{Deserialize, Serialize};

use crate::content::RegistryError;

/// Fluid a recipe needs per batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluidIngredient {
    pub kind: FluidKind,
    pub amount: u32,
}

/// Item a recipe needs per batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemIngredient {
    pub item_type: ItemType,
    pub count: u32,
}

/// A fluid + item transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarrelRecipe {
    pub id: RegistryKey,
    pub input_fluid: FluidIngredient,
    /// `None` means the item slot must be empty.
    pub input_item: Option<ItemIngredient>,
    /// Produced per batch. `None` keeps whatever input fluid is left over.
    pub output_fluid: Option<FluidStack>,
    /// Produced per batch. `None` keeps whatever input items are left over.
    pub output_item: Option<ItemStack>,
    /// Ticks the barrel must stay sealed; ignored for instant recipes.
    pub duration: u64,
    pub instant: bool,
}

impl BarrelRecipe {
    /// Recipe that completes after `duration` sealed ticks.
    pub fn timed(
        id: RegistryKey,
        input_fluid: FluidIngredient,
        input_item: Option<ItemIngredient>,
        duration: u64,
    ) -> Self {
        Self {
            id,
            input_fluid,
            input_item,
            output_fluid: None,
            output_item: None,
            duration,
            instant: false,
        }
    }

    /// Recipe applied as soon as the contents match.
    pub fn instant(
        id: RegistryKey,
        input_fluid: FluidIngredient,
        input_item: Option<ItemIngredient>,
    ) -> Self {
        Self {
            instant: true,
            ..Self::timed(id, input_fluid, input_item, 0)
        }
    }

    pub fn with_output_fluid(mut self, fluid: FluidStack) -> Self {
        self.output_fluid = Some(fluid);
        self
    }

    pub fn with_output_item(mut self, item: ItemStack) -> Self {
        self.output_item = Some(item);
        self
    }

    /// Whether the contents satisfy at least one batch of this recipe.
    pub fn matches(&self, fluid: Option<&FluidStack>, item: Option<&ItemStack>) -> bool {
        self.batches(fluid, item) > 0
    }

    /// Number of whole batches the contents allow.
    fn batches(&self, fluid: Option<&FluidStack>, item: Option<&ItemStack>) -> u32 {
        let fluid = match fluid {
            Some(f) if f.kind == self.input_fluid.kind && self.input_fluid.amount > 0 => f,
            _ => return 0,
        };
        let by_fluid = fluid.amount / self.input_fluid.amount;
        match (&self.input_item, item) {
            (None, None) => by_fluid,
            (Some(want), Some(have)) if want.item_type == have.item_type && want.count > 0 => {
                by_fluid.min(have.count / want.count)
            }
            _ => 0,
        }
    }

    /// Contents after applying as many batches as possible.
    ///
    /// Output fluid is clamped to `capacity` and output items to their stack
    /// limit. Input items left over when the recipe produces an item are lost.
    pub fn apply(
        &self,
        fluid: Option<&FluidStack>,
        item: Option<&ItemStack>,
        capacity: u32,
    ) -> (Option<FluidStack>, Option<ItemStack>) {
        let batches = self.batches(fluid, item);

        let fluid_out = match (self.output_fluid, fluid) {
            (Some(out), _) => Some(FluidStack::new(
                out.kind,
                out.amount.saturating_mul(batches).min(capacity),
            )),
            (None, Some(input)) => {
                let left = input.amount - batches * self.input_fluid.amount;
                (left > 0).then(|| FluidStack::new(input.kind, left))
            }
            (None, None) => None,
        };

        let item_out = match (&self.output_item, item) {
            (Some(out), _) => {
                let count = out
                    .count
                    .saturating_mul(batches)
                    .min(out.item_type.max_stack_size());
                Some(out.with_count(count))
            }
            (None, Some(input)) => {
                let used = self.input_item.map_or(0, |want| want.count * batches);
                let left = input.count - used;
                (left > 0).then(|| input.with_count(left))
            }
            (None, None) => None,
        };

        (fluid_out.filter(|f| f.amount > 0), item_out.filter(|i| i.count > 0))
    }
}

/// Registered barrel recipes in registration order.
#[derive(Debug, Clone, Default)]
pub struct BarrelRecipes {
    recipes: Vec<BarrelRecipe>,
}

impl BarrelRecipes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a recipe. Ids must be unique.
    pub fn register(&mut self, recipe: BarrelRecipe) -> Result<(), RegistryError> {
        if self.get(&recipe.id).is_some() {
            return Err(RegistryError::DuplicateKey(recipe.id));
        }
        self.recipes.push(recipe);
        Ok(())
    }

    pub fn get(&self, id: &RegistryKey) -> Option<&BarrelRecipe> {
        self.recipes.iter().find(|r| &r.id == id)
    }

    /// First timed recipe accepting the contents.
    pub fn find(&self, fluid: Option<&FluidStack>, item: Option<&ItemStack>) -> Option<&BarrelRecipe> {
        self.recipes
            .iter()
            .find(|r| !r.instant && r.matches(fluid, item))
    }

    /// First instant recipe accepting the contents.
    pub fn find_instant(
        &self,
        fluid: Option<&FluidStack>,
        item: Option<&ItemStack>,
    ) -> Option<&BarrelRecipe> {
        self.recipes
            .iter()
            .find(|r| r.instant && r.matches(fluid, item))
    }

    pub fn iter(&self) -> impl Iterator<Item = &BarrelRecipe> {
        self.recipes.iter()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Recipes shipped with the content set.
    pub fn defaults() -> Result<Self, RegistryError> {
        let key = |name: &str| RegistryKey::homestead(&[name]);
        let fluid = |kind, amount| FluidIngredient { kind, amount };
        let item = |item_type, count| Some(ItemIngredient { item_type, count });

        let mut recipes = Self::new();
        recipes.register(
            BarrelRecipe::instant(
                key("salt_water"),
                fluid(FluidKind::FreshWater, 1000),
                item(ItemType::Salt, 1),
            )
            .with_output_fluid(FluidStack::new(FluidKind::SaltWater, 1000)),
        )?;
        recipes.register(
            BarrelRecipe::instant(
                key("brine"),
                fluid(FluidKind::Vinegar, 1000),
                item(ItemType::Salt, 1),
            )
            .with_output_fluid(FluidStack::new(FluidKind::Brine, 1000)),
        )?;
        recipes.register(
            BarrelRecipe::timed(
                key("vinegar"),
                fluid(FluidKind::FreshWater, 250),
                item(ItemType::Food(FoodType::Tomato), 1),
                8 * TICKS_PER_HOUR,
            )
            .with_output_fluid(FluidStack::new(FluidKind::Vinegar, 250)),
        )?;
        recipes.register(
            BarrelRecipe::timed(
                key("pickling"),
                fluid(FluidKind::Brine, 500),
                item(ItemType::Food(FoodType::Tomato), 1),
                4 * TICKS_PER_HOUR,
            )
            .with_output_item(ItemStack::new(ItemType::Food(FoodType::Pickle), 1)),
        )?;
        recipes.register(
            BarrelRecipe::timed(
                key("tannin"),
                fluid(FluidKind::FreshWater, 1000),
                item(ItemType::Log(Wood::Oak), 1),
                8 * TICKS_PER_HOUR,
            )
            .with_output_fluid(FluidStack::new(FluidKind::Tannin, 1000)),
        )?;
        recipes.register(
            BarrelRecipe::timed(
                key("limewater"),
                fluid(FluidKind::FreshWater, 500),
                item(ItemType::Rock(RockKind::Limestone), 1),
                TICKS_PER_HOUR,
            )
            .with_output_fluid(FluidStack::new(FluidKind::Limewater, 500)),
        )?;
        recipes.register(
            BarrelRecipe::timed(
                key("cheese"),
                fluid(FluidKind::Milk, 1000),
                item(ItemType::Salt, 1),
                16 * TICKS_PER_HOUR,
            )
            .with_output_item(ItemStack::new(ItemType::Food(FoodType::Cheese), 1)),
        )?;
        recipes.register(
            BarrelRecipe::timed(
                key("seed_soak"),
                fluid(FluidKind::FreshWater, 100),
                item(ItemType::Seeds(CropKind::Pumpkin), 1),
                2 * TICKS_PER_HOUR,
            ),
        )?;
        Ok(recipes)
    }
}
