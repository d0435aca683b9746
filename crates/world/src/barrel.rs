//! Sealable barrel: a fluid tank plus three item slots that runs recipes.
//!
//! An unsealed barrel accepts fluid and items freely. Sealing it locks the
//! tank and the item slot and picks the timed recipe matching the contents;
//! once the barrel has stayed sealed for longer than the recipe's duration the
//! recipe is re-checked against the contents and, if it still matches,
//! applied. Instant recipes are applied whenever an insert or fill leaves the
//! barrel holding matching contents.
//!
//! Every ten ticks a fluid container in the input slot is emptied into the
//! tank or filled from it, sealed or not. While unsealed, rain tops the tank
//! up with fresh water.
//!
//! Mutations never fail loudly: a rejected operation hands the input back and
//! leaves the barrel unchanged. State changes the host should broadcast are
//! queued as [`BarrelEvent`]s and collected with [`Barrel::drain_events`].

use homestead_core::{
    time_and_date, FluidKind, FluidStack, FluidTank, ItemStack, RegistryKey, SimTick,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::barrel_recipe::BarrelRecipes;
use crate::block::Facing;
use crate::fluid_transfer::{empty_container_into_tank, fill_container_from_tank};
use crate::persist::{BarrelRecord, BARREL_RECORD_VERSION};

/// Slot taking full or empty fluid containers.
pub const SLOT_FLUID_CONTAINER_IN: usize = 0;
/// Slot receiving containers after a transfer.
pub const SLOT_FLUID_CONTAINER_OUT: usize = 1;
/// Slot holding the recipe item.
pub const SLOT_ITEM: usize = 2;
/// Number of item slots.
pub const SLOT_COUNT: usize = 3;

/// Tank capacity in millibuckets.
pub const TANK_CAPACITY: u32 = 10_000;
/// Fluids this hot or hotter are refused.
pub const MAX_FLUID_TEMPERATURE: u32 = 500;
/// Ticks between passive container transfers.
pub const TRANSFER_INTERVAL_TICKS: u32 = 10;
/// Fresh water added per transfer interval while rained on.
pub const RAIN_FILL_AMOUNT: u32 = 10;

/// Where a barrel is in its recipe lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrelPhase {
    Unsealed,
    /// Sealed, with no recipe or a recipe that is not yet due.
    SealedPending,
    /// Sealed with a recipe the next update will resolve.
    SealedDue,
}

/// Something the host should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BarrelEvent {
    /// Tank or slots changed.
    ContentsChanged,
    Sealed {
        recipe: Option<RegistryKey>,
        sealed_calendar_tick: u64,
    },
    Unsealed {
        dropped_recipe: Option<RegistryKey>,
    },
    InstantRecipe(RegistryKey),
    RecipeCompleted(RegistryKey),
    /// The recipe was due but the contents no longer matched it.
    RecipeDiscarded(RegistryKey),
}

/// Which slots and tank operations are open, given the seal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockPolicy {
    sealed: bool,
}

impl LockPolicy {
    pub fn new(sealed: bool) -> Self {
        Self { sealed }
    }

    /// Side-less inserts come from the barrel's own screen and may target the
    /// output slot.
    pub fn can_insert(self, slot: usize, stack: &ItemStack, side: Option<Facing>) -> bool {
        !self.sealed
            && (is_item_valid(slot, stack) || (side.is_none() && slot == SLOT_FLUID_CONTAINER_OUT))
    }

    pub fn can_extract(self, slot: usize, side: Option<Facing>) -> bool {
        if self.sealed {
            slot == SLOT_FLUID_CONTAINER_OUT
        } else {
            side.is_none() || slot != SLOT_FLUID_CONTAINER_IN
        }
    }

    pub fn can_fill(self, fluid: &FluidStack) -> bool {
        !self.sealed && fluid.kind.temperature() < MAX_FLUID_TEMPERATURE
    }

    pub fn can_drain(self) -> bool {
        !self.sealed
    }
}

/// Whether `stack` belongs in `slot` at all.
pub fn is_item_valid(slot: usize, stack: &ItemStack) -> bool {
    match slot {
        SLOT_ITEM => true,
        SLOT_FLUID_CONTAINER_IN => stack.item_type.is_fluid_container(),
        _ => false,
    }
}

/// Inputs to [`Barrel::update`].
#[derive(Debug, Clone, Copy)]
pub struct BarrelTickEnv<'a> {
    pub now: SimTick,
    /// Whether rain reaches the block above the barrel.
    pub raining_above: bool,
    pub recipes: &'a BarrelRecipes,
}

/// Barrel contents carried by the item a sealed barrel drops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarrelItemTag {
    pub tank: Option<FluidStack>,
    pub inventory: Vec<Option<ItemStack>>,
    pub sealed_tick: SimTick,
    pub sealed_calendar_tick: u64,
}

/// Barrel block entity.
#[derive(Debug, Clone)]
pub struct Barrel {
    tank: FluidTank,
    slots: [Option<ItemStack>; SLOT_COUNT],
    sealed: bool,
    sealed_tick: SimTick,
    sealed_calendar_tick: u64,
    recipe: Option<RegistryKey>,
    tick_counter: u32,
    events: Vec<BarrelEvent>,
}

impl PartialEq for Barrel {
    fn eq(&self, other: &Self) -> bool {
        self.tank == other.tank
            && self.slots == other.slots
            && self.sealed == other.sealed
            && self.sealed_tick == other.sealed_tick
            && self.sealed_calendar_tick == other.sealed_calendar_tick
            && self.recipe == other.recipe
            && self.tick_counter == other.tick_counter
    }
}

impl Default for Barrel {
    fn default() -> Self {
        Self::new()
    }
}

impl Barrel {
    /// Empty, unsealed barrel.
    pub fn new() -> Self {
        Self {
            tank: FluidTank::new(TANK_CAPACITY),
            slots: [None, None, None],
            sealed: false,
            sealed_tick: SimTick::ZERO,
            sealed_calendar_tick: 0,
            recipe: None,
            tick_counter: 0,
            events: Vec::new(),
        }
    }

    pub fn tank(&self) -> &FluidTank {
        &self.tank
    }

    pub fn fluid(&self) -> Option<&FluidStack> {
        self.tank.fluid()
    }

    pub fn slot(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Recipe picked at seal time, until it completes or is dropped.
    pub fn active_recipe(&self) -> Option<&RegistryKey> {
        self.recipe.as_ref()
    }

    pub fn sealed_tick(&self) -> SimTick {
        self.sealed_tick
    }

    pub fn sealed_calendar_tick(&self) -> u64 {
        self.sealed_calendar_tick
    }

    /// Calendar date the barrel was sealed, e.g. `06:00 January 1, 1000`.
    pub fn sealed_date_display(&self) -> String {
        time_and_date(self.sealed_calendar_tick)
    }

    pub fn lock(&self) -> LockPolicy {
        LockPolicy::new(self.sealed)
    }

    pub fn phase(&self, now: SimTick, recipes: &BarrelRecipes) -> BarrelPhase {
        if !self.sealed {
            return BarrelPhase::Unsealed;
        }
        let due = self
            .recipe
            .as_ref()
            .and_then(|id| recipes.get(id))
            .is_some_and(|recipe| now.since(self.sealed_tick) > recipe.duration);
        if due {
            BarrelPhase::SealedDue
        } else {
            BarrelPhase::SealedPending
        }
    }

    /// How many items of `stack` an insert into `slot` would take.
    pub fn insert_capacity(&self, slot: usize, stack: &ItemStack, side: Option<Facing>) -> u32 {
        if slot >= SLOT_COUNT || stack.count == 0 || !self.lock().can_insert(slot, stack, side) {
            return 0;
        }
        match &self.slots[slot] {
            None => stack.count.min(stack.item_type.max_stack_size()),
            Some(existing) if existing.can_merge(stack) => stack.count.min(existing.space()),
            Some(_) => 0,
        }
    }

    /// Insert into `slot`, returning what did not fit.
    pub fn insert(
        &mut self,
        slot: usize,
        stack: ItemStack,
        side: Option<Facing>,
        recipes: &BarrelRecipes,
    ) -> Option<ItemStack> {
        let accepted = self.insert_capacity(slot, &stack, side);
        if accepted == 0 {
            return Some(stack);
        }
        let mut incoming = stack;
        if let Some(moved) = incoming.split(accepted) {
            match &mut self.slots[slot] {
                Some(existing) => existing.count += moved.count,
                empty => *empty = Some(moved),
            }
        }
        self.contents_changed(recipes);
        (incoming.count > 0).then_some(incoming)
    }

    /// What [`Barrel::extract`] would return, without taking it.
    pub fn peek_extract(&self, slot: usize, max: u32, side: Option<Facing>) -> Option<ItemStack> {
        if slot >= SLOT_COUNT || max == 0 || !self.lock().can_extract(slot, side) {
            return None;
        }
        self.slots[slot]
            .as_ref()
            .map(|stack| stack.with_count(stack.count.min(max)))
    }

    /// Take up to `max` items from `slot`.
    pub fn extract(&mut self, slot: usize, max: u32, side: Option<Facing>) -> Option<ItemStack> {
        if slot >= SLOT_COUNT || !self.lock().can_extract(slot, side) {
            return None;
        }
        let stack = self.slots[slot].as_mut()?;
        let taken = stack.split(max)?;
        if stack.count == 0 {
            self.slots[slot] = None;
        }
        self.events.push(BarrelEvent::ContentsChanged);
        Some(taken)
    }

    /// Amount of `resource` a fill would accept.
    pub fn fill_capacity(&self, resource: &FluidStack) -> u32 {
        if !self.lock().can_fill(resource) {
            return 0;
        }
        self.tank.clone().fill(resource, false)
    }

    /// Fill the tank, returning the accepted amount.
    pub fn fill(&mut self, resource: &FluidStack, recipes: &BarrelRecipes) -> u32 {
        if !self.lock().can_fill(resource) {
            return 0;
        }
        let accepted = self.tank.fill(resource, true);
        if accepted > 0 {
            self.contents_changed(recipes);
        }
        accepted
    }

    /// Drain up to `max` from the tank.
    pub fn drain(&mut self, max: u32, execute: bool) -> Option<FluidStack> {
        if !self.lock().can_drain() {
            return None;
        }
        let drained = self.tank.drain(max, execute)?;
        if execute {
            self.events.push(BarrelEvent::ContentsChanged);
        }
        Some(drained)
    }

    /// Seal the barrel and pick its timed recipe. Sealing twice is a no-op.
    pub fn seal(&mut self, now: SimTick, calendar_tick: u64, recipes: &BarrelRecipes) -> bool {
        if self.sealed {
            return false;
        }
        self.sealed = true;
        self.sealed_tick = now;
        self.sealed_calendar_tick = calendar_tick;
        self.recipe = recipes
            .find(self.tank.fluid(), self.slots[SLOT_ITEM].as_ref())
            .map(|recipe| recipe.id.clone());
        debug!(recipe = ?self.recipe, tick = now.0, "barrel sealed");
        self.events.push(BarrelEvent::Sealed {
            recipe: self.recipe.clone(),
            sealed_calendar_tick: calendar_tick,
        });
        true
    }

    /// Unseal, dropping any pending recipe without applying it.
    pub fn unseal(&mut self) -> bool {
        if !self.sealed {
            return false;
        }
        self.sealed = false;
        let dropped_recipe = self.recipe.take();
        self.events.push(BarrelEvent::Unsealed { dropped_recipe });
        true
    }

    /// Per-tick update.
    pub fn update(&mut self, env: &BarrelTickEnv<'_>) {
        self.tick_counter += 1;
        if self.tick_counter >= TRANSFER_INTERVAL_TICKS {
            self.tick_counter = 0;
            if self.exchange_fluid() {
                self.contents_changed(env.recipes);
            }
            if !self.sealed && env.raining_above {
                let rain = FluidStack::new(FluidKind::FreshWater, RAIN_FILL_AMOUNT);
                if self.tank.fill(&rain, true) > 0 {
                    self.contents_changed(env.recipes);
                }
            }
        }
        self.resolve_recipe(env);
    }

    fn resolve_recipe(&mut self, env: &BarrelTickEnv<'_>) {
        let Some(id) = self.recipe.clone() else {
            return;
        };
        let Some(recipe) = env.recipes.get(&id) else {
            self.recipe = None;
            self.events.push(BarrelEvent::RecipeDiscarded(id));
            return;
        };
        if env.now.since(self.sealed_tick) <= recipe.duration {
            return;
        }
        self.recipe = None;
        let item = self.slots[SLOT_ITEM].as_ref();
        if !recipe.matches(self.tank.fluid(), item) {
            debug!(recipe = %id, "contents changed, recipe dropped");
            self.events.push(BarrelEvent::RecipeDiscarded(id));
            return;
        }
        let (fluid, item) = recipe.apply(self.tank.fluid(), item, self.tank.capacity());
        self.tank.set_fluid(fluid);
        self.slots[SLOT_ITEM] = item;
        self.events.push(BarrelEvent::RecipeCompleted(id));
        self.contents_changed(env.recipes);
    }

    /// Empty the input container into the tank, or else fill it from the tank.
    fn exchange_fluid(&mut self) -> bool {
        let Some(input) = self.slots[SLOT_FLUID_CONTAINER_IN].clone() else {
            return false;
        };
        let output = self.slots[SLOT_FLUID_CONTAINER_OUT].as_ref();
        let transfer = match empty_container_into_tank(&input, &mut self.tank, output) {
            Some(transfer) => Some(transfer),
            None => fill_container_from_tank(&input, &mut self.tank, output),
        };
        let Some(transfer) = transfer else {
            return false;
        };
        self.slots[SLOT_FLUID_CONTAINER_IN] = transfer.remaining_input;
        self.slots[SLOT_FLUID_CONTAINER_OUT] = Some(transfer.output);
        true
    }

    fn contents_changed(&mut self, recipes: &BarrelRecipes) {
        if let Some(recipe) =
            recipes.find_instant(self.tank.fluid(), self.slots[SLOT_ITEM].as_ref())
        {
            let (fluid, item) = recipe.apply(
                self.tank.fluid(),
                self.slots[SLOT_ITEM].as_ref(),
                self.tank.capacity(),
            );
            self.tank.set_fluid(fluid);
            self.slots[SLOT_ITEM] = item;
            debug!(recipe = %recipe.id, "instant recipe applied");
            self.events.push(BarrelEvent::InstantRecipe(recipe.id.clone()));
        }
        self.events.push(BarrelEvent::ContentsChanged);
    }

    /// Client-side mirror of the seal broadcast.
    pub fn on_receive_update(&mut self, recipe: Option<RegistryKey>, sealed_calendar_tick: u64) {
        self.sealed = true;
        self.recipe = recipe;
        self.sealed_calendar_tick = sealed_calendar_tick;
    }

    /// Queued events, oldest first.
    pub fn drain_events(&mut self) -> Vec<BarrelEvent> {
        std::mem::take(&mut self.events)
    }

    /// Remove every item, e.g. when the barrel is broken open.
    pub fn take_items(&mut self) -> Vec<ItemStack> {
        self.slots.iter_mut().filter_map(Option::take).collect()
    }

    pub fn to_item_tag(&self) -> BarrelItemTag {
        BarrelItemTag {
            tank: self.tank.fluid().copied(),
            inventory: self.slots.to_vec(),
            sealed_tick: self.sealed_tick,
            sealed_calendar_tick: self.sealed_calendar_tick,
        }
    }

    /// Rebuild a sealed barrel from its dropped item.
    ///
    /// Timestamps are kept as they were, so time spent as an item counts
    /// towards the recipe.
    pub fn from_item_tag(tag: &BarrelItemTag, recipes: &BarrelRecipes) -> Self {
        let mut barrel = Self::new();
        barrel.tank.set_fluid(tag.tank);
        for (slot, stack) in barrel.slots.iter_mut().zip(&tag.inventory) {
            *slot = stack.clone();
        }
        barrel.sealed = true;
        barrel.sealed_tick = tag.sealed_tick;
        barrel.sealed_calendar_tick = tag.sealed_calendar_tick;
        barrel.recipe = recipes
            .find(barrel.tank.fluid(), barrel.slots[SLOT_ITEM].as_ref())
            .map(|recipe| recipe.id.clone());
        barrel
    }

    pub fn to_record(&self) -> BarrelRecord {
        BarrelRecord {
            version: BARREL_RECORD_VERSION,
            tank: self.tank.fluid().copied(),
            inventory: self.slots.to_vec(),
            sealed: self.sealed,
            sealed_tick: self.sealed_tick.0,
            sealed_calendar_tick: self.sealed_calendar_tick,
            recipe: self.recipe.clone(),
            tick_counter: self.tick_counter,
        }
    }

    /// Load from a record. Missing or out-of-range fields fall back to an
    /// empty, unsealed barrel.
    pub fn from_record(record: &BarrelRecord) -> Self {
        let mut barrel = Self::new();
        barrel.tank.set_fluid(record.tank);
        for (slot, stack) in barrel.slots.iter_mut().zip(&record.inventory) {
            *slot = stack.clone().filter(|s| s.count > 0);
        }
        barrel.sealed = record.sealed;
        barrel.sealed_tick = SimTick(record.sealed_tick);
        barrel.sealed_calendar_tick = record.sealed_calendar_tick;
        barrel.recipe = record.recipe.clone().filter(|_| record.sealed);
        barrel.tick_counter = record.tick_counter % TRANSFER_INTERVAL_TICKS;
        barrel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barrel_recipe::{BarrelRecipe, FluidIngredient, ItemIngredient};
    use homestead_core::{FoodType, ItemType};

    fn pickling() -> BarrelRecipes {
        let mut recipes = BarrelRecipes::new();
        recipes
            .register(
                BarrelRecipe::timed(
                    RegistryKey::homestead(&["pickling"]),
                    FluidIngredient {
                        kind: FluidKind::FreshWater,
                        amount: 500,
                    },
                    Some(ItemIngredient {
                        item_type: ItemType::Food(FoodType::Wheat),
                        count: 1,
                    }),
                    20,
                )
                .with_output_fluid(FluidStack::new(FluidKind::Brine, 500))
                .with_output_item(ItemStack::new(ItemType::Food(FoodType::Pickle), 1)),
            )
            .unwrap();
        recipes
            .register(
                BarrelRecipe::instant(
                    RegistryKey::homestead(&["salt_water"]),
                    FluidIngredient {
                        kind: FluidKind::FreshWater,
                        amount: 1000,
                    },
                    Some(ItemIngredient {
                        item_type: ItemType::Salt,
                        count: 1,
                    }),
                )
                .with_output_fluid(FluidStack::new(FluidKind::SaltWater, 1000)),
            )
            .unwrap();
        recipes
    }

    fn wheat() -> ItemStack {
        ItemStack::new(ItemType::Food(FoodType::Wheat), 1)
    }

    fn env(now: u64, recipes: &BarrelRecipes) -> BarrelTickEnv<'_> {
        BarrelTickEnv {
            now: SimTick(now),
            raining_above: false,
            recipes,
        }
    }

    fn sealed_pickling_barrel(recipes: &BarrelRecipes) -> Barrel {
        let mut barrel = Barrel::new();
        barrel.fill(&FluidStack::new(FluidKind::FreshWater, 500), recipes);
        assert!(barrel.insert(SLOT_ITEM, wheat(), None, recipes).is_none());
        assert!(barrel.seal(SimTick(0), 0, recipes));
        barrel
    }

    #[test]
    fn lock_policy_follows_seal_state() {
        let open = LockPolicy::new(false);
        let sealed = LockPolicy::new(true);
        let bucket = ItemStack::new(ItemType::WoodenBucket, 1);
        let salt = ItemStack::new(ItemType::Salt, 1);

        assert!(open.can_insert(SLOT_FLUID_CONTAINER_IN, &bucket, Some(Facing::Up)));
        assert!(!open.can_insert(SLOT_FLUID_CONTAINER_IN, &salt, None));
        assert!(open.can_insert(SLOT_FLUID_CONTAINER_OUT, &salt, None));
        assert!(!open.can_insert(SLOT_FLUID_CONTAINER_OUT, &salt, Some(Facing::North)));
        assert!(!open.can_extract(SLOT_FLUID_CONTAINER_IN, Some(Facing::Down)));
        assert!(open.can_extract(SLOT_FLUID_CONTAINER_IN, None));

        assert!(!sealed.can_insert(SLOT_ITEM, &salt, None));
        assert!(sealed.can_extract(SLOT_FLUID_CONTAINER_OUT, Some(Facing::Down)));
        assert!(!sealed.can_extract(SLOT_ITEM, None));
        assert!(!sealed.can_fill(&FluidStack::new(FluidKind::FreshWater, 1)));
        assert!(!sealed.can_drain());
    }

    #[test]
    fn hot_fluids_are_refused() {
        let recipes = BarrelRecipes::new();
        let mut barrel = Barrel::new();
        assert_eq!(barrel.fill(&FluidStack::new(FluidKind::Lava, 1000), &recipes), 0);
        assert!(barrel.tank().is_empty());
    }

    #[test]
    fn insert_returns_overflow() {
        let recipes = BarrelRecipes::new();
        let mut barrel = Barrel::new();
        let rest = barrel.insert(SLOT_ITEM, ItemStack::new(ItemType::Salt, 70), None, &recipes);
        assert_eq!(rest.map(|s| s.count), Some(6));
        assert_eq!(barrel.slot(SLOT_ITEM).map(|s| s.count), Some(64));
        let rejected = barrel.insert(SLOT_ITEM, ItemStack::new(ItemType::Stick, 1), None, &recipes);
        assert_eq!(rejected, Some(ItemStack::new(ItemType::Stick, 1)));
    }

    #[test]
    fn seal_picks_recipe_and_notifies_once() {
        let recipes = pickling();
        let mut barrel = sealed_pickling_barrel(&recipes);
        assert_eq!(barrel.active_recipe().map(|k| k.path()), Some("pickling"));
        assert!(!barrel.seal(SimTick(5), 5, &recipes));
        let seals = barrel
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, BarrelEvent::Sealed { .. }))
            .count();
        assert_eq!(seals, 1);
    }

    #[test]
    fn recipe_commits_only_after_duration_elapses() {
        let recipes = pickling();
        let mut barrel = sealed_pickling_barrel(&recipes);

        barrel.update(&env(20, &recipes));
        assert_eq!(barrel.phase(SimTick(20), &recipes), BarrelPhase::SealedPending);
        assert_eq!(barrel.fluid(), Some(&FluidStack::new(FluidKind::FreshWater, 500)));
        assert!(barrel.active_recipe().is_some());

        assert_eq!(barrel.phase(SimTick(21), &recipes), BarrelPhase::SealedDue);
        barrel.update(&env(21, &recipes));
        assert_eq!(barrel.fluid(), Some(&FluidStack::new(FluidKind::Brine, 500)));
        assert_eq!(
            barrel.slot(SLOT_ITEM),
            Some(&ItemStack::new(ItemType::Food(FoodType::Pickle), 1))
        );
        assert!(barrel.active_recipe().is_none());
        assert!(barrel.is_sealed());

        let completed = barrel
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, BarrelEvent::RecipeCompleted(_)))
            .count();
        assert_eq!(completed, 1);

        barrel.update(&env(200, &recipes));
        assert!(barrel.drain_events().is_empty());
    }

    #[test]
    fn unseal_drops_recipe_without_output() {
        let recipes = pickling();
        let mut barrel = sealed_pickling_barrel(&recipes);
        assert!(barrel.unseal());
        assert!(barrel.active_recipe().is_none());
        barrel.update(&env(100, &recipes));
        assert_eq!(barrel.fluid(), Some(&FluidStack::new(FluidKind::FreshWater, 500)));
        assert_eq!(barrel.slot(SLOT_ITEM), Some(&wheat()));
    }

    #[test]
    fn recipe_is_revalidated_when_due() {
        let recipes = pickling();
        let mut barrel = Barrel::new();
        barrel.fill(&FluidStack::new(FluidKind::FreshWater, 1200), &recipes);
        barrel.insert(SLOT_ITEM, wheat(), None, &recipes);
        barrel.insert(
            SLOT_FLUID_CONTAINER_IN,
            ItemStack::new(ItemType::WoodenBucket, 1),
            None,
            &recipes,
        );
        barrel.seal(SimTick(0), 0, &recipes);
        assert!(barrel.active_recipe().is_some());

        // The passive exchange keeps running while sealed and bottles 1000 mB.
        for tick in 1..=21 {
            barrel.update(&env(tick, &recipes));
        }
        assert!(barrel.active_recipe().is_none());
        assert_eq!(barrel.fluid(), Some(&FluidStack::new(FluidKind::FreshWater, 200)));
        assert_eq!(barrel.slot(SLOT_ITEM), Some(&wheat()));
        assert!(barrel
            .drain_events()
            .iter()
            .any(|e| matches!(e, BarrelEvent::RecipeDiscarded(_))));
    }

    #[test]
    fn sealed_barrel_rejects_changes_but_releases_output() {
        let recipes = pickling();
        let mut barrel = Barrel::new();
        barrel.insert(
            SLOT_FLUID_CONTAINER_OUT,
            ItemStack::new(ItemType::WoodenBucket, 1),
            None,
            &recipes,
        );
        barrel.seal(SimTick(0), 0, &recipes);

        assert!(barrel.insert(SLOT_ITEM, wheat(), None, &recipes).is_some());
        assert_eq!(barrel.fill(&FluidStack::new(FluidKind::FreshWater, 10), &recipes), 0);
        assert!(barrel.drain(10, true).is_none());
        assert!(barrel.extract(SLOT_ITEM, 1, None).is_none());
        assert_eq!(
            barrel.extract(SLOT_FLUID_CONTAINER_OUT, 1, Some(Facing::Down)),
            Some(ItemStack::new(ItemType::WoodenBucket, 1))
        );
    }

    #[test]
    fn instant_recipe_applies_in_the_same_call() {
        let recipes = pickling();
        let mut barrel = Barrel::new();
        barrel.fill(&FluidStack::new(FluidKind::FreshWater, 1000), &recipes);
        barrel.insert(SLOT_ITEM, ItemStack::new(ItemType::Salt, 1), None, &recipes);
        assert_eq!(barrel.fluid(), Some(&FluidStack::new(FluidKind::SaltWater, 1000)));
        assert!(barrel.slot(SLOT_ITEM).is_none());
    }

    #[test]
    fn passive_exchange_runs_every_ten_ticks() {
        let recipes = BarrelRecipes::new();
        let mut barrel = Barrel::new();
        let bucket = ItemStack::filled(
            ItemType::WoodenBucket,
            FluidStack::new(FluidKind::Milk, 1000),
        );
        barrel.insert(SLOT_FLUID_CONTAINER_IN, bucket, None, &recipes);
        for tick in 1..TRANSFER_INTERVAL_TICKS {
            barrel.update(&env(u64::from(tick), &recipes));
            assert!(barrel.tank().is_empty());
        }
        barrel.update(&env(10, &recipes));
        assert_eq!(barrel.tank().amount(), 1000);
        assert!(barrel.slot(SLOT_FLUID_CONTAINER_IN).is_none());
        assert_eq!(
            barrel.slot(SLOT_FLUID_CONTAINER_OUT),
            Some(&ItemStack::new(ItemType::WoodenBucket, 1))
        );
    }

    #[test]
    fn exchanged_fluid_triggers_instant_recipe() {
        let recipes = BarrelRecipes::defaults().unwrap();
        let mut barrel = Barrel::new();
        barrel.insert(SLOT_ITEM, ItemStack::new(ItemType::Salt, 1), None, &recipes);
        let bucket = ItemStack::filled(
            ItemType::WoodenBucket,
            FluidStack::new(FluidKind::FreshWater, 1000),
        );
        barrel.insert(SLOT_FLUID_CONTAINER_IN, bucket, None, &recipes);
        for tick in 1..=TRANSFER_INTERVAL_TICKS {
            barrel.update(&env(u64::from(tick), &recipes));
        }
        assert_eq!(
            barrel.fluid(),
            Some(&FluidStack::new(FluidKind::SaltWater, 1000))
        );
        assert!(barrel.slot(SLOT_ITEM).is_none());
        let salt_water = RegistryKey::homestead(&["salt_water"]);
        assert!(barrel
            .drain_events()
            .contains(&BarrelEvent::InstantRecipe(salt_water)));
    }

    #[test]
    fn rain_tops_up_fresh_water_only_while_unsealed() {
        let recipes = BarrelRecipes::new();
        let mut barrel = Barrel::new();
        let rainy = |now| BarrelTickEnv {
            now: SimTick(now),
            raining_above: true,
            recipes: &recipes,
        };
        for tick in 1..=20 {
            barrel.update(&rainy(tick));
        }
        assert_eq!(barrel.tank().amount(), 2 * RAIN_FILL_AMOUNT);

        let mut milk = Barrel::new();
        milk.fill(&FluidStack::new(FluidKind::Milk, 100), &recipes);
        for tick in 1..=10 {
            milk.update(&rainy(tick));
        }
        assert_eq!(milk.fluid(), Some(&FluidStack::new(FluidKind::Milk, 100)));

        barrel.seal(SimTick(20), 20, &recipes);
        for tick in 21..=40 {
            barrel.update(&rainy(tick));
        }
        assert_eq!(barrel.tank().amount(), 2 * RAIN_FILL_AMOUNT);
    }

    #[test]
    fn item_tag_keeps_timestamps() {
        let recipes = pickling();
        let mut barrel = Barrel::new();
        barrel.fill(&FluidStack::new(FluidKind::FreshWater, 500), &recipes);
        barrel.insert(SLOT_ITEM, wheat(), None, &recipes);
        barrel.seal(SimTick(42), 9000, &recipes);

        let restored = Barrel::from_item_tag(&barrel.to_item_tag(), &recipes);
        assert!(restored.is_sealed());
        assert_eq!(restored.sealed_tick(), SimTick(42));
        assert_eq!(restored.sealed_calendar_tick(), 9000);
        assert_eq!(restored, barrel);
    }

    #[test]
    fn record_roundtrip_and_defaults() {
        let recipes = pickling();
        let barrel = sealed_pickling_barrel(&recipes);
        assert_eq!(Barrel::from_record(&barrel.to_record()), barrel);

        let empty = Barrel::from_record(&BarrelRecord::default());
        assert_eq!(empty, Barrel::new());
    }

    #[test]
    fn sealed_date_uses_calendar_format() {
        let recipes = BarrelRecipes::new();
        let mut barrel = Barrel::new();
        barrel.seal(SimTick(0), 0, &recipes);
        assert_eq!(barrel.sealed_date_display(), "06:00 January 1, 1000");
    }
}
