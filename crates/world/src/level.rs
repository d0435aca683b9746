//! The level: blocks, block entities, weather and the calendar.
//!
//! The level plays host to the block entities. It creates and removes them as
//! blocks change, drives their per-tick updates and random ticks, and turns
//! their events into sync messages for observers.
//!
//! Iteration is over `BTreeMap`s keyed by position, so a tick visits entities
//! in the same order every run. Random ticks draw from an RNG scoped to the
//! world seed, position and tick.

use std::collections::{BTreeMap, BTreeSet};

use homestead_core::{scoped_rng, Calendar, RegistryKey, SimTick, Wood};
use homestead_net::{BlockEntityMessage, MessageEnvelope};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::barrel::{Barrel, BarrelEvent, BarrelItemTag, BarrelTickEnv};
use crate::barrel_recipe::BarrelRecipes;
use crate::block::{Block, BlockPos, Facing};
use crate::capability::{BlockEntity, FluidHandler, ItemHandler};
use crate::content::Content;
use crate::crop::{self, SpreadingCrop};
use crate::fire_pit::FirePit;
use crate::weather::{Weather, WeatherSchedule, WeatherState};

/// Default odds of a random tick per eligible block per tick (1 in N).
pub const DEFAULT_RANDOM_TICK_CHANCE: u32 = 64;

/// Fixed parameters of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelSettings {
    pub seed: u64,
    /// Each crop and fire pit gets a random tick with odds 1 in this.
    pub random_tick_chance: u32,
    pub weather_schedule: Option<WeatherSchedule>,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            random_tick_chance: DEFAULT_RANDOM_TICK_CHANCE,
            weather_schedule: None,
        }
    }
}

/// A set of blocks and the state around them.
#[derive(Debug, Clone)]
pub struct Level {
    settings: LevelSettings,
    calendar: Calendar,
    weather: Weather,
    blocks: BTreeMap<BlockPos, Block>,
    entities: BTreeMap<BlockPos, BlockEntity>,
    outbox: Vec<MessageEnvelope>,
    pending_updates: BTreeSet<BlockPos>,
}

impl Level {
    pub fn new(settings: LevelSettings) -> Self {
        let weather = match settings.weather_schedule {
            Some(schedule) => Weather::with_schedule(schedule),
            None => Weather::new(),
        };
        Self {
            settings,
            calendar: Calendar::new(),
            weather,
            blocks: BTreeMap::new(),
            entities: BTreeMap::new(),
            outbox: Vec::new(),
            pending_updates: BTreeSet::new(),
        }
    }

    pub(crate) fn from_parts(
        settings: LevelSettings,
        calendar: Calendar,
        weather: Weather,
        blocks: BTreeMap<BlockPos, Block>,
        entities: BTreeMap<BlockPos, BlockEntity>,
    ) -> Self {
        Self {
            settings,
            calendar,
            weather,
            blocks,
            entities,
            outbox: Vec::new(),
            pending_updates: BTreeSet::new(),
        }
    }

    pub fn settings(&self) -> &LevelSettings {
        &self.settings
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn now(&self) -> SimTick {
        self.calendar.total_time()
    }

    /// Move the calendar forward without running ticks.
    pub fn skip_calendar(&mut self, ticks: u64) {
        self.calendar.skip_calendar(ticks);
    }

    pub fn weather(&self) -> &Weather {
        &self.weather
    }

    pub fn set_weather(&mut self, state: WeatherState) {
        if let Some(change) = self.weather.set_state(state) {
            info!(from = ?change.from, to = ?change.to, "weather changed");
        }
    }

    /// Block at `pos`; unset positions are air.
    pub fn block(&self, pos: BlockPos) -> Block {
        self.blocks.get(&pos).copied().unwrap_or(Block::Air)
    }

    /// Non-air blocks in position order.
    pub fn blocks(&self) -> impl Iterator<Item = (&BlockPos, &Block)> {
        self.blocks.iter()
    }

    pub fn entity(&self, pos: BlockPos) -> Option<&BlockEntity> {
        self.entities.get(&pos)
    }

    pub fn entity_mut(&mut self, pos: BlockPos) -> Option<&mut BlockEntity> {
        self.entities.get_mut(&pos)
    }

    pub fn entities(&self) -> impl Iterator<Item = (&BlockPos, &BlockEntity)> {
        self.entities.iter()
    }

    pub fn barrel(&self, pos: BlockPos) -> Option<&Barrel> {
        self.entity(pos).and_then(BlockEntity::as_barrel)
    }

    pub fn barrel_mut(&mut self, pos: BlockPos) -> Option<&mut Barrel> {
        self.entity_mut(pos).and_then(BlockEntity::as_barrel_mut)
    }

    pub fn crop(&self, pos: BlockPos) -> Option<&SpreadingCrop> {
        self.entity(pos).and_then(BlockEntity::as_crop)
    }

    pub fn fire_pit(&self, pos: BlockPos) -> Option<&FirePit> {
        self.entity(pos).and_then(BlockEntity::as_fire_pit)
    }

    /// Item access to the entity at `pos` from `side`.
    pub fn item_handler<'a>(
        &'a mut self,
        pos: BlockPos,
        side: Option<Facing>,
        recipes: &'a BarrelRecipes,
    ) -> Option<Box<dyn ItemHandler + 'a>> {
        self.entities.get_mut(&pos)?.item_handler(side, recipes)
    }

    /// Fluid access to the entity at `pos` from `side`.
    pub fn fluid_handler<'a>(
        &'a mut self,
        pos: BlockPos,
        side: Option<Facing>,
        recipes: &'a BarrelRecipes,
    ) -> Option<Box<dyn FluidHandler + 'a>> {
        self.entities.get_mut(&pos)?.fluid_handler(side, recipes)
    }

    /// Replace the block at `pos`, keeping, creating or dropping its entity,
    /// then let the neighbours react.
    pub fn set_block(&mut self, pos: BlockPos, block: Block) {
        let old = self.block(pos);
        if old == block {
            return;
        }
        if block.is_air() {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, block);
        }
        self.sync_entity(pos, old, block);
        self.pending_updates.insert(pos);
        for facing in Facing::ALL {
            self.neighbour_changed(pos.offset(facing));
        }
    }

    fn sync_entity(&mut self, pos: BlockPos, old: Block, new: Block) {
        let keep = match (old, new) {
            (Block::Barrel { wood: a, .. }, Block::Barrel { wood: b, .. }) => a == b,
            (Block::FirePit { .. }, Block::FirePit { .. }) => true,
            (Block::SpreadingCrop { crop: a, .. }, Block::SpreadingCrop { crop: b, .. }) => a == b,
            _ => false,
        };
        if keep && self.entities.contains_key(&pos) {
            return;
        }
        let entity = match new {
            Block::Barrel { .. } => Some(BlockEntity::Barrel(Barrel::new())),
            Block::FirePit { .. } => Some(BlockEntity::FirePit(FirePit::new())),
            Block::SpreadingCrop { stage, .. } => {
                Some(BlockEntity::SpreadingCrop(SpreadingCrop::on_placed(stage)))
            }
            _ => None,
        };
        match entity {
            Some(entity) => {
                self.entities.insert(pos, entity);
            }
            None => {
                self.entities.remove(&pos);
            }
        }
    }

    fn neighbour_changed(&mut self, pos: BlockPos) {
        let below = self.block(pos.down());
        let unsupported = match self.block(pos) {
            Block::FirePit { .. } => !below.is_solid_top(),
            Block::SpreadingCrop { .. } => !below.can_sustain_plant(),
            _ => false,
        };
        if unsupported {
            debug!(?pos, "block lost its support");
            self.set_block(pos, Block::Air);
        }
    }

    /// Whether `block` may go at `pos` right now.
    pub fn can_place(&self, pos: BlockPos, block: Block) -> bool {
        if !self.block(pos).is_air() || block.is_air() {
            return false;
        }
        let below = self.block(pos.down());
        match block {
            Block::FirePit { .. } => below.is_solid_top(),
            Block::SpreadingCrop { .. } => below.can_sustain_plant(),
            _ => true,
        }
    }

    /// Place `block` if [`Level::can_place`] allows it.
    pub fn place_block(&mut self, pos: BlockPos, block: Block) -> bool {
        if !self.can_place(pos, block) {
            return false;
        }
        self.set_block(pos, block);
        true
    }

    /// Place a sealed barrel carried as an item, restoring its contents.
    pub fn place_sealed_barrel(
        &mut self,
        pos: BlockPos,
        wood: Wood,
        tag: &BarrelItemTag,
        recipes: &BarrelRecipes,
    ) -> bool {
        let block = Block::Barrel { wood, sealed: true };
        if !self.place_block(pos, block) {
            return false;
        }
        let barrel = Barrel::from_item_tag(tag, recipes);
        debug!(?pos, recipe = ?barrel.active_recipe(), "sealed barrel placed");
        self.entities.insert(pos, BlockEntity::Barrel(barrel));
        true
    }

    /// Seal the barrel at `pos`.
    pub fn seal_barrel(&mut self, pos: BlockPos, recipes: &BarrelRecipes) -> bool {
        let now = self.calendar.total_time();
        let calendar_tick = self.calendar.calendar_time();
        let Some(barrel) = self.barrel_mut(pos) else {
            return false;
        };
        if !barrel.seal(now, calendar_tick, recipes) {
            return false;
        }
        info!(
            ?pos,
            recipe = ?barrel.active_recipe().map(RegistryKey::to_string),
            sealed = %barrel.sealed_date_display(),
            "barrel sealed"
        );
        self.set_barrel_block_sealed(pos, true);
        self.flush_entity_events(pos);
        true
    }

    /// Unseal the barrel at `pos`.
    pub fn unseal_barrel(&mut self, pos: BlockPos) -> bool {
        let Some(barrel) = self.barrel_mut(pos) else {
            return false;
        };
        if !barrel.unseal() {
            return false;
        }
        self.set_barrel_block_sealed(pos, false);
        self.flush_entity_events(pos);
        true
    }

    fn set_barrel_block_sealed(&mut self, pos: BlockPos, sealed: bool) {
        if let Block::Barrel { wood, .. } = self.block(pos) {
            self.set_block(pos, Block::Barrel { wood, sealed });
        }
    }

    /// Whether rain reaches `pos` from the sky.
    pub fn is_raining_at(&self, pos: BlockPos) -> bool {
        self.weather.is_raining()
            && !self
                .blocks
                .iter()
                .any(|(p, b)| p.x == pos.x && p.z == pos.z && p.y >= pos.y && b.blocks_rain())
    }

    /// Feed air into the fire pit at `pit` from bellows at `bellows`.
    pub fn blow_bellows(&mut self, pit: BlockPos, bellows: BlockPos, ticks: u32) -> bool {
        let offset = (bellows.x - pit.x, bellows.y - pit.y, bellows.z - pit.z);
        if !FirePit::can_intake_from(offset) {
            return false;
        }
        match self.entity_mut(pit).and_then(BlockEntity::as_fire_pit_mut) {
            Some(fire_pit) => {
                fire_pit.on_air_intake(ticks);
                true
            }
            None => false,
        }
    }

    /// RNG for a one-off roll at `pos` this tick.
    pub fn rng_at(&self, pos: BlockPos) -> rand::rngs::StdRng {
        scoped_rng(self.settings.seed, pos.hash_u64(), self.now())
    }

    /// Advance one tick.
    pub fn tick(&mut self, content: &Content) {
        self.calendar.advance();
        let now = self.calendar.total_time();
        if let Some(change) = self.weather.tick() {
            info!(from = ?change.from, to = ?change.to, tick = now.0, "weather changed");
        }

        let barrels: Vec<BlockPos> = self
            .entities
            .iter()
            .filter(|(_, e)| matches!(e, BlockEntity::Barrel(_)))
            .map(|(pos, _)| *pos)
            .collect();
        for pos in barrels {
            let env = BarrelTickEnv {
                now,
                raining_above: self.is_raining_at(pos.up()),
                recipes: &content.barrel_recipes,
            };
            if let Some(barrel) = self.barrel_mut(pos) {
                barrel.update(&env);
            }
            self.flush_entity_events(pos);
        }

        for (pos, entity) in self.entities.iter_mut() {
            if let BlockEntity::FirePit(pit) = entity {
                let lit = matches!(self.blocks.get(pos), Some(Block::FirePit { lit: true }));
                pit.update(lit);
            }
        }

        let chance = self.settings.random_tick_chance.max(1);
        let candidates: Vec<BlockPos> = self
            .entities
            .iter()
            .filter(|(_, e)| !matches!(e, BlockEntity::Barrel(_)))
            .map(|(pos, _)| *pos)
            .collect();
        for pos in candidates {
            let mut rng = scoped_rng(self.settings.seed, pos.hash_u64(), now);
            if rng.gen_ratio(1, chance) {
                self.random_tick(pos, &mut rng);
            }
        }
    }

    fn random_tick<R: Rng>(&mut self, pos: BlockPos, rng: &mut R) {
        match self.block(pos) {
            Block::SpreadingCrop { .. } => {
                if let Some(step) = crop::grow(self, pos, rng) {
                    debug!(?pos, ?step, "crop growth");
                }
            }
            Block::FirePit { lit: true } if self.is_raining_at(pos) => {
                info!(?pos, "fire pit put out by rain");
                self.set_block(pos, Block::FirePit { lit: false });
            }
            _ => {}
        }
    }

    fn flush_entity_events(&mut self, pos: BlockPos) {
        let Some(barrel) = self.barrel_mut(pos) else {
            return;
        };
        let events = barrel.drain_events();
        let tick = self.now().0;
        for event in events {
            match event {
                BarrelEvent::ContentsChanged => {
                    self.pending_updates.insert(pos);
                }
                BarrelEvent::Sealed {
                    recipe,
                    sealed_calendar_tick,
                } => self.outbox.push(MessageEnvelope::new(
                    tick,
                    BlockEntityMessage::BarrelUpdate {
                        pos: pos.to_wire(),
                        recipe,
                        sealed_calendar_tick,
                    },
                )),
                BarrelEvent::Unsealed { dropped_recipe } => {
                    if let Some(recipe) = dropped_recipe {
                        info!(?pos, %recipe, "barrel unsealed before recipe finished");
                    }
                }
                BarrelEvent::InstantRecipe(recipe) => {
                    debug!(?pos, %recipe, "instant barrel recipe");
                }
                BarrelEvent::RecipeCompleted(recipe) => {
                    info!(?pos, %recipe, tick, "barrel recipe completed");
                }
                BarrelEvent::RecipeDiscarded(recipe) => {
                    info!(?pos, %recipe, "barrel recipe no longer matches, discarded");
                }
            }
        }
    }

    /// Collect sync messages produced since the last call.
    ///
    /// Block updates are merged per position and come after seal broadcasts.
    pub fn drain_messages(&mut self) -> Vec<MessageEnvelope> {
        let barrels: Vec<BlockPos> = self
            .entities
            .iter()
            .filter(|(_, e)| matches!(e, BlockEntity::Barrel(_)))
            .map(|(pos, _)| *pos)
            .collect();
        for pos in barrels {
            self.flush_entity_events(pos);
        }
        let tick = self.now().0;
        let updates = std::mem::take(&mut self.pending_updates);
        self.outbox.extend(updates.into_iter().map(|pos| {
            MessageEnvelope::new(tick, BlockEntityMessage::BlockUpdate { pos: pos.to_wire() })
        }));
        std::mem::take(&mut self.outbox)
    }

    /// Apply a message received from the simulating side.
    pub fn apply_message(&mut self, envelope: &MessageEnvelope) -> bool {
        match &envelope.payload {
            BlockEntityMessage::BarrelUpdate {
                pos,
                recipe,
                sealed_calendar_tick,
            } => {
                let pos = BlockPos::from_wire(*pos);
                let Some(barrel) = self.barrel_mut(pos) else {
                    return false;
                };
                barrel.on_receive_update(recipe.clone(), *sealed_calendar_tick);
                barrel.drain_events();
                self.set_barrel_block_sealed(pos, true);
                true
            }
            BlockEntityMessage::BlockUpdate { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::MAX_SPREAD_AGE;
    use homestead_core::{CropKind, FluidKind, FluidStack};

    fn level() -> Level {
        Level::new(LevelSettings::default())
    }

    fn oak_barrel() -> Block {
        Block::Barrel {
            wood: Wood::Oak,
            sealed: false,
        }
    }

    #[test]
    fn entities_follow_block_changes() {
        let mut level = level();
        let pos = BlockPos::new(0, 64, 0);
        level.set_block(pos, oak_barrel());
        assert!(level.barrel(pos).is_some());

        level.set_block(pos, Block::Dirt);
        assert!(level.entity(pos).is_none());
    }

    #[test]
    fn fire_pit_needs_support() {
        let mut level = level();
        let ground = BlockPos::new(0, 63, 0);
        let pit = ground.up();
        assert!(!level.place_block(pit, Block::FirePit { lit: false }));

        level.set_block(ground, Block::Dirt);
        assert!(level.place_block(pit, Block::FirePit { lit: false }));
        assert!(level.fire_pit(pit).is_some());

        level.set_block(ground, Block::Air);
        assert_eq!(level.block(pit), Block::Air);
        assert!(level.fire_pit(pit).is_none());
    }

    #[test]
    fn rain_is_blocked_by_roofs() {
        let mut level = level();
        let pos = BlockPos::new(2, 64, 2);
        assert!(!level.is_raining_at(pos));
        level.set_weather(WeatherState::Rain);
        assert!(level.is_raining_at(pos));
        level.set_block(pos.up().up(), Block::Dirt);
        assert!(!level.is_raining_at(pos));
    }

    #[test]
    fn sealing_broadcasts_once_and_updates_block() {
        let content = Content::bootstrap().unwrap();
        let mut level = level();
        let pos = BlockPos::new(1, 64, 1);
        level.set_block(pos, oak_barrel());
        level.drain_messages();

        assert!(level.seal_barrel(pos, &content.barrel_recipes));
        assert!(!level.seal_barrel(pos, &content.barrel_recipes));
        assert_eq!(
            level.block(pos),
            Block::Barrel {
                wood: Wood::Oak,
                sealed: true
            }
        );
        let messages = level.drain_messages();
        let seals = messages
            .iter()
            .filter(|m| matches!(m.payload, BlockEntityMessage::BarrelUpdate { .. }))
            .count();
        assert_eq!(seals, 1);
    }

    #[test]
    fn client_mirrors_seal_broadcast() {
        let content = Content::bootstrap().unwrap();
        let pos = BlockPos::new(0, 64, 0);
        let mut server = level();
        let mut client = level();
        for level in [&mut server, &mut client] {
            level.set_block(pos, oak_barrel());
        }
        server.barrel_mut(pos).unwrap().fill(
            &FluidStack::new(FluidKind::FreshWater, 1000),
            &content.barrel_recipes,
        );
        server.skip_calendar(5000);
        server.seal_barrel(pos, &content.barrel_recipes);

        for message in server.drain_messages() {
            client.apply_message(&message);
        }
        let mirrored = client.barrel(pos).unwrap();
        assert!(mirrored.is_sealed());
        assert_eq!(mirrored.sealed_calendar_tick(), 5000);
        assert_eq!(
            mirrored.sealed_date_display(),
            server.barrel(pos).unwrap().sealed_date_display()
        );
    }

    #[test]
    fn bellows_only_feed_from_the_east() {
        let mut level = level();
        let pit = BlockPos::new(0, 64, 0);
        level.set_block(pit.down(), Block::Dirt);
        level.place_block(pit, Block::FirePit { lit: true });
        assert!(!level.blow_bellows(pit, pit.offset(Facing::West), 100));
        assert!(level.blow_bellows(pit, pit.offset(Facing::East), 100));
        assert_eq!(level.fire_pit(pit).map(FirePit::air_ticks), Some(100));
        assert!(level.blow_bellows(pit, pit.offset(Facing::East), u32::MAX));
        assert_eq!(
            level.fire_pit(pit).map(FirePit::air_ticks),
            Some(crate::fire_pit::MAX_AIR_TICKS)
        );
    }

    #[test]
    fn crops_stop_spreading_with_age() {
        let content = Content::bootstrap().unwrap();
        let mut level = Level::new(LevelSettings {
            seed: 11,
            random_tick_chance: 1,
            weather_schedule: None,
        });
        for x in -20..=20 {
            for z in -20..=20 {
                level.set_block(BlockPos::new(x, 63, z), Block::Farmland);
            }
        }
        let origin = BlockPos::new(0, 64, 0);
        assert!(level.place_block(
            origin,
            Block::SpreadingCrop {
                crop: CropKind::Pumpkin,
                stage: 0,
                wild: false
            }
        ));

        for _ in 0..2000 {
            level.tick(&content);
        }

        let crops: Vec<_> = level
            .blocks()
            .filter_map(|(pos, block)| match block {
                Block::SpreadingCrop { stage, .. } => Some((*pos, *stage)),
                _ => None,
            })
            .collect();
        assert!(crops.len() > 1, "pumpkin never spread");
        for (pos, stage) in crops {
            assert!(stage <= 7);
            let entity = level.crop(pos).unwrap();
            assert!(u16::from(entity.base_age()) < u16::from(MAX_SPREAD_AGE) + 7);
            assert!(entity.max_growth_stage() <= 7);
        }
    }
}
