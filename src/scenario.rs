//! Scripted scenarios: TOML files listing what happens to a level on which
//! tick, plus expectations checked along the way.
//!
//! ```toml
//! name = "pickling"
//! ticks = 40
//!
//! [[steps]]
//! tick = 0
//! action = "place"
//! pos = [0, 64, 0]
//! block = "barrel/oak"
//!
//! [[steps]]
//! tick = 1
//! action = "fill"
//! pos = [0, 64, 0]
//! fluid = "brine"
//! amount = 500
//! ```

use anyhow::{Context, Result};
use homestead_core::{FluidKind, FluidStack, ItemStack, ItemType, RegistryKey, BUCKET_VOLUME};
use homestead_net::{encode_message, MessageEnvelope};
use homestead_world::barrel::SLOT_ITEM;
use homestead_world::fire_pit::BELLOWS_OFFSET;
use homestead_world::{
    Activation, Block, BlockDrop, BlockPos, Content, Level, LevelSettings, WeatherState,
};
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    #[serde(default)]
    name: Option<String>,
    ticks: u64,
    #[serde(default)]
    steps: Vec<StepDef>,
}

#[derive(Debug, Deserialize)]
struct StepDef {
    tick: u64,
    #[serde(flatten)]
    action: ActionDef,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ActionDef {
    Place {
        pos: [i32; 3],
        block: String,
    },
    Fill {
        pos: [i32; 3],
        fluid: FluidKind,
        amount: u32,
    },
    Drain {
        pos: [i32; 3],
        amount: u32,
    },
    Insert {
        pos: [i32; 3],
        #[serde(default = "default_slot")]
        slot: usize,
        item: String,
        #[serde(default = "one")]
        count: u32,
        /// Fluid inside the inserted container, one bucket's worth.
        #[serde(default)]
        fluid: Option<FluidKind>,
    },
    Extract {
        pos: [i32; 3],
        slot: usize,
        #[serde(default = "one")]
        count: u32,
    },
    Seal {
        pos: [i32; 3],
    },
    Unseal {
        pos: [i32; 3],
    },
    Weather {
        state: WeatherState,
    },
    SkipCalendar {
        ticks: u64,
    },
    Activate {
        pos: [i32; 3],
        #[serde(default)]
        held: Option<String>,
        #[serde(default)]
        sneaking: bool,
    },
    Break {
        pos: [i32; 3],
    },
    Bellows {
        pos: [i32; 3],
        ticks: u32,
    },
    Expect {
        pos: [i32; 3],
        #[serde(default)]
        fluid: Option<FluidKind>,
        #[serde(default)]
        amount: Option<u32>,
        #[serde(default)]
        empty_tank: bool,
        #[serde(default = "default_slot")]
        slot: usize,
        #[serde(default)]
        item: Option<String>,
        #[serde(default)]
        count: Option<u32>,
        #[serde(default)]
        empty_slot: bool,
        #[serde(default)]
        sealed: Option<bool>,
        /// Registry key of the active recipe, or `"none"`.
        #[serde(default)]
        recipe: Option<String>,
        #[serde(default)]
        lit: Option<bool>,
        #[serde(default)]
        stage: Option<u8>,
    },
}

fn default_slot() -> usize {
    SLOT_ITEM
}

/// A resolved scenario step.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Place { pos: BlockPos, block: Block },
    Fill { pos: BlockPos, fluid: FluidStack },
    Drain { pos: BlockPos, amount: u32 },
    Insert { pos: BlockPos, slot: usize, stack: ItemStack },
    Extract { pos: BlockPos, slot: usize, count: u32 },
    Seal(BlockPos),
    Unseal(BlockPos),
    Weather(WeatherState),
    SkipCalendar(u64),
    Activate { pos: BlockPos, held: Option<ItemStack>, sneaking: bool },
    Break(BlockPos),
    Bellows { pos: BlockPos, ticks: u32 },
    Expect(Expectation),
}

/// What a block should look like at a given tick. Unset fields are not checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Expectation {
    pub pos: BlockPos,
    /// `Some(None)` expects an empty tank.
    pub fluid: Option<Option<FluidKind>>,
    pub amount: Option<u32>,
    pub slot: usize,
    /// `Some(None)` expects an empty slot.
    pub item: Option<Option<ItemType>>,
    pub count: Option<u32>,
    pub sealed: Option<bool>,
    /// `Some(None)` expects no active recipe.
    pub recipe: Option<Option<RegistryKey>>,
    pub lit: Option<bool>,
    pub stage: Option<u8>,
}

impl Expectation {
    /// Describe every mismatch against `level`.
    pub fn check(&self, level: &Level) -> Vec<String> {
        let mut failures = Vec::new();
        let pos = self.pos;
        let block = level.block(pos);

        if let Some(lit) = self.lit {
            if block != (Block::FirePit { lit }) {
                failures.push(format!("{pos:?}: expected fire pit lit={lit}, found {block:?}"));
            }
        }
        if let Some(stage) = self.stage {
            match block {
                Block::SpreadingCrop { stage: found, .. } if found == stage => {}
                other => failures.push(format!("{pos:?}: expected crop stage {stage}, found {other:?}")),
            }
        }

        let wants_barrel = self.fluid.is_some()
            || self.amount.is_some()
            || self.item.is_some()
            || self.count.is_some()
            || self.sealed.is_some()
            || self.recipe.is_some();
        if !wants_barrel {
            return failures;
        }
        let Some(barrel) = level.barrel(pos) else {
            failures.push(format!("{pos:?}: expected a barrel, found {block:?}"));
            return failures;
        };

        let fluid = barrel.fluid();
        if let Some(kind) = self.fluid {
            if fluid.map(|f| f.kind) != kind {
                failures.push(format!("{pos:?}: expected fluid {kind:?}, found {fluid:?}"));
            }
        }
        if let Some(amount) = self.amount {
            let found = fluid.map_or(0, |f| f.amount);
            if found != amount {
                failures.push(format!("{pos:?}: expected {amount} mB, found {found}"));
            }
        }
        let stack = barrel.slot(self.slot);
        if let Some(item) = self.item {
            if stack.map(|s| s.item_type) != item {
                failures.push(format!(
                    "{pos:?}: slot {} expected {item:?}, found {stack:?}",
                    self.slot
                ));
            }
        }
        if let Some(count) = self.count {
            let found = stack.map_or(0, |s| s.count);
            if found != count {
                failures.push(format!(
                    "{pos:?}: slot {} expected count {count}, found {found}",
                    self.slot
                ));
            }
        }
        if let Some(sealed) = self.sealed {
            if barrel.is_sealed() != sealed {
                failures.push(format!("{pos:?}: expected sealed={sealed}"));
            }
        }
        if let Some(recipe) = &self.recipe {
            if barrel.active_recipe() != recipe.as_ref() {
                failures.push(format!(
                    "{pos:?}: expected recipe {recipe:?}, found {:?}",
                    barrel.active_recipe()
                ));
            }
        }
        failures
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioStep {
    pub tick: u64,
    pub action: Action,
}

/// A validated scenario with every registry key resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub ticks: u64,
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Load a scenario file from disk.
    pub fn from_path(path: &Path, content: &Content) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        let default_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scenario".to_string());
        let mut scenario = Self::from_toml(&contents, content)
            .with_context(|| format!("invalid scenario {}", path.display()))?;
        if scenario.name.is_empty() {
            scenario.name = default_name;
        }
        Ok(scenario)
    }

    /// Parse a scenario from TOML text.
    pub fn from_toml(contents: &str, content: &Content) -> Result<Self> {
        let file: ScenarioFile = toml::from_str(contents)?;

        let mut steps = Vec::with_capacity(file.steps.len());
        let mut last_tick: Option<u64> = None;
        for (index, step) in file.steps.into_iter().enumerate() {
            if let Some(prev) = last_tick {
                if step.tick < prev {
                    anyhow::bail!("scenario steps must be sorted by tick");
                }
            }
            if step.tick > file.ticks {
                anyhow::bail!(
                    "step {index} at tick {} is past the end of the scenario ({})",
                    step.tick,
                    file.ticks
                );
            }
            last_tick = Some(step.tick);
            let action =
                resolve(step.action, content).with_context(|| format!("step {index}"))?;
            steps.push(ScenarioStep {
                tick: step.tick,
                action,
            });
        }

        Ok(Self {
            name: file.name.unwrap_or_default(),
            ticks: file.ticks,
            steps,
        })
    }
}

fn parse_key(raw: &str) -> Result<RegistryKey> {
    RegistryKey::parse(raw).with_context(|| format!("bad registry key {raw:?}"))
}

fn resolve_item(raw: &str, content: &Content) -> Result<ItemType> {
    let key = parse_key(raw)?;
    content
        .registry
        .item(&key)
        .with_context(|| format!("unknown item {key}"))
}

fn resolve(def: ActionDef, content: &Content) -> Result<Action> {
    let action = match def {
        ActionDef::Place { pos, block } => {
            let key = parse_key(&block)?;
            let block = content
                .registry
                .block(&key)
                .with_context(|| format!("unknown block {key}"))?;
            Action::Place {
                pos: BlockPos::from_wire(pos),
                block,
            }
        }
        ActionDef::Fill { pos, fluid, amount } => Action::Fill {
            pos: BlockPos::from_wire(pos),
            fluid: FluidStack::new(fluid, amount),
        },
        ActionDef::Drain { pos, amount } => Action::Drain {
            pos: BlockPos::from_wire(pos),
            amount,
        },
        ActionDef::Insert {
            pos,
            slot,
            item,
            count,
            fluid,
        } => {
            let item_type = resolve_item(&item, content)?;
            let stack = match fluid {
                Some(kind) => {
                    let Some(capacity) = item_type.fluid_capacity() else {
                        anyhow::bail!("{item} cannot hold fluid");
                    };
                    ItemStack::filled(item_type, FluidStack::new(kind, capacity.min(BUCKET_VOLUME)))
                }
                None => ItemStack::new(item_type, count),
            };
            Action::Insert {
                pos: BlockPos::from_wire(pos),
                slot,
                stack,
            }
        }
        ActionDef::Extract { pos, slot, count } => Action::Extract {
            pos: BlockPos::from_wire(pos),
            slot,
            count,
        },
        ActionDef::Seal { pos } => Action::Seal(BlockPos::from_wire(pos)),
        ActionDef::Unseal { pos } => Action::Unseal(BlockPos::from_wire(pos)),
        ActionDef::Weather { state } => Action::Weather(state),
        ActionDef::SkipCalendar { ticks } => Action::SkipCalendar(ticks),
        ActionDef::Activate {
            pos,
            held,
            sneaking,
        } => Action::Activate {
            pos: BlockPos::from_wire(pos),
            held: held
                .map(|raw| resolve_item(&raw, content).map(|item| ItemStack::new(item, 1)))
                .transpose()?,
            sneaking,
        },
        ActionDef::Break { pos } => Action::Break(BlockPos::from_wire(pos)),
        ActionDef::Bellows { pos, ticks } => Action::Bellows {
            pos: BlockPos::from_wire(pos),
            ticks,
        },
        ActionDef::Expect {
            pos,
            fluid,
            amount,
            empty_tank,
            slot,
            item,
            count,
            empty_slot,
            sealed,
            recipe,
            lit,
            stage,
        } => {
            if empty_tank && fluid.is_some() {
                anyhow::bail!("expect cannot set both fluid and empty_tank");
            }
            if empty_slot && item.is_some() {
                anyhow::bail!("expect cannot set both item and empty_slot");
            }
            let item = match item {
                Some(raw) => Some(Some(resolve_item(&raw, content)?)),
                None => empty_slot.then_some(None),
            };
            let recipe = match recipe.as_deref() {
                None => None,
                Some("none") => Some(None),
                Some(raw) => {
                    let key = parse_key(raw)?;
                    if content.barrel_recipes.get(&key).is_none() {
                        anyhow::bail!("unknown barrel recipe {key}");
                    }
                    Some(Some(key))
                }
            };
            Action::Expect(Expectation {
                pos: BlockPos::from_wire(pos),
                fluid: match fluid {
                    Some(kind) => Some(Some(kind)),
                    None => empty_tank.then_some(None),
                },
                amount,
                slot,
                item,
                count,
                sealed,
                recipe,
                lit,
                stage,
            })
        }
    };
    Ok(action)
}

/// Outcome of running a scenario.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub ticks: u64,
    pub steps: usize,
    pub checks: usize,
    pub failures: Vec<String>,
    pub messages: usize,
    pub message_bytes: usize,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Play `scenario` against a fresh level.
pub fn run(
    scenario: &Scenario,
    content: &Content,
    settings: LevelSettings,
    trace_messages: bool,
) -> Result<(Level, ScenarioReport)> {
    let mut level = Level::new(settings);
    let mut report = ScenarioReport {
        name: scenario.name.clone(),
        ..ScenarioReport::default()
    };
    let mut steps = scenario.steps.iter().peekable();

    loop {
        let now = level.now().0;
        while let Some(step) = steps.next_if(|step| step.tick <= now) {
            report.steps += 1;
            apply(&mut level, &step.action, content, &mut report);
        }
        publish(&mut level, trace_messages, &mut report)?;
        if now >= scenario.ticks {
            break;
        }
        level.tick(content);
    }

    report.ticks = level.now().0;
    info!(
        scenario = %report.name,
        ticks = report.ticks,
        checks = report.checks,
        failures = report.failures.len(),
        "scenario finished"
    );
    Ok((level, report))
}

fn apply(level: &mut Level, action: &Action, content: &Content, report: &mut ScenarioReport) {
    let now = level.now().0;
    let recipes = &content.barrel_recipes;
    match action {
        Action::Place { pos, block } => {
            if !level.place_block(*pos, *block) {
                warn!(?pos, ?block, "block could not be placed");
            }
        }
        Action::Fill { pos, fluid } => {
            let accepted = level
                .barrel_mut(*pos)
                .map_or(0, |barrel| barrel.fill(fluid, recipes));
            debug!(?pos, accepted, "fill");
        }
        Action::Drain { pos, amount } => {
            let drained = level
                .barrel_mut(*pos)
                .and_then(|barrel| barrel.drain(*amount, true));
            debug!(?pos, ?drained, "drain");
        }
        Action::Insert { pos, slot, stack } => {
            let rejected = match level.barrel_mut(*pos) {
                Some(barrel) => barrel.insert(*slot, stack.clone(), None, recipes),
                None => Some(stack.clone()),
            };
            if let Some(rejected) = rejected {
                debug!(?pos, slot, count = rejected.count, "insert partly rejected");
            }
        }
        Action::Extract { pos, slot, count } => {
            let taken = level
                .barrel_mut(*pos)
                .and_then(|barrel| barrel.extract(*slot, *count, None));
            debug!(?pos, slot, ?taken, "extract");
        }
        Action::Seal(pos) => {
            level.seal_barrel(*pos, recipes);
        }
        Action::Unseal(pos) => {
            level.unseal_barrel(*pos);
        }
        Action::Weather(state) => level.set_weather(*state),
        Action::SkipCalendar(ticks) => level.skip_calendar(*ticks),
        Action::Activate {
            pos,
            held,
            sneaking,
        } => {
            let result = level.activate(
                *pos,
                Activation {
                    held: held.as_ref(),
                    sneaking: *sneaking,
                },
                content,
            );
            debug!(?pos, ?result, "activate");
        }
        Action::Break(pos) => {
            for drop in level.break_block(*pos) {
                match drop {
                    BlockDrop::Item(stack) => debug!(?pos, ?stack, "dropped"),
                    BlockDrop::SealedBarrel { wood, tag } => {
                        debug!(?pos, ?wood, sealed_tick = tag.sealed_tick.0, "dropped sealed barrel")
                    }
                }
            }
        }
        Action::Bellows { pos, ticks } => {
            let (dx, dy, dz) = BELLOWS_OFFSET;
            let bellows = BlockPos::new(pos.x + dx, pos.y + dy, pos.z + dz);
            if !level.blow_bellows(*pos, bellows, *ticks) {
                warn!(?pos, "no fire pit to blow into");
            }
        }
        Action::Expect(expectation) => {
            report.checks += 1;
            for failure in expectation.check(level) {
                warn!(tick = now, "{failure}");
                report.failures.push(format!("tick {now}: {failure}"));
            }
        }
    }
}

fn publish(level: &mut Level, trace: bool, report: &mut ScenarioReport) -> Result<()> {
    for envelope in level.drain_messages() {
        let frame = encode_message(&envelope)?;
        if trace {
            trace_message(&envelope, frame.len());
        }
        report.messages += 1;
        report.message_bytes += frame.len();
    }
    Ok(())
}

fn trace_message(envelope: &MessageEnvelope, bytes: usize) {
    info!(tick = envelope.tick, payload = ?envelope.payload, bytes, "sync message");
}
