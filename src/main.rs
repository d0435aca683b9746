//! homestead - deterministic barrel, crop and fire pit simulation
//!
//! Headless runner for scripted scenarios and saved levels.

mod config;
mod scenario;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::SimConfig;
use homestead_core::{Metal, MetalItem};
use homestead_world::{load_level, save_level, BlockEntity, Content};
use scenario::Scenario;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "homestead", version, about = "Headless homestead simulation")]
struct Cli {
    /// Simulation config (TOML). Missing or invalid files fall back to defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a scenario file and check its expectations.
    Run {
        scenario: PathBuf,
        /// Override the level seed.
        #[arg(long)]
        seed: Option<u64>,
        /// Save the final level snapshot here.
        #[arg(long)]
        save: Option<PathBuf>,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Summarise a saved level snapshot.
    Inspect { snapshot: PathBuf },
    /// List the registered barrel recipes.
    Recipes,
    /// List the registered items of each metal.
    Metals,
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting homestead v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let sim = match &cli.config {
        Some(path) => SimConfig::load_from_path(path),
        None => SimConfig::load(),
    };
    let content = Content::bootstrap().context("failed to register content")?;

    match cli.command {
        Command::Run {
            scenario,
            seed,
            save,
            json,
        } => {
            let scenario = Scenario::from_path(&scenario, &content)?;
            let mut settings = sim.level_settings();
            if let Some(seed) = seed {
                settings.seed = seed;
            }
            let (level, report) =
                scenario::run(&scenario, &content, settings, sim.trace_messages)?;
            if let Some(path) = save {
                save_level(&level, &path)
                    .with_context(|| format!("failed to save {}", path.display()))?;
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{}: {} ticks, {} steps, {} checks, {} sync messages ({} bytes)",
                    report.name,
                    report.ticks,
                    report.steps,
                    report.checks,
                    report.messages,
                    report.message_bytes
                );
                for failure in &report.failures {
                    println!("  FAIL {failure}");
                }
            }
            if !report.passed() {
                anyhow::bail!("{} expectation(s) failed", report.failures.len());
            }
        }
        Command::Inspect { snapshot } => {
            let level = load_level(&snapshot)?;
            println!(
                "tick {} | {} | weather {:?}",
                level.now().0,
                level.calendar().now_display(),
                level.weather().state()
            );
            for (pos, block) in level.blocks() {
                println!("{:>5} {:>4} {:>5}  {:?}", pos.x, pos.y, pos.z, block);
            }
            for (pos, entity) in level.entities() {
                match entity {
                    BlockEntity::Barrel(barrel) => println!(
                        "barrel {:?}: fluid {:?}, sealed {} ({}), recipe {:?}, {:?}",
                        pos,
                        barrel.fluid(),
                        barrel.is_sealed(),
                        barrel.sealed_date_display(),
                        barrel.active_recipe().map(ToString::to_string),
                        barrel.phase(level.now(), &content.barrel_recipes)
                    ),
                    BlockEntity::SpreadingCrop(crop) => {
                        println!("crop {:?}: {:?}", pos, crop)
                    }
                    BlockEntity::FirePit(pit) => println!(
                        "fire pit {:?}: {:.0} degrees, {} air ticks",
                        pos,
                        pit.temperature(),
                        pit.air_ticks()
                    ),
                }
            }
        }
        Command::Recipes => {
            for recipe in content.barrel_recipes.iter() {
                let timing = if recipe.instant {
                    "instant".to_string()
                } else {
                    format!("{} ticks", recipe.duration)
                };
                println!(
                    "{:<24} {:>6} mB {:?} + {:?} -> {:?} + {:?} [{}]",
                    recipe.id.to_string(),
                    recipe.input_fluid.amount,
                    recipe.input_fluid.kind,
                    recipe.input_item.map(|item| item.item_type),
                    recipe.output_fluid,
                    recipe.output_item.as_ref().map(|item| item.item_type),
                    timing
                );
            }
        }
        Command::Metals => {
            for metal in Metal::ALL {
                let items: Vec<_> = MetalItem::ALL
                    .into_iter()
                    .filter(|kind| content.registry.metal_item(metal, *kind).is_some())
                    .collect();
                println!("{:<16} {:?}", format!("{metal:?}"), items);
            }
        }
    }
    Ok(())
}
