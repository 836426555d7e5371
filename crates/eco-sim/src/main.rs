//! Command-line runner for the ecosystem simulation.

mod telemetry;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use eco_core::{PopulationStats, SimulationConfig, TickReport};
use eco_world::WorldManager;
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "eco-sim",
    version,
    about = "Run a grid ecosystem of plants and animals"
)]
struct Cli {
    /// JSON configuration file; defaults are used for anything it omits.
    #[arg(short, long, env = "ECO_SIM_CONFIG")]
    config: Option<PathBuf>,

    /// Number of ticks to simulate.
    #[arg(short, long, default_value_t = 500)]
    ticks: u64,

    /// RNG seed, overriding the config file.
    #[arg(long, env = "ECO_SIM_SEED")]
    seed: Option<u64>,

    /// Grid width, overriding the config file.
    #[arg(long)]
    width: Option<i32>,

    /// Grid height, overriding the config file.
    #[arg(long)]
    height: Option<i32>,

    /// Emit population metrics every N ticks (0 disables).
    #[arg(long, default_value_t = 100)]
    report_every: u64,

    /// Log as JSON lines instead of human-readable text.
    #[arg(long)]
    log_json: bool,

    /// Print the final summary as JSON on stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    population: PopulationStats,
    totals: TickReport,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_telemetry(cli.log_json)?;

    let config = load_config(&cli)?;
    let mut world = WorldManager::with_config(config).context("failed to build world")?;
    let placed = world.populate_from_config();

    info!(
        seed = world.seed(),
        width = world.grid().width(),
        height = world.grid().height(),
        placed,
        ticks = cli.ticks,
        "Starting simulation"
    );

    let start = Instant::now();
    for _ in 0..cli.ticks {
        world.update();

        if cli.report_every > 0 && world.tick() % cli.report_every == 0 {
            emit_population_metrics(&world);
        }
        if world.organism_count() == 0 {
            info!(tick = world.tick(), "Population extinct, stopping early");
            break;
        }
    }

    let summary = RunSummary {
        seed: world.seed(),
        ticks: world.tick(),
        population: world.stats(),
        totals: world.totals().clone(),
    };
    emit_episode_summary(&summary, start.elapsed().as_secs_f64());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::read_json_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(width) = cli.width {
        config.world.width = width;
    }
    if let Some(height) = cli.height {
        config.world.height = height;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn emit_population_metrics(world: &WorldManager) {
    let stats = world.stats();
    let report = world.last_report();

    info!(
        event = "population_metrics",
        tick = world.tick(),
        total_population = stats.total(),
        plants = stats.plants,
        herbivores = stats.herbivores,
        carnivores = stats.carnivores,
        omnivores = stats.omnivores,
        mean_nutrients = format!("{:.2}", stats.mean_nutrients),
        mean_age = format!("{:.1}", stats.mean_age),
        oldest_age = stats.oldest_age,
        births = report.births,
        spreads = report.spreads,
        meals = report.meals,
        deaths = report.deaths(),
        "Population metrics"
    );
}

fn emit_episode_summary(summary: &RunSummary, elapsed_secs: f64) {
    let totals = &summary.totals;

    info!(
        event = "episode_summary",
        seed = summary.seed,
        final_tick = summary.ticks,
        total_survivors = summary.population.total(),
        plants = summary.population.plants,
        animals = summary.population.animals(),
        births_total = totals.births,
        spreads_total = totals.spreads,
        meals_total = totals.meals,
        deaths_by_age_total = totals.deaths_by_age,
        deaths_by_starvation_total = totals.deaths_by_starvation,
        decomposition_spawns_total = totals.decomposition_spawns,
        failed_placements_total = totals.failed_placements,
        capped_births_total = totals.capped_births,
        elapsed_secs = format!("{:.2}", elapsed_secs),
        "Simulation complete"
    );
}
