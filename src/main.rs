use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use metro_sim::simulation::{Action, SimConfig, SimWorld, TickResult, DEFAULT_SEED};

#[derive(Parser)]
#[command(name = "metro_sim")]
#[command(about = "Headless metro transit simulation")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "600")]
    ticks: u32,

    /// Time delta per tick in milliseconds; defaults to one frame at the configured framerate
    #[arg(long)]
    delta: Option<f64>,

    /// Seed for the simulation RNG
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Game speed multiplier (1, 2 or 4)
    #[arg(long, default_value = "1")]
    speed: u32,

    /// JSON file with simulation settings
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Print the final observation as JSON instead of the map
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn,metro_sim=info"))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SimConfig::from_json_file(path)?,
        None => SimConfig::default(),
    };
    let delta = cli.delta.unwrap_or_else(|| config.default_dt_ms());
    if delta <= 0.0 {
        anyhow::bail!("--delta must be positive");
    }

    let mut world = SimWorld::with_config(config, cli.seed).context("Invalid configuration")?;
    if !world.set_speed(cli.speed) {
        anyhow::bail!("Unsupported speed {}; use 1, 2 or 4", cli.speed);
    }

    run_headless(&mut world, cli.ticks, delta);

    if cli.json {
        println!("{}", world.observe_json()?);
    }
    Ok(())
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(world: &mut SimWorld, ticks: u32, delta: f64) {
    println!("Running metro simulation in headless mode...");
    println!("Ticks: {}, Delta: {:.2}ms, Seed: {}", ticks, delta, world.seed());

    // Calculate how many ticks equal 1 second of simulation time
    let ticks_per_second = (1000.0 / delta).ceil().max(1.0) as u32;
    println!();

    connect_initial_stations(world);

    println!("Initial state:");
    world.print_summary();
    world.draw_map();
    println!();

    let mut tick = 0;
    'run: while tick < ticks {
        let ticks_to_run = ticks_per_second.min(ticks - tick);

        for _ in 0..ticks_to_run {
            tick += 1;
            match world.tick(delta) {
                TickResult::Running => {}
                TickResult::NewStation => connect_new_station(world),
                TickResult::Ended => break 'run,
            }
        }

        println!(
            "--- After tick {} ({:.1}s simulated time) ---",
            tick,
            world.time_ms / 1000.0
        );
        world.print_summary();
        println!();
    }

    println!("=== Final State ===");
    world.print_summary();
    world.draw_map();

    world.stats.log_summary(world.time_ms, world.score());
}

/// Lay the first line through every initial station
fn connect_initial_stations(world: &mut SimWorld) {
    let count = world.stations.len();
    if count < 2 {
        return;
    }
    let action = Action::CreatePath {
        station_indices: (0..count).collect(),
        looped: count >= 3,
    };
    if !world.apply_action(&action).ok {
        warn!("Could not create the initial path");
    }
}

/// Buy the next slot when affordable and link the newest station to its nearest neighbour
fn connect_new_station(world: &mut SimWorld) {
    let newest = world.stations.len().saturating_sub(1);
    let Some(station) = world.stations.get(newest) else {
        return;
    };
    let nearest = world
        .stations
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != newest)
        .min_by(|(_, a), (_, b)| {
            a.position
                .distance(&station.position)
                .total_cmp(&b.position.distance(&station.position))
        })
        .map(|(idx, _)| idx);
    let Some(nearest) = nearest else {
        return;
    };

    let slot = world.game_state.purchased_num_paths;
    let purchase = Action::PurchasePathSlot { index: slot };
    if !world.apply_action(&purchase).ok {
        return;
    }
    let create = Action::CreatePath {
        station_indices: vec![nearest, newest],
        looped: false,
    };
    if world.apply_action(&create).ok {
        info!("Linked station {} to station {} on slot {}", newest, nearest, slot);
    }
}
