#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a tower defense scenario headlessly.

mod scenario;
mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use yatd_world::{query, GameWorld, Grid};

use crate::{
    scenario::Scenario,
    session::{Summary, WavePacing},
};

#[derive(Parser, Debug)]
#[command(name = "yatd")]
#[command(about = "Runs a tower defense scenario with a fixed simulation step")]
struct Args {
    /// Scenario file describing the map, enemies, towers and waves.
    #[arg(long)]
    scenario: PathBuf,

    /// Simulated milliseconds advanced per tick.
    #[arg(long, default_value_t = 16)]
    dt_ms: u64,

    /// Upper bound on executed ticks.
    #[arg(long, default_value_t = 216_000)]
    max_ticks: u64,

    /// Start each wave as soon as the previous one finished spawning.
    #[arg(long)]
    auto_waves: bool,
}

/// Entry point for the tower defense command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    ensure!(args.dt_ms > 0, "--dt-ms must be positive");

    let scenario = Scenario::load(&args.scenario)?;
    let grid = Grid::from_layout(scenario.layout).context("scenario map is invalid")?;
    let mut world =
        GameWorld::new(grid, scenario.config).context("scenario configuration is invalid")?;
    println!("{}", query::welcome_banner());

    for build in scenario.builds {
        let tower = world
            .add_tower(build.kind, build.cell)
            .with_context(|| format!("failed to place {:?} tower at {}", build.kind, build.cell))?;
        tracing::info!(%tower, cell = %build.cell, "scenario tower placed");
    }

    let pacing = if args.auto_waves {
        WavePacing::Eager
    } else {
        WavePacing::Cleared
    };
    let summary = session::run(
        &mut world,
        Duration::from_millis(args.dt_ms),
        args.max_ticks,
        pacing,
    );
    report(&world, &summary);
    Ok(())
}

fn report(world: &GameWorld, summary: &Summary) {
    let counters = query::counters(world);
    println!(
        "{:?} after {} ticks ({:.2}s simulated)",
        counters.status,
        summary.ticks,
        summary.elapsed.as_secs_f64()
    );
    println!(
        "wave {}/{}, base health {}, money {}",
        counters.current_wave, counters.max_waves, counters.base_health, counters.money
    );
    println!(
        "{} killed, {} leaked, {} towers, {} rejected commands",
        summary.kills,
        summary.leaks,
        query::towers(world).iter().count(),
        summary.rejections
    );
}
