//! Headless fixed-step driver.

use std::time::Duration;

use tracing::{debug, info};
use yatd_core::{Command, Event, GameStatus};
use yatd_world::{apply, query, GameWorld};

/// Policy deciding when the driver requests the next wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WavePacing {
    /// Start the next wave once the field is clear.
    Cleared,
    /// Start the next wave as soon as the previous one finished spawning.
    Eager,
}

/// Outcome of a headless run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    /// Ticks that were executed.
    pub(crate) ticks: u64,
    /// Simulated time that elapsed.
    pub(crate) elapsed: Duration,
    /// Enemies removed by tower damage.
    pub(crate) kills: u32,
    /// Enemies that reached the base.
    pub(crate) leaks: u32,
    /// Commands the world rejected.
    pub(crate) rejections: u32,
}

/// Drives a world with a fixed `dt` until it ends or `max_ticks` elapse.
pub(crate) fn run(
    world: &mut GameWorld,
    dt: Duration,
    max_ticks: u64,
    pacing: WavePacing,
) -> Summary {
    let mut summary = Summary::default();
    let mut events = Vec::new();

    while summary.ticks < max_ticks && !query::status(world).is_terminal() {
        if wave_due(world, pacing) {
            apply(world, Command::NextWave, &mut events);
        }
        apply(world, Command::Tick { dt }, &mut events);
        summary.ticks += 1;
        summary.elapsed = summary.elapsed.saturating_add(dt);

        for event in events.drain(..) {
            match event {
                Event::EnemyKilled { .. } => summary.kills += 1,
                Event::EnemyReachedBase { .. } => summary.leaks += 1,
                Event::CommandRejected { reason } => {
                    debug!(%reason, "driver command rejected");
                    summary.rejections += 1;
                }
                Event::WaveSpawnComplete { wave } => {
                    let counters = query::counters(world);
                    info!(
                        wave,
                        money = counters.money,
                        base_health = counters.base_health,
                        "wave fully spawned"
                    );
                }
                _ => {}
            }
        }
    }

    summary
}

fn wave_due(world: &GameWorld, pacing: WavePacing) -> bool {
    let counters = query::counters(world);
    if counters.status != GameStatus::Ongoing || counters.current_wave >= counters.max_waves {
        return false;
    }

    let live = query::enemies(world).iter().count();
    let spawning = usize::try_from(counters.enemies_remaining).unwrap_or(usize::MAX) > live;
    match pacing {
        WavePacing::Cleared => counters.enemies_remaining == 0,
        WavePacing::Eager => !spawning,
    }
}
