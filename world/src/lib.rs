#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the tower defense engine.
//!
//! The [`GameWorld`] owns every entity arena and is the only place that
//! mutates them. Adapters drive it through [`apply`] and observe it through
//! the [`query`] module between ticks.

mod config;
mod enemy;
mod grid;
mod projectile;
mod registry;
mod tower;
mod upgrades;

use std::time::Duration;

use tracing::{debug, info, warn};
use yatd_core::{
    CellCoord, Command, EnemyId, Event, GameError, GameStatus, ProjectileId, TowerId, TowerKind,
    UpgradeKind,
};
use yatd_system_spawning::WaveSpawner;
use yatd_system_tower_targeting::TowerTargeting;

pub use config::{ConfigError, EnemyStats, GameConfig, TowerStats, WaveConfig};
pub use enemy::{Enemy, EnemyStep};
pub use grid::{Grid, MapError, MapLayout, Route, Square, SquareRole};
pub use projectile::{Projectile, ProjectileOutcome};
pub use registry::{Registry, RegistryKey};
pub use tower::Tower;
pub use upgrades::{UpgradeEntry, UpgradeTable};

/// Complete simulation state of a running game.
#[derive(Debug)]
pub struct GameWorld {
    grid: Grid,
    config: GameConfig,
    targeting: TowerTargeting,
    enemies: Registry<EnemyId, Enemy>,
    towers: Registry<TowerId, Tower>,
    projectiles: Registry<ProjectileId, Projectile>,
    spawner: Option<WaveSpawner>,
    money: u32,
    base_health: u32,
    current_wave: u32,
    status: GameStatus,
}

impl GameWorld {
    /// Creates a world on the provided grid once the configuration validates.
    pub fn new(grid: Grid, config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            columns = grid.columns(),
            rows = grid.rows(),
            waves = config.max_waves(),
            "world created"
        );

        Ok(Self {
            targeting: TowerTargeting::new(config.targeting),
            money: config.starting_money,
            base_health: config.base_health,
            grid,
            config,
            enemies: Registry::new(),
            towers: Registry::new(),
            projectiles: Registry::new(),
            spawner: None,
            current_wave: 0,
            status: GameStatus::Ongoing,
        })
    }

    /// Advances the simulation by `dt`.
    ///
    /// Spawning, enemies, towers, projectiles, cleanup and the status check
    /// run in that order. Ticking a finished game does nothing.
    pub fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if self.status.is_terminal() {
            return;
        }
        let walkers = self.enemies.keys();
        self.spawn_enemies(dt, out_events);
        self.move_enemies(&walkers, dt, out_events);

        let in_flight = self.projectiles.keys();
        self.update_towers(dt, out_events);
        self.update_projectiles(&in_flight, dt, out_events);

        self.collect_bounties(out_events);
        self.forget_removed_targets();
        self.update_status(out_events);
    }

    /// Buys and places a tower of `kind` on `cell`.
    pub fn add_tower(&mut self, kind: TowerKind, cell: CellCoord) -> Result<TowerId, GameError> {
        self.ensure_running()?;

        let stats = self
            .config
            .towers
            .get(&kind)
            .ok_or(GameError::UnknownTowerKind { kind })?;
        if self.grid.square_at(cell)?.role() != SquareRole::Buildable {
            return Err(GameError::NotBuildable { coord: cell });
        }
        if self.money < stats.cost {
            return Err(GameError::InsufficientFunds {
                cost: stats.cost,
                available: self.money,
            });
        }

        let tower = self
            .towers
            .next_key()
            .ok_or(GameError::IdentifiersExhausted)?;

        self.grid.place_tower(cell, tower)?;
        self.money -= stats.cost;
        let _ = self
            .towers
            .insert_with(|id| Tower::new(id, kind, cell, stats));
        debug!(%tower, ?kind, %cell, cost = stats.cost, "tower placed");
        Ok(tower)
    }

    /// Buys the next level of `kind` for the tower.
    pub fn upgrade_tower(
        &mut self,
        tower: TowerId,
        kind: UpgradeKind,
    ) -> Result<UpgradeEntry, GameError> {
        self.ensure_running()?;

        let upgraded = self
            .towers
            .get_mut(tower)
            .ok_or(GameError::UnknownTower { tower })?;
        let entry = upgraded.upgrade(kind, &mut self.money)?;
        debug!(
            %tower,
            ?kind,
            level = upgraded.levels().get(kind),
            cost = entry.cost,
            "tower upgraded"
        );
        Ok(entry)
    }

    /// Starts the next configured wave and returns its one-based index.
    pub fn next_wave(&mut self) -> Result<u32, GameError> {
        self.ensure_running()?;
        if self.spawner.is_some() {
            return Err(GameError::WaveInProgress);
        }

        let wave = usize::try_from(self.current_wave)
            .ok()
            .and_then(|index| self.config.waves.get(index))
            .ok_or(GameError::NoWavesRemaining)?;
        self.spawner = Some(WaveSpawner::new(wave.entries.iter().cloned()));
        self.current_wave += 1;
        info!(
            wave = self.current_wave,
            enemies = wave.total(),
            "wave started"
        );
        Ok(self.current_wave)
    }

    fn ensure_running(&self) -> Result<(), GameError> {
        if self.status.is_terminal() {
            Err(GameError::GameOver)
        } else {
            Ok(())
        }
    }

    fn spawn_enemies(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let Some(spawner) = self.spawner.as_mut() else {
            return;
        };

        let mut kinds = Vec::new();
        spawner.update(dt, &mut kinds);
        let complete = spawner.is_complete();

        for kind in kinds {
            let Some(stats) = self.config.enemies.get(&kind) else {
                continue;
            };
            let Some(enemy) = self
                .enemies
                .insert_with(|id| Enemy::new(id, kind.clone(), stats))
            else {
                warn!(%kind, "enemy identifiers exhausted, spawn dropped");
                continue;
            };
            debug!(%enemy, %kind, "enemy spawned");
            out_events.push(Event::EnemySpawned { enemy, kind });
        }

        if complete {
            self.spawner = None;
            info!(wave = self.current_wave, "wave spawn complete");
            out_events.push(Event::WaveSpawnComplete {
                wave: self.current_wave,
            });
        }
    }

    fn move_enemies(&mut self, walkers: &[EnemyId], dt: Duration, out_events: &mut Vec<Event>) {
        let route = self.grid.route_path();

        for &id in walkers {
            let Some(enemy) = self.enemies.get_mut(id) else {
                continue;
            };
            if enemy.update(dt, route) != EnemyStep::Arrived {
                continue;
            }

            let damage = enemy.base_damage();
            let _ = self.enemies.remove(id);
            self.base_health = self.base_health.saturating_sub(damage);
            debug!(enemy = %id, damage, base_health = self.base_health, "enemy reached base");
            out_events.push(Event::EnemyReachedBase { enemy: id, damage });
        }

        self.collect_bounties(out_events);
    }

    fn update_towers(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let route = self.grid.route_path();
        let speed = self.config.projectile_speed;

        for tower in self.towers.values_mut() {
            let Some(enemy) = tower.update(dt, route, &self.enemies, &self.targeting) else {
                continue;
            };
            tower.clear_target();

            let origin = tower.cell().center();
            let tower_id = tower.id();
            let Some(projectile) = self
                .projectiles
                .insert_with(|id| Projectile::new(id, tower_id, enemy, origin, speed))
            else {
                warn!(tower = %tower_id, "projectile identifiers exhausted, shot dropped");
                continue;
            };
            debug!(?projectile, tower = %tower_id, %enemy, "projectile fired");
            out_events.push(Event::ProjectileFired {
                projectile,
                tower: tower_id,
                enemy,
            });
        }
    }

    fn update_projectiles(
        &mut self,
        in_flight: &[ProjectileId],
        dt: Duration,
        out_events: &mut Vec<Event>,
    ) {
        let route = self.grid.route_path();

        for &id in in_flight {
            let Some(projectile) = self.projectiles.get_mut(id) else {
                continue;
            };
            let enemy = projectile.target();
            match projectile.update(dt, route, &self.towers, &mut self.enemies) {
                ProjectileOutcome::InFlight => continue,
                ProjectileOutcome::Hit { damage } => {
                    debug!(projectile = ?id, %enemy, damage, "projectile hit");
                    out_events.push(Event::ProjectileHit {
                        projectile: id,
                        enemy,
                        damage,
                    });
                }
                ProjectileOutcome::Expired => {
                    debug!(projectile = ?id, "projectile expired");
                    out_events.push(Event::ProjectileExpired { projectile: id });
                }
            }
            let _ = self.projectiles.remove(id);
        }
    }

    fn collect_bounties(&mut self, out_events: &mut Vec<Event>) {
        let dead: Vec<EnemyId> = self
            .enemies
            .iter()
            .filter(|(_, enemy)| !enemy.is_alive())
            .map(|(id, _)| id)
            .collect();

        for id in dead {
            let Some(enemy) = self.enemies.remove(id) else {
                continue;
            };
            let bounty = enemy.bounty();
            self.money = self.money.saturating_add(bounty);
            debug!(enemy = %id, bounty, money = self.money, "enemy killed");
            out_events.push(Event::EnemyKilled { enemy: id, bounty });
        }
    }

    fn forget_removed_targets(&mut self) {
        for tower in self.towers.values_mut() {
            if let Some(target) = tower.target() {
                if !self.enemies.contains(target) {
                    tower.clear_target();
                }
            }
        }
    }

    fn update_status(&mut self, out_events: &mut Vec<Event>) {
        if self.base_health == 0 {
            self.status = GameStatus::Lost;
            info!(wave = self.current_wave, "game lost");
            out_events.push(Event::GameLost);
        } else if self.current_wave == self.config.max_waves()
            && self.spawner.is_none()
            && self.enemies.is_empty()
        {
            self.status = GameStatus::Won;
            info!(
                base_health = self.base_health,
                money = self.money,
                "game won"
            );
            out_events.push(Event::GameWon);
        }
    }

    fn enemies_remaining(&self) -> u32 {
        let live = u32::try_from(self.enemies.len()).unwrap_or(u32::MAX);
        let pending = self.spawner.as_ref().map_or(0, WaveSpawner::remaining);
        live.saturating_add(pending)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Rejected commands leave the world untouched and emit
/// [`Event::CommandRejected`].
pub fn apply(world: &mut GameWorld, command: Command, out_events: &mut Vec<Event>) {
    let outcome = match command {
        Command::Tick { dt } => {
            world.tick(dt, out_events);
            Ok(())
        }
        Command::PlaceTower { kind, cell } => world.add_tower(kind, cell).map(|tower| {
            let cost = world.config.towers.get(&kind).map_or(0, |stats| stats.cost);
            out_events.push(Event::TowerPlaced {
                tower,
                kind,
                cell,
                cost,
            });
        }),
        Command::UpgradeTower { tower, upgrade } => {
            world.upgrade_tower(tower, upgrade).map(|entry| {
                let level = world
                    .towers
                    .get(tower)
                    .map_or(0, |upgraded| upgraded.levels().get(upgrade));
                out_events.push(Event::TowerUpgraded {
                    tower,
                    upgrade,
                    level,
                    cost: entry.cost,
                });
            })
        }
        Command::NextWave => world.next_wave().map(|wave| {
            out_events.push(Event::WaveStarted { wave });
        }),
    };

    if let Err(reason) = outcome {
        debug!(%reason, "command rejected");
        out_events.push(Event::CommandRejected { reason });
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use yatd_core::{
        CellCoord, EnemySnapshot, EnemyView, GameError, GameStatus, ProjectileSnapshot,
        ProjectileView, TargetingPolicy, TowerId, TowerSnapshot, TowerView, UpgradeKind,
        WorldCounters, WELCOME_BANNER,
    };

    use super::{GameWorld, Grid, Route, Square, UpgradeEntry};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner() -> &'static str {
        WELCOME_BANNER
    }

    /// Provides read-only access to the board.
    #[must_use]
    pub fn grid(world: &GameWorld) -> &Grid {
        &world.grid
    }

    /// Looks up a single square of the board.
    pub fn square_at(world: &GameWorld, cell: CellCoord) -> Result<&Square, GameError> {
        world.grid.square_at(cell)
    }

    /// Route every enemy follows.
    #[must_use]
    pub fn route(world: &GameWorld) -> &Route {
        world.grid.route_path()
    }

    /// Targeting policy applied by every tower.
    #[must_use]
    pub fn targeting_policy(world: &GameWorld) -> TargetingPolicy {
        world.targeting.policy()
    }

    /// Captures a read-only view of the enemies on the route.
    #[must_use]
    pub fn enemies(world: &GameWorld) -> EnemyView {
        let route = world.grid.route_path();
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .map(|(id, enemy)| EnemySnapshot {
                    id,
                    kind: enemy.kind().clone(),
                    position: enemy.position(route),
                    progress: enemy.progress(),
                    health: enemy.health(),
                    health_fraction: enemy.health_fraction(),
                    alive: enemy.is_alive(),
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn towers(world: &GameWorld) -> TowerView {
        TowerView::from_snapshots(
            world
                .towers
                .iter()
                .map(|(id, tower)| TowerSnapshot {
                    id,
                    kind: tower.kind(),
                    cell: tower.cell(),
                    levels: tower.levels(),
                    damage: tower.damage(),
                    range: tower.range(),
                    attack_rate: tower.attack_rate(),
                    cooldown: tower.cooldown(),
                    target: tower.target(),
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectiles(world: &GameWorld) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .map(|(id, projectile)| ProjectileSnapshot {
                    id,
                    tower: projectile.tower(),
                    target: projectile.target(),
                    position: projectile.position(),
                })
                .collect(),
        )
    }

    /// Reports the economy, wave and outcome counters.
    #[must_use]
    pub fn counters(world: &GameWorld) -> WorldCounters {
        WorldCounters {
            money: world.money,
            base_health: world.base_health,
            current_wave: world.current_wave,
            max_waves: world.config.max_waves(),
            enemies_remaining: world.enemies_remaining(),
            status: world.status,
        }
    }

    /// Lifecycle state of the game.
    #[must_use]
    pub fn status(world: &GameWorld) -> GameStatus {
        world.status
    }

    /// Delta and cost of the next level of `kind` for the tower.
    ///
    /// Returns `None` for unknown towers and upgrades already at their cap.
    #[must_use]
    pub fn next_upgrade(
        world: &GameWorld,
        tower: TowerId,
        kind: UpgradeKind,
    ) -> Option<UpgradeEntry> {
        world
            .towers
            .get(tower)
            .and_then(|tower| tower.next_upgrade(kind))
    }
}
