//! TOML scenario files resolved into the structures the world consumes.

use std::{collections::BTreeMap, fs, path::Path, sync::Arc, time::Duration};

use anyhow::{bail, ensure, Context, Result};
use serde::Deserialize;
use yatd_core::{CellCoord, EnemyKind, TargetingPolicy, TowerKind, UpgradeKind};
use yatd_system_spawning::SpawnEntry;
use yatd_world::{
    EnemyStats, GameConfig, MapLayout, SquareRole, TowerStats, UpgradeEntry, UpgradeTable,
    WaveConfig,
};

/// Everything needed to start a headless session.
#[derive(Clone, Debug)]
pub(crate) struct Scenario {
    /// Board description.
    pub(crate) layout: MapLayout,
    /// Resolved game configuration.
    pub(crate) config: GameConfig,
    /// Towers placed before the first wave.
    pub(crate) builds: Vec<Build>,
}

/// Tower placement requested by the scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Build {
    /// Type of tower to place.
    pub(crate) kind: TowerKind,
    /// Square that hosts the tower.
    pub(crate) cell: CellCoord,
}

impl Scenario {
    /// Reads and resolves the scenario stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid scenario at {}", path.display()))
    }

    /// Resolves a scenario from its TOML contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let raw: RawScenario =
            toml::from_str(contents).context("failed to parse scenario toml contents")?;

        let layout = parse_map(&raw.map.rows)?;

        let enemies = raw
            .enemies
            .into_iter()
            .map(|(name, enemy)| {
                let stats = EnemyStats {
                    health: enemy.health,
                    speed: enemy.speed,
                    bounty: enemy.bounty,
                    base_damage: enemy.base_damage,
                };
                (EnemyKind::new(name), stats)
            })
            .collect();

        let mut towers = BTreeMap::new();
        for (kind, tower) in raw.towers {
            let entries = tower.upgrades.iter().map(|upgrade| {
                (
                    upgrade.kind,
                    upgrade.level,
                    UpgradeEntry::new(upgrade.delta, upgrade.cost),
                )
            });
            let upgrades = UpgradeTable::new(tower.max_level, entries)
                .with_context(|| format!("invalid upgrade table for {kind:?} towers"))?;
            let _ = towers.insert(
                kind,
                TowerStats {
                    cost: tower.cost,
                    damage: tower.damage,
                    range: tower.range,
                    attack_rate: tower.attack_rate,
                    upgrades: Arc::new(upgrades),
                },
            );
        }

        let waves = raw
            .waves
            .into_iter()
            .map(|wave| {
                WaveConfig::new(
                    wave.entries
                        .into_iter()
                        .map(|entry| {
                            SpawnEntry::new(
                                EnemyKind::new(entry.enemy),
                                entry.count,
                                Duration::from_millis(entry.delay_ms),
                            )
                        })
                        .collect(),
                )
            })
            .collect();

        let config = GameConfig {
            starting_money: raw.economy.starting_money,
            base_health: raw.economy.base_health,
            projectile_speed: raw.economy.projectile_speed,
            targeting: raw.targeting,
            enemies,
            towers,
            waves,
        };

        let builds = raw
            .builds
            .into_iter()
            .map(|build| Build {
                kind: build.tower,
                cell: CellCoord::new(build.column, build.row),
            })
            .collect();

        Ok(Self {
            layout,
            config,
            builds,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScenario {
    economy: RawEconomy,
    #[serde(default)]
    targeting: TargetingPolicy,
    map: RawMap,
    #[serde(default)]
    enemies: BTreeMap<String, RawEnemy>,
    #[serde(default)]
    towers: BTreeMap<TowerKind, RawTower>,
    #[serde(default)]
    waves: Vec<RawWave>,
    #[serde(default)]
    builds: Vec<RawBuild>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEconomy {
    starting_money: u32,
    base_health: u32,
    projectile_speed: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMap {
    rows: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEnemy {
    health: f32,
    speed: f32,
    bounty: u32,
    base_damage: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTower {
    cost: u32,
    damage: f32,
    range: f32,
    attack_rate: f32,
    #[serde(default)]
    max_level: u32,
    #[serde(default)]
    upgrades: Vec<RawUpgrade>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawUpgrade {
    kind: UpgradeKind,
    level: u32,
    delta: f32,
    cost: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWave {
    entries: Vec<RawSpawnEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSpawnEntry {
    enemy: String,
    count: u32,
    delay_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBuild {
    tower: TowerKind,
    column: u32,
    row: u32,
}

fn parse_map(rows: &[String]) -> Result<MapLayout> {
    let Some(first) = rows.first() else {
        bail!("map must contain at least one row");
    };
    let columns = first.chars().count();

    let mut squares = Vec::with_capacity(columns * rows.len());
    let mut base = None;
    for (row, line) in rows.iter().enumerate() {
        ensure!(
            line.chars().count() == columns,
            "map row {row} has {} squares, expected {columns}",
            line.chars().count()
        );

        for (column, symbol) in line.chars().enumerate() {
            let cell = CellCoord::new(u32::try_from(column)?, u32::try_from(row)?);
            let role = match symbol {
                'S' => SquareRole::Start,
                '#' => SquareRole::Route,
                '.' => SquareRole::Buildable,
                'x' => SquareRole::Blocked,
                'B' => {
                    if let Some(previous) = base.replace(cell) {
                        bail!("map declares bases at {previous} and {cell}");
                    }
                    SquareRole::Route
                }
                _ => bail!("unknown map symbol `{symbol}` at {cell}"),
            };
            squares.push(role);
        }
    }

    let base = base.context("map has no base square")?;
    Ok(MapLayout {
        columns: u32::try_from(columns)?,
        rows: u32::try_from(rows.len())?,
        squares,
        base,
    })
}
