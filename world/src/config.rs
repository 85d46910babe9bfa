//! Resolved configuration consumed by the world.
//!
//! Textual formats are parsed by adapters. The structures here describe values
//! that are already typed, and [`GameConfig::validate`] rejects anything the
//! simulation cannot run with before a world is constructed.

use std::{collections::BTreeMap, sync::Arc};

use yatd_core::{EnemyKind, TargetingPolicy, TowerKind, UpgradeKind};
use yatd_system_spawning::SpawnEntry;

use crate::upgrades::UpgradeTable;

/// Errors raised while validating configuration.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The configuration declares no waves.
    #[error("at least one wave must be configured")]
    NoWaves,
    /// A wave references an enemy kind without stats.
    #[error("wave {wave} spawns unknown enemy kind `{kind}`")]
    UnknownEnemyKind {
        /// One-based wave index.
        wave: u32,
        /// Kind that failed to resolve.
        kind: EnemyKind,
    },
    /// An enemy stat is not usable.
    #[error("enemy kind `{kind}` has an invalid {field}")]
    InvalidEnemyStat {
        /// Offending enemy kind.
        kind: EnemyKind,
        /// Name of the offending field.
        field: &'static str,
    },
    /// A tower stat is not usable.
    #[error("tower kind {kind:?} has an invalid {field}")]
    InvalidTowerStat {
        /// Offending tower kind.
        kind: TowerKind,
        /// Name of the offending field.
        field: &'static str,
    },
    /// Projectiles must travel forward.
    #[error("projectile speed must be positive")]
    InvalidProjectileSpeed,
    /// An upgrade level lies outside `1..=max_level`.
    #[error("{kind:?} upgrade level {level} is outside 1..={max_level}")]
    UpgradeLevelOutOfRange {
        /// Upgrade kind of the entry.
        kind: UpgradeKind,
        /// Level of the entry.
        level: u32,
        /// Configured cap.
        max_level: u32,
    },
    /// An upgrade level is defined twice.
    #[error("{kind:?} upgrade level {level} is defined twice")]
    DuplicateUpgradeLevel {
        /// Upgrade kind of the entry.
        kind: UpgradeKind,
        /// Duplicated level.
        level: u32,
    },
    /// An upgrade delta is NaN or infinite.
    #[error("{kind:?} upgrade level {level} has a non-finite delta")]
    NonFiniteUpgradeDelta {
        /// Upgrade kind of the entry.
        kind: UpgradeKind,
        /// Level of the entry.
        level: u32,
    },
    /// An upgrade level below the cap is missing.
    #[error("{kind:?} upgrade level {level} is missing")]
    MissingUpgradeLevel {
        /// Upgrade kind missing a level.
        kind: UpgradeKind,
        /// Missing level.
        level: u32,
    },
}

/// Base stats of an enemy kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Health at spawn.
    pub health: f32,
    /// Route cells travelled per second.
    pub speed: f32,
    /// Money granted when the enemy is killed.
    pub bounty: u32,
    /// Base health removed when the enemy reaches the base.
    pub base_damage: u32,
}

/// Base stats and upgrade table of a tower kind.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerStats {
    /// Money required to place the tower.
    pub cost: u32,
    /// Damage dealt per projectile.
    pub damage: f32,
    /// Targeting range in cells.
    pub range: f32,
    /// Attacks per second.
    pub attack_rate: f32,
    /// Upgrades purchasable for the tower kind.
    pub upgrades: Arc<UpgradeTable>,
}

/// Composition of a single wave.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WaveConfig {
    /// Groups emitted in order.
    pub entries: Vec<SpawnEntry>,
}

impl WaveConfig {
    /// Creates a wave from its spawn entries.
    #[must_use]
    pub fn new(entries: Vec<SpawnEntry>) -> Self {
        Self { entries }
    }

    /// Total number of enemies the wave emits.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |total, entry| total.saturating_add(entry.count()))
    }
}

/// Complete resolved configuration of a game.
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    /// Money available before the first placement.
    pub starting_money: u32,
    /// Base health at the start of the game.
    pub base_health: u32,
    /// Cells per second travelled by projectiles.
    pub projectile_speed: f32,
    /// Target acquisition policy shared by all towers.
    pub targeting: TargetingPolicy,
    /// Stats per enemy kind.
    pub enemies: BTreeMap<EnemyKind, EnemyStats>,
    /// Stats per tower kind.
    pub towers: BTreeMap<TowerKind, TowerStats>,
    /// Waves in the order they are started.
    pub waves: Vec<WaveConfig>,
}

impl GameConfig {
    /// Number of configured waves.
    #[must_use]
    pub fn max_waves(&self) -> u32 {
        u32::try_from(self.waves.len()).unwrap_or(u32::MAX)
    }

    /// Checks that every value can drive a simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.waves.is_empty() {
            return Err(ConfigError::NoWaves);
        }

        if !(self.projectile_speed.is_finite() && self.projectile_speed > 0.0) {
            return Err(ConfigError::InvalidProjectileSpeed);
        }

        for (kind, stats) in &self.enemies {
            let invalid = |field| ConfigError::InvalidEnemyStat {
                kind: kind.clone(),
                field,
            };
            if !(stats.health.is_finite() && stats.health > 0.0) {
                return Err(invalid("health"));
            }
            if !(stats.speed.is_finite() && stats.speed >= 0.0) {
                return Err(invalid("speed"));
            }
        }

        for (kind, stats) in &self.towers {
            let invalid = |field| ConfigError::InvalidTowerStat { kind: *kind, field };
            if !(stats.damage.is_finite() && stats.damage >= 0.0) {
                return Err(invalid("damage"));
            }
            if !(stats.range.is_finite() && stats.range >= 0.0) {
                return Err(invalid("range"));
            }
            if !(stats.attack_rate.is_finite() && stats.attack_rate > 0.0) {
                return Err(invalid("attack rate"));
            }
        }

        for (index, wave) in self.waves.iter().enumerate() {
            for entry in &wave.entries {
                if !self.enemies.contains_key(entry.kind()) {
                    return Err(ConfigError::UnknownEnemyKind {
                        wave: u32::try_from(index + 1).unwrap_or(u32::MAX),
                        kind: entry.kind().clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
