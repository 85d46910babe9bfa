#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tower defense engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands and
//! broadcasts [`Event`] values describing what happened. Presentation layers
//! never hold entity references; they poll the snapshot types declared here
//! between ticks.

use std::{fmt, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Yet Another Tower Defense";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests placement of a tower on the provided cell.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Cell that should host the tower.
        cell: CellCoord,
    },
    /// Requests the purchase of the next level of an upgrade for a tower.
    UpgradeTower {
        /// Identifier of the tower being upgraded.
        tower: TowerId,
        /// Attribute that should be improved.
        upgrade: UpgradeKind,
    },
    /// Requests that the next configured wave starts spawning.
    NextWave,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a wave spawner was installed.
    WaveStarted {
        /// One-based index of the wave.
        wave: u32,
    },
    /// Announces that the active wave emitted its final enemy.
    WaveSpawnComplete {
        /// One-based index of the wave.
        wave: u32,
    },
    /// Confirms that an enemy entered the route at the start square.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Configured kind of the enemy.
        kind: EnemyKind,
    },
    /// Reports that an enemy walked off the end of the route into the base.
    EnemyReachedBase {
        /// Identifier of the enemy that arrived.
        enemy: EnemyId,
        /// Base health removed by the arrival.
        damage: u32,
    },
    /// Reports that an enemy was removed after its health reached zero.
    EnemyKilled {
        /// Identifier of the enemy that died.
        enemy: EnemyId,
        /// Money granted for the kill.
        bounty: u32,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Cell occupied by the tower.
        cell: CellCoord,
        /// Money deducted for the placement.
        cost: u32,
    },
    /// Confirms that a tower upgrade was purchased.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Attribute that was improved.
        upgrade: UpgradeKind,
        /// Level reached after the purchase.
        level: u32,
        /// Money deducted for the purchase.
        cost: u32,
    },
    /// Reports that a tower completed an attack and launched a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the projectile homes on.
        enemy: EnemyId,
    },
    /// Reports that a projectile reached a living target and damaged it.
    ProjectileHit {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Enemy that received the damage.
        enemy: EnemyId,
        /// Amount of health removed before clamping.
        damage: f32,
    },
    /// Reports that a projectile expired because its target disappeared.
    ProjectileExpired {
        /// Identifier of the projectile.
        projectile: ProjectileId,
    },
    /// Terminal event emitted once when every wave was cleared.
    GameWon,
    /// Terminal event emitted once when the base health reached zero.
    GameLost,
    /// Reports that a command was rejected without mutating the world.
    CommandRejected {
        /// Specific reason the command failed.
        reason: GameError,
    },
}

/// Recoverable failures reported by world operations.
///
/// A failed operation never mutates the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum GameError {
    /// The coordinate lies outside the grid.
    #[error("cell {coord} lies outside the grid")]
    OutOfBounds {
        /// Offending coordinate.
        coord: CellCoord,
    },
    /// The square cannot host a tower.
    #[error("cell {coord} is not buildable")]
    NotBuildable {
        /// Offending coordinate.
        coord: CellCoord,
    },
    /// The purchase costs more money than is available.
    #[error("purchase costs {cost} but only {available} is available")]
    InsufficientFunds {
        /// Price of the purchase.
        cost: u32,
        /// Money held at the time of the request.
        available: u32,
    },
    /// The upgrade kind already reached its cap.
    #[error("{kind:?} upgrade is already at the maximum level {max_level}")]
    MaxLevelReached {
        /// Attribute that could not be upgraded.
        kind: UpgradeKind,
        /// Cap shared by all upgrade kinds of the tower type.
        max_level: u32,
    },
    /// The level does not exist in the upgrade table.
    #[error("{kind:?} upgrade has no level {level}")]
    InvalidLevel {
        /// Attribute that was looked up.
        kind: UpgradeKind,
        /// Requested level.
        level: u32,
    },
    /// A wave is still spawning enemies.
    #[error("a wave is still in progress")]
    WaveInProgress,
    /// Every configured wave was already started.
    #[error("no waves remain")]
    NoWavesRemaining,
    /// No tower with the identifier exists.
    #[error("tower {tower} does not exist")]
    UnknownTower {
        /// Identifier that failed to resolve.
        tower: TowerId,
    },
    /// The configuration declares no stats for the tower kind.
    #[error("tower kind {kind:?} is not configured")]
    UnknownTowerKind {
        /// Kind that failed to resolve.
        kind: TowerKind,
    },
    /// The game already reached a terminal state.
    #[error("the game is over")]
    GameOver,
    /// Every identifier of an entity arena has been handed out.
    #[error("no identifiers remain for new entities")]
    IdentifiersExhausted,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enemy#{}", self.0)
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TowerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tower#{}", self.0)
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Continuous position of the cell centre measured in cell units.
    #[must_use]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.column as f32 + 0.5, self.row as f32 + 0.5)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Configured enemy kind, keyed by the name used in the enemy table.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnemyKind(String);

impl EnemyKind {
    /// Creates an enemy kind from its configured name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name of the kind as written in the configuration.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Short-ranged tower with a quick attack cycle.
    Electric,
    /// Long-ranged tower with heavy, slow shots.
    Laser,
}

/// Independently levelled tower attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    /// Raises the attack rate.
    Speed,
    /// Extends the targeting range.
    Range,
    /// Raises the damage dealt per projectile.
    Damage,
}

impl UpgradeKind {
    /// Every upgrade kind in declaration order.
    pub const ALL: [UpgradeKind; 3] = [UpgradeKind::Speed, UpgradeKind::Range, UpgradeKind::Damage];
}

/// Purchased level per upgrade kind. Every kind starts at level zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpgradeLevels {
    speed: u32,
    range: u32,
    damage: u32,
}

impl UpgradeLevels {
    /// Level currently owned for the provided upgrade kind.
    #[must_use]
    pub const fn get(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::Speed => self.speed,
            UpgradeKind::Range => self.range,
            UpgradeKind::Damage => self.damage,
        }
    }

    /// Records a new level for the provided upgrade kind.
    pub fn set(&mut self, kind: UpgradeKind, level: u32) {
        match kind {
            UpgradeKind::Speed => self.speed = level,
            UpgradeKind::Range => self.range = level,
            UpgradeKind::Damage => self.damage = level,
        }
    }
}

/// Ordering used to pick a target among enemies within range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPriority {
    /// Prefer the enemy that travelled furthest along the route.
    #[default]
    Progress,
    /// Prefer the enemy closest to the tower.
    Nearest,
}

/// Distance metric that decides whether an enemy is within range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeShape {
    /// Euclidean distance between the tower centre and the enemy.
    #[default]
    Circle,
    /// Manhattan distance between the tower centre and the enemy.
    Manhattan,
}

/// Target acquisition policy shared by every tower.
///
/// Ties are always broken by the lowest enemy identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetingPolicy {
    /// Ordering applied to candidates within range.
    #[serde(default)]
    pub priority: TargetPriority,
    /// Metric used for the range test.
    #[serde(default)]
    pub shape: RangeShape,
}

/// Lifecycle state of a game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// The game accepts commands and ticks.
    #[default]
    Ongoing,
    /// Every wave was cleared with the base intact.
    Won,
    /// The base health reached zero.
    Lost,
}

impl GameStatus {
    /// Reports whether the game reached a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::Ongoing)
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Configured kind of the enemy.
    pub kind: EnemyKind,
    /// Continuous position measured in cell units.
    pub position: Vec2,
    /// Cells travelled along the route.
    pub progress: f32,
    /// Remaining health.
    pub health: f32,
    /// Remaining health divided by the kind's maximum health.
    pub health_fraction: f32,
    /// Whether the enemy still has health left.
    pub alive: bool,
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// Purchased upgrade levels.
    pub levels: UpgradeLevels,
    /// Damage dealt per projectile after upgrades.
    pub damage: f32,
    /// Targeting range in cells after upgrades.
    pub range: f32,
    /// Attacks per second after upgrades.
    pub attack_rate: f32,
    /// Time left before the tower may fire again.
    pub cooldown: Duration,
    /// Enemy the tower currently tracks, if any.
    pub target: Option<EnemyId>,
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier of the projectile.
    pub id: ProjectileId,
    /// Tower that launched the projectile.
    pub tower: TowerId,
    /// Enemy the projectile homes on.
    pub target: EnemyId,
    /// Continuous position measured in cell units.
    pub position: Vec2,
}

/// World-level counters presented by the control panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldCounters {
    /// Money available for placements and upgrades.
    pub money: u32,
    /// Remaining base health.
    pub base_health: u32,
    /// One-based index of the latest started wave, zero before the first.
    pub current_wave: u32,
    /// Number of configured waves.
    pub max_waves: u32,
    /// Live enemies plus enemies the active wave has yet to emit.
    pub enemies_remaining: u32,
    /// Lifecycle state of the game.
    pub status: GameStatus,
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single enemy.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot describing all placed towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single tower.
    #[must_use]
    pub fn get(&self, id: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}
