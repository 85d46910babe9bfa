//! Path-following enemies.

use std::time::Duration;

use glam::Vec2;
use yatd_core::{EnemyId, EnemyKind};

use crate::{config::EnemyStats, grid::Route};

/// Result of advancing an enemy for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyStep {
    /// The enemy is still walking the route.
    Moving,
    /// The enemy passed the final waypoint and reached the base.
    Arrived,
    /// The enemy has no health left and stays put until it is removed.
    Dead,
}

/// Actor walking the route from the start square to the base.
#[derive(Clone, Debug)]
pub struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    max_health: f32,
    health: f32,
    speed: f32,
    bounty: u32,
    base_damage: u32,
    progress: f32,
}

impl Enemy {
    /// Creates an enemy at the start of the route.
    #[must_use]
    pub fn new(id: EnemyId, kind: EnemyKind, stats: &EnemyStats) -> Self {
        Self {
            id,
            kind,
            max_health: stats.health,
            health: stats.health,
            speed: stats.speed,
            bounty: stats.bounty,
            base_damage: stats.base_damage,
            progress: 0.0,
        }
    }

    /// Advances the enemy along the route by `speed * dt`.
    ///
    /// Reaching the base is only reported; the caller applies its consequences.
    pub fn update(&mut self, dt: Duration, route: &Route) -> EnemyStep {
        if !self.is_alive() {
            return EnemyStep::Dead;
        }

        let length = route.length();
        self.progress += self.speed * dt.as_secs_f32();
        if self.progress >= length {
            self.progress = length;
            return EnemyStep::Arrived;
        }

        EnemyStep::Moving
    }

    /// Removes health, clamping at zero.
    pub fn take_damage(&mut self, amount: f32) {
        self.health = (self.health - amount.max(0.0)).max(0.0);
    }

    /// Reports whether the enemy still has health left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Identifier of the enemy.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Configured kind.
    #[must_use]
    pub fn kind(&self) -> &EnemyKind {
        &self.kind
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Remaining health relative to the spawn health.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    /// Cells travelled along the route.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Money granted when the enemy is killed.
    #[must_use]
    pub const fn bounty(&self) -> u32 {
        self.bounty
    }

    /// Base health removed when the enemy reaches the base.
    #[must_use]
    pub const fn base_damage(&self) -> u32 {
        self.base_damage
    }

    /// Continuous position on the board.
    #[must_use]
    pub fn position(&self, route: &Route) -> Vec2 {
        route.position_at(self.progress)
    }
}
