//! Homing projectiles launched by towers.

use std::time::Duration;

use glam::Vec2;
use yatd_core::{EnemyId, ProjectileId, TowerId};

use crate::{enemy::Enemy, grid::Route, registry::Registry, tower::Tower};

/// Result of advancing a projectile for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ProjectileOutcome {
    /// The projectile is still travelling towards its target.
    InFlight,
    /// The projectile reached a living target and damaged it.
    Hit {
        /// Damage applied before clamping.
        damage: f32,
    },
    /// The target or the origin tower disappeared; nothing was applied.
    Expired,
}

impl ProjectileOutcome {
    /// Reports whether the projectile keeps flying after this outcome.
    #[must_use]
    pub const fn is_alive(self) -> bool {
        matches!(self, ProjectileOutcome::InFlight)
    }
}

/// Short-lived entity carrying one tower attack to one enemy.
///
/// Damage is resolved from the origin tower on impact, so upgrades bought
/// while the projectile flies still apply.
#[derive(Clone, Debug)]
pub struct Projectile {
    id: ProjectileId,
    tower: TowerId,
    target: EnemyId,
    position: Vec2,
    speed: f32,
    alive: bool,
}

impl Projectile {
    /// Launches a projectile from `position` towards `target`.
    #[must_use]
    pub fn new(
        id: ProjectileId,
        tower: TowerId,
        target: EnemyId,
        position: Vec2,
        speed: f32,
    ) -> Self {
        Self {
            id,
            tower,
            target,
            position,
            speed,
            alive: true,
        }
    }

    /// Homes towards the target's current position and resolves impact.
    pub fn update(
        &mut self,
        dt: Duration,
        route: &Route,
        towers: &Registry<TowerId, Tower>,
        enemies: &mut Registry<EnemyId, Enemy>,
    ) -> ProjectileOutcome {
        if !self.alive {
            return ProjectileOutcome::Expired;
        }

        let Some(enemy) = enemies.get_mut(self.target).filter(|enemy| enemy.is_alive()) else {
            self.alive = false;
            return ProjectileOutcome::Expired;
        };

        let destination = enemy.position(route);
        let step = self.speed * dt.as_secs_f32();
        if self.position.distance(destination) > step {
            self.position += (destination - self.position).normalize_or_zero() * step;
            return ProjectileOutcome::InFlight;
        }

        self.position = destination;
        self.alive = false;
        match towers.get(self.tower) {
            Some(tower) => {
                let damage = tower.damage();
                enemy.take_damage(damage);
                ProjectileOutcome::Hit { damage }
            }
            None => ProjectileOutcome::Expired,
        }
    }

    /// Reports whether the projectile is still in flight.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Identifier of the projectile.
    #[must_use]
    pub const fn id(&self) -> ProjectileId {
        self.id
    }

    /// Tower that launched the projectile.
    #[must_use]
    pub const fn tower(&self) -> TowerId {
        self.tower
    }

    /// Enemy the projectile homes on.
    #[must_use]
    pub const fn target(&self) -> EnemyId {
        self.target
    }

    /// Current position in cell units.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::{EnemyStats, TowerStats},
        grid::{Grid, MapLayout, SquareRole},
        upgrades::UpgradeTable,
    };
    use yatd_core::{CellCoord, EnemyKind, TowerKind};

    struct Arena {
        grid: Grid,
        towers: Registry<TowerId, Tower>,
        enemies: Registry<EnemyId, Enemy>,
        tower: TowerId,
        enemy: EnemyId,
    }

    fn arena() -> Arena {
        let grid = Grid::from_layout(MapLayout {
            columns: 3,
            rows: 2,
            squares: vec![
                SquareRole::Start,
                SquareRole::Route,
                SquareRole::Route,
                SquareRole::Buildable,
                SquareRole::Buildable,
                SquareRole::Buildable,
            ],
            base: CellCoord::new(2, 0),
        })
        .expect("valid map");

        let mut towers = Registry::new();
        let tower = towers
            .insert_with(|id| {
                Tower::new(
                    id,
                    TowerKind::Laser,
                    CellCoord::new(0, 1),
                    &TowerStats {
                        cost: 10,
                        damage: 4.0,
                        range: 3.0,
                        attack_rate: 1.0,
                        upgrades: Arc::new(UpgradeTable::default()),
                    },
                )
            })
            .expect("identifier available");

        let mut enemies = Registry::new();
        let enemy = enemies
            .insert_with(|id| {
                Enemy::new(
                    id,
                    EnemyKind::new("grunt"),
                    &EnemyStats {
                        health: 10.0,
                        speed: 0.0,
                        bounty: 1,
                        base_damage: 1,
                    },
                )
            })
            .expect("identifier available");

        Arena {
            grid,
            towers,
            enemies,
            tower,
            enemy,
        }
    }

    #[test]
    fn travels_then_hits_with_tower_damage() {
        let Arena {
            grid,
            towers,
            mut enemies,
            tower,
            enemy,
        } = arena();
        let route = grid.route_path();
        let mut projectile =
            Projectile::new(ProjectileId::new(0), tower, enemy, Vec2::new(0.5, 1.5), 2.0);

        assert_eq!(
            projectile.update(Duration::from_millis(250), route, &towers, &mut enemies),
            ProjectileOutcome::InFlight
        );
        assert!((projectile.position().y - 1.0).abs() < 1e-5);

        let outcome = projectile.update(Duration::from_millis(250), route, &towers, &mut enemies);
        assert_eq!(outcome, ProjectileOutcome::Hit { damage: 4.0 });
        assert!(!outcome.is_alive());
        assert!(!projectile.is_alive());

        let health = enemies.get(enemy).map(Enemy::health);
        assert_eq!(health, Some(6.0));
    }

    #[test]
    fn late_projectile_expires_without_damage() {
        let Arena {
            grid,
            towers,
            mut enemies,
            tower,
            enemy,
        } = arena();
        let route = grid.route_path();
        let mut projectile =
            Projectile::new(ProjectileId::new(0), tower, enemy, Vec2::new(0.5, 1.5), 100.0);

        if let Some(target) = enemies.get_mut(enemy) {
            target.take_damage(10.0);
        }

        assert_eq!(
            projectile.update(Duration::from_secs(1), route, &towers, &mut enemies),
            ProjectileOutcome::Expired
        );
        assert_eq!(enemies.get(enemy).map(Enemy::health), Some(0.0));

        let _ = enemies.remove(enemy);
        let mut orphan =
            Projectile::new(ProjectileId::new(1), tower, enemy, Vec2::new(0.5, 1.5), 100.0);
        assert_eq!(
            orphan.update(Duration::from_secs(1), route, &towers, &mut enemies),
            ProjectileOutcome::Expired
        );
    }

    #[test]
    fn projectile_from_removed_tower_expires_on_impact() {
        let Arena {
            grid,
            mut towers,
            mut enemies,
            tower,
            enemy,
        } = arena();
        let route = grid.route_path();
        let _ = towers.remove(tower);
        let mut projectile =
            Projectile::new(ProjectileId::new(0), tower, enemy, Vec2::new(0.5, 1.5), 100.0);

        assert_eq!(
            projectile.update(Duration::from_secs(1), route, &towers, &mut enemies),
            ProjectileOutcome::Expired
        );
        assert_eq!(enemies.get(enemy).map(Enemy::health), Some(10.0));
    }
}
