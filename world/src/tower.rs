//! Stationary towers with cooldown-driven attacks and purchasable upgrades.

use std::{sync::Arc, time::Duration};

use yatd_core::{CellCoord, EnemyId, GameError, TowerId, TowerKind, UpgradeKind, UpgradeLevels};
use yatd_system_tower_targeting::{TargetCandidate, TowerTargeting};

use crate::{
    config::TowerStats,
    enemy::Enemy,
    grid::Route,
    registry::Registry,
    upgrades::{UpgradeEntry, UpgradeTable},
};

/// Tower occupying a single square.
#[derive(Clone, Debug)]
pub struct Tower {
    id: TowerId,
    kind: TowerKind,
    cell: CellCoord,
    damage: f32,
    range: f32,
    attack_rate: f32,
    cooldown: Duration,
    target: Option<EnemyId>,
    levels: UpgradeLevels,
    upgrades: Arc<UpgradeTable>,
}

impl Tower {
    /// Creates a tower with the base stats of its kind and a ready weapon.
    #[must_use]
    pub fn new(id: TowerId, kind: TowerKind, cell: CellCoord, stats: &TowerStats) -> Self {
        Self {
            id,
            kind,
            cell,
            damage: stats.damage,
            range: stats.range,
            attack_rate: stats.attack_rate,
            cooldown: Duration::ZERO,
            target: None,
            levels: UpgradeLevels::default(),
            upgrades: Arc::clone(&stats.upgrades),
        }
    }

    /// Counts the cooldown down, maintains the target and fires when ready.
    ///
    /// Returns the enemy to shoot at when the tower completes an attack. Time
    /// left over after the cooldown expires mid-tick counts towards the next
    /// attack, so the fire rate does not depend on the tick length.
    pub fn update(
        &mut self,
        dt: Duration,
        route: &Route,
        enemies: &Registry<EnemyId, Enemy>,
        targeting: &TowerTargeting,
    ) -> Option<EnemyId> {
        let remaining = self.cooldown;
        self.cooldown = remaining.saturating_sub(dt);
        let origin = self.cell.center();

        if let Some(target) = self.target {
            let keep = enemies.get(target).map_or(false, |enemy| {
                enemy.is_alive() && targeting.in_range(origin, self.range, enemy.position(route))
            });
            if !keep {
                self.target = None;
            }
        }

        if self.target.is_none() {
            let candidates = enemies
                .iter()
                .filter(|(_, enemy)| enemy.is_alive())
                .map(|(id, enemy)| TargetCandidate {
                    id,
                    position: enemy.position(route),
                    progress: enemy.progress(),
                });
            self.target = targeting.select(origin, self.range, candidates);
        }

        if !self.cooldown.is_zero() {
            return None;
        }

        let target = self.target?;
        // An idle tower that was already ready carries no overshoot.
        let overshoot = if remaining.is_zero() {
            Duration::ZERO
        } else {
            dt.saturating_sub(remaining)
        };
        self.cooldown = self.attack_period().saturating_sub(overshoot);
        Some(target)
    }

    /// Buys the next level of `kind`, paying from `money`.
    ///
    /// Money and level stay untouched when the purchase fails.
    pub fn upgrade(
        &mut self,
        kind: UpgradeKind,
        money: &mut u32,
    ) -> Result<UpgradeEntry, GameError> {
        let level = self.levels.get(kind);
        let max_level = self.upgrades.max_level(kind);
        if level >= max_level {
            return Err(GameError::MaxLevelReached { kind, max_level });
        }

        let entry = self.upgrades.cost_and_delta(kind, level + 1)?;
        if *money < entry.cost {
            return Err(GameError::InsufficientFunds {
                cost: entry.cost,
                available: *money,
            });
        }

        *money -= entry.cost;
        self.levels.set(kind, level + 1);
        match kind {
            UpgradeKind::Speed => self.attack_rate += entry.delta,
            UpgradeKind::Range => self.range += entry.delta,
            UpgradeKind::Damage => self.damage += entry.delta,
        }
        Ok(entry)
    }

    /// Delta and cost of the next purchasable level of `kind`.
    #[must_use]
    pub fn next_upgrade(&self, kind: UpgradeKind) -> Option<UpgradeEntry> {
        self.upgrades
            .cost_and_delta(kind, self.levels.get(kind) + 1)
            .ok()
    }

    /// Drops the current target, handing it to a projectile or forgetting a
    /// removed enemy.
    pub fn clear_target(&mut self) {
        self.target = None;
    }

    /// Identifier of the tower.
    #[must_use]
    pub const fn id(&self) -> TowerId {
        self.id
    }

    /// Kind of the tower.
    #[must_use]
    pub const fn kind(&self) -> TowerKind {
        self.kind
    }

    /// Cell occupied by the tower.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Damage per projectile after upgrades.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Range in cells after upgrades.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.range
    }

    /// Attacks per second after upgrades.
    #[must_use]
    pub const fn attack_rate(&self) -> f32 {
        self.attack_rate
    }

    /// Time left before the next attack.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Enemy currently tracked.
    #[must_use]
    pub const fn target(&self) -> Option<EnemyId> {
        self.target
    }

    /// Purchased upgrade levels.
    #[must_use]
    pub const fn levels(&self) -> UpgradeLevels {
        self.levels
    }

    fn attack_period(&self) -> Duration {
        Duration::try_from_secs_f32(self.attack_rate.recip()).unwrap_or(Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::EnemyStats,
        grid::{Grid, MapLayout, SquareRole},
    };
    use yatd_core::EnemyKind;

    fn stats() -> TowerStats {
        let entries = UpgradeKind::ALL.into_iter().flat_map(|kind| {
            [
                (kind, 1, UpgradeEntry::new(1.0, 10)),
                (kind, 2, UpgradeEntry::new(2.0, 20)),
            ]
        });
        TowerStats {
            cost: 10,
            damage: 5.0,
            range: 2.0,
            attack_rate: 1.0,
            upgrades: Arc::new(UpgradeTable::new(2, entries).expect("valid table")),
        }
    }

    fn tower() -> Tower {
        Tower::new(TowerId::new(0), TowerKind::Electric, CellCoord::new(1, 1), &stats())
    }

    #[test]
    fn upgrade_applies_delta_and_charges_cost() {
        let mut tower = tower();
        let mut money = 25;

        let entry = tower
            .upgrade(UpgradeKind::Damage, &mut money)
            .expect("affordable");
        assert_eq!(entry.cost, 10);
        assert_eq!(money, 15);
        assert_eq!(tower.levels().get(UpgradeKind::Damage), 1);
        assert!((tower.damage() - 6.0).abs() < f32::EPSILON);
        assert_eq!(tower.next_upgrade(UpgradeKind::Damage), Some(UpgradeEntry::new(2.0, 20)));
    }

    #[test]
    fn failed_upgrades_leave_money_and_level_untouched() {
        let mut tower = tower();
        let mut money = 5;

        assert_eq!(
            tower.upgrade(UpgradeKind::Range, &mut money),
            Err(GameError::InsufficientFunds {
                cost: 10,
                available: 5
            })
        );
        assert_eq!(money, 5);
        assert_eq!(tower.levels().get(UpgradeKind::Range), 0);

        let mut money = 1_000;
        let _ = tower.upgrade(UpgradeKind::Range, &mut money).expect("level one");
        let _ = tower.upgrade(UpgradeKind::Range, &mut money).expect("level two");
        assert_eq!(money, 970);
        assert_eq!(
            tower.upgrade(UpgradeKind::Range, &mut money),
            Err(GameError::MaxLevelReached {
                kind: UpgradeKind::Range,
                max_level: 2
            })
        );
        assert_eq!(money, 970);
        assert_eq!(tower.levels().get(UpgradeKind::Range), 2);
        assert!((tower.range() - 5.0).abs() < f32::EPSILON);
        assert!(tower.next_upgrade(UpgradeKind::Range).is_none());
    }

    #[test]
    fn speed_upgrade_shortens_the_attack_period() {
        let mut tower = tower();
        let mut money = 100;
        let _ = tower.upgrade(UpgradeKind::Speed, &mut money).expect("affordable");
        assert!((tower.attack_rate() - 2.0).abs() < f32::EPSILON);
        assert_eq!(tower.attack_period(), Duration::from_millis(500));
    }

    #[test]
    fn fires_at_enemies_in_range_and_respects_cooldown() {
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
        let route = grid.route_path();
        let targeting = TowerTargeting::default();

        let mut enemies = Registry::new();
        let id = enemies
            .insert_with(|id| {
                Enemy::new(
                    id,
                    EnemyKind::new("grunt"),
                    &EnemyStats {
                        health: 10.0,
                        speed: 1.0,
                        bounty: 1,
                        base_damage: 1,
                    },
                )
            })
            .expect("identifier available");

        let mut tower = tower();
        assert_eq!(
            tower.update(Duration::from_millis(100), route, &enemies, &targeting),
            Some(id)
        );
        assert_eq!(tower.cooldown(), Duration::from_secs(1));

        tower.clear_target();
        assert_eq!(
            tower.update(Duration::from_millis(500), route, &enemies, &targeting),
            None,
            "cooldown still running"
        );
        assert_eq!(tower.target(), Some(id), "target is held between shots");

        assert_eq!(
            tower.update(Duration::from_millis(500), route, &enemies, &targeting),
            Some(id)
        );

        let _ = enemies.remove(id);
        assert_eq!(
            tower.update(Duration::from_secs(2), route, &enemies, &targeting),
            None
        );
        assert!(tower.target().is_none(), "removed enemy is forgotten");
    }

    #[test]
    fn cooldown_keeps_time_left_over_from_the_tick() {
        let grid = Grid::from_layout(MapLayout {
            columns: 2,
            rows: 2,
            squares: vec![
                SquareRole::Start,
                SquareRole::Route,
                SquareRole::Buildable,
                SquareRole::Buildable,
            ],
            base: CellCoord::new(1, 0),
        })
        .expect("valid map");
        let route = grid.route_path();
        let targeting = TowerTargeting::default();

        let mut enemies = Registry::new();
        let id = enemies
            .insert_with(|id| {
                Enemy::new(
                    id,
                    EnemyKind::new("statue"),
                    &EnemyStats {
                        health: 100.0,
                        speed: 0.0,
                        bounty: 1,
                        base_damage: 1,
                    },
                )
            })
            .expect("identifier available");

        let mut tower = tower();
        let step = Duration::from_millis(300);
        assert_eq!(tower.update(step, route, &enemies, &targeting), Some(id));
        assert_eq!(tower.cooldown(), Duration::from_secs(1));

        for _ in 0..3 {
            assert_eq!(tower.update(step, route, &enemies, &targeting), None);
        }
        assert_eq!(tower.cooldown(), Duration::from_millis(100));

        assert_eq!(tower.update(step, route, &enemies, &targeting), Some(id));
        assert_eq!(tower.cooldown(), Duration::from_millis(800));
    }
}
