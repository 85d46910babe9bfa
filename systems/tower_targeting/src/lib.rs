#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks deterministic tower targets from enemy candidates.

use glam::Vec2;
use yatd_core::{EnemyId, RangeShape, TargetPriority, TargetingPolicy};

/// Minimal description of a live enemy considered for targeting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetCandidate {
    /// Identifier of the enemy.
    pub id: EnemyId,
    /// Continuous position measured in cell units.
    pub position: Vec2,
    /// Cells travelled along the route.
    pub progress: f32,
}

/// Tower targeting system parameterised by a [`TargetingPolicy`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TowerTargeting {
    policy: TargetingPolicy,
}

impl TowerTargeting {
    /// Creates a targeting system applying the provided policy.
    #[must_use]
    pub const fn new(policy: TargetingPolicy) -> Self {
        Self { policy }
    }

    /// Policy applied by the system.
    #[must_use]
    pub const fn policy(&self) -> TargetingPolicy {
        self.policy
    }

    /// Reports whether `position` lies within `range` cells of `origin`.
    #[must_use]
    pub fn in_range(&self, origin: Vec2, range: f32, position: Vec2) -> bool {
        if range < 0.0 {
            return false;
        }
        distance(self.policy.shape, origin, position) <= range
    }

    /// Selects the preferred candidate within range of the tower.
    ///
    /// Candidates outside the range are skipped. Equal scores resolve to the
    /// lowest enemy identifier so the outcome never depends on input order.
    #[must_use]
    pub fn select<I>(&self, origin: Vec2, range: f32, candidates: I) -> Option<EnemyId>
    where
        I: IntoIterator<Item = TargetCandidate>,
    {
        let mut best: Option<BestCandidate> = None;

        for candidate in candidates {
            let distance = distance(self.policy.shape, origin, candidate.position);
            if range < 0.0 || distance > range {
                continue;
            }

            let current = BestCandidate {
                enemy: candidate.id,
                distance,
                progress: candidate.progress,
            };

            match &mut best {
                Some(existing) => {
                    if current.precedes(existing, self.policy.priority) {
                        *existing = current;
                    }
                }
                None => best = Some(current),
            }
        }

        best.map(|candidate| candidate.enemy)
    }
}

fn distance(shape: RangeShape, origin: Vec2, position: Vec2) -> f32 {
    match shape {
        RangeShape::Circle => origin.distance(position),
        RangeShape::Manhattan => {
            let delta = (position - origin).abs();
            delta.x + delta.y
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    enemy: EnemyId,
    distance: f32,
    progress: f32,
}

impl BestCandidate {
    fn precedes(&self, other: &Self, priority: TargetPriority) -> bool {
        match priority {
            TargetPriority::Progress => {
                if self.progress != other.progress {
                    return self.progress > other.progress;
                }
            }
            TargetPriority::Nearest => {
                if self.distance != other.distance {
                    return self.distance < other.distance;
                }
            }
        }

        self.enemy < other.enemy
    }
}
