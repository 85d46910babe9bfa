use glam::Vec2;
use yatd_core::{EnemyId, RangeShape, TargetPriority, TargetingPolicy};
use yatd_system_tower_targeting::{TargetCandidate, TowerTargeting};

fn candidates() -> Vec<TargetCandidate> {
    vec![
        TargetCandidate {
            id: EnemyId::new(3),
            position: Vec2::new(1.5, 0.5),
            progress: 1.0,
        },
        TargetCandidate {
            id: EnemyId::new(7),
            position: Vec2::new(2.5, 0.5),
            progress: 2.0,
        },
        TargetCandidate {
            id: EnemyId::new(5),
            position: Vec2::new(2.5, 0.5),
            progress: 2.0,
        },
        TargetCandidate {
            id: EnemyId::new(1),
            position: Vec2::new(9.5, 0.5),
            progress: 9.0,
        },
    ]
}

#[test]
fn selection_is_independent_of_candidate_order() {
    let policies = [
        TargetingPolicy::default(),
        TargetingPolicy {
            priority: TargetPriority::Nearest,
            shape: RangeShape::Manhattan,
        },
    ];
    let origin = Vec2::new(2.5, 1.5);

    for policy in policies {
        let system = TowerTargeting::new(policy);
        let forward = system.select(origin, 2.0, candidates());
        let mut reversed_input = candidates();
        reversed_input.reverse();
        let reversed = system.select(origin, 2.0, reversed_input);

        assert_eq!(forward, reversed, "policy {policy:?} depends on order");
    }
}

#[test]
fn far_enemy_with_most_progress_is_not_selected_when_out_of_range() {
    let system = TowerTargeting::default();
    let selected = system.select(Vec2::new(2.5, 1.5), 2.0, candidates());
    assert_eq!(
        selected,
        Some(EnemyId::new(5)),
        "enemy 1 leads the route but sits outside the range"
    );
}

#[test]
fn negative_range_never_selects() {
    let system = TowerTargeting::default();
    assert!(system
        .select(Vec2::new(2.5, 0.5), -1.0, candidates())
        .is_none());
}
