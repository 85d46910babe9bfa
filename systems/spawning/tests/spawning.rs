use std::time::Duration;

use yatd_core::EnemyKind;
use yatd_system_spawning::{SpawnEntry, WaveSpawner};

fn grunt() -> EnemyKind {
    EnemyKind::new("grunt")
}

fn runner() -> EnemyKind {
    EnemyKind::new("runner")
}

#[test]
fn emits_multiple_enemies_for_large_dt() {
    let mut spawner = WaveSpawner::new(vec![SpawnEntry::new(
        grunt(),
        10,
        Duration::from_millis(500),
    )]);

    let mut emitted = Vec::new();
    spawner.update(Duration::from_secs(2), &mut emitted);

    assert_eq!(emitted.len(), 4, "expected one emission per interval");
    assert_eq!(spawner.remaining(), 6);
    assert!(!spawner.is_complete());
}

#[test]
fn no_emission_before_first_delay_elapses() {
    let mut spawner = WaveSpawner::new(vec![SpawnEntry::new(grunt(), 1, Duration::from_secs(1))]);

    let mut emitted = Vec::new();
    spawner.update(Duration::from_millis(999), &mut emitted);
    assert!(emitted.is_empty(), "timer has not crossed the delay yet");

    spawner.update(Duration::from_millis(1), &mut emitted);
    assert_eq!(emitted, vec![grunt()]);
    assert!(spawner.is_complete());
}

#[test]
fn entries_are_emitted_in_order_and_carry_leftover_time() {
    let mut spawner = WaveSpawner::new(vec![
        SpawnEntry::new(grunt(), 2, Duration::from_millis(400)),
        SpawnEntry::new(runner(), 2, Duration::from_millis(300)),
    ]);

    let mut emitted = Vec::new();
    spawner.update(Duration::from_millis(1_000), &mut emitted);
    assert_eq!(
        emitted,
        vec![grunt(), grunt()],
        "200ms left over is not enough for a runner"
    );

    spawner.update(Duration::from_millis(100), &mut emitted);
    assert_eq!(emitted, vec![grunt(), grunt(), runner()]);
    assert_eq!(spawner.remaining(), 1);

    spawner.update(Duration::from_millis(300), &mut emitted);
    assert_eq!(emitted.len(), 4);
    assert!(spawner.is_complete());
}

#[test]
fn complete_spawner_ignores_further_updates() {
    let mut spawner = WaveSpawner::new(vec![SpawnEntry::new(grunt(), 1, Duration::ZERO)]);

    let mut emitted = Vec::new();
    spawner.update(Duration::ZERO, &mut emitted);
    assert_eq!(emitted.len(), 1, "zero delay emits without elapsed time");
    assert!(spawner.is_complete());

    spawner.update(Duration::from_secs(60), &mut emitted);
    assert_eq!(emitted.len(), 1);
}

#[test]
fn total_emissions_do_not_depend_on_tick_size() {
    let entries = vec![
        SpawnEntry::new(grunt(), 3, Duration::from_millis(250)),
        SpawnEntry::new(runner(), 2, Duration::from_millis(750)),
    ];

    let mut coarse = WaveSpawner::new(entries.clone());
    let mut coarse_out = Vec::new();
    coarse.update(Duration::from_secs(3), &mut coarse_out);

    let mut fine = WaveSpawner::new(entries);
    let mut fine_out = Vec::new();
    for _ in 0..300 {
        fine.update(Duration::from_millis(10), &mut fine_out);
    }

    assert_eq!(coarse_out, fine_out);
    assert!(coarse.is_complete());
    assert!(fine.is_complete());
}
