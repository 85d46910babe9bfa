#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timer-driven wave spawner that emits enemy kinds on a fixed cadence.
//!
//! The spawner never owns enemies. Every emission is handed to the caller as
//! an [`EnemyKind`], and the world decides how to materialise it.

use std::{collections::VecDeque, time::Duration};

use yatd_core::EnemyKind;

/// One group of identical enemies within a wave.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnEntry {
    kind: EnemyKind,
    count: u32,
    delay: Duration,
}

impl SpawnEntry {
    /// Creates an entry that emits `count` enemies of `kind`, one every `delay`.
    #[must_use]
    pub fn new(kind: EnemyKind, count: u32, delay: Duration) -> Self {
        Self { kind, count, delay }
    }

    /// Kind emitted by the entry.
    #[must_use]
    pub fn kind(&self) -> &EnemyKind {
        &self.kind
    }

    /// Number of enemies the entry still has to emit.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Simulated time between two consecutive emissions.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

/// Emits the enemies of a single wave according to its composition.
#[derive(Clone, Debug)]
pub struct WaveSpawner {
    entries: VecDeque<SpawnEntry>,
    accumulator: Duration,
    complete: bool,
}

impl WaveSpawner {
    /// Creates a spawner for the provided entries, emitted in order.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = SpawnEntry>) -> Self {
        let entries: VecDeque<SpawnEntry> = entries
            .into_iter()
            .filter(|entry| entry.count > 0)
            .collect();
        let complete = entries.is_empty();
        Self {
            entries,
            accumulator: Duration::ZERO,
            complete,
        }
    }

    /// Advances the spawn timer and appends every kind due for emission.
    ///
    /// A single large `dt` may emit several enemies; leftover time carries over
    /// to the next entry.
    pub fn update(&mut self, dt: Duration, out: &mut Vec<EnemyKind>) {
        if self.complete {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(dt);

        while let Some(entry) = self.entries.front_mut() {
            if self.accumulator < entry.delay {
                break;
            }

            self.accumulator -= entry.delay;
            out.push(entry.kind.clone());
            entry.count -= 1;

            if entry.count == 0 {
                let _ = self.entries.pop_front();
            }
        }

        if self.entries.is_empty() {
            self.complete = true;
            self.accumulator = Duration::ZERO;
        }
    }

    /// Reports whether every entry was exhausted.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Number of enemies still waiting to be emitted.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |total, entry| total.saturating_add(entry.count))
    }
}
