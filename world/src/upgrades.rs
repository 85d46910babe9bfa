//! Two-dimensional upgrade lookup keyed by (upgrade kind, level).

use std::collections::BTreeMap;

use yatd_core::{GameError, UpgradeKind};

use crate::config::ConfigError;

/// Value delta and price of a single upgrade level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpgradeEntry {
    /// Amount added to the upgraded attribute.
    pub delta: f32,
    /// Money required to buy the level.
    pub cost: u32,
}

impl UpgradeEntry {
    /// Creates an entry from its delta and cost.
    #[must_use]
    pub const fn new(delta: f32, cost: u32) -> Self {
        Self { delta, cost }
    }
}

/// Immutable upgrade table of a tower type.
///
/// Every upgrade kind owns levels `1..=max_level`; the cap is shared by all
/// kinds of the tower type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpgradeTable {
    max_level: u32,
    entries: BTreeMap<(UpgradeKind, u32), UpgradeEntry>,
}

impl UpgradeTable {
    /// Builds the table, requiring every kind to define each level exactly once.
    pub fn new<I>(max_level: u32, entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (UpgradeKind, u32, UpgradeEntry)>,
    {
        let mut table = BTreeMap::new();

        for (kind, level, entry) in entries {
            if level == 0 || level > max_level {
                return Err(ConfigError::UpgradeLevelOutOfRange {
                    kind,
                    level,
                    max_level,
                });
            }
            if !entry.delta.is_finite() {
                return Err(ConfigError::NonFiniteUpgradeDelta { kind, level });
            }
            if table.insert((kind, level), entry).is_some() {
                return Err(ConfigError::DuplicateUpgradeLevel { kind, level });
            }
        }

        for kind in UpgradeKind::ALL {
            for level in 1..=max_level {
                if !table.contains_key(&(kind, level)) {
                    return Err(ConfigError::MissingUpgradeLevel { kind, level });
                }
            }
        }

        Ok(Self {
            max_level,
            entries: table,
        })
    }

    /// Resolves the delta and cost of `level` for the provided kind.
    pub fn cost_and_delta(
        &self,
        kind: UpgradeKind,
        level: u32,
    ) -> Result<UpgradeEntry, GameError> {
        if level == 0 || level > self.max_level(kind) {
            return Err(GameError::InvalidLevel { kind, level });
        }

        self.entries
            .get(&(kind, level))
            .copied()
            .ok_or(GameError::InvalidLevel { kind, level })
    }

    /// Highest purchasable level of the provided kind.
    #[must_use]
    pub fn max_level(&self, _kind: UpgradeKind) -> u32 {
        self.max_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_table(max_level: u32) -> Vec<(UpgradeKind, u32, UpgradeEntry)> {
        UpgradeKind::ALL
            .into_iter()
            .flat_map(|kind| {
                (1..=max_level).map(move |level| {
                    (kind, level, UpgradeEntry::new(level as f32, level * 10))
                })
            })
            .collect()
    }

    #[test]
    fn looks_up_entries_by_kind_and_level() {
        let table = UpgradeTable::new(2, full_table(2)).expect("valid table");
        let entry = table
            .cost_and_delta(UpgradeKind::Range, 2)
            .expect("level two exists");
        assert_eq!(entry, UpgradeEntry::new(2.0, 20));
        assert_eq!(table.max_level(UpgradeKind::Damage), 2);
    }

    #[test]
    fn rejects_levels_outside_the_cap() {
        let table = UpgradeTable::new(2, full_table(2)).expect("valid table");
        assert_eq!(
            table.cost_and_delta(UpgradeKind::Speed, 0),
            Err(GameError::InvalidLevel {
                kind: UpgradeKind::Speed,
                level: 0
            })
        );
        assert_eq!(
            table.cost_and_delta(UpgradeKind::Speed, 3),
            Err(GameError::InvalidLevel {
                kind: UpgradeKind::Speed,
                level: 3
            })
        );
    }

    #[test]
    fn construction_requires_contiguous_levels() {
        let mut entries = full_table(3);
        entries.retain(|(kind, level, _)| !(*kind == UpgradeKind::Damage && *level == 2));
        assert_eq!(
            UpgradeTable::new(3, entries),
            Err(ConfigError::MissingUpgradeLevel {
                kind: UpgradeKind::Damage,
                level: 2
            })
        );
    }

    #[test]
    fn construction_rejects_duplicates_and_overflow() {
        let mut duplicated = full_table(1);
        duplicated.push((UpgradeKind::Speed, 1, UpgradeEntry::new(0.5, 5)));
        assert_eq!(
            UpgradeTable::new(1, duplicated),
            Err(ConfigError::DuplicateUpgradeLevel {
                kind: UpgradeKind::Speed,
                level: 1
            })
        );

        assert_eq!(
            UpgradeTable::new(1, full_table(2)),
            Err(ConfigError::UpgradeLevelOutOfRange {
                kind: UpgradeKind::Speed,
                level: 2,
                max_level: 1
            })
        );
    }

    #[test]
    fn construction_rejects_non_finite_deltas() {
        for delta in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let mut entries = full_table(2);
            entries.push((UpgradeKind::Range, 2, UpgradeEntry::new(delta, 5)));
            entries.retain(|(kind, level, entry)| {
                !(*kind == UpgradeKind::Range && *level == 2 && entry.delta.is_finite())
            });
            assert_eq!(
                UpgradeTable::new(2, entries),
                Err(ConfigError::NonFiniteUpgradeDelta {
                    kind: UpgradeKind::Range,
                    level: 2
                })
            );
        }
    }

    #[test]
    fn empty_table_has_no_levels() {
        let table = UpgradeTable::default();
        assert_eq!(table.max_level(UpgradeKind::Speed), 0);
        assert!(table.cost_and_delta(UpgradeKind::Speed, 1).is_err());
    }
}
