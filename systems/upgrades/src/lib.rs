#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-tower currency ledger and the three-track upgrade economy.
//!
//! Towers earn currency from the damage they deal. The economy owns the
//! ledger and the upgrade table; towers are borrowed only while a purchase
//! or a stat recomputation runs.

use std::collections::BTreeMap;

use bastion_core::{StatDelta, Tower, TowerId, TowerKind, UpgradeRejected, UpgradeTrack};
use tracing::debug;

/// Growth factor between consecutive upgrade levels.
pub const COST_GROWTH: f64 = 1.5;

/// Ledger key pairing a tower with its archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LedgerKey {
    /// Tower holding the balance.
    pub tower: TowerId,
    /// Archetype of the tower.
    pub kind: TowerKind,
}

/// Currency balances keyed by tower.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CurrencyLedger {
    balances: BTreeMap<LedgerKey, f64>,
}

impl CurrencyLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount`, ignoring non-positive and non-finite amounts.
    ///
    /// Returns whether the balance changed.
    pub fn credit(&mut self, key: LedgerKey, amount: f64) -> bool {
        if !amount.is_finite() || amount <= 0.0 {
            return false;
        }
        *self.balances.entry(key).or_insert(0.0) += amount;
        true
    }

    /// Balance held under `key`.
    #[must_use]
    pub fn balance(&self, key: LedgerKey) -> f64 {
        self.balances.get(&key).copied().unwrap_or(0.0)
    }

    /// Deducts `amount` if the balance covers it.
    pub fn debit(&mut self, key: LedgerKey, amount: f64) -> Result<(), UpgradeRejected> {
        let available = self.balance(key);
        if available < amount {
            return Err(UpgradeRejected::InsufficientCurrency {
                cost: amount,
                available,
            });
        }
        let _ = self.balances.insert(key, (available - amount).max(0.0));
        Ok(())
    }

    /// Drops every balance held by `tower`.
    pub fn forget(&mut self, tower: TowerId) {
        self.balances.retain(|key, _| key.tower != tower);
    }

    /// Sum of every balance.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.balances.values().sum()
    }
}

/// Cost curve and per-level deltas of one upgrade track.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackDefinition {
    /// Cost of the first level.
    pub base_cost: f64,
    /// Stat change granted by each level, in purchase order.
    pub deltas: Vec<StatDelta>,
}

impl TrackDefinition {
    /// Track offering `max_level` identical levels.
    #[must_use]
    pub fn uniform(base_cost: f64, max_level: u8, delta: StatDelta) -> Self {
        Self {
            base_cost,
            deltas: vec![delta; usize::from(max_level)],
        }
    }

    /// Highest purchasable level.
    #[must_use]
    pub fn max_level(&self) -> u8 {
        u8::try_from(self.deltas.len()).unwrap_or(u8::MAX)
    }

    /// Price of buying the level after `level`, or `None` at the cap.
    #[must_use]
    pub fn cost(&self, level: u8) -> Option<f64> {
        (level < self.max_level()).then(|| self.base_cost * COST_GROWTH.powi(i32::from(level)))
    }
}

/// Upgrade tracks offered by one tower archetype.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeDefinition {
    tracks: [TrackDefinition; 3],
}

impl UpgradeDefinition {
    /// Bundles the damage, range and utility tracks.
    #[must_use]
    pub fn new(damage: TrackDefinition, range: TrackDefinition, utility: TrackDefinition) -> Self {
        Self {
            tracks: [damage, range, utility],
        }
    }

    /// Definition of a single track.
    #[must_use]
    pub fn track(&self, track: UpgradeTrack) -> &TrackDefinition {
        &self.tracks[track.index()]
    }
}

/// Upgrade definitions for every tower archetype.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeTable {
    definitions: BTreeMap<TowerKind, UpgradeDefinition>,
}

impl UpgradeTable {
    /// Standard progression: five damage levels, four range levels and three
    /// utility levels scaled from each archetype's base stats.
    #[must_use]
    pub fn standard() -> Self {
        let definitions = TowerKind::ALL
            .iter()
            .map(|kind| {
                let archetype = kind.archetype();
                let base = archetype.base;
                let damage_levels = if archetype.damage_type().is_some() {
                    5
                } else {
                    0
                };
                let definition = UpgradeDefinition::new(
                    TrackDefinition::uniform(
                        50.0,
                        damage_levels,
                        StatDelta {
                            tick_damage: base.tick_damage * 0.2,
                            ..StatDelta::damage(base.damage * 0.25)
                        },
                    ),
                    TrackDefinition::uniform(40.0, 4, StatDelta::range(base.range * 0.1)),
                    TrackDefinition::uniform(60.0, 3, archetype.utility),
                );
                (*kind, definition)
            })
            .collect();
        Self { definitions }
    }

    /// Replaces the definition of one archetype.
    pub fn set(&mut self, kind: TowerKind, definition: UpgradeDefinition) {
        let _ = self.definitions.insert(kind, definition);
    }

    /// Definition of a track for an archetype.
    #[must_use]
    pub fn track(&self, kind: TowerKind, track: UpgradeTrack) -> Option<&TrackDefinition> {
        self.definitions
            .get(&kind)
            .map(|definition| definition.track(track))
    }
}

impl Default for UpgradeTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Currency ledger plus upgrade table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpgradeEconomy {
    table: UpgradeTable,
    ledger: CurrencyLedger,
}

impl UpgradeEconomy {
    /// Creates an economy with an empty ledger.
    #[must_use]
    pub fn new(table: UpgradeTable) -> Self {
        Self {
            table,
            ledger: CurrencyLedger::new(),
        }
    }

    /// Upgrade table in use.
    #[must_use]
    pub fn table(&self) -> &UpgradeTable {
        &self.table
    }

    /// Currency ledger.
    #[must_use]
    pub fn ledger(&self) -> &CurrencyLedger {
        &self.ledger
    }

    /// Credits a tower; non-positive and non-finite amounts are ignored.
    pub fn add_currency(&mut self, tower: TowerId, kind: TowerKind, amount: f64) -> bool {
        self.ledger.credit(LedgerKey { tower, kind }, amount)
    }

    /// Currency held by a tower.
    #[must_use]
    pub fn currency(&self, tower: TowerId, kind: TowerKind) -> f64 {
        self.ledger.balance(LedgerKey { tower, kind })
    }

    /// Price of buying the level after `level`, or `None` at the cap.
    #[must_use]
    pub fn get_cost(&self, kind: TowerKind, track: UpgradeTrack, level: u8) -> Option<f64> {
        self.table.track(kind, track)?.cost(level)
    }

    /// Reports whether the tower can afford its next level on `track`.
    #[must_use]
    pub fn can_upgrade(
        &self,
        towers: &BTreeMap<TowerId, Tower>,
        id: TowerId,
        track: UpgradeTrack,
    ) -> bool {
        let Some(tower) = towers.get(&id) else {
            return false;
        };
        self.get_cost(tower.kind, track, tower.levels.get(track))
            .is_some_and(|cost| self.currency(id, tower.kind) >= cost)
    }

    /// Buys the next level on `track`, deducting its cost and recomputing
    /// the tower's stats.
    ///
    /// Rejections leave both the ledger and the tower untouched.
    pub fn upgrade(
        &mut self,
        towers: &mut BTreeMap<TowerId, Tower>,
        id: TowerId,
        track: UpgradeTrack,
    ) -> Result<u8, UpgradeRejected> {
        let tower = towers.get_mut(&id).ok_or(UpgradeRejected::UnknownTower)?;
        let level = tower.levels.get(track);
        let definition = self
            .table
            .track(tower.kind, track)
            .ok_or(UpgradeRejected::MaxLevel { max_level: 0 })?;
        let cost = definition.cost(level).ok_or(UpgradeRejected::MaxLevel {
            max_level: definition.max_level(),
        })?;

        self.ledger.debit(
            LedgerKey {
                tower: id,
                kind: tower.kind,
            },
            cost,
        )?;

        let level = level + 1;
        tower.levels.set(track, level);
        self.apply_to_tower(tower);
        debug!(tower = id.get(), ?track, level, cost, "upgrade purchased");
        Ok(level)
    }

    /// Resets the tower to its base stats and replays every purchased level.
    pub fn apply_to_tower(&self, tower: &mut Tower) {
        let mut stats = tower.base;
        for track in UpgradeTrack::ALL {
            let Some(definition) = self.table.track(tower.kind, track) else {
                continue;
            };
            let purchased = usize::from(tower.levels.get(track));
            for delta in definition.deltas.iter().take(purchased) {
                stats.apply(delta);
            }
        }
        tower.stats = stats;
    }

    /// Drops the ledger entry of a removed tower.
    pub fn forget(&mut self, tower: TowerId) {
        self.ledger.forget(tower);
    }

    /// Clears every balance.
    pub fn reset(&mut self) {
        self.ledger = CurrencyLedger::new();
    }
}
