//! Keyed card counters.
//!
//! This module contains:
//! - [`ItemManager`], a count per kind used for resource hands, the bank and
//!   the growth-card pools
//! - Growth card kinds and the per-player [`GrowthCardManager`]

use crate::error::PlayerError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// A closed set of card kinds that can be counted
pub trait ItemKind: Copy + Ord + Debug + 'static {
    /// Every kind, in `Ord` order
    const ALL: &'static [Self];
}

/// A count per kind.
///
/// Zero counts are never stored, so two managers holding the same cards are
/// equal no matter how they got there. Iteration follows the kind's `Ord`
/// order. On the wire it is a plain map of kind to count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<K, u32>",
    into = "BTreeMap<K, u32>",
    bound(
        serialize = "K: Serialize + Clone",
        deserialize = "K: Deserialize<'de> + Ord"
    )
)]
pub struct ItemManager<K> {
    counts: BTreeMap<K, u32>,
}

impl<K: Ord> From<BTreeMap<K, u32>> for ItemManager<K> {
    fn from(mut counts: BTreeMap<K, u32>) -> Self {
        counts.retain(|_, count| *count > 0);
        Self { counts }
    }
}

impl<K> From<ItemManager<K>> for BTreeMap<K, u32> {
    fn from(manager: ItemManager<K>) -> Self {
        manager.counts
    }
}

impl<K> Default for ItemManager<K> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }
}

impl<K: ItemKind> ItemManager<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manager from `(kind, count)` pairs
    pub fn with(items: impl IntoIterator<Item = (K, u32)>) -> Self {
        let mut manager = Self::new();
        for (kind, count) in items {
            manager.add(kind, count);
        }
        manager
    }

    /// The same count of every kind
    pub fn uniform(count: u32) -> Self {
        Self::with(K::ALL.iter().map(|&kind| (kind, count)))
    }

    pub fn get(&self, kind: K) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Non-zero counts in kind order
    pub fn iter(&self) -> impl Iterator<Item = (K, u32)> + '_ {
        self.counts.iter().map(|(&kind, &count)| (kind, count))
    }

    pub fn add(&mut self, kind: K, count: u32) {
        if count > 0 {
            *self.counts.entry(kind).or_insert(0) += count;
        }
    }

    pub fn remove(&mut self, kind: K, count: u32) -> Result<(), PlayerError> {
        let have = self.get(kind);
        if have < count {
            return Err(PlayerError::NotEnough);
        }
        if have == count {
            self.counts.remove(&kind);
        } else if count > 0 {
            self.counts.insert(kind, have - count);
        }
        Ok(())
    }

    /// Whether every count in `other` is covered by this manager
    pub fn contains(&self, other: &ItemManager<K>) -> bool {
        other.iter().all(|(kind, count)| self.get(kind) >= count)
    }

    pub fn add_all(&mut self, other: &ItemManager<K>) {
        for (kind, count) in other.iter() {
            self.add(kind, count);
        }
    }

    /// Remove every count in `other`, or nothing at all if any kind is short
    pub fn remove_all(&mut self, other: &ItemManager<K>) -> Result<(), PlayerError> {
        if !self.contains(other) {
            return Err(PlayerError::NotEnough);
        }
        for (kind, count) in other.iter() {
            self.remove(kind, count)?;
        }
        Ok(())
    }

    /// Remove one item picked uniformly among all held items
    pub fn remove_random<R: Rng>(&mut self, rng: &mut R) -> Result<K, PlayerError> {
        let total = self.total();
        if total == 0 {
            return Err(PlayerError::NotFound);
        }
        let mut index = rng.gen_range(0..total);
        let mut picked = None;
        for (kind, count) in self.iter() {
            if index < count {
                picked = Some(kind);
                break;
            }
            index -= count;
        }
        let kind = picked.ok_or(PlayerError::NotFound)?;
        self.remove(kind, 1)?;
        Ok(kind)
    }

    /// Remove every item of one kind, returning how many there were
    pub fn take_all(&mut self, kind: K) -> u32 {
        self.counts.remove(&kind).unwrap_or(0)
    }
}

impl<K: ItemKind> FromIterator<(K, u32)> for ItemManager<K> {
    fn from_iter<I: IntoIterator<Item = (K, u32)>>(iter: I) -> Self {
        Self::with(iter)
    }
}

// ====== Growth cards ======

/// Growth card kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GrowthCard {
    /// Move the thief and steal; counts towards largest army
    Soldier,
    /// One hidden victory point
    VictoryPoint,
    /// Build two roads for free
    Roaming,
    /// Take two resources from the bank
    Wealth,
    /// Collect one resource from every other player
    Gatherer,
}

impl ItemKind for GrowthCard {
    const ALL: &'static [Self] = &[
        GrowthCard::Soldier,
        GrowthCard::VictoryPoint,
        GrowthCard::Roaming,
        GrowthCard::Wealth,
        GrowthCard::Gatherer,
    ];
}

/// A player's growth cards.
///
/// Cards bought this turn wait in `on_hold` until [`GrowthCardManager::cycle`]
/// runs at the start of the owner's next turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthCardManager {
    pub playable: ItemManager<GrowthCard>,
    pub on_hold: ItemManager<GrowthCard>,
}

impl GrowthCardManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_on_hold(&mut self, card: GrowthCard) {
        self.on_hold.add(card, 1);
    }

    /// Make every held card playable
    pub fn cycle(&mut self) {
        let held = std::mem::take(&mut self.on_hold);
        self.playable.add_all(&held);
    }

    pub fn can_play(&self, card: GrowthCard) -> bool {
        self.playable.get(card) > 0
    }

    pub fn play(&mut self, card: GrowthCard) -> Result<(), PlayerError> {
        self.playable
            .remove(card, 1)
            .map_err(|_| PlayerError::NoPlayableCard(card))
    }

    /// Cards of one kind, playable or not
    pub fn count(&self, card: GrowthCard) -> u32 {
        self.playable.get(card) + self.on_hold.get(card)
    }

    pub fn total(&self) -> u32 {
        self.playable.total() + self.on_hold.total()
    }
}
