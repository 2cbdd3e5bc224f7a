//! Resource ledger contract and a reference stockpile implementation.
//!
//! The queue engine never owns resource storage. It charges and refunds
//! through a [`ResourceLedger`] passed in by the caller on each operation.

use crate::cost::Cost;
use crate::id::ResourceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What the engine requires of whoever holds the player's resources.
pub trait ResourceLedger {
    /// Debit every kind in `cost`, or nothing at all. Returns whether the
    /// debit happened. Must never leave one kind debited and another not.
    fn try_debit(&mut self, cost: &Cost) -> bool;

    /// Credit every kind in `amounts`.
    fn credit(&mut self, amounts: &Cost);

    /// Current amount of a resource kind.
    fn balance(&self, resource: ResourceId) -> u64;
}

/// Amount and optional storage cap for one resource kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserve {
    pub amount: u64,
    /// `None` means unbounded.
    pub capacity: Option<u64>,
}

impl Reserve {
    /// Room left before the cap. `u64::MAX` when unbounded.
    pub fn space(&self) -> u64 {
        match self.capacity {
            Some(cap) => cap.saturating_sub(self.amount),
            None => u64::MAX - self.amount,
        }
    }
}

/// In-memory ledger with per-kind capacities. Credits above capacity are
/// discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stockpile {
    reserves: BTreeMap<ResourceId, Reserve>,
}

impl Stockpile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper for an unbounded reserve.
    pub fn with(mut self, resource: ResourceId, amount: u64) -> Self {
        self.reserves.insert(
            resource,
            Reserve {
                amount,
                capacity: None,
            },
        );
        self
    }

    /// Builder-style helper for a capped reserve. `amount` is clamped to `capacity`.
    pub fn with_capacity(mut self, resource: ResourceId, amount: u64, capacity: u64) -> Self {
        self.reserves.insert(
            resource,
            Reserve {
                amount: amount.min(capacity),
                capacity: Some(capacity),
            },
        );
        self
    }

    pub fn reserve(&self, resource: ResourceId) -> Option<&Reserve> {
        self.reserves.get(&resource)
    }

    pub fn set_capacity(&mut self, resource: ResourceId, capacity: Option<u64>) {
        let reserve = self.reserves.entry(resource).or_default();
        reserve.capacity = capacity;
        if let Some(cap) = capacity {
            reserve.amount = reserve.amount.min(cap);
        }
    }

    /// Whether every kind in `cost` is covered by the current balances.
    pub fn can_afford(&self, cost: &Cost) -> bool {
        cost.iter()
            .all(|(resource, amount)| self.balance(resource) >= amount)
    }

    /// Credit `amounts`, returning whatever did not fit under the caps.
    #[must_use = "overflow indicates resources that were discarded"]
    pub fn credit_with_overflow(&mut self, amounts: &Cost) -> Cost {
        let mut overflow = Cost::new();
        for (resource, amount) in amounts.iter() {
            let reserve = self.reserves.entry(resource).or_default();
            let to_add = amount.min(reserve.space());
            reserve.amount += to_add;
            overflow.add(resource, amount - to_add);
        }
        overflow
    }
}

impl ResourceLedger for Stockpile {
    fn try_debit(&mut self, cost: &Cost) -> bool {
        // Check every kind before touching any balance.
        if !self.can_afford(cost) {
            return false;
        }
        for (resource, amount) in cost.iter() {
            if let Some(reserve) = self.reserves.get_mut(&resource) {
                reserve.amount -= amount;
            }
        }
        true
    }

    fn credit(&mut self, amounts: &Cost) {
        let _ = self.credit_with_overflow(amounts);
    }

    fn balance(&self, resource: ResourceId) -> u64 {
        self.reserves
            .get(&resource)
            .map(|r| r.amount)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gold() -> ResourceId {
        ResourceId(0)
    }

    fn stone() -> ResourceId {
        ResourceId(1)
    }

    #[test]
    fn debit_succeeds_when_affordable() {
        let mut pile = Stockpile::new().with(gold(), 100).with(stone(), 50);
        let cost = Cost::new().with(gold(), 50).with(stone(), 20);
        assert!(pile.try_debit(&cost));
        assert_eq!(pile.balance(gold()), 50);
        assert_eq!(pile.balance(stone()), 30);
    }

    #[test]
    fn debit_is_all_or_nothing() {
        let mut pile = Stockpile::new().with(gold(), 30);
        let cost = Cost::new().with(gold(), 20).with(stone(), 20);
        assert!(!pile.try_debit(&cost));
        assert_eq!(pile.balance(gold()), 30);
        assert_eq!(pile.balance(stone()), 0);
    }

    #[test]
    fn empty_cost_always_debits() {
        let mut pile = Stockpile::new();
        assert!(pile.try_debit(&Cost::new()));
    }

    #[test]
    fn credit_clamps_to_capacity() {
        let mut pile = Stockpile::new().with_capacity(gold(), 90, 100);
        let overflow = pile.credit_with_overflow(&Cost::new().with(gold(), 25));
        assert_eq!(pile.balance(gold()), 100);
        assert_eq!(overflow.get(gold()), 15);
    }

    #[test]
    fn credit_creates_missing_reserve() {
        let mut pile = Stockpile::new();
        pile.credit(&Cost::new().with(stone(), 7));
        assert_eq!(pile.balance(stone()), 7);
        assert_eq!(pile.reserve(stone()).unwrap().capacity, None);
    }

    #[test]
    fn lowering_capacity_clamps_amount() {
        let mut pile = Stockpile::new().with(gold(), 500);
        pile.set_capacity(gold(), Some(200));
        assert_eq!(pile.balance(gold()), 200);
    }

    #[test]
    fn unknown_resource_balance_is_zero() {
        let pile = Stockpile::new();
        assert_eq!(pile.balance(ResourceId(42)), 0);
    }
}
