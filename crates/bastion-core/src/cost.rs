use crate::id::ResourceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Amounts per resource kind. Ordered by `ResourceId` so iteration (and thus
/// ledger calls and state hashing) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    amounts: BTreeMap<ResourceId, u64>,
}

impl Cost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper. Adding the same resource twice sums the amounts.
    pub fn with(mut self, resource: ResourceId, amount: u64) -> Self {
        self.add(resource, amount);
        self
    }

    pub fn add(&mut self, resource: ResourceId, amount: u64) {
        if amount == 0 {
            return;
        }
        let entry = self.amounts.entry(resource).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Amount of a single resource kind, 0 if absent.
    pub fn get(&self, resource: ResourceId) -> u64 {
        self.amounts.get(&resource).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, u64)> + '_ {
        self.amounts.iter().map(|(r, a)| (*r, *a))
    }

    pub fn resources(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.amounts.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    /// Per-kind `floor(amount * percent / 100)`. Kinds that round to zero are
    /// dropped. No remainder is redistributed between kinds.
    pub fn scaled_percent(&self, percent: u8) -> Cost {
        let mut out = Cost::new();
        for (resource, amount) in self.iter() {
            let scaled = (amount as u128 * percent as u128 / 100) as u64;
            out.add(resource, scaled);
        }
        out
    }
}

impl FromIterator<(ResourceId, u64)> for Cost {
    fn from_iter<I: IntoIterator<Item = (ResourceId, u64)>>(iter: I) -> Self {
        let mut cost = Cost::new();
        for (resource, amount) in iter {
            cost.add(resource, amount);
        }
        cost
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
    fn with_sums_duplicates() {
        let cost = Cost::new().with(gold(), 10).with(gold(), 5);
        assert_eq!(cost.get(gold()), 15);
        assert_eq!(cost.len(), 1);
    }

    #[test]
    fn zero_amounts_are_not_stored() {
        let cost = Cost::new().with(gold(), 0);
        assert!(cost.is_empty());
    }

    #[test]
    fn half_refund_rounds_down_per_kind() {
        let cost = Cost::new().with(gold(), 75).with(stone(), 10);
        let refund = cost.scaled_percent(50);
        assert_eq!(refund.get(gold()), 37);
        assert_eq!(refund.get(stone()), 5);
    }

    #[test]
    fn refund_of_one_unit_is_nothing() {
        let cost = Cost::new().with(gold(), 1);
        assert!(cost.scaled_percent(50).is_empty());
    }

    #[test]
    fn iteration_is_ordered_by_resource() {
        let cost: Cost = [(stone(), 1), (gold(), 2)].into_iter().collect();
        let order: Vec<ResourceId> = cost.resources().collect();
        assert_eq!(order, vec![gold(), stone()]);
    }
}
