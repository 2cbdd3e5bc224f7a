//! Advance results and deterministic state hashing.

use crate::fixed::Seconds;
use crate::id::JobId;
use crate::job::CompletedJob;

// ---------------------------------------------------------------------------
// Advance result
// ---------------------------------------------------------------------------

/// Result of a `QueueEngine::advance()` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Jobs completed during this advance, in slot order.
    pub completed: Vec<CompletedJob>,
    /// Jobs that became Active during this advance.
    pub started: Vec<JobId>,
    /// Engine clock after the advance.
    pub clock: Seconds,
}

impl AdvanceReport {
    pub fn completed_ids(&self) -> Vec<JobId> {
        self.completed.iter().map(|c| c.job.id).collect()
    }
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A simple deterministic hash of queue state for replay checks.
///
/// Uses FNV-1a (64-bit) for speed and simplicity. Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_seconds(&mut self, v: Seconds) {
        self.write(&v.to_bits().to_le_bytes());
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::secs;

    #[test]
    fn state_hash_deterministic() {
        let mut h1 = StateHash::new();
        h1.write_u64(42);
        h1.write_seconds(secs(7));

        let mut h2 = StateHash::new();
        h2.write_u64(42);
        h2.write_seconds(secs(7));

        assert_eq!(h1.finish(), h2.finish());
    }

    #[test]
    fn state_hash_order_matters() {
        let mut h1 = StateHash::new();
        h1.write_u32(1);
        h1.write_u32(2);

        let mut h2 = StateHash::new();
        h2.write_u32(2);
        h2.write_u32(1);

        assert_ne!(h1.finish(), h2.finish());
    }

    #[test]
    fn empty_report() {
        let report = AdvanceReport::default();
        assert!(report.completed_ids().is_empty());
        assert_eq!(report.clock, Seconds::ZERO);
    }
}
