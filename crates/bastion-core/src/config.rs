//! Queue engine configuration.
//!
//! Every field has a default so partial config files deserialize cleanly.

use serde::{Deserialize, Serialize};

/// What `max_queue_size` counts against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityScope {
    /// Each slot holds at most `max_queue_size` jobs.
    #[default]
    PerSlot,
    /// All slots together hold at most `max_queue_size` jobs.
    Global,
}

/// Whether jobs may wait behind an Active job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPolicy {
    /// Jobs queue FIFO behind the head (training lines).
    #[default]
    Queue,
    /// A job is only accepted into an empty slot (builders).
    IdleOnly,
}

/// What happens to the part of `dt` that overshoots a job's duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvershootPolicy {
    /// At most one completion per slot per advance; leftover time is dropped
    /// and the next job starts at zero.
    #[default]
    Discard,
    /// Leftover time flows into the next job, which may also complete in the
    /// same advance.
    Cascade,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Number of concurrent slots. Fixed for the engine's lifetime.
    pub slot_count: u32,
    /// Cap on jobs (Active + Queued) within `capacity_scope`.
    pub max_queue_size: u32,
    pub capacity_scope: CapacityScope,
    pub slot_policy: SlotPolicy,
    pub overshoot: OvershootPolicy,
    /// Share of a cancelled job's cost returned per resource kind, rounded down.
    pub refund_percent: u8,
    /// Seconds of remaining time bought by one unit of boost currency.
    pub boost_seconds_per_unit: u32,
    /// Ring buffer capacity per event kind.
    pub event_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            slot_count: 1,
            max_queue_size: 20,
            capacity_scope: CapacityScope::PerSlot,
            slot_policy: SlotPolicy::Queue,
            overshoot: OvershootPolicy::Discard,
            refund_percent: 50,
            boost_seconds_per_unit: 60,
            event_capacity: 256,
        }
    }
}

impl QueueConfig {
    /// A single training line with the given queue cap.
    pub fn training_line(max_queue_size: u32) -> Self {
        Self {
            max_queue_size,
            ..Self::default()
        }
    }

    /// `builders` slots that each run one job at a time. When every builder
    /// is busy, enqueue reports `NoAvailableSlot`.
    pub fn builders(builders: u32) -> Self {
        Self {
            slot_count: builders,
            slot_policy: SlotPolicy::IdleOnly,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_count == 0 {
            return Err(ConfigError::NoSlots);
        }
        if self.max_queue_size == 0 {
            return Err(ConfigError::ZeroQueueSize);
        }
        if self.refund_percent > 100 {
            return Err(ConfigError::RefundOutOfRange(self.refund_percent));
        }
        if self.boost_seconds_per_unit == 0 {
            return Err(ConfigError::ZeroBoostUnit);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("slot_count must be at least 1")]
    NoSlots,
    #[error("max_queue_size must be at least 1")]
    ZeroQueueSize,
    #[error("refund_percent must be within 0..=100, got {0}")]
    RefundOutOfRange(u8),
    #[error("boost_seconds_per_unit must be at least 1")]
    ZeroBoostUnit,
}
