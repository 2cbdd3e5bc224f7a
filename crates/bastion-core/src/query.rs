//! Read-only snapshot types for presentation code.
//!
//! All types are owned copies, with no references into engine storage.
//! Serializable so a host can hand them to a UI layer or save them alongside
//! its own state.

use crate::fixed::Seconds;
use crate::id::{JobId, JobKindId, SlotId};
use crate::job::{Job, JobState};
use serde::{Deserialize, Serialize};

/// A single job as the UI sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobView {
    pub id: JobId,
    pub kind: JobKindId,
    pub state: JobState,
    pub elapsed: Seconds,
    pub duration: Seconds,
    pub target_level: Option<u32>,
}

impl From<&Job> for JobView {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            kind: job.kind,
            state: job.state,
            elapsed: job.elapsed,
            duration: job.duration,
            target_level: job.target_level,
        }
    }
}

/// One slot: its Active job and the jobs waiting behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    pub id: SlotId,
    pub active: Option<JobView>,
    pub queued: Vec<JobView>,
}

impl SlotSnapshot {
    pub fn len(&self) -> usize {
        self.queued.len() + usize::from(self.active.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }
}

/// Every slot in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub clock: Seconds,
    pub slots: Vec<SlotSnapshot>,
}

impl QueueSnapshot {
    pub fn total_jobs(&self) -> usize {
        self.slots.iter().map(SlotSnapshot::len).sum()
    }
}
