//! One concurrent execution lane ("builder" or "training line").
//!
//! A slot is a FIFO of jobs. Only the head accrues time, and the head is the
//! only job that can be Active. The slot never touches resources or emits
//! events; the engine does that after reading the slot's signals.

use crate::fixed::Seconds;
use crate::id::SlotId;
use crate::job::{Job, JobState};

/// What happened to a slot's head during `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSignal {
    /// Nothing queued.
    Idle,
    /// The head accrued time but has not finished.
    Working,
    /// The head has accrued at least its full duration. The engine must pop it.
    Ready,
}

#[derive(Debug, Clone)]
pub struct ProductionSlot {
    id: SlotId,
    /// Insertion order is priority order. `queue[0]` is the Active job.
    queue: Vec<Job>,
}

impl ProductionSlot {
    pub fn new(id: SlotId) -> Self {
        Self {
            id,
            queue: Vec::new(),
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    /// Append a job to the tail. Returns true if it became the head (and so
    /// is now Active, starting from zero elapsed time).
    pub fn enqueue(&mut self, mut job: Job) -> bool {
        let becomes_head = self.queue.is_empty();
        job.slot = self.id;
        job.elapsed = Seconds::ZERO;
        job.state = if becomes_head {
            JobState::Active
        } else {
            JobState::Queued
        };
        self.queue.push(job);
        becomes_head
    }

    /// Add `dt` to the head's elapsed time.
    pub fn advance(&mut self, dt: Seconds) -> SlotSignal {
        let Some(head) = self.queue.first_mut() else {
            return SlotSignal::Idle;
        };
        head.elapsed = head.elapsed.saturating_add(dt);
        if head.is_ready() {
            SlotSignal::Ready
        } else {
            SlotSignal::Working
        }
    }

    /// Remove and return the head. The next job, if any, becomes Active at
    /// zero elapsed time.
    pub fn pop(&mut self) -> Option<Job> {
        if self.queue.is_empty() {
            return None;
        }
        let job = self.queue.remove(0);
        self.promote_head();
        Some(job)
    }

    /// Remove the job at `index`. Index 0 behaves like `pop`.
    pub fn remove_at(&mut self, index: usize) -> Option<Job> {
        if index >= self.queue.len() {
            return None;
        }
        if index == 0 {
            return self.pop();
        }
        Some(self.queue.remove(index))
    }

    fn promote_head(&mut self) {
        if let Some(head) = self.queue.first_mut() {
            head.state = JobState::Active;
            head.elapsed = Seconds::ZERO;
        }
    }

    /// The Active job, if any.
    pub fn head(&self) -> Option<&Job> {
        self.queue.first()
    }

    /// Jobs waiting behind the head, in order.
    pub fn queued(&self) -> &[Job] {
        self.queue.get(1..).unwrap_or(&[])
    }

    /// All jobs, head first.
    pub fn jobs(&self) -> &[Job] {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
