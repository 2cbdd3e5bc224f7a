//! Buffered player commands.
//!
//! A host that batches input (UI clicks, network messages, scripted tests)
//! pushes commands here and runs them with
//! [`QueueEngine::execute_queued`](crate::engine::QueueEngine::execute_queued).
//! With history enabled, the drained commands can be replayed against a
//! fresh engine to reproduce the same state.

use serde::{Deserialize, Serialize};

use crate::engine::{BoostReceipt, EnqueueOutcome, EnqueueRequest};
use crate::fixed::Seconds;
use crate::id::{ResourceId, SlotId};
use crate::job::CancelledJob;
use crate::sim::AdvanceReport;

// ---------------------------------------------------------------------------
// Command enum
// ---------------------------------------------------------------------------

/// One engine operation, as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Enqueue(EnqueueRequest),
    /// Cancel the waiting job at `index` (must be >= 1).
    CancelQueued { slot: SlotId, index: usize },
    ClearQueue { slot: SlotId },
    /// Finish the Active job without charging anything.
    Boost { slot: SlotId },
    /// Charge the boost cost in `currency`, then finish the Active job.
    PurchaseBoost { slot: SlotId, currency: ResourceId },
    Advance { dt: Seconds },
}

/// Result of a successfully executed [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Enqueued(EnqueueOutcome),
    Cancelled(CancelledJob),
    Cleared(Vec<CancelledJob>),
    Boosted(BoostReceipt),
    /// `None` when the ledger could not cover the boost.
    BoostPurchased(Option<BoostReceipt>),
    Advanced(AdvanceReport),
}

// ---------------------------------------------------------------------------
// CommandQueue
// ---------------------------------------------------------------------------

/// Commands waiting to run, plus an optional bounded history of drained
/// commands tagged with their submission sequence number.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: Vec<Command>,
    history: Vec<(u64, Command)>,
    /// 0 = no history.
    max_history: usize,
    next_sequence: u64,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue that retains up to `max_history` drained commands.
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            max_history,
            ..Self::default()
        }
    }

    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    pub fn push_batch(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.pending.extend(commands);
    }

    /// Take every pending command in submission order, recording them in
    /// history if enabled.
    pub fn drain(&mut self) -> Vec<Command> {
        let commands: Vec<Command> = self.pending.drain(..).collect();

        if self.max_history > 0 {
            for cmd in &commands {
                self.history.push((self.next_sequence, cmd.clone()));
                self.next_sequence += 1;
            }
            let excess = self.history.len().saturating_sub(self.max_history);
            if excess > 0 {
                self.history.drain(..excess);
            }
        } else {
            self.next_sequence += commands.len() as u64;
        }

        commands
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// `(sequence, command)` pairs, oldest first.
    pub fn history(&self) -> &[(u64, Command)] {
        &self.history
    }

    /// The recorded commands alone, ready to push into another queue.
    pub fn replay_log(&self) -> Vec<Command> {
        self.history.iter().map(|(_, cmd)| cmd.clone()).collect()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::secs;
    use crate::id::JobKindId;

    fn advance(s: u32) -> Command {
        Command::Advance { dt: secs(s) }
    }

    #[test]
    fn new_queue_is_empty() {
        let q = CommandQueue::new();
        assert!(q.is_empty());
        assert_eq!(q.pending_count(), 0);
        assert!(q.history().is_empty());
    }

    #[test]
    fn drain_preserves_submission_order() {
        let mut q = CommandQueue::new();
        q.push(Command::Enqueue(EnqueueRequest::new(JobKindId(0))));
        q.push_batch([advance(1), Command::ClearQueue { slot: SlotId(0) }]);
        assert_eq!(q.pending_count(), 3);

        let drained = q.drain();
        assert!(q.is_empty());
        assert!(matches!(drained[0], Command::Enqueue(_)));
        assert_eq!(drained[1], advance(1));
        assert_eq!(drained[2], Command::ClearQueue { slot: SlotId(0) });
    }

    #[test]
    fn no_history_by_default() {
        let mut q = CommandQueue::new();
        q.push(advance(1));
        q.drain();
        assert!(q.history().is_empty());
    }

    #[test]
    fn history_records_sequence_numbers() {
        let mut q = CommandQueue::with_max_history(10);
        q.push_batch([advance(1), advance(2)]);
        q.drain();
        q.push(advance(3));
        q.drain();

        let seqs: Vec<u64> = q.history().iter().map(|(seq, _)| *seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(q.replay_log(), vec![advance(1), advance(2), advance(3)]);
    }

    #[test]
    fn history_is_trimmed_to_max() {
        let mut q = CommandQueue::with_max_history(2);
        q.push_batch([advance(1), advance(2), advance(3)]);
        q.drain();

        assert_eq!(q.history().len(), 2);
        assert_eq!(q.history()[0], (1, advance(2)));
        assert_eq!(q.history()[1], (2, advance(3)));

        q.clear_history();
        assert!(q.history().is_empty());
    }
}
