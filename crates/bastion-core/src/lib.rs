//! Bastion Core -- timed production and upgrade queues for strategy games.
//!
//! A [`engine::QueueEngine`] owns a fixed set of production slots (a
//! barracks training line, a pool of builders). Each slot runs its head job
//! against the engine clock while later jobs wait FIFO behind it. The engine
//! enforces queue capacity, debits costs through a caller-supplied
//! [`ledger::ResourceLedger`], refunds cancellations, and supports paid
//! boosts that finish the active job at once.
//!
//! # Lifecycle of a job
//!
//! 1. **Enqueue** -- capacity, slot, then cost are checked per unit. The job
//!    is resolved from the [`catalog::JobCatalog`] and snapshotted.
//! 2. **Active** -- the head of a slot accrues time on every
//!    [`engine::QueueEngine::advance`].
//! 3. **Completed** -- once elapsed reaches duration (or on boost) the job is
//!    popped and a `JobCompleted` event carries its effect to game code.
//! 4. **Cancelled** -- waiting jobs may be cancelled for a partial refund.
//!
//! # Key Types
//!
//! - [`engine::QueueEngine`] -- slot ownership and every queue operation.
//! - [`slot::ProductionSlot`] -- a single FIFO of jobs.
//! - [`catalog::Catalog`] -- immutable job and resource definitions.
//! - [`ledger::Stockpile`] -- a ready-made resource ledger.
//! - [`event::EventBus`] -- buffered, typed queue events.
//! - [`fixed::Seconds`] -- Q32.32 fixed-point time for deterministic math.

pub mod catalog;
pub mod command_queue;
pub mod config;
pub mod cost;
pub mod engine;
pub mod event;
pub mod fixed;
pub mod id;
pub mod job;
pub mod ledger;
pub mod query;
pub mod sim;
pub mod slot;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
