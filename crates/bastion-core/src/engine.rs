//! The queue engine: owns every production slot and job, and enforces the
//! capacity, affordability, ordering, and completion rules.
//!
//! # Architecture
//!
//! The `QueueEngine` owns:
//! - A fixed set of [`ProductionSlot`]s, created once from [`QueueConfig`]
//! - A shared, read-only [`JobCatalog`]
//! - An engine clock (sum of all advanced time)
//! - An [`EventBus`] for queue events
//!
//! Resources live outside the engine. Operations that charge or refund take
//! a `&mut dyn ResourceLedger` from the caller.
//!
//! # Operation contract
//!
//! Every mutating operation:
//! 1. Validates its arguments. Invalid slots or indices are `Err`.
//! 2. Mutates slot state.
//! 3. Emits events for what changed.
//! 4. Delivers the events to listeners before returning.
//!
//! Capacity and affordability failures are not errors. They are reported in
//! the [`EnqueueOutcome`] and as `QueueRejected` events.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{JobCatalog, JobDefinition};
use crate::command_queue::{Command, CommandOutcome, CommandQueue};
use crate::config::{CapacityScope, ConfigError, OvershootPolicy, QueueConfig, SlotPolicy};
use crate::cost::Cost;
use crate::event::{EventBus, EventKind, Listener, QueueEvent};
use crate::fixed::{Seconds, ceil_units};
use crate::id::{JobId, JobKindId, ResourceId, SlotId};
use crate::job::{CancelledJob, CompletedJob, Job, JobState};
use crate::ledger::ResourceLedger;
use crate::query::{JobView, QueueSnapshot, SlotSnapshot};
use crate::sim::{AdvanceReport, StateHash};
use crate::slot::{ProductionSlot, SlotSignal};

// ---------------------------------------------------------------------------
// Requests and outcomes
// ---------------------------------------------------------------------------

/// Why an enqueue stopped accepting units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    QueueFull,
    InsufficientResources,
    NoAvailableSlot,
}

/// A request to enqueue `count` identical jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnqueueRequest {
    pub kind: JobKindId,
    /// Target slot. `None` lets the engine pick.
    pub slot: Option<SlotId>,
    /// Burst size ("+1", "+5", "+10").
    pub count: u32,
    /// For upgrade jobs, the building's level right now. The first pending
    /// upgrade targets `current_level + 1`, the next `current_level + 2`, ...
    /// Required for upgrade kinds; ignored otherwise.
    pub current_level: Option<u32>,
}

impl EnqueueRequest {
    pub fn new(kind: JobKindId) -> Self {
        Self {
            kind,
            slot: None,
            count: 1,
            current_level: None,
        }
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn in_slot(mut self, slot: SlotId) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn from_level(mut self, level: u32) -> Self {
        self.current_level = Some(level);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnqueueStatus {
    /// Every requested unit was accepted.
    Accepted,
    /// Some units were accepted before a capacity or affordability limit.
    Partial,
    /// Nothing was accepted.
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnqueueOutcome {
    pub requested: u32,
    /// Accepted jobs, in enqueue order.
    pub accepted: Vec<JobId>,
    /// Set when the burst stopped early.
    pub rejection: Option<RejectReason>,
}

impl EnqueueOutcome {
    fn new(requested: u32) -> Self {
        Self {
            requested,
            accepted: Vec::new(),
            rejection: None,
        }
    }

    pub fn accepted_count(&self) -> u32 {
        self.accepted.len() as u32
    }

    pub fn rejected_count(&self) -> u32 {
        self.requested - self.accepted_count()
    }

    pub fn status(&self) -> EnqueueStatus {
        if self.accepted_count() == self.requested {
            EnqueueStatus::Accepted
        } else if self.accepted.is_empty() {
            EnqueueStatus::Rejected
        } else {
            EnqueueStatus::Partial
        }
    }
}

/// What a boost did and what it should have cost the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostReceipt {
    pub completed: CompletedJob,
    pub cost: u64,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Precondition violations. These indicate a caller bug, never a game-state
/// outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("slot {0:?} does not exist")]
    SlotNotFound(SlotId),

    #[error("job kind {0:?} is not in the catalog")]
    UnknownJobKind(JobKindId),

    #[error("the active job in slot {0:?} cannot be cancelled")]
    CannotCancelActive(SlotId),

    #[error("index {index} out of range for slot {slot:?} holding {len} jobs")]
    IndexOutOfRange { slot: SlotId, index: usize, len: usize },

    #[error("slot {0:?} has no active job")]
    NoActiveJob(SlotId),

    #[error("advance delta must be non-negative, got {0}")]
    NegativeDelta(Seconds),

    #[error("upgrade job kind {0:?} enqueued without a current level")]
    MissingCurrentLevel(JobKindId),
}

// ---------------------------------------------------------------------------
// QueueEngine
// ---------------------------------------------------------------------------

pub struct QueueEngine {
    config: QueueConfig,

    catalog: Arc<dyn JobCatalog>,

    /// Fixed for the engine's lifetime. `slots[i].id() == SlotId(i)`.
    slots: Vec<ProductionSlot>,

    next_job_id: u64,

    /// Total time advanced since creation.
    clock: Seconds,

    /// Typed event bus for queue events.
    pub event_bus: EventBus,
}

impl std::fmt::Debug for QueueEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueEngine")
            .field("config", &self.config)
            .field("slots", &self.slots)
            .field("next_job_id", &self.next_job_id)
            .field("clock", &self.clock)
            .field("event_bus", &self.event_bus)
            .finish_non_exhaustive()
    }
}

impl QueueEngine {
    pub fn new(config: QueueConfig, catalog: Arc<dyn JobCatalog>) -> Result<Self, ConfigError> {
        config.validate()?;
        let slots = (0..config.slot_count)
            .map(|i| ProductionSlot::new(SlotId(i)))
            .collect();
        let event_bus = EventBus::new(config.event_capacity);
        tracing::debug!(
            target: "bastion.queue",
            slots = config.slot_count,
            max_queue_size = config.max_queue_size,
            "queue engine created"
        );
        Ok(Self {
            config,
            catalog,
            slots,
            next_job_id: 0,
            clock: Seconds::ZERO,
            event_bus,
        })
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn on(&mut self, kind: EventKind, listener: Listener) {
        self.event_bus.on(kind, listener);
    }

    pub fn suppress_event(&mut self, kind: EventKind) {
        self.event_bus.suppress(kind);
    }

    // -----------------------------------------------------------------------
    // Enqueue
    // -----------------------------------------------------------------------

    /// Accept up to `request.count` jobs. Each unit is checked for capacity,
    /// then a slot, then debited through `ledger`; the burst stops at the
    /// first unit that fails without undoing earlier ones.
    pub fn enqueue(
        &mut self,
        request: &EnqueueRequest,
        ledger: &mut dyn ResourceLedger,
    ) -> Result<EnqueueOutcome, QueueError> {
        let catalog = Arc::clone(&self.catalog);
        let definition = catalog
            .lookup(request.kind)
            .ok_or(QueueError::UnknownJobKind(request.kind))?;
        if let Some(slot) = request.slot {
            self.slot(slot)?;
        }

        let current_level = match (definition.effect.is_upgrade(), request.current_level) {
            (true, None) => {
                tracing::warn!(target: "bastion.queue", kind = request.kind.0, "upgrade without current level");
                return Err(QueueError::MissingCurrentLevel(request.kind));
            }
            (_, level) => level.unwrap_or(0),
        };

        let mut outcome = EnqueueOutcome::new(request.count);
        let mut upgrades_pending = if definition.effect.is_upgrade() {
            self.pending_of_kind(request.kind)
        } else {
            0
        };

        for _ in 0..request.count {
            let slot = match self.choose_slot(request.slot) {
                Ok(slot) => slot,
                Err(reason) => {
                    outcome.rejection = Some(reason);
                    break;
                }
            };
            if !ledger.try_debit(&definition.cost) {
                outcome.rejection = Some(RejectReason::InsufficientResources);
                break;
            }
            let target_level = if definition.effect.is_upgrade() {
                upgrades_pending += 1;
                Some(current_level.saturating_add(upgrades_pending))
            } else {
                None
            };
            let id = self.accept(slot, definition, target_level);
            outcome.accepted.push(id);
        }

        if let Some(reason) = outcome.rejection {
            tracing::trace!(
                target: "bastion.queue",
                kind = request.kind.0,
                ?reason,
                accepted = outcome.accepted_count(),
                requested = outcome.requested,
                "enqueue stopped"
            );
            self.event_bus.emit(QueueEvent::QueueRejected {
                kind: request.kind,
                reason,
                at: self.clock,
            });
        }

        self.event_bus.deliver();
        Ok(outcome)
    }

    fn accept(
        &mut self,
        slot: SlotId,
        definition: &JobDefinition,
        target_level: Option<u32>,
    ) -> JobId {
        let id = JobId(self.next_job_id);
        self.next_job_id += 1;
        let job = Job::resolve(id, slot, definition, target_level);
        let started = self.slots[slot.index()].enqueue(job);

        tracing::debug!(
            target: "bastion.queue",
            job = id.0,
            kind = definition.kind.0,
            slot = slot.0,
            started,
            "job accepted"
        );
        self.event_bus.emit(QueueEvent::JobAccepted {
            job: id,
            kind: definition.kind,
            slot,
            at: self.clock,
        });
        if started {
            self.event_bus.emit(QueueEvent::JobStarted {
                job: id,
                slot,
                at: self.clock,
            });
        }
        id
    }

    /// Pick the slot for the next unit, or say why none can take it.
    fn choose_slot(&self, hint: Option<SlotId>) -> Result<SlotId, RejectReason> {
        let max = self.config.max_queue_size as usize;

        if self.config.capacity_scope == CapacityScope::Global && self.pending_count() >= max {
            return Err(RejectReason::QueueFull);
        }
        let has_room = |slot: &ProductionSlot| match self.config.capacity_scope {
            CapacityScope::PerSlot => slot.len() < max,
            CapacityScope::Global => true,
        };

        if let Some(id) = hint {
            let slot = &self.slots[id.index()];
            if !has_room(slot) {
                return Err(RejectReason::QueueFull);
            }
            if self.config.slot_policy == SlotPolicy::IdleOnly && !slot.is_empty() {
                return Err(RejectReason::NoAvailableSlot);
            }
            return Ok(id);
        }

        let mut candidates = self.slots.iter().filter(|s| has_room(*s)).peekable();
        if candidates.peek().is_none() {
            return Err(RejectReason::QueueFull);
        }
        // First idle slot in creation order, else (when queueing is allowed)
        // the shortest queue with the lowest id.
        let mut shortest: Option<&ProductionSlot> = None;
        for slot in candidates {
            if slot.is_empty() {
                return Ok(slot.id());
            }
            if shortest.is_none_or(|s| slot.len() < s.len()) {
                shortest = Some(slot);
            }
        }
        match (self.config.slot_policy, shortest) {
            (SlotPolicy::Queue, Some(slot)) => Ok(slot.id()),
            _ => Err(RejectReason::NoAvailableSlot),
        }
    }

    // -----------------------------------------------------------------------
    // Advance
    // -----------------------------------------------------------------------

    /// Advance every slot by `dt`, in slot order. Completed heads are popped
    /// and the next job starts from zero. Under `OvershootPolicy::Discard` a
    /// slot completes at most one job per call and leftover time is dropped.
    pub fn advance(&mut self, dt: Seconds) -> Result<AdvanceReport, QueueError> {
        if dt < Seconds::ZERO {
            tracing::warn!(target: "bastion.queue", %dt, "negative advance rejected");
            return Err(QueueError::NegativeDelta(dt));
        }
        self.clock = self.clock.saturating_add(dt);

        let mut report = AdvanceReport::default();
        for index in 0..self.slots.len() {
            let mut budget = dt;
            loop {
                if self.slots[index].advance(budget) != SlotSignal::Ready {
                    break;
                }
                let overshoot = self.slots[index]
                    .head()
                    .map(|head| head.elapsed - head.duration)
                    .unwrap_or(Seconds::ZERO);
                let Some((completed, started)) = self.complete_head(index, false) else {
                    break;
                };
                report.completed.push(completed);
                report.started.extend(started);

                match self.config.overshoot {
                    OvershootPolicy::Discard => break,
                    OvershootPolicy::Cascade => {
                        if overshoot <= Seconds::ZERO || self.slots[index].is_empty() {
                            break;
                        }
                        budget = overshoot;
                    }
                }
            }
        }
        report.clock = self.clock;

        self.event_bus.deliver();
        Ok(report)
    }

    /// Pop the head of `slots[index]` as Completed and promote the next job.
    /// Emits `JobCompleted` and, if a job was promoted, `JobStarted`.
    fn complete_head(&mut self, index: usize, boosted: bool) -> Option<(CompletedJob, Option<JobId>)> {
        let slot = &mut self.slots[index];
        let mut job = slot.pop()?;
        job.state = JobState::Completed;
        if boosted {
            job.elapsed = job.duration;
        }
        let next = slot.head().map(|head| head.id);
        let slot_id = slot.id();

        tracing::debug!(
            target: "bastion.queue",
            job = job.id.0,
            kind = job.kind.0,
            slot = slot_id.0,
            boosted,
            target_level = job.target_level,
            "job completed"
        );

        let completed = CompletedJob { job, boosted };
        self.event_bus.emit(QueueEvent::JobCompleted {
            completed: completed.clone(),
            at: self.clock,
        });
        if let Some(next) = next {
            self.event_bus.emit(QueueEvent::JobStarted {
                job: next,
                slot: slot_id,
                at: self.clock,
            });
        }
        Some((completed, next))
    }

    // -----------------------------------------------------------------------
    // Cancel
    // -----------------------------------------------------------------------

    /// Cancel a waiting job and refund `refund_percent` of its cost, rounded
    /// down per resource kind. Index 0 is the Active job and cannot be
    /// cancelled.
    pub fn cancel_queued(
        &mut self,
        slot: SlotId,
        index: usize,
        ledger: &mut dyn ResourceLedger,
    ) -> Result<CancelledJob, QueueError> {
        let cancelled = self.cancel_at(slot, index, ledger)?;
        self.event_bus.deliver();
        Ok(cancelled)
    }

    /// Cancel every waiting job in `slot`, tail first. The Active job stays.
    pub fn clear_queue(
        &mut self,
        slot: SlotId,
        ledger: &mut dyn ResourceLedger,
    ) -> Result<Vec<CancelledJob>, QueueError> {
        let len = self.slot(slot)?.len();
        let mut cancelled = Vec::with_capacity(len.saturating_sub(1));
        for index in (1..len).rev() {
            cancelled.push(self.cancel_at(slot, index, ledger)?);
        }
        self.event_bus.deliver();
        Ok(cancelled)
    }

    fn cancel_at(
        &mut self,
        slot: SlotId,
        index: usize,
        ledger: &mut dyn ResourceLedger,
    ) -> Result<CancelledJob, QueueError> {
        let len = self.slot(slot)?.len();
        if index >= len {
            tracing::warn!(target: "bastion.queue", slot = slot.0, index, len, "cancel index out of range");
            return Err(QueueError::IndexOutOfRange { slot, index, len });
        }
        if index == 0 {
            tracing::warn!(target: "bastion.queue", slot = slot.0, "cancel of active job rejected");
            return Err(QueueError::CannotCancelActive(slot));
        }

        let Some(mut job) = self.slots[slot.index()].remove_at(index) else {
            return Err(QueueError::IndexOutOfRange { slot, index, len });
        };
        job.state = JobState::Cancelled;
        let refund: Cost = job.cost.scaled_percent(self.config.refund_percent);
        ledger.credit(&refund);

        tracing::debug!(
            target: "bastion.queue",
            job = job.id.0,
            slot = slot.0,
            index,
            "job cancelled"
        );

        let cancelled = CancelledJob { job, refund };
        self.event_bus.emit(QueueEvent::JobCancelled {
            cancelled: cancelled.clone(),
            at: self.clock,
        });
        Ok(cancelled)
    }

    // -----------------------------------------------------------------------
    // Boost
    // -----------------------------------------------------------------------

    /// Boost currency needed to finish the Active job in `slot` now: one unit
    /// per `boost_seconds_per_unit` of remaining time, rounded up.
    pub fn boost_cost(&self, slot: SlotId) -> Result<u64, QueueError> {
        let head = self
            .slot(slot)?
            .head()
            .ok_or(QueueError::NoActiveJob(slot))?;
        Ok(ceil_units(head.remaining(), self.config.boost_seconds_per_unit))
    }

    /// Complete the Active job in `slot` immediately. Does not charge the
    /// boost currency; the caller is expected to have done so.
    pub fn boost(&mut self, slot: SlotId) -> Result<BoostReceipt, QueueError> {
        let cost = self.boost_cost(slot).inspect_err(|err| {
            tracing::warn!(target: "bastion.queue", slot = slot.0, %err, "boost rejected");
        })?;
        let receipt = self.boost_unchecked(slot, cost)?;
        self.event_bus.deliver();
        Ok(receipt)
    }

    /// Debit the boost cost in `currency` through `ledger`, then boost.
    /// Returns `Ok(None)` and emits `QueueRejected` if the ledger refuses.
    pub fn purchase_boost(
        &mut self,
        slot: SlotId,
        currency: ResourceId,
        ledger: &mut dyn ResourceLedger,
    ) -> Result<Option<BoostReceipt>, QueueError> {
        let cost = self.boost_cost(slot)?;
        if !ledger.try_debit(&Cost::new().with(currency, cost)) {
            let kind = self.slots[slot.index()]
                .head()
                .map(|head| head.kind)
                .ok_or(QueueError::NoActiveJob(slot))?;
            tracing::trace!(target: "bastion.queue", slot = slot.0, cost, "boost unaffordable");
            self.event_bus.emit(QueueEvent::QueueRejected {
                kind,
                reason: RejectReason::InsufficientResources,
                at: self.clock,
            });
            self.event_bus.deliver();
            return Ok(None);
        }
        let receipt = self.boost_unchecked(slot, cost)?;
        self.event_bus.deliver();
        Ok(Some(receipt))
    }

    fn boost_unchecked(&mut self, slot: SlotId, cost: u64) -> Result<BoostReceipt, QueueError> {
        let job = self.slots[slot.index()]
            .head()
            .map(|head| head.id)
            .ok_or(QueueError::NoActiveJob(slot))?;
        self.event_bus.emit(QueueEvent::JobBoosted {
            job,
            slot,
            cost,
            at: self.clock,
        });
        let (completed, _) = self
            .complete_head(slot.index(), true)
            .ok_or(QueueError::NoActiveJob(slot))?;
        Ok(BoostReceipt { completed, cost })
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Run a single command.
    pub fn execute(
        &mut self,
        command: &Command,
        ledger: &mut dyn ResourceLedger,
    ) -> Result<CommandOutcome, QueueError> {
        match command {
            Command::Enqueue(request) => self.enqueue(request, ledger).map(CommandOutcome::Enqueued),
            Command::CancelQueued { slot, index } => self
                .cancel_queued(*slot, *index, ledger)
                .map(CommandOutcome::Cancelled),
            Command::ClearQueue { slot } => {
                self.clear_queue(*slot, ledger).map(CommandOutcome::Cleared)
            }
            Command::Boost { slot } => self.boost(*slot).map(CommandOutcome::Boosted),
            Command::PurchaseBoost { slot, currency } => self
                .purchase_boost(*slot, *currency, ledger)
                .map(CommandOutcome::BoostPurchased),
            Command::Advance { dt } => self.advance(*dt).map(CommandOutcome::Advanced),
        }
    }

    /// Drain `queue` and run its commands in submission order. One failing
    /// command does not stop the rest.
    pub fn execute_queued(
        &mut self,
        queue: &mut CommandQueue,
        ledger: &mut dyn ResourceLedger,
    ) -> Vec<Result<CommandOutcome, QueueError>> {
        queue
            .drain()
            .iter()
            .map(|command| self.execute(command, ledger))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn catalog(&self) -> &dyn JobCatalog {
        self.catalog.as_ref()
    }

    pub fn clock(&self) -> Seconds {
        self.clock
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, slot: SlotId) -> Result<&ProductionSlot, QueueError> {
        self.slots
            .get(slot.index())
            .ok_or(QueueError::SlotNotFound(slot))
    }

    pub fn slots(&self) -> &[ProductionSlot] {
        &self.slots
    }

    pub fn active_job(&self, slot: SlotId) -> Result<Option<&Job>, QueueError> {
        Ok(self.slot(slot)?.head())
    }

    /// Waiting jobs in `slot`, in order. Excludes the Active job.
    pub fn queued_jobs(&self, slot: SlotId) -> Result<&[Job], QueueError> {
        Ok(self.slot(slot)?.queued())
    }

    /// Whether `slot` can take no further job right now.
    pub fn is_full(&self, slot: SlotId) -> Result<bool, QueueError> {
        let target = self.slot(slot)?;
        let max = self.config.max_queue_size as usize;
        let over_cap = match self.config.capacity_scope {
            CapacityScope::PerSlot => target.len() >= max,
            CapacityScope::Global => self.pending_count() >= max,
        };
        let busy = self.config.slot_policy == SlotPolicy::IdleOnly && !target.is_empty();
        Ok(over_cap || busy)
    }

    /// Slots with nothing in them, in creation order. A job enqueued into
    /// one of these starts immediately.
    pub fn available_slots(&self) -> Vec<SlotId> {
        self.slots
            .iter()
            .filter(|s| s.is_empty())
            .map(ProductionSlot::id)
            .collect()
    }

    /// Jobs across all slots, Active and Queued.
    pub fn pending_count(&self) -> usize {
        self.slots.iter().map(ProductionSlot::len).sum()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }

    fn pending_of_kind(&self, kind: JobKindId) -> u32 {
        self.slots
            .iter()
            .flat_map(|s| s.jobs())
            .filter(|job| job.kind == kind)
            .count() as u32
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.slots
            .iter()
            .flat_map(|s| s.jobs())
            .find(|job| job.id == id)
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            clock: self.clock,
            slots: self
                .slots
                .iter()
                .map(|slot| SlotSnapshot {
                    id: slot.id(),
                    active: slot.head().map(JobView::from),
                    queued: slot.queued().iter().map(JobView::from).collect(),
                })
                .collect(),
        }
    }

    /// Deterministic hash of all queue state. Two engines fed the same
    /// commands produce the same hash.
    pub fn state_hash(&self) -> u64 {
        let mut hash = StateHash::new();
        hash.write_seconds(self.clock);
        hash.write_u64(self.next_job_id);
        for slot in &self.slots {
            hash.write_u32(slot.id().0);
            hash.write_u64(slot.len() as u64);
            for job in slot.jobs() {
                hash.write_u64(job.id.0);
                hash.write_u32(job.kind.0);
                hash.write_seconds(job.elapsed);
                hash.write_u32(job.state as u32);
                hash.write_u32(job.target_level.unwrap_or(0));
            }
        }
        hash.finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
