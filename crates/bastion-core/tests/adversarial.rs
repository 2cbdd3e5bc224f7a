//! Adversarial input tests for the queue engine.
//!
//! Edge cases that should either return errors or be handled gracefully
//! without panics.

use bastion_core::config::{OvershootPolicy, QueueConfig};
use bastion_core::engine::{EnqueueRequest, EnqueueStatus, QueueError, RejectReason};
use bastion_core::event::EventKind;
use bastion_core::fixed::{Seconds, secs};
use bastion_core::id::SlotId;
use bastion_core::ledger::{ResourceLedger, Stockpile};
use bastion_core::test_utils::*;

/// Enormous advance must saturate the clock, not overflow.
#[test]
fn huge_advance_saturates() {
    let (mut engine, ids) = training_engine(QueueConfig::default());
    engine
        .enqueue(&EnqueueRequest::new(ids.infantry).count(2), &mut unlimited_ledger())
        .unwrap();

    engine.advance(Seconds::MAX).unwrap();
    engine.advance(Seconds::MAX).unwrap();
    assert_eq!(engine.clock(), Seconds::MAX);
    assert_eq!(engine.pending_count(), 0);
}

/// Cascade with a huge delta drains the slot without looping forever.
#[test]
fn cascade_huge_delta_terminates() {
    let mut config = QueueConfig::training_line(20);
    config.overshoot = OvershootPolicy::Cascade;
    let (mut engine, ids) = training_engine(config);
    engine
        .enqueue(&EnqueueRequest::new(ids.infantry).count(20), &mut unlimited_ledger())
        .unwrap();

    let report = engine.advance(Seconds::MAX).unwrap();
    assert_eq!(report.completed.len(), 20);
    assert!(engine.available_slots().contains(&SlotId(0)));
}

/// Refund into a capped stockpile clamps at the cap.
#[test]
fn refund_into_full_stockpile_is_clamped() {
    let (mut engine, ids) = training_engine(QueueConfig::default());
    let mut ledger = Stockpile::new()
        .with_capacity(ids.gold, 100, 100)
        .with(ids.stone, 100);
    engine
        .enqueue(&EnqueueRequest::new(ids.infantry).count(2), &mut ledger)
        .unwrap();
    assert_eq!(ledger.balance(ids.gold), 0);

    ledger.credit(&bastion_core::cost::Cost::new().with(ids.gold, 90));
    engine.cancel_queued(SlotId(0), 1, &mut ledger).unwrap();
    assert_eq!(ledger.balance(ids.gold), 100);
}

/// Refund percent at both extremes.
#[test]
fn refund_percent_extremes() {
    for (percent, expected_gold) in [(0u8, 0u64), (100, 50)] {
        let mut config = QueueConfig::default();
        config.refund_percent = percent;
        let (mut engine, ids) = training_engine(config);
        let mut ledger = Stockpile::new().with(ids.gold, 100).with(ids.stone, 40);
        engine
            .enqueue(&EnqueueRequest::new(ids.infantry).count(2), &mut ledger)
            .unwrap();

        let cancelled = engine.cancel_queued(SlotId(0), 1, &mut ledger).unwrap();
        assert_eq!(cancelled.refund.get(ids.gold), expected_gold);
        assert_eq!(ledger.balance(ids.gold), expected_gold);
    }
}

/// Empty ledger: every unit is rejected and nothing changes.
#[test]
fn empty_ledger_rejects_everything() {
    let (mut engine, ids) = training_engine(QueueConfig::default());
    let mut ledger = Stockpile::new();
    let outcome = engine
        .enqueue(&EnqueueRequest::new(ids.archer).count(10), &mut ledger)
        .unwrap();
    assert_eq!(outcome.status(), EnqueueStatus::Rejected);
    assert_eq!(outcome.rejection, Some(RejectReason::InsufficientResources));
    assert_eq!(engine.event_bus.total_delivered(EventKind::JobAccepted), 0);
    assert_eq!(engine.event_bus.total_delivered(EventKind::QueueRejected), 1);
}

/// Operations on a slot that does not exist are errors, never panics.
#[test]
fn out_of_range_slot_everywhere() {
    let (mut engine, _) = training_engine(QueueConfig::default());
    let mut ledger = unlimited_ledger();
    let bad = SlotId(u32::MAX);

    assert_eq!(engine.slot(bad).err(), Some(QueueError::SlotNotFound(bad)));
    assert_eq!(engine.active_job(bad).err(), Some(QueueError::SlotNotFound(bad)));
    assert_eq!(engine.is_full(bad).err(), Some(QueueError::SlotNotFound(bad)));
    assert_eq!(engine.boost_cost(bad), Err(QueueError::SlotNotFound(bad)));
    assert!(engine.clear_queue(bad, &mut ledger).is_err());
    assert!(engine.boost(bad).is_err());
}

/// Clearing an empty or single-job slot is a no-op.
#[test]
fn clear_short_queues() {
    let (mut engine, ids) = training_engine(QueueConfig::default());
    let mut ledger = unlimited_ledger();
    assert!(engine.clear_queue(SlotId(0), &mut ledger).unwrap().is_empty());

    engine
        .enqueue(&EnqueueRequest::new(ids.infantry), &mut ledger)
        .unwrap();
    assert!(engine.clear_queue(SlotId(0), &mut ledger).unwrap().is_empty());
    assert_eq!(engine.pending_count(), 1);
}

/// A tiny event history keeps only the newest entries.
#[test]
fn tiny_event_history_drops_oldest() {
    let mut config = QueueConfig::training_line(50);
    config.event_capacity = 2;
    let (mut engine, ids) = training_engine(config);
    engine
        .enqueue(&EnqueueRequest::new(ids.infantry).count(5), &mut unlimited_ledger())
        .unwrap();

    let history = engine.event_bus.history(EventKind::JobAccepted).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history.total_written(), 5);
    assert_eq!(history.dropped_count(), 3);
}

/// Suppressed kinds never reach listeners or history.
#[test]
fn suppressed_events_are_skipped() {
    let (mut engine, ids) = training_engine(QueueConfig::default());
    engine.suppress_event(EventKind::JobAccepted);
    engine
        .enqueue(&EnqueueRequest::new(ids.infantry), &mut unlimited_ledger())
        .unwrap();
    engine.advance(secs(10)).unwrap();

    assert_eq!(engine.event_bus.total_delivered(EventKind::JobAccepted), 0);
    assert_eq!(engine.event_bus.total_delivered(EventKind::JobCompleted), 1);
}
