//! Barracks example: a training line and a pair of builders.
//!
//! Trains a burst of infantry, cancels one for a refund, boosts an upgrade
//! with gems, and applies completion effects from an event listener.
//!
//! Run with: `cargo run -p bastion-core --example barracks --features test-utils`

use std::cell::RefCell;
use std::rc::Rc;

use bastion_core::catalog::Effect;
use bastion_core::config::QueueConfig;
use bastion_core::engine::EnqueueRequest;
use bastion_core::event::{EventKind, QueueEvent};
use bastion_core::fixed::{secs, seconds_to_f64};
use bastion_core::id::SlotId;
use bastion_core::ledger::{ResourceLedger, Stockpile};
use bastion_core::test_utils::*;

fn main() {
    // --- Training line: one barracks, queue of 5 ---

    let (mut barracks, ids) = training_engine(QueueConfig::training_line(5));
    let mut ledger = Stockpile::new()
        .with(ids.gold, 1_000)
        .with(ids.stone, 1_000)
        .with(ids.gems, 10);

    let garrison = Rc::new(RefCell::new(0u32));
    let g = garrison.clone();
    barracks.on(
        EventKind::JobCompleted,
        Box::new(move |event| {
            if let QueueEvent::JobCompleted { completed, .. } = event
                && let Effect::Train { count, .. } = completed.job.effect
            {
                *g.borrow_mut() += count;
            }
        }),
    );

    let outcome = barracks
        .enqueue(&EnqueueRequest::new(ids.infantry).count(10), &mut ledger)
        .expect("infantry is in the catalog");
    println!(
        "Requested {} infantry: {} accepted, stopped by {:?}",
        outcome.requested,
        outcome.accepted_count(),
        outcome.rejection
    );

    let cancelled = barracks
        .cancel_queued(SlotId(0), 4, &mut ledger)
        .expect("index 4 is waiting");
    println!(
        "Cancelled job {:?}, refunded {} gold",
        cancelled.job.id,
        cancelled.refund.get(ids.gold)
    );

    for _ in 0..5 {
        barracks.advance(secs(10)).expect("positive delta");
    }
    println!(
        "After {:.0}s the garrison holds {} infantry",
        seconds_to_f64(barracks.clock()),
        garrison.borrow()
    );

    // --- Builders: two slots, one job each ---

    let (mut builders, ids) = training_engine(QueueConfig::builders(2));
    let outcome = builders
        .enqueue(
            &EnqueueRequest::new(ids.wall_upgrade).count(3).from_level(1),
            &mut ledger,
        )
        .expect("wall_upgrade is in the catalog");
    println!(
        "Queued {} wall upgrades, third rejected with {:?}",
        outcome.accepted_count(),
        outcome.rejection
    );

    builders.advance(secs(90)).expect("positive delta");
    let cost = builders.boost_cost(SlotId(0)).expect("slot 0 is busy");
    match builders
        .purchase_boost(SlotId(0), ids.gems, &mut ledger)
        .expect("slot 0 is busy")
    {
        Some(receipt) => println!(
            "Boosted wall to level {:?} for {} gems, {} gems left",
            receipt.completed.job.target_level,
            cost,
            ledger.balance(ids.gems)
        ),
        None => println!("Not enough gems for a {cost}-gem boost"),
    }
    println!("Free builders: {:?}", builders.available_slots());
}
