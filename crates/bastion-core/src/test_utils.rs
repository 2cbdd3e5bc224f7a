//! Shared fixtures for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available to other crates via the `test-utils` feature.

use std::sync::Arc;

use crate::catalog::{Catalog, CatalogBuilder, Effect};
use crate::config::QueueConfig;
use crate::cost::Cost;
use crate::engine::QueueEngine;
use crate::fixed::secs;
use crate::id::{JobKindId, ResourceId};
use crate::ledger::Stockpile;

/// Ids registered by [`sample_catalog`].
#[derive(Debug, Clone, Copy)]
pub struct SampleIds {
    pub gold: ResourceId,
    pub stone: ResourceId,
    pub gems: ResourceId,
    /// 10s, 50 gold + 20 stone.
    pub infantry: JobKindId,
    /// 12s, 75 gold + 10 stone.
    pub archer: JobKindId,
    /// 300s upgrade, 100 gold + 200 stone.
    pub wall_upgrade: JobKindId,
}

// ===========================================================================
// Catalog
// ===========================================================================

pub fn sample_catalog() -> (Catalog, SampleIds) {
    let mut builder = CatalogBuilder::new();
    let gold = builder.register_resource("gold");
    let stone = builder.register_resource("stone");
    let gems = builder.register_resource("gems");

    let infantry = builder
        .register_job(
            "infantry",
            secs(10),
            Cost::new().with(gold, 50).with(stone, 20),
            Effect::Train {
                unit: "infantry".into(),
                count: 1,
            },
        )
        .expect("infantry registers");
    let archer = builder
        .register_job(
            "archer",
            secs(12),
            Cost::new().with(gold, 75).with(stone, 10),
            Effect::Train {
                unit: "archer".into(),
                count: 1,
            },
        )
        .expect("archer registers");
    let wall_upgrade = builder
        .register_job(
            "wall_upgrade",
            secs(300),
            Cost::new().with(gold, 100).with(stone, 200),
            Effect::Upgrade {
                building: "wall".into(),
            },
        )
        .expect("wall_upgrade registers");

    let catalog = builder.build().expect("sample catalog is valid");
    (
        catalog,
        SampleIds {
            gold,
            stone,
            gems,
            infantry,
            archer,
            wall_upgrade,
        },
    )
}

// ===========================================================================
// Engines and ledgers
// ===========================================================================

pub fn training_engine(config: QueueConfig) -> (QueueEngine, SampleIds) {
    let (catalog, ids) = sample_catalog();
    let engine = QueueEngine::new(config, Arc::new(catalog)).expect("valid config");
    (engine, ids)
}

/// A stockpile holding a million of each [`sample_catalog`] resource.
pub fn unlimited_ledger() -> Stockpile {
    Stockpile::new()
        .with(ResourceId(0), 1_000_000)
        .with(ResourceId(1), 1_000_000)
        .with(ResourceId(2), 1_000_000)
}
