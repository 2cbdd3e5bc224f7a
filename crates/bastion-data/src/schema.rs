//! Serde data file structs for queue content definitions.
//!
//! These structs define the on-disk format for resources, jobs, and queue
//! configuration. They are deserialized from RON, JSON, or TOML data files
//! and then resolved into core types by the loader.

use std::collections::BTreeMap;

use bastion_core::catalog::Effect;
use serde::Deserialize;

// ===========================================================================
// Resources
// ===========================================================================

/// A resource kind definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceData {
    pub name: String,
}

// ===========================================================================
// Jobs
// ===========================================================================

/// A job kind definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct JobData {
    pub name: String,
    /// Seconds. Fractions are allowed.
    pub duration: f64,
    /// Resource name to amount.
    #[serde(default)]
    pub cost: BTreeMap<String, u64>,
    pub effect: EffectData,
}

/// What a job does on completion.
#[derive(Debug, Clone, Deserialize)]
pub enum EffectData {
    Train {
        unit: String,
        #[serde(default = "default_count")]
        count: u32,
    },
    Upgrade {
        building: String,
    },
    Custom(String),
}

fn default_count() -> u32 {
    1
}

impl From<EffectData> for Effect {
    fn from(data: EffectData) -> Self {
        match data {
            EffectData::Train { unit, count } => Effect::Train { unit, count },
            EffectData::Upgrade { building } => Effect::Upgrade { building },
            EffectData::Custom(key) => Effect::Custom(key),
        }
    }
}

// ===========================================================================
// TOML wrappers
// ===========================================================================

/// TOML files need a top-level table; lists live under a named key.
#[derive(Debug, Deserialize)]
pub struct TomlResources {
    pub resources: Vec<ResourceData>,
}

#[derive(Debug, Deserialize)]
pub struct TomlJobs {
    pub jobs: Vec<JobData>,
}
