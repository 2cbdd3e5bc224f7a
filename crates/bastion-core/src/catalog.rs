use crate::cost::Cost;
use crate::fixed::Seconds;
use crate::id::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What happens when a job completes. Opaque to the engine; game code
/// listens for completion events and applies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Add `count` units of `unit` to the garrison.
    Train { unit: String, count: u32 },
    /// Raise `building` by one level. Jobs with this effect carry the
    /// target level resolved at enqueue time.
    Upgrade { building: String },
    /// Game-defined effect. The string key is interpreted by game code.
    Custom(String),
}

impl Effect {
    pub fn is_upgrade(&self) -> bool {
        matches!(self, Effect::Upgrade { .. })
    }
}

/// A resource kind registered in the catalog.
#[derive(Debug, Clone)]
pub struct ResourceDef {
    pub name: String,
}

/// Immutable definition of a job kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDefinition {
    pub kind: JobKindId,
    pub name: String,
    /// Time the job must accrue as slot head before it completes.
    pub duration: Seconds,
    pub cost: Cost,
    pub effect: Effect,
}

/// Read-only lookup of job definitions.
pub trait JobCatalog {
    fn lookup(&self, kind: JobKindId) -> Option<&JobDefinition>;
}

/// Builder for constructing an immutable [`Catalog`].
/// Two-phase lifecycle: registration -> finalization.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    resources: Vec<ResourceDef>,
    resource_name_to_id: HashMap<String, ResourceId>,
    jobs: Vec<JobDefinition>,
    job_name_to_id: HashMap<String, JobKindId>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource kind. Re-registering a name returns the existing ID.
    pub fn register_resource(&mut self, name: &str) -> ResourceId {
        if let Some(id) = self.resource_name_to_id.get(name) {
            return *id;
        }
        let id = ResourceId(self.resources.len() as u32);
        self.resources.push(ResourceDef {
            name: name.to_string(),
        });
        self.resource_name_to_id.insert(name.to_string(), id);
        id
    }

    /// Register a job kind. Returns its ID. Validation is deferred to `build`.
    pub fn register_job(
        &mut self,
        name: &str,
        duration: Seconds,
        cost: Cost,
        effect: Effect,
    ) -> Result<JobKindId, CatalogError> {
        if self.job_name_to_id.contains_key(name) {
            return Err(CatalogError::DuplicateName(name.to_string()));
        }
        let kind = JobKindId(self.jobs.len() as u32);
        self.jobs.push(JobDefinition {
            kind,
            name: name.to_string(),
            duration,
            cost,
            effect,
        });
        self.job_name_to_id.insert(name.to_string(), kind);
        Ok(kind)
    }

    /// Mutate an existing job definition by name before the catalog is frozen.
    pub fn mutate_job<F>(&mut self, name: &str, f: F) -> Result<(), CatalogError>
    where
        F: FnOnce(&mut JobDefinition),
    {
        let id = self
            .job_name_to_id
            .get(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;
        f(&mut self.jobs[id.0 as usize]);
        Ok(())
    }

    pub fn resource_id(&self, name: &str) -> Option<ResourceId> {
        self.resource_name_to_id.get(name).copied()
    }

    pub fn job_id(&self, name: &str) -> Option<JobKindId> {
        self.job_name_to_id.get(name).copied()
    }

    /// Finalize and build the immutable catalog.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        for job in &self.jobs {
            if job.duration <= Seconds::ZERO {
                return Err(CatalogError::NonPositiveDuration(job.name.clone()));
            }
            for resource in job.cost.resources() {
                if resource.0 as usize >= self.resources.len() {
                    return Err(CatalogError::InvalidResourceRef {
                        job: job.name.clone(),
                        resource,
                    });
                }
            }
        }

        tracing::debug!(
            target: "bastion.catalog",
            resources = self.resources.len(),
            jobs = self.jobs.len(),
            "catalog built"
        );

        Ok(Catalog {
            resources: self.resources,
            resource_name_to_id: self.resource_name_to_id,
            jobs: self.jobs,
            job_name_to_id: self.job_name_to_id,
        })
    }
}

/// Immutable job catalog. Frozen after build(). Safe to share behind an `Arc`.
#[derive(Debug)]
pub struct Catalog {
    resources: Vec<ResourceDef>,
    resource_name_to_id: HashMap<String, ResourceId>,
    jobs: Vec<JobDefinition>,
    job_name_to_id: HashMap<String, JobKindId>,
}

impl Catalog {
    pub fn get_job(&self, kind: JobKindId) -> Option<&JobDefinition> {
        self.jobs.get(kind.0 as usize)
    }

    pub fn get_resource(&self, id: ResourceId) -> Option<&ResourceDef> {
        self.resources.get(id.0 as usize)
    }

    pub fn job_id(&self, name: &str) -> Option<JobKindId> {
        self.job_name_to_id.get(name).copied()
    }

    pub fn resource_id(&self, name: &str) -> Option<ResourceId> {
        self.resource_name_to_id.get(name).copied()
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn jobs(&self) -> impl Iterator<Item = &JobDefinition> {
        self.jobs.iter()
    }
}

impl JobCatalog for Catalog {
    fn lookup(&self, kind: JobKindId) -> Option<&JobDefinition> {
        self.get_job(kind)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate job name: {0}")]
    DuplicateName(String),
    #[error("job '{0}' must have a duration greater than zero")]
    NonPositiveDuration(String),
    #[error("job '{job}' references unregistered resource {resource:?}")]
    InvalidResourceRef { job: String, resource: ResourceId },
}
