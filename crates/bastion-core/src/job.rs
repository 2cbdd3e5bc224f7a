use crate::catalog::{Effect, JobDefinition};
use crate::cost::Cost;
use crate::fixed::Seconds;
use crate::id::{JobId, JobKindId, SlotId};
use serde::{Deserialize, Serialize};

/// Lifecycle of a job. `Queued -> Active -> {Completed | Cancelled}`, with
/// `Queued -> Cancelled` for jobs cancelled before they reach the head.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    #[default]
    Queued,
    Active,
    Completed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Cancelled)
    }
}

/// A resolved unit of work. Carries its own copy of the definition fields it
/// needs so that catalog or building changes after enqueue cannot reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub kind: JobKindId,
    pub slot: SlotId,
    pub duration: Seconds,
    /// Cost debited at enqueue; the basis for any refund.
    pub cost: Cost,
    pub effect: Effect,
    /// For upgrade jobs, the level the building reaches on completion.
    pub target_level: Option<u32>,
    /// Only grows while the job is the head of its slot.
    pub elapsed: Seconds,
    pub state: JobState,
}

impl Job {
    pub(crate) fn resolve(
        id: JobId,
        slot: SlotId,
        definition: &JobDefinition,
        target_level: Option<u32>,
    ) -> Self {
        Self {
            id,
            kind: definition.kind,
            slot,
            duration: definition.duration,
            cost: definition.cost.clone(),
            effect: definition.effect.clone(),
            target_level,
            elapsed: Seconds::ZERO,
            state: JobState::Queued,
        }
    }

    /// Time still needed before completion. Never negative.
    pub fn remaining(&self) -> Seconds {
        (self.duration - self.elapsed).max(Seconds::ZERO)
    }

    /// Progress as a 0..=1 fraction, for progress bars.
    pub fn fraction_complete(&self) -> Seconds {
        if self.duration <= Seconds::ZERO {
            return Seconds::ONE;
        }
        self.elapsed
            .checked_div(self.duration)
            .unwrap_or(Seconds::ONE)
            .min(Seconds::ONE)
    }

    pub fn is_ready(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Payload delivered to game code when a job finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedJob {
    pub job: Job,
    /// Whether completion was bought with a boost rather than waited out.
    pub boosted: bool,
}

/// Payload describing a cancelled job and what was refunded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelledJob {
    pub job: Job,
    pub refund: Cost,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::{f64_to_seconds, secs};

    fn sample_job() -> Job {
        let def = JobDefinition {
            kind: JobKindId(0),
            name: "infantry".to_string(),
            duration: secs(10),
            cost: Cost::new(),
            effect: Effect::Custom("x".to_string()),
        };
        Job::resolve(JobId(1), SlotId(0), &def, None)
    }

    #[test]
    fn resolved_job_starts_queued_at_zero() {
        let job = sample_job();
        assert_eq!(job.state, JobState::Queued);
        assert_eq!(job.elapsed, Seconds::ZERO);
        assert_eq!(job.remaining(), secs(10));
    }

    #[test]
    fn remaining_never_negative() {
        let mut job = sample_job();
        job.elapsed = secs(15);
        assert_eq!(job.remaining(), Seconds::ZERO);
        assert!(job.is_ready());
    }

    #[test]
    fn fraction_complete_clamps() {
        let mut job = sample_job();
        job.elapsed = secs(5);
        assert_eq!(job.fraction_complete(), f64_to_seconds(0.5));
        job.elapsed = secs(50);
        assert_eq!(job.fraction_complete(), Seconds::ONE);
    }

    #[test]
    fn fraction_complete_saturated_elapsed_short_duration() {
        let mut job = sample_job();
        job.duration = Seconds::DELTA;
        job.elapsed = Seconds::MAX;
        assert_eq!(job.fraction_complete(), Seconds::ONE);
    }

    #[test]
    fn terminal_states() {
        assert!(!JobState::Queued.is_terminal());
        assert!(!JobState::Active.is_terminal());
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Cancelled.is_terminal());
    }
}
