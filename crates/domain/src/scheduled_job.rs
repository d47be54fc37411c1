use crate::cadence::Cadence;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Advisory tag used for operational triage. It has no effect on
/// execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPriority {
    Critical,
    High,
    Medium,
    Low,
}

impl Display for JobPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobPriority::Critical => "critical",
            JobPriority::High => "high",
            JobPriority::Medium => "medium",
            JobPriority::Low => "low",
        };
        write!(f, "{}", s)
    }
}

/// One recurring task as declared in the `ScheduleRegistry`.
///
/// A `ScheduledJob` has no persistence of its own: its live state is
/// whatever the external scheduler currently holds, keyed by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledJob {
    /// Unique identifier, stable across deployments
    pub name: String,
    /// Relative path on this application that the scheduler invokes
    pub endpoint: String,
    pub cadence: Cadence,
    /// Maximum redelivery attempts the scheduler performs on failure
    pub retries: u32,
    pub priority: JobPriority,
    pub description: String,
}
