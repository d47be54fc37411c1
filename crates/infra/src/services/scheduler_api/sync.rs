use super::{RemoteSchedule, SchedulerApiError};
use carebook_domain::{ScheduleRegistry, ScheduledJob};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug)]
pub struct JobSyncResult {
    pub name: String,
    pub outcome: Result<SyncAction, SchedulerApiError>,
}

/// Per-job outcome of one `sync` run
#[derive(Debug)]
pub struct SyncReport {
    pub results: Vec<JobSyncResult>,
    /// Managed schedules removed because their job left the registry
    pub deleted_stale: usize,
    pub failed_deletes: usize,
}

impl SyncReport {
    pub fn has_failures(&self) -> bool {
        self.failed_deletes > 0 || self.results.iter().any(|r| r.outcome.is_err())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupOutcome {
    pub deleted: usize,
    pub failed: usize,
}

/// The set difference between the desired registry and the remote state,
/// keyed by job name. Pure data; executing it is the client's concern.
#[derive(Debug)]
pub struct SyncPlan<'a> {
    pub create: Vec<&'a ScheduledJob>,
    /// Jobs whose remote schedules drifted (cadence, retries or
    /// destination), with every remote schedule currently under their name
    pub update: Vec<(&'a ScheduledJob, Vec<&'a RemoteSchedule>)>,
    pub unchanged: Vec<&'a ScheduledJob>,
    /// Managed schedules whose job is no longer in the registry
    pub delete: Vec<&'a RemoteSchedule>,
}

fn in_sync(job: &ScheduledJob, remote: &RemoteSchedule, app_base_url: &str) -> bool {
    let destination_matches =
        remote.destination == format!("{}{}", app_base_url, job.endpoint);
    let cadence_matches = match (job.cadence.as_cron(), job.cadence.as_interval()) {
        (Some(cron), None) => remote.cron.as_deref() == Some(cron) && remote.interval.is_none(),
        (None, Some(interval)) => {
            remote.interval.as_deref() == Some(interval) && remote.cron.is_none()
        }
        _ => false,
    };
    destination_matches && cadence_matches && remote.retries == job.retries
}

impl<'a> SyncPlan<'a> {
    pub fn compute(
        registry: &'a ScheduleRegistry,
        remote: &'a [RemoteSchedule],
        app_base_url: &str,
    ) -> Self {
        let mut by_name: HashMap<&str, Vec<&RemoteSchedule>> = HashMap::new();
        for schedule in remote {
            if let Some(name) = schedule.job_name.as_deref() {
                by_name.entry(name).or_default().push(schedule);
            }
        }

        let mut create = Vec::new();
        let mut update = Vec::new();
        let mut unchanged = Vec::new();

        for job in registry.jobs() {
            match by_name.remove(job.name.as_str()) {
                None => create.push(job),
                Some(schedules) => {
                    // A single matching schedule is the converged state.
                    // Anything else (drift, or duplicates left behind by the
                    // old blind-create behavior) is replaced wholesale.
                    if schedules.len() == 1 && in_sync(job, schedules[0], app_base_url) {
                        unchanged.push(job);
                    } else {
                        update.push((job, schedules));
                    }
                }
            }
        }

        // Whatever managed schedules remain have no registry entry anymore
        let delete = by_name.into_values().flatten().collect();

        Self {
            create,
            update,
            unchanged,
            delete,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }
}

/// Registry-vs-remote comparison for the `stats` command
#[derive(Debug)]
pub struct DriftReport {
    pub registry_jobs: usize,
    pub managed_remote: usize,
    pub unmanaged_remote: usize,
    /// Registry jobs with no remote schedule at all
    pub missing: Vec<String>,
    /// Registry jobs whose remote schedule exists but differs
    pub drifted: Vec<String>,
    /// Managed remote schedules whose job left the registry
    pub orphaned: Vec<String>,
}

impl DriftReport {
    pub fn compute(
        registry: &ScheduleRegistry,
        remote: &[RemoteSchedule],
        app_base_url: &str,
    ) -> Self {
        let plan = SyncPlan::compute(registry, remote, app_base_url);
        let orphaned: Vec<String> = plan
            .delete
            .iter()
            .filter_map(|s| s.job_name.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        Self {
            registry_jobs: registry.len(),
            managed_remote: remote.iter().filter(|s| s.is_managed()).count(),
            unmanaged_remote: remote.iter().filter(|s| !s.is_managed()).count(),
            missing: plan.create.iter().map(|j| j.name.clone()).collect(),
            drifted: plan.update.iter().map(|(j, _)| j.name.clone()).collect(),
            orphaned,
        }
    }

    pub fn in_sync(&self) -> bool {
        self.missing.is_empty() && self.drifted.is_empty() && self.orphaned.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carebook_domain::{Cadence, JobPriority};

    const APP_URL: &str = "https://app.carebook.test";

    fn job(name: &str, cadence: Cadence, retries: u32) -> ScheduledJob {
        ScheduledJob {
            name: name.into(),
            endpoint: format!("/api/cron/{}", name),
            cadence,
            retries,
            priority: JobPriority::Medium,
            description: String::new(),
        }
    }

    fn remote_for(job: &ScheduledJob, schedule_id: &str) -> RemoteSchedule {
        RemoteSchedule {
            schedule_id: schedule_id.into(),
            destination: format!("{}{}", APP_URL, job.endpoint),
            cron: job.cadence.as_cron().map(|c| c.to_string()),
            interval: job.cadence.as_interval().map(|i| i.to_string()),
            retries: job.retries,
            job_name: Some(job.name.clone()),
        }
    }

    fn registry(jobs: Vec<ScheduledJob>) -> ScheduleRegistry {
        ScheduleRegistry::new(jobs).unwrap()
    }

    #[test]
    fn creates_all_jobs_against_empty_remote() {
        let registry = registry(vec![
            job("a", Cadence::cron("0 9 * * *").unwrap(), 3),
            job("b", Cadence::interval("2h").unwrap(), 5),
        ]);
        let plan = SyncPlan::compute(&registry, &[], APP_URL);
        assert_eq!(plan.create.len(), 2);
        assert!(plan.update.is_empty());
        assert!(plan.delete.is_empty());
    }

    #[test]
    fn converged_state_yields_noop_plan() {
        let reg = registry(vec![
            job("a", Cadence::cron("0 9 * * *").unwrap(), 3),
            job("b", Cadence::interval("2h").unwrap(), 5),
        ]);
        let remote: Vec<_> = reg
            .jobs()
            .iter()
            .enumerate()
            .map(|(i, j)| remote_for(j, &format!("sched_{}", i)))
            .collect();

        let plan = SyncPlan::compute(&reg, &remote, APP_URL);
        assert!(plan.is_noop());
        assert_eq!(plan.unchanged.len(), 2);
    }

    #[test]
    fn cadence_change_yields_update_not_duplicate() {
        // Regression guard for the blind-create gap: a changed cron
        // expression must replace the remote schedule in place
        let old = job("a", Cadence::cron("0 9 * * *").unwrap(), 3);
        let remote = vec![remote_for(&old, "sched_old")];

        let reg = registry(vec![job("a", Cadence::cron("0 12 * * *").unwrap(), 3)]);
        let plan = SyncPlan::compute(&reg, &remote, APP_URL);

        assert!(plan.create.is_empty());
        assert_eq!(plan.update.len(), 1);
        let (updated, stale) = &plan.update[0];
        assert_eq!(updated.name, "a");
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].schedule_id, "sched_old");
    }

    #[test]
    fn retries_change_is_drift() {
        let old = job("a", Cadence::cron("0 9 * * *").unwrap(), 3);
        let remote = vec![remote_for(&old, "sched_old")];
        let reg = registry(vec![job("a", Cadence::cron("0 9 * * *").unwrap(), 5)]);
        let plan = SyncPlan::compute(&reg, &remote, APP_URL);
        assert_eq!(plan.update.len(), 1);
    }

    #[test]
    fn duplicate_remotes_under_one_name_are_collapsed() {
        let j = job("a", Cadence::cron("0 9 * * *").unwrap(), 3);
        let remote = vec![remote_for(&j, "sched_1"), remote_for(&j, "sched_2")];
        let reg = registry(vec![j.clone()]);

        let plan = SyncPlan::compute(&reg, &remote, APP_URL);
        assert_eq!(plan.update.len(), 1);
        assert_eq!(plan.update[0].1.len(), 2);
    }

    #[test]
    fn removed_jobs_are_deleted_but_unmanaged_remotes_survive() {
        let gone = job("gone", Cadence::cron("0 9 * * *").unwrap(), 3);
        let mut unmanaged = remote_for(&gone, "sched_x");
        unmanaged.job_name = None;

        let remote = vec![remote_for(&gone, "sched_gone"), unmanaged];
        let reg = registry(vec![]);

        let plan = SyncPlan::compute(&reg, &remote, APP_URL);
        assert_eq!(plan.delete.len(), 1);
        assert_eq!(plan.delete[0].schedule_id, "sched_gone");
    }

    #[test]
    fn standard_registry_round_trips_to_noop() {
        let reg = ScheduleRegistry::standard();
        let plan = SyncPlan::compute(&reg, &[], APP_URL);
        assert_eq!(plan.create.len(), reg.len());

        // Pretend the creates were applied and re-plan
        let remote: Vec<_> = plan
            .create
            .iter()
            .enumerate()
            .map(|(i, j)| remote_for(j, &format!("sched_{}", i)))
            .collect();
        let second = SyncPlan::compute(&reg, &remote, APP_URL);
        assert!(second.is_noop());
    }

    #[test]
    fn drift_report_flags_missing_drifted_and_orphaned() {
        let present = job("present", Cadence::cron("0 9 * * *").unwrap(), 3);
        let drifted_old = job("drifted", Cadence::cron("0 9 * * *").unwrap(), 3);
        let orphan = job("orphan", Cadence::cron("0 9 * * *").unwrap(), 3);

        let remote = vec![
            remote_for(&present, "s1"),
            remote_for(&drifted_old, "s2"),
            remote_for(&orphan, "s3"),
        ];
        let reg = registry(vec![
            present,
            job("drifted", Cadence::cron("0 18 * * *").unwrap(), 3),
            job("missing", Cadence::interval("2h").unwrap(), 1),
        ]);

        let report = DriftReport::compute(&reg, &remote, APP_URL);
        assert_eq!(report.registry_jobs, 3);
        assert_eq!(report.managed_remote, 3);
        assert_eq!(report.missing, vec!["missing".to_string()]);
        assert_eq!(report.drifted, vec!["drifted".to_string()]);
        assert_eq!(report.orphaned, vec!["orphan".to_string()]);
        assert!(!report.in_sync());
    }
}
