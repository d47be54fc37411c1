use crate::cadence::Cadence;
use crate::scheduled_job::{JobPriority, ScheduledJob};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RegistryError {
    #[error("two jobs in the registry share the name: `{0}`")]
    DuplicateName(String),
}

/// The declarative table of every recurring job the marketplace needs.
///
/// This is an immutable value constructed at startup and handed to the
/// scheduler client, so tests can substitute their own registry without
/// touching the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRegistry {
    jobs: Vec<ScheduledJob>,
}

impl ScheduleRegistry {
    pub fn new(jobs: Vec<ScheduledJob>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for job in &jobs {
            if !seen.insert(job.name.clone()) {
                return Err(RegistryError::DuplicateName(job.name.clone()));
            }
        }
        Ok(Self { jobs })
    }

    /// The production job table
    pub fn standard() -> Self {
        let jobs = vec![
            ScheduledJob {
                name: "appointmentReminders".into(),
                endpoint: "/api/cron/appointment-reminders".into(),
                cadence: Cadence::cron("*/15 * * * *").expect("valid cron expression"),
                retries: 3,
                priority: JobPriority::Critical,
                description: "24-hour and 1-hour reminders for upcoming appointments".into(),
            },
            ScheduledJob {
                name: "paymentReminders".into(),
                endpoint: "/api/cron/payment-reminders".into(),
                cadence: Cadence::cron("0 9 * * *").expect("valid cron expression"),
                retries: 3,
                priority: JobPriority::High,
                description: "Day-3 gentle and Day-6 urgent reminders for pending payments".into(),
            },
            ScheduledJob {
                name: "payoutTransfers".into(),
                endpoint: "/api/cron/payout-transfers".into(),
                cadence: Cadence::interval("2h").expect("valid interval"),
                retries: 5,
                priority: JobPriority::Critical,
                description: "Transfers aged pending payouts to expert accounts".into(),
            },
        ];
        Self::new(jobs).expect("standard registry has unique job names")
    }

    pub fn jobs(&self) -> &[ScheduledJob] {
        &self.jobs
    }

    pub fn get(&self, name: &str) -> Option<&ScheduledJob> {
        self.jobs.iter().find(|j| j.name == name)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(name: &str) -> ScheduledJob {
        ScheduledJob {
            name: name.into(),
            endpoint: format!("/api/cron/{}", name),
            cadence: Cadence::cron("0 9 * * *").unwrap(),
            retries: 3,
            priority: JobPriority::Medium,
            description: String::new(),
        }
    }

    #[test]
    fn rejects_duplicate_job_names() {
        let res = ScheduleRegistry::new(vec![job("a"), job("b"), job("a")]);
        assert_eq!(res.unwrap_err(), RegistryError::DuplicateName("a".into()));
    }

    #[test]
    fn standard_registry_is_valid() {
        let registry = ScheduleRegistry::standard();
        assert_eq!(registry.len(), 3);
        let reminders = registry.get("appointmentReminders").unwrap();
        assert_eq!(reminders.endpoint, "/api/cron/appointment-reminders");
        assert!(registry.get("payoutTransfers").is_some());
    }

    #[test]
    fn lookup_by_name() {
        let registry = ScheduleRegistry::new(vec![job("a"), job("b")]).unwrap();
        assert!(registry.get("a").is_some());
        assert!(registry.get("c").is_none());
    }
}
