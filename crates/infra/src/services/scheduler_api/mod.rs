mod sync;

pub use sync::{
    CleanupOutcome, DriftReport, JobSyncResult, SyncAction, SyncPlan, SyncReport,
};

use crate::config::Config;
use carebook_domain::{ScheduleRegistry, ScheduledJob};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, info};

/// Header that tags a remote schedule with the registry job name it was
/// created for. This is what makes `name` a stable reconciliation key:
/// remote schedules without it are considered unmanaged and `sync` never
/// touches them.
pub const JOB_NAME_HEADER: &str = "x-carebook-job";

/// Header the scheduler echoes back on every dispatch request. Dispatch
/// targets compare it against the configured signing key.
pub const CRON_SIGNATURE_HEADER: &str = "x-cron-signature";

#[derive(Error, Debug)]
pub enum SchedulerApiError {
    #[error("the scheduler API is unreachable: {0}")]
    ServiceUnavailable(String),
    #[error("the scheduler API rejected the configured credentials")]
    Unauthorized,
    #[error("the scheduler API returned an unexpected status code: {0}")]
    UnexpectedStatusCode(StatusCode),
    #[error("the scheduler API returned a malformed response body")]
    MalformedResponse,
}

/// One schedule as the external scheduler currently holds it
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSchedule {
    pub schedule_id: String,
    /// Absolute URL the scheduler invokes at cron time
    pub destination: String,
    pub cron: Option<String>,
    pub interval: Option<String>,
    pub retries: u32,
    /// Registry job name, present only on schedules this service created
    pub job_name: Option<String>,
}

impl RemoteSchedule {
    pub fn cadence_str(&self) -> Option<&str> {
        self.cron.as_deref().or_else(|| self.interval.as_deref())
    }

    pub fn is_managed(&self) -> bool {
        self.job_name.is_some()
    }
}

#[derive(Debug, Serialize)]
struct CreateScheduleBody<'a> {
    destination: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cron: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interval: Option<&'a str>,
    retries: u32,
    headers: HashMap<&'a str, &'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateScheduleResponse {
    schedule_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteScheduleRaw {
    schedule_id: String,
    destination: String,
    cron: Option<String>,
    interval: Option<String>,
    #[serde(default)]
    retries: u32,
    #[serde(default)]
    headers: HashMap<String, String>,
}

impl From<RemoteScheduleRaw> for RemoteSchedule {
    fn from(mut raw: RemoteScheduleRaw) -> Self {
        Self {
            job_name: raw.headers.remove(JOB_NAME_HEADER),
            schedule_id: raw.schedule_id,
            destination: raw.destination,
            cron: raw.cron,
            interval: raw.interval,
            retries: raw.retries,
        }
    }
}

/// The one client for the external scheduling service. All management
/// commands and reconciliation go through here.
pub struct SchedulerApiClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    app_base_url: String,
    signing_key: String,
}

impl SchedulerApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.scheduler_api_url.clone(),
            api_token: config.scheduler_api_token.clone(),
            app_base_url: config.app_base_url.clone(),
            signing_key: config.cron_signing_key.clone(),
        }
    }

    /// The absolute URL the scheduler should invoke for a registry endpoint
    pub fn destination(&self, endpoint: &str) -> String {
        format!("{}{}", self.app_base_url, endpoint)
    }

    fn handle_error_status(&self, status: StatusCode) -> SchedulerApiError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SchedulerApiError::Unauthorized,
            status => SchedulerApiError::UnexpectedStatusCode(status),
        }
    }

    /// All schedules currently registered on the external scheduler
    pub async fn list(&self) -> Result<Vec<RemoteSchedule>, SchedulerApiError> {
        let res = self
            .http
            .get(format!("{}/schedules", self.base_url))
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| SchedulerApiError::ServiceUnavailable(e.to_string()))?;

        if !res.status().is_success() {
            return Err(self.handle_error_status(res.status()));
        }

        let raw: Vec<RemoteScheduleRaw> = res
            .json()
            .await
            .map_err(|_| SchedulerApiError::MalformedResponse)?;
        Ok(raw.into_iter().map(|r| r.into()).collect())
    }

    /// Registers one job on the external scheduler and returns the remote
    /// schedule id
    pub async fn create(&self, job: &ScheduledJob) -> Result<String, SchedulerApiError> {
        let destination = self.destination(&job.endpoint);
        let mut headers = HashMap::new();
        headers.insert(JOB_NAME_HEADER, job.name.as_str());
        headers.insert(CRON_SIGNATURE_HEADER, self.signing_key.as_str());

        let body = CreateScheduleBody {
            destination: &destination,
            cron: job.cadence.as_cron(),
            interval: job.cadence.as_interval(),
            retries: job.retries,
            headers,
        };

        let res = self
            .http
            .post(format!("{}/schedules", self.base_url))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| SchedulerApiError::ServiceUnavailable(e.to_string()))?;

        if !res.status().is_success() {
            return Err(self.handle_error_status(res.status()));
        }

        let created: CreateScheduleResponse = res
            .json()
            .await
            .map_err(|_| SchedulerApiError::MalformedResponse)?;
        Ok(created.schedule_id)
    }

    pub async fn delete(&self, schedule_id: &str) -> Result<(), SchedulerApiError> {
        let res = self
            .http
            .delete(format!("{}/schedules/{}", self.base_url, schedule_id))
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| SchedulerApiError::ServiceUnavailable(e.to_string()))?;

        if !res.status().is_success() {
            return Err(self.handle_error_status(res.status()));
        }
        Ok(())
    }

    /// Reconciles the registry with the remote state: creates missing
    /// schedules, replaces drifted ones and removes managed schedules that
    /// are no longer declared. Failures on one job never stop the others
    /// and nothing is rolled back.
    pub async fn sync(
        &self,
        registry: &ScheduleRegistry,
    ) -> Result<SyncReport, SchedulerApiError> {
        let remote = self.list().await?;
        let plan = SyncPlan::compute(registry, &remote, &self.app_base_url);

        let mut results = Vec::with_capacity(registry.len());

        for job in &plan.unchanged {
            results.push(JobSyncResult {
                name: job.name.clone(),
                outcome: Ok(SyncAction::Unchanged),
            });
        }

        for job in &plan.create {
            let outcome = match self.create(job).await {
                Ok(schedule_id) => {
                    info!("Created remote schedule {} for job {}", schedule_id, job.name);
                    Ok(SyncAction::Created)
                }
                Err(e) => {
                    error!("Unable to create remote schedule for job {}: {}", job.name, e);
                    Err(e)
                }
            };
            results.push(JobSyncResult {
                name: job.name.clone(),
                outcome,
            });
        }

        // The remote API has no update verb, so replacing a drifted
        // schedule is delete-then-create under the same stable name
        'jobs: for (job, stale) in &plan.update {
            for schedule in stale {
                if let Err(e) = self.delete(&schedule.schedule_id).await {
                    error!(
                        "Unable to delete stale schedule {} for job {}: {}",
                        schedule.schedule_id, job.name, e
                    );
                    results.push(JobSyncResult {
                        name: job.name.clone(),
                        outcome: Err(e),
                    });
                    continue 'jobs;
                }
            }
            let outcome = match self.create(job).await {
                Ok(schedule_id) => {
                    info!(
                        "Replaced remote schedule for job {} with {}",
                        job.name, schedule_id
                    );
                    Ok(SyncAction::Updated)
                }
                Err(e) => {
                    error!("Unable to recreate schedule for job {}: {}", job.name, e);
                    Err(e)
                }
            };
            results.push(JobSyncResult {
                name: job.name.clone(),
                outcome,
            });
        }

        let mut deleted_stale = 0;
        let mut failed_deletes = 0;
        for schedule in &plan.delete {
            match self.delete(&schedule.schedule_id).await {
                Ok(_) => deleted_stale += 1,
                Err(e) => {
                    error!(
                        "Unable to delete removed schedule {}: {}",
                        schedule.schedule_id, e
                    );
                    failed_deletes += 1;
                }
            }
        }

        Ok(SyncReport {
            results,
            deleted_stale,
            failed_deletes,
        })
    }

    /// Deletes every remote schedule, managed or not. Destructive, meant
    /// for full re-provisioning only.
    pub async fn cleanup(&self) -> Result<CleanupOutcome, SchedulerApiError> {
        let remote = self.list().await?;
        let mut outcome = CleanupOutcome {
            deleted: 0,
            failed: 0,
        };
        for schedule in &remote {
            match self.delete(&schedule.schedule_id).await {
                Ok(_) => outcome.deleted += 1,
                Err(e) => {
                    error!("Unable to delete schedule {}: {}", schedule.schedule_id, e);
                    outcome.failed += 1;
                }
            }
        }
        Ok(outcome)
    }
}
