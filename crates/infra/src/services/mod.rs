mod notifier;
mod payments;
mod scheduler_api;

pub use notifier::{HttpNotifier, INotifier, RecordingNotifier, ReminderNotification};
pub use payments::{
    HttpPaymentProvider, IPaymentProvider, RecordingPaymentProvider, TransferRequest,
};
pub use scheduler_api::{
    CleanupOutcome, DriftReport, JobSyncResult, RemoteSchedule, SchedulerApiClient,
    SchedulerApiError, SyncAction, SyncPlan, SyncReport, CRON_SIGNATURE_HEADER, JOB_NAME_HEADER,
};
