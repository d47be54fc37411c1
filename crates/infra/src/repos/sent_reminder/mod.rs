mod inmemory;
mod postgres;

pub use inmemory::InMemorySentReminderRepo;
pub use postgres::PostgresSentReminderRepo;

use carebook_domain::{ReminderStage, SentReminder, ID};

/// Stores the at-most-once markers for reminder stages.
///
/// `insert` is the concurrency guard for the whole reminder pipeline: two
/// overlapping cron invocations both trying to claim the same
/// (candidate, stage) pair must see exactly one `true`.
#[async_trait::async_trait]
pub trait ISentReminderRepo: Send + Sync {
    /// Returns `false` when a marker for this (candidate, stage) pair
    /// already exists
    async fn insert(&self, reminder: &SentReminder) -> anyhow::Result<bool>;
    async fn find(&self, candidate_id: &ID, stage: ReminderStage) -> Option<SentReminder>;
}
