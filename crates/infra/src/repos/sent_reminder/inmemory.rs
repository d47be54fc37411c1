use super::ISentReminderRepo;
use carebook_domain::{ReminderStage, SentReminder, ID};
use std::sync::Mutex;

pub struct InMemorySentReminderRepo {
    reminders: Mutex<Vec<SentReminder>>,
}

impl InMemorySentReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemorySentReminderRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ISentReminderRepo for InMemorySentReminderRepo {
    async fn insert(&self, reminder: &SentReminder) -> anyhow::Result<bool> {
        let mut reminders = self.reminders.lock().unwrap();
        let exists = reminders
            .iter()
            .any(|r| r.candidate_id == reminder.candidate_id && r.stage == reminder.stage);
        if exists {
            return Ok(false);
        }
        reminders.push(reminder.clone());
        Ok(true)
    }

    async fn find(&self, candidate_id: &ID, stage: ReminderStage) -> Option<SentReminder> {
        let reminders = self.reminders.lock().unwrap();
        reminders
            .iter()
            .find(|r| &r.candidate_id == candidate_id && r.stage == stage)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_insert_for_same_stage_is_rejected() {
        let repo = InMemorySentReminderRepo::new();
        let reminder = SentReminder {
            candidate_id: ID::new(),
            stage: ReminderStage::Appointment24h,
            sent_at: 100,
        };
        assert!(repo.insert(&reminder).await.unwrap());
        assert!(!repo.insert(&reminder).await.unwrap());

        // A different stage for the same candidate is its own marker
        let other_stage = SentReminder {
            stage: ReminderStage::Appointment1h,
            ..reminder.clone()
        };
        assert!(repo.insert(&other_stage).await.unwrap());
    }

    #[tokio::test]
    async fn find_returns_the_stored_marker() {
        let repo = InMemorySentReminderRepo::new();
        let reminder = SentReminder {
            candidate_id: ID::new(),
            stage: ReminderStage::PaymentGentle,
            sent_at: 42,
        };
        repo.insert(&reminder).await.unwrap();

        let found = repo
            .find(&reminder.candidate_id, ReminderStage::PaymentGentle)
            .await;
        assert_eq!(found, Some(reminder.clone()));
        assert!(repo
            .find(&reminder.candidate_id, ReminderStage::PaymentUrgent)
            .await
            .is_none());
    }
}
