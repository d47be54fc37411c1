use carebook_domain::{ReminderStage, ID};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::error;

/// One reminder to be delivered to a patient through the notification
/// provider
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderNotification {
    /// Booking or pending payment the reminder is about
    pub candidate_id: ID,
    pub recipient_id: ID,
    pub stage: ReminderStage,
}

#[async_trait::async_trait]
pub trait INotifier: Send + Sync {
    async fn send(&self, notification: &ReminderNotification) -> anyhow::Result<()>;
}

/// Delivers reminders to the notification provider over HTTP
pub struct HttpNotifier {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpNotifier {
    pub fn new(url: String, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl INotifier for HttpNotifier {
    async fn send(&self, notification: &ReminderNotification) -> anyhow::Result<()> {
        let mut req = self.http.post(&self.url).json(notification);
        if let Some(api_key) = &self.api_key {
            req = req.header("x-api-key", api_key);
        }
        let res = req.send().await.map_err(|e| {
            error!("Error delivering reminder to notification provider: {:?}", e);
            e
        })?;
        if !res.status().is_success() {
            anyhow::bail!(
                "Notification provider returned status code: {}",
                res.status()
            );
        }
        Ok(())
    }
}

/// Notifier that records sends instead of delivering them, for tests
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<ReminderNotification>>,
    pub fail_next: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_next: AtomicBool::new(false),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl INotifier for RecordingNotifier {
    async fn send(&self, notification: &ReminderNotification) -> anyhow::Result<()> {
        if self.fail_next.load(Ordering::SeqCst) {
            anyhow::bail!("notifier set to fail");
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}
