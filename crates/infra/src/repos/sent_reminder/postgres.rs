use super::ISentReminderRepo;
use carebook_domain::{ReminderStage, SentReminder, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresSentReminderRepo {
    pool: PgPool,
}

impl PostgresSentReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SentReminderRaw {
    candidate_uid: Uuid,
    stage: String,
    sent_at: i64,
}

impl SentReminderRaw {
    fn into_domain(self) -> Option<SentReminder> {
        Some(SentReminder {
            candidate_id: self.candidate_uid.into(),
            stage: self.stage.parse().ok()?,
            sent_at: self.sent_at,
        })
    }
}

#[async_trait::async_trait]
impl ISentReminderRepo for PostgresSentReminderRepo {
    async fn insert(&self, reminder: &SentReminder) -> anyhow::Result<bool> {
        // The unique index on (candidate_uid, stage) makes this insert the
        // claim that at most one invocation can win
        let res = sqlx::query(
            r#"
            INSERT INTO sent_reminders
            (candidate_uid, stage, sent_at)
            VALUES($1, $2, $3)
            ON CONFLICT (candidate_uid, stage) DO NOTHING
            "#,
        )
        .bind(reminder.candidate_id.inner_ref())
        .bind(reminder.stage.as_str())
        .bind(reminder.sent_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert sent reminder: {:?}. DB returned error: {:?}",
                reminder, e
            );
            e
        })?;
        Ok(res.rows_affected() == 1)
    }

    async fn find(&self, candidate_id: &ID, stage: ReminderStage) -> Option<SentReminder> {
        sqlx::query_as::<_, SentReminderRaw>(
            r#"
            SELECT * FROM sent_reminders AS s
            WHERE s.candidate_uid = $1 AND s.stage = $2
            "#,
        )
        .bind(candidate_id.inner_ref())
        .bind(stage.as_str())
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
        .and_then(|r| r.into_domain())
    }
}
