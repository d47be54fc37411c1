use super::IPayoutRepo;
use carebook_domain::{Payout, PayoutStatus, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresPayoutRepo {
    pool: PgPool,
}

impl PostgresPayoutRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PayoutRaw {
    payout_uid: Uuid,
    expert_account_uid: Uuid,
    amount: i64,
    currency: String,
    created_at: i64,
    status: String,
}

impl From<PayoutRaw> for Payout {
    fn from(e: PayoutRaw) -> Self {
        Self {
            id: e.payout_uid.into(),
            expert_account_id: e.expert_account_uid.into(),
            amount: e.amount,
            currency: e.currency,
            created_at: e.created_at,
            status: e.status.parse().unwrap_or(PayoutStatus::Failed),
        }
    }
}

#[async_trait::async_trait]
impl IPayoutRepo for PostgresPayoutRepo {
    async fn insert(&self, payout: &Payout) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payouts
            (payout_uid, expert_account_uid, amount, currency, created_at, status)
            VALUES($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(payout.id.inner_ref())
        .bind(payout.expert_account_id.inner_ref())
        .bind(payout.amount)
        .bind(&payout.currency)
        .bind(payout.created_at)
        .bind(payout.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert payout: {:?}. DB returned error: {:?}",
                payout, e
            );
            e
        })?;
        Ok(())
    }

    async fn find_pending_created_before(&self, before: i64) -> Vec<Payout> {
        sqlx::query_as::<_, PayoutRaw>(
            r#"
            SELECT * FROM payouts AS p
            WHERE p.status = 'pending' AND p.created_at <= $1
            "#,
        )
        .bind(before)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|p| p.into())
        .collect()
    }

    async fn mark_transferred(&self, payout_id: &ID) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE payouts
            SET status = 'transferred'
            WHERE payout_uid = $1
            "#,
        )
        .bind(payout_id.inner_ref())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
