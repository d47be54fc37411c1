use super::IPayoutTransferRepo;
use carebook_domain::{PayoutTransferRecord, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresPayoutTransferRepo {
    pool: PgPool,
}

impl PostgresPayoutTransferRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PayoutTransferRaw {
    payout_uid: Uuid,
    transfer_reference: Option<String>,
    created_at: i64,
}

impl From<PayoutTransferRaw> for PayoutTransferRecord {
    fn from(e: PayoutTransferRaw) -> Self {
        Self {
            payout_id: e.payout_uid.into(),
            transfer_reference: e.transfer_reference,
            created_at: e.created_at,
        }
    }
}

#[async_trait::async_trait]
impl IPayoutTransferRepo for PostgresPayoutTransferRepo {
    async fn insert(&self, record: &PayoutTransferRecord) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO payout_transfers
            (payout_uid, transfer_reference, created_at)
            VALUES($1, $2, $3)
            ON CONFLICT (payout_uid) DO NOTHING
            "#,
        )
        .bind(record.payout_id.inner_ref())
        .bind(record.transfer_reference.as_deref())
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert payout transfer record: {:?}. DB returned error: {:?}",
                record, e
            );
            e
        })?;
        Ok(res.rows_affected() == 1)
    }

    async fn set_reference(&self, payout_id: &ID, reference: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE payout_transfers
            SET transfer_reference = $2
            WHERE payout_uid = $1
            "#,
        )
        .bind(payout_id.inner_ref())
        .bind(reference)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, payout_id: &ID) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            DELETE FROM payout_transfers
            WHERE payout_uid = $1
            "#,
        )
        .bind(payout_id.inner_ref())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, payout_id: &ID) -> Option<PayoutTransferRecord> {
        sqlx::query_as::<_, PayoutTransferRaw>(
            r#"
            SELECT * FROM payout_transfers AS t
            WHERE t.payout_uid = $1
            "#,
        )
        .bind(payout_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
        .map(|t| t.into())
    }
}
