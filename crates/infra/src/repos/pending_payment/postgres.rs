use super::IPendingPaymentRepo;
use carebook_domain::{PaymentStatus, PendingPayment, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresPendingPaymentRepo {
    pool: PgPool,
}

impl PostgresPendingPaymentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PendingPaymentRaw {
    payment_uid: Uuid,
    booking_uid: Uuid,
    patient_uid: Uuid,
    created_at: i64,
    status: String,
}

impl From<PendingPaymentRaw> for PendingPayment {
    fn from(e: PendingPaymentRaw) -> Self {
        Self {
            id: e.payment_uid.into(),
            booking_id: e.booking_uid.into(),
            patient_id: e.patient_uid.into(),
            created_at: e.created_at,
            status: e.status.parse().unwrap_or(PaymentStatus::Expired),
        }
    }
}

#[async_trait::async_trait]
impl IPendingPaymentRepo for PostgresPendingPaymentRepo {
    async fn insert(&self, payment: &PendingPayment) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO pending_payments
            (payment_uid, booking_uid, patient_uid, created_at, status)
            VALUES($1, $2, $3, $4, $5)
            "#,
        )
        .bind(payment.id.inner_ref())
        .bind(payment.booking_id.inner_ref())
        .bind(payment.patient_id.inner_ref())
        .bind(payment.created_at)
        .bind(payment.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert pending payment: {:?}. DB returned error: {:?}",
                payment, e
            );
            e
        })?;
        Ok(())
    }

    async fn find_pending_created_before(&self, before: i64) -> Vec<PendingPayment> {
        sqlx::query_as::<_, PendingPaymentRaw>(
            r#"
            SELECT * FROM pending_payments AS p
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

    async fn mark_paid(&self, payment_id: &ID) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE pending_payments
            SET status = 'paid'
            WHERE payment_uid = $1
            "#,
        )
        .bind(payment_id.inner_ref())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
