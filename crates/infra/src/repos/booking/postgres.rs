use super::IBookingRepo;
use carebook_domain::{Booking, BookingStatus};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct BookingRaw {
    booking_uid: Uuid,
    patient_uid: Uuid,
    expert_uid: Uuid,
    start_ts: i64,
    status: String,
}

impl From<BookingRaw> for Booking {
    fn from(e: BookingRaw) -> Self {
        Self {
            id: e.booking_uid.into(),
            patient_id: e.patient_uid.into(),
            expert_id: e.expert_uid.into(),
            start_ts: e.start_ts,
            status: e.status.parse().unwrap_or(BookingStatus::Cancelled),
        }
    }
}

#[async_trait::async_trait]
impl IBookingRepo for PostgresBookingRepo {
    async fn insert(&self, booking: &Booking) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO bookings
            (booking_uid, patient_uid, expert_uid, start_ts, status)
            VALUES($1, $2, $3, $4, $5)
            "#,
        )
        .bind(booking.id.inner_ref())
        .bind(booking.patient_id.inner_ref())
        .bind(booking.expert_id.inner_ref())
        .bind(booking.start_ts)
        .bind(booking.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert booking: {:?}. DB returned error: {:?}",
                booking, e
            );
            e
        })?;
        Ok(())
    }

    async fn find_confirmed_in_window(&self, from: i64, until: i64) -> Vec<Booking> {
        sqlx::query_as::<_, BookingRaw>(
            r#"
            SELECT * FROM bookings AS b
            WHERE b.status = 'confirmed' AND b.start_ts >= $1 AND b.start_ts <= $2
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|b| b.into())
        .collect()
    }
}
