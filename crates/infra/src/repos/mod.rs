mod booking;
mod payout;
mod payout_transfer;
mod pending_payment;
mod sent_reminder;

pub use booking::IBookingRepo;
pub use payout::IPayoutRepo;
pub use payout_transfer::IPayoutTransferRepo;
pub use pending_payment::IPendingPaymentRepo;
pub use sent_reminder::ISentReminderRepo;

use booking::{InMemoryBookingRepo, PostgresBookingRepo};
use payout::{InMemoryPayoutRepo, PostgresPayoutRepo};
use payout_transfer::{InMemoryPayoutTransferRepo, PostgresPayoutTransferRepo};
use pending_payment::{InMemoryPendingPaymentRepo, PostgresPendingPaymentRepo};
use sent_reminder::{InMemorySentReminderRepo, PostgresSentReminderRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub bookings: Arc<dyn IBookingRepo>,
    pub pending_payments: Arc<dyn IPendingPaymentRepo>,
    pub sent_reminders: Arc<dyn ISentReminderRepo>,
    pub payouts: Arc<dyn IPayoutRepo>,
    pub payout_transfers: Arc<dyn IPayoutTransferRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self {
            bookings: Arc::new(PostgresBookingRepo::new(pool.clone())),
            pending_payments: Arc::new(PostgresPendingPaymentRepo::new(pool.clone())),
            sent_reminders: Arc::new(PostgresSentReminderRepo::new(pool.clone())),
            payouts: Arc::new(PostgresPayoutRepo::new(pool.clone())),
            payout_transfers: Arc::new(PostgresPayoutTransferRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            bookings: Arc::new(InMemoryBookingRepo::new()),
            pending_payments: Arc::new(InMemoryPendingPaymentRepo::new()),
            sent_reminders: Arc::new(InMemorySentReminderRepo::new()),
            payouts: Arc::new(InMemoryPayoutRepo::new()),
            payout_transfers: Arc::new(InMemoryPayoutTransferRepo::new()),
        }
    }
}
