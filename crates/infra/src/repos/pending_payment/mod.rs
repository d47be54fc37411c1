mod inmemory;
mod postgres;

pub use inmemory::InMemoryPendingPaymentRepo;
pub use postgres::PostgresPendingPaymentRepo;

use carebook_domain::{PendingPayment, ID};

#[async_trait::async_trait]
pub trait IPendingPaymentRepo: Send + Sync {
    async fn insert(&self, payment: &PendingPayment) -> anyhow::Result<()>;
    /// Payments still pending that were created at or before `before`
    async fn find_pending_created_before(&self, before: i64) -> Vec<PendingPayment>;
    async fn mark_paid(&self, payment_id: &ID) -> anyhow::Result<()>;
}
