mod inmemory;
mod postgres;

pub use inmemory::InMemoryPayoutRepo;
pub use postgres::PostgresPayoutRepo;

use carebook_domain::{Payout, ID};

#[async_trait::async_trait]
pub trait IPayoutRepo: Send + Sync {
    async fn insert(&self, payout: &Payout) -> anyhow::Result<()>;
    /// Pending payouts created at or before `before` (the aging cutoff)
    async fn find_pending_created_before(&self, before: i64) -> Vec<Payout>;
    async fn mark_transferred(&self, payout_id: &ID) -> anyhow::Result<()>;
}
