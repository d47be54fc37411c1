mod inmemory;
mod postgres;

pub use inmemory::InMemoryPayoutTransferRepo;
pub use postgres::PostgresPayoutTransferRepo;

use carebook_domain::{PayoutTransferRecord, ID};

/// The single source of truth for "has this payout already happened".
///
/// `insert` is the claim a dispatch invocation takes before calling the
/// payment provider: two overlapping invocations for the same payout must
/// see exactly one `true`. The provider reference is filled in with
/// `set_reference` once the transfer is confirmed, and a claim whose
/// provider call failed is released with `delete` so the next invocation
/// can retry.
#[async_trait::async_trait]
pub trait IPayoutTransferRepo: Send + Sync {
    /// Returns `false` when a transfer record for the payout already exists
    async fn insert(&self, record: &PayoutTransferRecord) -> anyhow::Result<bool>;
    async fn set_reference(&self, payout_id: &ID, reference: &str) -> anyhow::Result<()>;
    async fn delete(&self, payout_id: &ID) -> anyhow::Result<()>;
    async fn find(&self, payout_id: &ID) -> Option<PayoutTransferRecord>;
}
