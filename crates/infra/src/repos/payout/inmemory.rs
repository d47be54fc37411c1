use super::IPayoutRepo;
use carebook_domain::{Payout, PayoutStatus, ID};
use std::sync::Mutex;

pub struct InMemoryPayoutRepo {
    payouts: Mutex<Vec<Payout>>,
}

impl InMemoryPayoutRepo {
    pub fn new() -> Self {
        Self {
            payouts: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryPayoutRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IPayoutRepo for InMemoryPayoutRepo {
    async fn insert(&self, payout: &Payout) -> anyhow::Result<()> {
        let mut payouts = self.payouts.lock().unwrap();
        payouts.push(payout.clone());
        Ok(())
    }

    async fn find_pending_created_before(&self, before: i64) -> Vec<Payout> {
        let payouts = self.payouts.lock().unwrap();
        payouts
            .iter()
            .filter(|p| p.status == PayoutStatus::Pending && p.created_at <= before)
            .cloned()
            .collect()
    }

    async fn mark_transferred(&self, payout_id: &ID) -> anyhow::Result<()> {
        let mut payouts = self.payouts.lock().unwrap();
        for p in payouts.iter_mut() {
            if &p.id == payout_id {
                p.status = PayoutStatus::Transferred;
            }
        }
        Ok(())
    }
}
