use super::IPayoutTransferRepo;
use carebook_domain::{PayoutTransferRecord, ID};
use std::sync::Mutex;

pub struct InMemoryPayoutTransferRepo {
    records: Mutex<Vec<PayoutTransferRecord>>,
}

impl InMemoryPayoutTransferRepo {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryPayoutTransferRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IPayoutTransferRepo for InMemoryPayoutTransferRepo {
    async fn insert(&self, record: &PayoutTransferRecord) -> anyhow::Result<bool> {
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.payout_id == record.payout_id) {
            return Ok(false);
        }
        records.push(record.clone());
        Ok(true)
    }

    async fn set_reference(&self, payout_id: &ID, reference: &str) -> anyhow::Result<()> {
        let mut records = self.records.lock().unwrap();
        for r in records.iter_mut() {
            if &r.payout_id == payout_id {
                r.transfer_reference = Some(reference.to_string());
            }
        }
        Ok(())
    }

    async fn delete(&self, payout_id: &ID) -> anyhow::Result<()> {
        let mut records = self.records.lock().unwrap();
        records.retain(|r| &r.payout_id != payout_id);
        Ok(())
    }

    async fn find(&self, payout_id: &ID) -> Option<PayoutTransferRecord> {
        let records = self.records.lock().unwrap();
        records.iter().find(|r| &r.payout_id == payout_id).cloned()
    }
}
