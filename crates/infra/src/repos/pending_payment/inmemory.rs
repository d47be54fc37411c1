use super::IPendingPaymentRepo;
use carebook_domain::{PaymentStatus, PendingPayment, ID};
use std::sync::Mutex;

pub struct InMemoryPendingPaymentRepo {
    payments: Mutex<Vec<PendingPayment>>,
}

impl InMemoryPendingPaymentRepo {
    pub fn new() -> Self {
        Self {
            payments: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryPendingPaymentRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IPendingPaymentRepo for InMemoryPendingPaymentRepo {
    async fn insert(&self, payment: &PendingPayment) -> anyhow::Result<()> {
        let mut payments = self.payments.lock().unwrap();
        payments.push(payment.clone());
        Ok(())
    }

    async fn find_pending_created_before(&self, before: i64) -> Vec<PendingPayment> {
        let payments = self.payments.lock().unwrap();
        payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Pending && p.created_at <= before)
            .cloned()
            .collect()
    }

    async fn mark_paid(&self, payment_id: &ID) -> anyhow::Result<()> {
        let mut payments = self.payments.lock().unwrap();
        for p in payments.iter_mut() {
            if &p.id == payment_id {
                p.status = PaymentStatus::Paid;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn paid_payments_drop_out_of_the_pending_set() {
        let repo = InMemoryPendingPaymentRepo::new();
        let payment = PendingPayment {
            id: ID::new(),
            booking_id: ID::new(),
            patient_id: ID::new(),
            created_at: 100,
            status: PaymentStatus::Pending,
        };
        repo.insert(&payment).await.unwrap();
        assert_eq!(repo.find_pending_created_before(100).await.len(), 1);

        repo.mark_paid(&payment.id).await.unwrap();
        assert!(repo.find_pending_created_before(100).await.is_empty());
    }
}
