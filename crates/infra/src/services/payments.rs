use carebook_domain::{Payout, ID};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub payout_id: ID,
    pub destination_account: ID,
    pub amount: i64,
    pub currency: String,
}

impl TransferRequest {
    pub fn from_payout(payout: &Payout) -> Self {
        Self {
            payout_id: payout.id.clone(),
            destination_account: payout.expert_account_id.clone(),
            amount: payout.amount,
            currency: payout.currency.clone(),
        }
    }
}

/// Seam to the payment provider. `create_transfer` must be idempotent on
/// the provider side for a given idempotency key, which is what makes
/// concurrent payout dispatches safe.
#[async_trait::async_trait]
pub trait IPaymentProvider: Send + Sync {
    /// Returns the provider's transfer reference
    async fn create_transfer(
        &self,
        request: &TransferRequest,
        idempotency_key: &str,
    ) -> anyhow::Result<String>;
}

pub struct HttpPaymentProvider {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl HttpPaymentProvider {
    pub fn new(url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            api_key,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct TransferResponse {
    id: String,
}

#[async_trait::async_trait]
impl IPaymentProvider for HttpPaymentProvider {
    async fn create_transfer(
        &self,
        request: &TransferRequest,
        idempotency_key: &str,
    ) -> anyhow::Result<String> {
        let res = self
            .http
            .post(format!("{}/transfers", self.url))
            .bearer_auth(&self.api_key)
            .header("Idempotency-Key", idempotency_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Error reaching payment provider: {:?}", e);
                e
            })?;
        if !res.status().is_success() {
            anyhow::bail!("Payment provider returned status code: {}", res.status());
        }
        let transfer: TransferResponse = res.json().await?;
        Ok(transfer.id)
    }
}

/// Payment provider that records transfers instead of executing them, for
/// tests
pub struct RecordingPaymentProvider {
    pub transfers: Mutex<Vec<(TransferRequest, String)>>,
    pub fail_next: AtomicBool,
}

impl RecordingPaymentProvider {
    pub fn new() -> Self {
        Self {
            transfers: Mutex::new(Vec::new()),
            fail_next: AtomicBool::new(false),
        }
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.lock().unwrap().len()
    }
}

impl Default for RecordingPaymentProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IPaymentProvider for RecordingPaymentProvider {
    async fn create_transfer(
        &self,
        request: &TransferRequest,
        idempotency_key: &str,
    ) -> anyhow::Result<String> {
        if self.fail_next.load(Ordering::SeqCst) {
            anyhow::bail!("payment provider set to fail");
        }
        let reference = format!("tr_{}", request.payout_id);
        self.transfers
            .lock()
            .unwrap()
            .push((request.clone(), idempotency_key.to_string()));
        Ok(reference)
    }
}
