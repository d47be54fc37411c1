use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    Pending,
    Transferred,
    Failed,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Transferred => "transferred",
            PayoutStatus::Failed => "failed",
        }
    }
}

impl FromStr for PayoutStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PayoutStatus::Pending),
            "transferred" => Ok(PayoutStatus::Transferred),
            "failed" => Ok(PayoutStatus::Failed),
            _ => Err(format!("Invalid payout status: {}", s)),
        }
    }
}

/// Money owed to an expert for completed appointments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub id: ID,
    pub expert_account_id: ID,
    /// Amount in the smallest currency unit
    pub amount: i64,
    pub currency: String,
    /// Creation time in unix millis. Transfers are gated on an aging
    /// window measured from this timestamp.
    pub created_at: i64,
    pub status: PayoutStatus,
}

impl Entity<ID> for Payout {
    fn id(&self) -> ID {
        self.id.clone()
    }
}

/// The authoritative record that a transfer was initiated for a `Payout`.
///
/// Dispatch targets insert this record before calling the payment
/// provider, so a retried or concurrently redelivered cron invocation
/// never produces a second transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutTransferRecord {
    pub payout_id: ID,
    /// Reference returned by the payment provider, absent while the
    /// transfer is still in flight
    pub transfer_reference: Option<String>,
    pub created_at: i64,
}
