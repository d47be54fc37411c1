use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Expired,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Expired => "expired",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "expired" => Ok(PaymentStatus::Expired),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

/// A payment that the patient has started but not yet completed, e.g. an
/// awaiting Multibanco reference. Reminder stages are anchored on
/// `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPayment {
    pub id: ID,
    pub booking_id: ID,
    /// Patient who owes the payment and receives the reminders
    pub patient_id: ID,
    /// Creation time in unix millis
    pub created_at: i64,
    pub status: PaymentStatus,
}

impl Entity<ID> for PendingPayment {
    fn id(&self) -> ID {
        self.id.clone()
    }
}
