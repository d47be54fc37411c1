use serde::{Deserialize, Serialize};

/// The body the external scheduler posts to a dispatch target.
///
/// Tagged by job name so that a payload meant for one job cannot be
/// processed by another: the wrong tag fails validation at the endpoint
/// boundary instead of producing missing fields downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "job", rename_all = "camelCase")]
pub enum DispatchPayload {
    AppointmentReminders {},
    PaymentReminders {},
    PayoutTransfers {},
}
