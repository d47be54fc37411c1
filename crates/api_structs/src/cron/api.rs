use serde::{Deserialize, Serialize};

pub mod dispatch_appointment_reminders {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        /// Eligible (booking, stage) pairs evaluated this invocation
        pub processed: usize,
        pub sent: usize,
        /// Pairs whose marker already existed (idempotent no-ops)
        pub skipped: usize,
    }
}

pub mod dispatch_payment_reminders {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub processed: usize,
        pub sent: usize,
        pub skipped: usize,
    }
}

pub mod dispatch_payout_transfers {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub processed: usize,
        pub transferred: usize,
        pub skipped: usize,
    }
}
