use crate::shared::entity::ID;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

pub const HOUR_MILLIS: i64 = 1000 * 60 * 60;
pub const DAY_MILLIS: i64 = HOUR_MILLIS * 24;

/// A named point in a reminder sequence. Each stage fires at most once per
/// underlying booking or payment.
///
/// Appointment stages are anchored on the appointment start timestamp,
/// payment stages on the pending payment's creation timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReminderStage {
    Appointment24h,
    Appointment1h,
    PaymentGentle,
    PaymentUrgent,
}

impl ReminderStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderStage::Appointment24h => "appointment24h",
            ReminderStage::Appointment1h => "appointment1h",
            ReminderStage::PaymentGentle => "paymentGentle",
            ReminderStage::PaymentUrgent => "paymentUrgent",
        }
    }

    /// Whether the trigger condition for this stage has been met at `now`,
    /// given the candidate's anchor timestamp. This says nothing about
    /// whether the stage was already sent.
    pub fn is_eligible(&self, anchor_ts: i64, now: i64) -> bool {
        match self {
            // Appointment reminders stop making sense once the
            // appointment has started
            ReminderStage::Appointment24h => {
                now >= anchor_ts - 24 * HOUR_MILLIS && now < anchor_ts
            }
            ReminderStage::Appointment1h => now >= anchor_ts - HOUR_MILLIS && now < anchor_ts,
            ReminderStage::PaymentGentle => now >= anchor_ts + 3 * DAY_MILLIS,
            ReminderStage::PaymentUrgent => now >= anchor_ts + 6 * DAY_MILLIS,
        }
    }
}

impl Display for ReminderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReminderStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "appointment24h" => Ok(ReminderStage::Appointment24h),
            "appointment1h" => Ok(ReminderStage::Appointment1h),
            "paymentGentle" => Ok(ReminderStage::PaymentGentle),
            "paymentUrgent" => Ok(ReminderStage::PaymentUrgent),
            _ => Err(format!("Invalid reminder stage: {}", s)),
        }
    }
}

/// Where a (candidate, stage) pair is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderState {
    Pending,
    Eligible,
    Sent,
}

impl ReminderStage {
    pub fn state(&self, anchor_ts: i64, now: i64, already_sent: bool) -> ReminderState {
        if already_sent {
            ReminderState::Sent
        } else if self.is_eligible(anchor_ts, now) {
            ReminderState::Eligible
        } else {
            ReminderState::Pending
        }
    }
}

/// The persisted at-most-once marker for a (candidate, stage) pair.
/// Inserting this marker is how a dispatch target claims the right to send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentReminder {
    /// Booking or pending payment id, depending on the stage
    pub candidate_id: ID,
    pub stage: ReminderStage,
    pub sent_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn appointment_24h_window() {
        let start = T0 + 30 * HOUR_MILLIS;
        let stage = ReminderStage::Appointment24h;
        assert!(!stage.is_eligible(start, start - 24 * HOUR_MILLIS - 1));
        assert!(stage.is_eligible(start, start - 24 * HOUR_MILLIS));
        assert!(stage.is_eligible(start, start - 1));
        assert!(!stage.is_eligible(start, start));
    }

    #[test]
    fn appointment_1h_window() {
        let start = T0;
        let stage = ReminderStage::Appointment1h;
        assert!(!stage.is_eligible(start, start - HOUR_MILLIS - 1));
        assert!(stage.is_eligible(start, start - HOUR_MILLIS));
        assert!(stage.is_eligible(start, start - 1));
        assert!(!stage.is_eligible(start, start + 1));
    }

    #[test]
    fn payment_stages_fire_on_elapsed_day_boundaries() {
        let created = T0;
        let gentle = ReminderStage::PaymentGentle;
        let urgent = ReminderStage::PaymentUrgent;

        assert!(!gentle.is_eligible(created, created + 3 * DAY_MILLIS - 1));
        assert!(gentle.is_eligible(created, created + 3 * DAY_MILLIS));

        // The urgent stage is gated independently of the gentle one
        assert!(!urgent.is_eligible(created, created + 3 * DAY_MILLIS));
        assert!(!urgent.is_eligible(created, created + 6 * DAY_MILLIS - 1));
        assert!(urgent.is_eligible(created, created + 6 * DAY_MILLIS));
    }

    #[test]
    fn state_machine_is_pending_then_eligible_then_sent() {
        let created = T0;
        let stage = ReminderStage::PaymentGentle;

        let before = created + DAY_MILLIS;
        let after = created + 4 * DAY_MILLIS;
        assert_eq!(stage.state(created, before, false), ReminderState::Pending);
        assert_eq!(stage.state(created, after, false), ReminderState::Eligible);
        assert_eq!(stage.state(created, after, true), ReminderState::Sent);
    }

    #[test]
    fn stage_round_trips_through_str() {
        for stage in [
            ReminderStage::Appointment24h,
            ReminderStage::Appointment1h,
            ReminderStage::PaymentGentle,
            ReminderStage::PaymentUrgent,
        ]
        .iter()
        {
            assert_eq!(stage.as_str().parse::<ReminderStage>().unwrap(), *stage);
        }
    }
}
