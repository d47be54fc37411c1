mod booking;
mod cadence;
mod payment;
mod payout;
mod registry;
mod reminder;
mod scheduled_job;
mod shared;

pub use booking::{Booking, BookingStatus};
pub use cadence::{Cadence, CronExpression, Interval, InvalidCadenceError};
pub use payment::{PaymentStatus, PendingPayment};
pub use payout::{Payout, PayoutStatus, PayoutTransferRecord};
pub use registry::{RegistryError, ScheduleRegistry};
pub use reminder::{ReminderStage, ReminderState, SentReminder, DAY_MILLIS, HOUR_MILLIS};
pub use scheduled_job::{JobPriority, ScheduledJob};
pub use shared::entity::{Entity, InvalidIDError, ID};
