use crate::error::ApiError;
use crate::shared::auth::protect_cron_route;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use carebook_api_structs::dispatch_appointment_reminders::APIResponse;
use carebook_api_structs::dtos::DispatchPayload;
use carebook_domain::{ReminderStage, SentReminder, HOUR_MILLIS};
use carebook_infra::{CarebookContext, ReminderNotification};
use tracing::warn;

pub async fn dispatch_appointment_reminders_controller(
    http_req: HttpRequest,
    body: web::Json<DispatchPayload>,
    ctx: web::Data<CarebookContext>,
) -> Result<HttpResponse, ApiError> {
    protect_cron_route(&http_req, &ctx.config)?;
    match body.into_inner() {
        DispatchPayload::AppointmentReminders {} => (),
        other => {
            return Err(ApiError::BadClientData(format!(
                "Payload is tagged for another job: {:?}",
                other
            )))
        }
    }

    let usecase = SendAppointmentRemindersUseCase {};

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse {
                processed: res.processed,
                sent: res.sent,
                skipped: res.skipped,
            })
        })
        .map_err(|e| match e {
            UseCaseError::DeliveryFailures(count) => ApiError::ServiceUnavailable(format!(
                "{} appointment reminder deliveries failed",
                count
            )),
        })
}

/// Sends the 24-hour and 1-hour reminders for confirmed bookings that are
/// about to start.
///
/// Safe under duplicate and concurrent invocation: the sent-reminder
/// marker insert is the claim, and a lost claim is a silent no-op.
#[derive(Debug)]
pub struct SendAppointmentRemindersUseCase {}

#[derive(Debug)]
pub enum UseCaseError {
    DeliveryFailures(usize),
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub processed: usize,
    pub sent: usize,
    pub skipped: usize,
}

const STAGES: [ReminderStage; 2] = [ReminderStage::Appointment24h, ReminderStage::Appointment1h];

#[async_trait::async_trait(?Send)]
impl UseCase for SendAppointmentRemindersUseCase {
    type Response = UseCaseRes;
    type Errors = UseCaseError;

    async fn execute(&mut self, ctx: &CarebookContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_timestamp_millis();
        let bookings = ctx
            .repos
            .bookings
            .find_confirmed_in_window(now, now + 24 * HOUR_MILLIS)
            .await;

        let mut res = UseCaseRes {
            processed: 0,
            sent: 0,
            skipped: 0,
        };
        let mut failed = 0;

        for booking in bookings {
            for stage in STAGES.iter().copied() {
                if !stage.is_eligible(booking.start_ts, now) {
                    continue;
                }
                res.processed += 1;

                let marker = SentReminder {
                    candidate_id: booking.id.clone(),
                    stage,
                    sent_at: now,
                };
                let claimed = match ctx.repos.sent_reminders.insert(&marker).await {
                    Ok(claimed) => claimed,
                    Err(_) => {
                        failed += 1;
                        continue;
                    }
                };
                if !claimed {
                    // Already sent by an earlier or concurrent invocation
                    res.skipped += 1;
                    continue;
                }

                let notification = ReminderNotification {
                    candidate_id: booking.id.clone(),
                    recipient_id: booking.patient_id.clone(),
                    stage,
                };
                match ctx.notifier.send(&notification).await {
                    Ok(_) => res.sent += 1,
                    Err(e) => {
                        warn!(
                            "Unable to deliver {} reminder for booking {}: {:?}",
                            stage, booking.id, e
                        );
                        failed += 1;
                    }
                }
            }
        }

        if failed > 0 {
            return Err(UseCaseError::DeliveryFailures(failed));
        }
        Ok(res)
    }
}
