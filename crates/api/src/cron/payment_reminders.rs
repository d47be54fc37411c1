use crate::error::ApiError;
use crate::shared::auth::protect_cron_route;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use carebook_api_structs::dispatch_payment_reminders::APIResponse;
use carebook_api_structs::dtos::DispatchPayload;
use carebook_domain::{ReminderStage, SentReminder, DAY_MILLIS};
use carebook_infra::{CarebookContext, ReminderNotification};
use tracing::warn;

pub async fn dispatch_payment_reminders_controller(
    http_req: HttpRequest,
    body: web::Json<DispatchPayload>,
    ctx: web::Data<CarebookContext>,
) -> Result<HttpResponse, ApiError> {
    protect_cron_route(&http_req, &ctx.config)?;
    match body.into_inner() {
        DispatchPayload::PaymentReminders {} => (),
        other => {
            return Err(ApiError::BadClientData(format!(
                "Payload is tagged for another job: {:?}",
                other
            )))
        }
    }

    let usecase = SendPaymentRemindersUseCase {};

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
                "{} payment reminder deliveries failed",
                count
            )),
        })
}

/// Staged reminders for payments the patient has not completed: a gentle
/// nudge once the payment is 3 days old and an urgent one at 6 days. The
/// stages are gated independently, each at most once per payment.
#[derive(Debug)]
pub struct SendPaymentRemindersUseCase {}

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

const STAGES: [ReminderStage; 2] = [ReminderStage::PaymentGentle, ReminderStage::PaymentUrgent];

#[async_trait::async_trait(?Send)]
impl UseCase for SendPaymentRemindersUseCase {
    type Response = UseCaseRes;
    type Errors = UseCaseError;

    async fn execute(&mut self, ctx: &CarebookContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_timestamp_millis();
        let payments = ctx
            .repos
            .pending_payments
            .find_pending_created_before(now - 3 * DAY_MILLIS)
            .await;

        let mut res = UseCaseRes {
            processed: 0,
            sent: 0,
            skipped: 0,
        };
        let mut failed = 0;

        for payment in payments {
            for stage in STAGES.iter().copied() {
                if !stage.is_eligible(payment.created_at, now) {
                    continue;
                }
                res.processed += 1;

                let marker = SentReminder {
                    candidate_id: payment.id.clone(),
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
                    res.skipped += 1;
                    continue;
                }

                let notification = ReminderNotification {
                    candidate_id: payment.id.clone(),
                    recipient_id: payment.patient_id.clone(),
                    stage,
                };
                match ctx.notifier.send(&notification).await {
                    Ok(_) => res.sent += 1,
                    Err(e) => {
                        warn!(
                            "Unable to deliver {} reminder for payment {}: {:?}",
                            stage, payment.id, e
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::setup_at;
    use carebook_domain::{PaymentStatus, PendingPayment, ID};

    const NOW: i64 = 1_700_000_000_000;

    fn payment_created_days_ago(days: i64) -> PendingPayment {
        PendingPayment {
            id: ID::new(),
            booking_id: ID::new(),
            patient_id: ID::new(),
            created_at: NOW - days * DAY_MILLIS,
            status: PaymentStatus::Pending,
        }
    }

    #[actix_web::test]
    async fn no_reminder_before_day_three() {
        let setup = setup_at(NOW);
        let payment = payment_created_days_ago(2);
        setup
            .ctx
            .repos
            .pending_payments
            .insert(&payment)
            .await
            .unwrap();

        let res = execute(SendPaymentRemindersUseCase {}, &setup.ctx)
            .await
            .unwrap();
        assert_eq!(res.processed, 0);
        assert_eq!(setup.notifier.sent_count(), 0);
    }

    #[actix_web::test]
    async fn gentle_reminder_fires_once_from_day_three() {
        let setup = setup_at(NOW);
        let payment = payment_created_days_ago(3);
        setup
            .ctx
            .repos
            .pending_payments
            .insert(&payment)
            .await
            .unwrap();

        let res = execute(SendPaymentRemindersUseCase {}, &setup.ctx)
            .await
            .unwrap();
        assert_eq!(res.sent, 1);
        let sent = setup.notifier.sent.lock().unwrap();
        assert_eq!(sent[0].stage, ReminderStage::PaymentGentle);
        drop(sent);

        let res = execute(SendPaymentRemindersUseCase {}, &setup.ctx)
            .await
            .unwrap();
        assert_eq!(res.sent, 0);
        assert_eq!(res.skipped, 1);
        assert_eq!(setup.notifier.sent_count(), 1);
    }

    #[actix_web::test]
    async fn urgent_stage_is_gated_independently() {
        let setup = setup_at(NOW);
        let payment = payment_created_days_ago(6);
        setup
            .ctx
            .repos
            .pending_payments
            .insert(&payment)
            .await
            .unwrap();

        // Both stages are now due; the gentle one was never sent
        let res = execute(SendPaymentRemindersUseCase {}, &setup.ctx)
            .await
            .unwrap();
        assert_eq!(res.sent, 2);

        let sent = setup.notifier.sent.lock().unwrap();
        let stages: Vec<_> = sent.iter().map(|n| n.stage).collect();
        assert!(stages.contains(&ReminderStage::PaymentGentle));
        assert!(stages.contains(&ReminderStage::PaymentUrgent));
    }

    #[actix_web::test]
    async fn paid_payments_get_no_reminders() {
        let setup = setup_at(NOW);
        let mut payment = payment_created_days_ago(4);
        payment.status = PaymentStatus::Paid;
        setup
            .ctx
            .repos
            .pending_payments
            .insert(&payment)
            .await
            .unwrap();

        let res = execute(SendPaymentRemindersUseCase {}, &setup.ctx)
            .await
            .unwrap();
        assert_eq!(res.processed, 0);
        assert_eq!(setup.notifier.sent_count(), 0);
    }
}
