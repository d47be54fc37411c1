use crate::error::ApiError;
use crate::shared::auth::protect_cron_route;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use carebook_api_structs::dispatch_payout_transfers::APIResponse;
use carebook_api_structs::dtos::DispatchPayload;
use carebook_domain::{PayoutTransferRecord, DAY_MILLIS};
use carebook_infra::{CarebookContext, TransferRequest};
use tracing::{error, warn};

/// Payouts must age this long before the money moves, so that refunds and
/// disputes can still void them cheaply
const PAYOUT_AGING_MILLIS: i64 = DAY_MILLIS;

pub async fn dispatch_payout_transfers_controller(
    http_req: HttpRequest,
    body: web::Json<DispatchPayload>,
    ctx: web::Data<CarebookContext>,
) -> Result<HttpResponse, ApiError> {
    protect_cron_route(&http_req, &ctx.config)?;
    match body.into_inner() {
        DispatchPayload::PayoutTransfers {} => (),
        other => {
            return Err(ApiError::BadClientData(format!(
                "Payload is tagged for another job: {:?}",
                other
            )))
        }
    }

    let usecase = ProcessPayoutTransfersUseCase {};

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse {
                processed: res.processed,
                transferred: res.transferred,
                skipped: res.skipped,
            })
        })
        .map_err(|e| match e {
            UseCaseError::ProviderFailures(count) => {
                ApiError::ServiceUnavailable(format!("{} payout transfers failed", count))
            }
        })
}

/// Moves aged pending payouts to the experts' accounts.
///
/// The `PayoutTransferRecord` is claimed before the provider is called,
/// so overlapping invocations serialize on the conditional insert. A
/// failed provider call releases the claim for the next invocation; the
/// payout id rides along as idempotency key so even a retry after an
/// ambiguous provider failure cannot pay twice.
#[derive(Debug)]
pub struct ProcessPayoutTransfersUseCase {}

#[derive(Debug)]
pub enum UseCaseError {
    ProviderFailures(usize),
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub processed: usize,
    pub transferred: usize,
    pub skipped: usize,
}

#[async_trait::async_trait(?Send)]
impl UseCase for ProcessPayoutTransfersUseCase {
    type Response = UseCaseRes;
    type Errors = UseCaseError;

    async fn execute(&mut self, ctx: &CarebookContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_timestamp_millis();
        let payouts = ctx
            .repos
            .payouts
            .find_pending_created_before(now - PAYOUT_AGING_MILLIS)
            .await;

        let mut res = UseCaseRes {
            processed: 0,
            transferred: 0,
            skipped: 0,
        };
        let mut failed = 0;

        for payout in payouts {
            res.processed += 1;

            let claim = PayoutTransferRecord {
                payout_id: payout.id.clone(),
                transfer_reference: None,
                created_at: now,
            };
            let claimed = match ctx.repos.payout_transfers.insert(&claim).await {
                Ok(claimed) => claimed,
                Err(_) => {
                    failed += 1;
                    continue;
                }
            };
            if !claimed {
                // Already paid out, or a concurrent invocation holds the
                // claim
                res.skipped += 1;
                continue;
            }

            let request = TransferRequest::from_payout(&payout);
            let idempotency_key = payout.id.as_string();
            let reference = match ctx.payments.create_transfer(&request, &idempotency_key).await
            {
                Ok(reference) => reference,
                Err(e) => {
                    error!("Unable to transfer payout {}: {:?}", payout.id, e);
                    // Release the claim so the next invocation retries.
                    // Should the provider have executed the transfer
                    // despite the error, it deduplicates the retry on the
                    // idempotency key.
                    if let Err(e) = ctx.repos.payout_transfers.delete(&payout.id).await {
                        warn!(
                            "Unable to release transfer claim for payout {}: {:?}",
                            payout.id, e
                        );
                    }
                    failed += 1;
                    continue;
                }
            };

            if let Err(e) = ctx
                .repos
                .payout_transfers
                .set_reference(&payout.id, &reference)
                .await
            {
                warn!(
                    "Transfer {} for payout {} succeeded but the reference was not stored: {:?}",
                    reference, payout.id, e
                );
            }
            if let Err(e) = ctx.repos.payouts.mark_transferred(&payout.id).await {
                warn!(
                    "Transfer record for payout {} exists but status update failed: {:?}",
                    payout.id, e
                );
            }
            res.transferred += 1;
        }

        if failed > 0 {
            return Err(UseCaseError::ProviderFailures(failed));
        }
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::setup_at;
    use carebook_domain::{Payout, PayoutStatus, ID};

    const NOW: i64 = 1_700_000_000_000;

    fn payout_created_hours_ago(hours: i64) -> Payout {
        Payout {
            id: ID::new(),
            expert_account_id: ID::new(),
            amount: 12_500,
            currency: "EUR".into(),
            created_at: NOW - hours * 60 * 60 * 1000,
            status: PayoutStatus::Pending,
        }
    }

    #[actix_web::test]
    async fn transfers_aged_payout_once() {
        let setup = setup_at(NOW);
        let payout = payout_created_hours_ago(48);
        setup.ctx.repos.payouts.insert(&payout).await.unwrap();

        let res = execute(ProcessPayoutTransfersUseCase {}, &setup.ctx)
            .await
            .unwrap();
        assert_eq!(res.transferred, 1);
        assert_eq!(setup.payments.transfer_count(), 1);

        let record = setup.ctx.repos.payout_transfers.find(&payout.id).await.unwrap();
        assert!(record.transfer_reference.is_some());

        // Redelivery is a no-op
        let res = execute(ProcessPayoutTransfersUseCase {}, &setup.ctx)
            .await
            .unwrap();
        assert_eq!(res.transferred, 0);
        assert_eq!(setup.payments.transfer_count(), 1);
    }

    #[actix_web::test]
    async fn young_payouts_are_left_alone() {
        let setup = setup_at(NOW);
        let payout = payout_created_hours_ago(2);
        setup.ctx.repos.payouts.insert(&payout).await.unwrap();

        let res = execute(ProcessPayoutTransfersUseCase {}, &setup.ctx)
            .await
            .unwrap();
        assert_eq!(res.processed, 0);
        assert_eq!(setup.payments.transfer_count(), 0);
    }

    #[actix_web::test]
    async fn provider_failure_is_retried_on_next_invocation() {
        let setup = setup_at(NOW);
        let payout = payout_created_hours_ago(48);
        setup.ctx.repos.payouts.insert(&payout).await.unwrap();
        setup
            .payments
            .fail_next
            .store(true, std::sync::atomic::Ordering::SeqCst);

        let res = execute(ProcessPayoutTransfersUseCase {}, &setup.ctx).await;
        assert!(matches!(res, Err(UseCaseError::ProviderFailures(1))));
        assert!(setup.ctx.repos.payout_transfers.find(&payout.id).await.is_none());

        // The claim was released, so the retry goes through
        setup
            .payments
            .fail_next
            .store(false, std::sync::atomic::Ordering::SeqCst);
        let res = execute(ProcessPayoutTransfersUseCase {}, &setup.ctx)
            .await
            .unwrap();
        assert_eq!(res.transferred, 1);
        assert_eq!(setup.payments.transfer_count(), 1);
    }

    #[actix_web::test]
    async fn held_claim_blocks_the_provider_call() {
        let setup = setup_at(NOW);
        let payout = payout_created_hours_ago(48);
        setup.ctx.repos.payouts.insert(&payout).await.unwrap();

        // An overlapping invocation took the claim but has not confirmed
        // the transfer yet
        let claim = PayoutTransferRecord {
            payout_id: payout.id.clone(),
            transfer_reference: None,
            created_at: NOW,
        };
        assert!(setup.ctx.repos.payout_transfers.insert(&claim).await.unwrap());

        let res = execute(ProcessPayoutTransfersUseCase {}, &setup.ctx)
            .await
            .unwrap();
        assert_eq!(res.skipped, 1);
        assert_eq!(res.transferred, 0);
        assert_eq!(setup.payments.transfer_count(), 0);
    }

    #[actix_web::test]
    async fn provider_receives_payout_id_as_idempotency_key() {
        let setup = setup_at(NOW);
        let payout = payout_created_hours_ago(30);
        setup.ctx.repos.payouts.insert(&payout).await.unwrap();

        execute(ProcessPayoutTransfersUseCase {}, &setup.ctx)
            .await
            .unwrap();

        let transfers = setup.payments.transfers.lock().unwrap();
        assert_eq!(transfers[0].1, payout.id.as_string());
    }
}
