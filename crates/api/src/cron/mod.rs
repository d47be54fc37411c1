mod appointment_reminders;
mod payment_reminders;
mod payout_transfers;

use actix_web::web;
use appointment_reminders::dispatch_appointment_reminders_controller;
use payment_reminders::dispatch_payment_reminders_controller;
use payout_transfers::dispatch_payout_transfers_controller;

// These paths must stay in lockstep with the endpoints declared in
// `ScheduleRegistry::standard`
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/api/cron/appointment-reminders",
        web::post().to(dispatch_appointment_reminders_controller),
    );
    cfg.route(
        "/api/cron/payment-reminders",
        web::post().to(dispatch_payment_reminders_controller),
    );
    cfg.route(
        "/api/cron/payout-transfers",
        web::post().to(dispatch_payout_transfers_controller),
    );
}

#[cfg(test)]
mod tests {
    use crate::configure_server_api;
    use crate::shared::test_helpers::{setup_at, TEST_SIGNING_KEY};
    use actix_web::{test, web, App};
    use carebook_domain::ScheduleRegistry;
    use carebook_infra::CRON_SIGNATURE_HEADER;

    #[actix_web::test]
    async fn every_registry_endpoint_is_served() {
        let setup = setup_at(0);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(setup.ctx))
                .configure(configure_server_api),
        )
        .await;

        for job in ScheduleRegistry::standard().jobs() {
            let payload = format!(r#"{{"job":"{}"}}"#, job.name);
            let req = test::TestRequest::post()
                .uri(&job.endpoint)
                .insert_header((CRON_SIGNATURE_HEADER, TEST_SIGNING_KEY))
                .insert_header(("content-type", "application/json"))
                .set_payload(payload)
                .to_request();
            let res = test::call_service(&app, req).await;
            assert!(
                res.status().is_success(),
                "{} -> {}",
                job.endpoint,
                res.status()
            );
        }
    }

    #[actix_web::test]
    async fn rejects_missing_signature() {
        let setup = setup_at(0);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(setup.ctx))
                .configure(configure_server_api),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/cron/appointment-reminders")
            .insert_header(("content-type", "application/json"))
            .set_payload(r#"{"job":"appointmentReminders"}"#)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status().as_u16(), 401);
    }

    #[actix_web::test]
    async fn rejects_payload_tagged_for_another_job() {
        let setup = setup_at(0);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(setup.ctx))
                .configure(configure_server_api),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/cron/appointment-reminders")
            .insert_header((CRON_SIGNATURE_HEADER, TEST_SIGNING_KEY))
            .insert_header(("content-type", "application/json"))
            .set_payload(r#"{"job":"payoutTransfers"}"#)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status().as_u16(), 400);
    }
}
