use carebook_infra::{
    CarebookContext, Config, FixedSys, RecordingNotifier, RecordingPaymentProvider,
};
use std::sync::Arc;

pub const TEST_SIGNING_KEY: &str = "test-signing-key";

pub fn test_config() -> Config {
    Config {
        port: 0,
        app_base_url: "http://localhost:5100".into(),
        scheduler_api_url: "http://localhost:8800".into(),
        scheduler_api_token: "test-token".into(),
        cron_signing_key: TEST_SIGNING_KEY.into(),
    }
}

pub struct TestSetup {
    pub ctx: CarebookContext,
    pub notifier: Arc<RecordingNotifier>,
    pub payments: Arc<RecordingPaymentProvider>,
}

/// Context with in-memory repos, a fixed clock at `now` and recording
/// providers
pub fn setup_at(now: i64) -> TestSetup {
    let notifier = Arc::new(RecordingNotifier::new());
    let payments = Arc::new(RecordingPaymentProvider::new());
    let ctx = CarebookContext::create_inmemory(
        test_config(),
        Arc::new(FixedSys(now)),
        notifier.clone(),
        payments.clone(),
    );
    TestSetup {
        ctx,
        notifier,
        payments,
    }
}
