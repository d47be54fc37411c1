mod config;
mod repos;
mod services;
mod system;

pub use config::{Config, ConfigError};
pub use repos::{
    IBookingRepo, IPayoutRepo, IPayoutTransferRepo, IPendingPaymentRepo, ISentReminderRepo, Repos,
};
pub use services::*;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::{FixedSys, ISys, RealSys};

#[derive(Clone)]
pub struct CarebookContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub notifier: Arc<dyn INotifier>,
    pub payments: Arc<dyn IPaymentProvider>,
}

impl CarebookContext {
    /// Context backed by in-memory repos, for tests
    pub fn create_inmemory(
        config: Config,
        sys: Arc<dyn ISys>,
        notifier: Arc<dyn INotifier>,
        payments: Arc<dyn IPaymentProvider>,
    ) -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config,
            sys,
            notifier,
            payments,
        }
    }
}

/// Will setup the infrastructure context given the environment. Missing
/// required environment variables are fatal.
pub async fn setup_context() -> anyhow::Result<CarebookContext> {
    let config = Config::from_env()?;
    let repos = Repos::create_postgres(&require_env("DATABASE_URL")?).await?;

    let notifier = HttpNotifier::new(
        require_env("NOTIFIER_URL")?,
        std::env::var("NOTIFIER_API_KEY").ok(),
    );
    let payments = HttpPaymentProvider::new(
        require_env("PAYMENT_API_URL")?,
        require_env("PAYMENT_API_KEY")?,
    );

    Ok(CarebookContext {
        repos,
        config,
        sys: Arc::new(RealSys {}),
        notifier: Arc::new(notifier),
        payments: Arc::new(payments),
    })
}

fn require_env(var: &'static str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::MissingVar(var))
}

pub async fn run_migration() -> anyhow::Result<()> {
    let connection_string = require_env("DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&connection_string)
        .await?;

    sqlx::migrate!().run(&pool).await?;
    Ok(())
}
