use carebook_utils::create_random_secret;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("required environment variable `{0}` is not set")]
    MissingVar(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: u16,
    /// Public base URL of this deployment, used to construct absolute
    /// destination URLs for the external scheduler
    pub app_base_url: String,
    /// Base URL of the external scheduler's HTTP API
    pub scheduler_api_url: String,
    /// Bearer token for the external scheduler's HTTP API
    pub scheduler_api_token: String,
    /// Shared secret the scheduler echoes back on every dispatch request.
    /// Dispatch targets reject requests without it.
    pub cron_signing_key: String,
}

const DEFAULT_SCHEDULER_API_URL: &str = "https://qstash.upstash.io/v2";

impl Config {
    /// Reads the configuration from the environment. Missing required
    /// variables are fatal: the caller is expected to exit.
    pub fn from_env() -> Result<Self, ConfigError> {
        let scheduler_api_token = std::env::var("SCHEDULER_API_TOKEN")
            .map_err(|_| ConfigError::MissingVar("SCHEDULER_API_TOKEN"))?;
        let app_base_url = std::env::var("APP_BASE_URL")
            .map_err(|_| ConfigError::MissingVar("APP_BASE_URL"))?
            .trim_end_matches('/')
            .to_string();
        let scheduler_api_url = std::env::var("SCHEDULER_API_URL")
            .unwrap_or_else(|_| DEFAULT_SCHEDULER_API_URL.into())
            .trim_end_matches('/')
            .to_string();

        let cron_signing_key = match std::env::var("CRON_SIGNING_KEY") {
            Ok(key) => key,
            Err(_) => {
                info!("Did not find CRON_SIGNING_KEY environment variable. Going to create one.");
                let key = create_random_secret(32);
                info!("Signing key for cron dispatch requests was generated and set to: {}", key);
                key
            }
        };

        let default_port = "5100";
        let port = std::env::var("PORT").unwrap_or_else(|_| default_port.into());
        let port = match port.parse::<u16>() {
            Ok(port) => port,
            Err(_) => {
                warn!(
                    "The given PORT: {} is not valid, falling back to the default port: {}.",
                    port, default_port
                );
                default_port.parse::<u16>().unwrap()
            }
        };

        Ok(Self {
            port,
            app_base_url,
            scheduler_api_url,
            scheduler_api_token,
            cron_signing_key,
        })
    }
}
