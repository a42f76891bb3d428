use std::{env, time::Duration as StdDuration};

use b2c_common::helpers::parse_seconds;
use b2c_engine::DEFAULT_REQUEST_RETENTION_HOURS;
use chrono::Duration;
use log::*;
use mpesa_tools::{
    credentials::{RefreshSettings, DEFAULT_BACKOFF_CEILING, DEFAULT_BACKOFF_INITIAL, DEFAULT_REFRESH_INTERVAL},
    MpesaConfig,
};

const DEFAULT_B2C_HOST: &str = "127.0.0.1";
const DEFAULT_B2C_PORT: u16 = 8370;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/b2c_store.db";
const DEFAULT_EVENT_BUFFER_SIZE: usize = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// How long a transfer request stays available for correlating its callback.
    pub request_retention: Duration,
    /// If set, payments that are due for publication are POSTed to this URL.
    pub publish_webhook_url: Option<String>,
    pub event_buffer_size: usize,
    /// The provider credentials and token endpoint
    pub mpesa: MpesaConfig,
    pub token_refresh: TokenRefreshSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_B2C_HOST.to_string(),
            port: DEFAULT_B2C_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            request_retention: Duration::hours(DEFAULT_REQUEST_RETENTION_HOURS),
            publish_webhook_url: None,
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            mpesa: MpesaConfig::default(),
            token_refresh: TokenRefreshSettings::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("B2C_HOST").ok().unwrap_or_else(|| DEFAULT_B2C_HOST.into());
        let port = env::var("B2C_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for B2C_PORT. {e} Using the default, {DEFAULT_B2C_PORT}, instead."
                    );
                    DEFAULT_B2C_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_B2C_PORT);
        let database_url = env::var("B2C_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ B2C_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let request_retention = configure_request_retention();
        let publish_webhook_url = env::var("B2C_PUBLISH_WEBHOOK_URL").ok().filter(|s| !s.trim().is_empty());
        match &publish_webhook_url {
            Some(url) => info!("🪛️ Published payments will be forwarded to {url}"),
            None => info!("🪛️ B2C_PUBLISH_WEBHOOK_URL is not set. Published payments will only be logged."),
        }
        let event_buffer_size = env::var("B2C_EVENT_BUFFER_SIZE")
            .ok()
            .and_then(|s| {
                s.parse::<usize>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for B2C_EVENT_BUFFER_SIZE. {e}"))
                    .ok()
            })
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);
        let mpesa = MpesaConfig::new_from_env_or_default();
        let token_refresh = TokenRefreshSettings::from_env_or_default();
        Self {
            host,
            port,
            database_url,
            request_retention,
            publish_webhook_url,
            event_buffer_size,
            mpesa,
            token_refresh,
        }
    }

    /// The settings handed to the credential manager. The per-request timeout comes from the provider config.
    pub fn refresh_settings(&self) -> RefreshSettings {
        RefreshSettings {
            interval: self.token_refresh.interval,
            backoff_initial: self.token_refresh.backoff_initial,
            backoff_ceiling: self.token_refresh.backoff_ceiling,
            request_timeout: self.mpesa.request_timeout,
        }
    }
}

fn configure_request_retention() -> Duration {
    env::var("B2C_REQUEST_RETENTION_HOURS")
        .map_err(|_| {
            info!(
                "🪛️ B2C_REQUEST_RETENTION_HOURS is not set. Using the default value of {DEFAULT_REQUEST_RETENTION_HOURS} \
                 hrs."
            )
        })
        .and_then(|s| {
            s.parse::<i64>()
                .map(Duration::hours)
                .map_err(|e| warn!("🪛️ Invalid configuration value for B2C_REQUEST_RETENTION_HOURS. {e}"))
        })
        .ok()
        .filter(|d| *d > Duration::zero())
        .unwrap_or_else(|| Duration::hours(DEFAULT_REQUEST_RETENTION_HOURS))
}

//-----------------------------------------------  TokenRefreshSettings  -----------------------------------------------
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRefreshSettings {
    /// Time between refreshes while the provider is healthy
    pub interval: StdDuration,
    /// First retry delay after a failure. It doubles on every further failure.
    pub backoff_initial: StdDuration,
    pub backoff_ceiling: StdDuration,
}

impl Default for TokenRefreshSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            backoff_initial: DEFAULT_BACKOFF_INITIAL,
            backoff_ceiling: DEFAULT_BACKOFF_CEILING,
        }
    }
}

impl TokenRefreshSettings {
    pub fn from_env_or_default() -> Self {
        let defaults = Self::default();
        let interval = seconds_from_env("B2C_TOKEN_REFRESH_INTERVAL_SECS", defaults.interval);
        let backoff_initial = seconds_from_env("B2C_TOKEN_BACKOFF_SECS", defaults.backoff_initial);
        let mut backoff_ceiling = seconds_from_env("B2C_TOKEN_BACKOFF_CEILING_SECS", defaults.backoff_ceiling);
        if backoff_ceiling < backoff_initial {
            warn!(
                "🪛️ B2C_TOKEN_BACKOFF_CEILING_SECS ({}s) is smaller than B2C_TOKEN_BACKOFF_SECS ({}s). Using the \
                 initial backoff as the ceiling.",
                backoff_ceiling.as_secs(),
                backoff_initial.as_secs()
            );
            backoff_ceiling = backoff_initial;
        }
        Self { interval, backoff_initial, backoff_ceiling }
    }
}

fn seconds_from_env(name: &str, default: StdDuration) -> StdDuration {
    match parse_seconds(env::var(name).ok()).filter(|d| !d.is_zero()) {
        Some(d) => d,
        None => {
            debug!("🪛️ {name} is not set or invalid. Using {}s", default.as_secs());
            default
        },
    }
}
