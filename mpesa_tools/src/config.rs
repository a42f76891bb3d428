use std::time::Duration;

use b2c_common::{helpers::parse_seconds, Secret};
use log::*;

pub const DEFAULT_ACCESS_TOKEN_URL: &str =
    "https://sandbox.safaricom.co.ke/oauth/v1/generate?grant_type=client_credentials";
pub const DEFAULT_TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct MpesaConfig {
    pub consumer_key: String,
    pub consumer_secret: Secret<String>,
    pub access_token_url: String,
    pub request_timeout: Duration,
}

impl Default for MpesaConfig {
    fn default() -> Self {
        Self {
            consumer_key: String::default(),
            consumer_secret: Secret::default(),
            access_token_url: DEFAULT_ACCESS_TOKEN_URL.to_string(),
            request_timeout: DEFAULT_TOKEN_REQUEST_TIMEOUT,
        }
    }
}

impl MpesaConfig {
    pub fn new_from_env_or_default() -> Self {
        let consumer_key = std::env::var("B2C_CONSUMER_KEY").unwrap_or_else(|_| {
            warn!("🪛️ B2C_CONSUMER_KEY not set, token requests will be rejected by the provider");
            String::default()
        });
        let consumer_secret = Secret::new(std::env::var("B2C_CONSUMER_SECRET").unwrap_or_else(|_| {
            warn!("🪛️ B2C_CONSUMER_SECRET not set, token requests will be rejected by the provider");
            String::default()
        }));
        let access_token_url = std::env::var("B2C_ACCESS_TOKEN_URL").unwrap_or_else(|_| {
            warn!("🪛️ B2C_ACCESS_TOKEN_URL not set, using the sandbox endpoint {DEFAULT_ACCESS_TOKEN_URL}");
            DEFAULT_ACCESS_TOKEN_URL.to_string()
        });
        let request_timeout = parse_seconds(std::env::var("B2C_TOKEN_REQUEST_TIMEOUT_SECS").ok()).unwrap_or_else(|| {
            info!("🪛️ B2C_TOKEN_REQUEST_TIMEOUT_SECS not set or invalid, using {DEFAULT_TOKEN_REQUEST_TIMEOUT:?}");
            DEFAULT_TOKEN_REQUEST_TIMEOUT
        });
        Self { consumer_key, consumer_secret, access_token_url, request_timeout }
    }

    /// The value of the `Authorization` header sent to the token endpoint.
    pub fn basic_auth_header(&self) -> Secret<String> {
        let credentials = format!("{}:{}", self.consumer_key, self.consumer_secret.reveal());
        Secret::new(format!("Basic {}", base64::encode(credentials)))
    }
}
