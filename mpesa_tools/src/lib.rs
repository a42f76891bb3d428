//! # M-Pesa tools
//!
//! Everything that knows about the mobile-money provider itself:
//! * [`MpesaConfig`] reads the consumer credentials and token endpoint from the environment.
//! * [`MpesaApi`] fetches OAuth access tokens.
//! * [`data_objects`] describes the B2C result callback exactly as the provider sends it.
//! * [`credentials`] keeps a valid access token in memory, refreshing it on a schedule and backing off when the
//!   provider is unavailable.
mod api;
mod config;
mod error;

pub mod credentials;
pub mod data_objects;

pub use api::{parse_token_response, MpesaApi};
pub use config::MpesaConfig;
pub use error::MpesaApiError;
