//! # M-Pesa B2C gateway server
//! This crate hosts the HTTP side of the B2C reconciliation gateway. It is responsible for:
//! * Listening for B2C result callbacks from M-Pesa.
//! * Converting the provider payload into a callback outcome and handing it to the reconciliation engine.
//! * Serving the reconciled payments to downstream consumers.
//! * Keeping an OAuth access token for the provider API fresh in the background.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/b2c/incoming`: The callback route for B2C results.
//! * `/api/payments/{id}`, `/api/payments/conversation/{conversation_id}` and `/api/search/payments`: queries over
//!   reconciled payments.
//! * `/api/payments/{id}/processed`: lets a downstream consumer acknowledge a payment.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod publisher;
pub mod routes;
pub mod server;
pub mod token_worker;

#[cfg(test)]
mod endpoint_tests;
