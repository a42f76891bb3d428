//! Primitives shared by the M-Pesa B2C reconciliation crates.
mod amount;
pub mod helpers;
mod secret;

pub use amount::{Amount, AmountConversionError, CURRENCY_CODE};
pub use secret::Secret;
