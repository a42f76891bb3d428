//! M-Pesa B2C reconciliation engine
//!
//! The provider reports the outcome of a business-to-customer transfer asynchronously, through a callback that may be
//! duplicated, delayed or unrelated to any request this service knows about. This library turns those callbacks into
//! exactly one durable payment record per conversation.
//!
//! The library is divided into these sections:
//! 1. Storage ([`traits`] and the SQLite backend). [`traits::PaymentStore`] holds reconciled payments and
//!    [`traits::CorrelationStore`] is a time-limited cache of the transfer requests that started them.
//! 2. The public API. [`ReconciliationApi`] processes callbacks and [`PaymentsApi`] queries the results.
//! 3. Events ([`events`]). Reconciled payments that were submitted with a publish request are handed to subscribers
//!    through a simple hook system.
mod b2c_api;

pub mod db_types;
pub mod events;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use b2c_api::{
    errors::ReconciliationError,
    notification,
    payment_objects,
    payments_api::PaymentsApi,
    reconciliation_api::{derive_outcome, ReconciliationApi, DEFAULT_REQUEST_RETENTION_HOURS},
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
