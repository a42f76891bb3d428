//! # B2C reconciliation public API
//!
//! * [`reconciliation_api`] correlates, reconciles and persists provider callbacks, and hands reconciled payments to
//!   the [`notification`] gate.
//! * [`payments_api`] provides read access to reconciled payments.
//!
//! Both APIs are created by supplying a backend that implements the storage traits they need:
//!
//! ```rust,ignore
//! use b2c_engine::{events::EventProducers, ReconciliationApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/b2c_store.db", 25).await?;
//! // SqliteDatabase implements both PaymentStore and CorrelationStore
//! let api = ReconciliationApi::new(db.clone(), db, EventProducers::default());
//! let result = api.process_callback(callback).await?;
//! ```
pub mod errors;
pub mod notification;
pub mod payment_objects;
pub mod payments_api;
pub mod reconciliation_api;
