//! # Storage backends
//!
//! The reconciliation engine is storage-agnostic. A backend has to provide two things:
//!
//! * [`PaymentStore`] is the durable home of reconciled payment records. Exactly one record exists per conversation
//!   id, and every write must either succeed or be reported to the caller.
//! * [`CorrelationStore`] is a short-lived cache of outbound transfer requests, keyed by conversation id. Entries
//!   expire passively after their retention window. The engine treats this store as best effort.
mod correlation_store;
mod data_objects;
mod payment_store;

pub use correlation_store::{correlation_key, CorrelationStore, CorrelationStoreError, CORRELATION_KEY_PREFIX};
pub use data_objects::InsertPaymentResult;
pub use payment_store::{PaymentStore, PaymentStoreError};
