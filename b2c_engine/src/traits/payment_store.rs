use thiserror::Error;

use crate::{
    db_types::{ConversationId, NewPayment, Payment, PaymentOutcome},
    payment_objects::PaymentQueryFilter,
    traits::InsertPaymentResult,
};

/// Durable storage for reconciled payment records.
#[allow(async_fn_in_trait)]
pub trait PaymentStore: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    async fn fetch_payment_by_id(&self, id: i64) -> Result<Option<Payment>, PaymentStoreError>;

    async fn fetch_payment_by_conversation_id(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<Payment>, PaymentStoreError>;

    /// Inserts a brand-new record. If a record with any of the same unique keys (conversation id, originator
    /// conversation id or receipt id) exists, nothing is written and `AlreadyExists` is returned instead of an error.
    async fn insert_payment(&self, payment: NewPayment) -> Result<InsertPaymentResult, PaymentStoreError>;

    /// Overwrites the outcome fields of the record with the given conversation id. The receipt id and completion
    /// time are only replaced when the new outcome carries them.
    ///
    /// Returns the updated record, or `None` if there is no record for the conversation id.
    async fn update_payment_outcome(
        &self,
        conversation_id: &ConversationId,
        outcome: &PaymentOutcome,
    ) -> Result<Option<Payment>, PaymentStoreError>;

    async fn search_payments(&self, query: PaymentQueryFilter) -> Result<Vec<Payment>, PaymentStoreError>;

    /// Flags the record as consumed downstream. Returns `None` if the record does not exist.
    async fn mark_payment_processed(&self, id: i64) -> Result<Option<Payment>, PaymentStoreError>;
}

#[derive(Debug, Clone, Error)]
pub enum PaymentStoreError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Payment {0} conflicts with an existing record that has a different conversation id")]
    UniqueConstraintConflict(ConversationId),
    #[error("User error constructing query: {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for PaymentStoreError {
    fn from(e: sqlx::Error) -> Self {
        PaymentStoreError::DatabaseError(e.to_string())
    }
}
