use chrono::Duration;
use thiserror::Error;

use crate::db_types::{ConversationId, TransferRequest};

pub const CORRELATION_KEY_PREFIX: &str = "mpesa:b2c:request:";

/// The cache key under which the transfer request for `conversation_id` is stored.
pub fn correlation_key(conversation_id: &ConversationId) -> String {
    format!("{CORRELATION_KEY_PREFIX}{conversation_id}")
}

/// A time-limited cache of transfer requests.
#[allow(async_fn_in_trait)]
pub trait CorrelationStore: Clone {
    /// Stores the request under its conversation id, replacing any previous entry. The entry becomes invisible once
    /// `ttl` has passed.
    async fn put_transfer_request(&self, request: &TransferRequest, ttl: Duration) -> Result<(), CorrelationStoreError>;

    /// Returns the stored request, or `None` if it never existed or has expired.
    async fn fetch_transfer_request(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<TransferRequest>, CorrelationStoreError>;
}

#[derive(Debug, Clone, Error)]
pub enum CorrelationStoreError {
    #[error("Correlation store is unavailable: {0}")]
    Unavailable(String),
    #[error("Stored transfer request could not be decoded: {0}")]
    Deserialization(String),
    #[error("Transfer request could not be encoded: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for CorrelationStoreError {
    fn from(e: sqlx::Error) -> Self {
        CorrelationStoreError::Unavailable(e.to_string())
    }
}
