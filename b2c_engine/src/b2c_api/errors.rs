use thiserror::Error;

use crate::traits::{CorrelationStoreError, PaymentStoreError};

#[derive(Debug, Clone, Error)]
pub enum ReconciliationError {
    #[error("Invalid callback: {0}")]
    InvalidCallback(String),
    #[error("Invalid transfer request: {0}")]
    InvalidTransferRequest(String),
    #[error("Could not persist payment. {0}")]
    Persistence(#[from] PaymentStoreError),
    #[error("Could not store transfer request. {0}")]
    Correlation(#[from] CorrelationStoreError),
}
