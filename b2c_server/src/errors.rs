use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use b2c_engine::{traits::PaymentStoreError, ReconciliationError};
use log::*;
use thiserror::Error;

/// Storage details stay in the server log; clients only see this.
pub const STORAGE_UNAVAILABLE_MESSAGE: &str = "The payment store is unavailable. Please retry later.";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Unsupported content type: {0}. Expected application/json")]
    UnsupportedContentType(String),
    #[error("Payload deserialization error. {0}")]
    CouldNotDeserializePayload(String),
    #[error("Invalid callback. {0}")]
    InvalidCallback(String),
    #[error("Invalid query. {0}")]
    InvalidQuery(String),
    #[error("Invalid request body. {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedContentType(_) => StatusCode::BAD_REQUEST,
            Self::CouldNotDeserializePayload(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCallback(_) => StatusCode::BAD_REQUEST,
            Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<ReconciliationError> for ServerError {
    fn from(e: ReconciliationError) -> Self {
        match e {
            ReconciliationError::InvalidCallback(s) => Self::InvalidCallback(s),
            ReconciliationError::InvalidTransferRequest(s) => Self::InvalidRequestBody(s),
            ReconciliationError::Persistence(e) => {
                error!("💻️ Payment store failure. {e}");
                Self::BackendError(STORAGE_UNAVAILABLE_MESSAGE.into())
            },
            ReconciliationError::Correlation(e) => {
                error!("💻️ Correlation store failure. {e}");
                Self::BackendError(STORAGE_UNAVAILABLE_MESSAGE.into())
            },
        }
    }
}

impl From<PaymentStoreError> for ServerError {
    fn from(e: PaymentStoreError) -> Self {
        match e {
            PaymentStoreError::QueryError(s) => Self::InvalidQuery(s),
            e => {
                error!("💻️ Payment store failure. {e}");
                Self::BackendError(STORAGE_UNAVAILABLE_MESSAGE.into())
            },
        }
    }
}
