use thiserror::Error;

#[derive(Debug, Error)]
pub enum MpesaApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Expected a JSON response, but the content type was '{0}'")]
    UnexpectedContentType(String),
    #[error("The token endpoint did not return an access token")]
    MissingAccessToken,
    #[error("Token request timed out after {0} seconds")]
    Timeout(u64),
}
