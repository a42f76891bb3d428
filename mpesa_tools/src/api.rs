use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
    StatusCode,
};
use serde::Deserialize;

use crate::{
    config::MpesaConfig,
    credentials::{AccessToken, AccessTokenSource},
    MpesaApiError,
};

#[derive(Clone)]
pub struct MpesaApi {
    config: MpesaConfig,
    client: Arc<Client>,
}

impl MpesaApi {
    pub fn new(config: MpesaConfig) -> Result<Self, MpesaApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| MpesaApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &MpesaConfig {
        &self.config
    }

    /// Requests a fresh OAuth access token using the consumer key and secret.
    pub async fn get_access_token(&self) -> Result<AccessToken, MpesaApiError> {
        let auth = HeaderValue::from_str(self.config.basic_auth_header().reveal())
            .map_err(|e| MpesaApiError::RestRequestError(e.to_string()))?;
        trace!("🔑️ Requesting access token from {}", self.config.access_token_url);
        let response = self
            .client
            .get(&self.config.access_token_url)
            .header(AUTHORIZATION, auth)
            .send()
            .await
            .map_err(|e| MpesaApiError::RestResponseError(e.to_string()))?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await.map_err(|e| MpesaApiError::RestResponseError(e.to_string()))?;
        parse_token_response(status, &content_type, &body)
    }
}

impl AccessTokenSource for MpesaApi {
    async fn fetch_access_token(&self) -> Result<AccessToken, MpesaApiError> {
        self.get_access_token().await
    }
}

/// Interprets the token endpoint's reply. Only a `200 OK` with a JSON body carrying a non-empty `access_token` is
/// accepted.
pub fn parse_token_response(status: StatusCode, content_type: &str, body: &str) -> Result<AccessToken, MpesaApiError> {
    #[derive(Deserialize)]
    struct TokenResponse {
        access_token: Option<String>,
    }

    if status != StatusCode::OK {
        return Err(MpesaApiError::QueryError { status: status.as_u16(), message: body.to_string() });
    }
    if !content_type.to_ascii_lowercase().contains("application/json") {
        return Err(MpesaApiError::UnexpectedContentType(content_type.to_string()));
    }
    let response =
        serde_json::from_str::<TokenResponse>(body).map_err(|e| MpesaApiError::JsonError(e.to_string()))?;
    match response.access_token {
        Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
        _ => Err(MpesaApiError::MissingAccessToken),
    }
}
