use crate::config::environment::AppConfig;
use crate::module::verification::schema::{VerificationRequest, VerificationResponse};
use crate::service::signature_service;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("provider returned {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("provider request failed: {0}")]
    Network(#[from] reqwest::Error),
}

/// Stateless adapter for the SIMBA Chain verification API. Makes exactly one
/// attempt per call; retries are a caller policy (see retry_service).
#[derive(Debug, Clone)]
pub struct SimbaClient {
    http: reqwest::Client,
    api_endpoint: String,
    api_key: String,
    webhook_secret: String,
}

impl SimbaClient {
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            api_endpoint: config.simba_api_endpoint.trim_end_matches('/').to_string(),
            api_key: config.simba_api_key.clone(),
            webhook_secret: config.simba_webhook_secret.clone(),
        })
    }

    pub async fn verify_data(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/verify", self.api_endpoint))
            .bearer_auth(&self.api_key)
            .header("X-Request-ID", Uuid::new_v4().to_string())
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error(response.status()));
        }
        Ok(response.json::<VerificationResponse>().await?)
    }

    pub async fn check_verification_status(
        &self,
        request_id: &str,
    ) -> Result<VerificationResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}/status/{request_id}", self.api_endpoint))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error(response.status()));
        }
        Ok(response.json::<VerificationResponse>().await?)
    }

    /// Lightweight existence check used by the integrity audit. A 404 means the
    /// transaction is unknown to the provider, not a transport failure.
    pub async fn validate_transaction(&self, transaction_id: &str) -> Result<bool, ClientError> {
        let response = self
            .http
            .get(format!("{}/transaction/{transaction_id}", self.api_endpoint))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(provider_error(response.status()));
        }
        Ok(true)
    }

    pub fn validate_webhook_signature(&self, payload: &[u8], signature: &str) -> bool {
        signature_service::verify_hmac_signature(
            self.webhook_secret.as_bytes(),
            payload,
            signature,
        )
    }
}

fn provider_error(status: StatusCode) -> ClientError {
    ClientError::Provider {
        status: status.as_u16(),
        message: status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string(),
    }
}
