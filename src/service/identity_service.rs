use crate::config::environment::AppConfig;
use crate::module::verification::schema::{
    DataType, Priority, RequestMetadata, VerificationRequest, VerificationResponse,
    VerificationStatus,
};
use crate::service::retry_service::with_retry;
use crate::service::simba_client::{ClientError, SimbaClient};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Connects the DeafAuth identity service to the verification pipeline:
/// credentials are checked against DeafAuth first, then the issued token is
/// anchored on chain as an identity-type verification.
pub struct IdentityVerifier {
    http: reqwest::Client,
    auth_endpoint: String,
    client: Arc<SimbaClient>,
    retry_attempts: u32,
    retry_delay: Duration,
}

pub struct IdentityOutcome {
    pub is_valid: bool,
    pub verification: Option<VerificationResponse>,
}

impl IdentityOutcome {
    fn invalid() -> Self {
        Self {
            is_valid: false,
            verification: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValidateReply {
    token: String,
}

impl IdentityVerifier {
    pub fn new(config: &AppConfig, client: Arc<SimbaClient>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            auth_endpoint: config.auth_endpoint.trim_end_matches('/').to_string(),
            client,
            retry_attempts: config.retry_attempts,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// Anchors an already-issued identity token. Identity verifications bypass
    /// the batch queue: they sit on a login path and go out at high priority.
    pub async fn verify_identity_token(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<VerificationResponse, ClientError> {
        let now = Utc::now().to_rfc3339();
        let request = VerificationRequest {
            data_id: format!("identity:{user_id}"),
            data_type: DataType::Identity,
            payload: json!({
                "token": token,
                "user_id": user_id,
                "timestamp": now,
            }),
            metadata: RequestMetadata {
                service_id: "deaf-auth".to_string(),
                user_id: Some(user_id.to_string()),
                timestamp: now,
                priority: Priority::High,
            },
        };
        with_retry(self.retry_attempts, self.retry_delay, || {
            self.client.verify_data(&request)
        })
        .await
    }

    /// Validates credentials with DeafAuth, then verifies the issued token.
    /// Any rejection from the auth service reads as an invalid identity, not
    /// an error; only the chain submission itself can fail.
    pub async fn validate_and_verify(
        &self,
        user_id: &str,
        credentials: &Value,
    ) -> Result<IdentityOutcome, ClientError> {
        let response = match self
            .http
            .post(format!("{}/validate", self.auth_endpoint))
            .json(&json!({ "user_id": user_id, "credentials": credentials }))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "auth service unreachable");
                return Ok(IdentityOutcome::invalid());
            }
        };
        if !response.status().is_success() {
            info!(user_id = %user_id, status = response.status().as_u16(), "credentials rejected");
            return Ok(IdentityOutcome::invalid());
        }
        let reply: ValidateReply = match response.json().await {
            Ok(r) => r,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "auth service reply unreadable");
                return Ok(IdentityOutcome::invalid());
            }
        };

        let verification = self.verify_identity_token(&reply.token, user_id).await?;
        Ok(IdentityOutcome {
            is_valid: verification.status == VerificationStatus::Verified,
            verification: Some(verification),
        })
    }
}
