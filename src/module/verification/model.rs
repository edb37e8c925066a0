use super::schema::{VerificationResponse, VerificationStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Full verification record stored under `verification:request:{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredVerification {
    pub request_id: String,
    pub status: VerificationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_proof: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_id: Option<String>,
    pub updated_at: String,
}

impl StoredVerification {
    pub fn from_response(response: &VerificationResponse, data_id: &str, updated_at: String) -> Self {
        Self {
            request_id: response.request_id.clone(),
            status: response.status,
            transaction_id: response.transaction_id.clone(),
            timestamp: response.timestamp.clone(),
            expires_at: response.expires_at.clone(),
            verification_proof: response.verification_proof.clone(),
            metadata: response.metadata.clone(),
            data_id: Some(data_id.to_string()),
            updated_at,
        }
    }
}

/// Lightweight reference stored under `verification:data:{id}`, pointing at the
/// request record that holds the full verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataReference {
    pub request_id: String,
    pub status: VerificationStatus,
    pub updated_at: String,
}

/// One entry in the per-data-id history trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationEvent {
    pub request_id: String,
    pub status: VerificationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub timestamp: String,
}
