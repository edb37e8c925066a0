use crate::module::verification::schema::VerificationResponse;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityVerifyRequest {
    #[serde(alias = "userId")]
    pub user_id: String,
    pub credentials: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityVerifyResponse {
    pub success: bool,
    pub user_id: String,
    pub verification: Option<VerificationResponse>,
    pub error_code: Option<String>,
    pub reason: String,
}
