use crate::service::backup_service::{BackupInfo, IntegrityDetail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBackupResponse {
    pub success: bool,
    pub backup_id: Option<String>,
    pub timestamp: String,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListBackupsResponse {
    pub success: bool,
    pub backups: Vec<BackupInfo>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreBackupRequest {
    #[serde(alias = "backupId")]
    pub backup_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreBackupResponse {
    pub success: bool,
    pub backup_id: Option<String>,
    pub restored_count: usize,
    pub timestamp: String,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityResponse {
    pub success: bool,
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub details: Vec<IntegrityDetail>,
    pub timestamp: String,
    pub error_code: Option<String>,
    pub reason: String,
}
