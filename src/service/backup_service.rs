use crate::infra::{
    KvError, KvStore, BACKUP_KEY_PREFIX, DATA_KEY_PREFIX, REQUEST_KEY_PREFIX,
};
use crate::module::verification::model::{DataReference, StoredVerification};
use crate::module::verification::schema::VerificationStatus;
use crate::service::simba_client::SimbaClient;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("backup not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Kv(#[from] KvError),
    #[error("backup record is not valid json: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupEntry {
    pub key: String,
    pub data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupSnapshot {
    pub timestamp: String,
    pub count: usize,
    pub verifications: Vec<BackupEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    pub id: String,
    pub timestamp: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityDetail {
    pub key: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub details: Vec<IntegrityDetail>,
}

/// Snapshot/restore/integrity-audit utility over the live verification keys.
/// Operates on the store directly, independent of the cache/batch runtime.
#[derive(Clone)]
pub struct VerificationBackup {
    kv: KvStore,
    client: Arc<SimbaClient>,
    restore_ttl_seconds: u64,
}

impl VerificationBackup {
    pub fn new(kv: KvStore, client: Arc<SimbaClient>, restore_ttl_seconds: u64) -> Self {
        Self {
            kv,
            client,
            restore_ttl_seconds,
        }
    }

    /// Snapshots every live request-keyed entry under a fresh timestamp key.
    /// An empty store still yields a valid (empty) backup. Backups carry no
    /// TTL, so they outlive the data they capture.
    pub async fn create_backup(&self) -> Result<String, BackupError> {
        let backup_id = format!("{BACKUP_KEY_PREFIX}{}", Utc::now().timestamp_millis());
        let keys = self.kv.keys(&format!("{REQUEST_KEY_PREFIX}*")).await?;

        let mut verifications = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(raw) = self.kv.get(&key).await? {
                verifications.push(BackupEntry {
                    key,
                    data: serde_json::from_str(&raw)?,
                });
            }
        }

        let snapshot = BackupSnapshot {
            timestamp: Utc::now().to_rfc3339(),
            count: verifications.len(),
            verifications,
        };
        self.kv
            .set(&backup_id, &serde_json::to_string(&snapshot)?)
            .await?;

        info!(backup_id = %backup_id, count = snapshot.count, "backup created");
        Ok(backup_id)
    }

    /// Replays every captured entry as an overwrite into the live store,
    /// reapplying the configured verification TTL so restored entries expire
    /// like any other write.
    pub async fn restore_backup(&self, backup_id: &str) -> Result<usize, BackupError> {
        let raw = self
            .kv
            .get(backup_id)
            .await?
            .ok_or_else(|| BackupError::NotFound(backup_id.to_string()))?;
        let snapshot: BackupSnapshot = serde_json::from_str(&raw)?;

        let mut restored = 0;
        for entry in &snapshot.verifications {
            self.kv
                .set_ex(
                    &entry.key,
                    &serde_json::to_string(&entry.data)?,
                    self.restore_ttl_seconds,
                )
                .await?;
            restored += 1;
        }

        info!(backup_id = %backup_id, restored, "backup restored");
        Ok(restored)
    }

    pub async fn list_backups(&self) -> Result<Vec<BackupInfo>, BackupError> {
        let keys = self.kv.keys(&format!("{BACKUP_KEY_PREFIX}*")).await?;
        let mut backups = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(raw) = self.kv.get(&key).await? else {
                continue;
            };
            let snapshot: BackupSnapshot = serde_json::from_str(&raw)?;
            backups.push(BackupInfo {
                id: key,
                timestamp: snapshot.timestamp,
                count: snapshot.count,
            });
        }
        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(backups)
    }

    /// Audits every request-keyed entry: verified entries with a transaction
    /// reference are checked against the provider, all other statuses are
    /// trivially valid. Also reconciles dangling data references left behind
    /// by a partial dual write, deleting them and reporting them as invalid.
    pub async fn verify_integrity(&self) -> Result<IntegrityReport, BackupError> {
        let mut report = IntegrityReport {
            total: 0,
            valid: 0,
            invalid: 0,
            details: Vec::new(),
        };

        let request_keys = self.kv.keys(&format!("{REQUEST_KEY_PREFIX}*")).await?;
        for key in request_keys {
            report.total += 1;
            match self.audit_request_entry(&key).await {
                Ok(None) => {
                    report.valid += 1;
                    report.details.push(IntegrityDetail {
                        key,
                        valid: true,
                        issue: None,
                    });
                }
                Ok(Some(issue)) | Err(issue) => {
                    report.invalid += 1;
                    report.details.push(IntegrityDetail {
                        key,
                        valid: false,
                        issue: Some(issue),
                    });
                }
            }
        }

        let data_keys = self.kv.keys(&format!("{DATA_KEY_PREFIX}*")).await?;
        for key in data_keys {
            let Some(raw) = self.kv.get(&key).await? else {
                continue;
            };
            let Ok(reference) = serde_json::from_str::<DataReference>(&raw) else {
                continue;
            };
            let request_key = format!("{REQUEST_KEY_PREFIX}{}", reference.request_id);
            if self.kv.get(&request_key).await?.is_none() {
                self.kv.del(&key).await?;
                report.total += 1;
                report.invalid += 1;
                report.details.push(IntegrityDetail {
                    key,
                    valid: false,
                    issue: Some("dangling data reference removed".to_string()),
                });
            }
        }

        Ok(report)
    }

    // Ok(None) = valid, Ok(Some(issue)) = invalid, Err(issue) = check failed.
    async fn audit_request_entry(&self, key: &str) -> Result<Option<String>, String> {
        let raw = match self.kv.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Some("verification data not found".to_string())),
            Err(e) => return Err(e.to_string()),
        };
        let verification: StoredVerification =
            serde_json::from_str(&raw).map_err(|e| format!("unreadable record: {e}"))?;

        if verification.status == VerificationStatus::Verified {
            if let Some(transaction_id) = &verification.transaction_id {
                return match self.client.validate_transaction(transaction_id).await {
                    Ok(true) => Ok(None),
                    Ok(false) => Ok(Some("transaction not found on blockchain".to_string())),
                    Err(e) => Err(e.to_string()),
                };
            }
        }
        Ok(None)
    }
}
