use crate::infra::{KvError, KvStore, DATA_KEY_PREFIX, HISTORY_KEY_PREFIX, REQUEST_KEY_PREFIX};
use crate::module::verification::model::{DataReference, StoredVerification, VerificationEvent};
use crate::module::verification::schema::{VerificationResponse, VerificationStatus};
use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Kv(#[from] KvError),
    #[error("cache record is not valid json: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("dual write for request {request_id} left a dangling data reference: {message}")]
    Consistency { request_id: String, message: String },
}

/// TTL cache over the shared key/value store with two key families: the full
/// record under `verification:request:{id}` and a lightweight reference under
/// `verification:data:{id}`. Both are written with identical TTLs.
#[derive(Debug, Clone)]
pub struct VerificationCache {
    kv: KvStore,
    ttl_seconds: u64,
    history_limit: usize,
}

impl VerificationCache {
    pub fn new(kv: KvStore, ttl_seconds: u64, history_limit: usize) -> Self {
        Self {
            kv,
            ttl_seconds,
            history_limit,
        }
    }

    fn request_key(request_id: &str) -> String {
        format!("{REQUEST_KEY_PREFIX}{request_id}")
    }

    fn data_key(data_id: &str) -> String {
        format!("{DATA_KEY_PREFIX}{data_id}")
    }

    fn history_key(data_id: &str) -> String {
        format!("{HISTORY_KEY_PREFIX}{data_id}")
    }

    /// Writes the data-keyed reference first and the request-keyed record
    /// second. If the second write fails the reference is left dangling with
    /// the same TTL and is reconciled by the integrity audit, so the failure is
    /// surfaced as a consistency error rather than swallowed.
    pub async fn set_verification(
        &self,
        request_id: &str,
        data_id: &str,
        verification: &VerificationResponse,
    ) -> Result<(), CacheError> {
        let updated_at = Utc::now().to_rfc3339();

        let reference = DataReference {
            request_id: request_id.to_string(),
            status: verification.status,
            updated_at: updated_at.clone(),
        };
        self.kv
            .set_ex(
                &Self::data_key(data_id),
                &serde_json::to_string(&reference)?,
                self.ttl_seconds,
            )
            .await?;

        let record = StoredVerification::from_response(verification, data_id, updated_at.clone());
        self.kv
            .set_ex(
                &Self::request_key(request_id),
                &serde_json::to_string(&record)?,
                self.ttl_seconds,
            )
            .await
            .map_err(|e| CacheError::Consistency {
                request_id: request_id.to_string(),
                message: e.to_string(),
            })?;

        self.append_history(
            data_id,
            VerificationEvent {
                request_id: request_id.to_string(),
                status: verification.status,
                transaction_id: verification.transaction_id.clone(),
                timestamp: updated_at,
            },
        )
        .await;
        Ok(())
    }

    pub async fn get_verification_by_request_id(
        &self,
        request_id: &str,
    ) -> Result<Option<StoredVerification>, CacheError> {
        match self.kv.get(&Self::request_key(request_id)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Two-hop read: resolve the data reference, then follow it to the full
    /// record. Either hop missing (expired or absent) yields None.
    pub async fn get_verification_by_data_id(
        &self,
        data_id: &str,
    ) -> Result<Option<StoredVerification>, CacheError> {
        let Some(raw) = self.kv.get(&Self::data_key(data_id)).await? else {
            return Ok(None);
        };
        let reference: DataReference = serde_json::from_str(&raw)?;
        self.get_verification_by_request_id(&reference.request_id)
            .await
    }

    /// Merges a status change into an existing record. Unknown or expired
    /// request ids are silently dropped; a late webhook for an evicted record
    /// is not an error.
    pub async fn update_verification_status(
        &self,
        request_id: &str,
        status: VerificationStatus,
        transaction_id: Option<String>,
        verification_proof: Option<String>,
        extra_metadata: Option<Value>,
    ) -> Result<(), CacheError> {
        let Some(mut record) = self.get_verification_by_request_id(request_id).await? else {
            return Ok(());
        };

        let updated_at = Utc::now().to_rfc3339();
        record.status = status;
        if transaction_id.is_some() {
            record.transaction_id = transaction_id;
        }
        if verification_proof.is_some() {
            record.verification_proof = verification_proof;
        }
        if extra_metadata.is_some() {
            record.metadata = extra_metadata;
        }
        record.updated_at = updated_at.clone();

        self.kv
            .set_ex(
                &Self::request_key(request_id),
                &serde_json::to_string(&record)?,
                self.ttl_seconds,
            )
            .await?;

        if let Some(data_id) = record.data_id.clone() {
            let reference = DataReference {
                request_id: request_id.to_string(),
                status,
                updated_at: updated_at.clone(),
            };
            self.kv
                .set_ex(
                    &Self::data_key(&data_id),
                    &serde_json::to_string(&reference)?,
                    self.ttl_seconds,
                )
                .await?;
            self.append_history(
                &data_id,
                VerificationEvent {
                    request_id: request_id.to_string(),
                    status,
                    transaction_id: record.transaction_id.clone(),
                    timestamp: updated_at,
                },
            )
            .await;
        }
        Ok(())
    }

    pub async fn get_history(
        &self,
        data_id: &str,
        limit: usize,
    ) -> Result<Vec<VerificationEvent>, CacheError> {
        let Some(raw) = self.kv.get(&Self::history_key(data_id)).await? else {
            return Ok(Vec::new());
        };
        let mut events: Vec<VerificationEvent> = serde_json::from_str(&raw)?;
        events.reverse();
        events.truncate(limit);
        Ok(events)
    }

    pub async fn invalidate_data_cache(&self, data_id: &str) -> Result<(), CacheError> {
        self.kv.del(&Self::data_key(data_id)).await?;
        Ok(())
    }

    pub async fn invalidate_request_cache(&self, request_id: &str) -> Result<(), CacheError> {
        self.kv.del(&Self::request_key(request_id)).await?;
        Ok(())
    }

    // History is advisory; a failed append never fails the main write.
    async fn append_history(&self, data_id: &str, event: VerificationEvent) {
        if let Err(e) = self.try_append_history(data_id, event).await {
            warn!(data_id = %data_id, error = %e, "history append failed");
        }
    }

    async fn try_append_history(
        &self,
        data_id: &str,
        event: VerificationEvent,
    ) -> Result<(), CacheError> {
        let key = Self::history_key(data_id);
        let mut events: Vec<VerificationEvent> = match self.kv.get(&key).await? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };
        events.push(event);
        if events.len() > self.history_limit {
            let overflow = events.len() - self.history_limit;
            events.drain(..overflow);
        }
        self.kv
            .set_ex(&key, &serde_json::to_string(&events)?, self.ttl_seconds)
            .await?;
        Ok(())
    }
}
