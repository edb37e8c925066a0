use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static VERIFICATIONS_SUBMITTED: AtomicU64 = AtomicU64::new(0);
static BATCHES_FLUSHED: AtomicU64 = AtomicU64::new(0);
static BATCH_ITEMS_OK: AtomicU64 = AtomicU64::new(0);
static BATCH_ITEMS_FAILED: AtomicU64 = AtomicU64::new(0);
static WEBHOOKS_ACCEPTED: AtomicU64 = AtomicU64::new(0);
static WEBHOOKS_REJECTED: AtomicU64 = AtomicU64::new(0);

pub fn record_verification_submitted() {
    VERIFICATIONS_SUBMITTED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_batch_flushed() {
    BATCHES_FLUSHED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_batch_item_ok() {
    BATCH_ITEMS_OK.fetch_add(1, Ordering::Relaxed);
}

pub fn record_batch_item_failed() {
    BATCH_ITEMS_FAILED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_webhook_accepted() {
    WEBHOOKS_ACCEPTED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_webhook_rejected() {
    WEBHOOKS_REJECTED.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub verifications_submitted: u64,
    pub batches_flushed: u64,
    pub batch_items_ok: u64,
    pub batch_items_failed: u64,
    pub webhooks_accepted: u64,
    pub webhooks_rejected: u64,
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        verifications_submitted: VERIFICATIONS_SUBMITTED.load(Ordering::Relaxed),
        batches_flushed: BATCHES_FLUSHED.load(Ordering::Relaxed),
        batch_items_ok: BATCH_ITEMS_OK.load(Ordering::Relaxed),
        batch_items_failed: BATCH_ITEMS_FAILED.load(Ordering::Relaxed),
        webhooks_accepted: WEBHOOKS_ACCEPTED.load(Ordering::Relaxed),
        webhooks_rejected: WEBHOOKS_REJECTED.load(Ordering::Relaxed),
    }
}
