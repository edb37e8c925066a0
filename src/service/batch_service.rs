use crate::service::cache_service::VerificationCache;
use crate::service::metrics_service;
use crate::service::retry_service::with_retry;
use crate::service::simba_client::SimbaClient;
use crate::module::verification::schema::VerificationRequest;
use futures::future::join_all;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct QueuedVerification {
    request_id: String,
    request: VerificationRequest,
}

#[derive(Debug, Default)]
struct BatchState {
    queue: VecDeque<QueuedVerification>,
    timer: Option<JoinHandle<()>>,
    processing: bool,
}

/// Accumulates verification requests and flushes them FIFO to the provider,
/// either when the queue reaches `batch_size` or when `batch_interval` elapses
/// after the first enqueue. One flush runs at a time; items arriving during a
/// flush queue up for the next one.
pub struct BatchProcessor {
    client: Arc<SimbaClient>,
    cache: VerificationCache,
    batch_size: usize,
    batch_interval: Duration,
    retry_attempts: u32,
    retry_delay: Duration,
    state: Mutex<BatchState>,
}

impl BatchProcessor {
    pub fn new(
        client: Arc<SimbaClient>,
        cache: VerificationCache,
        batch_size: usize,
        batch_interval: Duration,
        retry_attempts: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            client,
            cache,
            batch_size: batch_size.max(1),
            batch_interval,
            retry_attempts,
            retry_delay,
            state: Mutex::new(BatchState::default()),
        }
    }

    pub fn queue_depth(&self) -> usize {
        self.state.lock().map(|s| s.queue.len()).unwrap_or(0)
    }

    /// Enqueues a request and returns its system-assigned request id
    /// immediately, before any provider call is made. The same id keys the
    /// cached result once the flush lands.
    pub fn add_to_batch(self: &Arc<Self>, request: VerificationRequest) -> String {
        let request_id = format!("req-{}", Uuid::new_v4());
        metrics_service::record_verification_submitted();

        let flush_now = {
            let Ok(mut state) = self.state.lock() else {
                error!("batch queue lock poisoned; dropping request");
                return request_id;
            };
            state.queue.push_back(QueuedVerification {
                request_id: request_id.clone(),
                request,
            });

            let at_threshold = state.queue.len() >= self.batch_size && !state.processing;
            if at_threshold {
                if let Some(timer) = state.timer.take() {
                    timer.abort();
                }
            } else if state.timer.is_none() && !state.processing {
                let processor = Arc::clone(self);
                state.timer = Some(tokio::spawn(async move {
                    sleep(processor.batch_interval).await;
                    processor.process_batch().await;
                }));
            }
            at_threshold
        };

        if flush_now {
            let processor = Arc::clone(self);
            tokio::spawn(async move {
                processor.process_batch().await;
            });
        }
        request_id
    }

    /// Forces an out-of-cycle flush, canceling any pending timer first.
    pub async fn flush_batch(self: &Arc<Self>) {
        if let Ok(mut state) = self.state.lock() {
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
        }
        self.process_batch().await;
    }

    // Returns a boxed future because the body re-spawns itself; boxing breaks
    // the `Send` auto-trait cycle through the opaque future type.
    fn process_batch(self: &Arc<Self>) -> futures::future::BoxFuture<'_, ()> {
        Box::pin(self.process_batch_inner())
    }

    async fn process_batch_inner(self: &Arc<Self>) {
        let batch = {
            let Ok(mut state) = self.state.lock() else {
                return;
            };
            if state.queue.is_empty() || state.processing {
                return;
            }
            state.processing = true;
            state.timer = None;
            let take = self.batch_size.min(state.queue.len());
            state.queue.drain(..take).collect::<Vec<_>>()
        };

        let batch_id = Uuid::new_v4();
        let total = batch.len();
        let results = join_all(batch.into_iter().map(|item| self.process_item(item))).await;
        let failed = results.iter().filter(|ok| !**ok).count();

        metrics_service::record_batch_flushed();
        info!(batch_id = %batch_id, total, failed, "batch processed");

        let Ok(mut state) = self.state.lock() else {
            return;
        };
        state.processing = false;
        if !state.queue.is_empty() && state.timer.is_none() {
            let processor = Arc::clone(self);
            state.timer = Some(tokio::spawn(async move {
                sleep(processor.batch_interval).await;
                processor.process_batch().await;
            }));
        }
    }

    // Per-item failures are logged and counted, never fatal to the batch.
    async fn process_item(&self, item: QueuedVerification) -> bool {
        let response = with_retry(self.retry_attempts, self.retry_delay, || {
            self.client.verify_data(&item.request)
        })
        .await;

        match response {
            Ok(mut response) => {
                // The enqueue-assigned id is the join key for cache and
                // webhook updates, whatever id the provider echoed back.
                response.request_id = item.request_id.clone();
                match self
                    .cache
                    .set_verification(&item.request_id, &item.request.data_id, &response)
                    .await
                {
                    Ok(()) => {
                        metrics_service::record_batch_item_ok();
                        true
                    }
                    Err(e) => {
                        metrics_service::record_batch_item_failed();
                        error!(request_id = %item.request_id, data_id = %item.request.data_id, error = %e, "caching verification result failed");
                        false
                    }
                }
            }
            Err(e) => {
                metrics_service::record_batch_item_failed();
                warn!(request_id = %item.request_id, data_id = %item.request.data_id, error = %e, "batch item verification failed");
                false
            }
        }
    }
}
