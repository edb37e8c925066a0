use crate::infra::{KvError, KvStore, COSTS_LEDGER_KEY};
use crate::module::verification::schema::DataType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::warn;

/// One append-only ledger row. `batch_size` is the number of requests
/// amortized into this cost, when the verification went out in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationCost {
    #[serde(alias = "transactionId")]
    pub transaction_id: String,
    #[serde(alias = "dataId")]
    pub data_id: String,
    #[serde(alias = "dataType")]
    pub data_type: DataType,
    pub timestamp: String,
    pub cost: f64,
    #[serde(alias = "batchSize", skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
}

/// Ledger of per-verification blockchain cost. Held in memory, loaded from the
/// shared key/value store at construction and written back on every mutation,
/// so the ledger survives restarts and is shared across instances pointing at
/// the same store.
pub struct CostTracker {
    kv: KvStore,
    baseline_per_item: Option<f64>,
    costs: Mutex<Vec<VerificationCost>>,
}

impl CostTracker {
    pub async fn load(kv: KvStore, baseline_per_item: Option<f64>) -> Self {
        let costs = match kv.get(COSTS_LEDGER_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "cost ledger is corrupt; starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "cost ledger load failed; starting empty");
                Vec::new()
            }
        };
        Self {
            kv,
            baseline_per_item,
            costs: Mutex::new(costs),
        }
    }

    /// Appends a row and persists the snapshot before releasing the ledger
    /// lock, so concurrent appends cannot write their snapshots out of order
    /// and transiently drop the newer row from the store.
    pub async fn track_cost(&self, row: VerificationCost) -> Result<(), KvError> {
        let mut costs = self.costs.lock().await;
        costs.push(row);
        let snapshot = serde_json::to_string(&*costs)?;
        self.kv.set(COSTS_LEDGER_KEY, &snapshot).await
    }

    pub async fn total_cost(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> f64 {
        self.costs
            .lock()
            .await
            .iter()
            .filter(|row| in_window(row, start, end))
            .map(|row| row.cost)
            .sum()
    }

    /// Per-type totals over the same window; a type appears only if at least
    /// one row carries it.
    pub async fn costs_by_type(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> HashMap<String, f64> {
        let mut grouped = HashMap::new();
        for row in self
            .costs
            .lock()
            .await
            .iter()
            .filter(|row| in_window(row, start, end))
        {
            *grouped.entry(row.data_type.as_str().to_string()).or_insert(0.0) += row.cost;
        }
        grouped
    }

    /// Savings attributable to batching, over rows with batch_size > 1. With a
    /// configured per-item baseline this is a real estimate; without one the
    /// per-item cost is derived from the batched cost itself, which makes
    /// potential and actual cancel out (retained source behavior, see
    /// DESIGN.md).
    pub async fn batching_savings(&self) -> f64 {
        let costs = self.costs.lock().await;
        let mut potential = 0.0;
        let mut actual = 0.0;
        for row in costs.iter() {
            let Some(batch_size) = row.batch_size.filter(|n| *n > 1) else {
                continue;
            };
            let per_item = self
                .baseline_per_item
                .unwrap_or(row.cost / f64::from(batch_size));
            potential += per_item * f64::from(batch_size);
            actual += row.cost;
        }
        potential - actual
    }

    pub async fn clear_costs(&self) -> Result<(), KvError> {
        let mut costs = self.costs.lock().await;
        costs.clear();
        self.kv.set(COSTS_LEDGER_KEY, "[]").await
    }

    pub async fn len(&self) -> usize {
        self.costs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn in_window(
    row: &VerificationCost,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> bool {
    let Ok(ts) = DateTime::parse_from_rfc3339(&row.timestamp) else {
        // Rows with unreadable timestamps only count in unbounded queries.
        return start.is_none() && end.is_none();
    };
    let ts = ts.with_timezone(&Utc);
    if start.is_some_and(|s| ts < s) {
        return false;
    }
    if end.is_some_and(|e| ts > e) {
        return false;
    }
    true
}
