use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackCostResponse {
    pub success: bool,
    pub count: usize,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostSummaryResponse {
    pub success: bool,
    pub total_cost: f64,
    pub costs_by_type: HashMap<String, f64>,
    pub batching_savings: f64,
    pub count: usize,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearCostsResponse {
    pub success: bool,
    pub error_code: Option<String>,
    pub reason: String,
}
