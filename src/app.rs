use crate::config::environment::AppConfig;
use crate::infra::KvStore;
use crate::module::admin::route::register_admin_routes;
use crate::module::costs::route::register_cost_routes;
use crate::module::identity::route::register_identity_routes;
use crate::module::verification::route::register_verification_routes;
use crate::service::backup_service::VerificationBackup;
use crate::service::batch_service::BatchProcessor;
use crate::service::cache_service::VerificationCache;
use crate::service::cost_service::CostTracker;
use crate::service::identity_service::IdentityVerifier;
use crate::service::simba_client::SimbaClient;
use axum::http::Method;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub kv: KvStore,
    pub client: Arc<SimbaClient>,
    pub cache: VerificationCache,
    pub batch: Arc<BatchProcessor>,
    pub costs: Arc<CostTracker>,
    pub backup: VerificationBackup,
    pub identity: Arc<IdentityVerifier>,
}

impl AppState {
    pub async fn new(config: AppConfig, kv: KvStore) -> Result<Self, String> {
        let client = Arc::new(
            SimbaClient::new(&config).map_err(|e| format!("simba client init failed: {e}"))?,
        );
        let cache = VerificationCache::new(
            kv.clone(),
            config.verification_ttl_seconds,
            config.history_limit,
        );
        let batch = Arc::new(BatchProcessor::new(
            Arc::clone(&client),
            cache.clone(),
            config.batch_size,
            Duration::from_millis(config.batch_interval_ms),
            config.retry_attempts,
            Duration::from_millis(config.retry_delay_ms),
        ));
        let costs = Arc::new(CostTracker::load(kv.clone(), config.cost_baseline_per_item).await);
        let backup = VerificationBackup::new(
            kv.clone(),
            Arc::clone(&client),
            config.verification_ttl_seconds,
        );
        let identity = Arc::new(
            IdentityVerifier::new(&config, Arc::clone(&client))
                .map_err(|e| format!("identity verifier init failed: {e}"))?,
        );
        Ok(Self {
            config,
            kv,
            client,
            cache,
            batch,
            costs,
            backup,
            identity,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse().expect("valid origin"),
            "http://127.0.0.1:3000".parse().expect("valid origin"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .merge(register_verification_routes(state.clone()))
        .merge(register_identity_routes(state.clone()))
        .merge(register_cost_routes(state.clone()))
        .merge(register_admin_routes(state))
        .layer(cors)
}
