pub mod backup_service;
pub mod batch_service;
pub mod cache_service;
pub mod cost_service;
pub mod identity_service;
pub mod metrics_service;
pub mod retry_service;
pub mod signature_service;
pub mod simba_client;
pub mod validation_service;
