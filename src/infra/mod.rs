pub mod kv;

pub use kv::{KvError, KvStore};

use crate::config::environment::AppConfig;
use tracing::warn;

pub const REQUEST_KEY_PREFIX: &str = "verification:request:";
pub const DATA_KEY_PREFIX: &str = "verification:data:";
pub const HISTORY_KEY_PREFIX: &str = "verification:history:";
pub const BACKUP_KEY_PREFIX: &str = "backup:";
pub const COSTS_LEDGER_KEY: &str = "costs:ledger";

pub fn init_infra(config: &AppConfig) -> Result<KvStore, String> {
    match &config.redis_url {
        Some(url) => KvStore::connect_redis(url).map_err(|e| format!("redis init failed: {e}")),
        None => {
            warn!("REDIS_URL not set; falling back to in-process key/value store");
            Ok(KvStore::memory())
        }
    }
}
