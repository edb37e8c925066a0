use redis::AsyncCommands;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("kv store lock poisoned")]
    Poisoned,
    #[error("kv encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// TTL-capable key/value backend. Redis when a REDIS_URL is configured,
/// otherwise an in-process map with the same expiry semantics.
#[derive(Debug, Clone)]
pub enum KvStore {
    Redis(redis::Client),
    Memory(MemoryStore),
}

impl KvStore {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::default())
    }

    pub fn connect_redis(url: &str) -> Result<Self, KvError> {
        Ok(Self::Redis(redis::Client::open(url)?))
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        match self {
            Self::Redis(client) => {
                let mut conn = client.get_multiplexed_async_connection().await?;
                Ok(conn.get(key).await?)
            }
            Self::Memory(store) => store.get(key),
        }
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        match self {
            Self::Redis(client) => {
                let mut conn = client.get_multiplexed_async_connection().await?;
                let _: () = conn.set(key, value).await?;
                Ok(())
            }
            Self::Memory(store) => store.set(key, value, None),
        }
    }

    pub async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), KvError> {
        match self {
            Self::Redis(client) => {
                let mut conn = client.get_multiplexed_async_connection().await?;
                let _: () = conn.set_ex(key, value, ttl_seconds).await?;
                Ok(())
            }
            Self::Memory(store) => store.set(key, value, Some(Duration::from_secs(ttl_seconds))),
        }
    }

    pub async fn del(&self, key: &str) -> Result<(), KvError> {
        match self {
            Self::Redis(client) => {
                let mut conn = client.get_multiplexed_async_connection().await?;
                let _: usize = conn.del(key).await?;
                Ok(())
            }
            Self::Memory(store) => store.del(key),
        }
    }

    /// Keys matching a `prefix:*` pattern. The verification namespaces stay in
    /// the tens, so a scan is acceptable here.
    pub async fn keys(&self, pattern: &str) -> Result<Vec<String>, KvError> {
        match self {
            Self::Redis(client) => {
                let mut conn = client.get_multiplexed_async_connection().await?;
                Ok(conn.keys(pattern).await?)
            }
            Self::Memory(store) => store.keys(pattern),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, MemoryEntry>>>,
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

impl MemoryStore {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, MemoryEntry>>, KvError> {
        self.entries.lock().map_err(|_| KvError::Poisoned)
    }

    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some(entry) if entry.expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), KvError> {
        let mut entries = self.lock()?;
        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: ttl.map(|d| Instant::now() + d),
            },
        );
        Ok(())
    }

    fn del(&self, key: &str) -> Result<(), KvError> {
        let mut entries = self.lock()?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self, pattern: &str) -> Result<Vec<String>, KvError> {
        let prefix = pattern.strip_suffix('*').unwrap_or(pattern);
        let mut entries = self.lock()?;
        entries.retain(|_, entry| !entry.expired());
        Ok(entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
