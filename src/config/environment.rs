use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rust_env: String,
    pub api_host: String,
    pub api_port: u16,
    pub redis_url: Option<String>,
    pub simba_api_key: String,
    pub simba_api_endpoint: String,
    pub simba_webhook_secret: String,
    pub auth_endpoint: String,
    pub verification_ttl_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub batch_size: usize,
    pub batch_interval_ms: u64,
    pub cost_baseline_per_item: Option<f64>,
    pub history_limit: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        load_dotenv_layers();
        Ok(Self {
            rust_env: read_var("RUST_ENV")?,
            api_host: read_var("API_HOST")?,
            api_port: read_var("API_PORT")?
                .parse::<u16>()
                .map_err(|e| format!("invalid API_PORT: {e}"))?,
            redis_url: env::var("REDIS_URL").ok(),
            simba_api_key: read_var("SIMBA_API_KEY")?,
            simba_api_endpoint: read_var("SIMBA_API_ENDPOINT")?,
            simba_webhook_secret: read_var("SIMBA_WEBHOOK_SECRET")?,
            auth_endpoint: read_optional_string(
                "DEAF_AUTH_ENDPOINT",
                "https://api.deafauth.mbtquniverse.com",
            ),
            verification_ttl_seconds: read_optional_u64("VERIFICATION_TTL_SECONDS", 86400)?,
            retry_attempts: read_optional_u64("RETRY_ATTEMPTS", 3)? as u32,
            retry_delay_ms: read_optional_u64("RETRY_DELAY_MS", 1000)?,
            batch_size: read_optional_u64("BATCH_SIZE", 10)? as usize,
            batch_interval_ms: read_optional_u64("BATCH_INTERVAL_MS", 5000)?,
            cost_baseline_per_item: read_optional_f64("COST_BASELINE_PER_ITEM")?,
            history_limit: read_optional_u64("HISTORY_LIMIT", 50)? as usize,
        })
    }
}

fn read_var(key: &str) -> Result<String, String> {
    env::var(key).map_err(|_| format!("missing required env var: {key}"))
}

fn read_optional_u64(key: &str, default: u64) -> Result<u64, String> {
    match env::var(key) {
        Ok(v) => v.parse::<u64>().map_err(|e| format!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

fn read_optional_f64(key: &str) -> Result<Option<f64>, String> {
    match env::var(key) {
        Ok(v) => v
            .parse::<f64>()
            .map(Some)
            .map_err(|e| format!("invalid {key}: {e}")),
        Err(_) => Ok(None),
    }
}

fn read_optional_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn load_dotenv_layers() {
    for path in [".env", "../.env", "../../.env"] {
        let _ = dotenvy::from_path_override(path);
    }
}
