use simba_gateway::app::{build_router, AppState};
use simba_gateway::config::environment::AppConfig;
use simba_gateway::infra::init_infra;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    init_logging();

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "config error");
            std::process::exit(1);
        }
    };

    let bind_addr = format!("{}:{}", config.api_host, config.api_port);
    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(error = %e, bind_addr = %bind_addr, "server bind error");
            std::process::exit(1);
        }
    };

    info!(
        env = %config.rust_env,
        host = %config.api_host,
        port = config.api_port,
        simba_api_endpoint = %config.simba_api_endpoint,
        batch_size = config.batch_size,
        batch_interval_ms = config.batch_interval_ms,
        "simba-gateway started"
    );

    let kv = match init_infra(&config) {
        Ok(kv) => kv,
        Err(e) => {
            error!(error = %e, "infra init failed");
            std::process::exit(1);
        }
    };

    let state = match AppState::new(config, kv).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "app state init failed");
            std::process::exit(1);
        }
    };

    let app = build_router(state);
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server runtime error");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
