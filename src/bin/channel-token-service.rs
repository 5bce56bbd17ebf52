use std::sync::Arc;

use anyhow::Result;
use channel_token_service::builder::AccessTokenBuilder;
use channel_token_service::observability::service_resources_metrics::collect_process_metrics;
use channel_token_service::secrets::{self, SecretStoreKind};
use channel_token_service::server;
use channel_token_service::utils::config_loader::{self, ConfigOverrides};
use channel_token_service::utils::constants::DEFAULT_CONFIG_PATH;
use channel_token_service::utils::logging::{self, LogLevel};
use channel_token_service::TokenDispatcher;
use clap::Parser;
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
    #[arg(long, env = "SECRET_NAME")]
    secret_name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Make preparations
    //
    // load .env (development secrets), read args/env
    // -------------------------------

    let dotenv = dotenvy::dotenv();
    let args = Args::parse();

    // -------------------------------
    // 2. Load YAML config
    // -------------------------------

    let overrides = ConfigOverrides {
        port: args.port,
        secret_name: args.secret_name.to_owned(),
    };
    let service_config = config_loader::run(&args.config, &overrides).await?;
    logging::run(&service_config, args.log_level);

    if dotenv.is_err() {
        info!("No .env file found");
    }

    // -------------------------------
    // 3. Fetch credentials; no request is served without them
    // -------------------------------

    let store = SecretStoreKind::from_config(&service_config.secrets.store);
    info!("loading secret '{}' from {} store", service_config.secrets.name, store.kind());
    let credentials = secrets::initialize(&store, &service_config.secrets.name).await?;

    // -------------------------------
    // 4. Wire the dispatcher
    // -------------------------------

    let dispatcher = TokenDispatcher::new(Arc::new(credentials), Arc::new(AccessTokenBuilder));

    // -------------------------------
    // 5. Start http server and resource metrics
    // -------------------------------

    if service_config.settings.metrics.is_enabled {
        tokio::spawn(async {
            if let Err(e) = collect_process_metrics().await {
                error!("process metrics collection stopped: {}", e);
            }
        });
    }

    info!("Service starting...");
    server::server::start(&service_config.settings, dispatcher).await
}
