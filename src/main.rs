//! 用户资源服务入口

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};

use user_service::infrastructure::{config::load_config, logger::Logger};
use user_service::{create_routes, AppState, Gateway};

#[derive(Debug, Parser)]
#[command(name = "user_service", about = "User resource HTTP service")]
struct Cli {
    /// 配置文件路径，缺省时依次查找 config.toml 与 ./config/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    let _log_guard = Logger::init(&config.logging)?;

    info!("Starting user service...");

    let gateway = Gateway::connect(&config.database).await.map_err(|e| {
        error!("Failed to initialize database: {}", e);
        e
    })?;

    let app = create_routes(
        AppState::new(gateway.clone()),
        Duration::from_secs(config.http.timeout_seconds),
    );

    let listener = TcpListener::bind(config.socket_address())
        .await
        .with_context(|| format!("failed to bind {}", config.socket_address()))?;
    let addr = listener.local_addr()?;

    info!("User service running on http://{}", addr);
    info!("Available endpoints:");
    info!("   GET    /                   - Hello world");
    info!("   GET    /health             - Health check");
    info!("   GET    /users/:id          - Get user");
    info!("   POST   /users/:id          - Create user");
    info!("   PUT    /users/:id          - Update user");
    info!("   DELETE /users/:id          - Delete user");
    info!("   GET    /users/search/?name - Search user by name");
    info!("   GET    /users/all/         - List all users");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    gateway.close().await;
    info!("User service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
