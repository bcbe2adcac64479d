//! 交互式客户端入口

use clap::Parser;
use std::io;
use tracing_subscriber::EnvFilter;

use user_service::client::{prompt::Prompter, ApiClient, Session};

#[derive(Debug, Parser)]
#[command(name = "user_client", about = "Interactive client for the user service")]
struct Cli {
    /// 服务地址
    #[arg(long, env = "USER_SERVICE_URL", default_value = "http://backend:8000")]
    base_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 客户端日志写到 stderr，避免和交互输出混在一起
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let client = ApiClient::new(cli.base_url);
    let prompter = Prompter::new(io::stdin().lock(), io::stdout());

    Session::new(client, prompter).run().await?;
    Ok(())
}
