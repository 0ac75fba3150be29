//! Development proxy binary.

use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leadcall_dev_proxy::{router, ProxyConfig, DEFAULT_UPSTREAM};

#[derive(Debug, Parser)]
#[command(name = "leadcall-dev-proxy", about = "Forward CRM backend paths to the real origin")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    listen: SocketAddr,

    /// Upstream origin to forward to
    #[arg(long, default_value = DEFAULT_UPSTREAM)]
    upstream: String,

    /// Skip upstream TLS certificate verification
    #[arg(long)]
    insecure: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = ProxyConfig { upstream: args.upstream.clone(), insecure: args.insecure };
    let app = router(&config)?;

    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    tracing::info!(listen = %args.listen, upstream = %args.upstream, "dev proxy listening");
    axum::serve(listener, app).await?;
    Ok(())
}
