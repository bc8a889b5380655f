use anyhow::{Context, Result};
use clap::Parser;
use gigafy_relay::ai::{ImageGenerationService, ReplicateImageClient};
use gigafy_relay::models::Config;
use gigafy_relay::server::{self, AppState};
use gigafy_relay::tunnel::Tunnel;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "gigafy-relay")]
#[command(about = "Serve the gigafy image transformation API")]
struct CliArgs {
    /// Port to listen on (overrides PORT).
    #[arg(long)]
    port: Option<u16>,

    /// Do not open a public tunnel.
    #[arg(long)]
    no_tunnel: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    let mut config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gigafy_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(port) = args.port {
        config.port = port;
    }
    if args.no_tunnel {
        config.tunnel.enabled = false;
    }

    let generator = ReplicateImageClient::from_config(&config)?
        .map(|client| Arc::new(client) as Arc<dyn ImageGenerationService>);
    if generator.is_none() {
        warn!("REPLICATE_API_TOKEN is not set; /api/gigafy will fail until it is configured");
    } else {
        info!("Image model: {}", config.model);
    }

    let port = config.port;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let tunnel = if config.tunnel.enabled {
        match Tunnel::open(&config.tunnel, port).await {
            Ok(tunnel) => Some(tunnel),
            Err(e) => {
                warn!("Public tunnel unavailable, serving locally only: {}", e);
                None
            }
        }
    } else {
        None
    };

    print_banner(port, tunnel.as_ref().map(Tunnel::public_url));

    let app = server::router(AppState::new(config, generator));
    info!("listening on http://{}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(server::shutdown_signal())
        .await
        .context("Server error");

    if let Some(tunnel) = tunnel {
        tunnel.close().await;
    }

    served
}

fn print_banner(port: u16, public_url: Option<&str>) {
    let rule = "=".repeat(60);
    println!("\n{}", rule);
    println!("  Gigafy backend is LIVE");
    println!("  Local:  http://localhost:{}", port);
    if let Some(url) = public_url {
        println!("  Public: {}", url);
    }
    println!("{}", rule);
    if let Some(url) = public_url {
        println!("\n  Set this in .env.local for your Next.js frontend:");
        println!("  NEXT_PUBLIC_API_URL={}\n", url);
    }
}
