//! vegd — vegvisir demo host.
//!
//! Hosts the stub Seats and Horn services through the factories and a
//! [`ServiceRuntime`](vegvisir::ServiceRuntime), shutting both down
//! gracefully on ctrl-c. Useful as an integration target: every RPC
//! answers `UNIMPLEMENTED`, which `vegq` treats as the expected probe
//! result.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vegvisir::demo::proto::horn_server::HornServer;
use vegvisir::demo::proto::seats_server::SeatsServer;
use vegvisir::demo::{self, UnimplementedHorn, UnimplementedSeats};
use vegvisir::{Config, Middleware, ServerFactory, ServiceRuntime};

/// Vegvisir demo host — serves stub Seats and Horn services.
#[derive(Parser)]
#[command(name = "vegd")]
#[command(version)]
#[command(about = "Vegvisir demo service host")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // With no config file, resolution falls back to environment
    // conventions (<NAME>_ADDRESS, sidecar port).
    let middleware = match &args.config {
        Some(path) => Middleware::from_config(&Config::load(Some(path))?)?,
        None => Middleware::from_env(),
    };

    let runtime = ServiceRuntime::new();

    let seats = ServerFactory::create(
        &demo::seats_descriptor(),
        &middleware,
        SeatsServer::new(UnimplementedSeats),
    )
    .await?;
    info!(address = %seats.local_addr(), "seats stub listening");
    runtime.register(seats).await;

    let horn = ServerFactory::create(
        &demo::horn_descriptor(),
        &middleware,
        HornServer::new(UnimplementedHorn),
    )
    .await?;
    info!(address = %horn.local_addr(), "horn stub listening");
    runtime.register(horn).await;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            runtime.shutdown_all(true).await;
        }
        result = runtime.wait_all() => result?,
    }

    runtime.wait_all().await?;
    middleware.shutdown();

    Ok(())
}
