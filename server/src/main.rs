use clap::Parser;
use log::{error, info};
use server::game::Game;
use server::network::{Server, ServerConfig, DEFAULT_WORKERS};
use server::supply::{SupplyKind, DEFAULT_SUPPLY_LEN};
use shared::{Protocol, DEFAULT_PORT};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Listen address
    #[arg(short = 'a', long, default_value_t = format!("0.0.0.0:{}", DEFAULT_PORT))]
    addr: String,

    /// Connection timeout in seconds, covering the bonus round too
    #[arg(short = 't', long, default_value = "5")]
    timeout: u64,

    /// Number of workers (defaults to the number of CPUs)
    #[arg(short = 'w', long)]
    workers: Option<usize>,

    /// Winning pair container type (ring, list)
    #[arg(short = 'c', long, default_value = "list")]
    container: SupplyKind,

    /// Number of winning pairs held by the container
    #[arg(long, default_value_t = DEFAULT_SUPPLY_LEN)]
    pairs: usize,

    /// Wire protocol (plain, bincode)
    #[arg(short = 'p', long, default_value = "plain")]
    protocol: Protocol,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let supply = args.container.build(args.pairs).map_err(|e| {
        error!("Failed to initialize {} pair container: {}", args.container, e);
        e
    })?;
    info!(
        "Using {} pair container with {} pairs",
        args.container, args.pairs
    );

    let workers = args.workers.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(DEFAULT_WORKERS)
    });

    let config = ServerConfig {
        addr: args.addr,
        timeout: Duration::from_secs(args.timeout),
        workers,
        protocol: args.protocol,
    };

    let server = Server::bind(config, Game::new(supply)).await?;

    server
        .run(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C, shutting down gracefully..."),
                Err(e) => {
                    error!("Failed to listen for Ctrl+C: {}", e);
                    std::future::pending::<()>().await
                }
            }
        })
        .await;

    Ok(())
}
