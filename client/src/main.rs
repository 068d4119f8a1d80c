use clap::Parser;
use client::network::{Client, DEFAULT_FEE};
use log::{error, info};
use shared::{Protocol, ResponseKind, DEFAULT_PORT};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 'a', long, default_value_t = format!("127.0.0.1:{}", DEFAULT_PORT))]
    addr: String,

    /// Fee paid for the initial round
    #[arg(short = 'f', long, default_value_t = DEFAULT_FEE)]
    fee: u64,

    /// Timeout in seconds for a whole play
    #[arg(short = 't', long, default_value = "10")]
    timeout: u64,

    /// Number of plays, one connection each
    #[arg(short = 'n', long, default_value = "1")]
    plays: u32,

    /// Wire protocol (plain, bincode)
    #[arg(short = 'p', long, default_value = "plain")]
    protocol: Protocol,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let client = Client::new(&args.addr)
        .with_protocol(args.protocol)
        .with_timeout(Duration::from_secs(args.timeout));

    let mut winnings = 0u64;
    for _ in 0..args.plays {
        let resp = client.play(args.fee).await.map_err(|e| {
            error!("Play failed: {}", e);
            e
        })?;

        if resp.kind == ResponseKind::Win {
            info!("You won {}!", resp.jackpot);
            winnings = winnings.saturating_add(resp.jackpot);
        }
    }

    if args.plays > 1 {
        info!(
            "{} plays, {} paid in fees, {} won",
            args.plays,
            args.fee.saturating_mul(args.plays as u64),
            winnings
        );
    }

    Ok(())
}
