//! Headless participant that reports nothing and prints what the relay sees.

use clap::Parser;
use log::{error, info, warn};
use shared::{decode, encode, elect_primary, read_frame, write_frame, Report, Snapshot};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::sleep;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect a running pong relay", long_about = None)]
struct Args {
    /// Relay address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Number of empty reports to send
    #[arg(short, long, default_value = "10")]
    count: u32,

    /// Delay between reports, in milliseconds
    #[arg(short, long, default_value = "1000")]
    interval: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut stream = match TcpStream::connect(&args.server).await {
        Ok(stream) => stream,
        Err(e) => {
            error!("Couldn't connect to relay at {}: {}", args.server, e);
            std::process::exit(1);
        }
    };
    info!(
        "Probe connected to {} as participant {}",
        args.server,
        stream.local_addr()?.port()
    );

    let request = encode(&Report::default())?;

    for i in 0..args.count {
        write_frame(&mut stream, &request).await?;

        let payload = match read_frame(&mut stream).await? {
            Some(payload) => payload,
            None => {
                warn!("Relay closed the connection");
                break;
            }
        };

        let snapshot: Snapshot = decode(&payload)?;
        info!(
            "Snapshot {}: {}/{} players, primary {:?}",
            i + 1,
            snapshot.players.len(),
            snapshot.max_players,
            elect_primary(&snapshot.players).map(|id| id.to_string())
        );

        for (id, report) in &snapshot.players {
            match &report.paddle {
                Some(paddle) => info!(
                    "  {}: {} paddle at {:?} vel {} running={:?} primary={:?}",
                    id,
                    paddle.slot,
                    paddle.position,
                    paddle.velocity,
                    report.running,
                    report.primary
                ),
                None => info!("  {}: no paddle", id),
            }
            if let Some(ball) = &report.ball {
                info!("    ball pos={:?} vel={:?}", ball.position, ball.velocity);
            }
        }

        sleep(Duration::from_millis(args.interval)).await;
    }

    info!("Probe finished");
    Ok(())
}
