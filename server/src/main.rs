use clap::Parser;
use log::{error, info};
use server::config::{self, Args};
use server::network::Relay;

/// Parses arguments, asks for the player count if needed, then runs the relay
/// until it fails or Ctrl+C is pressed.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let capacity = tokio::select! {
        result = async {
            match &args.players {
                Some(players) => config::parse_capacity(players),
                None => config::prompt_capacity().await,
            }
        } => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, stopping relay");
            std::process::exit(1);
        }
    };

    let capacity = match capacity {
        Ok(capacity) => capacity,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let mut relay = Relay::bind(&args.address(), capacity, args.poll_interval()).await?;

    tokio::select! {
        result = relay.run() => {
            if let Err(e) = result {
                error!("Relay stopped: {}", e);
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, stopping relay");
            std::process::exit(1);
        }
    }

    Ok(())
}
