//! Relay startup configuration: command line flags and the capacity prompt.

use clap::Parser;
use log::debug;
use shared::{MAX_PLAYERS, MIN_PLAYERS};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Parser, Debug)]
#[command(author, version, about = "Pong state relay", long_about = None)]
pub struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Number of players; prompted for on stdin when omitted
    #[arg(short = 'n', long)]
    pub players: Option<String>,

    /// Delay between relay polling passes, in milliseconds
    #[arg(long, default_value = "10")]
    pub poll_ms: u64,
}

impl Args {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms.max(1))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid input {0:?}: expected a number")]
    NotANumber(String),

    #[error(
        "invalid number of players {0}: expected {min}..={max}",
        min = MIN_PLAYERS,
        max = MAX_PLAYERS
    )]
    OutOfRange(usize),

    #[error("could not read player count: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses a player count, accepting only plain digits within the supported range.
pub fn parse_capacity(input: &str) -> Result<usize, ConfigError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::NotANumber(trimmed.to_string()));
    }

    // Digits only, so the only failure left is overflow
    let count: usize = trimmed
        .parse()
        .map_err(|_| ConfigError::OutOfRange(usize::MAX))?;

    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
        return Err(ConfigError::OutOfRange(count));
    }
    Ok(count)
}

/// Asks for the player count on stdin.
pub async fn prompt_capacity() -> Result<usize, ConfigError> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"Enter number of players:").await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    debug!("Read player count input {:?}", line);

    parse_capacity(&line)
}
