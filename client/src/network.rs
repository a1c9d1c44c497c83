//! Participant side of the relay connection

use crate::game::GameState;
use log::{debug, info, warn};
use shared::{
    decode, encode, read_frame, sanitize_display_name, write_frame, ParticipantId, Report, Snapshot,
    WireError,
};
use thiserror::Error;
use tokio::net::TcpStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    #[error("relay closed the connection")]
    RelayClosed,

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// One TCP connection to the relay, used strictly request/response.
pub struct Channel {
    stream: TcpStream,
    id: ParticipantId,
}

impl Channel {
    pub async fn connect(addr: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| ClientError::Connect {
                addr: addr.to_string(),
                source,
            })?;
        stream.set_nodelay(true)?;

        // The relay keys us by the port it sees, which is our local one
        let id = ParticipantId::from(stream.local_addr()?.port());
        info!("Connected to {} as participant {}", addr, id);

        Ok(Self { stream, id })
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Sends one report and waits for the snapshot answering it.
    pub async fn exchange(&mut self, report: &Report) -> Result<Snapshot, ClientError> {
        let payload = encode(report)?;
        write_frame(&mut self.stream, &payload).await?;

        match read_frame(&mut self.stream).await? {
            Some(reply) => Ok(decode(&reply)?),
            None => Err(ClientError::RelayClosed),
        }
    }
}

/// A connected participant: the relay channel plus the local game view.
pub struct Client {
    channel: Channel,
    game: GameState,
}

impl Client {
    /// Connects and prepares a game view named `name`, or `Player <id>`.
    ///
    /// Names are sanitized and capped so every snapshot the relay builds
    /// stays within the message size limit.
    pub async fn connect(addr: &str, name: Option<String>) -> Result<Self, ClientError> {
        let channel = Channel::connect(addr).await?;
        let id = channel.id();
        let name = name
            .map(|requested| {
                let name = sanitize_display_name(&requested);
                if name != requested {
                    warn!("Display name shortened to {:?}", name);
                }
                name
            })
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("Player {}", id));

        let game = GameState::new(id, name, &mut rand::thread_rng());

        Ok(Self { channel, game })
    }

    pub fn id(&self) -> ParticipantId {
        self.channel.id()
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut GameState {
        &mut self.game
    }

    /// One round trip with the relay followed by the local update.
    pub async fn tick(&mut self) -> Result<(), ClientError> {
        let report = self.game.build_report();
        let snapshot = self.channel.exchange(&report).await?;
        debug!(
            "Snapshot with {}/{} players",
            snapshot.players.len(),
            snapshot.max_players
        );

        self.game.apply_snapshot(snapshot);
        self.game.advance(&mut rand::thread_rng());
        Ok(())
    }
}
