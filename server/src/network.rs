//! Relay network layer: connection handling and the directory control loop

use crate::directory::StateDirectory;
use log::{debug, error, info, warn};
use shared::{decode, encode, read_frame, write_frame, ParticipantId, Report};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Messages sent from connection tasks to the control loop
#[derive(Debug)]
pub enum RelayEvent {
    FrameReceived {
        id: ParticipantId,
        payload: Vec<u8>,
    },
    Closed {
        id: ParticipantId,
    },
}

/// Everything the control loop owns besides the listener
struct RelayState {
    directory: StateDirectory,
    outboxes: HashMap<ParticipantId, mpsc::UnboundedSender<Vec<u8>>>,
    events_tx: mpsc::UnboundedSender<RelayEvent>,
    events_rx: mpsc::UnboundedReceiver<RelayEvent>,
}

/// State relay fanning the participant directory back to every reporter
pub struct Relay {
    listener: TcpListener,
    poll_interval: Duration,
    state: RelayState,
}

impl Relay {
    pub async fn bind(
        addr: &str,
        capacity: usize,
        poll_interval: Duration,
    ) -> Result<Self, RelayError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| RelayError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        info!(
            "Relay listening on {} for {} players",
            listener.local_addr()?,
            capacity
        );

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(Relay {
            listener,
            poll_interval,
            state: RelayState {
                directory: StateDirectory::new(capacity),
                outboxes: HashMap::new(),
                events_tx,
                events_rx,
            },
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RelayError> {
        Ok(self.listener.local_addr()?)
    }

    /// Main relay loop
    ///
    /// Accepts connections as they arrive and, on a fixed cadence, folds
    /// every pending report into the directory and answers it. Only this
    /// loop touches the directory.
    pub async fn run(&mut self) -> Result<(), RelayError> {
        let mut poll = interval(self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Relay started");

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => self.state.on_accept(stream, addr),
                        Err(e) => error!("Failed to accept connection: {}", e),
                    }
                },

                _ = poll.tick() => {
                    self.state.drain_events();
                },
            }
        }
    }
}

impl RelayState {
    fn on_accept(&mut self, stream: TcpStream, addr: SocketAddr) {
        info!("{} has connected", addr);

        let id = ParticipantId::from(addr.port());
        if let Err(refusal) = self.directory.register(id) {
            // Dropping the stream closes the connection
            warn!("Refusing {}: {}", addr, refusal);
            return;
        }

        if let Err(e) = stream.set_nodelay(true) {
            debug!("Could not disable Nagle for {}: {}", addr, e);
        }

        let (reader, writer) = stream.into_split();
        let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();

        spawn_connection_reader(id, reader, self.events_tx.clone());
        spawn_connection_writer(id, writer, outbox_rx);
        self.outboxes.insert(id, outbox_tx);
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                RelayEvent::FrameReceived { id, payload } => self.on_message(id, &payload),
                RelayEvent::Closed { id } => self.on_disconnect(id),
            }
        }
    }

    fn on_message(&mut self, id: ParticipantId, payload: &[u8]) {
        let report: Report = match decode(payload) {
            Ok(report) => report,
            Err(e) => {
                warn!("Invalid report from {}: {}", id, e);
                return;
            }
        };

        if !self.directory.update(id, report) {
            warn!("Report from unknown participant {}", id);
            return;
        }

        let reply = match encode(&self.directory.snapshot()) {
            Ok(reply) => reply,
            Err(e) => {
                error!("Failed to encode snapshot for {}: {}", id, e);
                return;
            }
        };

        if let Some(outbox) = self.outboxes.get(&id) {
            if outbox.send(reply).is_err() {
                debug!("Writer for {} already closed", id);
            }
        }
    }

    fn on_disconnect(&mut self, id: ParticipantId) {
        info!("Participant {} has disconnected", id);
        self.directory.remove(id);
        // Dropping the sender ends the writer task
        self.outboxes.remove(&id);
    }
}

/// Spawns task that forwards every inbound frame to the control loop
fn spawn_connection_reader(
    id: ParticipantId,
    mut reader: OwnedReadHalf,
    events: mpsc::UnboundedSender<RelayEvent>,
) {
    tokio::spawn(async move {
        loop {
            match read_frame(&mut reader).await {
                Ok(Some(payload)) => {
                    if events
                        .send(RelayEvent::FrameReceived { id, payload })
                        .is_err()
                    {
                        return;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Dropping participant {}: {}", id, e);
                    break;
                }
            }
        }

        if let Err(e) = events.send(RelayEvent::Closed { id }) {
            error!("Failed to report disconnect of {}: {}", id, e);
        }
    });
}

/// Spawns task that writes queued replies to one participant
fn spawn_connection_writer(
    id: ParticipantId,
    mut writer: OwnedWriteHalf,
    mut outbox: mpsc::UnboundedReceiver<Vec<u8>>,
) {
    tokio::spawn(async move {
        while let Some(payload) = outbox.recv().await {
            if let Err(e) = write_frame(&mut writer, &payload).await {
                error!("Failed to send snapshot to {}: {}", id, e);
                break;
            }
        }
    });
}
