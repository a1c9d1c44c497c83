//! Participant registry for the relay
//!
//! The directory maps every serviced connection to the last report it sent.
//! It is owned by the relay control loop and changes in exactly three ways:
//! - an empty entry is inserted when a connection is admitted
//! - an entry is overwritten in full when its owner reports
//! - an entry is removed when its connection closes
//!
//! Capacity is enforced at admission; nothing else ever grows the map.

use log::info;
use shared::{ParticipantId, Report, Snapshot};
use std::collections::BTreeMap;
use thiserror::Error;

/// Reason a connection was not given a directory entry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Refusal {
    #[error("relay is full ({capacity} players)")]
    Full { capacity: usize },

    #[error("participant {0} is already connected")]
    Duplicate(ParticipantId),
}

/// Last-known state of every admitted participant
///
/// Entries are kept ordered by id so snapshots list the elected primary
/// first.
#[derive(Debug)]
pub struct StateDirectory {
    /// Latest report per participant, empty until its first report
    players: BTreeMap<ParticipantId, Report>,
    /// Maximum number of simultaneously admitted participants
    capacity: usize,
}

impl StateDirectory {
    /// Creates an empty directory admitting at most `capacity` participants
    pub fn new(capacity: usize) -> Self {
        Self {
            players: BTreeMap::new(),
            capacity,
        }
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Admits a participant with an empty entry
    ///
    /// Fails if the directory is full or the id is already present; the
    /// caller is expected to close the connection in either case.
    pub fn register(&mut self, id: ParticipantId) -> Result<(), Refusal> {
        if self.players.len() >= self.capacity {
            return Err(Refusal::Full {
                capacity: self.capacity,
            });
        }
        if self.players.contains_key(&id) {
            return Err(Refusal::Duplicate(id));
        }

        self.players.insert(id, Report::default());
        info!(
            "Participant {} joined ({}/{})",
            id,
            self.players.len(),
            self.capacity
        );
        Ok(())
    }

    /// Replaces a participant's entry with its latest report
    ///
    /// Returns false if the participant was never admitted.
    pub fn update(&mut self, id: ParticipantId, report: Report) -> bool {
        match self.players.get_mut(&id) {
            Some(entry) => {
                *entry = report;
                true
            }
            None => false,
        }
    }

    /// Removes a participant, returning true if it was present
    pub fn remove(&mut self, id: ParticipantId) -> bool {
        if self.players.remove(&id).is_some() {
            info!(
                "Participant {} left ({}/{})",
                id,
                self.players.len(),
                self.capacity
            );
            true
        } else {
            false
        }
    }

    /// Copies the whole directory into a reply
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            max_players: self.capacity,
            players: self.players.clone(),
        }
    }

    #[cfg(test)]
    pub fn contains(&self, id: ParticipantId) -> bool {
        self.players.contains_key(&id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
