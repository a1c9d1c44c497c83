use crate::physics::{self, Rally};
use log::{debug, info};
use rand::Rng;
use shared::{elect_primary, Ball, Paddle, ParticipantId, Report, Slot, Snapshot};
use std::collections::BTreeMap;

/// One participant's view of the shared match.
///
/// The directory received from the relay is the only input to role and
/// slot decisions: whether this participant is primary is recomputed from
/// it on every call and never cached.
#[derive(Debug, Clone)]
pub struct GameState {
    me: ParticipantId,
    display_name: String,
    max_players: usize,
    directory: BTreeMap<ParticipantId, Report>,
    paddle: Option<Paddle>,
    remote_paddles: Vec<(ParticipantId, Paddle)>,
    running: bool,
    ball: Ball,
}

impl GameState {
    pub fn new<R: Rng + ?Sized>(
        me: ParticipantId,
        display_name: impl Into<String>,
        rng: &mut R,
    ) -> Self {
        Self {
            me,
            display_name: display_name.into(),
            max_players: 0,
            directory: BTreeMap::new(),
            paddle: None,
            remote_paddles: Vec::new(),
            running: false,
            ball: Ball::random(rng),
        }
    }

    pub fn me(&self) -> ParticipantId {
        self.me
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_primary(&self) -> bool {
        elect_primary(&self.directory) == Some(self.me)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    pub fn player_count(&self) -> usize {
        self.directory.len()
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn paddle(&self) -> Option<&Paddle> {
        self.paddle.as_ref()
    }

    pub fn paddle_mut(&mut self) -> Option<&mut Paddle> {
        self.paddle.as_mut()
    }

    pub fn remote_paddles(&self) -> &[(ParticipantId, Paddle)] {
        &self.remote_paddles
    }

    /// Every known paddle, remote ones first, flagged true for our own.
    pub fn paddles(&self) -> impl Iterator<Item = (&Paddle, bool)> {
        self.remote_paddles
            .iter()
            .map(|(_, paddle)| (paddle, false))
            .chain(self.paddle.iter().map(|paddle| (paddle, true)))
    }

    /// The report to send this tick; empty until a slot is held.
    pub fn build_report(&self) -> Report {
        match &self.paddle {
            Some(paddle) => Report {
                paddle: Some(paddle.clone()),
                ball: Some(self.ball.clone()),
                running: Some(self.running),
                primary: Some(self.is_primary()),
                display_name: Some(self.display_name.clone()),
            },
            None => Report::default(),
        }
    }

    /// Replaces the cached directory with the relay's latest snapshot.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.max_players = snapshot.max_players;
        self.directory = snapshot.players;
    }

    /// Runs everything that follows an exchange with the relay.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let primary = self.is_primary();

        self.claim_slot(primary);
        self.sync_remote();
        if primary {
            self.arbitrate(rng);
        }
        self.simulate(primary, rng);
    }

    fn remote_reports(&self) -> impl Iterator<Item = (&ParticipantId, &Report)> {
        let me = self.me;
        self.directory.iter().filter(move |(id, _)| **id != me)
    }

    /// Takes the first free slot, once.
    ///
    /// Non-primary participants wait until they can see at least one other
    /// paddle, so two newcomers never pick a slot blind at the same time.
    fn claim_slot(&mut self, primary: bool) {
        if self.paddle.is_some() {
            return;
        }

        let taken: Vec<Slot> = self
            .remote_reports()
            .filter_map(|(_, report)| report.paddle.as_ref().map(|p| p.slot))
            .collect();

        if !primary && taken.is_empty() {
            return;
        }

        match Slot::ALL.into_iter().find(|slot| !taken.contains(slot)) {
            Some(slot) => {
                info!("Participant {} takes the {} paddle", self.me, slot);
                self.paddle = Some(Paddle::new(slot, self.display_name.clone()));
            }
            None => debug!("All slots taken, {} stays a spectator", self.me),
        }
    }

    /// Rebuilds remote paddles and follows the primary's run state and ball.
    fn sync_remote(&mut self) {
        self.remote_paddles = self
            .remote_reports()
            .filter_map(|(id, report)| report.paddle.clone().map(|paddle| (*id, paddle)))
            .collect();

        // Follow only the elected id, and only once it reports itself primary
        let Some(primary_id) = elect_primary(&self.directory).filter(|id| *id != self.me) else {
            return;
        };
        let Some(report) = self.directory.get(&primary_id) else {
            return;
        };
        if report.primary != Some(true) {
            return;
        }

        if let Some(running) = report.running {
            self.running = running;
        }
        // Not primary ourselves, so the primary's ball replaces ours
        if let Some(ball) = &report.ball {
            self.ball = ball.clone();
        }
    }

    /// Runs while the lobby is full, pauses and re-serves otherwise.
    fn arbitrate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.directory.len() == self.max_players {
            if !self.running {
                info!("All {} players present, starting", self.max_players);
            }
            self.running = true;
        } else {
            if self.running {
                info!(
                    "Waiting for players ({}/{}), pausing",
                    self.directory.len(),
                    self.max_players
                );
            }
            self.running = false;
            self.ball = Ball::random(rng);
        }
    }

    fn simulate<R: Rng + ?Sized>(&mut self, primary: bool, rng: &mut R) {
        if let Some(paddle) = self.paddle.as_mut() {
            physics::move_paddle(paddle);
        }
        for (_, paddle) in &mut self.remote_paddles {
            physics::move_paddle(paddle);
        }

        if !primary {
            return;
        }

        if self.running {
            physics::move_ball(&mut self.ball);
        }

        let paddles: Vec<&Paddle> = self
            .remote_paddles
            .iter()
            .map(|(_, paddle)| paddle)
            .chain(self.paddle.iter())
            .collect();

        if let Rally::Lost(slot) = physics::resolve_collisions(&mut self.ball, &paddles) {
            debug!("Ball lost at the {} edge, serving again", slot);
            self.ball = Ball::random(rng);
        }
    }
}
