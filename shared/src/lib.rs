//! Types and constants shared by the relay and its participants.
//!
//! Everything that crosses the wire lives here: the per-participant
//! [`Report`], the relay's [`Snapshot`] of all reports, and the entity types
//! ([`Ball`], [`Paddle`], [`Slot`]) embedded in them. The playfield geometry
//! is fixed and identical for every participant, so the constants below are
//! the single source for both simulation and rendering.

pub mod codec;

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use codec::{decode, encode, read_frame, write_frame, WireError};

pub const WIDTH: i32 = 720;
pub const HEIGHT: i32 = 720;
pub const BALL_RADIUS: i32 = 15;
pub const PAD_WIDTH: i32 = 10;
pub const PAD_HEIGHT: i32 = 150;
pub const HALF_PAD_WIDTH: i32 = PAD_WIDTH / 2;
pub const HALF_PAD_HEIGHT: i32 = PAD_HEIGHT / 2;
pub const PADDLE_SPEED: i32 = 8;

/// Velocity multiplier applied to both ball axes on every paddle return.
pub const RETURN_ACCELERATION: f32 = 1.1;

/// Upper bound on an encoded message, in either direction.
pub const MAX_MESSAGE_SIZE: usize = 2000;

pub const MIN_PLAYERS: usize = 1;
pub const MAX_PLAYERS: usize = 4;

/// Longest display name, in characters, a participant may report.
///
/// At four bytes per character this keeps a snapshot of [`MAX_PLAYERS`]
/// full reports under [`MAX_MESSAGE_SIZE`].
pub const MAX_DISPLAY_NAME_CHARS: usize = 24;

/// Identity of one connection, derived from the client's ephemeral port.
///
/// Ordering is numeric and is the only input to primary election.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub u16);

impl From<u16> for ParticipantId {
    fn from(port: u16) -> Self {
        Self(port)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Axis along which a paddle slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// One of the four paddle positions along the playfield boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Left,
    Right,
    Top,
    Bottom,
}

impl Slot {
    /// Claim order for new participants.
    pub const ALL: [Slot; 4] = [Slot::Left, Slot::Right, Slot::Top, Slot::Bottom];

    pub fn axis(self) -> Axis {
        match self {
            Slot::Left | Slot::Right => Axis::Vertical,
            Slot::Top | Slot::Bottom => Axis::Horizontal,
        }
    }

    /// Starting position of a paddle placed in this slot.
    pub fn home(self) -> [i32; 2] {
        match self {
            Slot::Left => [HALF_PAD_WIDTH - 1, HEIGHT / 2],
            Slot::Right => [WIDTH + 1 - HALF_PAD_WIDTH, HEIGHT / 2],
            Slot::Top => [WIDTH / 2, HALF_PAD_WIDTH - 1],
            Slot::Bottom => [WIDTH / 2, HEIGHT + 1 - HALF_PAD_WIDTH],
        }
    }

    /// True once the ball's truncated position has reached this edge.
    pub fn is_crossed_by(self, ball: &Ball) -> bool {
        let [x, y] = ball.grid_position();
        match self {
            Slot::Left => x <= BALL_RADIUS + PAD_WIDTH,
            Slot::Right => x >= WIDTH + 1 - BALL_RADIUS - PAD_WIDTH,
            Slot::Top => y <= BALL_RADIUS + PAD_WIDTH,
            Slot::Bottom => y >= HEIGHT + 1 - BALL_RADIUS - PAD_WIDTH,
        }
    }

    /// True if the ball lies inside the paddle's half-extent window,
    /// measured along the edge.
    pub fn is_covered_by(self, paddle: &Paddle, ball: &Ball) -> bool {
        let [x, y] = ball.grid_position();
        let (along, centre) = match self {
            Slot::Left | Slot::Right => (y, paddle.position[1]),
            Slot::Top | Slot::Bottom => (x, paddle.position[0]),
        };
        (centre - HALF_PAD_HEIGHT..centre + HALF_PAD_HEIGHT).contains(&along)
    }

    /// Reverses the ball's velocity component normal to this edge.
    pub fn reflect(self, ball: &mut Ball) {
        match self {
            Slot::Left | Slot::Right => ball.velocity[0] = -ball.velocity[0],
            Slot::Top | Slot::Bottom => ball.velocity[1] = -ball.velocity[1],
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Slot::Left => "left",
            Slot::Right => "right",
            Slot::Top => "top",
            Slot::Bottom => "bottom",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub position: [f32; 2],
    pub velocity: [f32; 2],
}

impl Ball {
    /// Builds a centred ball with a freshly drawn velocity.
    ///
    /// Horizontal speed is drawn from `3..6`, vertical from `2..5`, and the
    /// vertical draw is repeated until the two differ so the serve is never
    /// a perfect diagonal. Each sign is then flipped independently.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let horizontal: i32 = rng.gen_range(3..6);
        let mut vertical: i32 = rng.gen_range(2..5);
        while vertical == horizontal {
            vertical = rng.gen_range(2..5);
        }

        let vx = if rng.gen_bool(0.5) { -horizontal } else { horizontal };
        let vy = if rng.gen_bool(0.5) { -vertical } else { vertical };

        Self {
            position: [(WIDTH / 2) as f32, (HEIGHT / 2) as f32],
            velocity: [vx as f32, vy as f32],
        }
    }

    /// Position truncated toward zero, as used by every edge test.
    pub fn grid_position(&self) -> [i32; 2] {
        [self.position[0] as i32, self.position[1] as i32]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub position: [i32; 2],
    pub slot: Slot,
    pub velocity: i32,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

impl Paddle {
    pub fn new(slot: Slot, display_name: impl Into<String>) -> Self {
        Self {
            position: slot.home(),
            slot,
            velocity: 0,
            display_name: display_name.into(),
        }
    }
}

/// State a participant reports to the relay on every tick.
///
/// A participant without a paddle sends the empty report, which encodes as
/// `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paddle: Option<Paddle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ball: Option<Ball>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
    #[serde(
        default,
        rename = "displayName",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        *self == Report::default()
    }
}

/// The relay's reply: its capacity and every participant's latest report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub max_players: usize,
    pub players: BTreeMap<ParticipantId, Report>,
}

/// Drops control characters (escaped to six bytes each in JSON) and caps
/// the name at [`MAX_DISPLAY_NAME_CHARS`].
pub fn sanitize_display_name(name: &str) -> String {
    let capped: String = name
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_DISPLAY_NAME_CHARS)
        .collect();
    capped.trim().to_string()
}

/// Picks the participant authoritative for the ball: the smallest id present.
pub fn elect_primary<V>(players: &BTreeMap<ParticipantId, V>) -> Option<ParticipantId> {
    players.keys().next().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_elect_primary_is_minimum() {
        let mut players = BTreeMap::new();
        players.insert(ParticipantId(50123), Report::default());
        players.insert(ParticipantId(9001), Report::default());
        players.insert(ParticipantId(61000), Report::default());

        assert_eq!(elect_primary(&players), Some(ParticipantId(9001)));
    }

    #[test]
    fn test_elect_primary_after_departure() {
        let mut players = BTreeMap::new();
        for port in [40000u16, 40002, 40001] {
            players.insert(ParticipantId(port), Report::default());
        }

        let first = elect_primary(&players).unwrap();
        assert_eq!(first, ParticipantId(40000));

        players.remove(&first);
        assert_eq!(elect_primary(&players), Some(ParticipantId(40001)));

        players.clear();
        assert_eq!(elect_primary(&players), None);
    }

    #[test]
    fn test_ball_sampling_bounds() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..2000 {
            let ball = Ball::random(&mut rng);
            let vx = ball.velocity[0].abs();
            let vy = ball.velocity[1].abs();

            assert!((3.0..6.0).contains(&vx), "vx out of range: {}", vx);
            assert!((2.0..5.0).contains(&vy), "vy out of range: {}", vy);
            assert_ne!(vx, vy);
            assert_eq!(ball.position, [360.0, 360.0]);
        }
    }

    #[test]
    fn test_ball_signs_vary() {
        let mut rng = StdRng::seed_from_u64(11);
        let balls: Vec<Ball> = (0..200).map(|_| Ball::random(&mut rng)).collect();

        assert!(balls.iter().any(|b| b.velocity[0] < 0.0));
        assert!(balls.iter().any(|b| b.velocity[0] > 0.0));
        assert!(balls.iter().any(|b| b.velocity[1] < 0.0));
        assert!(balls.iter().any(|b| b.velocity[1] > 0.0));
    }

    #[test]
    fn test_slot_homes() {
        assert_eq!(Slot::Left.home(), [4, 360]);
        assert_eq!(Slot::Right.home(), [716, 360]);
        assert_eq!(Slot::Top.home(), [360, 4]);
        assert_eq!(Slot::Bottom.home(), [360, 716]);
    }

    #[test]
    fn test_slot_axes() {
        assert_eq!(Slot::Left.axis(), Axis::Vertical);
        assert_eq!(Slot::Right.axis(), Axis::Vertical);
        assert_eq!(Slot::Top.axis(), Axis::Horizontal);
        assert_eq!(Slot::Bottom.axis(), Axis::Horizontal);
    }

    #[test]
    fn test_edge_thresholds() {
        let ball = |x: f32, y: f32| Ball {
            position: [x, y],
            velocity: [0.0, 0.0],
        };

        assert!(Slot::Left.is_crossed_by(&ball(25.9, 360.0)));
        assert!(!Slot::Left.is_crossed_by(&ball(26.0, 360.0)));
        assert!(Slot::Right.is_crossed_by(&ball(696.0, 360.0)));
        assert!(!Slot::Right.is_crossed_by(&ball(695.9, 360.0)));
        assert!(Slot::Top.is_crossed_by(&ball(360.0, 25.0)));
        assert!(Slot::Bottom.is_crossed_by(&ball(360.0, 700.0)));
        assert!(!Slot::Bottom.is_crossed_by(&ball(360.0, 360.0)));
    }

    #[test]
    fn test_paddle_window_is_half_open() {
        let paddle = Paddle::new(Slot::Left, "p");
        let at = |y: f32| Ball {
            position: [20.0, y],
            velocity: [0.0, 0.0],
        };

        assert!(Slot::Left.is_covered_by(&paddle, &at(285.0)));
        assert!(Slot::Left.is_covered_by(&paddle, &at(434.5)));
        assert!(!Slot::Left.is_covered_by(&paddle, &at(435.0)));
        assert!(!Slot::Left.is_covered_by(&paddle, &at(284.0)));
    }

    #[test]
    fn test_empty_report_encodes_as_empty_object() {
        let json = serde_json::to_string(&Report::default()).unwrap();
        assert_eq!(json, "{}");

        let parsed: Report = serde_json::from_str("{}").unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_report_wire_field_names() {
        let report = Report {
            paddle: Some(Paddle::new(Slot::Top, "Player 5")),
            ball: Some(Ball {
                position: [1.0, 2.0],
                velocity: [3.0, -4.0],
            }),
            running: Some(true),
            primary: Some(false),
            display_name: Some("Player 5".to_string()),
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["paddle"]["slot"], "top");
        assert_eq!(value["paddle"]["displayName"], "Player 5");
        assert_eq!(value["paddle"]["position"][0], 360);
        assert_eq!(value["ball"]["velocity"][1], -4.0);
        assert_eq!(value["running"], true);
        assert_eq!(value["primary"], false);
        assert_eq!(value["displayName"], "Player 5");
    }

    #[test]
    fn test_sanitize_display_name() {
        let long = sanitize_display_name(&"x".repeat(450));
        assert_eq!(long.chars().count(), MAX_DISPLAY_NAME_CHARS);

        assert_eq!(sanitize_display_name("  Al\u{7}ice\n"), "Alice");
        assert_eq!(sanitize_display_name("\t\r"), "");
    }

    #[test]
    fn test_full_snapshot_with_longest_names_fits() {
        let name = sanitize_display_name(&"\u{1D11E}".repeat(100));
        assert_eq!(name.chars().count(), MAX_DISPLAY_NAME_CHARS);

        let far = -f32::MIN_POSITIVE;
        let mut players = BTreeMap::new();
        for (i, slot) in Slot::ALL.into_iter().enumerate() {
            let mut paddle = Paddle::new(slot, name.clone());
            paddle.position = [i32::MIN, i32::MIN];
            paddle.velocity = i32::MIN;
            players.insert(
                ParticipantId(u16::MAX - i as u16),
                Report {
                    paddle: Some(paddle),
                    ball: Some(Ball {
                        position: [far, far],
                        velocity: [far, far],
                    }),
                    running: Some(false),
                    primary: Some(false),
                    display_name: Some(name.clone()),
                },
            );
        }
        let snapshot = Snapshot {
            max_players: MAX_PLAYERS,
            players,
        };

        let encoded = encode(&snapshot).expect("full snapshot should fit in one message");
        assert!(encoded.len() <= MAX_MESSAGE_SIZE);
    }

    #[test]
    fn test_snapshot_uses_string_keys() {
        let mut players = BTreeMap::new();
        players.insert(ParticipantId(51000), Report::default());
        let snapshot = Snapshot {
            max_players: 2,
            players,
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"max_players":2,"players":{"51000":{}}}"#);

        let parsed: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
