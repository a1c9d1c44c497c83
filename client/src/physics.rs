//! Ball and paddle kinematics and collision resolution.
//!
//! Paddles are moved by every participant; the ball functions are only
//! called by the current primary.

use shared::{Axis, Ball, Paddle, Slot, HALF_PAD_HEIGHT, HEIGHT, RETURN_ACCELERATION, WIDTH};

/// Result of one collision pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rally {
    Continues,
    /// The ball reached a defended edge outside its paddle.
    Lost(Slot),
}

/// Slides a paddle along its axis by its velocity, keeping it on the court.
pub fn move_paddle(paddle: &mut Paddle) {
    let velocity = paddle.velocity;
    let (coord, extent) = match paddle.slot.axis() {
        Axis::Vertical => (&mut paddle.position[1], HEIGHT),
        Axis::Horizontal => (&mut paddle.position[0], WIDTH),
    };
    *coord = (*coord + velocity).clamp(HALF_PAD_HEIGHT, extent - HALF_PAD_HEIGHT);
}

/// Advances the ball by its velocity truncated to whole units.
pub fn move_ball(ball: &mut Ball) {
    ball.position[0] += ball.velocity[0].trunc();
    ball.position[1] += ball.velocity[1].trunc();
}

/// Bounces the ball off undefended edges, then checks every paddle.
///
/// Edges are visited in claim order. A paddle that covers the ball returns
/// it and speeds both axes up; a defended edge reached outside the paddle
/// ends the rally immediately.
pub fn resolve_collisions(ball: &mut Ball, paddles: &[&Paddle]) -> Rally {
    for slot in Slot::ALL {
        let defended = paddles.iter().any(|paddle| paddle.slot == slot);
        if !defended && slot.is_crossed_by(ball) {
            slot.reflect(ball);
        }
    }

    for paddle in paddles {
        let slot = paddle.slot;
        if !slot.is_crossed_by(ball) {
            continue;
        }

        if slot.is_covered_by(paddle, ball) {
            slot.reflect(ball);
            ball.velocity[0] *= RETURN_ACCELERATION;
            ball.velocity[1] *= RETURN_ACCELERATION;
        } else {
            return Rally::Lost(slot);
        }
    }

    Rally::Continues
}
