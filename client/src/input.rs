//! Keyboard steering for the local paddle

use macroquad::input::{is_key_pressed, is_key_released, KeyCode};
use shared::{Axis, Paddle, PADDLE_SPEED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn axis(self) -> Axis {
        match self {
            Direction::Up | Direction::Down => Axis::Vertical,
            Direction::Left | Direction::Right => Axis::Horizontal,
        }
    }

    fn velocity(self) -> i32 {
        match self {
            Direction::Up | Direction::Left => -PADDLE_SPEED,
            Direction::Down | Direction::Right => PADDLE_SPEED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTransition {
    Pressed,
    Released,
}

/// Applies one key transition to a paddle.
///
/// Keys off the paddle's axis are ignored. Releasing a key only stops the
/// paddle if it is still moving in that key's direction, so rolling from one
/// arrow to the other never stalls it.
pub fn steer(paddle: &mut Paddle, direction: Direction, transition: KeyTransition) {
    if direction.axis() != paddle.slot.axis() {
        return;
    }

    match transition {
        KeyTransition::Pressed => paddle.velocity = direction.velocity(),
        KeyTransition::Released => {
            if paddle.velocity == direction.velocity() {
                paddle.velocity = 0;
            }
        }
    }
}

/// Samples arrow-key edges each frame and steers the local paddle
pub struct InputManager {
    bindings: [(KeyCode, Direction); 4],
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            bindings: [
                (KeyCode::Up, Direction::Up),
                (KeyCode::Down, Direction::Down),
                (KeyCode::Left, Direction::Left),
                (KeyCode::Right, Direction::Right),
            ],
        }
    }

    /// Does nothing until a paddle has been claimed.
    pub fn update(&self, paddle: Option<&mut Paddle>) {
        let Some(paddle) = paddle else {
            return;
        };

        // Releases first so a same-frame roll ends on the new press
        for (key, direction) in self.bindings {
            if is_key_released(key) {
                steer(paddle, direction, KeyTransition::Released);
            }
        }
        for (key, direction) in self.bindings {
            if is_key_pressed(key) {
                steer(paddle, direction, KeyTransition::Pressed);
            }
        }
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
