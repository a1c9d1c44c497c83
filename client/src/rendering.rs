use crate::game::GameState;
use macroquad::prelude::*;
use shared::{
    Axis, Paddle, Slot, BALL_RADIUS, HALF_PAD_HEIGHT, HALF_PAD_WIDTH, HEIGHT, PAD_WIDTH, WIDTH,
};

const LABEL_SIZE: f32 = 16.0;
const LABEL_MARGIN: f32 = 10.0;

/// Maps court coordinates onto the current window, keeping the court square
#[derive(Debug, Clone, Copy)]
struct Viewport {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl Viewport {
    fn fit(window_width: f32, window_height: f32) -> Self {
        let scale = (window_width / WIDTH as f32).min(window_height / HEIGHT as f32);
        Self {
            scale,
            offset_x: (window_width - WIDTH as f32 * scale) / 2.0,
            offset_y: (window_height - HEIGHT as f32 * scale) / 2.0,
        }
    }

    fn x(&self, x: f32) -> f32 {
        self.offset_x + x * self.scale
    }

    fn y(&self, y: f32) -> f32 {
        self.offset_y + y * self.scale
    }

    fn len(&self, len: f32) -> f32 {
        len * self.scale
    }
}

pub struct Renderer {
    court_color: Color,
    paddle_color: Color,
    ball_color: Color,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            court_color: WHITE,
            paddle_color: GREEN,
            ball_color: RED,
        }
    }

    pub fn render(&mut self, game: &GameState) {
        clear_background(BLACK);

        let view = Viewport::fit(screen_width(), screen_height());

        self.draw_court(&view);

        draw_circle(
            view.x(game.ball().position[0]),
            view.y(game.ball().position[1]),
            view.len(BALL_RADIUS as f32),
            self.ball_color,
        );

        for (paddle, is_local) in game.paddles() {
            self.draw_paddle(&view, paddle);
            let label = if is_local { "Me" } else { paddle.display_name.as_str() };
            self.draw_label(&view, paddle.slot, label);
        }

        if !game.is_running() {
            self.draw_paused_banner(&view, game.player_count(), game.max_players());
        }
    }

    fn draw_court(&mut self, view: &Viewport) {
        let (w, h, pad) = (WIDTH as f32, HEIGHT as f32, PAD_WIDTH as f32);

        draw_circle_lines(
            view.x(w / 2.0),
            view.y(h / 2.0),
            view.len(h / 6.0),
            1.0,
            self.court_color,
        );

        let lines = [
            ([pad, 0.0], [pad, h]),
            ([w - pad, 0.0], [w - pad, h]),
            ([0.0, pad], [w, pad]),
            ([0.0, h - pad], [w, h - pad]),
        ];
        for ([x0, y0], [x1, y1]) in lines {
            draw_line(view.x(x0), view.y(y0), view.x(x1), view.y(y1), 1.0, self.court_color);
        }
    }

    fn draw_paddle(&mut self, view: &Viewport, paddle: &Paddle) {
        let (half_w, half_h) = match paddle.slot.axis() {
            Axis::Vertical => (HALF_PAD_WIDTH, HALF_PAD_HEIGHT),
            Axis::Horizontal => (HALF_PAD_HEIGHT, HALF_PAD_WIDTH),
        };
        let [x, y] = paddle.position;

        draw_rectangle(
            view.x((x - half_w) as f32),
            view.y((y - half_h) as f32),
            view.len((2 * half_w) as f32),
            view.len((2 * half_h) as f32),
            self.paddle_color,
        );
    }

    /// Labels sit just inside the court next to their slot's edge
    fn draw_label(&mut self, view: &Viewport, slot: Slot, text: &str) {
        let size = measure_text(text, None, LABEL_SIZE as u16, 1.0);
        let inset = view.len(PAD_WIDTH as f32 + LABEL_MARGIN);
        let centre_x = view.x(WIDTH as f32 / 2.0);
        let centre_y = view.y(HEIGHT as f32 / 2.0);
        let (left, top) = (view.x(0.0), view.y(0.0));
        let (right, bottom) = (view.x(WIDTH as f32), view.y(HEIGHT as f32));

        // draw_text anchors at the baseline
        let (x, y) = match slot {
            Slot::Left => (left + inset, centre_y),
            Slot::Right => (right - inset - size.width, centre_y),
            Slot::Top => (centre_x - size.width / 2.0, top + inset + size.height),
            Slot::Bottom => (centre_x - size.width / 2.0, bottom - inset),
        };

        draw_text(text, x, y, LABEL_SIZE, self.court_color);
    }

    fn draw_paused_banner(&mut self, view: &Viewport, present: usize, expected: usize) {
        let text = format!("Waiting for players {}/{}", present, expected);
        let font_size = 24.0;
        let size = measure_text(&text, None, font_size as u16, 1.0);

        draw_text(
            &text,
            view.x(WIDTH as f32 / 2.0) - size.width / 2.0,
            view.y(HEIGHT as f32 / 3.0),
            font_size,
            Color::from_rgba(255, 255, 0, 255),
        );
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
