//! On-screen status display
//!
//! Write-only sink for the two stat lines (health, score) plus an optional
//! debug line. Entities push text updates whenever a stat changes; the world
//! draws the current strings in screen space after the 3D pass. Nothing in
//! here reads game state back.

use macroquad::prelude::*;

pub struct Hud {
    health_text: String,
    score_text: String,
    debug_text: Option<String>,
}

impl Hud {
    pub fn new() -> Self {
        Self {
            health_text: String::new(),
            score_text: String::new(),
            debug_text: None,
        }
    }

    pub fn set_health(&mut self, health: f32) {
        self.health_text = format!("Health: {:.0}", health);
    }

    pub fn set_score(&mut self, score: u32) {
        self.score_text = format!("Score: {}", score);
    }

    pub fn set_debug(&mut self, text: Option<String>) {
        self.debug_text = text;
    }

    pub fn health_text(&self) -> &str {
        &self.health_text
    }

    pub fn score_text(&self) -> &str {
        &self.score_text
    }

    /// Draw the overlay. Must run with the default 2D camera active.
    pub fn draw(&self, pointer_locked: bool) {
        draw_text(&self.health_text, 20.0, 36.0, 30.0, WHITE);
        draw_text(&self.score_text, 20.0, 66.0, 30.0, WHITE);

        if let Some(debug) = &self.debug_text {
            draw_text(debug, 20.0, screen_height() - 20.0, 22.0, LIGHTGRAY);
        }

        let cx = screen_width() * 0.5;
        let cy = screen_height() * 0.5;
        if pointer_locked {
            // Crosshair
            draw_line(cx - 8.0, cy, cx + 8.0, cy, 2.0, WHITE);
            draw_line(cx, cy - 8.0, cx, cy + 8.0, 2.0, WHITE);
        } else {
            let hint = "Click to capture the mouse - WASD move, Space jump, click fire, Esc release";
            let dims = measure_text(hint, None, 24, 1.0);
            draw_text(hint, cx - dims.width * 0.5, cy, 24.0, YELLOW);
        }
    }
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}
