//! Input source
//!
//! Snapshots raw keyboard state and accumulates mouse movement once per
//! frame. `poll()` is the only place that touches macroquad input, so the
//! rest of the game (and the tests) work against plain data.
//!
//! Mouse capture follows the browser pointer-lock model: a click *requests*
//! the grab, and the game only trusts the `pointer_locked` flag once the
//! grant is observed on a later poll. On wasm the browser really does
//! confirm asynchronously; native grabs behave the same way here so the
//! controller never assumes the request succeeded in the same frame.

use std::collections::HashSet;

use macroquad::prelude::*;

pub struct Input {
    pub(crate) keys_down: HashSet<KeyCode>,
    pub(crate) mouse_delta: Vec2,
    pub(crate) locked: bool,
    pub(crate) clicked: bool,
    grab_pending: bool,
    last_mouse: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            mouse_delta: Vec2::ZERO,
            locked: false,
            clicked: false,
            grab_pending: false,
            last_mouse: Vec2::ZERO,
        }
    }

    /// Refresh the snapshot from macroquad. Call exactly once per frame,
    /// before the world tick.
    pub fn poll(&mut self) {
        self.keys_down = get_keys_down();
        self.clicked = is_mouse_button_pressed(MouseButton::Left);

        let pos: Vec2 = mouse_position().into();
        if self.locked {
            self.mouse_delta += pos - self.last_mouse;
        }
        self.last_mouse = pos;

        if self.grab_pending {
            // Grant observed one poll after the request.
            self.grab_pending = false;
            self.locked = true;
            // Discard whatever the cursor did while the grab settled.
            self.mouse_delta = Vec2::ZERO;
        } else if self.clicked && !self.locked {
            set_cursor_grab(true);
            show_mouse(false);
            self.grab_pending = true;
            // The capturing click is not a game action.
            self.clicked = false;
        }

        if self.locked && is_key_pressed(KeyCode::Escape) {
            set_cursor_grab(false);
            show_mouse(true);
            self.locked = false;
        }
    }

    /// Current state for a key. Keys never seen report false.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Accumulated mouse movement since the last call, then zero. A second
    /// call in the same frame returns `Vec2::ZERO`.
    pub fn consume_mouse_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.mouse_delta)
    }

    pub fn pointer_locked(&self) -> bool {
        self.locked
    }

    /// A click this frame while the mouse is captured.
    pub fn attack_pressed(&self) -> bool {
        self.locked && self.clicked
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}
