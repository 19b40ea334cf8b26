//! Keyboard/mouse state shared by the event loops.

use std::collections::HashSet;

use corelib::camera::Camera;
use winit::keyboard::KeyCode;

/// One-shot actions triggered by a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    ToggleWireframe,
}

impl KeyAction {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::Escape => Some(KeyAction::Quit),
            KeyCode::Digit1 => Some(KeyAction::ToggleWireframe),
            _ => None,
        }
    }
}

/// Keys currently held down.
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key transition. Returns the action for a fresh press
    /// (auto-repeat does not re-trigger).
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool, repeat: bool) -> Option<KeyAction> {
        if !pressed {
            self.held.remove(&key);
            return None;
        }
        self.held.insert(key);
        if repeat {
            return None;
        }
        KeyAction::from_key(key)
    }

    #[inline]
    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Release everything, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Move the camera by `step` along each axis whose key is held.
    pub fn apply_movement(&self, camera: &mut Camera, step: f32) {
        if self.is_held(KeyCode::KeyW) {
            camera.move_forward(step);
        }
        if self.is_held(KeyCode::KeyS) {
            camera.move_backward(step);
        }
        if self.is_held(KeyCode::KeyA) {
            camera.move_left(step);
        }
        if self.is_held(KeyCode::KeyD) {
            camera.move_right(step);
        }
        if self.is_held(KeyCode::Space) {
            camera.move_up(step);
        }
        if self.is_held(KeyCode::ControlLeft) {
            camera.move_down(step);
        }
    }
}

/// Turns relative mouse motion into the absolute coordinates the camera
/// expects, starting from the window centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseTracker {
    x: f64,
    y: f64,
}

impl MouseTracker {
    pub fn centered(width: u32, height: u32) -> Self {
        Self {
            x: f64::from(width / 2),
            y: f64::from(height / 2),
        }
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x as f32, self.y as f32)
    }

    pub fn accumulate(&mut self, dx: f64, dy: f64) -> (f32, f32) {
        self.x += dx;
        self.y += dy;
        self.position()
    }
}
