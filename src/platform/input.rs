//! Input state from DOM events
//!
//! Collects raw key, mouse and touch events between frames and turns them
//! into one [`TickInput`] snapshot per frame.

use std::collections::BTreeSet;

use glam::Vec2;

use crate::settings::{KeyAction, KeyBindings};
use crate::sim::tick::{Aim, TickInput};
use crate::sim::weapon::WeaponKind;

/// Ground-plane direction of screen right under the fixed isometric camera
const SCREEN_RIGHT: Vec2 = Vec2::new(std::f32::consts::FRAC_1_SQRT_2, std::f32::consts::FRAC_1_SQRT_2);
/// Joystick deflection (0..1) past which a touch stick sprints
const STICK_SPRINT_THRESHOLD: f32 = 0.75;

/// Ground-plane direction of screen up
const SCREEN_UP: Vec2 = Vec2::new(std::f32::consts::FRAC_1_SQRT_2, -std::f32::consts::FRAC_1_SQRT_2);

/// Accumulated input between two frames
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: BTreeSet<KeyAction>,
    /// Pointer in normalized device coordinates (y up)
    pointer: Option<Vec2>,
    /// Touch joystick (x = world X, y = world Z)
    stick: Vec2,
    stick_sprint: bool,
    attack: bool,
    switch_to: Option<WeaponKind>,
    reload: bool,
    pause: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, code: &str, bindings: &KeyBindings) {
        let Some(action) = bindings.action_for(code) else {
            return;
        };
        if action.is_held() {
            self.held.insert(action);
        } else if let Some(weapon) = action.weapon() {
            self.switch_to = Some(weapon);
        } else if action == KeyAction::Reload {
            self.reload = true;
        } else if action == KeyAction::Pause {
            self.pause = true;
        }
    }

    pub fn key_up(&mut self, code: &str, bindings: &KeyBindings) {
        if let Some(action) = bindings.action_for(code) {
            self.held.remove(&action);
        }
    }

    /// Left button attacks; other buttons are ignored
    pub fn mouse_down(&mut self, button: i16) {
        if button == 0 {
            self.attack = true;
        }
    }

    /// Pointer position in normalized device coordinates
    pub fn pointer_moved(&mut self, ndc_x: f32, ndc_y: f32) {
        self.pointer = Some(Vec2::new(ndc_x, ndc_y));
    }

    /// Touch joystick; length is clamped to 1
    pub fn set_stick(&mut self, x: f32, z: f32) {
        self.stick = Vec2::new(x, z).clamp_length_max(1.0);
        self.stick_sprint = false;
    }

    /// Touch joystick from a drag of `dx, dy` pixels off the pad center.
    /// Screen x maps to world X, screen y to world Z; a drag past
    /// three quarters of `radius` sprints.
    pub fn drag_stick(&mut self, dx: f32, dy: f32, radius: f32) {
        if radius <= 0.0 {
            return;
        }
        let offset = Vec2::new(dx, dy) / radius;
        self.set_stick(offset.x, offset.y);
        self.stick_sprint = offset.length() > STICK_SPRINT_THRESHOLD;
    }

    /// Touch ended or was cancelled
    pub fn release_stick(&mut self) {
        self.set_stick(0.0, 0.0);
    }

    /// Pause toggle from a menu button
    pub fn request_pause(&mut self) {
        self.pause = true;
    }

    /// Touch fire button
    pub fn trigger_attack(&mut self) {
        self.attack = true;
    }

    /// Drop held keys (window blur loses key-up events)
    pub fn release_all(&mut self) {
        self.held.clear();
        self.release_stick();
    }

    /// Keyboard movement, or the joystick when no key is held
    pub fn move_dir(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        for action in &self.held {
            match action {
                KeyAction::MoveForward => dir.y -= 1.0,
                KeyAction::MoveBack => dir.y += 1.0,
                KeyAction::MoveLeft => dir.x -= 1.0,
                KeyAction::MoveRight => dir.x += 1.0,
                _ => {}
            }
        }
        if dir == Vec2::ZERO {
            self.stick
        } else {
            dir.normalize_or_zero()
        }
    }

    /// Aim from the joystick when touching, else from the pointer
    /// relative to screen center (where the camera keeps the player)
    pub fn aim(&self) -> Aim {
        if self.stick != Vec2::ZERO {
            return Aim::Stick(self.stick);
        }
        match self.pointer {
            Some(p) if p != Vec2::ZERO => Aim::Stick(SCREEN_RIGHT * p.x + SCREEN_UP * p.y),
            _ => Aim::None,
        }
    }

    /// Shift held, or the touch stick pushed far
    pub fn sprinting(&self) -> bool {
        self.held.contains(&KeyAction::Sprint) || self.stick_sprint
    }

    /// Snapshot for this frame; one-shot presses are consumed
    pub fn take(&mut self) -> TickInput {
        TickInput {
            attack: std::mem::take(&mut self.attack),
            aim: self.aim(),
            move_dir: self.move_dir(),
            sprint: self.sprinting(),
            switch_to: self.switch_to.take(),
            reload: std::mem::take(&mut self.reload),
            pause: std::mem::take(&mut self.pause),
        }
    }
}
