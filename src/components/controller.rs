//! Keyboard-driven first person movement.

use bevy_math::Vec3;

use super::component::{Capabilities, Component, UpdateContext, component_boilerplate};
use crate::resources::input::Key;

/// Moves the owner on the ground plane with WASD.
///
/// Forward/back follow the owner's facing, strafing follows its right axis.
/// Both are flattened onto the XZ plane so looking up or down never lifts the
/// player off the ground.
#[derive(Debug, Clone)]
pub struct FirstPersonController {
    /// Units per second.
    pub move_speed: f32,
    /// Degrees per second applied by the arrow keys.
    pub turn_speed: f32,
    enabled: bool,
}

impl FirstPersonController {
    pub fn new(move_speed: f32, turn_speed: f32) -> Self {
        Self {
            move_speed,
            turn_speed,
            enabled: true,
        }
    }
}

impl Component for FirstPersonController {
    component_boilerplate!("FirstPersonController");

    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATABLE | Capabilities::INPUT_HANDLING
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let dt = ctx.time.delta_secs();
        let input = ctx.input;

        let mut yaw = 0.0;
        if input.is_pressed(Key::Left) {
            yaw += self.turn_speed * dt;
        }
        if input.is_pressed(Key::Right) {
            yaw -= self.turn_speed * dt;
        }
        if yaw != 0.0 {
            ctx.transform.rotate_degrees(Vec3::new(0.0, yaw, 0.0));
        }

        let forward = flatten(ctx.transform.forward());
        let right = flatten(ctx.transform.right());
        let mut direction = Vec3::ZERO;
        if input.is_pressed(Key::W) {
            direction += forward;
        }
        if input.is_pressed(Key::S) {
            direction -= forward;
        }
        if input.is_pressed(Key::D) {
            direction += right;
        }
        if input.is_pressed(Key::A) {
            direction -= right;
        }
        if direction != Vec3::ZERO {
            ctx.transform
                .translate(direction.normalize_or_zero() * self.move_speed * dt);
        }
    }
}

fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z).normalize_or_zero()
}
