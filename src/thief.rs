//! Engine-free character controller for the player's thief
//!
//! Y is up, yaw is in degrees, yaw 0 faces +Z and positive yaw turns towards +X.
//! Per frame the controller looks, walks, turns to face its walk direction,
//! casts down for the ground, jumps, falls.

use bevy_math::{Vec2, Vec3};

use crate::config::ThiefConfig;
use crate::trigger::Occupant;

/// Inputs below this squared magnitude are treated as released
pub const MIN_INPUT_SQR_MAGNITUDE: f32 = 0.01;
/// Vertical speeds below this are not integrated
pub const MIN_VERTICAL_VELOCITY: f32 = 0.001;

/// Downward ray used for the grounded check
pub trait Ground {
    /// True if a ray cast straight down from `origin` hits ground within `distance`
    fn raycast_down(&self, origin: Vec3, distance: f32) -> bool;
}

/// Infinite horizontal floor
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlatGround {
    pub height: f32,
}

impl FlatGround {
    pub fn new(height: f32) -> Self {
        Self { height }
    }
}

impl Ground for FlatGround {
    fn raycast_down(&self, origin: Vec3, distance: f32) -> bool {
        origin.y >= self.height && origin.y - distance <= self.height
    }
}

/// Orientation of the camera the movement input is relative to
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraBasis {
    pub forward: Vec3,
    pub right: Vec3,
}

impl CameraBasis {
    pub fn new(forward: Vec3, right: Vec3) -> Self {
        Self { forward, right }
    }

    /// Camera looking along a yaw angle in degrees
    pub fn from_yaw(yaw_degrees: f32) -> Self {
        Self {
            forward: yaw_forward(yaw_degrees),
            right: yaw_right(yaw_degrees),
        }
    }
}

/// Latest input state, as delivered by the input callbacks
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ThiefInput {
    pub movement: Vec2, // x = strafe, y = forward
    pub look: Vec2,     // x = yaw delta
    pub jump: bool,
}

fn yaw_forward(yaw_degrees: f32) -> Vec3 {
    let yaw = yaw_degrees.to_radians();
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

fn yaw_right(yaw_degrees: f32) -> Vec3 {
    let yaw = yaw_degrees.to_radians();
    Vec3::new(yaw.cos(), 0.0, -yaw.sin())
}

/// Shortest signed difference `to - from` in degrees, in -180..=180
fn delta_angle(from: f32, to: f32) -> f32 {
    let delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z).normalize_or_zero()
}

#[derive(Clone, Debug)]
pub struct Thief {
    pub config: ThiefConfig,
    position: Vec3,
    yaw: f32,
    vertical_velocity: f32,
    grounded: bool,
    jump_requested: bool,
    move_input: Vec2,
    look_input: Vec2,
}

impl Thief {
    pub fn new(config: ThiefConfig, position: Vec3) -> Self {
        Self {
            config,
            position,
            yaw: 0.0,
            vertical_velocity: 0.0,
            grounded: false,
            jump_requested: false,
            move_input: Vec2::ZERO,
            look_input: Vec2::ZERO,
        }
    }

    /// Move input callback (pressed and released)
    pub fn on_move(&mut self, value: Vec2) {
        self.move_input = value;
    }

    /// Look input callback (pressed and released)
    pub fn on_look(&mut self, value: Vec2) {
        self.look_input = value;
    }

    /// Jump input callback; consumed by the next update
    pub fn on_jump(&mut self) {
        self.jump_requested = true;
    }

    /// Feed a whole input snapshot at once
    pub fn apply_input(&mut self, input: &ThiefInput) {
        self.on_move(input.movement);
        self.on_look(input.look);
        if input.jump {
            self.on_jump();
        }
    }

    /// Advance one frame
    pub fn update(&mut self, dt: f32, camera: Option<&CameraBasis>, ground: &dyn Ground) {
        self.handle_look_rotation();
        self.handle_movement(dt, camera);
        self.handle_movement_rotation(dt, camera);
        self.update_grounded_state(ground);
        self.handle_jump();
        self.apply_gravity(dt);
        self.apply_vertical_movement(dt);
    }

    fn handle_look_rotation(&mut self) {
        if self.look_input.length_squared() < MIN_INPUT_SQR_MAGNITUDE {
            return;
        }

        self.yaw = (self.yaw + self.look_input.x * self.config.mouse_sensitivity).rem_euclid(360.0);
    }

    fn handle_movement(&mut self, dt: f32, camera: Option<&CameraBasis>) {
        let direction = self.move_direction(camera);
        if direction.length_squared() < MIN_INPUT_SQR_MAGNITUDE {
            return;
        }

        self.position += direction * self.config.move_speed * dt;
    }

    /// Turn to face the walk direction, unless the player is steering with look
    fn handle_movement_rotation(&mut self, dt: f32, camera: Option<&CameraBasis>) {
        if self.look_input.length_squared() >= MIN_INPUT_SQR_MAGNITUDE {
            return;
        }

        let direction = self.move_direction(camera);
        if direction.length_squared() < MIN_INPUT_SQR_MAGNITUDE {
            return;
        }

        let target_yaw = direction.x.atan2(direction.z).to_degrees();
        let max_turn = self.config.turn_speed * dt;
        let delta = delta_angle(self.yaw, target_yaw).clamp(-max_turn, max_turn);
        self.yaw = (self.yaw + delta).rem_euclid(360.0);
    }

    fn update_grounded_state(&mut self, ground: &dyn Ground) {
        self.grounded = self.check_grounded(ground);
        if self.grounded && self.vertical_velocity < 0.0 {
            self.vertical_velocity = 0.0;
        }
    }

    fn check_grounded(&self, ground: &dyn Ground) -> bool {
        let origin = self.position + Vec3::Y * self.config.ground_check_offset;
        let distance = self.config.ground_check_distance + self.config.ground_check_offset;
        ground.raycast_down(origin, distance)
    }

    fn handle_jump(&mut self) {
        if !self.jump_requested {
            return;
        }

        self.jump_requested = false;

        if !self.grounded {
            return;
        }

        self.vertical_velocity = (self.config.jump_height * -2.0 * self.config.gravity).max(0.0).sqrt();
    }

    fn apply_gravity(&mut self, dt: f32) {
        if self.grounded && self.vertical_velocity <= 0.0 {
            return;
        }

        self.vertical_velocity += self.config.gravity * dt;
    }

    fn apply_vertical_movement(&mut self, dt: f32) {
        if self.vertical_velocity.abs() < MIN_VERTICAL_VELOCITY {
            return;
        }

        self.position += Vec3::Y * self.vertical_velocity * dt;
    }

    /// Movement input mapped onto the ground plane, relative to the camera
    fn move_direction(&self, camera: Option<&CameraBasis>) -> Vec3 {
        if self.move_input.length_squared() < MIN_INPUT_SQR_MAGNITUDE {
            return Vec3::ZERO;
        }

        let (forward, right) = match camera {
            Some(camera) => (flatten(camera.forward), flatten(camera.right)),
            None => (self.forward(), self.right()),
        };

        (forward * self.move_input.y + right * self.move_input.x).normalize_or_zero()
    }

    pub fn forward(&self) -> Vec3 {
        yaw_forward(self.yaw)
    }

    pub fn right(&self) -> Vec3 {
        yaw_right(self.yaw)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw.rem_euclid(360.0);
    }

    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }
}

impl Occupant for Thief {
    fn is_thief(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_angle_wraps() {
        assert_eq!(delta_angle(350.0, 10.0), 20.0);
        assert_eq!(delta_angle(10.0, 350.0), -20.0);
        assert_eq!(delta_angle(0.0, 180.0), 180.0);
    }

    #[test]
    fn test_yaw_basis() {
        let forward = yaw_forward(90.0);
        assert!((forward - Vec3::X).length() < 1e-5);
        let right = yaw_right(0.0);
        assert!((right - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_flat_ground_raycast() {
        let ground = FlatGround::new(0.0);
        assert!(ground.raycast_down(Vec3::new(0.0, 0.1, 0.0), 0.3));
        assert!(!ground.raycast_down(Vec3::new(0.0, 1.0, 0.0), 0.3));
        assert!(!ground.raycast_down(Vec3::new(0.0, -0.5, 0.0), 0.3));
    }

    #[test]
    fn test_tiny_input_ignored() {
        let mut thief = Thief::new(ThiefConfig::default(), Vec3::ZERO);
        thief.on_move(Vec2::new(0.05, 0.05));
        thief.update(1.0 / 60.0, None, &FlatGround::default());
        assert_eq!(thief.position(), Vec3::ZERO);
    }
}
