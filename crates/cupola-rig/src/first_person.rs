//! First-person walking camera.
//!
//! Pointer deltas steer yaw and pitch. Movement keys push a damped velocity
//! in the camera's local ground plane, which is then resolved into world
//! space along the current look direction flattened onto the XZ plane.

use glam::{EulerRot, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::input::InputFrame;
use crate::view::CameraPose;

/// Settings for first-person movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirstPersonSettings {
    /// Acceleration applied along the pressed direction, in units/s².
    pub speed: f32,
    /// Exponential velocity decay rate per second.
    pub damping: f32,
    /// Radians of yaw/pitch per pixel of pointer motion.
    pub look_sensitivity: f32,
    /// Largest pitch magnitude in radians; must stay below π/2.
    pub pitch_limit: f32,
}

impl Default for FirstPersonSettings {
    fn default() -> Self {
        Self {
            speed: 20.0,
            damping: 6.0,
            look_sensitivity: 0.002,
            pitch_limit: 89_f32.to_radians(),
        }
    }
}

impl FirstPersonSettings {
    /// Speed the velocity settles at while a key is held.
    pub fn terminal_speed(&self) -> f32 {
        if self.damping > 0.0 {
            self.speed / self.damping
        } else {
            f32::INFINITY
        }
    }
}

/// First-person camera state.
#[derive(Debug, Clone)]
pub struct FirstPersonRig {
    settings: FirstPersonSettings,
    yaw: f32,
    pitch: f32,
    /// `x` is strafe right, `y` is forward.
    velocity: Vec2,
}

impl FirstPersonRig {
    pub fn new(settings: FirstPersonSettings) -> Self {
        Self {
            settings,
            yaw: 0.0,
            pitch: 0.0,
            velocity: Vec2::ZERO,
        }
    }

    pub fn settings(&self) -> &FirstPersonSettings {
        &self.settings
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Local-plane velocity (`x` right, `y` forward).
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Adopt an existing orientation and come to rest.
    pub fn enter(&mut self, rotation: Quat) {
        let (yaw, pitch, _) = rotation.to_euler(EulerRot::YXZ);
        self.yaw = yaw;
        self.pitch = pitch.clamp(-self.pitch_limit(), self.pitch_limit());
        self.velocity = Vec2::ZERO;
    }

    /// Drop any remaining velocity.
    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }

    /// Current look orientation.
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Apply pointer motion to yaw and pitch.
    pub fn look(&mut self, delta: Vec2) {
        let sensitivity = self.settings.look_sensitivity;
        self.yaw -= delta.x * sensitivity;
        let limit = self.pitch_limit();
        self.pitch = (self.pitch - delta.y * sensitivity).clamp(-limit, limit);
    }

    /// Integrate one frame of `dt` seconds and move `pose` accordingly.
    pub fn update(&mut self, dt: f32, frame: &InputFrame, pose: &mut CameraPose) {
        self.look(frame.pointer_delta);
        pose.rotation = self.rotation();

        if !(dt > 0.0) {
            return;
        }

        let direction = frame.keys.direction();

        // Clamped so a long frame cannot overshoot zero and flip the sign.
        let decay = (self.settings.damping * dt).clamp(0.0, 1.0);
        self.velocity -= self.velocity * decay;
        self.velocity += direction * self.settings.speed * dt;

        let (forward, right) = ground_axes(pose.rotation);
        pose.position += (forward * self.velocity.y + right * self.velocity.x) * dt;
    }

    fn pitch_limit(&self) -> f32 {
        self.settings
            .pitch_limit
            .clamp(0.0, std::f32::consts::FRAC_PI_2 - 1e-3)
    }
}

/// Forward and right vectors of `rotation` flattened onto the XZ plane.
fn ground_axes(rotation: Quat) -> (Vec3, Vec3) {
    let flatten = |v: Vec3| Vec3::new(v.x, 0.0, v.z).normalize_or_zero();
    (
        flatten(rotation * Vec3::NEG_Z),
        flatten(rotation * Vec3::X),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputState, MoveAction};

    const DT: f32 = 1.0 / 60.0;

    fn frame_with(actions: &[MoveAction]) -> InputFrame {
        let mut input = InputState::new();
        for action in actions {
            input.press(*action);
        }
        input.take_frame()
    }

    fn run(rig: &mut FirstPersonRig, pose: &mut CameraPose, frame: &InputFrame, frames: usize) {
        for _ in 0..frames {
            rig.update(DT, frame, pose);
        }
    }

    #[test]
    fn test_damping_converges_monotonically() {
        let mut rig = FirstPersonRig::new(FirstPersonSettings::default());
        let mut pose = CameraPose::default();
        run(&mut rig, &mut pose, &frame_with(&[MoveAction::MoveForward]), 120);
        let initial = rig.velocity().length();
        assert!(initial > 0.0);

        let idle = frame_with(&[]);
        let mut previous = initial;
        let mut frames_to_settle = None;
        for n in 1..=200 {
            rig.update(DT, &idle, &mut pose);
            let speed = rig.velocity().length();
            assert!(speed <= previous);
            assert!(rig.velocity().y >= 0.0, "damping must not reverse direction");
            previous = speed;
            if frames_to_settle.is_none() && speed < initial * 0.01 {
                frames_to_settle = Some(n);
            }
        }
        let frames = frames_to_settle.unwrap();
        assert!(frames <= 50, "took {frames} frames");
    }

    #[test]
    fn test_long_frame_does_not_oscillate() {
        let mut rig = FirstPersonRig::new(FirstPersonSettings::default());
        let mut pose = CameraPose::default();
        run(&mut rig, &mut pose, &frame_with(&[MoveAction::StrafeRight]), 60);
        rig.update(0.5, &frame_with(&[]), &mut pose);
        assert_eq!(rig.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_diagonal_not_faster_than_single() {
        let mut single = FirstPersonRig::new(FirstPersonSettings::default());
        let mut diagonal = FirstPersonRig::new(FirstPersonSettings::default());
        let mut pose_a = CameraPose::default();
        let mut pose_b = CameraPose::default();

        run(&mut single, &mut pose_a, &frame_with(&[MoveAction::MoveForward]), 90);
        run(
            &mut diagonal,
            &mut pose_b,
            &frame_with(&[MoveAction::MoveForward, MoveAction::StrafeLeft]),
            90,
        );

        assert!(diagonal.velocity().length() <= single.velocity().length() + 1e-5);
        let travelled_a = pose_a.position.length();
        let travelled_b = pose_b.position.length();
        assert!(travelled_b <= travelled_a + 1e-4);
    }

    #[test]
    fn test_speed_bounded_by_terminal() {
        let settings = FirstPersonSettings::default();
        let terminal = settings.terminal_speed();
        let mut rig = FirstPersonRig::new(settings);
        let mut pose = CameraPose::default();
        run(&mut rig, &mut pose, &frame_with(&[MoveAction::MoveBackward]), 600);
        assert!(rig.velocity().length() <= terminal + 1e-3);
        assert!((rig.velocity().length() - terminal).abs() < 0.05);
    }

    #[test]
    fn test_motion_follows_look_direction() {
        let mut rig = FirstPersonRig::new(FirstPersonSettings::default());
        let mut pose = CameraPose::default();
        // Turn a quarter to the left: forward becomes -X.
        rig.enter(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        run(&mut rig, &mut pose, &frame_with(&[MoveAction::MoveForward]), 30);
        assert!(pose.position.x < -0.1);
        assert!(pose.position.z.abs() < 1e-3);
        assert!(pose.position.y.abs() < 1e-6);
    }

    #[test]
    fn test_pitch_does_not_lift_off_the_ground_plane() {
        let mut rig = FirstPersonRig::new(FirstPersonSettings::default());
        let mut pose = CameraPose::default();
        let mut frame = frame_with(&[MoveAction::MoveForward]);
        frame.pointer_delta = Vec2::new(0.0, -400.0);
        rig.update(DT, &frame, &mut pose);
        frame.pointer_delta = Vec2::ZERO;
        run(&mut rig, &mut pose, &frame, 30);
        assert!(rig.pitch() > 0.5);
        assert!(pose.position.y.abs() < 1e-6);
        assert!(pose.position.z < 0.0);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut rig = FirstPersonRig::new(FirstPersonSettings::default());
        rig.look(Vec2::new(0.0, -1.0e6));
        assert!(rig.pitch() <= 89_f32.to_radians() + 1e-6);
        rig.look(Vec2::new(0.0, 1.0e6));
        assert!(rig.pitch() >= -89_f32.to_radians() - 1e-6);
    }
}
