//! Orbit inspection camera.
//!
//! The camera sits on a sphere around a target point and always looks at it.
//! Position is kept as spherical coordinates (azimuth around +Y, polar angle
//! down from +Y, distance). Drags, pans and wheel steps are queued and eased
//! in over the following frames when `damping_factor` is non-zero.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::input::InputFrame;
use crate::view::{CameraPose, look_rotation};

/// Smallest gap kept between the polar angle and either pole.
pub const POLAR_EPSILON: f32 = 1e-4;

/// Frame rate the damping factor is expressed against.
const REFERENCE_FPS: f32 = 60.0;

/// Settings for the orbit camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    /// Point the camera orbits and looks at.
    pub target: Vec3,
    /// Closest allowed distance to the target.
    pub min_distance: f32,
    /// Farthest allowed distance from the target.
    pub max_distance: f32,
    /// Smallest polar angle in radians (0 is straight above the target).
    pub min_polar_angle: f32,
    /// Largest polar angle in radians (π is straight below the target).
    pub max_polar_angle: f32,
    /// Radians of rotation per pixel of primary drag.
    pub rotate_sensitivity: f32,
    /// Target travel per pixel of secondary drag, as a fraction of distance.
    pub pan_sensitivity: f32,
    /// Distance multiplier per wheel step towards the target.
    pub zoom_step: f32,
    /// Fraction of queued motion applied per reference frame; 0 disables
    /// easing.
    pub damping_factor: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            target: Vec3::new(0.0, 1.0, 0.0),
            min_distance: 0.5,
            max_distance: 50.0,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            rotate_sensitivity: 0.005,
            pan_sensitivity: 0.002,
            zoom_step: 0.95,
            damping_factor: 0.05,
        }
    }
}

impl OrbitSettings {
    /// Polar range actually enforced, kept strictly inside `(0, π)`.
    pub fn polar_bounds(&self) -> (f32, f32) {
        let lo = self.min_polar_angle.max(POLAR_EPSILON);
        let hi = self.max_polar_angle.min(PI - POLAR_EPSILON);
        (lo, hi.max(lo))
    }
}

/// Motion queued but not yet applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PendingMotion {
    azimuth: f32,
    polar: f32,
    /// Screen-space pan in pixels.
    pan: Vec2,
    /// Natural log of the pending distance scale.
    zoom: f32,
}

impl PendingMotion {
    fn scale(&mut self, factor: f32) {
        self.azimuth *= factor;
        self.polar *= factor;
        self.pan *= factor;
        self.zoom *= factor;
    }
}

/// Orbit camera state.
#[derive(Debug, Clone)]
pub struct OrbitRig {
    settings: OrbitSettings,
    target: Vec3,
    azimuth: f32,
    polar: f32,
    distance: f32,
    pending: PendingMotion,
}

impl OrbitRig {
    /// Create an orbit rig with the camera placed at `position`.
    pub fn new(settings: OrbitSettings, position: Vec3) -> Self {
        let mut rig = Self {
            target: settings.target,
            settings,
            azimuth: 0.0,
            polar: PI / 2.0,
            distance: 1.0,
            pending: PendingMotion::default(),
        };
        rig.sync_to(position);
        rig
    }

    pub fn settings(&self) -> &OrbitSettings {
        &self.settings
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Re-derive spherical coordinates from a camera position, dropping any
    /// queued motion.
    pub fn sync_to(&mut self, position: Vec3) {
        self.pending = PendingMotion::default();
        let offset = position - self.target;
        let length = offset.length();
        if length > f32::EPSILON {
            self.azimuth = offset.x.atan2(offset.z);
            self.polar = (offset.y / length).clamp(-1.0, 1.0).acos();
            self.distance = length;
        }
        self.clamp();
    }

    /// Queue a rotation from a primary drag of `delta` pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        self.pending.azimuth -= delta.x * self.settings.rotate_sensitivity;
        self.pending.polar -= delta.y * self.settings.rotate_sensitivity;
    }

    /// Queue a pan from a secondary drag of `delta` pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.pending.pan += delta;
    }

    /// Queue a dolly of `steps` wheel steps; positive moves closer.
    pub fn zoom(&mut self, steps: f32) {
        if self.settings.zoom_step > 0.0 {
            self.pending.zoom += steps * self.settings.zoom_step.ln();
        }
    }

    /// Queue everything an input frame carries for this mode.
    pub fn apply_input(&mut self, frame: &InputFrame) {
        self.rotate(frame.rotate_delta);
        self.pan(frame.pan_delta);
        self.zoom(frame.wheel);
    }

    /// Advance by `dt` seconds and return the resulting pose.
    pub fn update(&mut self, dt: f32) -> CameraPose {
        let applied = self.eased_fraction(dt);
        if applied > 0.0 {
            let step = {
                let mut step = self.pending;
                step.scale(applied);
                step
            };
            self.pending.scale(1.0 - applied);

            if step.pan != Vec2::ZERO {
                let pose = self.pose();
                let scale = self.distance * self.settings.pan_sensitivity;
                self.target += (pose.right() * -step.pan.x + pose.up() * step.pan.y) * scale;
            }
            self.azimuth = (self.azimuth + step.azimuth).rem_euclid(TAU);
            self.polar += step.polar;
            self.distance *= step.zoom.exp();
        }
        self.clamp();
        self.pose()
    }

    /// Current camera pose.
    pub fn pose(&self) -> CameraPose {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        let offset = Vec3::new(
            sin_polar * sin_azimuth,
            cos_polar,
            sin_polar * cos_azimuth,
        ) * self.distance;
        CameraPose {
            position: self.target + offset,
            rotation: look_rotation(-offset, Vec3::Y),
        }
    }

    fn eased_fraction(&self, dt: f32) -> f32 {
        let factor = self.settings.damping_factor;
        if factor <= 0.0 {
            return 1.0;
        }
        if !(dt > 0.0) {
            return 0.0;
        }
        let retained = (1.0 - factor.min(1.0)).powf(dt * REFERENCE_FPS);
        1.0 - retained
    }

    fn clamp(&mut self) {
        let (lo, hi) = self.settings.polar_bounds();
        self.polar = self.polar.clamp(lo, hi);
        // max/min rather than clamp: unvalidated settings must not panic.
        self.distance = self
            .distance
            .max(self.settings.min_distance)
            .min(self.settings.max_distance);
    }
}
