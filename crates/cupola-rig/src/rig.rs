//! Dual-mode camera rig.
//!
//! ## Camera mode state machine
//!
//! - **Orbit** (initial): inspection camera around a fixed target.
//! - **FirstPerson**: walking camera driven by movement keys and captured
//!   pointer motion.
//!
//! ```text
//! Orbit --ToggleMode--> FirstPerson
//! FirstPerson --ToggleMode | Exit | CaptureLost--> Orbit
//! ```
//!
//! Transitions are immediate. Every transition out of first-person releases
//! all movement keys so none can stay stuck down.

use std::fmt;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::first_person::{FirstPersonRig, FirstPersonSettings};
use crate::input::{DragButton, InputState, MoveAction};
use crate::orbit::{OrbitRig, OrbitSettings};
use crate::view::CameraPose;

/// Camera control mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    /// Orbit around a target (default).
    #[default]
    Orbit,
    /// First-person walking.
    FirstPerson,
}

impl fmt::Display for CameraMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraMode::Orbit => f.write_str("orbit"),
            CameraMode::FirstPerson => f.write_str("first-person"),
        }
    }
}

/// Why the mode changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionReason {
    /// The mode-toggle key or button.
    Toggle,
    /// The explicit exit gesture.
    Exit,
    /// Exclusive pointer capture ended without being asked to.
    CaptureLost,
    /// Set directly by the host.
    Requested,
}

/// Logical input consumed by the rig.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RigEvent {
    KeyDown(MoveAction),
    KeyUp(MoveAction),
    /// Flip between orbit and first-person.
    ToggleMode,
    /// Force a return to orbit.
    Exit,
    /// Exclusive pointer capture was lost.
    CaptureLost,
    /// Relative pointer motion in pixels.
    PointerMoved(Vec2),
    PointerDown(DragButton),
    PointerUp(DragButton),
    /// Wheel steps; positive zooms in.
    Wheel(f32),
}

/// A completed mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTransition {
    pub from: CameraMode,
    pub to: CameraMode,
    pub reason: TransitionReason,
}

/// Owns the camera pose, both control modes and the input they read.
#[derive(Debug, Clone)]
pub struct CameraRig {
    mode: CameraMode,
    pose: CameraPose,
    input: InputState,
    orbit: OrbitRig,
    first_person: FirstPersonRig,
}

impl CameraRig {
    /// Create a rig in orbit mode with the camera at `position`.
    pub fn new(orbit: OrbitSettings, first_person: FirstPersonSettings, position: Vec3) -> Self {
        let orbit = OrbitRig::new(orbit, position);
        let pose = orbit.pose();
        Self {
            mode: CameraMode::Orbit,
            pose,
            input: InputState::new(),
            orbit,
            first_person: FirstPersonRig::new(first_person),
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Camera pose after the most recent update.
    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn orbit(&self) -> &OrbitRig {
        &self.orbit
    }

    pub fn first_person(&self) -> &FirstPersonRig {
        &self.first_person
    }

    /// Whether the host should hold exclusive pointer capture.
    pub fn wants_pointer_capture(&self) -> bool {
        self.mode == CameraMode::FirstPerson
    }

    /// Apply one input event. Returns the mode transition it caused, if any.
    pub fn handle(&mut self, event: RigEvent) -> Option<ModeTransition> {
        match event {
            RigEvent::KeyDown(action) => self.input.press(action),
            RigEvent::KeyUp(action) => self.input.release(action),
            RigEvent::PointerMoved(delta) => self.input.pointer_moved(delta),
            RigEvent::PointerDown(button) => self.input.pointer_down(button),
            RigEvent::PointerUp(button) => self.input.pointer_up(button),
            RigEvent::Wheel(steps) => self.input.wheel(steps),
            RigEvent::ToggleMode => {
                let to = match self.mode {
                    CameraMode::Orbit => CameraMode::FirstPerson,
                    CameraMode::FirstPerson => CameraMode::Orbit,
                };
                return self.transition(to, TransitionReason::Toggle);
            }
            RigEvent::Exit => return self.transition(CameraMode::Orbit, TransitionReason::Exit),
            RigEvent::CaptureLost => {
                return self.transition(CameraMode::Orbit, TransitionReason::CaptureLost);
            }
        }
        None
    }

    /// Switch to `mode` directly.
    pub fn set_mode(&mut self, mode: CameraMode) -> Option<ModeTransition> {
        self.transition(mode, TransitionReason::Requested)
    }

    /// Advance one frame of `dt` seconds and return the new pose.
    ///
    /// Non-finite or negative `dt` is treated as zero.
    pub fn update(&mut self, dt: f32) -> CameraPose {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let frame = self.input.take_frame();
        match self.mode {
            CameraMode::Orbit => {
                self.orbit.apply_input(&frame);
                self.pose = self.orbit.update(dt);
            }
            CameraMode::FirstPerson => {
                self.first_person.update(dt, &frame, &mut self.pose);
            }
        }
        self.pose
    }

    fn transition(&mut self, to: CameraMode, reason: TransitionReason) -> Option<ModeTransition> {
        let from = self.mode;
        if from == to {
            return None;
        }

        if from == CameraMode::FirstPerson {
            self.input.release_all();
            self.first_person.stop();
        }

        match to {
            CameraMode::Orbit => self.orbit.sync_to(self.pose.position),
            CameraMode::FirstPerson => {
                // Drop drag and wheel input queued for the orbit camera. Keys
                // already held carry over so walking starts at once.
                self.input.reset_pointer();
                self.first_person.enter(self.pose.rotation);
            }
        }

        self.mode = to;
        tracing::info!(%from, %to, ?reason, "camera mode changed");
        Some(ModeTransition { from, to, reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> CameraRig {
        CameraRig::new(
            OrbitSettings::default(),
            FirstPersonSettings::default(),
            Vec3::new(2.0, 3.0, 8.0),
        )
    }

    #[test]
    fn test_starts_in_orbit() {
        let rig = rig();
        assert_eq!(rig.mode(), CameraMode::Orbit);
        assert!(!rig.wants_pointer_capture());
    }

    #[test]
    fn test_toggle_flips_modes() {
        let mut rig = rig();
        let transition = rig.handle(RigEvent::ToggleMode).unwrap();
        assert_eq!(transition.to, CameraMode::FirstPerson);
        assert!(rig.wants_pointer_capture());

        let transition = rig.handle(RigEvent::ToggleMode).unwrap();
        assert_eq!(transition.from, CameraMode::FirstPerson);
        assert_eq!(rig.mode(), CameraMode::Orbit);
    }

    #[test]
    fn test_exit_in_orbit_is_noop() {
        let mut rig = rig();
        assert_eq!(rig.handle(RigEvent::Exit), None);
        assert_eq!(rig.handle(RigEvent::CaptureLost), None);
        assert_eq!(rig.mode(), CameraMode::Orbit);
    }

    #[test]
    fn test_forced_exit_releases_keys() {
        let mut rig = rig();
        rig.handle(RigEvent::ToggleMode);
        rig.handle(RigEvent::KeyDown(MoveAction::MoveForward));
        rig.handle(RigEvent::KeyDown(MoveAction::StrafeLeft));
        assert!(rig.input().is_pressed(MoveAction::MoveForward));

        let transition = rig.handle(RigEvent::Exit).unwrap();
        assert_eq!(transition.reason, TransitionReason::Exit);
        for action in MoveAction::ALL {
            assert!(!rig.input().is_pressed(action));
        }
    }

    #[test]
    fn test_capture_loss_returns_to_orbit_and_releases_keys() {
        let mut rig = rig();
        rig.handle(RigEvent::ToggleMode);
        rig.handle(RigEvent::KeyDown(MoveAction::MoveBackward));
        for _ in 0..10 {
            rig.update(1.0 / 60.0);
        }

        let transition = rig.handle(RigEvent::CaptureLost).unwrap();
        assert_eq!(transition.reason, TransitionReason::CaptureLost);
        assert_eq!(rig.mode(), CameraMode::Orbit);
        assert!(rig.input().keys().is_idle());
        assert_eq!(rig.first_person().velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_walking_moves_camera_and_orbit_resumes_from_there() {
        let mut rig = rig();
        let start = rig.pose().position;
        rig.handle(RigEvent::ToggleMode);
        rig.handle(RigEvent::KeyDown(MoveAction::MoveForward));
        for _ in 0..60 {
            rig.update(1.0 / 60.0);
        }
        let walked = rig.pose().position;
        assert!((walked - start).length() > 0.5);

        rig.handle(RigEvent::Exit);
        let pose = rig.update(0.0);
        assert!((pose.position - walked).length() < 1e-3);
        let to_target = (rig.orbit().target() - pose.position).normalize();
        assert!((pose.forward() - to_target).length() < 1e-4);
    }

    #[test]
    fn test_key_held_through_toggle_walks() {
        let mut rig = rig();
        let start = rig.pose().position;
        rig.handle(RigEvent::KeyDown(MoveAction::MoveForward));
        rig.handle(RigEvent::PointerDown(DragButton::Primary));
        rig.handle(RigEvent::Wheel(3.0));
        rig.handle(RigEvent::ToggleMode);

        assert!(rig.input().is_pressed(MoveAction::MoveForward));
        assert_eq!(rig.input().drag(), None);
        for _ in 0..30 {
            rig.update(1.0 / 60.0);
        }
        assert!((rig.pose().position - start).length() > 0.1);
    }

    #[test]
    fn test_entering_first_person_keeps_view_direction() {
        let mut rig = rig();
        let before = rig.pose();
        rig.handle(RigEvent::ToggleMode);
        let after = rig.update(0.0);
        assert!((after.forward() - before.forward()).length() < 1e-4);
        assert!((after.position - before.position).length() < 1e-6);
    }

    #[test]
    fn test_orbit_drag_rotates() {
        let mut rig = rig();
        let azimuth = rig.orbit().azimuth();
        rig.handle(RigEvent::PointerDown(DragButton::Primary));
        rig.handle(RigEvent::PointerMoved(Vec2::new(40.0, 0.0)));
        rig.handle(RigEvent::PointerUp(DragButton::Primary));
        for _ in 0..120 {
            rig.update(1.0 / 60.0);
        }
        assert!((rig.orbit().azimuth() - azimuth).abs() > 0.1);
    }

    #[test]
    fn test_update_ignores_bad_dt() {
        let mut rig = rig();
        let pose = rig.pose();
        assert_eq!(rig.update(f32::NAN), pose);
        assert_eq!(rig.update(-1.0), pose);
    }
}
