//! Input bookkeeping shared by both camera modes.
//!
//! Event handlers write into [`InputState`] as input arrives. The rig drains
//! it once per frame with [`InputState::take_frame`], which returns a
//! consistent snapshot and resets the accumulated deltas.

use glam::Vec2;

/// Logical movement actions used by the first-person rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveAction {
    MoveForward,
    MoveBackward,
    StrafeLeft,
    StrafeRight,
}

impl MoveAction {
    /// All movement actions, in index order.
    pub const ALL: [MoveAction; 4] = [
        MoveAction::MoveForward,
        MoveAction::MoveBackward,
        MoveAction::StrafeLeft,
        MoveAction::StrafeRight,
    ];

    fn index(self) -> usize {
        match self {
            MoveAction::MoveForward => 0,
            MoveAction::MoveBackward => 1,
            MoveAction::StrafeLeft => 2,
            MoveAction::StrafeRight => 3,
        }
    }
}

/// Pointer buttons that start an orbit drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragButton {
    /// Rotates around the target.
    Primary,
    /// Pans the target.
    Secondary,
}

/// Pressed/released state for the four movement actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementKeys([bool; 4]);

impl MovementKeys {
    /// Returns whether the given action is held.
    pub fn is_pressed(self, action: MoveAction) -> bool {
        self.0[action.index()]
    }

    /// Returns true if no action is held.
    pub fn is_idle(self) -> bool {
        self.0.iter().all(|pressed| !pressed)
    }

    /// Local movement direction: `x` is strafe right, `y` is forward.
    ///
    /// Normalized, so holding two orthogonal keys is no faster than one.
    /// Opposing keys cancel out.
    pub fn direction(self) -> Vec2 {
        let axis = |positive: MoveAction, negative: MoveAction| {
            f32::from(u8::from(self.is_pressed(positive)))
                - f32::from(u8::from(self.is_pressed(negative)))
        };
        Vec2::new(
            axis(MoveAction::StrafeRight, MoveAction::StrafeLeft),
            axis(MoveAction::MoveForward, MoveAction::MoveBackward),
        )
        .normalize_or_zero()
    }

    fn set(&mut self, action: MoveAction, pressed: bool) {
        self.0[action.index()] = pressed;
    }
}

/// Snapshot of input consumed by one frame update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    /// Movement keys held at the time of the snapshot.
    pub keys: MovementKeys,
    /// Pointer motion since the previous frame, in pixels.
    pub pointer_delta: Vec2,
    /// Pointer motion while the primary button was held.
    pub rotate_delta: Vec2,
    /// Pointer motion while the secondary button was held.
    pub pan_delta: Vec2,
    /// Accumulated wheel steps; positive zooms in.
    pub wheel: f32,
}

/// Accumulated input between frames.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: MovementKeys,
    drag: Option<DragButton>,
    pointer_delta: Vec2,
    rotate_delta: Vec2,
    pan_delta: Vec2,
    wheel: f32,
}

impl InputState {
    /// Create an idle input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a movement key press.
    pub fn press(&mut self, action: MoveAction) {
        self.keys.set(action, true);
    }

    /// Record a movement key release.
    pub fn release(&mut self, action: MoveAction) {
        self.keys.set(action, false);
    }

    /// Returns whether the given action is currently held.
    pub fn is_pressed(&self, action: MoveAction) -> bool {
        self.keys.is_pressed(action)
    }

    /// Current movement keys.
    pub fn keys(&self) -> MovementKeys {
        self.keys
    }

    /// Release every movement key and end any drag.
    ///
    /// Called on every transition out of first-person mode so that a key
    /// released while capture was lost cannot stay stuck down.
    pub fn release_all(&mut self) {
        self.keys = MovementKeys::default();
        self.reset_pointer();
    }

    /// End any drag and drop accumulated pointer and wheel motion. Held
    /// movement keys are kept.
    pub fn reset_pointer(&mut self) {
        self.drag = None;
        self.pointer_delta = Vec2::ZERO;
        self.rotate_delta = Vec2::ZERO;
        self.pan_delta = Vec2::ZERO;
        self.wheel = 0.0;
    }

    /// Begin a drag with the given button. A second button is ignored while
    /// a drag is in progress.
    pub fn pointer_down(&mut self, button: DragButton) {
        if self.drag.is_none() {
            self.drag = Some(button);
        }
    }

    /// End the drag started by the given button.
    pub fn pointer_up(&mut self, button: DragButton) {
        if self.drag == Some(button) {
            self.drag = None;
        }
    }

    /// The button currently dragging, if any.
    pub fn drag(&self) -> Option<DragButton> {
        self.drag
    }

    /// Accumulate relative pointer motion.
    pub fn pointer_moved(&mut self, delta: Vec2) {
        self.pointer_delta += delta;
        match self.drag {
            Some(DragButton::Primary) => self.rotate_delta += delta,
            Some(DragButton::Secondary) => self.pan_delta += delta,
            None => {}
        }
    }

    /// Accumulate wheel steps.
    pub fn wheel(&mut self, steps: f32) {
        self.wheel += steps;
    }

    /// Snapshot the current state and reset accumulated deltas.
    ///
    /// Key and drag state persist across frames.
    pub fn take_frame(&mut self) -> InputFrame {
        InputFrame {
            keys: self.keys,
            pointer_delta: std::mem::take(&mut self.pointer_delta),
            rotate_delta: std::mem::take(&mut self.rotate_delta),
            pan_delta: std::mem::take(&mut self.pan_delta),
            wheel: std::mem::take(&mut self.wheel),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_single_key() {
        let mut input = InputState::new();
        input.press(MoveAction::MoveForward);
        assert_eq!(input.keys().direction(), Vec2::new(0.0, 1.0));

        input.release(MoveAction::MoveForward);
        input.press(MoveAction::StrafeLeft);
        assert_eq!(input.keys().direction(), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_direction_diagonal_is_normalized() {
        let mut input = InputState::new();
        input.press(MoveAction::MoveForward);
        input.press(MoveAction::StrafeRight);
        let direction = input.keys().direction();
        assert!((direction.length() - 1.0).abs() < 1e-6);
        assert!(direction.x > 0.0 && direction.y > 0.0);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let mut input = InputState::new();
        input.press(MoveAction::MoveForward);
        input.press(MoveAction::MoveBackward);
        assert_eq!(input.keys().direction(), Vec2::ZERO);
    }

    #[test]
    fn test_take_frame_resets_deltas_but_keeps_keys() {
        let mut input = InputState::new();
        input.press(MoveAction::MoveBackward);
        input.pointer_moved(Vec2::new(3.0, -2.0));
        input.wheel(1.5);

        let frame = input.take_frame();
        assert_eq!(frame.pointer_delta, Vec2::new(3.0, -2.0));
        assert_eq!(frame.wheel, 1.5);
        assert!(frame.keys.is_pressed(MoveAction::MoveBackward));

        let frame = input.take_frame();
        assert_eq!(frame.pointer_delta, Vec2::ZERO);
        assert_eq!(frame.wheel, 0.0);
        assert!(frame.keys.is_pressed(MoveAction::MoveBackward));
    }

    #[test]
    fn test_drag_routes_pointer_motion() {
        let mut input = InputState::new();
        input.pointer_moved(Vec2::new(1.0, 0.0));
        input.pointer_down(DragButton::Primary);
        input.pointer_moved(Vec2::new(2.0, 0.0));
        // Secondary is ignored while the primary drag is active.
        input.pointer_down(DragButton::Secondary);
        input.pointer_moved(Vec2::new(0.0, 4.0));
        input.pointer_up(DragButton::Primary);
        input.pointer_down(DragButton::Secondary);
        input.pointer_moved(Vec2::new(5.0, 5.0));

        let frame = input.take_frame();
        assert_eq!(frame.pointer_delta, Vec2::new(8.0, 9.0));
        assert_eq!(frame.rotate_delta, Vec2::new(2.0, 4.0));
        assert_eq!(frame.pan_delta, Vec2::new(5.0, 5.0));
        assert_eq!(input.drag(), Some(DragButton::Secondary));
    }

    #[test]
    fn test_release_all() {
        let mut input = InputState::new();
        for action in MoveAction::ALL {
            input.press(action);
        }
        input.pointer_down(DragButton::Primary);
        input.release_all();
        assert!(input.keys().is_idle());
        assert_eq!(input.drag(), None);
    }

    #[test]
    fn test_reset_pointer_keeps_keys() {
        let mut input = InputState::new();
        input.press(MoveAction::StrafeRight);
        input.pointer_down(DragButton::Secondary);
        input.pointer_moved(Vec2::new(6.0, 1.0));
        input.wheel(2.0);
        input.reset_pointer();

        assert_eq!(input.drag(), None);
        assert!(input.is_pressed(MoveAction::StrafeRight));
        let frame = input.take_frame();
        assert_eq!(frame.pointer_delta, Vec2::ZERO);
        assert_eq!(frame.pan_delta, Vec2::ZERO);
        assert_eq!(frame.wheel, 0.0);
    }
}
