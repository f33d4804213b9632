//! Slow globe spin.

use std::f32::consts::TAU;

use glam::Quat;

/// Rotates the globe about +Y at a constant rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinDriver {
    /// Radians per second.
    rate: f32,
    angle: f32,
}

impl SpinDriver {
    pub fn new(rate: f32) -> Self {
        Self { rate, angle: 0.0 }
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Current angle in `[0, 2π)`.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Advance by `dt` seconds and return the new rotation.
    pub fn advance(&mut self, dt: f32) -> Quat {
        if dt.is_finite() && dt > 0.0 {
            self.angle = (self.angle + self.rate * dt).rem_euclid(TAU);
        }
        self.rotation()
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_is_frame_rate_independent() {
        let mut coarse = SpinDriver::new(0.048);
        let mut fine = SpinDriver::new(0.048);
        for _ in 0..30 {
            coarse.advance(1.0 / 30.0);
        }
        for _ in 0..120 {
            fine.advance(1.0 / 120.0);
        }
        assert!((coarse.angle() - 0.048).abs() < 1e-5);
        assert!((coarse.angle() - fine.angle()).abs() < 1e-5);
    }

    #[test]
    fn test_angle_wraps() {
        let mut spin = SpinDriver::new(1.0);
        spin.advance(TAU + 0.5);
        assert!((spin.angle() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_ignores_bad_dt() {
        let mut spin = SpinDriver::new(1.0);
        spin.advance(-1.0);
        spin.advance(f32::NAN);
        assert_eq!(spin.angle(), 0.0);
    }
}
