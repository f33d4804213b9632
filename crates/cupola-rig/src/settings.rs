//! Rig configuration.
//!
//! Every field has a default matching the stock viewer, so a settings file
//! only needs the values it changes:
//!
//! ```json
//! {
//!   "first_person": { "speed": 30.0 },
//!   "globe": { "frame": "body_fixed" },
//!   "surfaces": { "window_pane": "glass" }
//! }
//! ```

use std::f32::consts::PI;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::first_person::FirstPersonSettings;
use crate::geocode::GeoFrame;
use crate::orbit::OrbitSettings;
use crate::rig::CameraMode;
use crate::surface::SurfaceTable;

/// Perspective lens parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensSettings {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for LensSettings {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.01,
            far: 1000.0,
        }
    }
}

impl LensSettings {
    pub fn fov_y(&self) -> f32 {
        self.fov_y_degrees.to_radians()
    }
}

/// Globe placement and behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeSettings {
    /// World-space centre.
    pub center: Vec3,
    pub radius: f32,
    /// Spin about +Y in radians per second.
    pub spin_rate: f32,
    /// Frame coordinates are reported in.
    pub frame: GeoFrame,
}

impl Default for GlobeSettings {
    fn default() -> Self {
        Self {
            center: Vec3::new(0.0, -26.0, 0.0),
            radius: 24.0,
            spin_rate: 0.048,
            frame: GeoFrame::World,
        }
    }
}

/// Complete configuration for one viewer session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigSettings {
    pub orbit: OrbitSettings,
    pub first_person: FirstPersonSettings,
    pub lens: LensSettings,
    pub globe: GlobeSettings,
    /// Initial camera position.
    pub start_position: Vec3,
    pub initial_mode: CameraMode,
    /// Mesh identifier to surface class.
    pub surfaces: SurfaceTable,
}

impl Default for RigSettings {
    fn default() -> Self {
        Self {
            orbit: OrbitSettings::default(),
            first_person: FirstPersonSettings::default(),
            lens: LensSettings::default(),
            globe: GlobeSettings::default(),
            start_position: Vec3::new(2.0, 3.0, 8.0),
            initial_mode: CameraMode::Orbit,
            surfaces: SurfaceTable::new(),
        }
    }
}

impl RigSettings {
    /// Parse and validate settings from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a settings file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| Error::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// Check every value against its allowed range.
    pub fn validate(&self) -> Result<()> {
        let orbit = &self.orbit;
        positive("orbit.min_distance", orbit.min_distance)?;
        if !(orbit.max_distance >= orbit.min_distance) {
            return Err(Error::invalid(
                "orbit.max_distance",
                format!(
                    "{} is below min_distance {}",
                    orbit.max_distance, orbit.min_distance
                ),
            ));
        }
        in_range("orbit.min_polar_angle", orbit.min_polar_angle, 0.0, PI)?;
        in_range("orbit.max_polar_angle", orbit.max_polar_angle, 0.0, PI)?;
        if !(orbit.min_polar_angle < orbit.max_polar_angle) {
            return Err(Error::invalid(
                "orbit.max_polar_angle",
                "must be greater than min_polar_angle",
            ));
        }
        positive("orbit.rotate_sensitivity", orbit.rotate_sensitivity)?;
        non_negative("orbit.pan_sensitivity", orbit.pan_sensitivity)?;
        if !(orbit.zoom_step > 0.0 && orbit.zoom_step <= 1.0) {
            return Err(Error::invalid(
                "orbit.zoom_step",
                format!("{} is outside (0, 1]", orbit.zoom_step),
            ));
        }
        in_range("orbit.damping_factor", orbit.damping_factor, 0.0, 1.0)?;

        let first_person = &self.first_person;
        non_negative("first_person.speed", first_person.speed)?;
        non_negative("first_person.damping", first_person.damping)?;
        positive("first_person.look_sensitivity", first_person.look_sensitivity)?;
        in_range(
            "first_person.pitch_limit",
            first_person.pitch_limit,
            0.0,
            PI / 2.0,
        )?;

        let lens = &self.lens;
        if !(lens.fov_y_degrees > 0.0 && lens.fov_y_degrees < 180.0) {
            return Err(Error::invalid(
                "lens.fov_y_degrees",
                format!("{} is outside (0, 180)", lens.fov_y_degrees),
            ));
        }
        positive("lens.near", lens.near)?;
        if !(lens.far > lens.near) {
            return Err(Error::invalid("lens.far", "must be greater than lens.near"));
        }

        positive("globe.radius", self.globe.radius)?;
        finite("globe.spin_rate", self.globe.spin_rate)?;
        if !self.globe.center.is_finite() {
            return Err(Error::invalid("globe.center", "must be finite"));
        }
        if !self.start_position.is_finite() {
            return Err(Error::invalid("start_position", "must be finite"));
        }
        Ok(())
    }
}

fn finite(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid(name, format!("{value} is not finite")))
    }
}

fn positive(name: &'static str, value: f32) -> Result<()> {
    finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(name, format!("{value} must be positive")))
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<()> {
    finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(name, format!("{value} must not be negative")))
    }
}

fn in_range(name: &'static str, value: f32, lo: f32, hi: f32) -> Result<()> {
    finite(name, value)?;
    if (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid(
            name,
            format!("{value} is outside [{lo}, {hi}]"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::SurfaceClass;

    #[test]
    fn test_defaults_are_valid() {
        RigSettings::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = RigSettings::from_json(
            r#"{
                "first_person": { "speed": 30.0 },
                "globe": { "frame": "body_fixed" },
                "initial_mode": "first_person",
                "surfaces": { "window_pane": "glass" }
            }"#,
        )
        .unwrap();
        assert!((settings.first_person.speed - 30.0).abs() < f32::EPSILON);
        assert!((settings.first_person.damping - 6.0).abs() < f32::EPSILON);
        assert_eq!(settings.globe.frame, GeoFrame::BodyFixed);
        assert_eq!(settings.initial_mode, CameraMode::FirstPerson);
        assert_eq!(settings.surfaces.classify("window_pane"), SurfaceClass::Glass);
        assert!((settings.orbit.max_distance - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_vec3_from_json_array() {
        let settings = RigSettings::from_json(r#"{ "start_position": [0.0, 2.0, 6.0] }"#).unwrap();
        assert_eq!(settings.start_position, Vec3::new(0.0, 2.0, 6.0));
    }

    #[test]
    fn test_rejects_inverted_distance() {
        let err = RigSettings::from_json(r#"{ "orbit": { "min_distance": 10.0, "max_distance": 2.0 } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidSetting {
                name: "orbit.max_distance",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_polar_outside_hemisphere() {
        let mut settings = RigSettings::default();
        settings.orbit.max_polar_angle = 4.0;
        assert!(matches!(
            settings.validate(),
            Err(Error::InvalidSetting {
                name: "orbit.max_polar_angle",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_negative_damping() {
        let mut settings = RigSettings::default();
        settings.first_person.damping = -1.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        let err = RigSettings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().starts_with("failed to parse settings"));
    }

    #[test]
    fn test_missing_file() {
        let err = RigSettings::from_json_file("/nonexistent/cupola.json").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
