//! Camera pose, perspective projection and pointer rays.
//!
//! Cameras follow the usual right-handed convention: +Y is up and the camera
//! looks down its local -Z axis.

use glam::{Mat3, Quat, Vec2, Vec3};

/// World-space camera transform produced by the rig every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Camera position in world space.
    pub position: Vec3,
    /// Camera orientation in world space.
    pub rotation: Quat,
}

impl CameraPose {
    /// Create a pose at `position` looking at `target`, with +Y as up.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            rotation: look_rotation(target - position, Vec3::Y),
        }
    }

    /// Unit vector the camera is looking along.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Unit vector to the camera's right.
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Unit vector pointing up in camera space.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Rotation that points -Z along `forward` with `up` as the approximate up.
///
/// Falls back to the identity when `forward` is degenerate, and to an
/// alternate up axis when `forward` is parallel to `up`.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let Some(back) = (-forward).try_normalize() else {
        return Quat::IDENTITY;
    };
    let right = up
        .cross(back)
        .try_normalize()
        .or_else(|| Vec3::Z.cross(back).try_normalize())
        .unwrap_or(Vec3::X);
    let up = back.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, back)).normalize()
}

/// A half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing the direction. Returns `None` for a zero
    /// direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        Some(Self {
            origin,
            direction: direction.try_normalize()?,
        })
    }

    /// Point at distance `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Convert a pixel position into normalized device coordinates.
///
/// Screen Y grows downward, device Y grows upward. Returns `None` when the
/// viewport has no area.
pub fn screen_to_ndc(pointer: Vec2, viewport: Vec2) -> Option<Vec2> {
    if !(viewport.x > 0.0 && viewport.y > 0.0) {
        return None;
    }
    Some(Vec2::new(
        pointer.x / viewport.x * 2.0 - 1.0,
        -(pointer.y / viewport.y * 2.0 - 1.0),
    ))
}

/// Perspective camera used to build pointer rays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveView {
    /// Camera transform.
    pub pose: CameraPose,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width divided by height.
    pub aspect: f32,
}

impl PerspectiveView {
    /// Create a view for a viewport of the given pixel size.
    ///
    /// Returns `None` when the viewport has no area.
    pub fn new(pose: CameraPose, fov_y: f32, viewport: Vec2) -> Option<Self> {
        if !(viewport.x > 0.0 && viewport.y > 0.0) {
            return None;
        }
        Some(Self {
            pose,
            fov_y,
            aspect: viewport.x / viewport.y,
        })
    }

    /// Ray from the camera through a point in normalized device coordinates.
    pub fn ray_through_ndc(&self, ndc: Vec2) -> Ray {
        let half_height = (self.fov_y * 0.5).tan();
        let local = Vec3::new(ndc.x * half_height * self.aspect, ndc.y * half_height, -1.0);
        Ray {
            origin: self.pose.position,
            direction: (self.pose.rotation * local).normalize(),
        }
    }

    /// Ray from the camera through a pixel of a viewport of the given size.
    pub fn ray_through_pixel(&self, pointer: Vec2, viewport: Vec2) -> Option<Ray> {
        screen_to_ndc(pointer, viewport).map(|ndc| self.ray_through_ndc(ndc))
    }
}
