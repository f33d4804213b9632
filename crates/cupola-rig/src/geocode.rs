//! Pointer-to-globe geocoding.
//!
//! Maps a pointer position to latitude and longitude on a spherical globe
//! mesh. The sphere's local frame uses +Y as the polar axis with X and Z
//! spanning the equatorial plane:
//!
//! - latitude  = `asin(p.y)`
//! - longitude = `atan2(p.z, p.x)`
//!
//! where `p` is the unit vector from the globe centre to the hit point.
//! Surface textures must be authored with the same convention or longitudes
//! appear mirrored relative to the rendered image.

use std::fmt;

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::intersect::Sphere;
use crate::view::{PerspectiveView, Ray};

/// Geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    /// Latitude in `[-90, 90]`.
    pub latitude: f64,
    /// Longitude in `(-180, 180]`.
    pub longitude: f64,
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Convert a direction from the globe centre into a coordinate.
    ///
    /// Returns `None` for a zero vector.
    pub fn from_direction(direction: Vec3) -> Option<Self> {
        let p = direction.try_normalize()?;
        let y = f64::from(p.y).clamp(-1.0, 1.0);
        let longitude = f64::from(p.z).atan2(f64::from(p.x)).to_degrees();
        Some(Self {
            latitude: y.asin().to_degrees(),
            // atan2 gives -180 for a -0.0 z on the seam.
            longitude: if longitude <= -180.0 { longitude + 360.0 } else { longitude },
        })
    }

    /// Unit vector from the globe centre towards this coordinate.
    pub fn to_unit_vector(self) -> Vec3 {
        let lat = self.latitude.to_radians();
        let lon = self.longitude.to_radians();
        Vec3::new(
            (lat.cos() * lon.cos()) as f32,
            lat.sin() as f32,
            (lat.cos() * lon.sin()) as f32,
        )
    }

    /// Signed longitude change from `self` to `other`, taking the short way
    /// across the ±180° seam. Result is in `(-180, 180]`.
    pub fn longitude_delta(self, other: GeoCoordinate) -> f64 {
        let delta = (other.longitude - self.longitude).rem_euclid(360.0);
        if delta > 180.0 { delta - 360.0 } else { delta }
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lat: {:.2}°, Lon: {:.2}°",
            self.latitude, self.longitude
        )
    }
}

/// Which frame latitude and longitude are measured in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoFrame {
    /// Measure against world axes around the globe centre.
    #[default]
    World,
    /// Undo the globe's current rotation first, so coordinates stay attached
    /// to the spinning surface.
    BodyFixed,
}

/// The globe mesh as seen at resolve time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereGeometryRef {
    /// World-space centre.
    pub center: Vec3,
    /// World-space radius.
    pub radius: f32,
    /// Current world rotation of the mesh.
    pub rotation: Quat,
}

impl SphereGeometryRef {
    pub fn new(center: Vec3, radius: f32, rotation: Quat) -> Self {
        Self {
            center,
            radius,
            rotation,
        }
    }

    /// Build from a mesh of the given local radius under a transform with
    /// uniform scale.
    pub fn from_transform(translation: Vec3, rotation: Quat, scale: f32, local_radius: f32) -> Self {
        Self::new(translation, local_radius * scale.abs(), rotation)
    }

    fn sphere(&self) -> Sphere {
        Sphere::new(self.center, self.radius)
    }
}

/// A resolved coordinate plus the pointer position it came from, for
/// tooltips and map overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPick {
    pub coordinate: GeoCoordinate,
    /// Pointer position in pixels.
    pub screen: Vec2,
    /// World-space hit point on the globe surface.
    pub point: Vec3,
}

/// Resolves pointer rays against a globe.
///
/// Stateless apart from its frame setting; safe to call from both hover and
/// click handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Geocoder {
    frame: GeoFrame,
}

impl Geocoder {
    pub fn new(frame: GeoFrame) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> GeoFrame {
        self.frame
    }

    /// Intersect a world-space ray with the globe.
    ///
    /// Returns the hit point and its coordinate, or `None` on a miss.
    pub fn resolve_ray(&self, ray: &Ray, globe: &SphereGeometryRef) -> Option<(Vec3, GeoCoordinate)> {
        if !(globe.radius > 0.0) {
            return None;
        }
        let t = globe.sphere().intersect(ray)?;
        let point = ray.at(t);
        let mut direction = point - globe.center;
        if self.frame == GeoFrame::BodyFixed {
            direction = globe.rotation.inverse() * direction;
        }
        let coordinate = GeoCoordinate::from_direction(direction)?;
        tracing::trace!(%coordinate, "globe hit");
        Some((point, coordinate))
    }

    /// Resolve a pointer position in a viewport of the given size.
    pub fn pick(
        &self,
        pointer: Vec2,
        viewport: Vec2,
        view: &PerspectiveView,
        globe: &SphereGeometryRef,
    ) -> Option<GeoPick> {
        let ray = view.ray_through_pixel(pointer, viewport)?;
        let (point, coordinate) = self.resolve_ray(&ray, globe)?;
        Some(GeoPick {
            coordinate,
            screen: pointer,
            point,
        })
    }

    /// Resolve a pointer position to a coordinate.
    pub fn resolve(
        &self,
        pointer: Vec2,
        viewport: Vec2,
        view: &PerspectiveView,
        globe: &SphereGeometryRef,
    ) -> Option<GeoCoordinate> {
        self.pick(pointer, viewport, view, globe)
            .map(|pick| pick.coordinate)
    }
}

/// Resolve a pointer position using the world-frame convention.
pub fn resolve(
    pointer: Vec2,
    viewport: Vec2,
    view: &PerspectiveView,
    globe: &SphereGeometryRef,
) -> Option<GeoCoordinate> {
    Geocoder::default().resolve(pointer, viewport, view, globe)
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use crate::view::CameraPose;

    const EPS: f64 = 1e-3;

    fn origin_globe(radius: f32) -> SphereGeometryRef {
        SphereGeometryRef::new(Vec3::ZERO, radius, Quat::IDENTITY)
    }

    fn aim_at(target: Vec3, from: Vec3) -> Ray {
        Ray::new(from, target - from).unwrap()
    }

    #[test]
    fn test_equator_prime_meridian() {
        let r = 3.0;
        let ray = aim_at(Vec3::new(r, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0));
        let (_, coord) = Geocoder::default().resolve_ray(&ray, &origin_globe(r)).unwrap();
        assert!(coord.latitude.abs() < EPS);
        assert!(coord.longitude.abs() < EPS);
    }

    #[test]
    fn test_north_pole_any_longitude() {
        let r = 3.0;
        let ray = aim_at(Vec3::new(0.0, r, 0.0), Vec3::new(0.0, 10.0, 0.0));
        let (_, coord) = Geocoder::default().resolve_ray(&ray, &origin_globe(r)).unwrap();
        assert!((coord.latitude - 90.0).abs() < EPS);
        assert!(coord.longitude.is_finite());
    }

    #[test]
    fn test_positive_z_is_ninety_east() {
        let r = 3.0;
        let ray = aim_at(Vec3::new(0.0, 0.0, r), Vec3::new(0.0, 0.0, 10.0));
        let (_, coord) = Geocoder::default().resolve_ray(&ray, &origin_globe(r)).unwrap();
        assert!(coord.latitude.abs() < EPS);
        assert!((coord.longitude - 90.0).abs() < EPS);
    }

    #[test]
    fn test_miss_returns_none() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z).unwrap();
        assert_eq!(Geocoder::default().resolve_ray(&ray, &origin_globe(1.0)), None);

        let ray = Ray::new(Vec3::new(0.0, 5.0, 10.0), Vec3::NEG_Z).unwrap();
        assert_eq!(Geocoder::default().resolve_ray(&ray, &origin_globe(1.0)), None);
    }

    #[test]
    fn test_viewport_center_hits_front_of_globe() {
        let pose = CameraPose::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let viewport = Vec2::new(1280.0, 720.0);
        let view = PerspectiveView::new(pose, 45_f32.to_radians(), viewport).unwrap();
        let coord = resolve(viewport * 0.5, viewport, &view, &origin_globe(1.0)).unwrap();
        assert!(coord.latitude.abs() < EPS);
        assert!((coord.longitude - 90.0).abs() < EPS);
    }

    #[test]
    fn test_offset_globe_subtracts_center() {
        let center = Vec3::new(0.0, -26.0, 0.0);
        let globe = SphereGeometryRef::new(center, 24.0, Quat::IDENTITY);
        let ray = aim_at(center + Vec3::new(24.0, 0.0, 0.0), Vec3::new(100.0, -26.0, 0.0));
        let (point, coord) = Geocoder::default().resolve_ray(&ray, &globe).unwrap();
        assert!((point - Vec3::new(24.0, -26.0, 0.0)).length() < 1e-3);
        assert!(coord.latitude.abs() < EPS);
        assert!(coord.longitude.abs() < EPS);
    }

    #[test]
    fn test_body_fixed_undoes_rotation() {
        // Globe spun a quarter turn about +Y: local +X now faces world -Z.
        let globe = SphereGeometryRef::new(Vec3::ZERO, 1.0, Quat::from_rotation_y(FRAC_PI_2));
        let ray = aim_at(Vec3::NEG_Z, Vec3::new(0.0, 0.0, -10.0));

        let (_, world) = Geocoder::new(GeoFrame::World).resolve_ray(&ray, &globe).unwrap();
        assert!((world.longitude + 90.0).abs() < EPS);

        let (_, body) = Geocoder::new(GeoFrame::BodyFixed)
            .resolve_ray(&ray, &globe)
            .unwrap();
        assert!(body.longitude.abs() < EPS);
        assert!(body.latitude.abs() < EPS);
    }

    #[test]
    fn test_zero_viewport_is_none() {
        let pose = CameraPose::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let view = PerspectiveView::new(pose, 1.0, Vec2::new(10.0, 10.0)).unwrap();
        assert_eq!(
            resolve(Vec2::ZERO, Vec2::ZERO, &view, &origin_globe(1.0)),
            None
        );
    }

    #[test]
    fn test_unit_vector_round_trip() {
        let coord = GeoCoordinate::new(35.0, -120.0);
        let back = GeoCoordinate::from_direction(coord.to_unit_vector()).unwrap();
        assert!((back.latitude - 35.0).abs() < EPS);
        assert!((back.longitude + 120.0).abs() < EPS);
    }

    #[test]
    fn test_seam_longitude_is_positive() {
        for z in [0.0_f32, -0.0] {
            let coord = GeoCoordinate::from_direction(Vec3::new(-1.0, 0.0, z)).unwrap();
            assert!((coord.longitude - 180.0).abs() < EPS, "z = {z}: {}", coord.longitude);
        }
    }

    #[test]
    fn test_longitude_delta_across_seam() {
        let a = GeoCoordinate::new(0.0, 179.0);
        let b = GeoCoordinate::new(0.0, -179.0);
        assert!((a.longitude_delta(b) - 2.0).abs() < 1e-9);
        assert!((b.longitude_delta(a) + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_display() {
        let coord = GeoCoordinate::new(12.346, -56.789);
        assert_eq!(coord.to_string(), "Lat: 12.35°, Lon: -56.79°");
    }
}
