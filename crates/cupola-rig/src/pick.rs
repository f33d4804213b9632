//! Click picking against registered scene objects.

use glam::Vec3;

use crate::intersect::Aabb;
use crate::surface::SurfaceClass;
use crate::view::Ray;

/// An object that can be selected by clicking it.
#[derive(Debug, Clone, PartialEq)]
pub struct PickTarget {
    /// Display name.
    pub name: String,
    /// Kind label shown alongside the name (e.g. "Mesh").
    pub kind: String,
    /// World-space bounds used for hit testing.
    pub bounds: Aabb,
    /// Surface class the object was prepared with.
    pub surface: SurfaceClass,
}

impl PickTarget {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, bounds: Aabb, surface: SurfaceClass) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            bounds,
            surface,
        }
    }
}

/// Details of a selected object, for the info panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    pub name: String,
    pub kind: String,
    /// Centre of the object's bounds.
    pub position: Vec3,
    pub surface: SurfaceClass,
    /// Distance from the ray origin to the hit.
    pub distance: f32,
}

/// Nearest target hit by `ray`. Ties keep the earlier registration.
pub fn pick_nearest<'a>(
    targets: impl IntoIterator<Item = &'a PickTarget>,
    ray: &Ray,
) -> Option<ObjectInfo> {
    let mut best: Option<(&PickTarget, f32)> = None;
    for target in targets {
        let Some(t) = target.bounds.intersect(ray) else {
            continue;
        };
        if best.is_none_or(|(_, best_t)| t < best_t) {
            best = Some((target, t));
        }
    }

    best.map(|(target, distance)| ObjectInfo {
        name: if target.name.is_empty() {
            "Unnamed".to_string()
        } else {
            target.name.clone()
        },
        kind: target.kind.clone(),
        position: target.bounds.center(),
        surface: target.surface,
        distance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(name: &str, center: Vec3) -> PickTarget {
        PickTarget::new(
            name,
            "Mesh",
            Aabb::from_center_size(center, Vec3::ONE),
            SurfaceClass::Structure,
        )
    }

    #[test]
    fn test_picks_nearest() {
        let targets = vec![
            target("far", Vec3::new(0.0, 0.0, -10.0)),
            target("near", Vec3::new(0.0, 0.0, -3.0)),
            target("off_axis", Vec3::new(5.0, 0.0, -1.0)),
        ];
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z).unwrap();
        let info = pick_nearest(&targets, &ray).unwrap();
        assert_eq!(info.name, "near");
        assert!((info.distance - 2.5).abs() < 1e-5);
        assert_eq!(info.position, Vec3::new(0.0, 0.0, -3.0));
    }

    #[test]
    fn test_tie_keeps_first() {
        let targets = vec![
            target("first", Vec3::new(0.0, 0.0, -3.0)),
            target("second", Vec3::new(0.0, 0.0, -3.0)),
        ];
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z).unwrap();
        assert_eq!(pick_nearest(&targets, &ray).unwrap().name, "first");
    }

    #[test]
    fn test_miss_and_unnamed() {
        let targets = vec![target("", Vec3::new(0.0, 0.0, -3.0))];
        let miss = Ray::new(Vec3::ZERO, Vec3::Z).unwrap();
        assert_eq!(pick_nearest(&targets, &miss), None);

        let hit = Ray::new(Vec3::ZERO, Vec3::NEG_Z).unwrap();
        assert_eq!(pick_nearest(&targets, &hit).unwrap().name, "Unnamed");
    }
}
