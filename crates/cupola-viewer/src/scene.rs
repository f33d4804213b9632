//! Procedural Cupola model and globe.
//!
//! The Cupola is built from simple primitives: a base ring, six trapezoid-ish
//! side windows with frame posts between them, and a round top window. Each
//! part is styled by its surface class and registered for click picking.

use std::f32::consts::TAU;

use bevy::prelude::*;
use cupola_rig::{Aabb, PickTarget, SphereGeometryRef, SurfaceClass, SurfaceTable, ViewerSession};

use crate::viewer::{GlobeMesh, ViewerScoped};

// ============================================================================
// Layout
// ============================================================================

/// Number of side windows.
const SIDE_WINDOWS: usize = 6;
/// Distance from the Cupola axis to the side windows.
const SIDE_RADIUS: f32 = 1.2;
/// Height of the base ring.
const BASE_HEIGHT: f32 = 0.4;
/// Height of the side window centres.
const SIDE_HEIGHT: f32 = 1.0;
/// Height of the top window.
const TOP_HEIGHT: f32 = 1.55;

const GLASS_COLOR: Color = Color::srgb(0.65, 0.85, 1.0);
const STRUCTURE_COLOR: Color = Color::srgb(0.78, 0.78, 0.8);

/// Mesh identifiers and their surface classes for the built-in model.
pub fn authored_surfaces() -> SurfaceTable {
    let mut table = SurfaceTable::new()
        .with("base_ring", SurfaceClass::Structure)
        .with("top_window", SurfaceClass::Glass)
        .with("top_frame", SurfaceClass::Structure);
    for i in 0..SIDE_WINDOWS {
        table.insert(side_window_id(i), SurfaceClass::Glass);
        table.insert(frame_post_id(i), SurfaceClass::Structure);
    }
    table
}

fn side_window_id(index: usize) -> String {
    format!("side_window_{index}")
}

fn frame_post_id(index: usize) -> String {
    format!("frame_post_{index}")
}

// ============================================================================
// Spawning
// ============================================================================

/// Spawn the scene for a freshly mounted session and register it.
pub fn spawn_scene(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    session: &mut ViewerSession,
) {
    spawn_lights(commands);
    spawn_globe(commands, meshes, materials, session);

    let mut builder = PartBuilder {
        commands,
        meshes,
        materials,
        session,
    };

    builder.spawn(
        "base_ring",
        Torus::new(SIDE_RADIUS - 0.1, SIDE_RADIUS + 0.25),
        Transform::from_xyz(0.0, BASE_HEIGHT, 0.0).with_scale(Vec3::new(1.0, 0.6, 1.0)),
        Vec3::new(2.0 * (SIDE_RADIUS + 0.25), 0.21, 2.0 * (SIDE_RADIUS + 0.25)),
    );

    for i in 0..SIDE_WINDOWS {
        let angle = i as f32 * TAU / SIDE_WINDOWS as f32;
        let rotation = Quat::from_rotation_y(angle);
        let outward = rotation * Vec3::Z;

        // Windows lean inwards towards the top.
        let pane_rotation = rotation * Quat::from_rotation_x(-0.35);
        let pane_size = Vec3::new(1.1, 0.8, 0.04);
        builder.spawn(
            &side_window_id(i),
            Cuboid::from_size(pane_size),
            Transform::from_translation(outward * SIDE_RADIUS + Vec3::Y * SIDE_HEIGHT)
                .with_rotation(pane_rotation),
            rotated_extent(pane_size, pane_rotation),
        );

        let post_rotation = Quat::from_rotation_y(angle + TAU / (2.0 * SIDE_WINDOWS as f32));
        let post_size = Vec3::new(0.08, 0.9, 0.08);
        builder.spawn(
            &frame_post_id(i),
            Cuboid::from_size(post_size),
            Transform::from_translation(
                post_rotation * Vec3::Z * (SIDE_RADIUS + 0.05) + Vec3::Y * SIDE_HEIGHT,
            ),
            post_size,
        );
    }

    builder.spawn(
        "top_frame",
        Torus::new(0.6, 0.72),
        Transform::from_xyz(0.0, TOP_HEIGHT, 0.0).with_scale(Vec3::new(1.0, 0.5, 1.0)),
        Vec3::new(1.44, 0.06, 1.44),
    );
    builder.spawn(
        "top_window",
        Cylinder::new(0.62, 0.03),
        Transform::from_xyz(0.0, TOP_HEIGHT, 0.0),
        Vec3::new(1.24, 0.03, 1.24),
    );
}

fn spawn_lights(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            ..default()
        },
        Transform::from_xyz(5.0, 10.0, 7.5).looking_at(Vec3::ZERO, Vec3::Y),
        ViewerScoped,
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 1_500.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(-6.0, -4.0, -8.0).looking_at(Vec3::ZERO, Vec3::Y),
        ViewerScoped,
    ));
}

fn spawn_globe(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    session: &mut ViewerSession,
) {
    let globe = &session.settings().globe;
    let placement = SphereGeometryRef::from_transform(globe.center, Quat::IDENTITY, globe.radius, 1.0);

    commands.spawn((
        Mesh3d(meshes.add(Sphere::new(1.0).mesh().uv(64, 32))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.15, 0.35, 0.75),
            perceptual_roughness: 0.8,
            ..default()
        })),
        Transform::from_translation(placement.center).with_scale(Vec3::splat(placement.radius)),
        GlobeMesh,
        ViewerScoped,
    ));

    session.attach_globe(placement.center, placement.radius);
    tracing::debug!(center = ?placement.center, radius = placement.radius, "globe ready");
}

/// Spawns Cupola parts and registers them with the session.
struct PartBuilder<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    meshes: &'a mut Assets<Mesh>,
    materials: &'a mut Assets<StandardMaterial>,
    session: &'a mut ViewerSession,
}

impl PartBuilder<'_, '_, '_> {
    /// Spawn one part. `extent` is the world-space size of its bounding box.
    fn spawn(&mut self, id: &str, shape: impl Into<Mesh>, transform: Transform, extent: Vec3) {
        let surface = self.session.settings().surfaces.classify(id);
        let style = surface.style();
        let base = match surface {
            SurfaceClass::Glass => GLASS_COLOR,
            SurfaceClass::Structure => STRUCTURE_COLOR,
        };

        // Blend never writes depth, which is what both styles ask for.
        let mut material = StandardMaterial {
            base_color: base.with_alpha(style.opacity),
            alpha_mode: AlphaMode::Blend,
            double_sided: style.double_sided,
            ..default()
        };
        if style.double_sided {
            material.cull_mode = None;
        }
        if surface == SurfaceClass::Glass {
            material.perceptual_roughness = 0.05;
            material.reflectance = 0.6;
        }

        self.commands.spawn((
            Mesh3d(self.meshes.add(shape.into())),
            MeshMaterial3d(self.materials.add(material)),
            transform,
            Name::new(id.to_string()),
            ViewerScoped,
        ));

        self.session.register_target(PickTarget::new(
            id,
            "Mesh",
            Aabb::from_center_size(transform.translation, extent),
            surface,
        ));
    }
}

/// World-space extent of a box of `size` after `rotation`.
fn rotated_extent(size: Vec3, rotation: Quat) -> Vec3 {
    let basis = Mat3::from_quat(rotation);
    basis.x_axis.abs() * size.x + basis.y_axis.abs() * size.y + basis.z_axis.abs() * size.z
}
