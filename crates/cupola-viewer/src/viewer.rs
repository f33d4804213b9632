//! Bevy host for a [`ViewerSession`].
//!
//! The session lives in the [`ActiveViewer`] resource while the viewer is
//! mounted. Every entity the session spawns carries [`ViewerScoped`] so
//! unmounting can tear the scene down in one pass. The camera itself stays
//! alive across mounts so the UI keeps rendering.
//!
//! Per frame, in order:
//!
//! 1. Pending mount / unmount / mode requests are applied.
//! 2. Keyboard and mouse input is forwarded to the session.
//! 3. Pointer capture is reconciled with the camera mode.
//! 4. The session ticks; camera and globe transforms are written back.
//! 5. The pointer is resolved against the globe for hover and click.

use bevy::{
    ecs::message::MessageReader,
    input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel},
    prelude::*,
    window::{CursorGrabMode, CursorOptions, PrimaryWindow},
};
use bevy_egui::EguiContexts;
use cupola_rig::{CameraMode, DragButton, MoveAction, RigEvent, RigSettings, ViewerSession};

use crate::scene;

// ============================================================================
// Constants
// ============================================================================

/// Pointer travel in pixels beyond which a press-release is a drag, not a click.
const CLICK_SLOP: f32 = 4.0;

/// Keys bound to each movement action.
const MOVE_BINDINGS: [(MoveAction, [KeyCode; 2]); 4] = [
    (MoveAction::MoveForward, [KeyCode::KeyW, KeyCode::ArrowUp]),
    (MoveAction::MoveBackward, [KeyCode::KeyS, KeyCode::ArrowDown]),
    (MoveAction::StrafeLeft, [KeyCode::KeyA, KeyCode::ArrowLeft]),
    (MoveAction::StrafeRight, [KeyCode::KeyD, KeyCode::ArrowRight]),
];

/// Mouse buttons that start a drag.
const DRAG_BINDINGS: [(DragButton, MouseButton); 2] = [
    (DragButton::Primary, MouseButton::Left),
    (DragButton::Secondary, MouseButton::Right),
];

// ============================================================================
// Resources and components
// ============================================================================

/// Settings the viewer mounts with.
#[derive(Resource, Debug)]
pub struct ViewerConfig {
    settings: RigSettings,
}

impl ViewerConfig {
    pub fn new(settings: RigSettings) -> Self {
        Self { settings }
    }
}

/// The mounted viewer session. Absent while unmounted.
#[derive(Resource, Deref, DerefMut)]
pub struct ActiveViewer(pub ViewerSession);

/// Marker for entities owned by the mounted viewer.
#[derive(Component)]
pub struct ViewerScoped;

/// Marker for the viewer camera.
#[derive(Component)]
pub struct ViewerCamera;

/// Marker for the globe mesh.
#[derive(Component)]
pub struct GlobeMesh;

/// Viewer requests from the UI.
///
/// Requests are applied at the start of the next update.
#[derive(Resource, Default)]
pub struct ViewerRequests {
    pending: Vec<ViewerRequest>,
}

impl ViewerRequests {
    /// Request the viewer be mounted.
    pub fn mount(&mut self) {
        self.pending.push(ViewerRequest::Mount);
    }

    /// Request the viewer be unmounted.
    pub fn unmount(&mut self) {
        self.pending.push(ViewerRequest::Unmount);
    }

    /// Request a camera mode change.
    pub fn set_mode(&mut self, mode: CameraMode) {
        self.pending.push(ViewerRequest::SetMode(mode));
    }

    /// Request the object info panel be closed.
    pub fn clear_selection(&mut self) {
        self.pending.push(ViewerRequest::ClearSelection);
    }

    fn take(&mut self) -> Vec<ViewerRequest> {
        std::mem::take(&mut self.pending)
    }
}

#[derive(Debug, Clone, Copy)]
enum ViewerRequest {
    Mount,
    Unmount,
    SetMode(CameraMode),
    ClearSelection,
}

// ============================================================================
// Plugin
// ============================================================================

/// Plugin hosting the viewer session.
pub struct ViewerPlugin;

impl Plugin for ViewerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ViewerRequests>()
            .add_systems(Startup, (spawn_camera, request_initial_mount))
            .add_systems(
                Update,
                (
                    process_requests,
                    (
                        forward_input,
                        sync_pointer_capture,
                        advance_frame,
                        resolve_pointer,
                    )
                        .chain()
                        .run_if(resource_exists::<ActiveViewer>),
                )
                    .chain(),
            );
    }
}

// ============================================================================
// Setup
// ============================================================================

fn spawn_camera(mut commands: Commands, config: Res<ViewerConfig>) {
    let lens = &config.settings.lens;
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: lens.fov_y(),
            near: lens.near,
            far: lens.far,
            ..default()
        }),
        Transform::from_translation(config.settings.start_position)
            .looking_at(config.settings.orbit.target, Vec3::Y),
        ViewerCamera,
    ));
}

fn request_initial_mount(mut requests: ResMut<ViewerRequests>) {
    requests.mount();
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Apply pending viewer requests.
#[allow(clippy::too_many_arguments)]
fn process_requests(
    mut commands: Commands,
    mut requests: ResMut<ViewerRequests>,
    config: Res<ViewerConfig>,
    mut viewer: Option<ResMut<ActiveViewer>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    scoped: Query<Entity, With<ViewerScoped>>,
    mut cursor: Single<&mut CursorOptions>,
    mut window: Single<&mut Window, With<PrimaryWindow>>,
) {
    // A mount or unmount only lands once commands apply, so anything queued
    // behind one waits for the next update.
    let mut lifecycle_changed = false;
    let mut deferred = Vec::new();
    for request in requests.take() {
        if lifecycle_changed {
            deferred.push(request);
            continue;
        }
        match request {
            ViewerRequest::Mount => {
                if viewer.is_some() {
                    tracing::debug!("viewer already mounted");
                    continue;
                }
                mount_viewer(&mut commands, &mut meshes, &mut materials, &config.settings);
                lifecycle_changed = true;
            }
            ViewerRequest::Unmount => {
                if viewer.is_none() {
                    continue;
                }
                unmount_viewer(&mut commands, &scoped, &mut cursor, &mut window);
                lifecycle_changed = true;
            }
            ViewerRequest::SetMode(mode) => {
                if let Some(viewer) = viewer.as_mut() {
                    viewer.set_mode(mode);
                }
            }
            ViewerRequest::ClearSelection => {
                if let Some(viewer) = viewer.as_mut() {
                    viewer.clear_selection();
                }
            }
        }
    }
    requests.pending.extend(deferred);
}

/// Create a session, spawn its scene and make it the active viewer.
fn mount_viewer(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    settings: &RigSettings,
) {
    let mut session = ViewerSession::new(settings.clone());
    scene::spawn_scene(commands, meshes, materials, &mut session);
    commands.insert_resource(ActiveViewer(session));
}

/// Tear the viewer down: despawn its scene, drop the session and release
/// the cursor. Every viewer system is gated on the session resource, so
/// removing it detaches all input handling at once.
fn unmount_viewer(
    commands: &mut Commands,
    scoped: &Query<Entity, With<ViewerScoped>>,
    cursor: &mut CursorOptions,
    window: &mut Window,
) {
    for entity in scoped {
        commands.entity(entity).despawn();
    }
    commands.remove_resource::<ActiveViewer>();
    set_cursor_grab(cursor, window, false);
}

// ============================================================================
// Input
// ============================================================================

/// Forward keyboard and mouse input to the session.
fn forward_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut scroll_events: MessageReader<MouseWheel>,
    mut contexts: EguiContexts,
    mut viewer: ResMut<ActiveViewer>,
) {
    let (egui_wants_pointer, egui_wants_keyboard) = contexts
        .ctx_mut()
        .ok()
        .map_or((false, false), |ctx| {
            (ctx.is_pointer_over_area(), ctx.wants_keyboard_input())
        });

    // Releases always go through so keys never stick while a text field has focus.
    for (action, keys) in MOVE_BINDINGS {
        if keyboard.any_just_released(keys) && !keyboard.any_pressed(keys) {
            viewer.handle(RigEvent::KeyUp(action));
        }
        if !egui_wants_keyboard && keyboard.any_just_pressed(keys) {
            viewer.handle(RigEvent::KeyDown(action));
        }
    }

    if !egui_wants_keyboard {
        if keyboard.just_pressed(KeyCode::KeyE) {
            viewer.handle(RigEvent::ToggleMode);
        }
        if keyboard.just_pressed(KeyCode::Escape) {
            viewer.handle(RigEvent::Exit);
        }
    }

    for (drag, button) in DRAG_BINDINGS {
        if mouse.just_released(button) {
            viewer.handle(RigEvent::PointerUp(drag));
        }
        if mouse.just_pressed(button) && !egui_wants_pointer {
            viewer.handle(RigEvent::PointerDown(drag));
        }
    }

    let delta: Vec2 = mouse_motion.read().map(|motion| motion.delta).sum();
    if delta != Vec2::ZERO {
        viewer.handle(RigEvent::PointerMoved(delta));
    }

    for event in scroll_events.read() {
        // Normalize scroll value: web reports pixels, native reports lines.
        let scroll = match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / 120.0,
        };
        if scroll != 0.0 && !egui_wants_pointer {
            viewer.handle(RigEvent::Wheel(scroll));
        }
    }
}

/// Grab the cursor while first-person wants it, and report lost capture.
fn sync_pointer_capture(
    mut viewer: ResMut<ActiveViewer>,
    mut cursor: Single<&mut CursorOptions>,
    mut window: Single<&mut Window, With<PrimaryWindow>>,
) {
    // Losing focus releases the grab at the OS level.
    if viewer.rig().wants_pointer_capture() && cursor_is_grabbed(&cursor) && !window.focused {
        viewer.handle(RigEvent::CaptureLost);
    }

    let wants = viewer.rig().wants_pointer_capture();
    let grabbed = cursor_is_grabbed(&cursor);
    if wants && !grabbed && window.focused {
        set_cursor_grab(&mut cursor, &mut window, true);
    } else if !wants && grabbed {
        set_cursor_grab(&mut cursor, &mut window, false);
    }
}

fn set_cursor_grab(cursor: &mut CursorOptions, window: &mut Window, grabbed: bool) {
    if grabbed {
        // Browsers only support Confined.
        #[cfg(not(target_family = "wasm"))]
        {
            cursor.grab_mode = CursorGrabMode::Locked;
        }
        #[cfg(target_family = "wasm")]
        {
            cursor.grab_mode = CursorGrabMode::Confined;
        }
        cursor.visible = false;
        let center = Vec2::new(window.width() / 2.0, window.height() / 2.0);
        window.set_cursor_position(Some(center));
    } else {
        cursor.grab_mode = CursorGrabMode::None;
        cursor.visible = true;
    }
}

fn cursor_is_grabbed(cursor: &CursorOptions) -> bool {
    matches!(
        cursor.grab_mode,
        CursorGrabMode::Locked | CursorGrabMode::Confined
    )
}

// ============================================================================
// Frame
// ============================================================================

/// Tick the session and write the camera and globe transforms.
fn advance_frame(
    time: Res<Time>,
    mut viewer: ResMut<ActiveViewer>,
    mut camera: Single<&mut Transform, With<ViewerCamera>>,
    mut globes: Query<&mut Transform, (With<GlobeMesh>, Without<ViewerCamera>)>,
) {
    let output = viewer.tick(time.delta_secs());
    camera.translation = output.pose.position;
    camera.rotation = output.pose.rotation;
    for mut transform in &mut globes {
        transform.rotation = output.globe_rotation;
    }
}

/// Resolve hover and click against the globe and pick targets.
fn resolve_pointer(
    window: Single<&Window, With<PrimaryWindow>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut contexts: EguiContexts,
    mut viewer: ResMut<ActiveViewer>,
    mut press_at: Local<Option<Vec2>>,
) {
    let viewport = Vec2::new(window.width(), window.height());
    let egui_wants_pointer = contexts
        .ctx_mut()
        .ok()
        .is_some_and(|ctx| ctx.is_pointer_over_area());
    let pointer = window.cursor_position().filter(|_| !egui_wants_pointer);

    viewer.hover(pointer, viewport);

    if mouse.just_pressed(MouseButton::Left) {
        *press_at = pointer;
    }
    if mouse.just_released(MouseButton::Left) {
        let pressed = press_at.take();
        if let (Some(from), Some(to)) = (pressed, pointer) {
            if from.distance(to) <= CLICK_SLOP {
                viewer.click(to, viewport);
            }
        }
    }
}
