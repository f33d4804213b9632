//! One mounted viewer.
//!
//! A [`ViewerSession`] is created when the viewer mounts and dropped when it
//! unmounts. It owns everything the viewer mutates between frames: the
//! camera rig and its input, the globe spin, the registered pick targets and
//! the last hover / click results. Hosts pass it by reference to their frame
//! callback and event handlers.

use glam::{Quat, Vec2, Vec3};

use crate::geocode::{GeoFrame, GeoPick, Geocoder, SphereGeometryRef};
use crate::pick::{ObjectInfo, PickTarget, pick_nearest};
use crate::rig::{CameraMode, CameraRig, ModeTransition, RigEvent};
use crate::settings::RigSettings;
use crate::spin::SpinDriver;
use crate::view::{CameraPose, PerspectiveView};

/// Globe as placed in the scene, before spin.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GlobeMount {
    center: Vec3,
    radius: f32,
}

/// Output of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    /// Camera transform for the renderer.
    pub pose: CameraPose,
    /// Globe rotation for the renderer.
    pub globe_rotation: Quat,
}

/// Result of a click.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickOutcome {
    /// Globe coordinate under the pointer.
    pub geo: Option<GeoPick>,
    /// Object selected by the click.
    pub object: Option<ObjectInfo>,
}

/// State for one mounted viewer.
#[derive(Debug)]
pub struct ViewerSession {
    settings: RigSettings,
    rig: CameraRig,
    geocoder: Geocoder,
    spin: SpinDriver,
    globe: Option<GlobeMount>,
    targets: Vec<PickTarget>,
    hover: Option<GeoPick>,
    last_click: Option<GeoPick>,
    selection: Option<ObjectInfo>,
}

impl ViewerSession {
    /// Mount a session. Settings are assumed validated.
    pub fn new(settings: RigSettings) -> Self {
        let mut rig = CameraRig::new(
            settings.orbit.clone(),
            settings.first_person.clone(),
            settings.start_position,
        );
        rig.set_mode(settings.initial_mode);
        tracing::info!(mode = %rig.mode(), "viewer session mounted");
        Self {
            geocoder: Geocoder::new(settings.globe.frame),
            spin: SpinDriver::new(settings.globe.spin_rate),
            rig,
            settings,
            globe: None,
            targets: Vec::new(),
            hover: None,
            last_click: None,
            selection: None,
        }
    }

    pub fn settings(&self) -> &RigSettings {
        &self.settings
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn mode(&self) -> CameraMode {
        self.rig.mode()
    }

    pub fn spin(&self) -> &SpinDriver {
        &self.spin
    }

    /// Frame hover and click coordinates are reported in.
    pub fn geo_frame(&self) -> GeoFrame {
        self.geocoder.frame()
    }

    /// Mark the globe mesh as ready. Until then hover and click skip the
    /// globe.
    pub fn attach_globe(&mut self, center: Vec3, radius: f32) {
        self.globe = Some(GlobeMount { center, radius });
    }

    /// The globe as it stands right now, including spin.
    pub fn globe(&self) -> Option<SphereGeometryRef> {
        self.globe
            .map(|globe| SphereGeometryRef::new(globe.center, globe.radius, self.spin.rotation()))
    }

    /// Register an object for click picking.
    pub fn register_target(&mut self, target: PickTarget) {
        self.targets.push(target);
    }

    pub fn targets(&self) -> &[PickTarget] {
        &self.targets
    }

    /// Forward an input event to the rig.
    pub fn handle(&mut self, event: RigEvent) -> Option<ModeTransition> {
        let transition = self.rig.handle(event);
        if transition.is_some_and(|t| t.to == CameraMode::FirstPerson) {
            self.hover = None;
        }
        transition
    }

    /// Switch modes directly.
    pub fn set_mode(&mut self, mode: CameraMode) -> Option<ModeTransition> {
        let transition = self.rig.set_mode(mode);
        if transition.is_some_and(|t| t.to == CameraMode::FirstPerson) {
            self.hover = None;
        }
        transition
    }

    /// Advance the globe spin, then the camera, by `dt` seconds.
    ///
    /// The spin goes first so pointer resolution later in the frame sees the
    /// same rotation the renderer draws.
    pub fn tick(&mut self, dt: f32) -> FrameOutput {
        let globe_rotation = self.spin.advance(dt);
        let pose = self.rig.update(dt);
        FrameOutput {
            pose,
            globe_rotation,
        }
    }

    /// Perspective view for a viewport of the given pixel size.
    pub fn view(&self, viewport: Vec2) -> Option<PerspectiveView> {
        PerspectiveView::new(self.rig.pose(), self.settings.lens.fov_y(), viewport)
    }

    /// Update the hover coordinate from the pointer position.
    ///
    /// `None` for the pointer clears the hover. Hover is disabled in
    /// first-person mode.
    pub fn hover(&mut self, pointer: Option<Vec2>, viewport: Vec2) -> Option<GeoPick> {
        self.hover = match pointer {
            Some(pointer) if self.rig.mode() == CameraMode::Orbit => {
                self.resolve_globe(pointer, viewport)
            }
            _ => None,
        };
        self.hover
    }

    /// Handle a click at `pointer`. Ignored in first-person mode.
    pub fn click(&mut self, pointer: Vec2, viewport: Vec2) -> ClickOutcome {
        if self.rig.mode() != CameraMode::Orbit {
            return ClickOutcome::default();
        }

        let geo = self.resolve_globe(pointer, viewport);
        if let Some(pick) = geo {
            tracing::debug!(coordinate = %pick.coordinate, "globe clicked");
            self.last_click = Some(pick);
        }

        let object = self
            .view(viewport)
            .and_then(|view| view.ray_through_pixel(pointer, viewport))
            .and_then(|ray| pick_nearest(&self.targets, &ray));
        if let Some(info) = &object {
            tracing::debug!(name = %info.name, "object picked");
            self.selection = Some(info.clone());
        }

        ClickOutcome { geo, object }
    }

    /// Coordinate currently under the pointer.
    pub fn hovered(&self) -> Option<GeoPick> {
        self.hover
    }

    /// Coordinate of the last click that hit the globe.
    pub fn last_click(&self) -> Option<GeoPick> {
        self.last_click
    }

    pub fn selection(&self) -> Option<&ObjectInfo> {
        self.selection.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn resolve_globe(&self, pointer: Vec2, viewport: Vec2) -> Option<GeoPick> {
        let Some(globe) = self.globe() else {
            tracing::trace!("globe not ready, skipping resolve");
            return None;
        };
        let Some(view) = self.view(viewport) else {
            tracing::trace!(?viewport, "empty viewport, skipping resolve");
            return None;
        };
        self.geocoder.pick(pointer, viewport, &view, &globe)
    }
}

impl Drop for ViewerSession {
    fn drop(&mut self) {
        tracing::info!("viewer session unmounted");
    }
}
