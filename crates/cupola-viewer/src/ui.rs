//! Viewer overlays.
//!
//! Shows the coordinate under the pointer, the last clicked location, the
//! selected object's details, and the controls panel with the mode and
//! Back buttons.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use cupola_rig::{CameraMode, GeoFrame, GeoPick, ObjectInfo, ViewerSession};

use crate::viewer::{ActiveViewer, ViewerRequests};

/// Offset of the hover tooltip from the pointer, in points.
const TOOLTIP_OFFSET: egui::Vec2 = egui::vec2(14.0, 14.0);

/// Plugin for the viewer overlays.
pub struct ViewerUiPlugin;

impl Plugin for ViewerUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .init_resource::<UiState>()
            .add_systems(EguiPrimaryContextPass, viewer_ui_system);
    }
}

#[derive(Resource)]
struct UiState {
    show_help: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self { show_help: true }
    }
}

#[allow(clippy::needless_pass_by_value)]
fn viewer_ui_system(
    mut contexts: EguiContexts,
    viewer: Option<Res<ActiveViewer>>,
    mut requests: ResMut<ViewerRequests>,
    mut state: ResMut<UiState>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    let Some(viewer) = viewer else {
        egui::Window::new("Cupola Viewer")
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("The viewer is closed.");
                if ui.button("Open viewer").clicked() {
                    requests.mount();
                }
            });
        return Ok(());
    };

    if let Some(pick) = viewer.hovered() {
        hover_tooltip(ctx, &pick);
    }
    if let Some(pick) = viewer.last_click() {
        click_overlay(ctx, &pick, viewer.geo_frame());
    }
    if let Some(info) = viewer.selection() {
        object_panel(ctx, info, &mut requests);
    }
    controls_panel(ctx, &viewer, &mut state, &mut requests);

    Ok(())
}

fn hover_tooltip(ctx: &egui::Context, pick: &GeoPick) {
    let pos = egui::pos2(pick.screen.x, pick.screen.y) + TOOLTIP_OFFSET;
    egui::Area::new(egui::Id::new("geo_hover_tooltip"))
        .fixed_pos(pos)
        .order(egui::Order::Tooltip)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(pick.coordinate.to_string());
            });
        });
}

fn click_overlay(ctx: &egui::Context, pick: &GeoPick, frame: GeoFrame) {
    egui::Window::new("Clicked Location")
        .anchor(egui::Align2::RIGHT_BOTTOM, [-10.0, -10.0])
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!("Latitude: {:.4}°", pick.coordinate.latitude));
            ui.label(format!("Longitude: {:.4}°", pick.coordinate.longitude));
            ui.label(format!("Screen: ({:.0}, {:.0})", pick.screen.x, pick.screen.y));
            ui.weak(match frame {
                GeoFrame::World => "World frame",
                GeoFrame::BodyFixed => "Body-fixed frame",
            });
        });
}

fn object_panel(ctx: &egui::Context, info: &ObjectInfo, requests: &mut ViewerRequests) {
    egui::Window::new("Object Details")
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!("Name: {}", info.name));
            ui.label(format!("Type: {}", info.kind));
            ui.label(format!("Surface: {}", info.surface.label()));
            ui.label(format!(
                "Position: ({:.2}, {:.2}, {:.2})",
                info.position.x, info.position.y, info.position.z
            ));
            ui.label(format!("Distance: {:.2}", info.distance));
            if ui.button("Close").clicked() {
                requests.clear_selection();
            }
        });
}

fn controls_panel(
    ctx: &egui::Context,
    session: &ViewerSession,
    state: &mut UiState,
    requests: &mut ViewerRequests,
) {
    let mode = session.mode();
    egui::Window::new("Controls")
        .default_pos([10.0, 10.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Back").clicked() {
                    requests.unmount();
                }
                let (label, target) = match mode {
                    CameraMode::Orbit => ("Enter First Person (E)", CameraMode::FirstPerson),
                    CameraMode::FirstPerson => ("Exit First Person (ESC)", CameraMode::Orbit),
                };
                if ui.button(label).clicked() {
                    requests.set_mode(target);
                }
            });
            ui.label(format!("Mode: {mode}"));
            ui.label(format!(
                "Globe spin: {:.3} rad/s, {} objects",
                session.spin().rate(),
                session.targets().len()
            ));

            if !state.show_help {
                if ui.button("Show Instructions").clicked() {
                    state.show_help = true;
                }
                return;
            }

            ui.separator();
            match mode {
                CameraMode::Orbit => {
                    ui.label("Left drag - Rotate");
                    ui.label("Right drag - Pan");
                    ui.label("Wheel - Zoom");
                    ui.label("Click - Inspect object / location");
                    ui.label("E - First person");
                }
                CameraMode::FirstPerson => {
                    ui.label("WASD - Move");
                    ui.label("Mouse - Look");
                    ui.label("E / ESC - Back to orbit");
                }
            }
            if ui.button("Hide Instructions").clicked() {
                state.show_help = false;
            }
        });
}
