//! Interactive Cupola viewer.
//!
//! Orbit around the Cupola model or walk through it in first person, and
//! read latitude/longitude off the globe under the pointer.

mod launch_params;
mod scene;
mod ui;
mod viewer;

use bevy::prelude::*;
use ui::ViewerUiPlugin;
use viewer::{ViewerConfig, ViewerPlugin};

/// Plugin for the main application.
pub struct AppPlugin {
    settings: cupola_rig::RigSettings,
}

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ViewerConfig::new(self.settings.clone()))
            .add_plugins((ViewerPlugin, ViewerUiPlugin));
    }
}

fn main() {
    // Initialize tracing for native platforms.
    #[cfg(not(target_family = "wasm"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // Initialize tracing for WASM (logs to browser console).
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    let settings = launch_params::parse().settings();

    let mut app = App::new();

    #[allow(unused_mut)]
    let mut window = Window {
        title: "Cupola Viewer".to_string(),
        resolution: (1280, 720).into(),
        ..Default::default()
    };

    // WASM: Fit canvas to parent element and prevent browser event handling.
    #[cfg(target_family = "wasm")]
    {
        window.fit_canvas_to_parent = true;
        window.prevent_default_event_handling = true;
    }

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        ..Default::default()
    }));

    app.add_plugins(AppPlugin { settings }).run();
}
