//! Launch parameter parsing for the viewer.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used (CLI argument parsing is not available).

use std::path::PathBuf;

use cupola_rig::{CameraMode, RigSettings};

use crate::scene;

/// Launch parameters for the viewer.
#[derive(Debug, Default)]
pub struct LaunchParams {
    /// Settings file to load.
    pub config: Option<PathBuf>,
    /// Initial camera mode override.
    pub mode: Option<CameraMode>,
    /// Globe spin rate override in radians per second.
    pub spin_rate: Option<f32>,
}

impl LaunchParams {
    /// Resolve the rig settings these parameters describe.
    ///
    /// A settings file that fails to load, or overrides that fail validation,
    /// fall back to the defaults with a warning.
    pub fn settings(&self) -> RigSettings {
        let mut settings = match &self.config {
            Some(path) => RigSettings::from_json_file(path).unwrap_or_else(|e| {
                tracing::warn!("{e}; using default settings");
                RigSettings::default()
            }),
            None => RigSettings::default(),
        };

        if let Some(mode) = self.mode {
            settings.initial_mode = mode;
        }
        if let Some(rate) = self.spin_rate {
            settings.globe.spin_rate = rate;
        }
        if settings.surfaces.is_empty() {
            settings.surfaces = scene::authored_surfaces();
        }

        if let Err(e) = settings.validate() {
            tracing::warn!("{e}; using default settings");
            settings = RigSettings {
                surfaces: scene::authored_surfaces(),
                ..RigSettings::default()
            };
        }
        settings
    }
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use clap::{Parser, ValueEnum};

    use super::*;

    #[derive(Clone, Copy, Debug, ValueEnum)]
    enum ModeArg {
        Orbit,
        FirstPerson,
    }

    impl From<ModeArg> for CameraMode {
        fn from(mode: ModeArg) -> Self {
            match mode {
                ModeArg::Orbit => CameraMode::Orbit,
                ModeArg::FirstPerson => CameraMode::FirstPerson,
            }
        }
    }

    #[derive(Parser)]
    #[command(about = "Interactive Cupola viewer")]
    struct CliArgs {
        /// JSON settings file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Initial camera mode.
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Globe spin rate in radians per second.
        #[arg(long)]
        spin_rate: Option<f32>,
    }

    pub fn parse() -> LaunchParams {
        let args = CliArgs::parse();
        LaunchParams {
            config: args.config,
            mode: args.mode.map(CameraMode::from),
            spin_rate: args.spin_rate,
        }
    }
}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> LaunchParams {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        LaunchParams::default()
    }
}
