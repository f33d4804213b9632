//! Surface classification for model meshes.
//!
//! Meshes are tagged when the scene is prepared, from an authored table keyed
//! by mesh identifier. Anything not listed is treated as structure.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Rendering class of a mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceClass {
    /// Window panes.
    Glass,
    /// Frame, hull and everything else.
    #[default]
    Structure,
}

impl SurfaceClass {
    /// Material parameters for this class.
    pub fn style(self) -> SurfaceStyle {
        match self {
            SurfaceClass::Glass => SurfaceStyle {
                opacity: 0.2,
                double_sided: true,
                depth_write: false,
            },
            SurfaceClass::Structure => SurfaceStyle {
                opacity: 0.85,
                double_sided: true,
                depth_write: false,
            },
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            SurfaceClass::Glass => "Glass",
            SurfaceClass::Structure => "Structure",
        }
    }
}

/// Material parameters derived from a [`SurfaceClass`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceStyle {
    /// Alpha in `[0, 1]`.
    pub opacity: f32,
    pub double_sided: bool,
    pub depth_write: bool,
}

/// Mesh identifier to surface class lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceTable {
    entries: BTreeMap<String, SurfaceClass>,
}

impl SurfaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, mesh: impl Into<String>, class: SurfaceClass) -> Self {
        self.insert(mesh, class);
        self
    }

    pub fn insert(&mut self, mesh: impl Into<String>, class: SurfaceClass) {
        self.entries.insert(mesh.into(), class);
    }

    /// Class for `mesh`; unknown identifiers are structure.
    pub fn classify(&self, mesh: &str) -> SurfaceClass {
        self.entries.get(mesh).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
