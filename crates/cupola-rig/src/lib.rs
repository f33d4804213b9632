//! Camera rig and globe geocoding for the Cupola viewer.
//!
//! This crate holds the viewer's interaction model with no rendering
//! dependency:
//!
//! - a dual-mode camera rig ([`CameraRig`]) switching between an orbit
//!   inspection camera and a damped first-person walking camera,
//! - a pointer-ray geocoder ([`Geocoder`]) that turns a pixel position into
//!   latitude/longitude on a spherical globe mesh,
//! - click picking, surface classification and globe spin,
//! - [`ViewerSession`], which owns all of the above for one mounted viewer.
//!
//! # Example
//!
//! ```
//! use cupola_rig::{RigEvent, RigSettings, ViewerSession};
//! use glam::{Vec2, Vec3};
//!
//! let mut session = ViewerSession::new(RigSettings::default());
//! session.attach_globe(Vec3::new(0.0, -26.0, 0.0), 24.0);
//!
//! // Per frame: feed input, then advance.
//! session.handle(RigEvent::Wheel(1.0));
//! let frame = session.tick(1.0 / 60.0);
//! assert!(frame.pose.position.is_finite());
//!
//! // On pointer move: resolve the coordinate under the cursor.
//! let viewport = Vec2::new(1280.0, 720.0);
//! let _hover = session.hover(Some(Vec2::new(640.0, 700.0)), viewport);
//! ```

mod error;
pub mod first_person;
pub mod geocode;
pub mod input;
pub mod intersect;
pub mod orbit;
pub mod pick;
pub mod rig;
pub mod session;
pub mod settings;
pub mod spin;
pub mod surface;
pub mod view;

pub use error::{Error, Result};
pub use first_person::{FirstPersonRig, FirstPersonSettings};
pub use geocode::{GeoCoordinate, GeoFrame, GeoPick, Geocoder, SphereGeometryRef, resolve};
pub use input::{DragButton, InputFrame, InputState, MoveAction, MovementKeys};
pub use intersect::{Aabb, Sphere};
pub use orbit::{OrbitRig, OrbitSettings};
pub use pick::{ObjectInfo, PickTarget};
pub use rig::{CameraMode, CameraRig, ModeTransition, RigEvent, TransitionReason};
pub use session::{ClickOutcome, FrameOutput, ViewerSession};
pub use settings::{GlobeSettings, LensSettings, RigSettings};
pub use spin::SpinDriver;
pub use surface::{SurfaceClass, SurfaceStyle, SurfaceTable};
pub use view::{CameraPose, PerspectiveView, Ray};
