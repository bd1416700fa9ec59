//! # mrbox
//!
//! An anchored-object interaction toy for mixed-reality scenes.
//!
//! Point a controller at a detected screen surface and activate: a
//! container (an open box recessed into the struck face) spawns there
//! with a small spinning core inside. Grab the core and it chases your
//! hand; let it go and the container grows a replacement while the
//! released core dives into its own ground shadow and burns away in a
//! ten-particle flame.
//!
//! The crate is the interaction core only. Three collaborators are
//! external and talk to a [`Session`] through plain data:
//!
//! - an XR runtime writes controller poses and activate/release events
//!   into [`ControllerInput`],
//! - a room scanner feeds labeled world-space triangle soups into the
//!   surface set,
//! - a renderer walks the [`Scene`] graph and uploads each flame's
//!   [`ParticleInstance`] array after every step.
//!
//! # Example
//!
//! ```ignore
//! use mrbox::{ControllerId, Pose, Session, SurfaceLabel, Vec3};
//!
//! let mut session = Session::new();
//! session.add_surface(SurfaceLabel::Screen, screen_triangles);
//!
//! // Per frame, fed by the XR runtime:
//! session.input_mut().set_pose(ControllerId(0), pose);
//! if select_pressed {
//!     session.input_mut().activate(ControllerId(0));
//! }
//! session.step();
//!
//! // Then hand session.scene() and session.flames() to the renderer.
//! ```

pub mod decay;
pub mod error;
pub mod flame;
pub mod input;
pub mod lifecycle;
pub mod raycast;
pub mod scene;
pub mod session;
pub mod shadow;
pub mod spawn;
pub mod surface;
pub mod time;
pub mod visuals;

pub use error::SceneError;
pub use flame::{Flame, ParticleInstance};
pub use input::{ControllerEvent, ControllerId, ControllerInput, Pose};
pub use lifecycle::{
    Container, ContainerId, Core, CoreId, CoreState, CoreTarget, Destruction,
    LifecycleController,
};
pub use raycast::{Ray, RayHit};
pub use scene::{Node, NodeId, NodeKind, Scene};
pub use session::Session;
pub use shadow::Shadow;
pub use spawn::{classify_face, Face, FaceExtents};
pub use surface::{quad_triangles, Surface, SurfaceId, SurfaceLabel, SurfaceSet};
pub use time::{FrameClock, FrameTick};
pub use visuals::{CoreGeometry, Matcap};

pub use glam::{Quat, Vec3};
