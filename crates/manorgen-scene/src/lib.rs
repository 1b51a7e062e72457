//! Scene side of ManorGen.
//!
//! [`scene`] holds the node tree a building is published into (the
//! [`SceneBackend`](scene::SceneBackend) seam plus the hecs-backed
//! [`SceneGraph`](scene::SceneGraph)); [`session`] owns the generate/dispose
//! lifecycle and keeps at most one building alive per scene.

pub mod error;
pub mod scene;
pub mod session;

pub use error::SessionError;
pub use scene::{NodeId, SceneBackend, SceneError, SceneGraph};
pub use session::{BuildReport, BuildingSession, SessionState};
