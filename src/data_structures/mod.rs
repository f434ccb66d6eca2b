//! Engine data structures: models, textures, scene graphs, and instances.
//!
//! - `bounds` axis-aligned boxes used to frame the camera on a loaded model
//! - `instance` holds per-instance transformation and tint data
//! - `model` contains mesh and material definitions and draw helpers
//! - `primitives` generates the sphere, fish and particle meshes
//! - `scene_graph` enables hierarchical scene organization
//! - `texture` contains GPU texture wrapper and creation utilities

pub mod bounds;
pub mod instance;
pub mod model;
pub mod primitives;
pub mod scene_graph;
pub mod texture;
