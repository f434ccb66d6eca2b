//! vr-aquarium
//!
//! A cross-platform (native and WebGL2) demo scene: an HDRI sky, a wireframe
//! VR headset between two chrome spheres, orbiting sharks, a drifting particle
//! field and two flocking fish swarms, controlled with an orbit camera,
//! sliders and virtual joysticks.
//!
//! High-level modules
//! - `camera`: orbit camera, projection, cursor rays and the camera uniform
//! - `config`: asset paths, counts and starting motion parameters
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: meshes, instances, textures, bounds and the scene graph
//! - `flow`: the event loop and the `GraphicsFlow` trait scene parts implement
//! - `motion`: flocking, orbits, particles and the spin gate
//! - `pipelines`: surface, wireframe, chrome, background and GUI pipelines
//! - `render`: render composition and per-pipeline batching
//! - `resources`: GLTF, image and HDRI loading with progress callbacks
//! - `scene`: the Headset, Sharks and Swarm stages
//! - `ui`: sliders and joysticks
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod motion;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod ui;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::prelude::*;

    use crate::scene::{self, Stage};

    fn start(stage: Stage) -> Result<(), JsValue> {
        scene::run(stage).map_err(|e| JsValue::from_str(&format!("{e:#}")))
    }

    #[wasm_bindgen]
    pub fn run_headset() -> Result<(), JsValue> {
        start(Stage::Headset)
    }

    #[wasm_bindgen]
    pub fn run_sharks() -> Result<(), JsValue> {
        start(Stage::Sharks)
    }

    #[wasm_bindgen]
    pub fn run_swarm() -> Result<(), JsValue> {
        start(Stage::Swarm)
    }
}
