//! Asset locations, entity counts and the starting motion parameters of every stage.

use cgmath::Vector3;

use crate::motion::MotionParams;

#[derive(Debug, Clone, PartialEq)]
pub struct AssetPaths {
    pub headset: String,
    pub shark: String,
    /// Optional, a generated fish mesh stands in when it is missing.
    pub fish: String,
    pub hdri: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            headset: "models/quest3.gltf".to_string(),
            shark: "models/shark.gltf".to_string(),
            fish: "models/fish.gltf".to_string(),
            hdri: "images/tufia_test4.hdr".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub assets: AssetPaths,
    pub sphere_radius: f32,
    pub sphere_segments: u32,
    /// Spheres sit at ±this on x around the headset centre.
    pub sphere_offset: f32,
    pub shark_scale: f32,
    pub shark_phases: [f32; 2],
    pub fish_per_swarm: usize,
    pub fish_length: f32,
    pub swarm_homes: [Vector3<f32>; 2],
    pub swarm_tints: [[f32; 4]; 2],
    pub swarm_spread: f32,
    pub particle_count: usize,
    pub particle_size: f32,
    pub exposure: f32,
    pub fog_colour: [f32; 3],
    pub fog_density: f32,
    pub motion: MotionParams,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            assets: AssetPaths::default(),
            sphere_radius: 62.0,
            sphere_segments: 32,
            sphere_offset: 250.0,
            shark_scale: 5.0,
            shark_phases: [0.0, std::f32::consts::PI],
            fish_per_swarm: 200,
            fish_length: 3.0,
            swarm_homes: [Vector3::new(-60.0, 20.0, 0.0), Vector3::new(60.0, -20.0, 0.0)],
            swarm_tints: [[1.0, 0.55, 0.2, 1.0], [0.3, 0.7, 1.0, 1.0]],
            swarm_spread: 40.0,
            particle_count: 600,
            particle_size: 0.6,
            exposure: 0.6,
            fog_colour: [0.05, 0.12, 0.2],
            fog_density: 0.0015,
            motion: MotionParams::default(),
        }
    }
}
