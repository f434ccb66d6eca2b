//! Per-frame motion of everything that moves in the scene.
//!
//! - `flocking` boids update of the two fish swarms and their mutual avoidance
//! - `orbit` the double-circular shark paths
//! - `particles` the random-walking particle field
//! - `gate` stops the headset spin while the cursor points at the focal point
//!
//! All functions are plain CPU code over `cgmath` vectors. The flows own the
//! simulated entities and copy the results into scene-graph instances.

pub mod flocking;
pub mod gate;
pub mod orbit;
pub mod particles;

/// The tunable knobs shared by motion code and the sliders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MotionParams {
    pub flocking: flocking::FlockingParams,
    pub orbit: orbit::OrbitParams,
    pub particles: particles::ParticleParams,
    pub gate: gate::GateParams,
}
