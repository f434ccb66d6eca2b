//! Double-circular orbit: a slow wide circle with a fast small ellipse on top.

use cgmath::{Rad, Vector3};

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitParams {
    pub centre: Vector3<f32>,
    pub radius: f32,
    pub height: f32,
    /// Radians per second along the outer circle.
    pub outer_speed: f32,
    /// Radians per second around the wobble ellipse.
    pub wobble_speed: f32,
    /// Semi-axes of the wobble ellipse along x and z.
    pub wobble: (f32, f32),
}

impl Default for OrbitParams {
    fn default() -> Self {
        Self {
            centre: Vector3::new(0.0, 0.0, 0.0),
            radius: 150.0,
            height: 30.0,
            outer_speed: 0.2,
            wobble_speed: 1.5,
            wobble: (10.0, 6.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPose {
    pub position: Vector3<f32>,
    /// Unit tangent of the outer circle.
    pub tangent: Vector3<f32>,
}

impl OrbitPose {
    /// Rotation about +Y that turns a model facing +Z along the tangent.
    pub fn yaw(&self) -> Rad<f32> {
        Rad(self.tangent.x.atan2(self.tangent.z))
    }
}

/// Position and heading at time `t` for an orbiter starting at angle `phase`.
pub fn orbit_pose(params: &OrbitParams, phase: f32, t: f32) -> OrbitPose {
    let theta = phase + params.outer_speed * t;
    let phi = params.wobble_speed * t;
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (a, b) = params.wobble;
    let position = params.centre
        + Vector3::new(params.radius * cos_theta, params.height, params.radius * sin_theta)
        + Vector3::new(a * cos_phi, 0.0, b * sin_phi);
    OrbitPose {
        position,
        tangent: Vector3::new(-sin_theta, 0.0, cos_theta),
    }
}
