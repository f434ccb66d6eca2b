//! Idle spin that pauses while the cursor points at the focal point.

use cgmath::{InnerSpace, Point3};

use crate::camera::Ray;

#[derive(Debug, Clone, PartialEq)]
pub struct GateParams {
    /// World units between the focal point and the cursor ray below which the spin stops.
    pub distance: f32,
    /// Radians per second.
    pub spin_speed: f32,
}

impl Default for GateParams {
    fn default() -> Self {
        Self {
            distance: 20.0,
            spin_speed: 0.5,
        }
    }
}

/// Whether the point of `ray` closest to `focal_point` lies within `distance` of it.
pub fn is_near(ray: &Ray, focal_point: Point3<f32>, distance: f32) -> bool {
    (ray.closest_point_to(focal_point) - focal_point).magnitude() <= distance
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpinGate {
    /// Current yaw in radians.
    pub angle: f32,
    pub spinning: bool,
}

impl SpinGate {
    pub fn new() -> Self {
        Self {
            angle: 0.0,
            spinning: true,
        }
    }

    /// Without a cursor ray the spin continues.
    pub fn update(&mut self, ray: Option<&Ray>, focal_point: Point3<f32>, params: &GateParams, dt: f32) {
        self.spinning = !ray.is_some_and(|ray| is_near(ray, focal_point, params.distance));
        if self.spinning {
            self.angle = (self.angle + params.spin_speed * dt) % std::f32::consts::TAU;
        }
    }
}
