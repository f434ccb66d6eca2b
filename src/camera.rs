//! Orbit camera, perspective projection and mouse picking rays.
//!
//! The camera circles a target point: yaw/pitch/distance describe the eye
//! position relative to it. Dragging with the left mouse button rotates, the
//! wheel zooms and the virtual joysticks translate eye and target together.

use std::f32::consts::FRAC_PI_2;

use cgmath::{InnerSpace, SquareMatrix, Transform};
use instant::Duration;
use winit::{
    dpi::PhysicalPosition,
    event::{MouseScrollDelta, WindowEvent},
};

use crate::data_structures::bounds::Aabb;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;
const MIN_DISTANCE: f32 = 0.1;

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub target: cgmath::Point3<f32>,
    pub distance: f32,
    pub yaw: cgmath::Rad<f32>,
    pub pitch: cgmath::Rad<f32>,
}

impl Camera {
    pub fn new<T: Into<cgmath::Point3<f32>>, Y: Into<cgmath::Rad<f32>>, P: Into<cgmath::Rad<f32>>>(
        target: T,
        distance: f32,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let mut camera = Self {
            target: target.into(),
            distance,
            yaw: yaw.into(),
            pitch: pitch.into(),
        };
        camera.clamp();
        camera
    }

    /// Places the eye at `eye`, looking at `target`.
    pub fn look_at(eye: cgmath::Point3<f32>, target: cgmath::Point3<f32>) -> Self {
        let offset = eye - target;
        let distance = offset.magnitude().max(MIN_DISTANCE);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);
        Self::new(target, distance, cgmath::Rad(yaw), cgmath::Rad(pitch))
    }

    /// Frames a model: eye at centre + (size/3, size, size), looking at the centre.
    pub fn framing(bounds: &Aabb) -> Option<Self> {
        if bounds.is_empty() {
            return None;
        }
        let center = bounds.center();
        let size = bounds.size().max(MIN_DISTANCE);
        let eye = center + cgmath::Vector3::new(size / 3.0, size, size);
        Some(Self::look_at(eye, center))
    }

    pub fn position(&self) -> cgmath::Point3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        self.target
            + cgmath::Vector3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    pub fn calc_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::look_at_rh(self.position(), self.target, cgmath::Vector3::unit_y())
    }

    /// Moves eye and target together, e.g. from a joystick.
    pub fn translate(&mut self, delta: cgmath::Vector3<f32>) {
        self.target += delta;
    }

    /// Horizontal forward/right axes relative to the current view.
    pub fn ground_axes(&self) -> (cgmath::Vector3<f32>, cgmath::Vector3<f32>) {
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        let forward = cgmath::Vector3::new(-sin_yaw, 0.0, -cos_yaw);
        let right = cgmath::Vector3::new(cos_yaw, 0.0, -sin_yaw);
        (forward, right)
    }

    fn clamp(&mut self) {
        self.pitch.0 = self.pitch.0.clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2);
        self.distance = self.distance.max(MIN_DISTANCE);
    }

    /// Unprojects the cursor into a world-space ray starting on the near plane.
    pub fn cast_ray_from_mouse(
        &self,
        mouse: PhysicalPosition<f64>,
        width: f32,
        height: f32,
        projection: &Projection,
    ) -> Option<Ray> {
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        let x = 2.0 * mouse.x as f32 / width - 1.0;
        let y = 1.0 - 2.0 * mouse.y as f32 / height;
        let inv = (projection.calc_matrix() * self.calc_matrix()).invert()?;
        let near = inv.transform_point(cgmath::Point3::new(x, y, 0.0));
        let far = inv.transform_point(cgmath::Point3::new(x, y, 1.0));
        let direction = far - near;
        if direction.magnitude2() <= f32::EPSILON {
            return None;
        }
        Some(Ray {
            origin: near,
            direction: direction.normalize(),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: cgmath::Point3<f32>,
    /// Unit length.
    pub direction: cgmath::Vector3<f32>,
}

impl Ray {
    /// The point on the ray (t >= 0) nearest to `point`.
    pub fn closest_point_to(&self, point: cgmath::Point3<f32>) -> cgmath::Point3<f32> {
        let t = (point - self.origin).dot(self.direction).max(0.0);
        self.origin + self.direction * t
    }
}

#[derive(Clone, Debug)]
pub struct Projection {
    aspect: f32,
    fovy: cgmath::Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<cgmath::Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn calc_matrix(&self) -> cgmath::Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Accumulates drag and wheel input between frames and applies it in `update`.
#[derive(Debug)]
pub struct CameraController {
    rotate_speed: f32,
    zoom_speed: f32,
    rotate_horizontal: f32,
    rotate_vertical: f32,
    scroll: f32,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            scroll: 0.0,
        }
    }

    pub fn handle_mouse(&mut self, mouse_dx: f64, mouse_dy: f64) {
        self.rotate_horizontal += mouse_dx as f32;
        self.rotate_vertical += mouse_dy as f32;
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        if let WindowEvent::MouseWheel { delta, .. } = event {
            self.scroll += match delta {
                MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32 / 100.0,
            };
        }
    }

    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        let dt = dt.as_secs_f32();
        camera.yaw -= cgmath::Rad(self.rotate_horizontal * self.rotate_speed * dt);
        camera.pitch += cgmath::Rad(self.rotate_vertical * self.rotate_speed * dt);
        // zoom is multiplicative so it feels the same close up and far away
        camera.distance *= (1.0 - self.scroll * self.zoom_speed).clamp(0.5, 1.5);
        camera.clamp();

        self.rotate_horizontal = 0.0;
        self.rotate_vertical = 0.0;
        self.scroll = 0.0;
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    // Used by the background pass to turn screen positions back into view directions.
    inv_view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: cgmath::Matrix4::identity().into(),
            inv_view_proj: cgmath::Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position().to_homogeneous().into();
        let view_proj = projection.calc_matrix() * camera.calc_matrix();
        self.view_proj = view_proj.into();
        self.inv_view_proj = view_proj
            .invert()
            .unwrap_or_else(cgmath::Matrix4::identity)
            .into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: CameraController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

#[cfg(test)]
mod tests {
    use cgmath::EuclideanSpace;

    use super::*;

    #[test]
    fn look_at_round_trips_eye() {
        let eye = cgmath::Point3::new(3.0, 4.0, 12.0);
        let cam = Camera::look_at(eye, cgmath::Point3::new(0.0, 0.0, 0.0));
        let p = cam.position();
        assert!((p - eye).magnitude() < 1e-4, "{p:?}");
    }

    #[test]
    fn center_ray_hits_target() {
        let cam = Camera::look_at(cgmath::Point3::new(0.0, 0.0, 15.0), cgmath::Point3::origin());
        let proj = Projection::new(800, 600, cgmath::Deg(75.0), 0.1, 1000.0);
        let ray = cam
            .cast_ray_from_mouse(PhysicalPosition::new(400.0, 300.0), 800.0, 600.0, &proj)
            .unwrap();
        let closest = ray.closest_point_to(cgmath::Point3::origin());
        assert!(closest.to_vec().magnitude() < 1e-3, "{closest:?}");
    }
}
