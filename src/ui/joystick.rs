//! Virtual joysticks: the knob follows the cursor inside a circle and its
//! offset from the centre moves the camera while it is held.

use cgmath::{InnerSpace, Vector2, Vector3, Zero};
use winit::dpi::PhysicalPosition;

use crate::{camera::Camera, ui::QuadList};

const BASE_COLOUR: [f32; 4] = [1.0, 1.0, 1.0, 0.2];
const KNOB_COLOUR: [f32; 4] = [1.0, 1.0, 1.0, 0.85];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    BottomLeft,
    BottomRight,
}

/// What the knob axes move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoystickMode {
    /// Up/down moves forward/back on the ground plane, left/right strafes.
    Walk,
    /// Up/down moves vertically, left/right strafes.
    Lift,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Joystick {
    pub anchor: Anchor,
    pub mode: JoystickMode,
    pub radius: f32,
    /// Distance of the centre from the anchored screen edges.
    pub margin: f32,
    /// World units per second at full deflection.
    pub speed: f32,
    knob: Vector2<f32>,
    active: bool,
}

impl Joystick {
    pub fn new(anchor: Anchor, mode: JoystickMode, radius: f32, speed: f32) -> Self {
        Self {
            anchor,
            mode,
            radius: radius.max(1.0),
            margin: radius.max(1.0) + 30.0,
            speed,
            knob: Vector2::zero(),
            active: false,
        }
    }

    pub fn centre(&self, screen: [f32; 2]) -> [f32; 2] {
        let y = screen[1] - self.margin;
        match self.anchor {
            Anchor::BottomLeft => [self.margin, y],
            Anchor::BottomRight => [screen[0] - self.margin, y],
        }
    }

    /// Cursor offset from the centre, shortened to at most `radius`. Screen y grows downwards.
    pub fn displacement(&self, cursor: PhysicalPosition<f64>, screen: [f32; 2]) -> Vector2<f32> {
        let [cx, cy] = self.centre(screen);
        let offset = Vector2::new(cursor.x as f32 - cx, cursor.y as f32 - cy);
        let length = offset.magnitude();
        if length > self.radius {
            offset * (self.radius / length)
        } else {
            offset
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn knob(&self) -> Vector2<f32> {
        self.knob
    }

    /// Starts a drag if the cursor is on the base.
    pub fn grab(&mut self, cursor: PhysicalPosition<f64>, screen: [f32; 2]) -> bool {
        let [cx, cy] = self.centre(screen);
        let offset = Vector2::new(cursor.x as f32 - cx, cursor.y as f32 - cy);
        self.active = offset.magnitude() <= self.radius;
        if self.active {
            self.knob = self.displacement(cursor, screen);
        }
        self.active
    }

    pub fn drag(&mut self, cursor: PhysicalPosition<f64>, screen: [f32; 2]) {
        if self.active {
            self.knob = self.displacement(cursor, screen);
        }
    }

    pub fn release(&mut self) {
        self.active = false;
        self.knob = Vector2::zero();
    }

    /// Camera translation for one frame of length `dt` seconds.
    pub fn camera_delta(&self, camera: &Camera, dt: f32) -> Vector3<f32> {
        if !self.active {
            return Vector3::zero();
        }
        let deflection = self.knob / self.radius;
        let (forward, right) = camera.ground_axes();
        let vertical = match self.mode {
            // pushing the knob up (negative screen y) moves forward / up
            JoystickMode::Walk => forward * -deflection.y,
            JoystickMode::Lift => Vector3::unit_y() * -deflection.y,
        };
        (vertical + right * deflection.x) * self.speed * dt
    }

    pub fn draw(&self, quads: &mut QuadList, screen: [f32; 2]) {
        let centre = self.centre(screen);
        quads.push_square(centre, self.radius, BASE_COLOUR, screen);
        let knob = [centre[0] + self.knob.x, centre[1] + self.knob.y];
        quads.push_square(knob, self.radius * 0.35, KNOB_COLOUR, screen);
    }
}
