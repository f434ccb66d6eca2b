//! On-screen controls: labelled sliders bound to motion parameters and
//! virtual joysticks that move the camera.
//!
//! Widgets are laid out in physical pixels with the origin in the top left
//! corner, like winit cursor positions. [`GuiBatch`] turns them into coloured
//! quads in normalised device coordinates for the GUI pipeline.

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalPosition;

use crate::{
    pipelines::gui::Vertex,
    render::{Flat, Render},
};

pub mod joystick;
pub mod slider;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, pos: PhysicalPosition<f64>) -> bool {
        let (px, py) = (pos.x as f32, pos.y as f32);
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    /// The same rectangle grown by `margin` on every side.
    pub fn inflate(&self, margin: f32) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }
}

/// Pixel position to normalised device coordinates, y up.
pub fn to_ndc(x: f32, y: f32, screen: [f32; 2]) -> [f32; 2] {
    [x / screen[0] * 2.0 - 1.0, 1.0 - y / screen[1] * 2.0]
}

/// Quads collected for one frame.
#[derive(Debug, Default, Clone)]
pub struct QuadList {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl QuadList {
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn push_rect(&mut self, rect: Rect, colour: [f32; 4], screen: [f32; 2]) {
        let base = self.vertices.len() as u16;
        let corners = [
            (rect.x, rect.y),
            (rect.x, rect.y + rect.height),
            (rect.x + rect.width, rect.y + rect.height),
            (rect.x + rect.width, rect.y),
        ];
        self.vertices.extend(corners.into_iter().map(|(x, y)| Vertex {
            position: to_ndc(x, y, screen),
            colour,
        }));
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// A square of side `2 * radius` centred on `centre`, standing in for a disc.
    pub fn push_square(&mut self, centre: [f32; 2], radius: f32, colour: [f32; 4], screen: [f32; 2]) {
        self.push_rect(
            Rect::new(centre[0] - radius, centre[1] - radius, 2.0 * radius, 2.0 * radius),
            colour,
            screen,
        );
    }
}

/// GPU side of a [`QuadList`] with room for a fixed number of quads.
#[derive(Debug)]
pub struct GuiBatch {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    capacity: usize,
    amount: usize,
}

impl GuiBatch {
    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let vertices = vec![
            Vertex {
                position: [0.0; 2],
                colour: [0.0; 4],
            };
            capacity * 4
        ];
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("GUI Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("GUI Index Buffer"),
            contents: bytemuck::cast_slice(&vec![0u16; capacity * 6]),
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            vertex,
            index,
            capacity,
            amount: 0,
        }
    }

    /// Quads beyond the capacity are dropped.
    pub fn upload(&mut self, queue: &wgpu::Queue, quads: &QuadList) {
        let count = quads.quad_count().min(self.capacity);
        if count < quads.quad_count() {
            log::warn!("GUI batch holds {} quads, dropping {}", self.capacity, quads.quad_count() - count);
        }
        if count > 0 {
            queue.write_buffer(&self.vertex, 0, bytemuck::cast_slice(&quads.vertices[..count * 4]));
            queue.write_buffer(&self.index, 0, bytemuck::cast_slice(&quads.indices[..count * 6]));
        }
        self.amount = count * 6;
    }

    pub fn render<'a, 'pass>(&'a self) -> Render<'a, 'pass> {
        if self.amount == 0 {
            return Render::None;
        }
        Render::GUI(Flat {
            vertex: &self.vertex,
            index: &self.index,
            amount: self.amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndc_corners() {
        assert_eq!(to_ndc(0.0, 0.0, [200.0, 100.0]), [-1.0, 1.0]);
        assert_eq!(to_ndc(200.0, 100.0, [200.0, 100.0]), [1.0, -1.0]);
    }

    #[test]
    fn quads_share_vertices_per_rect() {
        let mut quads = QuadList::default();
        quads.push_rect(Rect::new(0.0, 0.0, 10.0, 10.0), [1.0; 4], [100.0, 100.0]);
        quads.push_square([50.0, 50.0], 5.0, [1.0; 4], [100.0, 100.0]);
        assert_eq!(quads.quad_count(), 2);
        assert_eq!(quads.indices.len(), 12);
        assert_eq!(quads.indices[6], 4);
    }
}
