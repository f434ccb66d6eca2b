//! Procedurally generated geometry: the chrome spheres, fish bodies and particles.
//!
//! All generators return plain vertex/index lists with counter-clockwise
//! winding seen from outside, so they can be uploaded with `Mesh::new`.

use std::f32::consts::{PI, TAU};

use cgmath::InnerSpace;

use crate::data_structures::model::ModelVertex;

pub struct Geometry {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

/// UV sphere centred on the origin, with `width_segments` around and `height_segments` pole to pole.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
    for y in 0..=height_segments {
        let v = y as f32 / height_segments as f32;
        let theta = v * PI;
        for x in 0..=width_segments {
            let u = x as f32 / width_segments as f32;
            let phi = u * TAU;
            let normal = [-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin()];
            vertices.push(ModelVertex {
                position: [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                tex_coords: [u, v],
                normal,
            });
        }
    }

    let row = width_segments + 1;
    let mut indices = Vec::new();
    for y in 0..height_segments {
        for x in 0..width_segments {
            let a = y * row + x + 1;
            let b = y * row + x;
            let c = (y + 1) * row + x;
            let d = (y + 1) * row + x + 1;
            // the pole rows collapse into triangles
            if y != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if y != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    Geometry { vertices, indices }
}

/// Low-poly fish pointing along +Z: a diamond body and a flat tail fin.
pub fn fish(length: f32) -> Geometry {
    let l = length;
    let w = length * 0.18;
    let h = length * 0.3;
    let points: [[f32; 3]; 8] = [
        [0.0, 0.0, l * 0.5],   // 0 snout
        [w, 0.0, 0.0],         // 1 right flank
        [0.0, h * 0.5, 0.0],   // 2 back
        [-w, 0.0, 0.0],        // 3 left flank
        [0.0, -h * 0.5, 0.0],  // 4 belly
        [0.0, 0.0, -l * 0.3],  // 5 tail root
        [0.0, h * 0.4, -l * 0.5], // 6 upper fin
        [0.0, -h * 0.4, -l * 0.5], // 7 lower fin
    ];
    let faces: [[usize; 3]; 11] = [
        [0, 1, 2],
        [0, 2, 3],
        [0, 3, 4],
        [0, 4, 1],
        [5, 2, 1],
        [5, 3, 2],
        [5, 4, 3],
        [5, 1, 4],
        [5, 6, 7],
        [5, 7, 6],
        [2, 6, 5],
    ];
    flat_shaded(&points, &faces)
}

/// Octahedron used as one particle of the particle field.
pub fn octahedron(size: f32) -> Geometry {
    let s = size;
    let points: [[f32; 3]; 6] = [
        [s, 0.0, 0.0],
        [-s, 0.0, 0.0],
        [0.0, s, 0.0],
        [0.0, -s, 0.0],
        [0.0, 0.0, s],
        [0.0, 0.0, -s],
    ];
    let faces: [[usize; 3]; 8] = [
        [0, 2, 4],
        [4, 2, 1],
        [1, 2, 5],
        [5, 2, 0],
        [4, 3, 0],
        [1, 3, 4],
        [5, 3, 1],
        [0, 3, 5],
    ];
    flat_shaded(&points, &faces)
}

fn flat_shaded(points: &[[f32; 3]], faces: &[[usize; 3]]) -> Geometry {
    let mut vertices = Vec::with_capacity(faces.len() * 3);
    for face in faces {
        let [a, b, c] = face.map(|i| cgmath::Vector3::from(points[i]));
        let n = (b - a).cross(c - a);
        let normal = if n.magnitude2() > f32::EPSILON {
            n.normalize()
        } else {
            cgmath::Vector3::unit_y()
        };
        for p in [a, b, c] {
            vertices.push(ModelVertex {
                position: p.into(),
                tex_coords: [0.5, 0.5],
                normal: normal.into(),
            });
        }
    }
    let indices = (0..vertices.len() as u32).collect();
    Geometry { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let g = uv_sphere(62.0, 32, 32);
        for v in &g.vertices {
            let r = cgmath::Vector3::from(v.position).magnitude();
            assert!((r - 62.0).abs() < 1e-3, "radius {r}");
        }
        assert_eq!(g.indices.len() % 3, 0);
        assert!(g.indices.iter().all(|&i| (i as usize) < g.vertices.len()));
    }

    #[test]
    fn octahedron_normals_point_outwards() {
        let g = octahedron(1.0);
        for tri in g.vertices.chunks(3) {
            let centroid = tri
                .iter()
                .fold(cgmath::Vector3::new(0.0, 0.0, 0.0), |acc, v| acc + cgmath::Vector3::from(v.position))
                / 3.0;
            assert!(centroid.dot(cgmath::Vector3::from(tri[0].normal)) > 0.0);
        }
    }
}
