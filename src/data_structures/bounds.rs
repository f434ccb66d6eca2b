//! Axis-aligned bounding boxes for framing the camera on loaded models.

use cgmath::{EuclideanSpace, InnerSpace};

use crate::data_structures::instance::Instance;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: cgmath::Point3<f32>,
    pub max: cgmath::Point3<f32>,
}

impl Aabb {
    /// A box that contains nothing. Any union with it yields the other box.
    pub fn empty() -> Self {
        Self {
            min: cgmath::Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: cgmath::Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = cgmath::Point3<f32>>,
    {
        points.into_iter().fold(Self::empty(), |mut acc, p| {
            acc.extend(p);
            acc
        })
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn extend(&mut self, p: cgmath::Point3<f32>) {
        self.min = cgmath::Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = cgmath::Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        if other.is_empty() {
            return *self;
        }
        let mut out = *self;
        out.extend(other.min);
        out.extend(other.max);
        out
    }

    pub fn center(&self) -> cgmath::Point3<f32> {
        self.min.midpoint(self.max)
    }

    /// Length of the diagonal, zero for an empty box.
    pub fn size(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        (self.max - self.min).magnitude()
    }

    pub fn corners(&self) -> [cgmath::Point3<f32>; 8] {
        let (a, b) = (self.min, self.max);
        [
            cgmath::Point3::new(a.x, a.y, a.z),
            cgmath::Point3::new(b.x, a.y, a.z),
            cgmath::Point3::new(a.x, b.y, a.z),
            cgmath::Point3::new(b.x, b.y, a.z),
            cgmath::Point3::new(a.x, a.y, b.z),
            cgmath::Point3::new(b.x, a.y, b.z),
            cgmath::Point3::new(a.x, b.y, b.z),
            cgmath::Point3::new(b.x, b.y, b.z),
        ]
    }

    /// Bounds of this box after `transform`, still axis aligned.
    pub fn transformed(&self, transform: &Instance) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        Aabb::from_points(self.corners().into_iter().map(|c| transform.transform_point(c)))
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_with_empty_is_identity() {
        let a = Aabb::from_points([cgmath::Point3::new(-1.0, 0.0, 0.0), cgmath::Point3::new(1.0, 2.0, 3.0)]);
        assert_eq!(a.union(&Aabb::empty()), a);
        assert_eq!(Aabb::empty().union(&a), a);
    }

    #[test]
    fn translated_box_moves_center() {
        let a = Aabb::from_points([cgmath::Point3::new(-1.0, -1.0, -1.0), cgmath::Point3::new(1.0, 1.0, 1.0)]);
        let moved = a.transformed(&Instance::from(cgmath::Vector3::new(10.0, 0.0, 0.0)));
        assert_eq!(moved.center(), cgmath::Point3::new(10.0, 0.0, 0.0));
        assert!((moved.size() - a.size()).abs() < 1e-5);
    }
}
