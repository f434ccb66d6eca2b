//! GLTF keyframe tracks and the looping player that samples them every frame.

use cgmath::{InnerSpace, VectorSpace};

use crate::data_structures::{instance::Instance, scene_graph::SceneNode};

#[derive(Clone, Debug)]
pub enum Keyframes {
    Translation(Vec<cgmath::Vector3<f32>>),
    Rotation(Vec<cgmath::Quaternion<f32>>),
    Scale(Vec<cgmath::Vector3<f32>>),
    Other,
}

/// Finds the keyframe pair around `time` and the blend factor between them.
///
/// `time` is clamped into the track, so callers wrap it for looping first.
pub fn keyframe_span(timestamps: &[f32], time: f32) -> Option<(usize, usize, f32)> {
    let last = timestamps.len().checked_sub(1)?;
    if time <= timestamps[0] {
        return Some((0, 0, 0.0));
    }
    if time >= timestamps[last] {
        return Some((last, last, 0.0));
    }
    let next = timestamps.partition_point(|&t| t <= time);
    let prev = next - 1;
    let span = timestamps[next] - timestamps[prev];
    let factor = if span > f32::EPSILON {
        (time - timestamps[prev]) / span
    } else {
        0.0
    };
    Some((prev, next, factor))
}

/// Linear blend of two keyframe transforms. Rotations use normalised lerp.
pub fn blend(a: &Instance, b: &Instance, factor: f32) -> Instance {
    let rotation = if a.rotation.dot(b.rotation) < 0.0 {
        // take the short way around
        a.rotation.nlerp(-b.rotation, factor)
    } else {
        a.rotation.nlerp(b.rotation, factor)
    };
    Instance {
        position: a.position.lerp(b.position, factor),
        rotation,
        scale: a.scale.lerp(b.scale, factor),
        tint: a.tint,
    }
}

/// Plays one named clip on a scene subtree, looping forever.
#[derive(Clone, Debug)]
pub struct AnimationPlayer {
    clip: Option<String>,
    time: f32,
    pub speed: f32,
    duration: f32,
}

impl AnimationPlayer {
    /// Picks the first clip found in the subtree; a tree without animations yields an idle player.
    pub fn for_node(node: &dyn SceneNode) -> Self {
        let clip = first_clip(node);
        let duration = clip
            .as_deref()
            .map(|name| clip_duration(node, name))
            .unwrap_or(0.0);
        if let Some(name) = &clip {
            log::info!("Playing animation clip {name} ({duration:.2}s)");
        }
        Self {
            clip,
            time: 0.0,
            speed: 1.0,
            duration,
        }
    }

    pub fn clip(&self) -> Option<&str> {
        self.clip.as_deref()
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advances the clock and writes the sampled local transforms into the subtree.
    pub fn update(&mut self, node: &mut dyn SceneNode, dt: f32) {
        let Some(clip) = &self.clip else {
            return;
        };
        if self.duration > 0.0 {
            self.time = (self.time + dt * self.speed).rem_euclid(self.duration);
        }
        node.apply_animation(clip, self.time);
    }
}

fn first_clip(node: &dyn SceneNode) -> Option<String> {
    node.get_animation()
        .first()
        .map(|anim| anim.name.clone())
        .or_else(|| node.get_children().iter().find_map(|c| first_clip(c.as_ref())))
}

fn clip_duration(node: &dyn SceneNode, name: &str) -> f32 {
    let own = node
        .get_animation()
        .iter()
        .filter(|anim| anim.name == name)
        .filter_map(|anim| anim.timestamps.last().copied())
        .fold(0.0, f32::max);
    node.get_children()
        .iter()
        .map(|c| clip_duration(c.as_ref(), name))
        .fold(own, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_between_keyframes() {
        let ts = [0.0, 1.0, 3.0];
        assert_eq!(keyframe_span(&ts, 2.0), Some((1, 2, 0.5)));
        assert_eq!(keyframe_span(&ts, 5.0), Some((2, 2, 0.0)));
        assert_eq!(keyframe_span(&[], 1.0), None);
    }

    #[test]
    fn blend_halfway_translation() {
        let a = Instance::from(cgmath::Vector3::new(0.0, 0.0, 0.0));
        let b = Instance::from(cgmath::Vector3::new(2.0, 4.0, 0.0));
        let mid = blend(&a, &b, 0.5);
        assert_eq!(mid.position, cgmath::Vector3::new(1.0, 2.0, 0.0));
    }
}
