//! Scene graph and hierarchical scene organization.
//!
//! Every loaded GLTF becomes a tree of [`SceneNode`]s. Nodes hold a list of
//! `(local, world)` transform pairs, one per instance, so the same subtree can
//! be drawn several times (two sharks from one file, 200 fish from one mesh).

use std::{collections::HashMap, ops::Range};

use log::warn;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        bounds::Aabb,
        instance::{Instance, InstanceRaw},
        model::{self, ModelVertex},
    },
    render::{Instanced, Shading},
    resources::animation::{Keyframes, blend, keyframe_span},
};

/// An animation clip: a named animation with keyframes and timing.
#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: String,
    pub keyframes: Keyframes,
    pub timestamps: Vec<f32>,
}

#[derive(Clone, Debug, Default)]
pub struct ModelAnimation {
    pub name: String,
    pub instances: Vec<Instance>,
    pub timestamps: Vec<f32>,
}

impl ModelAnimation {
    pub fn sample(&self, time: f32) -> Option<Instance> {
        let (prev, next, factor) = keyframe_span(&self.timestamps, time)?;
        let a = self.instances.get(prev)?;
        let b = self.instances.get(next).unwrap_or(a);
        Some(blend(a, b, factor))
    }
}

/**
 * Intermediate state when converting between `AnimationClip` and `ModelAnimation`
 */
#[derive(Default)]
struct ModelState {
    animations: Vec<ModelAnimation>,
    trans: Vec<cgmath::Vector3<f32>>,
    rots: Vec<cgmath::Quaternion<f32>>,
    scals: Vec<cgmath::Vector3<f32>>,
    timestamps: Vec<f32>,
    current_clip: String,
}

impl ModelState {
    fn reset(&mut self, clip: &AnimationClip) {
        self.timestamps = vec![];
        self.trans = vec![];
        self.rots = vec![];
        self.scals = vec![];
        self.current_clip = clip.name.clone();
    }

    /// Tracks missing for a channel fall back to the node's rest pose.
    fn save(&mut self, rest: &Instance) {
        let len = self.timestamps.len();
        if len == 0 {
            return;
        }
        let pad = |v: &mut Vec<cgmath::Vector3<f32>>, default: cgmath::Vector3<f32>| {
            let fill = v.first().copied().unwrap_or(default);
            v.resize(len, fill);
        };
        pad(&mut self.trans, rest.position);
        pad(&mut self.scals, rest.scale);
        let fill = self.rots.first().copied().unwrap_or(rest.rotation);
        self.rots.resize(len, fill);

        let instances = (0..len)
            .map(|i| Instance {
                position: self.trans[i],
                rotation: self.rots[i],
                scale: self.scals[i],
                tint: rest.tint,
            })
            .collect();
        self.animations.push(ModelAnimation {
            name: self.current_clip.clone(),
            instances,
            timestamps: self.timestamps.clone(),
        });
    }
}

/**
 * Merges the per-channel GLTF clips of one node into one track per clip name.
 *
 * GLTF stores translation, rotation and scale of `anim1` as separate channels.
 * The result holds a single `ModelAnimation { name: anim1, instances: [..] }`
 * where every keyframe is a full transform.
 */
pub fn merge(clips: &[AnimationClip], rest: &Instance) -> Vec<ModelAnimation> {
    let Some(first) = clips.first() else {
        return Vec::new();
    };
    let mut state = ModelState {
        current_clip: first.name.clone(),
        ..Default::default()
    };
    for clip in clips {
        if clip.name != state.current_clip {
            state.save(rest);
            state.reset(clip);
        }
        match &clip.keyframes {
            Keyframes::Translation(t) => state.trans.extend_from_slice(t),
            Keyframes::Rotation(r) => state.rots.extend_from_slice(r),
            Keyframes::Scale(s) => state.scals.extend_from_slice(s),
            Keyframes::Other => {
                warn!("Skipping unsupported keyframes in clip {}", clip.name);
                continue;
            }
        }
        // in case some tracks have fewer steps than others we want the largest set of timestamps
        if clip.timestamps.len() > state.timestamps.len() {
            state.timestamps = clip.timestamps.clone();
        }
    }
    state.save(rest);
    state.animations
}

pub fn to_scene_node(
    node: gltf::scene::Node,
    buf: &[Vec<u8>],
    device: &wgpu::Device,
    mats: &[model::Material],
    anims: &HashMap<usize, Vec<AnimationClip>>,
) -> Box<dyn SceneNode> {
    let (translation, rotation, scale) = node.transform().decomposed();
    let rest = Instance {
        position: translation.into(),
        rotation: rotation.into(),
        scale: scale.into(),
        tint: [1.0; 4],
    };
    let animations = anims
        .get(&node.index())
        .map(|clips| merge(clips, &rest))
        .unwrap_or_default();

    let mut scene_node: Box<dyn SceneNode> = match node.mesh() {
        Some(mesh) => {
            let mesh_name = mesh.name().unwrap_or("unknown_mesh");
            // Only the materials this mesh uses travel with it, re-indexed from zero.
            let mut local_mats: Vec<model::Material> = Vec::new();
            let mut remap: HashMap<Option<usize>, usize> = HashMap::new();
            let mut meshes = Vec::new();
            for (p_idx, primitive) in mesh.primitives().enumerate() {
                let reader = primitive.reader(|buffer| buf.get(buffer.index()).map(Vec::as_slice));

                let mut vertices: Vec<ModelVertex> = match reader.read_positions() {
                    Some(positions) => positions
                        .map(|position| ModelVertex {
                            position,
                            ..Default::default()
                        })
                        .collect(),
                    None => {
                        warn!("Primitive {p_idx} of {mesh_name} has no positions, skipping");
                        continue;
                    }
                };
                if let Some(normals) = reader.read_normals() {
                    vertices
                        .iter_mut()
                        .zip(normals)
                        .for_each(|(v, n)| v.normal = n);
                }
                if let Some(tex_coords) = reader.read_tex_coords(0).map(|v| v.into_f32()) {
                    vertices
                        .iter_mut()
                        .zip(tex_coords)
                        .for_each(|(v, uv)| v.tex_coords = uv);
                }
                let indices: Vec<u32> = match reader.read_indices() {
                    Some(raw) => raw.into_u32().collect(),
                    None => (0..vertices.len() as u32).collect(),
                };

                let gltf_mat = primitive.material().index();
                let mat_idx = *remap.entry(gltf_mat).or_insert_with(|| {
                    let src = gltf_mat.and_then(|i| mats.get(i)).or(mats.last());
                    if let Some(m) = src {
                        local_mats.push(m.clone());
                    }
                    local_mats.len().saturating_sub(1)
                });

                meshes.push(model::Mesh::new(
                    device,
                    &format!("{mesh_name}#{p_idx}"),
                    &vertices,
                    &indices,
                    mat_idx,
                ));
            }
            let model = model::Model {
                meshes,
                materials: local_mats,
            };
            Box::new(ModelNode::from_model(1, device, model, animations))
        }
        None => Box::new(ContainerNode::new(1, animations)),
    };
    scene_node.set_local_transform(0, rest);
    for child in node.children() {
        let child_node = to_scene_node(child, buf, device, mats, anims);
        scene_node.add_child(child_node);
    }

    scene_node
}

pub trait SceneNode {
    fn get_world_transforms(&self) -> Vec<Instance>;

    fn get_local_transform(&self, idx: usize) -> Option<Instance>;

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    fn set_local_transform(&mut self, idx: usize, instance: Instance);

    fn set_local_transform_all(&mut self, mutation: &mut dyn FnMut(&mut Instance));

    fn instance_count(&self) -> usize;

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device);

    /**
     * Multiple instances of a parent can be passed down to multiple instances of multiple children.
     * The argument `parents_world_transform` with a matching `range` size provides control over which instances are transformed.
     */
    fn update_world_transforms(&mut self, range: Range<usize>, parents_world_transform: &[Instance]);

    fn update_world_transform_all(&mut self) {
        let range = 0..self.instance_count();
        let identity = vec![Instance::default(); range.len()];
        self.update_world_transforms(range, &identity);
    }

    /// Appends an instance to this node. Children grow along, copying their first local transform.
    fn add_instance(&mut self, instance: Instance) -> usize;

    fn get_animation(&self) -> &Vec<ModelAnimation>;

    /// Writes the sampled pose of clip `name` into the local transforms of every instance.
    fn apply_animation(&mut self, name: &str, time: f32) {
        let pose = self
            .get_animation()
            .iter()
            .find(|anim| anim.name == name)
            .and_then(|anim| anim.sample(time));
        if let Some(pose) = pose {
            self.set_local_transform_all(&mut |local| {
                local.position = pose.position;
                local.rotation = pose.rotation;
                local.scale = pose.scale;
            });
        }
        for child in self.get_children_mut() {
            child.apply_animation(name, time);
        }
    }

    /// Overrides how this subtree is drawn, e.g. the headset as a white wireframe.
    fn set_shading(&mut self, shading: Shading);

    /// World-space bounds of all meshes in the subtree. Requires up-to-date world transforms.
    fn bounds(&self) -> Aabb;

    fn get_render(&self) -> Vec<Instanced<'_>>;
}

fn compose(
    instances: &mut [(Instance, Instance)],
    range: Range<usize>,
    parents_world_transform: &[Instance],
) -> Option<Vec<Instance>> {
    if parents_world_transform.len() > instances.len() {
        warn!(
            "You tried to transform with len {}, but there are only {} instances to transform.",
            parents_world_transform.len(),
            instances.len()
        );
        return None;
    }
    let Some(slice) = instances.get_mut(range.clone()) else {
        warn!(
            "You tried to transform range {}..{}, which is out of bounds for parent len {}.",
            range.start,
            range.end,
            instances.len(),
        );
        return None;
    };
    Some(
        slice
            .iter_mut()
            .zip(parents_world_transform)
            .map(|((local, world), parent)| {
                *world = parent * &*local;
                world.clone()
            })
            .collect(),
    )
}

/// A node without geometry: a GLTF transform node or a grouping root.
pub struct ContainerNode {
    pub children: Vec<Box<dyn SceneNode>>,
    pub instances: Vec<(Instance, Instance)>,
    animations: Vec<ModelAnimation>,
}

impl ContainerNode {
    pub fn new(amount: usize, animations: Vec<ModelAnimation>) -> Self {
        let instances = (0..amount)
            .map(|_| (Instance::default(), Instance::default()))
            .collect();
        Self {
            instances,
            children: vec![],
            animations,
        }
    }
}

impl SceneNode for ContainerNode {
    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn set_local_transform(&mut self, idx: usize, instance: Instance) {
        if let Some((local, _)) = self.instances.get_mut(idx) {
            *local = instance;
        }
    }

    fn set_local_transform_all(&mut self, mutation: &mut dyn FnMut(&mut Instance)) {
        self.instances.iter_mut().for_each(|(local, _)| mutation(local));
    }

    fn instance_count(&self) -> usize {
        self.instances.len()
    }

    fn get_world_transforms(&self) -> Vec<Instance> {
        self.instances.iter().map(|(_, world)| world.clone()).collect()
    }

    fn update_world_transforms(&mut self, range: Range<usize>, parents_world_transform: &[Instance]) {
        let Some(world_transforms) = compose(&mut self.instances, range.clone(), parents_world_transform) else {
            return;
        };
        for child in self.children.iter_mut() {
            child.update_world_transforms(range.clone(), &world_transforms);
        }
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn get_local_transform(&self, idx: usize) -> Option<Instance> {
        self.instances.get(idx).map(|(local, _)| local).cloned()
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device));
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn add_instance(&mut self, instance: Instance) -> usize {
        self.instances.push((instance.clone(), instance));
        for child in &mut self.children {
            let template = child.get_local_transform(0).unwrap_or_default();
            child.add_instance(template);
        }
        self.instances.len()
    }

    fn get_animation(&self) -> &Vec<ModelAnimation> {
        &self.animations
    }

    fn set_shading(&mut self, shading: Shading) {
        self.children.iter_mut().for_each(|c| c.set_shading(shading));
    }

    fn bounds(&self) -> Aabb {
        self.children
            .iter()
            .fold(Aabb::empty(), |acc, child| acc.union(&child.bounds()))
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .collect()
    }
}

/// A node that owns geometry and an instance buffer with one entry per instance.
pub struct ModelNode {
    children: Vec<Box<dyn SceneNode>>,
    instance_buffer: wgpu::Buffer,
    instances: Vec<(Instance, Instance)>,
    animations: Vec<ModelAnimation>,
    buffer_size_needs_change: bool,
    model: model::Model,
    shading: Shading,
}

impl ModelNode {
    pub fn from_model(
        amount: usize,
        device: &wgpu::Device,
        model: model::Model,
        animations: Vec<ModelAnimation>,
    ) -> Self {
        let instances = (0..amount)
            .map(|_| (Instance::default(), Instance::default()))
            .collect::<Vec<_>>();

        let instance_buffer = mk_instance_buffer(device, &instances);

        Self {
            children: vec![],
            instance_buffer,
            instances,
            model,
            buffer_size_needs_change: false,
            animations,
            shading: Shading::Surface,
        }
    }

    pub fn with_shading(mut self, shading: Shading) -> Self {
        self.shading = shading;
        self
    }

    pub fn model(&self) -> &model::Model {
        &self.model
    }
}

fn mk_instance_buffer(device: &wgpu::Device, instances: &[(Instance, Instance)]) -> wgpu::Buffer {
    let raw: Vec<InstanceRaw> = instances.iter().map(|(_, world)| world.to_raw()).collect();
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Instance Buffer"),
        contents: bytemuck::cast_slice(&raw),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

impl SceneNode for ModelNode {
    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn set_local_transform(&mut self, idx: usize, instance: Instance) {
        if let Some((local, _)) = self.instances.get_mut(idx) {
            *local = instance;
        }
    }

    fn set_local_transform_all(&mut self, mutation: &mut dyn FnMut(&mut Instance)) {
        self.instances.iter_mut().for_each(|(local, _)| mutation(local));
    }

    fn instance_count(&self) -> usize {
        self.instances.len()
    }

    fn get_world_transforms(&self) -> Vec<Instance> {
        self.instances.iter().map(|(_, world)| world.clone()).collect()
    }

    fn update_world_transforms(&mut self, range: Range<usize>, parents_world_transform: &[Instance]) {
        let Some(world_transforms) = compose(&mut self.instances, range.clone(), parents_world_transform) else {
            return;
        };
        for child in self.children.iter_mut() {
            child.update_world_transforms(range.clone(), &world_transforms);
        }
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn get_local_transform(&self, idx: usize) -> Option<Instance> {
        self.instances.get(idx).map(|(local, _)| local).cloned()
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        if self.buffer_size_needs_change {
            self.instance_buffer = mk_instance_buffer(device, &self.instances);
            self.buffer_size_needs_change = false;
        } else {
            let raw_instances: Vec<InstanceRaw> = self
                .instances
                .iter()
                .map(|(_, world)| world.to_raw())
                .collect();
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&raw_instances));
        }
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device));
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn add_instance(&mut self, instance: Instance) -> usize {
        self.instances.push((instance.clone(), instance));
        for child in &mut self.children {
            let template = child.get_local_transform(0).unwrap_or_default();
            child.add_instance(template);
        }
        self.buffer_size_needs_change = true;
        self.instances.len()
    }

    fn get_animation(&self) -> &Vec<ModelAnimation> {
        &self.animations
    }

    fn set_shading(&mut self, shading: Shading) {
        self.shading = shading;
        self.children.iter_mut().for_each(|c| c.set_shading(shading));
    }

    fn bounds(&self) -> Aabb {
        let local = self.model.bounds();
        let own = self
            .instances
            .iter()
            .fold(Aabb::empty(), |acc, (_, world)| acc.union(&local.transformed(world)));
        self.children
            .iter()
            .fold(own, |acc, child| acc.union(&child.bounds()))
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .chain([Instanced {
                instance: &self.instance_buffer,
                model: &self.model,
                amount: self.instances.len(),
                shading: self.shading,
            }])
            .collect()
    }
}
