//! Render composition and pipeline batching.
//!
//! This module defines the [`Render`] enum, which flows return from `on_render`
//! to describe what they want drawn. The engine sorts the contents into batches
//! per pipeline (surface, wireframe, chrome, GUI) so each pipeline is bound once
//! per frame, and runs custom closures in between.
//!
//! # Key types
//!
//! - [`Render<'a, 'pass>`] is the primary enum describing render operations
//! - [`Instanced<'a>`] contains data for instanced rendering (model + instance buffer)
//! - [`Flat<'a>`] contains data for flat (2D / GUI) rendering (vertex + index buffers)
//! - [`Shading`] selects the 3D pipeline an instanced model is drawn with
//!

use wgpu::RenderPass;

use crate::{context::Context, data_structures::{model::Model, scene_graph::SceneNode}};

/// How an instanced model is shaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Shading {
    /// Textured, lit (or unlit, per material) surface with fog.
    #[default]
    Surface,
    /// Unique triangle edges drawn as lines in the instance tint.
    Wireframe,
    /// Mirror-like surface reflecting the environment map.
    Reflective,
}

/// Data for instanced object rendering: a model and its instance buffer.
///
/// The instance buffer contains per-instance transformation and tint data.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
    pub shading: Shading,
}

/// Data for flat (2D / GUI) rendering: coloured vertices in normalised device coordinates.
pub struct Flat<'a> {
    pub vertex: &'a wgpu::Buffer,
    pub index: &'a wgpu::Buffer,
    pub amount: usize,
}

/// Specifies how a flow's objects should be rendered.
///
/// # Variants
///
/// - `None` renders nothing
/// - `Default(Instanced)` renders a single instanced object with its own shading
/// - `Defaults(Vec<Instanced>)` renders a batch of instanced objects
/// - `GUI(Flat)` renders 2D elements on top of the scene
/// - `Composed(Vec<Render>)` recursively renders composition of multiple renders
/// - `Custom(...)` invokes a user-defined closure for custom rendering
///
pub enum Render<'a, 'pass>
where
    'pass: 'a,
{
    None,
    Default(Instanced<'a>),
    Defaults(Vec<Instanced<'a>>),
    GUI(Flat<'a>),
    Composed(Vec<Render<'a, 'pass>>),
    Custom(Box<dyn 'a + FnOnce(&Context, &mut wgpu::RenderPass<'pass>)>),
}

/// Per-pipeline batches collected from all flows in one frame.
#[derive(Default)]
pub(crate) struct Batches<'a> {
    pub surfaces: Vec<Instanced<'a>>,
    pub wireframes: Vec<Instanced<'a>>,
    pub chromes: Vec<Instanced<'a>>,
    pub guis: Vec<Flat<'a>>,
}

impl<'a> Batches<'a> {
    fn push(&mut self, instanced: Instanced<'a>) {
        match instanced.shading {
            Shading::Surface => self.surfaces.push(instanced),
            Shading::Wireframe => self.wireframes.push(instanced),
            Shading::Reflective => self.chromes.push(instanced),
        }
    }
}

impl<'a, 'pass> Render<'a, 'pass> {
    pub(crate) fn set_pipelines(
        self,
        ctx: &Context,
        render_pass: &mut RenderPass<'pass>,
        batches: &mut Batches<'a>,
    ) {
        match self {
            Render::Default(instanced) => batches.push(instanced),
            Render::Defaults(vec) => vec.into_iter().for_each(|instanced| batches.push(instanced)),
            Render::GUI(flat) => batches.guis.push(flat),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(ctx, render_pass, batches)),
            Render::Custom(f) => f(ctx, render_pass),
            Render::None => (),
        }
    }
}

impl<'a, 'pass> From<&'a dyn SceneNode> for Render<'a, 'pass> {
    fn from(sn: &'a dyn SceneNode) -> Self {
        Render::Defaults(sn.get_render())
    }
}

impl<'a, 'pass> From<&'a Box<dyn SceneNode>> for Render<'a, 'pass> {
    fn from(sn: &'a Box<dyn SceneNode>) -> Self {
        Render::Defaults(sn.get_render())
    }
}
