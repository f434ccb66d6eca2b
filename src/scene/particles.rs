use cgmath::{Quaternion, Rotation, Rotation3};
use instant::Duration;
use rand::{SeedableRng, rngs::StdRng};
use winit::event::{DeviceEvent, WindowEvent};

#[cfg(feature = "integration-tests")]
use crate::flow::ImageTestResult;
use crate::{
    config::SceneConfig,
    context::{Context, InitContext},
    data_structures::{
        instance::Instance,
        model::{Material, Mesh, Model},
        primitives::octahedron,
        scene_graph::{ModelNode, SceneNode},
        texture::Texture,
    },
    flow::{GraphicsFlow, Out},
    motion::particles::ParticleField,
    render::Render,
    scene::{SceneEvent, State},
};

const PARTICLE_COLOUR: [f32; 4] = [0.8, 0.9, 1.0, 1.0];

/// The drifting particle field, drawn as one instanced batch.
pub struct ParticleFlow {
    field: ParticleField,
    node: ModelNode,
    rng: StdRng,
}

impl ParticleFlow {
    pub fn new(ctx: InitContext, config: SceneConfig) -> Self {
        let mut rng = StdRng::from_entropy();
        let field = ParticleField::scatter(config.particle_count, config.motion.particles.half_extent, &mut rng);

        let geometry = octahedron(config.particle_size);
        let material = Material::new(
            &ctx.device,
            "particle",
            Texture::create_solid(&ctx.device, &ctx.queue, [255; 4], "particle white"),
            PARTICLE_COLOUR,
            true,
            &ctx.material_layout,
        );
        let model = Model {
            meshes: vec![Mesh::new(&ctx.device, "particle", &geometry.vertices, &geometry.indices, 0)],
            materials: vec![material],
        };
        let node = ModelNode::from_model(config.particle_count, &ctx.device, model, Vec::new());
        Self { field, node, rng }
    }
}

impl GraphicsFlow<State, SceneEvent> for ParticleFlow {
    fn on_init(&mut self, _: &mut Context, _: &mut State) -> Out<State, SceneEvent> {
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, state: &mut State, dt: Duration) -> Out<State, SceneEvent> {
        self.field
            .perturb(&state.params.particles, dt.as_secs_f32(), &mut self.rng);
        let turn = Quaternion::from_angle_y(self.field.rotation);
        for (idx, position) in self.field.positions.iter().enumerate() {
            self.node.set_local_transform(
                idx,
                Instance {
                    position: turn.rotate_vector(*position),
                    rotation: turn,
                    ..Instance::new()
                },
            );
        }
        self.node.update_world_transform_all();
        self.node.write_to_buffers(&ctx.queue, &ctx.device);
        Out::Empty
    }

    fn on_tick(&mut self, _: &Context, _: &mut State) -> Out<State, SceneEvent> {
        Out::Empty
    }

    fn on_device_events(&mut self, _: &Context, _: &mut State, _: &DeviceEvent) -> Out<State, SceneEvent> {
        Out::Empty
    }

    fn on_window_events(&mut self, _: &Context, _: &mut State, _: &WindowEvent) -> Out<State, SceneEvent> {
        Out::Empty
    }

    fn on_custom_events(&mut self, _: &Context, _: &mut State, event: SceneEvent) -> Option<SceneEvent> {
        match event {}
    }

    fn on_render<'pass>(&self) -> Render<'_, 'pass> {
        if self.field.positions.is_empty() {
            return Render::None;
        }
        Render::Defaults(self.node.get_render())
    }

    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &self,
        _: &Context,
        _: &mut State,
        _: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error> {
        Ok(ImageTestResult::Passed)
    }
}
