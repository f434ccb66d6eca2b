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
        primitives,
        scene_graph::{ModelNode, SceneNode},
        texture::Texture,
    },
    flow::{GraphicsFlow, Out},
    motion::flocking::{Swarm, avoid_between},
    render::Render,
    resources::loader::{AssetLoader, log_progress},
    scene::{SceneEvent, State, replicate},
};

const INITIAL_SPEED: f32 = 4.0;
// Long frames (a dragged window, a slow load) would otherwise fling the fish apart.
const MAX_STEP: f32 = 0.1;

/// Two flocking swarms sharing one fish mesh, avoiding each other.
pub struct SwarmFlow {
    swarms: [Swarm; 2],
    tints: [[f32; 4]; 2],
    fish_scale: f32,
    /// Instances `0..n` belong to the first swarm, `n..2n` to the second.
    root: Box<dyn SceneNode>,
}

fn generated_fish(ctx: &InitContext, length: f32, count: usize) -> ModelNode {
    let geometry = primitives::fish(length);
    let material = Material::new(
        &ctx.device,
        "fish",
        Texture::create_solid(&ctx.device, &ctx.queue, [255; 4], "fish white"),
        [1.0; 4],
        false,
        &ctx.material_layout,
    );
    let model = Model {
        meshes: vec![Mesh::new(&ctx.device, "fish", &geometry.vertices, &geometry.indices, 0)],
        materials: vec![material],
    };
    ModelNode::from_model(count, &ctx.device, model, Vec::new())
}

impl SwarmFlow {
    pub async fn new(ctx: InitContext, config: SceneConfig) -> Self {
        let count = config.fish_per_swarm;
        let mut rng = StdRng::from_entropy();
        let swarms = config
            .swarm_homes
            .map(|home| Swarm::scatter(count, home, config.swarm_spread, INITIAL_SPEED, &mut rng));

        let loader = AssetLoader::new(ctx);
        let file = config.assets.fish.clone();
        let loaded = loader
            .load_gltf(&file, |node| node, log_progress(&file), |e| {
                log::info!("No fish model ({e:#}), using the generated mesh")
            })
            .await;

        let (root, fish_scale): (Box<dyn SceneNode>, f32) = match loaded {
            Some(node) => {
                let size = node.bounds().size();
                let scale = if size > 0.0 { config.fish_length / size } else { 1.0 };
                (Box::new(replicate(node, 2 * count)), scale)
            }
            None => (
                Box::new(generated_fish(loader.context(), config.fish_length, 2 * count)),
                1.0,
            ),
        };

        Self {
            swarms,
            tints: config.swarm_tints,
            fish_scale,
            root,
        }
    }
}

impl GraphicsFlow<State, SceneEvent> for SwarmFlow {
    fn on_init(&mut self, _: &mut Context, _: &mut State) -> Out<State, SceneEvent> {
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, state: &mut State, dt: Duration) -> Out<State, SceneEvent> {
        let dt = dt.as_secs_f32().min(MAX_STEP);
        let params = &state.params.flocking;
        let [a, b] = &mut self.swarms;
        a.update(params, dt);
        b.update(params, dt);
        avoid_between(a, b, params, dt);

        let mut idx = 0;
        for (swarm, tint) in self.swarms.iter().zip(self.tints) {
            for fish in &swarm.fish {
                let mut instance = Instance::new()
                    .with_uniform_scale(self.fish_scale)
                    .with_tint(tint);
                instance.position = fish.position;
                instance.face(fish.velocity);
                self.root.set_local_transform(idx, instance);
                idx += 1;
            }
        }
        self.root.update_world_transform_all();
        self.root.write_to_buffers(&ctx.queue, &ctx.device);
        Out::Empty
    }

    fn on_tick(&mut self, _: &Context, _: &mut State) -> Out<State, SceneEvent> {
        if let (Some(a), Some(b)) = (self.swarms[0].centroid(), self.swarms[1].centroid()) {
            log::debug!("Swarm centres at {a:?} and {b:?}");
        }
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
        if self.swarms.iter().all(Swarm::is_empty) {
            return Render::None;
        }
        (&self.root).into()
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
