use cgmath::{Quaternion, Rotation3};
use instant::Duration;
use winit::event::{DeviceEvent, WindowEvent};

#[cfg(feature = "integration-tests")]
use crate::flow::ImageTestResult;
use crate::{
    config::SceneConfig,
    context::{Context, InitContext},
    data_structures::{
        instance::Instance,
        scene_graph::{ContainerNode, SceneNode},
    },
    flow::{GraphicsFlow, Out},
    motion::orbit::orbit_pose,
    render::Render,
    resources::{
        animation::AnimationPlayer,
        loader::{AssetLoader, log_error, log_progress},
    },
    scene::{SceneEvent, State, replicate},
};

struct Sharks {
    /// One root instance per shark, each drawing the whole GLTF subtree.
    root: ContainerNode,
    player: AnimationPlayer,
}

/// Two animated sharks on opposite sides of the same double-circular orbit.
pub struct SharkFlow {
    sharks: Option<Sharks>,
    phases: [f32; 2],
    scale: f32,
    elapsed: f32,
}

impl SharkFlow {
    pub async fn new(ctx: InitContext, config: SceneConfig) -> Self {
        let loader = AssetLoader::new(ctx);
        let file = config.assets.shark.clone();
        let count = config.shark_phases.len();
        let sharks = loader
            .load_gltf(
                &file,
                |node| {
                    let root = replicate(node, count);
                    let player = AnimationPlayer::for_node(&root);
                    Sharks { root, player }
                },
                log_progress(&file),
                log_error(&file),
            )
            .await;
        Self {
            sharks,
            phases: config.shark_phases,
            scale: config.shark_scale,
            elapsed: 0.0,
        }
    }
}

impl GraphicsFlow<State, SceneEvent> for SharkFlow {
    fn on_init(&mut self, _: &mut Context, _: &mut State) -> Out<State, SceneEvent> {
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, state: &mut State, dt: Duration) -> Out<State, SceneEvent> {
        let Some(sharks) = &mut self.sharks else {
            return Out::Empty;
        };
        let dt = dt.as_secs_f32();
        self.elapsed += dt;

        for (idx, phase) in self.phases.iter().enumerate() {
            let pose = orbit_pose(&state.params.orbit, *phase, self.elapsed);
            sharks.root.set_local_transform(
                idx,
                Instance {
                    position: pose.position,
                    rotation: Quaternion::from_angle_y(pose.yaw()),
                    ..Instance::new().with_uniform_scale(self.scale)
                },
            );
        }
        sharks.player.update(&mut sharks.root, dt);
        sharks.root.update_world_transform_all();
        sharks.root.write_to_buffers(&ctx.queue, &ctx.device);
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
        match &self.sharks {
            Some(sharks) => Render::Defaults(sharks.root.get_render()),
            None => Render::None,
        }
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
