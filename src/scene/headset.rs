use cgmath::{EuclideanSpace, Point3, Quaternion, Rad, Rotation, Rotation3};
use instant::Duration;
use winit::event::{DeviceEvent, WindowEvent};

#[cfg(feature = "integration-tests")]
use crate::flow::ImageTestResult;
use crate::{
    camera::Camera,
    config::SceneConfig,
    context::{Context, InitContext},
    data_structures::{
        bounds::Aabb,
        instance::Instance,
        model::{Material, Mesh, Model},
        primitives::uv_sphere,
        scene_graph::{ModelNode, SceneNode},
        texture::Texture,
    },
    flow::{GraphicsFlow, Out},
    motion::gate::SpinGate,
    render::{Render, Shading},
    resources::loader::{AssetLoader, log_error, log_progress},
    scene::{SceneEvent, State},
};

const WIRE_COLOUR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

struct Headset {
    node: Box<dyn SceneNode>,
    rest: Instance,
    bounds: Aabb,
    /// Two chrome spheres left and right of the headset.
    spheres: ModelNode,
}

/// The wireframe headset the camera frames, its chrome spheres and the cursor-gated spin.
pub struct HeadsetFlow {
    headset: Option<Headset>,
    gate: SpinGate,
}

fn chrome_spheres(ctx: &InitContext, config: &SceneConfig, centre: Point3<f32>) -> ModelNode {
    let geometry = uv_sphere(config.sphere_radius, config.sphere_segments, config.sphere_segments);
    let material = Material::new(
        &ctx.device,
        "chrome",
        Texture::create_solid(&ctx.device, &ctx.queue, [255; 4], "chrome white"),
        [1.0; 4],
        false,
        &ctx.material_layout,
    );
    let mesh = Mesh::new(&ctx.device, "sphere", &geometry.vertices, &geometry.indices, 0);
    let model = Model {
        meshes: vec![mesh],
        materials: vec![material],
    };
    let mut spheres = ModelNode::from_model(2, &ctx.device, model, Vec::new()).with_shading(Shading::Reflective);
    for (idx, side) in [1.0, -1.0].into_iter().enumerate() {
        let offset = cgmath::Vector3::new(side * config.sphere_offset, 0.0, 0.0);
        spheres.set_local_transform(idx, Instance::from(centre.to_vec() + offset));
    }
    spheres.update_world_transform_all();
    spheres
}

impl HeadsetFlow {
    pub async fn new(ctx: InitContext, config: SceneConfig) -> Self {
        let loader = AssetLoader::new(ctx);
        let file = config.assets.headset.clone();
        let headset = loader
            .load_gltf(
                &file,
                |mut node| {
                    node.set_shading(Shading::Wireframe);
                    node.set_local_transform_all(&mut |local| local.tint = WIRE_COLOUR);
                    node.update_world_transform_all();
                    let rest = node.get_local_transform(0).unwrap_or_default();
                    let bounds = node.bounds();
                    let spheres = chrome_spheres(loader.context(), &config, bounds.center());
                    Headset {
                        node,
                        rest,
                        bounds,
                        spheres,
                    }
                },
                log_progress(&file),
                log_error(&file),
            )
            .await;
        Self {
            headset,
            gate: SpinGate::new(),
        }
    }
}

impl GraphicsFlow<State, SceneEvent> for HeadsetFlow {
    fn on_init(&mut self, ctx: &mut Context, state: &mut State) -> Out<State, SceneEvent> {
        let Some(headset) = &mut self.headset else {
            return Out::Empty;
        };
        if let Some(camera) = Camera::framing(&headset.bounds) {
            ctx.camera.camera = camera;
        }
        state.focal_point = Some(headset.bounds.center());
        headset.node.write_to_buffers(&ctx.queue, &ctx.device);
        headset.spheres.write_to_buffers(&ctx.queue, &ctx.device);
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, state: &mut State, dt: Duration) -> Out<State, SceneEvent> {
        let Some(headset) = &mut self.headset else {
            return Out::Empty;
        };
        let centre = headset.bounds.center();
        let focal_point = state.focal_point.unwrap_or(centre);
        self.gate.update(
            ctx.cursor_ray().as_ref(),
            focal_point,
            &state.params.gate,
            dt.as_secs_f32(),
        );

        // spin about the vertical axis through the centre of the model
        let spin = Quaternion::from_angle_y(Rad(self.gate.angle));
        let rest = &headset.rest;
        let position = centre.to_vec() + spin.rotate_vector(rest.position - centre.to_vec());
        headset.node.set_local_transform(
            0,
            Instance {
                position,
                rotation: spin * rest.rotation,
                ..rest.clone()
            },
        );
        headset.node.update_world_transform_all();
        headset.node.write_to_buffers(&ctx.queue, &ctx.device);
        Out::Empty
    }

    fn on_tick(&mut self, _: &Context, _: &mut State) -> Out<State, SceneEvent> {
        if !self.gate.spinning {
            log::debug!("Headset spin paused by the cursor");
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
        match &self.headset {
            Some(headset) => Render::Composed(vec![
                (&headset.node).into(),
                Render::Defaults(headset.spheres.get_render()),
            ]),
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
