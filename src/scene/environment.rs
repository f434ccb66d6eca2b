use instant::Duration;
use winit::event::{DeviceEvent, WindowEvent};

#[cfg(feature = "integration-tests")]
use crate::flow::ImageTestResult;
use crate::{
    config::SceneConfig,
    context::{Context, InitContext},
    data_structures::texture::Texture,
    flow::{GraphicsFlow, Out},
    render::Render,
    resources::loader::{AssetLoader, log_error, log_progress},
    scene::{SceneEvent, State},
};

/// HDRI background and reflections, exposure and fog.
pub struct EnvironmentFlow {
    texture: Option<Texture>,
    config: SceneConfig,
}

impl EnvironmentFlow {
    pub async fn new(ctx: InitContext, config: SceneConfig) -> Self {
        let loader = AssetLoader::new(ctx);
        let file = config.assets.hdri.clone();
        let texture = loader
            .load_hdri(&file, |texture| texture, log_progress(&file), log_error(&file))
            .await;
        Self { texture, config }
    }
}

impl GraphicsFlow<State, SceneEvent> for EnvironmentFlow {
    fn on_init(&mut self, ctx: &mut Context, state: &mut State) -> Out<State, SceneEvent> {
        state.params = self.config.motion.clone();

        let [r, g, b] = self.config.fog_colour;
        ctx.light.uniform = ctx.light.uniform.with_fog(self.config.fog_colour, self.config.fog_density);
        ctx.light.uniform.exposure = self.config.exposure;
        ctx.clear_colour = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        };
        if let Some(texture) = self.texture.take() {
            ctx.environment.replace(&ctx.device, texture);
        }
        Out::Empty
    }

    fn on_update(&mut self, _: &Context, _: &mut State, _: Duration) -> Out<State, SceneEvent> {
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
        // the background is drawn by the engine from `ctx.environment`
        Render::None
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
