#![allow(dead_code)]

#[cfg(feature = "integration-tests")]
use vr_aquarium::{
    context::Context,
    data_structures::scene_graph::SceneNode,
    flow::{GraphicsFlow, ImageTestResult, Out},
    render::Render,
};

#[derive(Default)]
pub(crate) struct FrameCounter(pub(crate) u32);
impl FrameCounter {
    pub(crate) fn frame(&self) -> u32 {
        self.0
    }

    pub(crate) fn progress(&mut self) {
        self.0 += 1;
    }
}

#[cfg(feature = "integration-tests")]
pub(crate) type Setup = Box<dyn Fn(&mut Context, &mut FrameCounter)>;
#[cfg(feature = "integration-tests")]
pub(crate) type Validate = Box<
    dyn Fn(
        &Context,
        &mut FrameCounter,
        &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error>,
>;

/// Draws an optional scene node and checks the rendered frame.
#[cfg(feature = "integration-tests")]
pub(crate) struct TestRender {
    pub(crate) node: Option<Box<dyn SceneNode>>,
    pub(crate) setup: Setup,
    pub(crate) validate: Validate,
}

#[cfg(feature = "integration-tests")]
impl TestRender {
    pub(crate) fn new(node: Option<Box<dyn SceneNode>>, setup: Setup, validate: Validate) -> Self {
        Self { node, setup, validate }
    }
}

#[cfg(feature = "integration-tests")]
impl GraphicsFlow<FrameCounter, ()> for TestRender {
    fn on_init(&mut self, ctx: &mut Context, s: &mut FrameCounter) -> Out<FrameCounter, ()> {
        (self.setup)(ctx, s);
        if let Some(node) = &mut self.node {
            node.update_world_transform_all();
            node.write_to_buffers(&ctx.queue, &ctx.device);
        }
        Out::Empty
    }

    fn on_update(&mut self, _: &Context, state: &mut FrameCounter, _: instant::Duration) -> Out<FrameCounter, ()> {
        state.progress();
        Out::Empty
    }

    fn on_tick(&mut self, _: &Context, _: &mut FrameCounter) -> Out<FrameCounter, ()> {
        Out::Empty
    }

    fn on_device_events(
        &mut self,
        _: &Context,
        _: &mut FrameCounter,
        _: &winit::event::DeviceEvent,
    ) -> Out<FrameCounter, ()> {
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        _: &Context,
        _: &mut FrameCounter,
        _: &winit::event::WindowEvent,
    ) -> Out<FrameCounter, ()> {
        Out::Empty
    }

    fn on_custom_events(&mut self, _: &Context, _: &mut FrameCounter, event: ()) -> Option<()> {
        Some(event)
    }

    fn on_render<'pass>(&self) -> Render<'_, 'pass> {
        match &self.node {
            Some(node) => node.into(),
            None => Render::None,
        }
    }

    fn render_to_texture(
        &self,
        ctx: &Context,
        s: &mut FrameCounter,
        texture: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error> {
        (self.validate)(ctx, s, texture)
    }
}

/// Runs a single [`TestRender`] built by `$make: FnOnce(InitContext) -> impl Future<Output = TestRender>`
/// until its validation passes.
#[macro_export]
macro_rules! golden_image_test {
    ($make:expr) => {{
        use vr_aquarium::flow::{FlowConsturctor, GraphicsFlow};
        use $crate::common::test_utils::FrameCounter;
        let model_constructor: FlowConsturctor<FrameCounter, ()> = Box::new(|ctx| {
            Box::pin(async move {
                let g_flow: Box<dyn GraphicsFlow<FrameCounter, ()>> = Box::new(($make)(ctx).await);
                g_flow
            })
        });

        vr_aquarium::flow::run(vec![model_constructor]).expect("Failed to run flow for integration test.");
    }};
}
