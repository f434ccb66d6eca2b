#[cfg(feature = "integration-tests")]
use cgmath::Point3;
#[cfg(feature = "integration-tests")]
use vr_aquarium::{
    context::Context,
    flow::{FlowConsturctor, GraphicsFlow, ImageTestResult, Out},
    motion::MotionParams,
    render::Render,
    scene::{SceneEvent, State},
};
#[cfg(feature = "integration-tests")]
use winit::event::{DeviceEvent, WindowEvent};

/// Blocking work done while the flows initialise.
#[cfg(feature = "integration-tests")]
const LOAD_DELAY: std::time::Duration = std::time::Duration::from_millis(500);

#[cfg(feature = "integration-tests")]
fn seeded_params() -> MotionParams {
    let mut params = MotionParams::default();
    params.flocking.max_speed = 3.5;
    params.particles.step = 0.25;
    params
}

/// Seeds the shared parameters and grabs the pointer, like the environment and
/// controls flows do.
#[cfg(feature = "integration-tests")]
struct Seeder;

#[cfg(feature = "integration-tests")]
impl GraphicsFlow<State, SceneEvent> for Seeder {
    fn on_init(&mut self, _: &mut Context, state: &mut State) -> Out<State, SceneEvent> {
        assert_eq!(state.params, MotionParams::default());
        std::thread::sleep(LOAD_DELAY);
        state.params = seeded_params();
        Out::Configure(Box::new(|ctx| ctx.mouse.captured = true))
    }

    fn on_update(&mut self, _: &Context, _: &mut State, _: instant::Duration) -> Out<State, SceneEvent> {
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
        Render::None
    }

    fn render_to_texture(
        &self,
        _: &Context,
        _: &mut State,
        _: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error> {
        Ok(ImageTestResult::Passed)
    }
}

/// Reads what the seeder left behind and publishes a focal point through a
/// deferred state mutation.
#[cfg(feature = "integration-tests")]
#[derive(Default)]
struct Observer {
    updates: u32,
    init_saw_seed: bool,
}

#[cfg(feature = "integration-tests")]
impl GraphicsFlow<State, SceneEvent> for Observer {
    fn on_init(&mut self, ctx: &mut Context, state: &mut State) -> Out<State, SceneEvent> {
        self.init_saw_seed = state.params == seeded_params() && ctx.mouse.captured;
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, state: &mut State, dt: instant::Duration) -> Out<State, SceneEvent> {
        self.updates += 1;
        assert!(self.init_saw_seed, "later flows must see what earlier flows set up");
        assert_eq!(state.params, seeded_params());
        assert!(ctx.mouse.captured);

        match self.updates {
            1 => {
                assert!(dt < LOAD_DELAY, "first frame took {dt:?}");
                assert!(state.focal_point.is_none());
                let focus: Box<dyn FnOnce(&mut State)> = Box::new(|state: &mut State| {
                    state.focal_point = Some(Point3::new(0.0, 1.5, -2.0));
                });
                Out::FutFn(vec![Box::new(async move { focus })])
            }
            _ => {
                assert_eq!(state.focal_point, Some(Point3::new(0.0, 1.5, -2.0)));
                Out::Empty
            }
        }
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
        Render::None
    }

    fn render_to_texture(
        &self,
        _: &Context,
        state: &mut State,
        _: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error> {
        if self.updates > 3 && state.focal_point.is_some() {
            Ok(ImageTestResult::Passed)
        } else {
            Ok(ImageTestResult::Waiting)
        }
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn flows_share_state_seeded_at_init() {
    let seeder: FlowConsturctor<State, SceneEvent> =
        Box::new(|_| Box::pin(async move { Box::new(Seeder) as Box<dyn GraphicsFlow<_, _>> }));
    let observer: FlowConsturctor<State, SceneEvent> =
        Box::new(|_| Box::pin(async move { Box::new(Observer::default()) as Box<dyn GraphicsFlow<_, _>> }));

    if let Err(e) = vr_aquarium::flow::run(vec![seeder, observer]) {
        panic!("{e:#}");
    }
}
