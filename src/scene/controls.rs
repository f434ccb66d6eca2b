use instant::Duration;
use winit::event::{DeviceEvent, ElementState, MouseButton, WindowEvent};

#[cfg(feature = "integration-tests")]
use crate::flow::ImageTestResult;
use crate::{
    context::{Context, InitContext},
    flow::{GraphicsFlow, Out},
    render::Render,
    scene::{SceneEvent, Stage, State},
    ui::{
        GuiBatch, QuadList,
        joystick::{Anchor, Joystick, JoystickMode},
        slider::{Slider, default_sliders},
    },
};

const MAX_QUADS: usize = 64;
const JOYSTICK_RADIUS: f32 = 60.0;
const JOYSTICK_SPEED: f32 = 80.0;

/// Sliders for the motion parameters and, in the swarm stage, two camera joysticks.
pub struct ControlsFlow {
    sliders: Vec<Slider>,
    joysticks: Vec<Joystick>,
    /// Index of the slider being dragged.
    dragging: Option<usize>,
    quads: QuadList,
    batch: GuiBatch,
}

fn screen(ctx: &Context) -> [f32; 2] {
    [ctx.config.width as f32, ctx.config.height as f32]
}

fn capture() -> Out<State, SceneEvent> {
    Out::Configure(Box::new(|ctx| ctx.mouse.captured = true))
}

impl ControlsFlow {
    pub fn new(ctx: InitContext, stage: Stage) -> Self {
        let joysticks = if stage.has_swarm() {
            vec![
                Joystick::new(Anchor::BottomLeft, JoystickMode::Walk, JOYSTICK_RADIUS, JOYSTICK_SPEED),
                Joystick::new(Anchor::BottomRight, JoystickMode::Lift, JOYSTICK_RADIUS, JOYSTICK_SPEED),
            ]
        } else {
            Vec::new()
        };
        Self {
            sliders: default_sliders(stage.has_swarm()),
            joysticks,
            dragging: None,
            quads: QuadList::default(),
            batch: GuiBatch::new(&ctx.device, MAX_QUADS),
        }
    }

    fn press(&mut self, ctx: &Context, state: &mut State) -> Out<State, SceneEvent> {
        let cursor = ctx.mouse.coords;
        if let Some(idx) = self.sliders.iter().position(|s| s.hit(cursor)) {
            self.dragging = Some(idx);
            self.sliders[idx].drag_to(&mut state.params, cursor.x);
            return capture();
        }
        let size = screen(ctx);
        if self.joysticks.iter_mut().any(|j| j.grab(cursor, size)) {
            return capture();
        }
        Out::Empty
    }

    fn release(&mut self) {
        self.dragging = None;
        self.joysticks.iter_mut().for_each(Joystick::release);
    }
}

impl GraphicsFlow<State, SceneEvent> for ControlsFlow {
    fn on_init(&mut self, _: &mut Context, _: &mut State) -> Out<State, SceneEvent> {
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, state: &mut State, dt: Duration) -> Out<State, SceneEvent> {
        let size = screen(ctx);
        self.quads.clear();
        for slider in &self.sliders {
            slider.draw(&state.params, &mut self.quads, size);
        }
        for joystick in &self.joysticks {
            joystick.draw(&mut self.quads, size);
        }
        self.batch.upload(&ctx.queue, &self.quads);

        let dt = dt.as_secs_f32();
        let delta = self
            .joysticks
            .iter()
            .map(|j| j.camera_delta(&ctx.camera.camera, dt))
            .fold(cgmath::Vector3::new(0.0, 0.0, 0.0), |acc, d| acc + d);
        if delta == cgmath::Vector3::new(0.0, 0.0, 0.0) {
            return Out::Empty;
        }
        Out::Configure(Box::new(move |ctx| ctx.camera.camera.translate(delta)))
    }

    fn on_tick(&mut self, _: &Context, _: &mut State) -> Out<State, SceneEvent> {
        Out::Empty
    }

    fn on_device_events(&mut self, _: &Context, _: &mut State, _: &DeviceEvent) -> Out<State, SceneEvent> {
        Out::Empty
    }

    fn on_window_events(&mut self, ctx: &Context, state: &mut State, event: &WindowEvent) -> Out<State, SceneEvent> {
        match event {
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.press(ctx, state),
            WindowEvent::MouseInput {
                state: ElementState::Released,
                ..
            } => {
                self.release();
                Out::Empty
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(slider) = self.dragging.and_then(|idx| self.sliders.get(idx)) {
                    slider.drag_to(&mut state.params, position.x);
                }
                let size = screen(ctx);
                self.joysticks.iter_mut().for_each(|j| j.drag(*position, size));
                Out::Empty
            }
            _ => Out::Empty,
        }
    }

    fn on_custom_events(&mut self, _: &Context, _: &mut State, event: SceneEvent) -> Option<SceneEvent> {
        match event {}
    }

    fn on_render<'pass>(&self) -> Render<'_, 'pass> {
        self.batch.render()
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
