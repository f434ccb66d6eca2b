use instant::Duration;
use winit::event::{DeviceEvent, WindowEvent};

#[cfg(feature = "integration-tests")]
use crate::flow::ImageTestResult;
use crate::{
    context::Context,
    flow::{GraphicsFlow, Out},
    render::Render,
    scene::{SceneEvent, State},
};

/// Frame counter logging the frame rate once per tick.
#[derive(Debug, Default)]
pub struct StatsFlow {
    frames: u32,
    elapsed: Duration,
}

impl StatsFlow {
    /// Frames per second since the last call, resetting the counters.
    pub fn take_fps(&mut self) -> Option<f32> {
        let secs = self.elapsed.as_secs_f32();
        let fps = (secs > 0.0).then(|| self.frames as f32 / secs);
        self.frames = 0;
        self.elapsed = Duration::ZERO;
        fps
    }
}

impl GraphicsFlow<State, SceneEvent> for StatsFlow {
    fn on_init(&mut self, _: &mut Context, _: &mut State) -> Out<State, SceneEvent> {
        Out::Empty
    }

    fn on_update(&mut self, _: &Context, _: &mut State, dt: Duration) -> Out<State, SceneEvent> {
        self.frames += 1;
        self.elapsed += dt;
        Out::Empty
    }

    fn on_tick(&mut self, _: &Context, _: &mut State) -> Out<State, SceneEvent> {
        if let Some(fps) = self.take_fps() {
            log::info!("{fps:.1} fps");
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_over_elapsed_time() {
        let mut stats = StatsFlow {
            frames: 30,
            elapsed: Duration::from_millis(500),
        };
        assert_eq!(stats.take_fps(), Some(60.0));
        assert_eq!(stats.take_fps(), None);
    }
}
