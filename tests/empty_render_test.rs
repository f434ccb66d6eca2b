#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_clear_colour() {
    use vr_aquarium::{
        camera::Camera,
        context::{Context, InitContext},
        flow::ImageTestResult,
    };
    use wgpu::Color;

    use crate::common::test_utils::{FrameCounter, TestRender};

    type Frame = image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>;

    golden_image_test!(async move |_: InitContext| {
        TestRender::new(
            None,
            Box::new(|ctx: &mut Context, _: &mut FrameCounter| {
                ctx.clear_colour = Color::WHITE;
                ctx.camera.camera = Camera::look_at([0.0, 5.0, 2.0].into(), [0.0; 3].into());
            }),
            Box::new(|_: &Context, state: &mut FrameCounter, texture: &mut Frame| -> anyhow::Result<ImageTestResult> {
                if state.frame() == 0 {
                    return Ok(ImageTestResult::Waiting);
                }
                let colour = Color::WHITE;
                let f_to_u8 = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
                let desired_pixel = image::Rgba([
                    f_to_u8(colour.r),
                    f_to_u8(colour.g),
                    f_to_u8(colour.b),
                    f_to_u8(colour.a),
                ]);
                for pixel in texture.pixels() {
                    assert_eq!(*pixel, desired_pixel);
                }
                Ok(ImageTestResult::Passed)
            }),
        )
    });
}
