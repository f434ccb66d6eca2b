#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_draw_sphere_in_the_centre() {
    use vr_aquarium::{
        camera::Camera,
        context::{Context, InitContext},
        data_structures::{
            model::{Material, Mesh, Model},
            primitives,
            scene_graph::{ModelNode, SceneNode},
            texture::Texture,
        },
        flow::ImageTestResult,
    };
    use wgpu::Color;

    use crate::common::test_utils::{FrameCounter, TestRender};

    type Frame = image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>;

    golden_image_test!(async move |ctx: InitContext| {
        let geometry = primitives::uv_sphere(1.0, 24, 16);
        let material = Material::new(
            &ctx.device,
            "white",
            Texture::create_solid(&ctx.device, &ctx.queue, [255; 4], "white"),
            [1.0; 4],
            true,
            &ctx.material_layout,
        );
        let model = Model {
            meshes: vec![Mesh::new(&ctx.device, "sphere", &geometry.vertices, &geometry.indices, 0)],
            materials: vec![material],
        };
        let node: Box<dyn SceneNode> = Box::new(ModelNode::from_model(1, &ctx.device, model, Vec::new()));
        TestRender::new(
            Some(node),
            Box::new(|ctx: &mut Context, _: &mut FrameCounter| {
                ctx.clear_colour = Color::BLACK;
                ctx.camera.camera = Camera::look_at([0.0, 0.0, 5.0].into(), [0.0; 3].into());
            }),
            Box::new(|_: &Context, state: &mut FrameCounter, texture: &mut Frame| -> anyhow::Result<ImageTestResult> {
                if state.frame() < 2 {
                    return Ok(ImageTestResult::Waiting);
                }
                let (width, height) = texture.dimensions();
                let background = image::Rgba([0, 0, 0, 255]);
                assert_eq!(*texture.get_pixel(0, 0), background, "corner should show the clear colour");
                assert_ne!(
                    *texture.get_pixel(width / 2, height / 2),
                    background,
                    "the sphere should cover the centre"
                );
                Ok(ImageTestResult::Passed)
            }),
        )
    });
}
