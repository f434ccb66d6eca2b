use crate::pipelines::basic::{depth_state, mk_render_pipeline, shader_with_common};

/// Fullscreen triangle drawn first; it never writes depth so the scene covers it.
pub fn mk_background_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    light_bind_group_layout: &wgpu::BindGroupLayout,
    environment_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Background Pipeline Layout"),
        bind_group_layouts: &[
            camera_bind_group_layout,
            light_bind_group_layout,
            environment_bind_group_layout,
        ],
        push_constant_ranges: &[],
    });
    let shader = shader_with_common("Background Shader", include_str!("shaders/background.wgsl"));
    mk_render_pipeline(
        device,
        "Background Pipeline",
        &layout,
        config.format,
        Some(wgpu::BlendState::REPLACE),
        Some(depth_state(false, wgpu::CompareFunction::Always)),
        &[],
        wgpu::PrimitiveTopology::TriangleList,
        shader,
    )
}
