use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
    },
    pipelines::basic::{depth_state, mk_render_pipeline, shader_with_common},
};

/// Lines over the unique triangle edges of a mesh, coloured by the instance tint.
pub fn mk_wireframe_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    light_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Wireframe Pipeline Layout"),
        bind_group_layouts: &[camera_bind_group_layout, light_bind_group_layout],
        push_constant_ranges: &[],
    });
    let shader = shader_with_common("Wireframe Shader", include_str!("shaders/wireframe.wgsl"));
    mk_render_pipeline(
        device,
        "Wireframe Pipeline",
        &layout,
        config.format,
        Some(wgpu::BlendState::ALPHA_BLENDING),
        Some(depth_state(true, wgpu::CompareFunction::LessEqual)),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        wgpu::PrimitiveTopology::LineList,
        shader,
    )
}
