//! Render pipelines and their WGSL shaders.
//!
//! - `basic` the lit/unlit surface pipeline and the shared pipeline builder
//! - `wireframe` line-list rendering of mesh edges
//! - `chrome` environment-reflecting surfaces
//! - `background` the equirectangular sky behind everything
//! - `gui` flat coloured quads for sliders and joysticks
//! - `light` and `environment` hold the uniforms/textures those pipelines share

pub mod background;
pub mod basic;
pub mod chrome;
pub mod environment;
pub mod gui;
pub mod light;
pub mod wireframe;

#[derive(Debug)]
pub struct Pipelines {
    pub surface: wgpu::RenderPipeline,
    pub wireframe: wgpu::RenderPipeline,
    pub chrome: wgpu::RenderPipeline,
    pub background: wgpu::RenderPipeline,
    pub gui: wgpu::RenderPipeline,
}

/// Bind group layouts every 3D pipeline is built against.
pub struct Layouts<'a> {
    pub material: &'a wgpu::BindGroupLayout,
    pub camera: &'a wgpu::BindGroupLayout,
    pub light: &'a wgpu::BindGroupLayout,
    pub environment: &'a wgpu::BindGroupLayout,
}

impl Pipelines {
    pub fn new(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration, layouts: Layouts) -> Self {
        Self {
            surface: basic::mk_surface_pipeline(device, config, layouts.material, layouts.camera, layouts.light),
            wireframe: wireframe::mk_wireframe_pipeline(device, config, layouts.camera, layouts.light),
            chrome: chrome::mk_chrome_pipeline(
                device,
                config,
                layouts.material,
                layouts.camera,
                layouts.light,
                layouts.environment,
            ),
            background: background::mk_background_pipeline(
                device,
                config,
                layouts.camera,
                layouts.light,
                layouts.environment,
            ),
            gui: gui::mk_gui_pipeline(device, config),
        }
    }
}
