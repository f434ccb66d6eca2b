//! The equirectangular environment map shared by the background and chrome pipelines.

use crate::data_structures::texture::Texture;

/// Sky tint shown until the HDRI has loaded.
const PLACEHOLDER_TEXEL: [f32; 4] = [0.35, 0.4, 0.45, 1.0];

#[derive(Debug)]
pub struct EnvironmentResources {
    pub texture: Texture,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
    /// False until a real panorama replaced the placeholder.
    pub loaded: bool,
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    // 32 bit float textures are not filterable on WebGL2
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                count: None,
            },
        ],
        label: Some("environment_bind_group_layout"),
    })
}

fn mk_bind_group(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, texture: &Texture) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(texture.sampler()),
            },
        ],
        label: Some("environment_bind_group"),
    })
}

impl EnvironmentResources {
    pub fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue) -> anyhow::Result<Self> {
        let texture = Texture::from_hdr_texels(device, queue, &PLACEHOLDER_TEXEL, 1, 1, "environment placeholder")?;
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &texture);
        Ok(Self {
            texture,
            bind_group,
            bind_group_layout,
            loaded: false,
        })
    }

    /// Swaps in a new panorama. Background and reflections pick it up on the next frame.
    pub fn replace(&mut self, device: &wgpu::Device, texture: Texture) {
        self.bind_group = mk_bind_group(device, &self.bind_group_layout, &texture);
        self.texture = texture;
        self.loaded = true;
    }
}
