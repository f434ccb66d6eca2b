//! Scene light, fog and exposure, shared by every 3D pipeline as one uniform.

use wgpu::util::DeviceExt;

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
    pub colour: [f32; 3],
    pub ambient: f32,
    pub fog_colour: [f32; 3],
    /// Exponential-squared fog; 0 disables it.
    pub fog_density: f32,
    /// Tone mapping exposure applied before the ACES curve.
    pub exposure: f32,
    _padding2: [f32; 3],
}

impl LightUniform {
    pub fn new(position: [f32; 3], colour: [f32; 3]) -> Self {
        Self {
            position,
            _padding: 0,
            colour,
            ambient: 0.3,
            fog_colour: [0.0; 3],
            fog_density: 0.0,
            exposure: 0.6,
            _padding2: [0.0; 3],
        }
    }

    pub fn with_fog(mut self, colour: [f32; 3], density: f32) -> Self {
        self.fog_colour = colour;
        self.fog_density = density.max(0.0);
        self
    }
}

impl Default for LightUniform {
    fn default() -> Self {
        Self::new([8.0, 80.0, 50.0], [1.0, 1.0, 1.0])
    }
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

impl LightResources {
    pub fn new(uniform: LightUniform, device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("light_bind_group"),
        });
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[cfg(test)]
mod tests {
    use super::LightUniform;

    #[test]
    fn uniform_matches_wgsl_layout() {
        // vec3 + f32 rows, rounded up to a 16 byte multiple
        assert_eq!(std::mem::size_of::<LightUniform>(), 64);
    }
}
