//! GPU textures: sampled 2D textures bound per draw, and the depth buffer.

use asset::TextureData;
use wgpu::{
    BindGroup, BindGroupLayout, Device, Extent3d, Queue, RenderPass, Sampler, TextureDimension,
    TextureFormat, TextureUsages, TextureView,
};

use crate::shader::UniformLocation;

/// Depth buffer matching the surface size.
pub struct DepthTexture {
    pub view: TextureView,
}

impl DepthTexture {
    pub const FORMAT: TextureFormat = TextureFormat::Depth32Float;

    pub fn new(device: &Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("DepthTex"),
            size: Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: Self::FORMAT,
            usage: TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Self {
            view: texture.create_view(&Default::default()),
        }
    }
}

/// Layout for a texture + sampler pair at the given binding slots.
pub fn sampled_texture_layout(
    device: &Device,
    label: &str,
    texture: UniformLocation,
    sampler: UniformLocation,
) -> BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: texture.binding,
                visibility: texture.stages,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: sampler.binding,
                visibility: sampler.stages,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// A 2D texture uploaded to the GPU together with its sampler and bind group.
pub struct GpuTexture {
    texture: wgpu::Texture,
    #[allow(dead_code)]
    sampler: Sampler,
    bind_group: BindGroup,
    size: (u32, u32),
}

impl GpuTexture {
    /// Upload RGBA8 data as an sRGB texture with linear filtering and repeat
    /// wrapping. `slots` are the texture and sampler bindings of `layout`.
    pub fn upload(
        device: &Device,
        queue: &Queue,
        layout: &BindGroupLayout,
        slots: (UniformLocation, UniformLocation),
        data: &TextureData,
        label: &str,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self::upload_with_sampler(device, queue, layout, slots, data, sampler, label)
    }

    pub fn upload_with_sampler(
        device: &Device,
        queue: &Queue,
        layout: &BindGroupLayout,
        (texture_slot, sampler_slot): (UniformLocation, UniformLocation),
        data: &TextureData,
        sampler: Sampler,
        label: &str,
    ) -> Self {
        let size = Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&Default::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: texture_slot.binding,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: sampler_slot.binding,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let gpu = Self {
            texture,
            sampler,
            bind_group,
            size: (data.width, data.height),
        };
        gpu.write(queue, data);
        gpu
    }

    /// Replace the texel data; `data` must have the uploaded size.
    pub fn write(&self, queue: &Queue, data: &TextureData) {
        debug_assert_eq!((data.width, data.height), self.size);
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(data.bytes_per_row()),
                rows_per_image: Some(data.height),
            },
            Extent3d {
                width: data.width,
                height: data.height,
                depth_or_array_layers: 1,
            },
        );
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Attach to texture unit `unit` (the bind group slot the shader samples).
    pub fn bind(&self, pass: &mut RenderPass<'_>, unit: u32) {
        pass.set_bind_group(unit, &self.bind_group, &[]);
    }

    /// Detach whatever is attached to `unit`.
    pub fn unbind(&self, pass: &mut RenderPass<'_>, unit: u32) {
        pass.set_bind_group(unit, None::<&BindGroup>, &[]);
    }
}
