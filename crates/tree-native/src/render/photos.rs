//! Photo textures for filled frames, decoded from the slot handle's path
//! and cached per frame until the handle changes.

use anyhow::Context;
use image::imageops::FilterType;
use tree_core::mesh::PhotoInstance;
use tree_core::Scene;

use super::helpers::{self, ScenePipelineDesc};
use super::{per_instance, InstanceBuffer};

/// Longest edge of an uploaded photo texture.
const PHOTO_TEXTURE_MAX: u32 = 1024;

struct CachedPhoto {
    handle: String,
    /// `None` when decoding failed; not retried until the handle changes.
    bind_group: Option<wgpu::BindGroup>,
}

pub(crate) struct PhotoTextures {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    pipeline: wgpu::RenderPipeline,
    instances: InstanceBuffer,
    slots: Vec<Option<CachedPhoto>>,
    draws: Vec<usize>,
}

impl PhotoTextures {
    pub(crate) fn new(
        device: &wgpu::Device,
        globals_bgl: &wgpu::BindGroupLayout,
        shader: &wgpu::ShaderModule,
        frame_count: usize,
    ) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("photo_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("photo_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("photo_pl"),
            bind_group_layouts: &[globals_bgl, &layout],
            push_constant_ranges: &[],
        });
        let attrs = wgpu::vertex_attr_array![
            0 => Float32x4,
            1 => Float32x4,
            2 => Float32x4,
            3 => Float32x4,
            4 => Float32x4
        ];
        let pipeline = helpers::make_scene_pipeline(
            device,
            &pl,
            ScenePipelineDesc {
                label: "photo_pipeline",
                shader,
                buffers: &[per_instance(std::mem::size_of::<PhotoInstance>(), &attrs)],
                blend: None,
                depth_write: true,
                cull_mode: None,
            },
        );
        Self {
            layout,
            sampler,
            pipeline,
            instances: InstanceBuffer::new::<PhotoInstance>(device, "photo_instances", frame_count),
            slots: (0..frame_count).map(|_| None).collect(),
            draws: Vec::with_capacity(frame_count),
        }
    }

    /// Sync textures with the media library and upload this frame's planes.
    pub(crate) fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &Scene) {
        let media = scene.media();
        let (layout, sampler) = (&self.layout, &self.sampler);
        for (index, cached) in self.slots.iter_mut().enumerate() {
            let Some(slot) = media.slot(index) else {
                if cached.take().is_some() {
                    log::debug!("[photos] released texture for frame {}", index);
                }
                continue;
            };
            let handle = slot.handle.as_str();
            if cached.as_ref().is_some_and(|c| c.handle == handle) {
                continue;
            }
            let bind_group = match decode(handle) {
                Ok(rgba) => {
                    log::info!(
                        "[photos] frame {}: {} ({}x{})",
                        index,
                        handle,
                        rgba.width(),
                        rgba.height()
                    );
                    Some(bind(device, queue, layout, sampler, &rgba))
                }
                Err(e) => {
                    log::warn!("[photos] frame {}: {:#}", index, e);
                    None
                }
            };
            *cached = Some(CachedPhoto {
                handle: handle.to_string(),
                bind_group,
            });
        }

        let frames = scene.frames();
        self.instances.write(device, queue, frames.photo_planes());
        self.draws.clear();
        self.draws.extend_from_slice(frames.plane_slots());
    }

    /// Draw every filled frame that has a decoded texture. The caller has
    /// bound the tree globals at group 0.
    pub(crate) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        if self.instances.count == 0 {
            return;
        }
        rpass.set_pipeline(&self.pipeline);
        rpass.set_vertex_buffer(0, self.instances.buffer.slice(..));
        for (i, &index) in self.draws.iter().enumerate() {
            let bind_group = self
                .slots
                .get(index)
                .and_then(|c| c.as_ref())
                .and_then(|c| c.bind_group.as_ref());
            if let Some(bg) = bind_group {
                rpass.set_bind_group(1, bg, &[]);
                let i = i as u32;
                rpass.draw(0..6, i..i + 1);
            }
        }
    }
}

fn bind(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    rgba: &image::RgbaImage,
) -> wgpu::BindGroup {
    let (width, height) = rgba.dimensions();
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let (texture, view) = helpers::create_color_texture(
        device,
        "photo_texture",
        width,
        height,
        wgpu::TextureFormat::Rgba8UnormSrgb,
        wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
    );
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("photo_bg"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

/// Decode and shrink so the longest edge fits [`PHOTO_TEXTURE_MAX`].
fn decode(path: &str) -> anyhow::Result<image::RgbaImage> {
    let img = image::open(path).with_context(|| format!("decoding {}", path))?;
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    let (nw, nh) = fit_within(w, h, PHOTO_TEXTURE_MAX);
    if (nw, nh) == (w, h) {
        return Ok(rgba);
    }
    Ok(image::imageops::resize(&rgba, nw, nh, FilterType::Triangle))
}

/// Scale `(w, h)` so the longest edge is `max`, keeping the aspect ratio.
fn fit_within(w: u32, h: u32, max: u32) -> (u32, u32) {
    let longest = w.max(h).max(1);
    if longest <= max {
        return (w, h);
    }
    let scale = max as f64 / longest as f64;
    let nw = ((w as f64 * scale).round() as u32).clamp(1, max);
    let nh = ((h as f64 * scale).round() as u32).clamp(1, max);
    (nw, nh)
}
