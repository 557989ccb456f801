//! wgpu renderer for the tree scene: instanced foliage and sprites, lit
//! meshes, the ribbon, then a bloom/vignette post chain into the swapchain.

mod helpers;
mod photos;
mod post;
mod targets;

use anyhow::Context;
use glam::{Mat4, Vec4};
use tree_core::foliage::FoliageInstance;
use tree_core::frames::FramePart;
use tree_core::mesh::{self, InstanceRaw, Mesh, MeshVertex, SpriteInstance};
use tree_core::ornaments::OrnamentBatch;
use tree_core::ribbon::{RibbonMesh, RibbonVertex};
use tree_core::star::TopStar;
use tree_core::{constants::*, Camera, Scene};

use helpers::ScenePipelineDesc;
use photos::PhotoTextures;
use post::{PostBindGroups, PostResources, PostUniforms};
use targets::RenderTargets;

/// World size multiplier for dust sprites.
const DUST_SPRITE_SCALE: f32 = 0.414;
const VIGNETTE: f32 = 0.6;
const VIGNETTE_FOCUSED: f32 = 1.4;

const CLEAR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// Per-draw-group uniform block shared by every scene shader.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    cam_right: [f32; 4],
    cam_up: [f32; 4],
    eye: [f32; 4],
    params: [f32; 4],
}

impl Globals {
    fn new(camera: &Camera, model: Mat4, params: Vec4) -> Self {
        let inv_view = camera.view_matrix().inverse();
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            cam_right: inv_view.x_axis.truncate().extend(0.0).to_array(),
            cam_up: inv_view.y_axis.truncate().extend(0.0).to_array(),
            eye: camera.eye.extend(1.0).to_array(),
            params: params.to_array(),
        }
    }
}

struct DrawGroup {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl DrawGroup {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str) -> Self {
        let buffer = helpers::uniform_buffer(device, label, std::mem::size_of::<Globals>());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    fn write(&self, queue: &wgpu::Queue, globals: &Globals) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(globals));
    }
}

/// Instance buffer that grows to fit and remembers how many records it holds.
struct InstanceBuffer {
    label: &'static str,
    buffer: wgpu::Buffer,
    capacity: usize,
    stride: usize,
    count: u32,
}

impl InstanceBuffer {
    fn new<T: bytemuck::Pod>(device: &wgpu::Device, label: &'static str, capacity: usize) -> Self {
        let stride = std::mem::size_of::<T>();
        let capacity = capacity.max(1);
        Self {
            label,
            buffer: Self::alloc(device, label, capacity * stride),
            capacity,
            stride,
            count: 0,
        }
    }

    fn alloc(device: &wgpu::Device, label: &str, size: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: size as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn write<T: bytemuck::Pod>(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[T]) {
        if data.len() > self.capacity {
            self.capacity = data.len().next_power_of_two();
            self.buffer = Self::alloc(device, self.label, self.capacity * self.stride);
            log::debug!("[render] grew {} to {} instances", self.label, self.capacity);
        }
        if !data.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
        }
        self.count = data.len() as u32;
    }
}

struct GpuMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn from_mesh(device: &wgpu::Device, label: &str, mesh: &Mesh) -> Self {
        Self::upload(device, label, &mesh.vertices, &mesh.indices)
    }

    fn from_ribbon(device: &wgpu::Device, ribbon: &RibbonMesh) -> Self {
        Self::upload(device, "ribbon", &ribbon.vertices, &ribbon.indices)
    }

    fn upload<V: bytemuck::Pod>(device: &wgpu::Device, label: &str, vertices: &[V], indices: &[u32]) -> Self {
        Self {
            vertices: helpers::static_buffer(device, label, vertices, wgpu::BufferUsages::VERTEX),
            indices: helpers::static_buffer(device, label, indices, wgpu::BufferUsages::INDEX),
            index_count: indices.len() as u32,
        }
    }
}

struct Pipelines {
    foliage: wgpu::RenderPipeline,
    sprites: wgpu::RenderPipeline,
    mesh: wgpu::RenderPipeline,
    ribbon: wgpu::RenderPipeline,
}

struct Groups {
    foliage: DrawGroup,
    ribbon: DrawGroup,
    tree: DrawGroup,
    star: DrawGroup,
    dust: DrawGroup,
    hat: DrawGroup,
}

struct Instances {
    foliage: InstanceBuffer,
    dust: InstanceBuffer,
    boxes: InstanceBuffer,
    spheres: InstanceBuffer,
    frame_border: InstanceBuffer,
    frame_backing: InstanceBuffer,
    frame_photo: InstanceBuffer,
    star: InstanceBuffer,
    hat: Vec<InstanceBuffer>,
}

struct Meshes {
    cube: GpuMesh,
    sphere: GpuMesh,
    star: GpuMesh,
    ribbon: GpuMesh,
}

pub struct Renderer<'w> {
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    targets: RenderTargets,
    post: PostResources,
    post_groups: PostBindGroups,
    pipelines: Pipelines,
    groups: Groups,
    instances: Instances,
    meshes: Meshes,
    photos: PhotoTextures,
}

impl<'w> Renderer<'w> {
    pub async fn new(window: &'w winit::window::Window, scene: &Scene) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .context("creating window surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .context("requesting GPU device")?;
        log::info!("[render] adapter: {}", adapter.get_info().name);

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let shader = |label: &str, source: &'static str| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        };
        let foliage_shader = shader("foliage", tree_core::FOLIAGE_WGSL);
        let sprite_shader = shader("sprites", tree_core::SPRITES_WGSL);
        let mesh_shader = shader("mesh", tree_core::MESH_WGSL);
        let ribbon_shader = shader("ribbon", tree_core::RIBBON_WGSL);
        let post_shader = shader("post", tree_core::POST_WGSL);
        let photo_shader = shader("photo", tree_core::PHOTO_WGSL);

        let globals_bgl = helpers::uniform_bgl(&device, "globals_bgl");
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pl"),
            bind_group_layouts: &[&globals_bgl],
            push_constant_ranges: &[],
        });
        let pipelines = create_pipelines(
            &device,
            &layout,
            [&foliage_shader, &sprite_shader, &mesh_shader, &ribbon_shader],
        );

        let photos = PhotoTextures::new(&device, &globals_bgl, &photo_shader, scene.frames().len());

        let groups = Groups {
            foliage: DrawGroup::new(&device, &globals_bgl, "globals_foliage"),
            ribbon: DrawGroup::new(&device, &globals_bgl, "globals_ribbon"),
            tree: DrawGroup::new(&device, &globals_bgl, "globals_tree"),
            star: DrawGroup::new(&device, &globals_bgl, "globals_star"),
            dust: DrawGroup::new(&device, &globals_bgl, "globals_dust"),
            hat: DrawGroup::new(&device, &globals_bgl, "globals_hat"),
        };

        let targets = RenderTargets::new(&device, width, height);
        let post = post::create_post_resources(&device, &post_shader, format);
        let post_groups = post.bind_groups(&device, &targets);

        let meshes = Meshes {
            cube: GpuMesh::from_mesh(&device, "cube", &mesh::unit_cube()),
            sphere: GpuMesh::from_mesh(&device, "sphere", &mesh::uv_sphere(32, 32)),
            star: GpuMesh::from_mesh(&device, "star", &TopStar::mesh()),
            ribbon: GpuMesh::from_ribbon(&device, scene.ribbon()),
        };

        let mut instances = Instances {
            foliage: InstanceBuffer::new::<FoliageInstance>(&device, "foliage_instances", scene.foliage().len()),
            dust: InstanceBuffer::new::<SpriteInstance>(&device, "dust_instances", scene.dust().motes().len()),
            boxes: InstanceBuffer::new::<InstanceRaw>(&device, "box_instances", 64),
            spheres: InstanceBuffer::new::<InstanceRaw>(&device, "sphere_instances", 256),
            frame_border: InstanceBuffer::new::<InstanceRaw>(&device, "frame_border", FRAME_COUNT),
            frame_backing: InstanceBuffer::new::<InstanceRaw>(&device, "frame_backing", FRAME_COUNT),
            frame_photo: InstanceBuffer::new::<InstanceRaw>(&device, "frame_photo", FRAME_COUNT),
            star: InstanceBuffer::new::<InstanceRaw>(&device, "star_instance", 1),
            hat: Vec::new(),
        };
        // static data: foliage records, the star and the hat clouds never change
        instances
            .foliage
            .write(&device, &queue, scene.foliage().instances());
        let star_color = (palette(GOLD_HIGH) * 1.6).extend(1.0);
        instances
            .star
            .write(&device, &queue, &[InstanceRaw::new(Mat4::IDENTITY, star_color)]);
        for part in scene.greeting().parts() {
            let mut buf = InstanceBuffer::new::<SpriteInstance>(&device, "hat_instances", part.sprites.len());
            buf.write(&device, &queue, &part.sprites);
            instances.hat.push(buf);
        }

        Ok(Self {
            surface,
            device,
            queue,
            config,
            targets,
            post,
            post_groups,
            pipelines,
            groups,
            instances,
            meshes,
            photos,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.targets
            .recreate(&self.device, new_size.width, new_size.height);
        self.post_groups = self.post.bind_groups(&self.device, &self.targets);
    }

    fn upload(&mut self, scene: &Scene) {
        let (device, queue) = (&self.device, &self.queue);
        let camera = scene.camera();
        let tree = scene.tree_transform();
        let t = scene.elapsed();
        let height = scene.config().tree_height;
        let pixel = 2.0 * (camera.fovy_radians * 0.5).tan() / self.config.height as f32;

        let foliage_params = Vec4::new(t, scene.foliage().progress(), height, pixel);
        self.groups
            .foliage
            .write(queue, &Globals::new(camera, tree, foliage_params));
        let ribbon_params = Vec4::new(t, scene.reveal().value(), 0.0, 0.0);
        self.groups
            .ribbon
            .write(queue, &Globals::new(camera, tree, ribbon_params));
        self.groups
            .tree
            .write(queue, &Globals::new(camera, tree, Vec4::new(t, 0.0, 0.0, 0.0)));
        self.groups.star.write(
            queue,
            &Globals::new(camera, tree * scene.star_transform(), Vec4::new(t, 0.0, 0.0, 0.0)),
        );
        self.groups.dust.write(
            queue,
            &Globals::new(camera, Mat4::IDENTITY, Vec4::new(t, 0.0, 0.0, DUST_SPRITE_SCALE)),
        );
        self.groups.hat.write(
            queue,
            &Globals::new(camera, scene.greeting().model(), Vec4::new(t, 0.0, 0.0, 1.0)),
        );

        let inst = &mut self.instances;
        inst.dust.write(device, queue, scene.dust().instances());
        inst.boxes
            .write(device, queue, scene.ornaments().instances(OrnamentBatch::Boxes));
        inst.spheres
            .write(device, queue, scene.ornaments().instances(OrnamentBatch::Spheres));
        let frames = scene.frames();
        inst.frame_border
            .write(device, queue, frames.instances(FramePart::Border));
        inst.frame_backing
            .write(device, queue, frames.instances(FramePart::Backing));
        inst.frame_photo
            .write(device, queue, frames.instances(FramePart::Photo));
        self.photos.upload(device, queue, scene);

        let (bw, bh) = (self.targets.bloom_size[0], self.targets.bloom_size[1]);
        let vignette = if scene.greeting().focused() {
            VIGNETTE_FOCUSED
        } else {
            VIGNETTE
        };
        self.post.write_uniforms(
            queue,
            PostUniforms {
                resolution: [bw as f32, bh as f32],
                time: t,
                intensity: scene.config().bloom_intensity,
                blur_dir: [0.0, 0.0],
                threshold: scene.config().bloom_threshold,
                vignette,
            },
        );
    }

    pub fn render(&mut self, scene: &Scene) -> Result<(), wgpu::SurfaceError> {
        self.upload(scene);

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.hdr_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // opaque first
            rpass.set_pipeline(&self.pipelines.foliage);
            rpass.set_bind_group(0, &self.groups.foliage.bind_group, &[]);
            draw_quads(&mut rpass, &self.instances.foliage);

            rpass.set_pipeline(&self.pipelines.mesh);
            rpass.set_bind_group(0, &self.groups.tree.bind_group, &[]);
            draw_mesh(&mut rpass, &self.meshes.cube, &self.instances.boxes);
            draw_mesh(&mut rpass, &self.meshes.sphere, &self.instances.spheres);
            if scene.frames_visible() {
                draw_mesh(&mut rpass, &self.meshes.cube, &self.instances.frame_border);
                draw_mesh(&mut rpass, &self.meshes.cube, &self.instances.frame_backing);
                draw_mesh(&mut rpass, &self.meshes.cube, &self.instances.frame_photo);
            }
            rpass.set_bind_group(0, &self.groups.star.bind_group, &[]);
            draw_mesh(&mut rpass, &self.meshes.star, &self.instances.star);

            if scene.frames_visible() {
                rpass.set_bind_group(0, &self.groups.tree.bind_group, &[]);
                self.photos.draw(&mut rpass);
            }

            if scene.ribbon_visible() {
                rpass.set_pipeline(&self.pipelines.ribbon);
                rpass.set_bind_group(0, &self.groups.ribbon.bind_group, &[]);
                rpass.set_vertex_buffer(0, self.meshes.ribbon.vertices.slice(..));
                rpass.set_index_buffer(
                    self.meshes.ribbon.indices.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                rpass.draw_indexed(0..self.meshes.ribbon.index_count, 0, 0..1);
            }

            // additive sprites last, depth-tested but not written
            rpass.set_pipeline(&self.pipelines.sprites);
            rpass.set_bind_group(0, &self.groups.dust.bind_group, &[]);
            draw_quads(&mut rpass, &self.instances.dust);
            if scene.greeting_visible() {
                rpass.set_bind_group(0, &self.groups.hat.bind_group, &[]);
                for part in &self.instances.hat {
                    draw_quads(&mut rpass, part);
                }
            }
        }

        post::blit(
            &mut encoder,
            "bright_pass",
            &self.targets.bloom_a_view,
            wgpu::Color::BLACK,
            &self.post.bright_pipeline,
            &self.post_groups.hdr,
            None,
        );
        post::blit(
            &mut encoder,
            "blur_h",
            &self.targets.bloom_b_view,
            wgpu::Color::BLACK,
            &self.post.blur_pipeline,
            &self.post_groups.blur_h,
            None,
        );
        post::blit(
            &mut encoder,
            "blur_v",
            &self.targets.bloom_a_view,
            wgpu::Color::BLACK,
            &self.post.blur_pipeline,
            &self.post_groups.blur_v,
            None,
        );
        post::blit(
            &mut encoder,
            "composite",
            &view,
            CLEAR,
            &self.post.composite_pipeline,
            &self.post_groups.hdr,
            Some(&self.post_groups.bloom),
        );

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn draw_quads(rpass: &mut wgpu::RenderPass<'_>, instances: &InstanceBuffer) {
    if instances.count == 0 {
        return;
    }
    rpass.set_vertex_buffer(0, instances.buffer.slice(..));
    rpass.draw(0..6, 0..instances.count);
}

fn draw_mesh(rpass: &mut wgpu::RenderPass<'_>, mesh: &GpuMesh, instances: &InstanceBuffer) {
    if instances.count == 0 {
        return;
    }
    rpass.set_vertex_buffer(0, mesh.vertices.slice(..));
    rpass.set_vertex_buffer(1, instances.buffer.slice(..));
    rpass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
    rpass.draw_indexed(0..mesh.index_count, 0, 0..instances.count);
}

fn create_pipelines(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    [foliage, sprites, mesh_shader, ribbon]: [&wgpu::ShaderModule; 4],
) -> Pipelines {
    let foliage_attrs = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32, 2 => Float32x3];
    let sprite_attrs = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32, 2 => Float32x4];
    let mesh_attrs = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
    let instance_attrs = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4
    ];
    let ribbon_attrs = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    Pipelines {
        foliage: helpers::make_scene_pipeline(
            device,
            layout,
            ScenePipelineDesc {
                label: "foliage_pipeline",
                shader: foliage,
                buffers: &[per_instance(std::mem::size_of::<FoliageInstance>(), &foliage_attrs)],
                blend: None,
                depth_write: true,
                cull_mode: None,
            },
        ),
        sprites: helpers::make_scene_pipeline(
            device,
            layout,
            ScenePipelineDesc {
                label: "sprite_pipeline",
                shader: sprites,
                buffers: &[per_instance(std::mem::size_of::<SpriteInstance>(), &sprite_attrs)],
                blend: Some(helpers::ADDITIVE),
                depth_write: false,
                cull_mode: None,
            },
        ),
        mesh: helpers::make_scene_pipeline(
            device,
            layout,
            ScenePipelineDesc {
                label: "mesh_pipeline",
                shader: mesh_shader,
                buffers: &[
                    per_vertex(std::mem::size_of::<MeshVertex>(), &mesh_attrs),
                    per_instance(std::mem::size_of::<InstanceRaw>(), &instance_attrs),
                ],
                blend: None,
                depth_write: true,
                cull_mode: None,
            },
        ),
        ribbon: helpers::make_scene_pipeline(
            device,
            layout,
            ScenePipelineDesc {
                label: "ribbon_pipeline",
                shader: ribbon,
                buffers: &[per_vertex(std::mem::size_of::<RibbonVertex>(), &ribbon_attrs)],
                blend: None,
                depth_write: true,
                cull_mode: None,
            },
        ),
    }
}

fn per_instance(stride: usize, attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'_> {
    wgpu::VertexBufferLayout {
        array_stride: stride as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes,
    }
}

fn per_vertex(stride: usize, attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'_> {
    wgpu::VertexBufferLayout {
        array_stride: stride as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}
