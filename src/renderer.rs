// src/renderer.rs
// Frame driver: owns the GPU resources behind the trace kernel,
// prepares per-frame uniforms, schedules compute + presentation and
// exports pixels. Any mutation that changes the pixel distribution
// resets the accumulator.
// RELEVANT FILES: src/shaders/trace.wgsl, src/uniforms.rs, src/present.rs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::RgbaImage;

use crate::color::Color;
use crate::error::{RenderError, RenderResult};
use crate::gpu::{align_copy_bpr, install_error_hook, GpuContext};
use crate::present::PresentPass;
use crate::scene::{Quality, Scene};
use crate::texture::{mirrored_atlas, SceneTexture};
use crate::uniforms::{TraceUniforms, UNIFORM_SIZE};

pub const WORKGROUP_SIZE: u32 = 16;
pub const DEFAULT_JITTER_SCALE: f32 = 20.0;

/// Bytes per accumulator texel (vec4<f32>).
const ACCUM_TEXEL_BYTES: u64 = 16;

pub struct Renderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    width: u32,
    height: u32,
    frame_count: u32,
    seed_state: u32,
    max_iterations: u32,
    jitter_scale: f32,
    scene: Scene,
    compute_pipeline: wgpu::ComputePipeline,
    compute_layout: wgpu::BindGroupLayout,
    compute_bind_group: wgpu::BindGroup,
    uniform_buf: wgpu::Buffer,
    accum_buf: wgpu::Buffer,
    output: wgpu::Texture,
    output_view: wgpu::TextureView,
    disk_tex: SceneTexture,
    sky_tex: SceneTexture,
    sampler: wgpu::Sampler,
    present: PresentPass,
    halted: Arc<AtomicBool>,
}

impl Renderer {
    /// Build the full pipeline set against `surface_format` (what the
    /// presentation pass writes; pass the swapchain format, or any
    /// renderable format for headless use).
    pub fn new(
        gpu: &GpuContext,
        width: u32,
        height: u32,
        surface_format: wgpu::TextureFormat,
    ) -> RenderResult<Self> {
        let device = Arc::clone(&gpu.device);
        let queue = Arc::clone(&gpu.queue);
        let halted = install_error_hook(&device);

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("trace-kernel"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/trace.wgsl").into()),
        });

        let compute_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("trace-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: wgpu::TextureFormat::Rgba8Unorm,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 5,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("trace-pipeline-layout"),
            bind_group_layouts: &[&compute_layout],
            push_constant_ranges: &[],
        });

        let compute_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("trace-pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "main",
        });

        if let Some(e) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::shader(e));
        }

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let uniform_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("trace-uniforms"),
            size: UNIFORM_SIZE as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let accum_buf = Self::create_accum_buffer(&device, width, height);
        let (output, output_view) = Self::create_output(&device, width, height);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("scene-sampler"),
            address_mode_u: wgpu::AddressMode::MirrorRepeat,
            address_mode_v: wgpu::AddressMode::MirrorRepeat,
            address_mode_w: wgpu::AddressMode::MirrorRepeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            anisotropy_clamp: 16,
            ..Default::default()
        });

        let disk_tex = SceneTexture::solid(&device, &queue, Color::WHITE, "disk-texture");
        let sky_tex = SceneTexture::solid(&device, &queue, Color::BLACK, "sky-texture");

        let compute_bind_group = Self::build_compute_bind_group(
            &device,
            &compute_layout,
            &uniform_buf,
            &accum_buf,
            &output_view,
            &disk_tex,
            &sky_tex,
            &sampler,
        );

        let present = PresentPass::new(&device, &output_view, &sampler, surface_format);

        if let Some(e) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::resource(e));
        }

        log::info!("renderer ready at {width}x{height}, presenting {surface_format:?}");

        Ok(Renderer {
            device,
            queue,
            width,
            height,
            frame_count: 0,
            seed_state: 0x9e3779b9,
            max_iterations: Quality::default().max_iterations(),
            jitter_scale: DEFAULT_JITTER_SCALE,
            scene: Scene::default(),
            compute_pipeline,
            compute_layout,
            compute_bind_group,
            uniform_buf,
            accum_buf,
            output,
            output_view,
            disk_tex,
            sky_tex,
            sampler,
            present,
            halted,
        })
    }

    fn create_accum_buffer(device: &wgpu::Device, width: u32, height: u32) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("trace-accum"),
            size: u64::from(width) * u64::from(height) * ACCUM_TEXEL_BYTES,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_output(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let output = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("trace-output"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = output.create_view(&wgpu::TextureViewDescriptor::default());
        (output, view)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_compute_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform_buf: &wgpu::Buffer,
        accum_buf: &wgpu::Buffer,
        output_view: &wgpu::TextureView,
        disk_tex: &SceneTexture,
        sky_tex: &SceneTexture,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("trace-bg"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: accum_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(output_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&disk_tex.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&sky_tex.view),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn rebuild_bind_groups(&mut self) {
        self.compute_bind_group = Self::build_compute_bind_group(
            &self.device,
            &self.compute_layout,
            &self.uniform_buf,
            &self.accum_buf,
            &self.output_view,
            &self.disk_tex,
            &self.sky_tex,
            &self.sampler,
        );
        self.present
            .rebind(&self.device, &self.output_view, &self.sampler);
    }

    fn next_seed(&mut self) -> f32 {
        // xorshift32; the kernel hashes the integer value, so keep it
        // inside f32's exact-integer range.
        let mut x = self.seed_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.seed_state = x;
        (x & 0x00ff_ffff) as f32
    }

    /// Trace one frame into the accumulator and output image, then
    /// blit to `target` if one is given. The uniform write, compute
    /// dispatch and presentation pass go down as a single submission.
    /// Returns the number of rays traced (one per pixel).
    pub fn step_frame(&mut self, target: Option<&wgpu::TextureView>) -> RenderResult<u32> {
        if self.halted.load(Ordering::Acquire) {
            return Err(RenderError::device_lost("submissions halted"));
        }

        let seed = self.next_seed();
        let uniforms = TraceUniforms::pack(
            &self.scene,
            self.width,
            self.height,
            self.frame_count,
            seed,
            self.max_iterations,
            self.jitter_scale,
        );
        self.queue
            .write_buffer(&self.uniform_buf, 0, bytemuck::bytes_of(&uniforms));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("trace-pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.compute_pipeline);
            pass.set_bind_group(0, &self.compute_bind_group, &[]);
            let gx = (self.width + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE;
            let gy = (self.height + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE;
            pass.dispatch_workgroups(gx, gy, 1);
        }
        if let Some(view) = target {
            self.present.encode(&mut encoder, view);
        }
        self.queue.submit([encoder.finish()]);

        self.frame_count += 1;
        Ok(self.width * self.height)
    }

    /// Restart accumulation; the next frame writes its color directly.
    pub fn reset(&mut self) {
        self.frame_count = 0;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        let (output, output_view) = Self::create_output(&self.device, width, height);
        let old = std::mem::replace(&mut self.output, output);
        self.output_view = output_view;
        self.accum_buf = Self::create_accum_buffer(&self.device, width, height);
        self.rebuild_bind_groups();
        old.destroy();
        self.reset();
        log::debug!("resized to {width}x{height}");
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn set_scene(&mut self, scene: Scene) {
        self.scene = scene;
        self.reset();
    }

    pub fn set_max_iterations(&mut self, max_iterations: u32) {
        self.max_iterations = max_iterations;
        self.reset();
    }

    pub fn set_quality(&mut self, quality: Quality) {
        self.set_max_iterations(quality.max_iterations());
    }

    pub fn set_jitter_scale(&mut self, jitter_scale: f32) {
        self.jitter_scale = jitter_scale;
        self.reset();
    }

    /// Swap in a disk texture. The source is expanded into the 2×2
    /// mirrored atlas first; the previous texture is destroyed only
    /// after the rebound bind group is in place.
    pub fn load_disk_texture(&mut self, img: &RgbaImage) {
        let atlas = mirrored_atlas(img);
        let tex = SceneTexture::from_image(&self.device, &self.queue, &atlas, "disk-texture");
        let old = std::mem::replace(&mut self.disk_tex, tex);
        self.rebuild_bind_groups();
        old.destroy();
        self.reset();
        log::info!("disk texture {}x{} (atlas)", atlas.width(), atlas.height());
    }

    /// Swap in a sky texture, uploaded unmodified.
    pub fn load_sky_texture(&mut self, img: &RgbaImage) {
        let tex = SceneTexture::from_image(&self.device, &self.queue, img, "sky-texture");
        let old = std::mem::replace(&mut self.sky_tex, tex);
        self.rebuild_bind_groups();
        old.destroy();
        self.reset();
        log::info!("sky texture {}x{}", img.width(), img.height());
    }

    /// Copy the output image back to the CPU as tightly packed RGBA,
    /// row-major, `4·W·H` bytes.
    pub fn image_data(&self) -> RenderResult<Vec<u8>> {
        let unpadded = 4 * self.width;
        let padded = align_copy_bpr(unpadded);
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback-staging"),
            size: u64::from(padded) * u64::from(self.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback-encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &self.output,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &staging,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit([encoder.finish()]);

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|_| RenderError::readback("map_async channel closed"))?
            .map_err(|e| RenderError::readback(format!("map failed: {e:?}")))?;

        let data = slice.get_mapped_range();
        let mut out = Vec::with_capacity((unpadded * self.height) as usize);
        for row in 0..self.height as usize {
            let start = row * padded as usize;
            out.extend_from_slice(&data[start..start + unpadded as usize]);
        }
        drop(data);
        staging.unmap();
        staging.destroy();
        Ok(out)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn jitter_scale(&self) -> f32 {
        self.jitter_scale
    }
}
