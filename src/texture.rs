// src/texture.rs
// Scene texture loading, disk atlas preprocessing and GPU upload
// RELEVANT FILES: src/renderer.rs, src/color.rs

use std::path::Path;

use image::{imageops, RgbaImage};

use crate::color::Color;
use crate::error::RenderResult;

/// Decode an RGBA image from disk. Failures surface as
/// `RenderError::TextureLoad`; the caller keeps its previous texture.
pub fn load_image<P: AsRef<Path>>(path: P) -> RenderResult<RgbaImage> {
    let img = image::open(path.as_ref())?;
    Ok(img.to_rgba8())
}

/// Disk texture preprocessing: a 2W×2H atlas with the source in the
/// top-left and its horizontal, vertical and double mirrors in the
/// other quadrants. The quantized disk mapping addresses the seam
/// between the mirrored halves.
pub fn mirrored_atlas(src: &RgbaImage) -> RgbaImage {
    let (w, h) = src.dimensions();
    let mut atlas = RgbaImage::new(2 * w, 2 * h);
    imageops::replace(&mut atlas, src, 0, 0);
    imageops::replace(&mut atlas, &imageops::flip_horizontal(src), w as i64, 0);
    imageops::replace(&mut atlas, &imageops::flip_vertical(src), 0, h as i64);
    let both = imageops::flip_vertical(&imageops::flip_horizontal(src));
    imageops::replace(&mut atlas, &both, w as i64, h as i64);
    atlas
}

/// An RGBA8 texture bound to the trace kernel.
pub struct SceneTexture {
    texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl SceneTexture {
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &RgbaImage,
        label: &str,
    ) -> Self {
        let (width, height) = img.dimensions();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            img.as_raw(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        SceneTexture {
            texture,
            view,
            width,
            height,
        }
    }

    /// 1×1 placeholder so the kernel has something bound before any
    /// image loads.
    pub fn solid(device: &wgpu::Device, queue: &wgpu::Queue, color: Color, label: &str) -> Self {
        let mut img = RgbaImage::new(1, 1);
        img.put_pixel(0, 0, image::Rgba(<[u8; 4]>::from(color)));
        Self::from_image(device, queue, &img, label)
    }

    /// Release the GPU allocation. Call only after the replacement
    /// texture's bind group is installed.
    pub fn destroy(self) {
        self.texture.destroy();
    }
}
