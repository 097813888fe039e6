// src/uniforms.rs
// Per-frame uniform block for the trace kernel. 256 bytes, 16-byte
// slots; every value is an f32 except rays_per_frame. The layout must
// match struct TraceUniforms in src/shaders/trace.wgsl field for field.
// RELEVANT FILES: src/renderer.rs, src/shaders/trace.wgsl

use bytemuck::{Pod, Zeroable};

use crate::scene::Scene;

pub const UNIFORM_SIZE: usize = 256;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug)]
pub struct TraceUniforms {
    pub cam_pos: [f32; 3],
    pub _pad0: f32,
    pub cam_look: [f32; 3],
    pub _pad1: f32,
    pub cam_up: [f32; 3],
    pub _pad2: f32,
    pub fov_deg: f32,
    pub tan_half_fov: f32,
    pub _pad3: [f32; 2],
    pub potential_coefficient: f32,
    pub step_size: f32,
    pub _pad4: [f32; 2],
    pub width: f32,
    pub height: f32,
    pub frame_count: f32,
    pub rays_per_frame: u32,
    pub disk_inner: f32,
    pub disk_outer: f32,
    pub sky_radius: f32,
    pub horizon_radius: f32,
    pub random_seed: f32,
    pub max_iterations: f32,
    pub jitter_scale: f32,
    // The published layout leaves this lane as padding; the sky
    // azimuth offset rides here so every named field keeps its offset.
    pub sky_phi_offset: f32,
    pub _tail: [[f32; 4]; 8],
}

impl TraceUniforms {
    /// Pack the per-frame uniform block. `rays_per_frame` is fixed to
    /// the dispatch size W·H, one ray per pixel per frame.
    pub fn pack(
        scene: &Scene,
        width: u32,
        height: u32,
        frame_count: u32,
        random_seed: f32,
        max_iterations: u32,
        jitter_scale: f32,
    ) -> Self {
        let cam = &scene.camera;
        let (disk_inner, disk_outer) = scene.disk().unwrap_or((0.0, 0.0));
        let horizon_radius = scene.horizon().unwrap_or(0.0);
        let (sky_radius, sky_phi_offset) = scene.sky().unwrap_or((f32::INFINITY, 0.0));

        TraceUniforms {
            cam_pos: cam.position().to_array(),
            _pad0: 0.0,
            cam_look: cam.look_at().to_array(),
            _pad1: 0.0,
            cam_up: cam.up().to_array(),
            _pad2: 0.0,
            fov_deg: cam.fov_deg(),
            tan_half_fov: cam.tan_half_fov(),
            _pad3: [0.0; 2],
            potential_coefficient: scene.ode.potential_coefficient(),
            step_size: scene.ode.step_size(),
            _pad4: [0.0; 2],
            width: width as f32,
            height: height as f32,
            frame_count: frame_count as f32,
            rays_per_frame: width * height,
            disk_inner,
            disk_outer,
            sky_radius,
            horizon_radius,
            random_seed,
            max_iterations: max_iterations as f32,
            jitter_scale,
            sky_phi_offset,
            _tail: [[0.0; 4]; 8],
        }
    }
}
