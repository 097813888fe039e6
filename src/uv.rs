// src/uv.rs
// Texture-coordinate mappings from world geometry to UV. CPU statement
// of the mappings the compute kernel applies; keep in lockstep with
// src/shaders/trace.wgsl.

use std::f32::consts::{PI, TAU};

use crate::math::fract;

/// Left edge of the disk seam-mitigation band.
pub const SEAM_LEFT: f32 = 0.52;
/// Right edge of the disk seam-mitigation band.
pub const SEAM_RIGHT: f32 = 0.99;

/// Annular disk mapping. The u axis is intentionally quantized: the
/// near angular half snaps to 0.49 and the far half to 0.51, collapsing
/// the disk onto the two mirror strips of the preprocessed atlas.
/// Radii outside [r_inner, r_outer] map to (0, 1).
pub fn disk_uv(r: f32, phi: f32, r_inner: f32, r_outer: f32) -> (f32, f32) {
    if r < r_inner || r > r_outer {
        return (0.0, 1.0);
    }
    let u = if fract(phi / TAU) < 0.5 { 0.49 } else { 0.51 };
    let v = ((r - r_inner) / (r_outer - r_inner)).clamp(0.0, 1.0);
    (u, v)
}

/// Seam handling for disk samples with u inside [SEAM_LEFT, SEAM_RIGHT]:
/// the band splits into three equal sub-bands sampling the left edge,
/// an even blend of both edges, and the right edge. Returns the blend
/// weight toward the right-edge sample, or None outside the band.
pub fn seam_blend(u: f32) -> Option<f32> {
    if !(SEAM_LEFT..=SEAM_RIGHT).contains(&u) {
        return None;
    }
    let t = (u - SEAM_LEFT) / (SEAM_RIGHT - SEAM_LEFT);
    Some(if t < 1.0 / 3.0 {
        0.0
    } else if t < 2.0 / 3.0 {
        0.5
    } else {
        1.0
    })
}

/// Spherical sky mapping, both axes wrapped to [0, 1).
pub fn sky_uv(theta: f32, phi: f32) -> (f32, f32) {
    (fract(phi / TAU), fract(theta / PI))
}
