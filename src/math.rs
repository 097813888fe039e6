// src/math.rs
// Spherical coordinate conversions and the affine matrix type used by
// the orbit camera and the presentation quad
// RELEVANT FILES: src/camera.rs, src/present.rs, src/uv.rs, src/shaders/trace.wgsl

use std::f32::consts::{PI, TAU};
use std::ops::Mul;

use glam::Vec3;

/// Spherical triple: radius, polar angle from +Y, azimuth from +X
/// toward +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub r: f32,
    pub theta: f32,
    pub phi: f32,
}

/// `(r, θ, φ) ↦ (r·sinθ·cosφ, r·cosθ, r·sinθ·sinφ)`
pub fn to_cartesian(s: Spherical) -> Vec3 {
    Vec3::new(
        s.r * s.theta.sin() * s.phi.cos(),
        s.r * s.theta.cos(),
        s.r * s.theta.sin() * s.phi.sin(),
    )
}

/// Inverse of [`to_cartesian`] on r > 0, θ ∈ (0, π), φ ∈ (−π, π].
pub fn to_spherical(v: Vec3) -> Spherical {
    let r = v.length();
    if r == 0.0 {
        return Spherical { r: 0.0, theta: 0.0, phi: 0.0 };
    }
    Spherical {
        r,
        theta: (v.y / r).clamp(-1.0, 1.0).acos(),
        phi: v.z.atan2(v.x),
    }
}

/// Wrap an angle to [0, 2π).
pub fn wrap_angle(a: f32) -> f32 {
    let w = a.rem_euclid(TAU);
    if w == TAU {
        0.0
    } else {
        w
    }
}

/// Fractional part wrapped to [0, 1), matching WGSL `fract`.
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Row-major 4×4 affine matrix in the column-vector convention:
/// transforming computes `M·v`, and `a * b` applies `b` first. Points
/// pick up the translation column through the affine rows; vectors do
/// not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    pub rows: [[f32; 4]; 4],
}

impl Matrix4 {
    pub const IDENTITY: Matrix4 = Matrix4 {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        Matrix4 { rows }
    }

    pub fn translation(v: Vec3) -> Self {
        Matrix4::from_rows([
            [1.0, 0.0, 0.0, v.x],
            [0.0, 1.0, 0.0, v.y],
            [0.0, 0.0, 1.0, v.z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn scale(v: Vec3) -> Self {
        Matrix4::from_rows([
            [v.x, 0.0, 0.0, 0.0],
            [0.0, v.y, 0.0, 0.0],
            [0.0, 0.0, v.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation about an arbitrary axis. A zero axis yields identity.
    pub fn rotation(axis: Vec3, angle: f32) -> Self {
        let a = axis.normalize_or_zero();
        if a == Vec3::ZERO {
            return Matrix4::IDENTITY;
        }
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (a.x, a.y, a.z);
        Matrix4::from_rows([
            [t * x * x + c, t * x * y - s * z, t * x * z + s * y, 0.0],
            [t * x * y + s * z, t * y * y + c, t * y * z - s * x, 0.0],
            [t * x * z - s * y, t * y * z + s * x, t * z * z + c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// World-to-view transform, right-handed, Y-up, −Z forward. Up
    /// colinear with the view direction collapses to identity rather
    /// than a NaN basis.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - eye).normalize_or_zero();
        let side = forward.cross(up).normalize_or_zero();
        if forward == Vec3::ZERO || side == Vec3::ZERO {
            return Matrix4::IDENTITY;
        }
        let upward = side.cross(forward);
        Matrix4::from_rows([
            [side.x, side.y, side.z, -side.dot(eye)],
            [upward.x, upward.y, upward.z, -upward.dot(eye)],
            [-forward.x, -forward.y, -forward.z, forward.dot(eye)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Perspective projection into 0..1 depth (wgpu clip space).
    pub fn perspective(fov_y_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        let t = (fov_y_deg.to_radians() / 2.0).tan();
        let depth = near - far;
        Matrix4::from_rows([
            [1.0 / (aspect * t), 0.0, 0.0, 0.0],
            [0.0, 1.0 / t, 0.0, 0.0],
            [0.0, 0.0, far / depth, near * far / depth],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }

    /// `M·(x, y, z, 1)` restricted to the affine rows.
    pub fn transform_point(&self, v: Vec3) -> Vec3 {
        let r = &self.rows;
        Vec3::new(
            r[0][0] * v.x + r[0][1] * v.y + r[0][2] * v.z + r[0][3],
            r[1][0] * v.x + r[1][1] * v.y + r[1][2] * v.z + r[1][3],
            r[2][0] * v.x + r[2][1] * v.y + r[2][2] * v.z + r[2][3],
        )
    }

    /// `M·(x, y, z, 0)`: direction transform, no translation.
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let r = &self.rows;
        Vec3::new(
            r[0][0] * v.x + r[0][1] * v.y + r[0][2] * v.z,
            r[1][0] * v.x + r[1][1] * v.y + r[1][2] * v.z,
            r[2][0] * v.x + r[2][1] * v.y + r[2][2] * v.z,
        )
    }

    /// `M·(x, y, z, 1)` through all four rows with the w-divide, for
    /// projective matrices.
    pub fn project_point(&self, v: Vec3) -> Vec3 {
        let r = &self.rows;
        let w = r[3][0] * v.x + r[3][1] * v.y + r[3][2] * v.z + r[3][3];
        let p = self.transform_point(v);
        if w == 0.0 {
            Vec3::ZERO
        } else {
            p / w
        }
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    /// Composition in the column-vector convention: `(a * b)·v`
    /// equals `a·(b·v)`, so the right-hand factor applies first.
    fn mul(self, rhs: Matrix4) -> Matrix4 {
        let mut rows = [[0.0f32; 4]; 4];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.rows[i][k] * rhs.rows[k][j]).sum();
            }
        }
        Matrix4 { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn spherical_round_trip() {
        let cases = [
            Spherical { r: 1.0, theta: 0.5, phi: 0.25 },
            Spherical { r: 20.0, theta: 1.2, phi: -2.8 },
            Spherical { r: 5.0, theta: 3.0, phi: PI },
            Spherical { r: 0.1, theta: 1.5707964, phi: 0.0 },
        ];
        for s in cases {
            let back = to_spherical(to_cartesian(s));
            assert!((back.r - s.r).abs() < 1e-4 * s.r, "r: {back:?} vs {s:?}");
            assert!((back.theta - s.theta).abs() < 1e-5, "theta: {back:?} vs {s:?}");
            assert!((back.phi - s.phi).abs() < 1e-5, "phi: {back:?} vs {s:?}");
        }
    }

    #[test]
    fn cartesian_axes() {
        let up = to_cartesian(Spherical { r: 2.0, theta: 0.0, phi: 0.0 });
        assert!((up - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-6);

        let x = to_cartesian(Spherical { r: 3.0, theta: FRAC_PI_2, phi: 0.0 });
        assert!((x - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-6);

        let z = to_cartesian(Spherical { r: 3.0, theta: FRAC_PI_2, phi: FRAC_PI_2 });
        assert!((z - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn zero_vector_maps_to_origin() {
        let s = to_spherical(Vec3::ZERO);
        assert_eq!(s.r, 0.0);
        assert_eq!(s.theta, 0.0);
        assert_eq!(s.phi, 0.0);
    }

    #[test]
    fn wrap_angle_range() {
        assert!((wrap_angle(-0.1) - (TAU - 0.1)).abs() < 1e-6);
        assert!((wrap_angle(TAU + 0.25) - 0.25).abs() < 1e-6);
        assert_eq!(wrap_angle(0.0), 0.0);
    }

    #[test]
    fn fract_is_nonnegative() {
        assert!((fract(-0.25) - 0.75).abs() < 1e-6);
        assert!((fract(3.5) - 0.5).abs() < 1e-6);
        assert_eq!(fract(0.0), 0.0);
    }

    #[test]
    fn identity_leaves_points_alone() {
        let p = Vec3::new(1.0, -2.0, 3.0);
        assert_eq!(Matrix4::IDENTITY.transform_point(p), p);
        assert_eq!(Matrix4::IDENTITY.transform_vector(p), p);
    }

    #[test]
    fn composition_applies_right_factor_first() {
        let scale = Matrix4::scale(Vec3::new(2.0, 2.0, 2.0));
        let shift = Matrix4::translation(Vec3::new(1.0, 0.0, 0.0));
        let p = Vec3::new(1.0, 1.0, 0.0);
        // shift * scale doubles first: (2, 2, 0) then (3, 2, 0).
        let a = (shift * scale).transform_point(p);
        assert!((a - Vec3::new(3.0, 2.0, 0.0)).length() < 1e-6);
        // scale * shift shifts first: (2, 1, 0) then (4, 2, 0).
        let b = (scale * shift).transform_point(p);
        assert!((b - Vec3::new(4.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn affine_row_distinguishes_points_from_vectors() {
        let shift = Matrix4::translation(Vec3::new(0.0, 5.0, 0.0));
        let v = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(shift.transform_point(v), Vec3::new(1.0, 5.0, 0.0));
        assert_eq!(shift.transform_vector(v), v);
    }

    #[test]
    fn rotation_about_y_quarter_turn() {
        let m = Matrix4::rotation(Vec3::Y, FRAC_PI_2);
        let out = m.transform_vector(Vec3::X);
        assert!((out - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6, "{out:?}");
        assert_eq!(Matrix4::rotation(Vec3::ZERO, 1.0), Matrix4::IDENTITY);
    }

    #[test]
    fn look_at_maps_eye_to_origin_and_target_forward() {
        let eye = Vec3::new(0.0, 3.0, -20.0);
        let target = Vec3::ZERO;
        let view = Matrix4::look_at(eye, target, Vec3::Y);
        assert!(view.transform_point(eye).length() < 1e-4);
        let t = view.transform_point(target);
        let d = (target - eye).length();
        assert!((t - Vec3::new(0.0, 0.0, -d)).length() < 1e-3, "{t:?}");
    }

    #[test]
    fn look_at_degenerate_up_is_identity() {
        let m = Matrix4::look_at(Vec3::ZERO, Vec3::Y, Vec3::Y);
        assert_eq!(m, Matrix4::IDENTITY);
    }

    #[test]
    fn perspective_maps_frustum_to_unit_depth() {
        let proj = Matrix4::perspective(90.0, 1.0, 0.1, 100.0);
        // A point on the top fov edge lands on the clip boundary.
        let edge = proj.project_point(Vec3::new(0.0, 1.0, -1.0));
        assert!((edge.y - 1.0).abs() < 1e-5, "{edge:?}");
        // Near and far planes map to 0 and 1.
        let near = proj.project_point(Vec3::new(0.0, 0.0, -0.1));
        let far = proj.project_point(Vec3::new(0.0, 0.0, -100.0));
        assert!(near.z.abs() < 1e-5, "{near:?}");
        assert!((far.z - 1.0).abs() < 1e-4, "{far:?}");
    }
}
