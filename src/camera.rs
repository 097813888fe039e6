// src/camera.rs
// Orbit camera for the lensing scene. The spherical parameters are
// authoritative: every mutation recomputes the Cartesian position
// before the next frame reads it. Out-of-range values clamp.
// RELEVANT FILES: src/math.rs, src/uniforms.rs, src/viewer.rs

use glam::Vec3;

use crate::math::{to_cartesian, wrap_angle, Matrix4, Spherical};

pub const DISTANCE_RANGE: (f32, f32) = (5.0, 50.0);
pub const POLAR_MARGIN: f32 = 0.1;
pub const FOV_RANGE: (f32, f32) = (30.0, 150.0);

/// Camera pose around the hole. `position` and `up` are derived from
/// the spherical fields; mutate through the setters only.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    position: Vec3,
    look_at: Vec3,
    up: Vec3,
    fov_deg: f32,
    distance: f32,
    azimuth: f32,
    polar: f32,
    tilt: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let mut cam = OrbitCamera {
            position: Vec3::ZERO,
            look_at: Vec3::ZERO,
            up: Vec3::Y,
            fov_deg: 80.0,
            distance: 20.0,
            azimuth: std::f32::consts::FRAC_PI_2 * 3.0,
            polar: std::f32::consts::FRAC_PI_2 - 0.15,
            tilt: 0.0,
        };
        cam.recompute();
        cam
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, azimuth: f32, polar: f32) -> Self {
        let mut cam = OrbitCamera::default();
        cam.distance = distance.clamp(DISTANCE_RANGE.0, DISTANCE_RANGE.1);
        cam.azimuth = wrap_angle(azimuth);
        cam.polar = polar.clamp(POLAR_MARGIN, std::f32::consts::PI - POLAR_MARGIN);
        cam.recompute();
        cam
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn fov_deg(&self) -> f32 {
        self.fov_deg
    }

    pub fn tan_half_fov(&self) -> f32 {
        (self.fov_deg.to_radians() / 2.0).tan()
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    pub fn set_fov_deg(&mut self, fov: f32) {
        self.fov_deg = fov.clamp(FOV_RANGE.0, FOV_RANGE.1);
    }

    pub fn set_distance(&mut self, d: f32) {
        self.distance = d.clamp(DISTANCE_RANGE.0, DISTANCE_RANGE.1);
        self.recompute();
    }

    pub fn set_azimuth(&mut self, a: f32) {
        self.azimuth = wrap_angle(a);
        self.recompute();
    }

    pub fn set_polar(&mut self, p: f32) {
        self.polar = p.clamp(POLAR_MARGIN, std::f32::consts::PI - POLAR_MARGIN);
        self.recompute();
    }

    pub fn set_tilt(&mut self, t: f32) {
        self.tilt = t;
        self.recompute();
    }

    pub fn set_look_at(&mut self, target: Vec3) {
        self.look_at = target;
        self.recompute();
    }

    /// Relative orbit step, the natural mouse-drag mapping.
    pub fn orbit(&mut self, d_azimuth: f32, d_polar: f32) {
        self.azimuth = wrap_angle(self.azimuth + d_azimuth);
        self.polar =
            (self.polar + d_polar).clamp(POLAR_MARGIN, std::f32::consts::PI - POLAR_MARGIN);
        self.recompute();
    }

    pub fn zoom(&mut self, factor: f32) {
        self.set_distance(self.distance * factor);
    }

    /// World-to-view transform for the current pose.
    pub fn view_matrix(&self) -> Matrix4 {
        Matrix4::look_at(self.position, self.look_at, self.up)
    }

    /// Perspective projection matching the current field of view.
    pub fn projection_matrix(&self, aspect: f32, near: f32, far: f32) -> Matrix4 {
        Matrix4::perspective(self.fov_deg, aspect, near, far)
    }

    /// Derive Cartesian position and the tilted up vector from the
    /// spherical parameters. Position is
    /// `(d·sinθ·cosφ, d·cosθ, d·sinθ·sinφ)` offset from the look-at
    /// point; up is +Y rolled about the view axis by `tilt`.
    fn recompute(&mut self) {
        self.position = self.look_at
            + to_cartesian(Spherical {
                r: self.distance,
                theta: self.polar,
                phi: self.azimuth,
            });
        let front = (self.look_at - self.position).normalize_or_zero();
        self.up = if front == Vec3::ZERO {
            Vec3::Y
        } else {
            Matrix4::rotation(front, self.tilt).transform_vector(Vec3::Y)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn spherical_recompute_preserves_distance() {
        let mut cam = OrbitCamera::default();
        for (d, a, p) in [(5.0, 0.0, 0.5), (20.0, 3.0, 1.5), (50.0, 6.0, PI - 0.1)] {
            cam.set_distance(d);
            cam.set_azimuth(a);
            cam.set_polar(p);
            let r = (cam.position() - cam.look_at()).length();
            assert!((r - d).abs() <= d * f32::EPSILON * 4.0, "r = {r}, d = {d}");
        }
    }

    #[test]
    fn setters_clamp_to_valid_ranges() {
        let mut cam = OrbitCamera::default();
        cam.set_distance(1.0);
        assert_eq!(cam.distance(), 5.0);
        cam.set_distance(500.0);
        assert_eq!(cam.distance(), 50.0);
        cam.set_polar(0.0);
        assert_eq!(cam.polar(), 0.1);
        cam.set_polar(PI);
        assert!((cam.polar() - (PI - 0.1)).abs() < 1e-6);
        cam.set_fov_deg(10.0);
        assert_eq!(cam.fov_deg(), 30.0);
        cam.set_fov_deg(200.0);
        assert_eq!(cam.fov_deg(), 150.0);
    }

    #[test]
    fn azimuth_wraps() {
        let mut cam = OrbitCamera::default();
        cam.set_azimuth(-0.5);
        assert!(cam.azimuth() > 0.0 && cam.azimuth() < 2.0 * PI);
        cam.set_azimuth(2.0 * PI + 0.25);
        assert!((cam.azimuth() - 0.25).abs() < 1e-5);
    }

    #[test]
    fn polar_axis_convention() {
        // polar → 0 puts the camera above the target on +Y.
        let mut cam = OrbitCamera::default();
        cam.set_polar(0.0);
        let dir = (cam.position() - cam.look_at()).normalize();
        assert!(dir.y > 0.99);
    }

    #[test]
    fn tilt_rolls_up_vector() {
        let mut cam = OrbitCamera::default();
        let up_before = cam.up();
        cam.set_tilt(PI / 2.0);
        let up_after = cam.up();
        assert!(up_before.dot(up_after).abs() < 0.05);
        assert!((up_after.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn tan_half_fov() {
        let mut cam = OrbitCamera::default();
        cam.set_fov_deg(90.0);
        assert!((cam.tan_half_fov() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn view_matrix_centers_the_pose() {
        let cam = OrbitCamera::default();
        let view = cam.view_matrix();
        assert!(view.transform_point(cam.position()).length() < 1e-4);
        let target = view.transform_point(cam.look_at());
        assert!((target.z + cam.distance()).abs() < 1e-3, "{target:?}");
        assert!(target.x.abs() < 1e-3 && target.y.abs() < 1e-3, "{target:?}");
    }

    #[test]
    fn projection_matrix_tracks_fov() {
        let mut cam = OrbitCamera::default();
        cam.set_fov_deg(90.0);
        let proj = cam.projection_matrix(1.0, 0.1, 100.0);
        let edge = proj.project_point(glam::Vec3::new(0.0, 1.0, -1.0));
        assert!((edge.y - 1.0).abs() < 1e-5, "{edge:?}");
    }
}
