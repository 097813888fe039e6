// src/scene.rs
// Scene model: the closed hitable variant set, integrator parameters
// and the quality preset ladder
// RELEVANT FILES: src/camera.rs, src/uniforms.rs, src/renderer.rs

use crate::camera::OrbitCamera;

pub const POTENTIAL_RANGE: (f32, f32) = (-5.0, 5.0);
pub const STEP_SIZE_RANGE: (f32, f32) = (0.01, 0.20);

/// Things a photon can hit. A closed set: the compute kernel hard-codes
/// these three regimes, so there is no dispatch on the hot path.
/// Textures belong to the frame driver, not the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hitable {
    /// Annulus in the equatorial plane, `0 < r_inner < r_outer`.
    Disk { r_inner: f32, r_outer: f32 },
    /// Event horizon sphere, `radius = 2` in natural units.
    Horizon { radius: f32 },
    /// Enclosing sky shell, `radius` beyond the disk's outer edge.
    Sky { radius: f32, phi_offset: f32 },
}

/// Effective-potential integrator parameters. Setters clamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OdeParams {
    potential_coefficient: f32,
    step_size: f32,
}

impl Default for OdeParams {
    fn default() -> Self {
        OdeParams {
            potential_coefficient: -1.5,
            step_size: 0.16,
        }
    }
}

impl OdeParams {
    pub fn potential_coefficient(&self) -> f32 {
        self.potential_coefficient
    }

    pub fn step_size(&self) -> f32 {
        self.step_size
    }

    /// 0 is flat space; negative values attract.
    pub fn set_potential_coefficient(&mut self, k: f32) {
        self.potential_coefficient = k.clamp(POTENTIAL_RANGE.0, POTENTIAL_RANGE.1);
    }

    pub fn set_step_size(&mut self, h: f32) {
        self.step_size = h.clamp(STEP_SIZE_RANGE.0, STEP_SIZE_RANGE.1);
    }
}

/// Quality preset, 1 (fast) to 20 (exhaustive). Governs the
/// integrator's iteration budget; the GPU path always traces one ray
/// per pixel per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Default for Quality {
    fn default() -> Self {
        Quality(2)
    }
}

impl Quality {
    pub fn new(q: u32) -> Self {
        Quality(q.clamp(1, 20))
    }

    pub fn level(&self) -> u32 {
        self.0
    }

    pub fn max_iterations(&self) -> u32 {
        20_000 + 5_000 * self.0
    }
}

/// Camera, hitables and integrator parameters. Hitable order is the
/// layering order for overlapping regions.
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: OrbitCamera,
    pub hitables: Vec<Hitable>,
    pub ode: OdeParams,
}

impl Default for Scene {
    fn default() -> Self {
        Scene {
            camera: OrbitCamera::default(),
            hitables: vec![
                Hitable::Disk { r_inner: 2.6, r_outer: 12.0 },
                Hitable::Horizon { radius: 2.0 },
                Hitable::Sky { radius: 30.0, phi_offset: std::f32::consts::FRAC_PI_2 },
            ],
            ode: OdeParams::default(),
        }
    }
}

impl Scene {
    /// First disk in list order.
    pub fn disk(&self) -> Option<(f32, f32)> {
        self.hitables.iter().find_map(|h| match h {
            Hitable::Disk { r_inner, r_outer } => Some((*r_inner, *r_outer)),
            _ => None,
        })
    }

    /// First horizon in list order.
    pub fn horizon(&self) -> Option<f32> {
        self.hitables.iter().find_map(|h| match h {
            Hitable::Horizon { radius } => Some(*radius),
            _ => None,
        })
    }

    /// First sky shell in list order.
    pub fn sky(&self) -> Option<(f32, f32)> {
        self.hitables.iter().find_map(|h| match h {
            Hitable::Sky { radius, phi_offset } => Some((*radius, *phi_offset)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ode_params_clamp() {
        let mut ode = OdeParams::default();
        assert_eq!(ode.potential_coefficient(), -1.5);
        assert_eq!(ode.step_size(), 0.16);
        ode.set_potential_coefficient(-10.0);
        assert_eq!(ode.potential_coefficient(), -5.0);
        ode.set_potential_coefficient(10.0);
        assert_eq!(ode.potential_coefficient(), 5.0);
        ode.set_step_size(0.0);
        assert_eq!(ode.step_size(), 0.01);
        ode.set_step_size(1.0);
        assert_eq!(ode.step_size(), 0.20);
    }

    #[test]
    fn quality_ladder() {
        assert_eq!(Quality::new(1).max_iterations(), 25_000);
        assert_eq!(Quality::new(20).max_iterations(), 120_000);
        assert_eq!(Quality::new(0).level(), 1);
        assert_eq!(Quality::new(99).level(), 20);
    }

    #[test]
    fn default_scene_configuration() {
        let scene = Scene::default();
        assert_eq!(scene.disk(), Some((2.6, 12.0)));
        assert_eq!(scene.horizon(), Some(2.0));
        let (r_sky, phi) = scene.sky().unwrap();
        assert_eq!(r_sky, 30.0);
        assert!((phi - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn accessors_respect_list_order() {
        let mut scene = Scene::default();
        scene.hitables.insert(
            0,
            Hitable::Disk { r_inner: 3.0, r_outer: 8.0 },
        );
        assert_eq!(scene.disk(), Some((3.0, 8.0)));
    }
}
