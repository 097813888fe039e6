// src/ode.rs
// Photon integrator for the post-Newtonian effective potential. This
// is the CPU statement of the math the compute kernel runs per ray;
// the two must stay in lockstep.
// RELEVANT FILES: src/shaders/trace.wgsl, src/scene.rs

use glam::Vec3;

/// Distance divisor for the adaptive step: `s = (|p| / 30) · h`.
pub const STEP_SCALE: f32 = 30.0;

/// Bisection rounds used to refine a horizon crossing.
pub const REFINE_ROUNDS: u32 = 10;

/// A photon mid-flight. `h2` is `|p × v|²` of the birth position and
/// direction, cached once and constant for the ray's lifetime.
#[derive(Debug, Clone, Copy)]
pub struct PhotonState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub h2: f32,
}

impl PhotonState {
    /// Launch a photon. The direction is unit length at birth and is
    /// never re-normalized afterwards; the magnitude drift encodes the
    /// accumulated deflection and the intersection tests rely on it.
    pub fn launch(origin: Vec3, direction: Vec3) -> Self {
        let dir = direction.normalize_or_zero();
        PhotonState {
            position: origin,
            velocity: dir,
            h2: origin.cross(dir).length_squared(),
        }
    }

    /// One symplectic-Euler substep of size `s`:
    /// `p ← p + v·s`, then `a = p · (k·h² / |p|⁵)`, then `v ← v + a·s`.
    /// With k = 0 this is straight-line motion. A photon at the exact
    /// origin has no defined potential; it is left in place.
    pub fn substep(&mut self, k: f32, s: f32) {
        self.position += self.velocity * s;
        let r2 = self.position.length_squared();
        if r2 == 0.0 {
            return;
        }
        let accel = self.position * (k * self.h2 / r2.powf(2.5));
        self.velocity += accel * s;
    }

    /// Step size for the next iteration: fine near the hole, coarse
    /// far away.
    pub fn adaptive_step(&self, h: f32) -> f32 {
        (self.position.length() / STEP_SCALE) * h
    }
}

/// Refine a horizon crossing by bisection on the substep size. `prev`
/// is the photon immediately before the step that crossed, `s` that
/// step's size. Re-runs the substep from `prev` each trial and returns
/// the approximate crossing point; after [`REFINE_ROUNDS`] rounds the
/// crossing distance from the horizon is below `2⁻¹⁰·s`.
pub fn refine_horizon_crossing(prev: &PhotonState, k: f32, s: f32, r_horizon: f32) -> Vec3 {
    let rh2 = r_horizon * r_horizon;
    let mut lo = 0.0_f32;
    let mut hi = s;
    let mut crossing = {
        let mut trial = *prev;
        trial.substep(k, s);
        trial.position
    };
    for _ in 0..REFINE_ROUNDS {
        let mid = 0.5 * (lo + hi);
        let mut trial = *prev;
        trial.substep(k, mid);
        if trial.position.length_squared() > rh2 {
            lo = mid;
        } else {
            hi = mid;
            crossing = trial.position;
        }
    }
    crossing
}
