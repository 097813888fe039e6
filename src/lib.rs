//! gravlens: interactive GPU renderer for gravitational lensing by a
//! Schwarzschild black hole.
//!
//! One compute invocation per pixel integrates a photon through a
//! post-Newtonian effective potential, testing the event horizon, the
//! accretion disk annulus and the enclosing sky shell along the way.
//! Frames accumulate into a per-pixel running mean with decaying
//! sub-pixel jitter, so the image refines progressively and restarts
//! whenever the scene changes.
//!
//! [`renderer::Renderer`] is the frame driver and the crate's main
//! entry point; [`viewer::run_viewer`] wraps it in a winit shell.

pub mod camera;
pub mod color;
pub mod error;
pub mod gpu;
pub mod math;
pub mod ode;
pub mod present;
pub mod renderer;
pub mod scene;
pub mod texture;
pub mod uniforms;
pub mod uv;
pub mod viewer;

pub use error::{RenderError, RenderResult};
pub use renderer::Renderer;
pub use scene::{Hitable, OdeParams, Quality, Scene};
