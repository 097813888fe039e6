// src/gpu.rs
// GPU context helpers shared by the frame driver, viewer and tests
// RELEVANT FILES: src/renderer.rs, src/viewer.rs, tests/scenarios.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::{RenderError, RenderResult};

pub struct GpuContext {
    pub instance: Arc<wgpu::Instance>,
    pub adapter: Arc<wgpu::Adapter>,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
}

static CTX: OnceCell<GpuContext> = OnceCell::new();

fn backends_from_env() -> wgpu::Backends {
    use std::env;
    if let Ok(s) = env::var("WGPU_BACKENDS").or_else(|_| env::var("WGPU_BACKEND")) {
        let s_l = s.to_lowercase();
        if s_l.contains("metal") {
            return wgpu::Backends::METAL;
        }
        if s_l.contains("vulkan") {
            return wgpu::Backends::VULKAN;
        }
        if s_l.contains("dx12") {
            return wgpu::Backends::DX12;
        }
        if s_l.contains("gl") {
            return wgpu::Backends::GL;
        }
    }
    wgpu::Backends::all()
}

async fn request_context(surface: Option<&wgpu::Surface<'_>>) -> RenderResult<GpuContext> {
    let instance = Arc::new(wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: backends_from_env(),
        ..Default::default()
    }));

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: surface,
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| RenderError::unsupported_device("no suitable GPU adapter"))?;

    let info = adapter.get_info();
    log::info!("adapter: {} ({:?})", info.name, info.backend);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("gravlens-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
            },
            None,
        )
        .await
        .map_err(|e| RenderError::unsupported_device(format!("request_device failed: {e}")))?;

    Ok(GpuContext {
        instance,
        adapter: Arc::new(adapter),
        device: Arc::new(device),
        queue: Arc::new(queue),
    })
}

impl GpuContext {
    /// Context bound to a presentation surface, for the viewer.
    pub async fn for_surface(surface: &wgpu::Surface<'_>) -> RenderResult<Self> {
        request_context(Some(surface)).await
    }

    /// Surface-less context for offline rendering.
    pub async fn headless() -> RenderResult<Self> {
        request_context(None).await
    }
}

/// Process-wide headless context, for tests and offline export.
pub fn ctx() -> RenderResult<&'static GpuContext> {
    CTX.get_or_try_init(|| pollster::block_on(GpuContext::headless()))
}

/// Install an uncaptured-error hook on the device. A stuck or lost GPU
/// is logged and the returned flag trips; the frame driver refuses
/// further submissions once it is set.
pub fn install_error_hook(device: &wgpu::Device) -> Arc<AtomicBool> {
    let halted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&halted);
    device.on_uncaptured_error(Box::new(move |e| {
        log::error!("uncaptured device error: {e}");
        flag.store(true, Ordering::Release);
    }));
    halted
}

/// Align to WebGPU's required bytes-per-row for copies.
#[inline]
pub fn align_copy_bpr(unpadded: u32) -> u32 {
    let a = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    ((unpadded + a - 1) / a) * a
}
