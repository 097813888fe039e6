// src/viewer.rs
// Interactive windowed shell around the frame driver
// - winit 0.29 window + event loop
// - drag orbits the camera, scroll zooms, keys tune quality and ODE
// - every edit routes through the driver so accumulation restarts
// RELEVANT FILES: src/renderer.rs, src/camera.rs, src/bin/viewer.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowBuilder},
};

use crate::error::{RenderError, RenderResult};
use crate::gpu::GpuContext;
use crate::renderer::Renderer;
use crate::scene::{Quality, Scene};
use crate::texture;

#[derive(Clone)]
pub struct ViewerConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
    pub quality: Quality,
    pub fov_deg: f32,
    pub distance: f32,
    pub disk_path: Option<PathBuf>,
    pub sky_path: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            title: "gravlens".to_string(),
            vsync: true,
            quality: Quality::default(),
            fov_deg: 80.0,
            distance: 20.0,
            disk_path: None,
            sky_path: None,
        }
    }
}

struct FpsCounter {
    frames: u32,
    last_report: Instant,
    current_fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            frames: 0,
            last_report: Instant::now(),
            current_fps: 0.0,
        }
    }

    fn tick(&mut self) -> Option<f32> {
        self.frames += 1;
        let elapsed = self.last_report.elapsed();
        if elapsed >= Duration::from_secs(1) {
            self.current_fps = self.frames as f32 / elapsed.as_secs_f32();
            self.frames = 0;
            self.last_report = Instant::now();
            Some(self.current_fps)
        } else {
            None
        }
    }
}

pub struct Viewer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    gpu: GpuContext,
    surface_config: wgpu::SurfaceConfiguration,
    renderer: Renderer,
    scene: Scene,
    quality: Quality,
    config: ViewerConfig,
    fps: FpsCounter,
    mouse_pressed: bool,
    last_cursor: Option<(f32, f32)>,
    shots_saved: u32,
    reinit_attempted: bool,
}

impl Viewer {
    pub async fn new(window: Arc<Window>, config: ViewerConfig) -> RenderResult<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(|e| RenderError::unsupported_device(format!("create_surface: {e}")))?;

        let gpu = GpuContext::for_surface(&surface).await?;

        let caps = surface.get_capabilities(&gpu.adapter);
        let format = caps.formats[0];
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if config.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu.device, &surface_config);

        let mut renderer = Renderer::new(&gpu, surface_config.width, surface_config.height, format)?;
        renderer.set_quality(config.quality);

        let mut scene = Scene::default();
        scene.camera.set_fov_deg(config.fov_deg);
        scene.camera.set_distance(config.distance);
        renderer.set_scene(scene.clone());

        load_textures(&mut renderer, &config);

        Ok(Self {
            window,
            surface,
            gpu,
            surface_config,
            renderer,
            scene,
            quality: config.quality,
            config,
            fps: FpsCounter::new(),
            mouse_pressed: false,
            last_cursor: None,
            shots_saved: 0,
            reinit_attempted: false,
        })
    }

    /// One-shot recovery after a fatal frame error: rebuild the whole
    /// pipeline set and restore the scene and textures.
    fn try_reinit(&mut self) {
        if self.reinit_attempted {
            return;
        }
        self.reinit_attempted = true;
        match Renderer::new(
            &self.gpu,
            self.surface_config.width,
            self.surface_config.height,
            self.surface_config.format,
        ) {
            Ok(mut renderer) => {
                renderer.set_quality(self.quality);
                renderer.set_scene(self.scene.clone());
                load_textures(&mut renderer, &self.config);
                self.renderer = renderer;
                self.reinit_attempted = false;
                log::info!("renderer reinitialized");
            }
            Err(e) => log::error!("reinitialization failed, halting: {e}"),
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.surface.configure(&self.gpu.device, &self.surface_config);
            self.renderer.resize(new_size.width, new_size.height);
        }
    }

    fn push_scene(&mut self) {
        self.renderer.set_scene(self.scene.clone());
    }

    fn save_png(&mut self) -> RenderResult<()> {
        let pixels = self.renderer.image_data()?;
        self.shots_saved += 1;
        let path = format!(
            "gravlens_{}x{}_{:03}.png",
            self.renderer.width(),
            self.renderer.height(),
            self.shots_saved
        );
        image::save_buffer(
            &path,
            &pixels,
            self.renderer.width(),
            self.renderer.height(),
            image::ColorType::Rgba8,
        )?;
        log::info!("saved {path}");
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::ArrowUp => {
                self.quality = Quality::new(self.quality.level() + 1);
                self.renderer.set_quality(self.quality);
            }
            KeyCode::ArrowDown => {
                self.quality = Quality::new(self.quality.level().saturating_sub(1));
                self.renderer.set_quality(self.quality);
            }
            KeyCode::ArrowLeft => {
                let k = self.scene.ode.potential_coefficient() - 0.25;
                self.scene.ode.set_potential_coefficient(k);
                self.push_scene();
            }
            KeyCode::ArrowRight => {
                let k = self.scene.ode.potential_coefficient() + 0.25;
                self.scene.ode.set_potential_coefficient(k);
                self.push_scene();
            }
            KeyCode::BracketLeft => {
                let h = self.scene.ode.step_size() - 0.01;
                self.scene.ode.set_step_size(h);
                self.push_scene();
            }
            KeyCode::BracketRight => {
                let h = self.scene.ode.step_size() + 0.01;
                self.scene.ode.set_step_size(h);
                self.push_scene();
            }
            KeyCode::KeyF => {
                let fov = self.scene.camera.fov_deg() - 5.0;
                self.scene.camera.set_fov_deg(fov);
                self.push_scene();
            }
            KeyCode::KeyG => {
                let fov = self.scene.camera.fov_deg() + 5.0;
                self.scene.camera.set_fov_deg(fov);
                self.push_scene();
            }
            KeyCode::KeyR => self.renderer.reset(),
            KeyCode::KeyP => {
                if let Err(e) = self.save_png() {
                    log::error!("png export: {e}");
                }
            }
            _ => return false,
        }
        true
    }

    pub fn handle_input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if key_event.state == ElementState::Pressed {
                    if let PhysicalKey::Code(code) = key_event.physical_key {
                        return self.handle_key(code);
                    }
                }
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if *button == MouseButton::Left {
                    self.mouse_pressed = *state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_cursor = None;
                    }
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pos = (position.x as f32, position.y as f32);
                if self.mouse_pressed {
                    if let Some((lx, ly)) = self.last_cursor {
                        let d_azimuth = (pos.0 - lx) * 0.01;
                        let d_polar = (pos.1 - ly) * 0.01;
                        self.scene.camera.orbit(d_azimuth, d_polar);
                        self.push_scene();
                    }
                }
                self.last_cursor = Some(pos);
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 * 0.1,
                };
                self.scene.camera.zoom(1.0 - scroll * 0.1);
                self.push_scene();
                true
            }
            _ => false,
        }
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if let Err(e) = self.renderer.step_frame(Some(&view)) {
            log::error!("frame dropped: {e}");
            self.try_reinit();
            return Ok(());
        }
        frame.present();

        if let Some(fps) = self.fps.tick() {
            self.window.set_title(&format!(
                "gravlens | {}x{} | q{} | k {:+.2} | h {:.2} | frame {} | {:.1} fps",
                self.renderer.width(),
                self.renderer.height(),
                self.quality.level(),
                self.scene.ode.potential_coefficient(),
                self.scene.ode.step_size(),
                self.renderer.frame_count(),
                fps,
            ));
        }
        Ok(())
    }
}

// A failed load keeps the current texture; no reset happens.
fn load_textures(renderer: &mut Renderer, config: &ViewerConfig) {
    if let Some(path) = &config.disk_path {
        match texture::load_image(path) {
            Ok(img) => renderer.load_disk_texture(&img),
            Err(e) => log::warn!("disk texture {}: {e}", path.display()),
        }
    }
    if let Some(path) = &config.sky_path {
        match texture::load_image(path) {
            Ok(img) => renderer.load_sky_texture(&img),
            Err(e) => log::warn!("sky texture {}: {e}", path.display()),
        }
    }
}

pub fn run_viewer(config: ViewerConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(PhysicalSize::new(config.width, config.height))
            .build(&event_loop)?,
    );

    println!("gravlens viewer");
    println!("  drag        orbit");
    println!("  scroll      zoom");
    println!("  up/down     quality");
    println!("  left/right  potential coefficient");
    println!("  [ / ]       integrator step size");
    println!("  f / g       field of view");
    println!("  r           restart accumulation");
    println!("  p           save PNG");
    println!("  esc         exit");

    let mut viewer_opt: Option<Viewer> = None;

    event_loop.run(move |event, elwt| match event {
        Event::Resumed => {
            if viewer_opt.is_none() {
                match pollster::block_on(Viewer::new(Arc::clone(&window), config.clone())) {
                    Ok(v) => viewer_opt = Some(v),
                    Err(e) => {
                        eprintln!("failed to create viewer: {e}");
                        elwt.exit();
                    }
                }
            }
        }
        Event::WindowEvent { ref event, window_id } if window_id == window.id() => {
            if let Some(viewer) = viewer_opt.as_mut() {
                if !viewer.handle_input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::KeyboardInput { event: key_event, .. } => {
                            if key_event.state == ElementState::Pressed
                                && key_event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                            {
                                elwt.exit();
                            }
                        }
                        WindowEvent::Resized(size) => viewer.resize(*size),
                        WindowEvent::RedrawRequested => match viewer.render() {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                viewer.resize(viewer.window().inner_size())
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                eprintln!("out of GPU memory");
                                elwt.exit();
                            }
                            Err(wgpu::SurfaceError::Timeout) => {
                                log::warn!("surface timeout");
                            }
                        },
                        _ => {}
                    }
                }
            }
        }
        Event::AboutToWait => {
            window.request_redraw();
        }
        _ => {}
    })?;

    Ok(())
}
