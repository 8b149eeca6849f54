use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::engine::Engine;
use crate::error::BackdropResult;
use crate::gpu::{Compositor, GpuContext};
use crate::policy::PerformanceTier;
use crate::probe::{FpsMeter, GpuSupport};

/// Window host for one mounted engine.
///
/// The host only forwards window events to the engine and presents its
/// surfaces; all per-frame state lives in the engine.
pub struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    compositor: Option<Compositor>,
    engine: Option<Engine>,
    gpu_support: GpuSupport,
    tier_hint: Option<PerformanceTier>,
    title_fps: FpsMeter,
}

impl App {
    pub fn new(gpu_support: GpuSupport, tier_hint: Option<PerformanceTier>) -> Self {
        Self {
            window: None,
            gpu: None,
            compositor: None,
            engine: None,
            gpu_support,
            tier_hint,
            title_fps: FpsMeter::new(),
        }
    }

    fn create_window(event_loop: &ActiveEventLoop) -> BackdropResult<Arc<Window>> {
        let window_attrs = Window::default_attributes()
            .with_title("Route Backdrop - Probing...")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        Ok(Arc::new(event_loop.create_window(window_attrs)?))
    }

    fn render(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let now = Instant::now();
        engine.frame(now);

        let (Some(gpu), Some(compositor)) = (self.gpu.as_ref(), self.compositor.as_mut()) else {
            return;
        };
        compositor.prepare(&gpu.device, &gpu.queue, engine.surfaces());

        let output = match gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });
        compositor.draw(&mut encoder, &view);

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(fps) = self.title_fps.tick(now) {
            if let Some(window) = &self.window {
                let tier = engine.tier().map(|t| t.to_string()).unwrap_or_else(|| "probing".into());
                let mode = engine.mode().map(|m| m.to_string()).unwrap_or_else(|| "-".into());
                let state = if engine.should_animate() { "" } else { " [paused]" };
                window.set_title(&format!(
                    "Route Backdrop - {} FPS - {} tier, {} mode{}",
                    fps, tier, mode, state
                ));
            }
        }
    }

    fn handle_key(&mut self, key_code: KeyCode) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let state = engine.playback_state();
        match key_code {
            KeyCode::Space => {
                engine.set_playing(!state.is_playing);
                log::info!("Playback {}", if state.is_playing { "stopped" } else { "started" });
            }
            KeyCode::KeyP => {
                engine.set_paused(!state.is_paused);
                log::info!("Paused: {}", !state.is_paused);
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        log::info!("Initializing route backdrop...");

        let window = match Self::create_window(event_loop) {
            Ok(window) => window,
            Err(e) => {
                log::error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let mut engine = Engine::mount(
            size.width as f32,
            size.height as f32,
            self.tier_hint,
            self.gpu_support,
            Instant::now(),
        );
        if let Some(monitor) = window.current_monitor() {
            let screen = monitor.size();
            engine.set_screen_pixels(screen.width as u64 * screen.height as u64);
        }

        log::info!("Creating GPU context...");
        match pollster::block_on(GpuContext::new(window.clone())) {
            Ok(gpu) => {
                let compositor = Compositor::new(&gpu.device, gpu.format());
                let (width, height) = gpu.size();
                compositor.resize(&gpu.queue, width, height);
                self.compositor = Some(compositor);
                self.gpu = Some(gpu);
            }
            Err(e) => {
                log::error!("{}", e);
                engine.force_static();
            }
        }

        log::info!("Controls:");
        log::info!("  Space: Toggle play");
        log::info!("  P: Toggle pause");
        log::info!("  Escape: Quit");

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                if let Some(engine) = self.engine.take() {
                    engine.unmount();
                }
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() {
                    if let PhysicalKey::Code(key_code) = event.physical_key {
                        if key_code == KeyCode::Escape {
                            log::info!("Escape pressed, exiting...");
                            if let Some(engine) = self.engine.take() {
                                engine.unmount();
                            }
                            event_loop.exit();
                        } else {
                            self.handle_key(key_code);
                        }
                    }
                }
            }
            WindowEvent::Resized(new_size) => {
                log::info!("Window resized to {}x{}", new_size.width, new_size.height);
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                    if let Some(compositor) = &self.compositor {
                        let (width, height) = gpu.size();
                        compositor.resize(&gpu.queue, width, height);
                    }
                }
                if let Some(engine) = &mut self.engine {
                    // A minimized window reports zero size
                    let visible = new_size.width > 0 && new_size.height > 0;
                    engine.set_intersection(if visible { 1.0 } else { 0.0 });
                    engine.resize(new_size.width as f32, new_size.height as f32);
                }
            }
            WindowEvent::Occluded(occluded) => {
                if let Some(engine) = &mut self.engine {
                    engine.set_page_visible(!occluded);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(engine) = &mut self.engine {
                    engine.set_pointer(Some(Vec2::new(position.x as f32, position.y as f32)));
                }
            }
            WindowEvent::CursorLeft { .. } => {
                if let Some(engine) = &mut self.engine {
                    engine.set_pointer(None);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
                // Keep rescheduling even while the gate is closed
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
