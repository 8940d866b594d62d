//! The viewer window: event loop, pointer handling and the frame loop.
//!
//! Pointer moves, resizes and redraws all arrive on the event loop thread,
//! so the attractor is only ever written between ticks.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::camera::Camera;
use crate::config::FieldConfig;
use crate::error::ViewerError;
use crate::gpu::GpuState;
use crate::input::Pointer;
use crate::mesh::{LoadState, MeshLoad, MeshSource};
use crate::simulation::StoneField;
use crate::time::{TickClock, Time};

/// Open a window and run the stone field until it is closed.
///
/// Space pauses, Escape quits.
pub fn run(config: FieldConfig) -> Result<(), ViewerError> {
    let field = StoneField::from_config(&config)?;
    log::info!(
        "starting stone field: {} stones, tick mode {:?}",
        field.len(),
        config.tick
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, field);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    config: FieldConfig,
    field: StoneField,
    camera: Camera,
    pointer: Pointer,
    time: Time,
    clock: TickClock,
    // Started before the window exists; the field runs without it.
    mesh_load: Option<MeshLoad>,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    error: Option<ViewerError>,
}

impl App {
    fn new(config: FieldConfig, field: StoneField) -> Self {
        let view = &config.view;
        let aspect = view.width as f32 / view.height.max(1) as f32;
        let camera = Camera::from_view(view, aspect);
        let pointer = Pointer::new(view.width, view.height);
        let clock = TickClock::new(config.tick);
        let mesh_load = Some(MeshLoad::spawn(MeshSource::from_path(view.mesh_path.as_deref())));

        Self {
            config,
            field,
            camera,
            pointer,
            time: Time::new(),
            clock,
            mesh_load,
            window: None,
            gpu_state: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: ViewerError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn poll_mesh(&mut self) {
        let Some(load) = &mut self.mesh_load else {
            return;
        };
        match load.poll() {
            LoadState::Pending => return,
            LoadState::Ready(mesh) => {
                log::info!("stone template ready: {} triangles", mesh.triangle_count());
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.set_mesh(&mesh);
                }
            }
            LoadState::Failed(e) => {
                // The scene carries on without stones.
                log::error!("Error loading stone template: {}", e);
            }
            LoadState::Done => {}
        }
        self.mesh_load = None;
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        // Only poll once there is somewhere to upload the mesh.
        if self.gpu_state.is_some() {
            self.poll_mesh();
        }

        let (_, delta) = self.time.update();
        if !self.time.is_paused() {
            let ticks = self.clock.ticks_due(delta);
            self.field.advance(ticks);
        }

        let Some(gpu_state) = &mut self.gpu_state else {
            return;
        };
        gpu_state.update_instances(&self.field.instances(self.config.view.stone_scale));
        gpu_state.update_camera(&self.camera);

        match gpu_state.render() {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu_state.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, closing");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let view = &self.config.view;
        let window_attrs = Window::default_attributes()
            .with_title(view.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(view.width, view.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let size = window.inner_size();
        self.camera.set_aspect(size.width, size.height);
        self.pointer.resized(size.width, size.height);

        match pollster::block_on(GpuState::new(window.clone(), &self.config.view, &self.camera)) {
            Ok(gpu_state) => {
                self.gpu_state = Some(gpu_state);
                self.window = Some(window);
            }
            Err(e) => self.fail(event_loop, e.into()),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(ndc) = self.pointer.handle_event(&event) {
            let depth = self.config.view.attractor_depth;
            self.field.set_attractor(self.camera.project_pointer(ndc, depth));
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                self.camera.set_aspect(physical_size.width, physical_size.height);
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size.width, physical_size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    match event.physical_key {
                        PhysicalKey::Code(KeyCode::Space) => {
                            self.time.toggle_pause();
                            self.clock.reset();
                            log::info!("paused: {}", self.time.is_paused());
                        }
                        PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
                        _ => {}
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
