use anyhow::{Context, Result};
use cityscape_assets::{load_resources, FsSource, ResourceList, ShaderSources};
use cityscape_common::{CityConfig, CityRng};
use cityscape_kernel::CityWorld;
use cityscape_layout::{fill_city, generate_map, CellBlocks, CityMap};
use cityscape_render::SceneDescription;
use cityscape_render_wgpu::{OrbitCamera, WgpuRenderer};
use cityscape_tools::{CityInspector, FrameTimer};
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "cityscape-desktop", about = "Procedural night city viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON city configuration; defaults are used for missing fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the generation seed
    #[arg(long)]
    seed: Option<u64>,

    /// Directory the shader resources are resolved against
    #[arg(long, default_value = ".")]
    resources: PathBuf,
}

/// Everything generated from one seed.
struct City {
    map: CityMap,
    blocks: Vec<CellBlocks>,
    world: CityWorld,
    scene: SceneDescription,
}

impl City {
    fn generate(config: &CityConfig, seed: u64) -> Self {
        let _span = tracing::info_span!("generate_city", seed).entered();
        let mut rng = CityRng::from_seed_u64(seed);
        let map = generate_map(config.repeat_count, config.cell_size, config.street_width);
        let blocks = fill_city(&map, config.max_height, &mut rng);
        let world = CityWorld::from_config(config, &mut rng);
        let scene = SceneDescription::build(config, &map, &blocks);
        tracing::info!(
            cells = map.cells.len(),
            lights = world.lights().len(),
            "city generated"
        );
        Self {
            map,
            blocks,
            world,
            scene,
        }
    }
}

/// Application state.
struct AppState {
    config: CityConfig,
    seed: u64,
    city: City,
    camera: OrbitCamera,
    timer: FrameTimer,
    show_hud: bool,
    paused: bool,
    regenerate: bool,
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
    last_frame: Instant,
}

impl AppState {
    fn new(config: CityConfig) -> Self {
        let seed = config.seed;
        Self {
            city: City::generate(&config, seed),
            camera: OrbitCamera::from_config(&config),
            config,
            seed,
            timer: FrameTimer::new(120),
            show_hud: true,
            paused: false,
            regenerate: false,
            dragging: false,
            last_cursor: None,
            last_frame: Instant::now(),
        }
    }

    /// One animation step per presented frame.
    fn update(&mut self) {
        let now = Instant::now();
        self.timer.record(now - self.last_frame);
        self.last_frame = now;

        if !self.paused {
            self.city.world.step();
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::F1 => self.show_hud = !self.show_hud,
            KeyCode::Space => self.paused = !self.paused,
            KeyCode::KeyR => self.regenerate = true,
            _ => {}
        }
    }

    fn handle_cursor(&mut self, x: f64, y: f64) {
        if self.dragging {
            if let Some((lx, ly)) = self.last_cursor {
                self.camera.rotate((x - lx) as f32, (y - ly) as f32);
            }
        }
        self.last_cursor = Some((x, y));
    }

    /// Rebuild the city with the next seed. Returns true when the scene changed.
    fn take_regenerate(&mut self) -> bool {
        if !std::mem::take(&mut self.regenerate) {
            return false;
        }
        self.seed = self.seed.wrapping_add(1);
        self.city = City::generate(&self.config, self.seed);
        true
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }

        let summary = CityInspector::summary(&self.city.map, &self.city.blocks, &self.city.world);

        egui::SidePanel::left("hud")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Cityscape");
                ui.separator();
                ui.label(format!("Seed: {}", self.seed));
                ui.label(format!(
                    "Grid: {n}x{n}  Streets: {}",
                    summary.streets,
                    n = summary.repeat_count
                ));
                ui.label(format!(
                    "Buildings: {}  Tallest: {:.0}",
                    summary.buildings, summary.tallest_building
                ));
                ui.separator();
                ui.label(format!("Tick: {}", summary.tick));
                ui.label(format!("Light direction: {:.2}", summary.light_direction));
                ui.label(format!("Lights: {}", summary.lights));
                for lane in &summary.lanes {
                    ui.label(format!("  {:?}: {}", lane.direction, lane.count));
                }
                ui.separator();
                ui.label(format!(
                    "Frame: {:.2} ms ({:.0} fps)",
                    self.timer.average().as_secs_f64() * 1000.0,
                    self.timer.fps()
                ));
                let eye = self.camera.position();
                ui.label(format!("Camera: ({:.0}, {:.0}, {:.0})", eye.x, eye.y, eye.z));
                ui.separator();

                ui.horizontal(|ui| {
                    let label = if self.paused { "Resume (Space)" } else { "Pause (Space)" };
                    if ui.button(label).clicked() {
                        self.paused = !self.paused;
                    }
                    if ui.button("Regenerate (R)").clicked() {
                        self.regenerate = true;
                    }
                });

                ui.separator();
                ui.small("F1: Toggle HUD | LMB drag: Orbit | Wheel: Zoom");
            });
    }
}

/// GPU and window objects, created once the event loop is running.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(
        event_loop: &ActiveEventLoop,
        egui_ctx: &EguiContext,
        shaders: &ShaderSources,
        scene: &SceneDescription,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Cityscape")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("find adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cityscape_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(
            &device,
            &queue,
            surface_format,
            config.width,
            config.height,
            shaders,
            scene,
        );

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn draw_egui(
        &mut self,
        egui_ctx: &EguiContext,
        view: &wgpu::TextureView,
        state: &mut AppState,
    ) {
        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });

        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

struct GpuApp {
    state: AppState,
    shaders: ShaderSources,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(config: CityConfig, shaders: ShaderSources) -> Self {
        Self {
            state: AppState::new(config),
            shaders,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        // The world only steps for frames that are actually presented.
        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(e) => {
                match recovery_for(&e) {
                    SurfaceRecovery::Reconfigure => {
                        tracing::debug!("surface {e}, reconfiguring");
                        gpu.surface.configure(&gpu.device, &gpu.config);
                    }
                    SurfaceRecovery::SkipFrame => tracing::warn!("surface error: {e}"),
                    SurfaceRecovery::Exit => {
                        tracing::error!("surface error: {e}");
                        event_loop.exit();
                        return;
                    }
                }
                gpu.window.request_redraw();
                return;
            }
        };

        self.state.update();

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &view,
            &self.state.camera,
            &self.state.city.scene,
            &self.state.city.world,
        );

        gpu.draw_egui(&self.egui_ctx, &view, &mut self.state);

        output.present();

        if self.state.take_regenerate() {
            gpu.renderer.set_scene(&gpu.device, &self.state.city.scene);
        }

        gpu.window.request_redraw();
    }
}

/// What the frame loop does when the swapchain texture cannot be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceRecovery {
    Reconfigure,
    SkipFrame,
    Exit,
}

fn recovery_for(error: &wgpu::SurfaceError) -> SurfaceRecovery {
    match error {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceRecovery::Reconfigure,
        wgpu::SurfaceError::OutOfMemory => SurfaceRecovery::Exit,
        _ => SurfaceRecovery::SkipFrame,
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match Gpu::new(event_loop, &self.egui_ctx, &self.shaders, &self.state.city.scene) {
            Ok(gpu) => {
                self.state.camera.aspect = gpu.aspect();
                gpu.window.request_redraw();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                    self.state.camera.aspect = gpu.aspect();
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if key == KeyCode::Escape {
                    event_loop.exit();
                } else {
                    self.state.handle_key(key);
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: btn_state,
                ..
            } => {
                self.state.dragging = btn_state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.handle_cursor(position.x, position.y);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
                };
                self.state.camera.zoom(steps);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn load_config(cli: &Cli) -> Result<CityConfig> {
    let mut config = match &cli.config {
        Some(path) => CityConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => CityConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    tracing::info!("cityscape-desktop starting");

    let config = load_config(&cli)?;

    // Phase 1: every shader must load before anything is built.
    let source = FsSource::new(&cli.resources);
    let bundle = pollster::block_on(load_resources(&ResourceList::default(), &source))
        .context("loading startup resources")?;
    let shaders = ShaderSources::from_bundle(&bundle)?;

    // Phase 2: build the city and run.
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config, shaders);
    event_loop.run_app(&mut app)?;

    Ok(())
}
