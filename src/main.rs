//! Vibebox - An audio-reactive point-cloud box
//!
//! The microphone's bass and overall level push and swell a box of points
//! while a keyboard panel reshapes it live.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use vibebox::audio::{request_capture, PendingCapture};
use vibebox::cli::Args;
use vibebox::controller::VisualizationController;
use vibebox::panel::{self, PanelAction};
use vibebox::params::{AnalyserConfig, RenderConfig};
use vibebox::presets::PresetTable;
use vibebox::rendering::RenderSystem;
use vibebox::schedule::AutoCycle;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    render_config: RenderConfig,

    controller: VisualizationController,
    auto_cycle: AutoCycle,
    /// Outstanding microphone request, dropped once resolved
    capture: Option<PendingCapture>,
}

impl App {
    fn update_title(&self) {
        if let Some(window) = &self.window {
            window.set_title(&format!("Vibebox - {}", self.controller.status_line()));
        }
    }

    /// Attach the analyser once the capture request resolves
    fn poll_capture(&mut self) {
        let Some(pending) = self.capture.as_mut() else {
            return;
        };
        let Some(result) = pending.poll() else {
            return;
        };
        self.capture = None;

        if let Ok(handle) = &result {
            log::info!("Microphone capture active on '{}'", handle.device_name());
        }
        self.controller.resolve_capture(result);
        self.update_title();
    }

    /// Advance and present a single frame
    fn render_frame(&mut self) {
        self.poll_capture();

        if self.auto_cycle.run(Instant::now(), &mut self.controller) {
            self.update_title();
        }

        let Some(render_system) = self.render_system.as_mut() else {
            return;
        };
        self.controller.tick(render_system);
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let window_attributes = Window::default_attributes()
            .with_title("Vibebox")
            .with_transparent(true)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let render_system = match pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            self.render_config.clone(),
        )) {
            Ok(render_system) => render_system,
            Err(e) => {
                log::error!("Failed to initialize renderer: {}", e);
                event_loop.exit();
                return;
            }
        };

        log::info!("Vibebox is running (Esc to quit)");

        self.window = Some(window);
        self.render_system = Some(render_system);
        self.update_title();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(render_system) = self.render_system.as_mut() {
                    render_system.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(key),
                        ..
                    },
                ..
            } => match panel::action_for(key) {
                Some(PanelAction::Quit) => event_loop.exit(),
                Some(action) => {
                    let now = Instant::now();
                    panel::apply(action, &mut self.controller, &mut self.auto_cycle, now);
                    self.update_title();
                }
                None => {}
            },
            WindowEvent::RedrawRequested => self.render_frame(),
            _ => {}
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    if args.dump_presets {
        println!("{}", PresetTable::builtin().to_json()?);
        return Ok(());
    }

    let table = args.load_presets()?;
    let initial = args.initial_preset(&table)?;
    log::info!("Loaded {} presets", table.len());

    let mut controller = VisualizationController::new(table);
    if args.random {
        controller.activate_random_preset();
    } else if initial != 0 {
        controller.activate_preset(initial);
    }
    controller.set_rotation(args.rotate);

    let capture = if args.no_capture {
        log::info!("Microphone capture disabled");
        None
    } else {
        Some(request_capture(AnalyserConfig::default()))
    };

    let mut app = App {
        window: None,
        render_system: None,
        render_config: args.render_config(),
        controller,
        auto_cycle: args.create_auto_cycle(Instant::now()),
        capture,
    };

    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
