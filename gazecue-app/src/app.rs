use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ab_glyph::FontVec;
use anyhow::{Context, Result};
use gazecue_core::{CancelToken, SessionPhase, Side};
use gazecue_experiment::{ExperimentConfig, Session, SessionEvent, SessionSummary};
use gazecue_render::SceneRenderer;
use gazecue_timing::MonotonicTimer;
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::ThreadRng;
use tracing::{error, info};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::audio::Sfx;

const WINDOW_WIDTH: f64 = 800.0;
const WINDOW_HEIGHT: f64 = 600.0;
const FONT_PATH: &str = "assets/DejaVuSans.ttf";

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SceneRenderer>,
    /// Loaded up front, handed to the renderer once the surface exists
    font: Option<FontVec>,
    session: Session<MonotonicTimer, ThreadRng>,
    cancel: CancelToken,
    sfx: Sfx,
    scale_factor: f64,
    closing_deadline: Option<Instant>,
    should_exit: bool,
}

impl App {
    pub fn new() -> Result<Self> {
        let font_bytes = std::fs::read(FONT_PATH)
            .with_context(|| format!("missing font asset: {}", FONT_PATH))?;
        let font = FontVec::try_from_vec(font_bytes).context("invalid font data")?;

        let cancel = CancelToken::new();
        let session = Session::new(
            ExperimentConfig::default(),
            MonotonicTimer::new(),
            rand::rng(),
            cancel.clone(),
        );
        let sfx = Sfx::new()?;

        Ok(Self {
            window: None,
            pixels: None,
            renderer: None,
            font: Some(font),
            session,
            cancel,
            sfx,
            scale_factor: 1.0,
            closing_deadline: None,
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            platform = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "gaze cueing task starting"
        );
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("Gaze Cueing Task")
            .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();
        self.scale_factor = window.scale_factor();

        info!(
            width = physical_size.width,
            height = physical_size.height,
            scale = self.scale_factor,
            "display configured"
        );

        let surface_texture = SurfaceTexture::new(
            physical_size.width,
            physical_size.height,
            window.clone(),
        );
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);

        let font = self.font.take().context("font already consumed")?;
        self.renderer = Some(SceneRenderer::new(
            physical_size.width,
            physical_size.height,
            font,
        )?);

        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);

        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (&mut self.pixels, &mut self.renderer) else {
            return Ok(());
        };
        let scene = self.session.scene();
        renderer.render(&scene, pixels.frame_mut());
        pixels.render()?;
        Ok(())
    }

    fn update(&mut self) {
        for event in self.session.tick() {
            match event {
                SessionEvent::ErrorFeedback => self.sfx.play_error_tone(),
                SessionEvent::SaveRequested => self.save_results(),
                _ => {}
            }
        }

        if self.session.phase() == SessionPhase::Closing {
            let deadline = *self.closing_deadline.get_or_insert_with(|| {
                Instant::now() + Duration::from_millis(self.session.config.closing_ms)
            });
            if Instant::now() >= deadline {
                self.should_exit = true;
            }
        }
    }

    fn save_results(&mut self) {
        let records = self.session.results();
        let summary = SessionSummary::from_records(records);
        info!(summary = %summary, "session finished");

        match gazecue_export::write_results(records, Path::new(".")) {
            Ok(Some(paths)) => info!(
                csv = %paths.csv.display(),
                xlsx = %paths.xlsx.display(),
                "results saved"
            ),
            Ok(None) => info!("no main-phase results to save"),
            Err(e) => error!(error = %e, "failed to save results"),
        }

        self.session.handle_event(SessionEvent::ResultsSaved);
    }

    fn handle_input(&mut self, key: PhysicalKey) {
        if let PhysicalKey::Code(code) = key {
            match code {
                KeyCode::KeyF => {
                    self.session.handle_event(SessionEvent::Response(Side::Left));
                }
                KeyCode::KeyJ => {
                    self.session.handle_event(SessionEvent::Response(Side::Right));
                }
                KeyCode::Space => {
                    self.session.handle_event(SessionEvent::Advance);
                }
                KeyCode::Escape => {
                    info!("escape pressed, aborting session");
                    self.cancel.cancel();
                }
                _ => {}
            }
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                error!(error = %e, "failed to resize surface");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                error!(error = %e, "failed to resize buffer");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(new_size.width, new_size.height) {
                error!(error = %e, "failed to resize renderer");
            }
        }
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        info!("experiment window closed");
        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!(error = %e, "failed to create window and surface");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                // Treat a window close like the abort key: save what we
                // have, unless the run is already past the save phase.
                if self.session.phase() == SessionPhase::Closing {
                    self.cleanup_and_exit(event_loop);
                } else {
                    self.cancel.cancel();
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    error!(error = %e, "render error");
                }
                self.update();
                if self.should_exit {
                    self.cleanup_and_exit(event_loop);
                } else if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                self.handle_input(event.physical_key);
            }
            WindowEvent::Resized(new_size) => self.handle_resize(new_size),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
                if let Some(window) = &self.window {
                    self.handle_resize(window.inner_size());
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}
