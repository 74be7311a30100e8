use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx};
use crate::device::Gpu;
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "ember".to_string(),
            initial_size: LogicalSize::new(640.0, 480.0),
        }
    }
}

/// Entry point for the single-window runtime.
///
/// Drives the event loop until the window is closed by the user or the
/// application returns [`AppControl::Exit`]; those are the only exit paths.
/// Window or GPU initialization failure aborts the run with an error so
/// the process can terminate with a non-zero status.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RuntimeConfig, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = RuntimeState {
            config,
            app,
            window: None,
            gpu: None,
            clock: FrameClock::new(),
            failure: None,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        if let Some(err) = state.failure {
            return Err(err);
        }

        Ok(())
    }
}

struct RuntimeState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    app: A,

    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    clock: FrameClock,

    /// Initialization error carried out of the event loop.
    failure: Option<anyhow::Error>,
}

impl<A> RuntimeState<A>
where
    A: App + 'static,
{
    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let gpu = pollster::block_on(Gpu::new(window.clone()))
            .context("GPU initialization failed")?;

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.clock.reset();

        Ok(())
    }
}

impl<A> ApplicationHandler for RuntimeState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init_window(event_loop) {
            log::error!("failed to initialize window: {err:#}");
            self.failure = Some(err);
            event_loop.exit();
            return;
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; presentation is vsync-gated by the surface.
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.app.on_window_event(&event) == AppControl::Exit {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                // The user closed the window; this ends the run.
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(new_size);
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let (Some(window), Some(gpu)) = (self.window.as_ref(), self.gpu.as_mut()) {
                    gpu.resize(window.inner_size());
                    window.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => {
                let (Some(window), Some(gpu)) = (self.window.as_ref(), self.gpu.as_mut()) else {
                    return;
                };

                let time = self.clock.tick();
                let mut ctx = FrameCtx {
                    window: window.as_ref(),
                    gpu,
                    time,
                };

                if self.app.on_frame(&mut ctx) == AppControl::Exit {
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}
