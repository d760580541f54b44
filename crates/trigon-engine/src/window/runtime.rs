use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use crate::device::{Gpu, GpuInit};
use crate::frame::{GraphicsEngine, Host, Message};

/// How long `initialize` waits for the platform to hand out a window.
const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Whether the window is shown once created.
    pub visible: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "trigon".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            visible: true,
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Event-handler half of the host, driven by `pump_app_events`.
struct HostState {
    config: RuntimeConfig,
    gpu_init: GpuInit,

    entry: Option<WindowEntry>,
    init_error: Option<anyhow::Error>,

    /// Window events dispatched during the current poll.
    dispatched: usize,
    close_requested: bool,
}

impl HostState {
    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(false)
            .with_visible(self.config.visible);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for window")
    }
}

impl ApplicationHandler for HostState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.init_error.is_some() {
            return;
        }

        event_loop.set_control_flow(ControlFlow::Poll);

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                log::info!("window \"{}\" created", self.config.title);
                self.entry = Some(entry);
            }
            Err(e) => {
                self.init_error = Some(e);
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
        self.dispatched += 1;

        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested");
                self.close_requested = true;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.entry.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                }
            }

            _ => {}
        }
    }
}

/// A single window plus its GPU, polled without blocking.
pub struct WinitHost {
    // Declared before `event_loop` so the window drops first.
    state: HostState,
    event_loop: EventLoop<()>,
}

impl WinitHost {
    /// Creates the event loop, then pumps it until the window and GPU exist.
    pub fn initialize(config: RuntimeConfig, gpu_init: GpuInit) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;

        let mut state = HostState {
            config,
            gpu_init,
            entry: None,
            init_error: None,
            dispatched: 0,
            close_requested: false,
        };

        let deadline = Instant::now() + STARTUP_TIMEOUT;
        while state.entry.is_none() {
            let status = event_loop.pump_app_events(Some(Duration::from_millis(10)), &mut state);

            if let Some(err) = state.init_error.take() {
                return Err(err);
            }
            if let PumpStatus::Exit(code) = status {
                anyhow::bail!("event loop exited with code {code} before a window was created");
            }
            anyhow::ensure!(
                Instant::now() < deadline,
                "no window was created within {STARTUP_TIMEOUT:?}"
            );
        }

        Ok(Self { state, event_loop })
    }

    /// Runs `f` against the GPU, if the window is alive.
    pub fn with_gpu<R>(&self, f: impl FnOnce(&Gpu<'_>) -> R) -> Option<R> {
        self.state.entry.as_ref().map(|entry| entry.with_gpu(|gpu| f(gpu)))
    }
}

impl Host for WinitHost {
    fn poll_message(&mut self) -> Message {
        self.state.dispatched = 0;

        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.state);

        if matches!(status, PumpStatus::Exit(_)) || self.state.close_requested {
            self.state.entry = None;
            return Message::Quit;
        }

        if self.state.dispatched > 0 {
            Message::Handled
        } else {
            Message::Idle
        }
    }

    fn with_engine<R>(&mut self, f: impl FnOnce(&mut dyn GraphicsEngine) -> R) -> Option<R> {
        self.state
            .entry
            .as_mut()
            .map(|entry| entry.with_gpu_mut(|gpu| f(gpu)))
    }
}
