use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{AppControl, Session};
use crate::input::WinitInput;

use super::handle::{RuntimeEvent, RuntimeHandle};

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "inkpad".to_string(),
            initial_size: LogicalSize::new(1280.0, 960.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and dispatches its events to `session` until the
    /// window closes or the session asks to exit.
    ///
    /// The session is borrowed for the whole run; no callback state is kept
    /// anywhere else.
    pub fn run<S: Session>(config: RuntimeConfig, session: &mut S) -> Result<()> {
        let event_loop = EventLoop::<RuntimeEvent>::with_user_event()
            .build()
            .context("failed to create winit EventLoop")?;
        let handle = RuntimeHandle::from_proxy(event_loop.create_proxy());
        let mut host = Host::new(config, session, handle);

        event_loop
            .run_app(&mut host)
            .context("winit event loop terminated with error")?;

        host.finish();
        match host.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct Host<'s, S: Session> {
    config: RuntimeConfig,
    session: &'s mut S,
    window: Option<Arc<Window>>,
    handle: RuntimeHandle,
    input: WinitInput,
    failure: Option<anyhow::Error>,
    started: bool,
    finished: bool,
}

impl<'s, S: Session> Host<'s, S> {
    fn new(config: RuntimeConfig, session: &'s mut S, handle: RuntimeHandle) -> Self {
        Self {
            config,
            session,
            window: None,
            handle,
            input: WinitInput::new(),
            failure: None,
            started: false,
            finished: false,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );
        self.window = Some(Arc::clone(&window));
        self.session
            .init(window, self.handle.clone())
            .context("session initialization failed")
    }

    /// Shuts the session down once.
    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.session.shutdown();
        self.window = None;
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        self.finish();
        event_loop.exit();
    }
}

impl<S: Session> ApplicationHandler<RuntimeEvent> for Host<'_, S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;
        event_loop.set_control_flow(ControlFlow::Wait);

        if let Err(e) = self.start(event_loop) {
            log::error!("{e:#}");
            self.failure = Some(e);
            self.exit(event_loop);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.finished {
            return;
        }
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.exit(event_loop);
                return;
            }
            WindowEvent::Resized(size) => {
                self.session.resize(*size);
                return;
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = window.inner_size();
                self.session.resize(size);
                return;
            }
            _ => {}
        }

        let Some(ev) = self.input.translate(&event) else {
            return;
        };
        if self.session.on_input(ev) == AppControl::Exit {
            self.exit(event_loop);
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: RuntimeEvent) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        match event {
            RuntimeEvent::SetTitle(title) => window.set_title(&title),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.finish();
    }
}

