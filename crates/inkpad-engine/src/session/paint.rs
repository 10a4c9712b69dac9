use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::assets::{load_rgba, load_wgsl};
use crate::canvas::{Canvas, ExportKind};
use crate::coords::Vec2;
use crate::core::{AppControl, Session};
use crate::device::Gpu;
use crate::input::InputEvent;
use crate::present::{PresentRuntime, Presenter, Throughput};
use crate::stroke::{CompositorRuntime, StrokeCompositor};
use crate::sync::{lock, RunFlag, SampleQueue};
use crate::window::RuntimeHandle;

use super::config::SessionConfig;
use super::controls::{Action, Controls};

/// Interactive ink painting: one canvas, one compositor thread, one
/// presentation thread. Input arrives on the event-loop thread.
pub struct PaintSession {
    config: SessionConfig,
    live: Option<Live>,
}

/// Everything that exists between `init` and `shutdown`.
struct Live {
    gpu: Gpu,
    canvas: Arc<Mutex<Canvas>>,
    presenter: Arc<Presenter>,
    samples: Arc<SampleQueue>,
    run: Arc<RunFlag>,
    compositor: CompositorRuntime,
    present: PresentRuntime,
    controls: Controls,
}

impl PaintSession {
    pub fn new(config: SessionConfig) -> Self {
        Self { config, live: None }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn start(&self, window: Arc<Window>, handle: RuntimeHandle) -> Result<Live> {
        let gpu_init = self.config.gpu.clone();
        let (gpu, surface) = pollster::block_on(Gpu::for_window(Arc::clone(&window), &gpu_init))
            .context("GPU initialization failed")?;

        let adapter = gpu.adapter_name();
        let title = format!("{} — {adapter}", self.config.runtime.title);
        window.set_title(&title);
        log::info!("adapter: {adapter}");

        let assets = &self.config.assets;
        let brush = load_rgba(&assets.resolve(&assets.brush)).context("loading brush stamp")?;
        let brush_wgsl =
            load_wgsl(&assets.resolve(&assets.brush_shader)).context("loading brush shader")?;
        let display_wgsl =
            load_wgsl(&assets.resolve(&assets.display_shader)).context("loading display shader")?;

        let mut canvas = Canvas::create(&gpu, self.config.canvas.clone(), &brush_wgsl)?;
        canvas.clear().context("initial canvas clear")?;

        let compositor =
            StrokeCompositor::new(&gpu, &canvas, &brush, self.config.compositor.clone())?;

        let presenter = Arc::new(Presenter::new(
            &gpu,
            gpu_init,
            canvas.display(),
            display_wgsl,
            self.config.present.clone(),
        ));
        let window_size = window.inner_size();
        presenter.bind_surface(surface, window_size)?;

        let controls = Controls::new(
            self.config.compositor.samples_per_pixel,
            canvas.size(),
            physical_to_vec(window_size),
        );

        let run = Arc::new(RunFlag::new());
        let samples = Arc::new(SampleQueue::new(Arc::clone(&run)));
        let strokes_drawn = Arc::new(AtomicU64::new(0));
        let canvas = Arc::new(Mutex::new(canvas));

        let compositor = CompositorRuntime::spawn(
            compositor,
            Arc::clone(&canvas),
            Arc::clone(&samples),
            Arc::clone(&run),
            Arc::clone(&strokes_drawn),
        )?;

        let present = PresentRuntime::spawn(
            Arc::clone(&presenter),
            Arc::clone(&run),
            strokes_drawn,
            title_reporter(title, handle),
        )?;

        log::info!("paint session started");
        Ok(Live {
            gpu,
            canvas,
            presenter,
            samples,
            run,
            compositor,
            present,
            controls,
        })
    }

    fn export_path(&self, kind: ExportKind) -> PathBuf {
        self.config
            .export_dir
            .join(format!("canvas.{}", kind.extension()))
    }
}

impl Live {
    fn clear(&self) {
        let mut canvas = lock(&self.canvas);
        match canvas.clear() {
            Ok(()) => log::info!("canvas cleared"),
            Err(e) => log::error!("canvas clear failed: {e:#}"),
        }
    }

    /// Swaps in a blank canvas of the new size. The presenter picks up the
    /// new display image on its next frame.
    fn resize_canvas(&mut self, width: u32, height: u32) {
        let resized = {
            let mut canvas = lock(&self.canvas);
            canvas.resize(width, height).map(|()| canvas.size())
        };
        match resized {
            Ok(size) => {
                self.controls.set_canvas_size(size);
                self.presenter.set_view(self.controls.view());
            }
            Err(e) => log::error!("canvas resize to {width}x{height} failed: {e:#}"),
        }
    }

    fn export(&self, path: PathBuf, kind: ExportKind) {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(dir) {
                log::error!("cannot create export directory {}: {e}", dir.display());
                return;
            }
        }
        let mut canvas = lock(&self.canvas);
        if let Err(e) = canvas.export(&path, kind) {
            log::error!("export to {} failed: {e:#}", path.display());
        }
    }
}

impl Session for PaintSession {
    fn init(&mut self, window: Arc<Window>, handle: RuntimeHandle) -> Result<()> {
        let live = self.start(window, handle)?;
        self.live = Some(live);
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let Some(live) = self.live.as_mut() else {
            return;
        };
        live.controls.set_window_size(physical_to_vec(size));
        if let Err(e) = live.presenter.on_resize(size) {
            log::warn!("resize to {}x{} failed: {e:#}", size.width, size.height);
        }
    }

    fn on_input(&mut self, event: InputEvent) -> AppControl {
        let Some(action) = self.live.as_mut().and_then(|l| l.controls.handle(event)) else {
            return AppControl::Continue;
        };
        let export_path = match &action {
            Action::Export(kind) => Some(self.export_path(*kind)),
            _ => None,
        };
        let Some(live) = self.live.as_mut() else {
            return AppControl::Continue;
        };

        match action {
            Action::Paint(dabs) => live.samples.push_many(dabs),
            Action::ViewChanged(view) => live.presenter.set_view(view),
            Action::Clear => live.clear(),
            Action::ResizeCanvas { width, height } => live.resize_canvas(width, height),
            Action::Export(kind) => {
                if let Some(path) = export_path {
                    live.export(path, kind);
                }
            }
            Action::Quit => return AppControl::Exit,
        }
        AppControl::Continue
    }

    /// Stops both workers, retires the surface and idles the device. No GPU
    /// work is issued after this starts.
    fn shutdown(&mut self) {
        let Some(mut live) = self.live.take() else {
            return;
        };
        live.run.stop();
        live.samples.wake_all();
        live.compositor.shutdown();
        live.present.shutdown();
        live.presenter.terminate();
        live.gpu.wait_idle();
        log::info!("paint session stopped");
    }
}

fn physical_to_vec(size: PhysicalSize<u32>) -> Vec2 {
    Vec2::new(size.width as f32, size.height as f32)
}

/// The presentation thread's report callback. It formats the title and posts
/// it; the event-loop thread is the only one that touches the window.
fn title_reporter(base: String, handle: RuntimeHandle) -> impl FnMut(Throughput) + Send + 'static {
    move |t| {
        let line = throughput_title(&base, t);
        log::debug!("{line}");
        if !handle.set_title(line) {
            log::trace!("event loop gone, title update dropped");
        }
    }
}

fn throughput_title(base: &str, t: Throughput) -> String {
    format!(
        "{base} — {:.0} fps — {:.0} stroke/sec",
        t.frames_per_sec, t.strokes_per_sec
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::RuntimeEvent;
    use std::thread;

    #[test]
    fn throughput_title_rounds_rates() {
        let t = Throughput {
            frames_per_sec: 59.6,
            strokes_per_sec: 1234.4,
        };
        assert_eq!(
            throughput_title("inkpad", t),
            "inkpad — 60 fps — 1234 stroke/sec"
        );
    }

    #[test]
    fn report_posts_title_to_event_thread() {
        let (handle, events) = RuntimeHandle::channel();
        let mut report = title_reporter("inkpad".to_owned(), handle);
        let t = Throughput {
            frames_per_sec: 30.0,
            strokes_per_sec: 0.0,
        };

        thread::spawn(move || report(t)).join().unwrap();

        assert_eq!(
            events.try_recv().unwrap(),
            RuntimeEvent::SetTitle("inkpad — 30 fps — 0 stroke/sec".to_owned())
        );
    }

    #[test]
    fn report_after_event_loop_exit_is_harmless() {
        let (handle, events) = RuntimeHandle::channel();
        drop(events);
        let mut report = title_reporter("inkpad".to_owned(), handle);
        report(Throughput {
            frames_per_sec: 1.0,
            strokes_per_sec: 1.0,
        });
    }
}
