use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::sync::RunFlag;
use crate::time::{FrameClock, RateCounter};

use super::pacing::{FramePacer, Pace};
use super::presenter::Presenter;

/// Once-per-second throughput figures handed to the report callback.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Throughput {
    pub frames_per_sec: f64,
    pub strokes_per_sec: f64,
}

const REPORT_WINDOW: Duration = Duration::from_secs(1);

/// The presentation thread: paces frames at the presenter's period until the
/// run flag clears or the surface fails fatally.
pub struct PresentRuntime {
    run: Arc<RunFlag>,
    join_handle: Option<JoinHandle<()>>,
}

impl PresentRuntime {
    pub fn spawn<F>(
        presenter: Arc<Presenter>,
        run: Arc<RunFlag>,
        strokes_drawn: Arc<AtomicU64>,
        mut on_report: F,
    ) -> Result<Self>
    where
        F: FnMut(Throughput) + Send + 'static,
    {
        let worker_run = Arc::clone(&run);
        let join_handle = std::thread::Builder::new()
            .name("inkpad-present".to_owned())
            .spawn(move || {
                log::debug!("presentation thread started");
                let mut clock = FrameClock::new();
                let mut pacer = FramePacer::new(presenter.config().frame_period);
                let start = Instant::now();
                let mut fps = RateCounter::starting_at(start, REPORT_WINDOW);
                let mut strokes = RateCounter::starting_at(start, REPORT_WINDOW);

                while worker_run.is_running() {
                    let ft = clock.tick();
                    match pacer.advance(ft.dt) {
                        Pace::Sleep(remaining) => {
                            if !worker_run.sleep(remaining) {
                                break;
                            }
                        }
                        Pace::Render => {
                            if let Err(e) = presenter.render_frame() {
                                log::error!("presentation stopped: {e:#}");
                                break;
                            }
                        }
                    }

                    let now = Instant::now();
                    if let Some(frames_per_sec) = fps.sample(now, presenter.frames_presented()) {
                        let strokes_per_sec = strokes
                            .sample(now, strokes_drawn.load(Ordering::Relaxed))
                            .unwrap_or(0.0);
                        on_report(Throughput {
                            frames_per_sec,
                            strokes_per_sec,
                        });
                    }
                }
                log::debug!("presentation thread stopped");
            })
            .context("failed to spawn presentation thread")?;

        Ok(Self {
            run,
            join_handle: Some(join_handle),
        })
    }

    /// Clears the run flag (interrupting any pacing sleep) and joins.
    pub fn shutdown(&mut self) {
        let Some(join_handle) = self.join_handle.take() else {
            return;
        };
        self.run.stop();
        if join_handle.join().is_err() {
            log::error!("presentation thread panicked");
        }
    }
}

impl Drop for PresentRuntime {
    fn drop(&mut self) {
        self.shutdown();
    }
}
