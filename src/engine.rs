//! The render engine: lifecycle, worker management and progress.
//!
//! # Overview
//!
//! [`Engine`] drives a render of one [`PreparedScene`] into one
//! [`RenderBuffer`]. It owns the state machine
//!
//! ```text
//! Ready ──begin──▶ Initializing ──▶ Rendering ──drain──▶ Completed
//!                                  │  ▲    │
//!                             pause│  │resume
//!                                  ▼  │    │abort
//!                                 Paused ──┴──▶ Aborted
//! ```
//!
//! Transitions are serialized by a single lock; worker threads observe
//! the state at tile and sample boundaries, so `pause` and `abort`
//! take effect within one pixel sample. Worker panics are captured,
//! counted on the progress interface and abort the render rather than
//! poisoning anything.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use log::{info, warn};
use parking_lot::{Condvar, Mutex};

use crate::errors::{PrismError, Result};
use crate::prepared::PreparedScene;
use crate::render::worker::{worker_main, WorkerConfig};
use crate::render::{evaluator, tile, Progress, ProgressSnapshot, RenderBuffer, RenderProfile};

/// The lifecycle states of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// `begin` is preparing the work queue.
    Initializing,
    /// No render has started yet.
    Ready,
    Rendering,
    Paused,
    /// The last render drained its tiles.
    Completed,
    Aborted,
}

/// Shared state machine between the engine and its workers.
pub(crate) struct RenderControl {
    state: Mutex<EngineState>,
    changed: Condvar,
    active_workers: AtomicUsize,
}

impl RenderControl {
    fn new() -> Self {
        Self {
            state: Mutex::new(EngineState::Ready),
            changed: Condvar::new(),
            active_workers: AtomicUsize::new(0),
        }
    }

    pub(crate) fn state(&self) -> EngineState {
        *self.state.lock()
    }

    /// Worker-side poll point: blocks while paused, reports whether the
    /// render is still live.
    pub(crate) fn checkpoint(&self) -> bool {
        let mut state = self.state.lock();
        loop {
            match *state {
                EngineState::Paused => self.changed.wait(&mut state),
                EngineState::Aborted => return false,
                _ => return true,
            }
        }
    }

    fn transition(
        &self,
        operation: &'static str,
        from: &[EngineState],
        to: EngineState,
    ) -> Result<()> {
        let mut state = self.state.lock();
        if !from.contains(&state) {
            return Err(PrismError::InvalidState {
                operation,
                state: *state,
            });
        }
        *state = to;
        self.changed.notify_all();
        Ok(())
    }

    pub(crate) fn abort_from_worker(&self) {
        let mut state = self.state.lock();
        if matches!(*state, EngineState::Rendering | EngineState::Paused) {
            *state = EngineState::Aborted;
            self.changed.notify_all();
        }
    }

    /// Called by every worker on exit; the last one out flips the
    /// state to completed.
    pub(crate) fn worker_finished(&self) {
        if self.active_workers.fetch_sub(1, Ordering::AcqRel) == 1 {
            let mut state = self.state.lock();
            if matches!(*state, EngineState::Rendering | EngineState::Paused) {
                *state = EngineState::Completed;
            }
            self.changed.notify_all();
        }
    }
}

/// Drives renders of a prepared scene into a render buffer.
pub struct Engine {
    scene: Arc<PreparedScene>,
    buffer: Arc<RenderBuffer>,
    control: Arc<RenderControl>,
    progress: Arc<Progress>,
    workers: Vec<JoinHandle<()>>,
}

impl Engine {
    #[must_use]
    pub fn new(scene: Arc<PreparedScene>, buffer: Arc<RenderBuffer>) -> Self {
        Self {
            scene,
            buffer,
            control: Arc::new(RenderControl::new()),
            progress: Arc::new(Progress::default()),
            workers: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        self.control.state()
    }

    #[must_use]
    pub fn buffer(&self) -> &Arc<RenderBuffer> {
        &self.buffer
    }

    #[must_use]
    pub fn scene(&self) -> &Arc<PreparedScene> {
        &self.scene
    }

    /// Starts a render. Legal from `Ready` and from a finished render;
    /// illegal while one is in flight.
    pub fn begin(&mut self, profile: RenderProfile) -> Result<()> {
        profile.validate()?;
        self.control.transition(
            "begin",
            &[
                EngineState::Ready,
                EngineState::Completed,
                EngineState::Aborted,
            ],
            EngineState::Initializing,
        )?;
        // Reap the previous render's threads, if any.
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }

        self.buffer.clear();
        let tiles = tile::tile_grid(self.buffer.width(), self.buffer.height(), profile.tile_size);
        let total_pixels = u64::from(self.buffer.width()) * u64::from(self.buffer.height());
        self.progress.reset(total_pixels, tiles.len() as u64);

        let (sender, receiver) = flume::unbounded();
        for t in tiles {
            sender.send(t).expect("tile queue rejected work");
        }
        drop(sender);

        let worker_count = profile.worker_size;
        let evaluator = evaluator::create(&profile);
        self.control
            .active_workers
            .store(worker_count, Ordering::Release);
        // Workers only spawn after this; nobody can observe
        // `Initializing` from inside a worker.
        self.control
            .transition("begin", &[EngineState::Initializing], EngineState::Rendering)?;
        info!(
            "render started: {}x{} buffer, {} workers",
            self.buffer.width(),
            self.buffer.height(),
            worker_count
        );

        for index in 0..worker_count {
            let config = WorkerConfig {
                scene: Arc::clone(&self.scene),
                buffer: Arc::clone(&self.buffer),
                profile: profile.clone(),
                progress: Arc::clone(&self.progress),
                control: Arc::clone(&self.control),
                tiles: receiver.clone(),
                evaluator: Arc::clone(&evaluator),
            };
            let control = Arc::clone(&self.control);
            let progress = Arc::clone(&self.progress);
            let handle = std::thread::Builder::new()
                .name(format!("prism-worker-{index}"))
                .spawn(move || {
                    if catch_unwind(AssertUnwindSafe(|| worker_main(&config))).is_err() {
                        warn!("worker panicked; aborting render");
                        progress.add_worker_panic();
                        control.abort_from_worker();
                    }
                    control.worker_finished();
                })
                .map_err(PrismError::Io)?;
            self.workers.push(handle);
        }
        Ok(())
    }

    /// Suspends the render at the next worker checkpoint.
    pub fn pause(&self) -> Result<()> {
        self.control
            .transition("pause", &[EngineState::Rendering], EngineState::Paused)
    }

    pub fn resume(&self) -> Result<()> {
        self.control
            .transition("resume", &[EngineState::Paused], EngineState::Rendering)
    }

    /// Cancels the render; workers exit at their next checkpoint.
    pub fn abort(&self) -> Result<()> {
        self.control.transition(
            "abort",
            &[EngineState::Rendering, EngineState::Paused],
            EngineState::Aborted,
        )
    }

    /// Blocks until the render leaves the rendering/paused states and
    /// all workers have exited. Returns the terminal state.
    pub fn wait_for_render(&mut self) -> EngineState {
        {
            let mut state = self.control.state.lock();
            while matches!(*state, EngineState::Rendering | EngineState::Paused) {
                self.control.changed.wait(&mut state);
            }
        }
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        let state = self.control.state();
        info!("render finished: {state:?}");
        state
    }

    /// A consistent-enough snapshot of every progress counter.
    #[must_use]
    pub fn progress(&self) -> ProgressSnapshot {
        let stats = self.scene.stats();
        ProgressSnapshot {
            pixels: self.progress.pixels(),
            samples: self.progress.samples(),
            tiles: self.progress.tiles(),
            total_pixels: self.progress.total_pixels(),
            total_tiles: self.progress.total_tiles(),
            traces: stats.traces(),
            occlusions: stats.occlusions(),
            nan_clamps: self.progress.nan_clamps(),
            worker_panics: self.progress.worker_panics(),
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        let _ = self.abort();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}
