//! Two-domain session runner.
//!
//! Drives the orchestrator from two independent OS threads: a render-rate
//! loop (~60 Hz) and a safety-rate loop (~1 Hz). The loops never share a
//! scheduling queue, so a stalled render loop cannot suppress safety
//! enforcement. Both measure real elapsed time rather than assuming their
//! nominal period.

use crate::session::orchestrator::SessionOrchestrator;
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Nominal render-loop period (~60 Hz).
const RENDER_PERIOD: Duration = Duration::from_millis(16);

/// Nominal safety-loop period (~1 Hz).
const SAFETY_PERIOD: Duration = Duration::from_millis(1000);

/// Owns the scheduling threads around a [`SessionOrchestrator`].
pub struct SessionRunner {
    session: Arc<Mutex<SessionOrchestrator>>,
    running: Arc<AtomicBool>,
    render_handle: Option<JoinHandle<()>>,
    safety_handle: Option<JoinHandle<()>>,
}

impl SessionRunner {
    /// Wrap an orchestrator for threaded scheduling.
    pub fn new(session: SessionOrchestrator) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            running: Arc::new(AtomicBool::new(false)),
            render_handle: None,
            safety_handle: None,
        }
    }

    /// Shared handle to the orchestrator, for issuing commands and taking
    /// snapshots while the loops run.
    pub fn session(&self) -> Arc<Mutex<SessionOrchestrator>> {
        Arc::clone(&self.session)
    }

    /// Spawn the render and safety loops. No-op if already running.
    pub fn start_loops(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("[RUNNER] Loops already running");
            return;
        }
        info!("[RUNNER] Starting render and safety loops");

        let session = Arc::clone(&self.session);
        let running = Arc::clone(&self.running);
        self.render_handle = Some(std::thread::spawn(move || {
            let mut last = Instant::now();
            while running.load(Ordering::SeqCst) {
                std::thread::sleep(RENDER_PERIOD);
                let now = Instant::now();
                let dt = now.duration_since(last).as_secs_f32();
                last = now;
                session.lock().tick(dt);
            }
        }));

        let session = Arc::clone(&self.session);
        let running = Arc::clone(&self.running);
        self.safety_handle = Some(std::thread::spawn(move || {
            let mut last = Instant::now();
            while running.load(Ordering::SeqCst) {
                std::thread::sleep(SAFETY_PERIOD);
                let now = Instant::now();
                let dt = now.duration_since(last).as_secs_f64();
                last = now;
                session.lock().safety_tick(dt);
            }
        }));
    }

    /// Stop both loops, join their threads, and stop the session.
    /// Idempotent; safe to call without a prior `start_loops()`.
    pub fn stop_loops(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.render_handle.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.safety_handle.take() {
            let _ = handle.join();
        }
        self.session.lock().stop();
        info!("[RUNNER] Loops stopped");
    }

    /// Whether the loops are currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for SessionRunner {
    fn drop(&mut self) {
        self.stop_loops();
    }
}
