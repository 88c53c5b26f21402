//! Mount API - Terminal lifecycle and render effect for one OTP row.
//!
//! # Example
//!
//! ```ignore
//! use spark_otp::{otp_input, OtpConfig, OtpInputProps};
//! use spark_otp::pipeline::mount;
//!
//! let otp = otp_input(OtpInputProps::new(OtpConfig::new(6)))?;
//! let handle = mount::mount(&otp)?;
//!
//! // Option 1: Run blocking event loop
//! mount::run(&handle)?;
//!
//! // Option 2: Tick manually in your own loop
//! while mount::tick(&handle)? {
//!     if otp.is_complete() { break; }
//! }
//!
//! handle.unmount();
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use spark_signals::effect;

use crate::error::Result;
use crate::primitives::OtpInput;
use crate::renderer::DiffRenderer;
use crate::state::{global_keys, input, mouse, scheduler};
use super::frame::create_frame_derived;
use super::terminal::detect_terminal_size;

/// Longest wait for input between ticks (~60fps).
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by mount() that allows unmounting.
///
/// Dropping the handle restores the terminal too; the mounted [`OtpInput`]
/// stays alive and is unmounted separately.
pub struct MountHandle {
    stop_effect: Option<Box<dyn FnOnce()>>,
    running: Arc<AtomicBool>,
    global_keys: Option<global_keys::GlobalKeysHandle>,
    renderer: Rc<RefCell<DiffRenderer>>,
}

impl MountHandle {
    /// Stop rendering and restore the terminal.
    pub fn unmount(mut self) {
        self.teardown();
    }

    /// Check if still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the event loop (sets running to false).
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn teardown(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.global_keys.take() {
            handle.cleanup();
        }
        let Some(stop) = self.stop_effect.take() else {
            return;
        };
        stop();

        // Best effort: the terminal may already be gone
        let _ = input::disable_capture();
        let _ = self.renderer.borrow_mut().exit_fullscreen();
        let _ = disable_raw_mode();
        tracing::debug!("unmounted");
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// Mount Function
// =============================================================================

/// Mount an OTP row fullscreen.
///
/// This sets up:
/// 1. Terminal size detection, raw mode and the alternate screen
/// 2. Reactive render pipeline (frame derived -> diff renderer)
/// 3. Mouse capture and bracketed paste
/// 4. Global key handlers (Ctrl+C for shutdown, Tab/Shift+Tab for focus)
pub fn mount(otp: &OtpInput) -> Result<MountHandle> {
    let (width, height) = detect_terminal_size();
    tracing::debug!(width, height, length = otp.length(), "mounting");

    enable_raw_mode()?;
    let renderer = Rc::new(RefCell::new(DiffRenderer::new()));
    if let Err(error) = renderer.borrow_mut().enter_fullscreen() {
        let _ = disable_raw_mode();
        return Err(error.into());
    }

    let running = Arc::new(AtomicBool::new(true));
    let frame_derived = create_frame_derived(otp.clone());

    // The ONE render effect
    let effect_running = running.clone();
    let effect_renderer = renderer.clone();
    let stop = effect(move || {
        if !effect_running.load(Ordering::SeqCst) {
            return;
        }
        let frame = frame_derived.get();

        // Side effects: hit grid and terminal output
        mouse::set_hit_grid(frame.hit_grid.clone());
        if let Err(error) = effect_renderer.borrow_mut().render(&frame.buffer) {
            tracing::warn!(%error, "render failed");
        }
    });

    let mut handle = MountHandle {
        stop_effect: Some(Box::new(stop)),
        running: running.clone(),
        global_keys: None,
        renderer,
    };

    input::enable_capture()?;
    handle.global_keys = Some(global_keys::setup_global_keys(running));
    Ok(handle)
}

/// Unmount and clean up.
pub fn unmount(handle: MountHandle) {
    handle.unmount();
}

// =============================================================================
// Event Loop
// =============================================================================

/// How long the next poll may block: a frame, or less when a task is due sooner.
pub fn poll_timeout(now: Instant) -> Duration {
    scheduler::time_until_next(now).map_or(FRAME_INTERVAL, |due| due.min(FRAME_INTERVAL))
}

/// Run the event loop once.
///
/// Polls one event, routes it, then runs every scheduled task that is due.
/// Rendering follows from the signals those steps write.
///
/// * `Ok(true)` - Continue running
/// * `Ok(false)` - Stop requested (Ctrl+C pressed or `handle.stop()` called)
/// * `Err(e)` - I/O error while polling
pub fn tick(handle: &MountHandle) -> Result<bool> {
    if !handle.is_running() {
        return Ok(false);
    }

    if let Some(event) = input::poll_event(poll_timeout(Instant::now()))? {
        input::route_event(event);
    }
    scheduler::run_due();

    Ok(handle.is_running())
}

/// Run the event loop (blocking until stopped).
pub fn run(handle: &MountHandle) -> Result<()> {
    while tick(handle)? {}
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
