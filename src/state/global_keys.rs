//! Global Keys Module - Shortcuts that work regardless of focus.
//!
//! - Ctrl+C: Graceful shutdown
//! - Tab: Focus next slot
//! - Shift+Tab: Focus previous slot
//!
//! Digit cells leave these keys unconsumed, so they fall through to here.
//! Registered on mount and cleaned up on unmount.
//!
//! # Example
//!
//! ```ignore
//! use spark_otp::state::global_keys;
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//!
//! let running = Arc::new(AtomicBool::new(true));
//! let handle = global_keys::setup_global_keys(running.clone());
//!
//! // Later, on cleanup:
//! handle.cleanup();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::focus;
use super::keyboard::{self, KeyboardEvent};

// =============================================================================
// GLOBAL KEYS HANDLE
// =============================================================================

/// Cleanup handle for global key handlers
pub struct GlobalKeysHandle {
    cleanup: Option<Box<dyn FnOnce()>>,
}

impl GlobalKeysHandle {
    /// Clean up all global key handlers
    pub fn cleanup(mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

// =============================================================================
// SETUP
// =============================================================================

fn handle_global_key(event: &KeyboardEvent, running: &AtomicBool) -> bool {
    if !event.is_press() || event.paste {
        return false;
    }
    match event.key.as_str() {
        "c" if event.modifiers.ctrl => {
            tracing::debug!("ctrl+c, stopping");
            running.store(false, Ordering::SeqCst);
            true
        }
        "Tab" if event.modifiers.shift => {
            focus::focus_previous();
            true
        }
        "Tab" => {
            focus::focus_next();
            true
        }
        _ => false,
    }
}

/// Set up global key handlers.
///
/// `running` is cleared on Ctrl+C.
pub fn setup_global_keys(running: Arc<AtomicBool>) -> GlobalKeysHandle {
    let cleanup = keyboard::on(move |event| handle_global_key(event, &running));
    GlobalKeysHandle {
        cleanup: Some(Box::new(cleanup)),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OtpConfig;
    use crate::engine::reset_registry;
    use crate::primitives::{otp_input, OtpEvent, OtpInputProps};
    use crate::state::focus::reset_focus_state;
    use crate::state::keyboard::{reset_keyboard_state, Modifiers};
    use crate::state::scheduler::reset_scheduler;

    fn setup() {
        reset_registry();
        reset_focus_state();
        reset_keyboard_state();
        reset_scheduler();
    }

    #[test]
    fn test_ctrl_c_sets_running_false() {
        setup();

        let running = Arc::new(AtomicBool::new(true));
        let handle = setup_global_keys(running.clone());

        keyboard::dispatch(KeyboardEvent::with_modifiers("c", Modifiers::ctrl()));
        assert!(!running.load(Ordering::SeqCst));

        handle.cleanup();
    }

    #[test]
    fn test_regular_c_does_not_stop() {
        setup();

        let running = Arc::new(AtomicBool::new(true));
        let handle = setup_global_keys(running.clone());

        keyboard::dispatch(KeyboardEvent::new("c"));
        assert!(running.load(Ordering::SeqCst));

        handle.cleanup();
    }

    #[test]
    fn test_cleanup_removes_handlers() {
        setup();

        let running = Arc::new(AtomicBool::new(true));
        let handle = setup_global_keys(running.clone());
        handle.cleanup();

        keyboard::dispatch(KeyboardEvent::with_modifiers("c", Modifiers::ctrl()));
        assert!(running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_tab_moves_between_slots() {
        setup();
        let otp = otp_input(OtpInputProps::new(OtpConfig::new(3))).unwrap();
        let handle = setup_global_keys(Arc::new(AtomicBool::new(true)));

        otp.focus();
        otp.handle_event(OtpEvent::text(0, "1"));
        assert_eq!(otp.focused_slot(), Some(1));

        // Tab falls through the focused cell to the global handler
        keyboard::route(
            focus::get_focused_index(),
            KeyboardEvent::with_modifiers("Tab", Modifiers::shift()),
        );
        assert_eq!(otp.focused_slot(), Some(0));

        keyboard::route(focus::get_focused_index(), KeyboardEvent::new("Tab"));
        assert_eq!(otp.focused_slot(), Some(1));

        handle.cleanup();
        otp.unmount();
    }
}
