//! OTP Input - A row of digit cells sharing one code.
//!
//! The row owns an [`OtpController`] and is the only writer of the code. Cells
//! read a per-slot signal that is written only when that slot changes, so a
//! keystroke re-renders one cell instead of the whole row.
//!
//! Focus moves requested by the controller go through the focus system. An
//! auto-advance is either immediate or a keyed scheduler task, depending on
//! [`FocusTiming`]. A focus redirect schedules a release of the tapped cell
//! for the next tick. Any newer focus move cancels a pending advance, as does
//! the user focusing a slot or the row losing focus. Unmounting cancels
//! everything the row has pending.
//!
//! # Example
//!
//! ```ignore
//! use spark_otp::{otp_input, OtpConfig, OtpInputProps};
//!
//! let otp = otp_input(
//!     OtpInputProps::new(OtpConfig::new(6).with_secure(true))
//!         .on_change(|code| tracing::info!(code, "otp changed")),
//! )?;
//!
//! otp.focus();
//! // ... mount and run ...
//! otp.unmount();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use spark_signals::{signal, Signal};

use crate::config::{FocusTiming, OtpConfig};
use crate::engine::{allocate_index, get_id, release_index, set_component_type};
use crate::error::Result;
use crate::state::focus;
use crate::state::scheduler::{self, TaskKey};
use crate::types::ComponentType;

use super::controller::{FocusMove, OtpController, OtpEvent, Transition};
use super::digit_cell::{digit_cell, CellView};
use super::types::{Cleanup, DigitCellProps, OtpChangeCallback, OtpInputProps};

/// Scheduler channel for the auto-advance focus move.
const ADVANCE_CHANNEL: &str = "advance";
/// Scheduler channel for releasing a redirected cell's focus.
const RELEASE_CHANNEL: &str = "release";

// =============================================================================
// STATE
// =============================================================================

struct OtpState {
    row: usize,
    config: OtpConfig,
    controller: RefCell<OtpController>,
    code: Signal<String>,
    slots: Vec<Signal<Option<char>>>,
    cells: RefCell<Vec<usize>>,
    cleanups: RefCell<Vec<Cleanup>>,
    on_change_otp: Option<OtpChangeCallback>,
    mounted: Cell<bool>,
}

impl OtpState {
    fn advance_key(&self) -> TaskKey {
        TaskKey::new(self.row, ADVANCE_CHANNEL)
    }

    fn release_key(&self) -> TaskKey {
        TaskKey::new(self.row, RELEASE_CHANNEL)
    }

    fn cell(&self, slot: usize) -> Option<usize> {
        self.cells.borrow().get(slot).copied()
    }

    fn slot_of(&self, index: usize) -> Option<usize> {
        self.cells.borrow().iter().position(|&cell| cell == index)
    }

    fn handle(self: &Rc<Self>, event: OtpEvent) -> Transition {
        if !self.mounted.get() {
            return Transition::default();
        }

        let is_focus_event = matches!(event, OtpEvent::Focused { .. });
        let transition = self.controller.borrow_mut().handle(event);

        if let Some(code) = &transition.emitted {
            self.sync_signals();
            if let Some(on_change) = &self.on_change_otp {
                on_change(code);
            }
        }

        match transition.focus {
            Some(focus_move) => self.apply_focus(focus_move),
            // A legitimate focus makes pending focus work stale.
            None if is_focus_event => {
                scheduler::cancel_key(self.release_key());
                scheduler::cancel_key(self.advance_key());
            }
            None => {}
        }

        transition
    }

    /// Push the controller's code into the signals, touching only what changed.
    fn sync_signals(&self) {
        let code = self.controller.borrow().code().clone();

        if self.code.get() != code.as_str() {
            self.code.set(code.as_str().to_string());
        }
        for (slot, signal) in self.slots.iter().enumerate() {
            let value = code.slot(slot);
            if signal.get() != value {
                signal.set(value);
            }
        }
    }

    fn apply_focus(self: &Rc<Self>, focus_move: FocusMove) {
        scheduler::cancel_key(self.advance_key());

        match focus_move {
            FocusMove::Advance { to } => match self.config.advance_timing {
                FocusTiming::Immediate => self.focus_slot(to),
                FocusTiming::Deferred(delay) => {
                    let weak = Rc::downgrade(self);
                    scheduler::schedule_keyed(self.advance_key(), delay, move || {
                        if let Some(state) = weak.upgrade() {
                            state.focus_slot(to);
                        }
                    });
                }
            },
            FocusMove::Retreat { to } => self.focus_slot(to),
            FocusMove::Redirect { to, release } => {
                self.focus_slot(to);
                if let Some(released) = self.cell(release) {
                    scheduler::schedule_keyed(self.release_key(), Duration::ZERO, move || {
                        focus::blur_index(released);
                    });
                }
            }
        }
    }

    /// A cell of this row lost focus; an advance queued from it no longer applies.
    fn cell_blurred(&self, slot: usize) {
        if scheduler::cancel_key(self.advance_key()) {
            tracing::trace!(row = self.row, slot, "pending advance cancelled on blur");
        }
    }

    fn focus_slot(&self, slot: usize) {
        if let Some(index) = self.cell(slot) {
            focus::focus(index);
        }
    }
}

// =============================================================================
// HANDLE
// =============================================================================

/// A mounted OTP row. Cloning shares the same row.
#[derive(Clone)]
pub struct OtpInput {
    state: Rc<OtpState>,
}

impl OtpInput {
    /// Component index of the row.
    pub fn index(&self) -> usize {
        self.state.row
    }

    pub fn config(&self) -> &OtpConfig {
        &self.state.config
    }

    /// Number of slots.
    pub fn length(&self) -> usize {
        self.state.config.length
    }

    /// The joined code.
    pub fn code(&self) -> String {
        self.state.code.get()
    }

    /// Reactive joined code.
    pub fn code_signal(&self) -> Signal<String> {
        self.state.code.clone()
    }

    /// Digit held by `slot`.
    pub fn slot(&self, slot: usize) -> Option<char> {
        self.state.slots.get(slot).and_then(|s| s.get())
    }

    /// Reactive value of one slot. Notifies only when that slot changes.
    pub fn slot_signal(&self, slot: usize) -> Option<Signal<Option<char>>> {
        self.state.slots.get(slot).cloned()
    }

    /// Every slot is filled.
    pub fn is_complete(&self) -> bool {
        self.state.controller.borrow().code().is_complete()
    }

    /// Component index of the cell for `slot`.
    pub fn cell_index(&self, slot: usize) -> Option<usize> {
        self.state.cell(slot)
    }

    /// Component indices of every cell, in slot order.
    pub fn cell_indices(&self) -> Vec<usize> {
        self.state.cells.borrow().clone()
    }

    /// Slot of this row that holds focus.
    pub fn focused_slot(&self) -> Option<usize> {
        focus::get_focused_index().and_then(|index| self.state.slot_of(index))
    }

    /// Everything needed to draw `slot`.
    pub fn cell_view(&self, slot: usize) -> Option<CellView> {
        let value = self.state.slots.get(slot)?.get();
        let index = self.state.cell(slot)?;
        let config = &self.state.config;
        Some(CellView::new(
            slot,
            value,
            focus::is_focused(index),
            config.secure,
            config.mask_char,
            config.input_style,
            config.cursor_color,
        ))
    }

    pub fn cell_views(&self) -> Vec<CellView> {
        (0..self.length())
            .filter_map(|slot| self.cell_view(slot))
            .collect()
    }

    /// Focus the first empty slot (the last slot when the code is complete).
    pub fn focus(&self) -> bool {
        let first_empty = self.state.controller.borrow().code().first_empty();
        let slot = first_empty.min(self.length() - 1);
        self.state.cell(slot).is_some_and(focus::focus)
    }

    /// Feed an event straight into the row, as a cell would.
    pub fn handle_event(&self, event: OtpEvent) -> Transition {
        self.state.handle(event)
    }

    pub fn is_mounted(&self) -> bool {
        self.state.mounted.get()
    }

    /// Tear the row down: cancel pending focus work, drop handlers, release
    /// every component index. Later calls do nothing.
    pub fn unmount(&self) {
        if !self.state.mounted.replace(false) {
            return;
        }

        let cancelled = scheduler::cancel_owner(self.state.row);
        let cleanups: Vec<Cleanup> = self.state.cleanups.borrow_mut().drain(..).collect();
        for cleanup in cleanups {
            cleanup();
        }
        self.state.cells.borrow_mut().clear();
        release_index(self.state.row);

        tracing::debug!(row = self.state.row, cancelled, "otp input unmounted");
    }
}

// =============================================================================
// COMPONENT
// =============================================================================

/// Create an OTP row with `config.length` digit cells.
pub fn otp_input(props: OtpInputProps) -> Result<OtpInput> {
    let OtpInputProps {
        config,
        on_change_otp,
        id,
    } = props;
    config.validate()?;

    let row = allocate_index(id.as_deref());
    set_component_type(row, ComponentType::OtpInput);

    let state = Rc::new(OtpState {
        row,
        controller: RefCell::new(OtpController::new(config.length)),
        code: signal(String::new()),
        slots: (0..config.length).map(|_| signal(None)).collect(),
        cells: RefCell::new(Vec::with_capacity(config.length)),
        cleanups: RefCell::new(Vec::with_capacity(config.length)),
        on_change_otp,
        mounted: Cell::new(true),
        config,
    });

    let row_id = get_id(row).unwrap_or_default();
    let weak: Weak<OtpState> = Rc::downgrade(&state);

    for slot in 0..state.config.length {
        let (on_text, on_key) = (weak.clone(), weak.clone());
        let (on_focus, on_blur) = (weak.clone(), weak.clone());
        let (index, cleanup) = digit_cell(DigitCellProps {
            slot,
            parent: Some(row),
            id: Some(format!("{row_id}-cell-{slot}")),
            value: state.slots[slot].clone(),
            numeric_keyboard: state.config.numeric_keyboard,
            on_change_text: Rc::new(move |slot: usize, text: &str| {
                if let Some(state) = on_text.upgrade() {
                    state.handle(OtpEvent::text(slot, text));
                }
            }),
            on_key_press: Rc::new(move |slot: usize, key: &str| {
                if let Some(state) = on_key.upgrade() {
                    state.handle(OtpEvent::key(slot, key));
                }
            }),
            on_focus: Rc::new(move |slot: usize| {
                if let Some(state) = on_focus.upgrade() {
                    state.handle(OtpEvent::focused(slot));
                }
            }),
            on_blur: Rc::new(move |slot: usize| {
                if let Some(state) = on_blur.upgrade() {
                    state.cell_blurred(slot);
                }
            }),
        });
        state.cells.borrow_mut().push(index);
        state.cleanups.borrow_mut().push(cleanup);
    }

    tracing::debug!(row, length = state.config.length, "otp input created");

    let otp = OtpInput { state };
    if otp.state.config.auto_focus {
        otp.focus();
    }
    Ok(otp)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{get_allocated_count, get_parent_index, reset_registry};
    use crate::state::keyboard::{self, KeyboardEvent};

    fn setup() {
        reset_registry();
        focus::reset_focus_state();
        keyboard::reset_keyboard_state();
        scheduler::reset_scheduler();
    }

    fn recorded(config: OtpConfig) -> (OtpInput, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let otp = otp_input(
            OtpInputProps::new(config).on_change(move |code| sink.borrow_mut().push(code.to_string())),
        )
        .unwrap();
        (otp, log)
    }

    fn type_key(key: &str) -> bool {
        keyboard::route(focus::get_focused_index(), KeyboardEvent::new(key))
    }

    #[test]
    fn test_creates_one_cell_per_slot() {
        setup();
        let otp = otp_input(OtpInputProps::new(OtpConfig::new(4))).unwrap();

        assert_eq!(otp.cell_indices().len(), 4);
        assert_eq!(get_allocated_count(), 5);
        for index in otp.cell_indices() {
            assert_eq!(get_parent_index(index), Some(otp.index()));
        }
        assert_eq!(otp.focused_slot(), None);
    }

    #[test]
    fn test_invalid_config_rejected() {
        setup();
        assert!(otp_input(OtpInputProps::new(OtpConfig::new(0))).is_err());
        assert_eq!(get_allocated_count(), 0);
    }

    #[test]
    fn test_typing_advances_focus() {
        setup();
        let (otp, log) = recorded(OtpConfig::new(4));

        assert!(otp.focus());
        assert_eq!(otp.focused_slot(), Some(0));

        type_key("1");
        type_key("2");
        assert_eq!(otp.code(), "12");
        assert_eq!(otp.focused_slot(), Some(2));
        assert_eq!(*log.borrow(), vec!["1", "12"]);
    }

    #[test]
    fn test_backspace_walks_back() {
        setup();
        let (otp, log) = recorded(OtpConfig::new(4));
        otp.focus();
        type_key("1");
        type_key("2");

        // Slot 2 is empty: clear slot 1 and move there
        type_key("Backspace");
        assert_eq!(otp.code(), "1");
        assert_eq!(otp.focused_slot(), Some(1));

        type_key("Backspace");
        assert_eq!(otp.code(), "");
        assert_eq!(otp.focused_slot(), Some(0));

        // Empty first slot: nothing
        type_key("Backspace");
        assert_eq!(*log.borrow(), vec!["1", "12", "1", ""]);
    }

    #[test]
    fn test_tapping_past_gap_redirects() {
        setup();
        let (otp, _log) = recorded(OtpConfig::new(6));
        otp.focus();
        type_key("1");

        let tapped = otp.cell_index(4).unwrap();
        focus::focus(tapped);
        assert_eq!(otp.focused_slot(), Some(1));

        // The release task finds the tapped cell no longer focused
        assert_eq!(scheduler::pending_count(), 1);
        scheduler::flush();
        assert_eq!(otp.focused_slot(), Some(1));
    }

    #[test]
    fn test_deferred_advance_is_superseded() {
        setup();
        let config = OtpConfig::new(4)
            .with_advance_timing(FocusTiming::Deferred(Duration::from_millis(10)));
        let (otp, _log) = recorded(config);
        otp.focus();

        type_key("1");
        // Focus has not moved yet
        assert_eq!(otp.focused_slot(), Some(0));
        assert_eq!(scheduler::pending_count(), 1);

        // Backspace from the next slot retreats; the newer move wins
        otp.handle_event(OtpEvent::key(1, "Backspace"));
        assert_eq!(scheduler::pending_count(), 0);
        assert_eq!(otp.focused_slot(), Some(0));
    }

    #[test]
    fn test_user_focus_cancels_pending_advance() {
        setup();
        let config = OtpConfig::new(6)
            .with_advance_timing(FocusTiming::Deferred(Duration::from_millis(10)));
        let (otp, _log) = recorded(config);
        otp.focus();
        type_key("1");
        scheduler::flush();
        type_key("2");
        scheduler::flush();

        type_key("3");
        assert_eq!(scheduler::pending_count(), 1);

        // The user taps back to the first slot before the advance runs
        focus::focus(otp.cell_index(0).unwrap());
        assert_eq!(otp.focused_slot(), Some(0));
        assert_eq!(scheduler::pending_count(), 0);

        scheduler::flush();
        assert_eq!(otp.focused_slot(), Some(0));
    }

    #[test]
    fn test_blur_cancels_pending_advance() {
        setup();
        let config = OtpConfig::new(4)
            .with_advance_timing(FocusTiming::Deferred(Duration::from_millis(10)));
        let (otp, _log) = recorded(config);
        otp.focus();
        type_key("1");
        assert_eq!(scheduler::pending_count(), 1);

        focus::blur();
        assert_eq!(scheduler::pending_count(), 0);
        scheduler::flush();
        assert_eq!(otp.focused_slot(), None);
        assert_eq!(otp.code(), "1");
    }

    #[test]
    fn test_deferred_advance_runs() {
        setup();
        let config = OtpConfig::new(4)
            .with_advance_timing(FocusTiming::Deferred(Duration::from_millis(10)));
        let (otp, _log) = recorded(config);
        otp.focus();

        type_key("1");
        scheduler::flush();
        assert_eq!(otp.focused_slot(), Some(1));
    }

    #[test]
    fn test_unmount_cancels_and_releases() {
        setup();
        let config = OtpConfig::new(4)
            .with_advance_timing(FocusTiming::Deferred(Duration::from_millis(10)));
        let (otp, log) = recorded(config);
        otp.focus();
        type_key("1");
        assert_eq!(scheduler::pending_count(), 1);

        otp.unmount();
        assert!(!otp.is_mounted());
        assert_eq!(scheduler::pending_count(), 0);
        assert_eq!(get_allocated_count(), 0);
        assert!(!focus::has_focus());

        // Events after unmount change nothing
        assert!(otp.handle_event(OtpEvent::text(1, "2")).is_noop());
        assert_eq!(*log.borrow(), vec!["1"]);

        otp.unmount();
    }

    #[test]
    fn test_auto_focus() {
        setup();
        let otp = otp_input(OtpInputProps::new(OtpConfig::new(3).with_auto_focus(true))).unwrap();
        assert_eq!(otp.focused_slot(), Some(0));
    }

    #[test]
    fn test_focus_when_complete_targets_last_slot() {
        setup();
        let (otp, _log) = recorded(OtpConfig::new(2));
        otp.focus();
        type_key("1");
        type_key("2");
        assert!(otp.is_complete());

        focus::blur();
        assert!(otp.focus());
        assert_eq!(otp.focused_slot(), Some(1));
    }

    #[test]
    fn test_cell_ids_follow_row_id() {
        setup();
        let otp = otp_input(OtpInputProps::new(OtpConfig::new(2)).with_id("login")).unwrap();
        assert_eq!(
            otp.cell_index(1),
            crate::engine::get_index("login-cell-1")
        );
    }
}
