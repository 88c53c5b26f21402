//! Digit Cell - One focusable slot of an OTP row.
//!
//! A cell owns no state. It reads its slot's value signal when rendered and
//! reports three things to its row: new text, a key press, and focus.
//!
//! Key mapping while focused:
//! - printable character: text change (dropped if the slot is already filled,
//!   or if it is not a digit and the row uses a numeric keyboard)
//! - `Backspace`: key press
//! - `Delete`: text change to ""
//! - pasted text: text change with the pasted text verbatim
//!
//! Everything else is left unconsumed so Tab and Ctrl+C reach the global handlers.
//!
//! # Example
//!
//! ```ignore
//! use spark_otp::primitives::{digit_cell, DigitCellProps};
//!
//! let (index, cleanup) = digit_cell(DigitCellProps {
//!     slot: 0,
//!     parent: Some(row),
//!     id: None,
//!     value: slot_signal,
//!     numeric_keyboard: true,
//!     on_change_text: Rc::new(|slot, text| { /* ... */ }),
//!     on_key_press: Rc::new(|slot, key| { /* ... */ }),
//!     on_focus: Rc::new(|slot| { /* ... */ }),
//!     on_blur: Rc::new(|slot| { /* ... */ }),
//! });
//! ```

use std::rc::Rc;

use crate::config::CellStyle;
use crate::engine::{
    allocate_index, release_index, set_component_type, set_focusable, set_parent_index,
    set_tab_index,
};
use crate::state::focus::{self, FocusCallbacks};
use crate::state::keyboard;
use crate::types::{ComponentType, Rgba};

use super::types::{Cleanup, DigitCellProps};

// =============================================================================
// VIEW
// =============================================================================

/// Everything needed to draw one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    pub slot: usize,
    /// The true digit in the slot.
    pub value: Option<char>,
    /// What the cell shows: the digit, or the mask character when secure.
    pub display: Option<char>,
    pub focused: bool,
    pub secure: bool,
    pub style: CellStyle,
    pub cursor_color: Rgba,
}

impl CellView {
    pub fn new(
        slot: usize,
        value: Option<char>,
        focused: bool,
        secure: bool,
        mask_char: char,
        style: CellStyle,
        cursor_color: Rgba,
    ) -> Self {
        let display = if secure { value.map(|_| mask_char) } else { value };
        Self {
            slot,
            value,
            display,
            focused,
            secure,
            style,
            cursor_color,
        }
    }

    /// Border color for the current focus state.
    pub fn border_color(&self) -> Rgba {
        if self.focused {
            self.style.focused_border_color
        } else {
            self.style.border_color
        }
    }
}

// =============================================================================
// COMPONENT
// =============================================================================

/// Create a digit cell. Returns its component index and a cleanup function.
pub fn digit_cell(props: DigitCellProps) -> (usize, Cleanup) {
    let index = allocate_index(props.id.as_deref());
    set_component_type(index, ComponentType::DigitCell);
    set_parent_index(index, props.parent);
    set_focusable(index, true);
    set_tab_index(index, i32::try_from(props.slot).unwrap_or(i32::MAX));

    let slot = props.slot;

    // ==========================================================================
    // KEYBOARD
    // ==========================================================================

    let value = props.value.clone();
    let numeric = props.numeric_keyboard;
    let on_change_text = props.on_change_text.clone();
    let on_key_press = props.on_key_press.clone();

    let key_cleanup = keyboard::on_focused(index, move |event| {
        if event.paste {
            on_change_text(slot, &event.key);
            return true;
        }

        match event.key.as_str() {
            "Backspace" if !event.modifiers.is_command() => {
                on_key_press(slot, "Backspace");
                true
            }
            "Delete" if !event.modifiers.is_command() => {
                on_change_text(slot, "");
                true
            }
            _ => {
                let Some(c) = event.printable_char() else {
                    return false;
                };
                if value.get().is_some() {
                    tracing::trace!(slot, "keystroke into filled cell dropped");
                } else if numeric && !c.is_ascii_digit() {
                    tracing::trace!(slot, key = %c, "non-digit dropped by numeric keyboard");
                } else {
                    let mut buf = [0u8; 4];
                    on_change_text(slot, c.encode_utf8(&mut buf));
                }
                true
            }
        }
    });

    // ==========================================================================
    // FOCUS
    // ==========================================================================

    let on_focus = props.on_focus.clone();
    let on_blur = props.on_blur.clone();
    let focus_cleanup = focus::register_callbacks(
        index,
        FocusCallbacks {
            on_focus: Some(Rc::new(move || on_focus(slot))),
            on_blur: Some(Rc::new(move || on_blur(slot))),
        },
    );

    // ==========================================================================
    // CLEANUP
    // ==========================================================================

    let cleanup: Cleanup = Box::new(move || {
        key_cleanup();
        keyboard::cleanup_index(index);
        focus_cleanup();
        focus::blur_index(index);
        release_index(index);
    });

    (index, cleanup)
}

// =============================================================================
// TESTS
// =============================================================================
