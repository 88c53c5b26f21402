//! Primitive types - Props, callbacks and cleanup.

use std::rc::Rc;

use spark_signals::Signal;

use crate::config::OtpConfig;

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by components.
///
/// Call this to unmount the component and release resources.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Callback Types
// =============================================================================

/// Receives the full joined code on every accepted change.
pub type OtpChangeCallback = Rc<dyn Fn(&str)>;

/// A cell reports new text for its slot.
pub type CellTextCallback = Rc<dyn Fn(usize, &str)>;

/// A cell reports a key press in its slot.
pub type CellKeyCallback = Rc<dyn Fn(usize, &str)>;

/// A cell reports that its slot gained or lost focus.
pub type CellFocusCallback = Rc<dyn Fn(usize)>;

// =============================================================================
// Props
// =============================================================================

/// Properties for a single digit cell.
///
/// The cell reads `value` and forwards everything else upward.
#[derive(Clone)]
pub struct DigitCellProps {
    /// Slot number within the row.
    pub slot: usize,
    /// Component index of the owning row.
    pub parent: Option<usize>,
    pub id: Option<String>,
    pub value: Signal<Option<char>>,
    /// Drop non-digit keystrokes before they are reported.
    pub numeric_keyboard: bool,
    pub on_change_text: CellTextCallback,
    pub on_key_press: CellKeyCallback,
    pub on_focus: CellFocusCallback,
    pub on_blur: CellFocusCallback,
}

/// Properties for an OTP row.
#[derive(Clone, Default)]
pub struct OtpInputProps {
    pub config: OtpConfig,
    pub on_change_otp: Option<OtpChangeCallback>,
    /// Component id of the row; cell ids derive from it.
    pub id: Option<String>,
}

impl OtpInputProps {
    pub fn new(config: OtpConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Set the change callback.
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + 'static,
    {
        self.on_change_otp = Some(Rc::new(callback));
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}
