//! OTP Controller - the state machine behind an OTP row.
//!
//! Pure: it owns the [`Code`], turns one cell event into the next code and an
//! optional focus move, and touches nothing else. The component in
//! `otp_input` applies the result to signals, the focus system and the
//! scheduler.
//!
//! # Transitions
//!
//! | Event | Condition | Result |
//! |-------|-----------|--------|
//! | `TextChanged(i, t)` | `t` not `^\d?$`, `i` out of range, or slot `i-1` empty | rejected |
//! | `TextChanged(i, t)` | otherwise | slot `i = t`, emit, advance to `i+1` if `t` non-empty |
//! | `KeyPressed(i, Backspace)` | slot `i` filled | clear `i`, emit |
//! | `KeyPressed(i, Backspace)` | slot `i` empty, `i > 0` | clear `i-1`, emit, retreat to `i-1` |
//! | `Focused(i)` | `i` > first empty slot | redirect to the first empty slot, release `i` |

use super::code::{Code, Rejection};

/// An event reported by a digit cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpEvent {
    TextChanged { index: usize, text: String },
    KeyPressed { index: usize, key: String },
    Focused { index: usize },
}

impl OtpEvent {
    pub fn text(index: usize, text: impl Into<String>) -> Self {
        Self::TextChanged {
            index,
            text: text.into(),
        }
    }

    pub fn key(index: usize, key: impl Into<String>) -> Self {
        Self::KeyPressed {
            index,
            key: key.into(),
        }
    }

    pub fn focused(index: usize) -> Self {
        Self::Focused { index }
    }
}

/// Where focus should go after an event. Indices are slots, not components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMove {
    /// A digit was accepted; move on to the next slot.
    Advance { to: usize },
    /// Backspace on an empty slot; move back to the slot it cleared.
    Retreat { to: usize },
    /// A slot past the first gap was focused. Focus `to` now and drop focus
    /// from `release` on the next tick.
    Redirect { to: usize, release: usize },
}

/// Outcome of one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    /// The joined code to hand to the consumer, when the event was accepted.
    pub emitted: Option<String>,
    pub focus: Option<FocusMove>,
    pub rejected: Option<Rejection>,
}

impl Transition {
    fn emit(code: &Code, focus: Option<FocusMove>) -> Self {
        Self {
            emitted: Some(code.as_str().to_string()),
            focus,
            rejected: None,
        }
    }

    fn reject(rejection: Rejection) -> Self {
        Self {
            rejected: Some(rejection),
            ..Self::default()
        }
    }

    fn focus_only(focus: FocusMove) -> Self {
        Self {
            focus: Some(focus),
            ..Self::default()
        }
    }

    /// True when nothing happened.
    pub fn is_noop(&self) -> bool {
        self.emitted.is_none() && self.focus.is_none()
    }
}

/// Owns the code of one OTP row.
#[derive(Debug, Clone)]
pub struct OtpController {
    code: Code,
}

impl OtpController {
    pub fn new(length: usize) -> Self {
        Self {
            code: Code::new(length),
        }
    }

    pub fn code(&self) -> &Code {
        &self.code
    }

    pub fn length(&self) -> usize {
        self.code.length()
    }

    /// Apply one cell event.
    pub fn handle(&mut self, event: OtpEvent) -> Transition {
        match event {
            OtpEvent::TextChanged { index, text } => self.text_changed(index, &text),
            OtpEvent::KeyPressed { index, key } => self.key_pressed(index, &key),
            OtpEvent::Focused { index } => self.focused(index),
        }
    }

    fn text_changed(&mut self, index: usize, text: &str) -> Transition {
        if let Err(rejection) = self.code.set_slot(index, text) {
            tracing::trace!(index, text, %rejection, "text change rejected");
            return Transition::reject(rejection);
        }

        let advance = (!text.is_empty() && index + 1 < self.code.length())
            .then_some(FocusMove::Advance { to: index + 1 });
        tracing::debug!(index, code = self.code.as_str(), ?advance, "slot updated");
        Transition::emit(&self.code, advance)
    }

    fn key_pressed(&mut self, index: usize, key: &str) -> Transition {
        if key != "Backspace" {
            return Transition::default();
        }
        if index >= self.code.length() {
            return Transition::reject(Rejection::OutOfRange);
        }

        if self.code.clear_slot(index) {
            tracing::debug!(index, code = self.code.as_str(), "backspace cleared slot");
            return Transition::emit(&self.code, None);
        }
        if index == 0 {
            return Transition::default();
        }

        // Emitted even when the previous slot was already empty.
        self.code.clear_slot(index - 1);
        tracing::debug!(index, code = self.code.as_str(), "backspace merged into previous slot");
        Transition::emit(&self.code, Some(FocusMove::Retreat { to: index - 1 }))
    }

    fn focused(&mut self, index: usize) -> Transition {
        let target = self.code.first_empty();
        if index > target && index < self.code.length() {
            tracing::debug!(index, target, "focus redirected to first empty slot");
            return Transition::focus_only(FocusMove::Redirect {
                to: target,
                release: index,
            });
        }
        Transition::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller_with(length: usize, digits: &str) -> OtpController {
        let mut controller = OtpController::new(length);
        for (i, c) in digits.chars().enumerate() {
            controller.handle(OtpEvent::text(i, c.to_string()));
        }
        controller
    }

    #[test]
    fn test_typing_emits_and_advances() {
        let mut controller = OtpController::new(4);

        let t = controller.handle(OtpEvent::text(0, "1"));
        assert_eq!(t.emitted.as_deref(), Some("1"));
        assert_eq!(t.focus, Some(FocusMove::Advance { to: 1 }));

        let t = controller.handle(OtpEvent::text(1, "2"));
        assert_eq!(t.emitted.as_deref(), Some("12"));
    }

    #[test]
    fn test_last_slot_does_not_advance() {
        let mut controller = controller_with(3, "12");
        let t = controller.handle(OtpEvent::text(2, "3"));
        assert_eq!(t.emitted.as_deref(), Some("123"));
        assert_eq!(t.focus, None);
        assert!(controller.code().is_complete());
    }

    #[test]
    fn test_rejections_change_nothing() {
        let mut controller = controller_with(4, "1");

        let t = controller.handle(OtpEvent::text(1, "a"));
        assert_eq!(t.rejected, Some(Rejection::NotADigit));
        assert!(t.is_noop());

        let t = controller.handle(OtpEvent::text(2, "3"));
        assert_eq!(t.rejected, Some(Rejection::PreviousSlotEmpty));

        let t = controller.handle(OtpEvent::text(9, "3"));
        assert_eq!(t.rejected, Some(Rejection::OutOfRange));

        assert_eq!(controller.code().as_str(), "1");
    }

    #[test]
    fn test_empty_text_clears_without_advancing() {
        let mut controller = controller_with(4, "12");
        let t = controller.handle(OtpEvent::text(1, ""));
        assert_eq!(t.emitted.as_deref(), Some("1"));
        assert_eq!(t.focus, None);
    }

    #[test]
    fn test_backspace_on_filled_slot() {
        let mut controller = controller_with(4, "12");
        let t = controller.handle(OtpEvent::key(1, "Backspace"));
        assert_eq!(t.emitted.as_deref(), Some("1"));
        assert_eq!(t.focus, None);
    }

    #[test]
    fn test_backspace_on_empty_slot_retreats() {
        let mut controller = controller_with(4, "12");
        let t = controller.handle(OtpEvent::key(2, "Backspace"));
        assert_eq!(t.emitted.as_deref(), Some("1"));
        assert_eq!(t.focus, Some(FocusMove::Retreat { to: 1 }));
    }

    #[test]
    fn test_backspace_on_empty_first_slot_is_noop() {
        let mut controller = OtpController::new(4);
        assert!(controller.handle(OtpEvent::key(0, "Backspace")).is_noop());
    }

    #[test]
    fn test_backspace_past_gap_still_emits() {
        let mut controller = controller_with(4, "1");
        let t = controller.handle(OtpEvent::key(3, "Backspace"));
        assert_eq!(t.emitted.as_deref(), Some("1"));
        assert_eq!(t.focus, Some(FocusMove::Retreat { to: 2 }));
    }

    #[test]
    fn test_other_keys_ignored() {
        let mut controller = controller_with(4, "12");
        assert!(controller.handle(OtpEvent::key(1, "Enter")).is_noop());
        assert_eq!(controller.code().as_str(), "12");
    }

    #[test]
    fn test_focus_correction() {
        let mut controller = controller_with(6, "12");

        // At or before the first empty slot: allowed
        assert!(controller.handle(OtpEvent::focused(0)).is_noop());
        assert!(controller.handle(OtpEvent::focused(2)).is_noop());

        // Past it: redirected
        let t = controller.handle(OtpEvent::focused(4));
        assert_eq!(t.focus, Some(FocusMove::Redirect { to: 2, release: 4 }));
        assert_eq!(t.emitted, None);
    }

    #[test]
    fn test_full_code_never_redirects() {
        let mut controller = controller_with(3, "123");
        for i in 0..3 {
            assert!(controller.handle(OtpEvent::focused(i)).is_noop());
        }
    }

    #[test]
    fn test_identical_text_reemits() {
        let mut controller = controller_with(4, "12");
        let first = controller.handle(OtpEvent::text(1, "2"));
        let second = controller.handle(OtpEvent::text(1, "2"));
        assert_eq!(first, second);
        assert_eq!(second.emitted.as_deref(), Some("12"));
        assert_eq!(controller.code().as_str(), "12");
    }
}
