//! Keyboard Module - Keyboard event state and handler registry
//!
//! State and handler registry for keyboard events.
//! Does NOT own stdin (that is the input module).
//!
//! # API
//!
//! - `last_event` - Get last keyboard event
//! - `on(handler)` - Subscribe to all keyboard events
//! - `on_key(key, fn)` - Subscribe to a specific key
//! - `on_focused(i, fn)` - Subscribe when component i has focus
//! - `route(focused, event)` - Focused handlers first, then key and global handlers
//!
//! # Example
//!
//! ```ignore
//! use spark_otp::state::keyboard;
//!
//! let cleanup = keyboard::on_focused(cell_index, |event| {
//!     event.key == "Backspace" // consume backspace only
//! });
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use spark_signals::{signal, Signal};

// =============================================================================
// TYPES
// =============================================================================

/// Keyboard modifier state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Create empty modifiers
    pub fn none() -> Self {
        Self::default()
    }

    /// Create modifiers with ctrl
    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::default() }
    }

    /// Create modifiers with shift
    pub fn shift() -> Self {
        Self { shift: true, ..Self::default() }
    }

    /// True when a modifier that turns a key into a shortcut is held.
    pub fn is_command(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// Key event state (press, repeat, release)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Keyboard event
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    /// The key that was pressed (e.g., "7", "Backspace", "Tab"), or the pasted text
    pub key: String,
    /// Modifier keys state
    pub modifiers: Modifiers,
    /// Press/repeat/release state
    pub state: KeyState,
    /// Set when `key` holds text delivered by a bracketed paste
    pub paste: bool,
}

impl KeyboardEvent {
    /// Create a simple key press event
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
            state: KeyState::Press,
            paste: false,
        }
    }

    /// Create a key press with modifiers
    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            modifiers,
            ..Self::new(key)
        }
    }

    /// Create a paste event carrying `text`
    pub fn paste(text: impl Into<String>) -> Self {
        Self {
            paste: true,
            ..Self::new(text)
        }
    }

    /// Check if this is a press event
    pub fn is_press(&self) -> bool {
        self.state == KeyState::Press
    }

    /// The single printable character this event types, if any.
    pub fn printable_char(&self) -> Option<char> {
        if self.paste || self.modifiers.is_command() {
            return None;
        }
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Some(c),
            _ => None,
        }
    }
}

/// Handler for keyboard events. Return true to consume the event.
pub type KeyHandler = Rc<dyn Fn(&KeyboardEvent) -> bool>;

/// Handler for specific key. Return true to consume the event.
pub type KeySpecificHandler = Rc<dyn Fn() -> bool>;

// =============================================================================
// STATE
// =============================================================================

thread_local! {
    static LAST_EVENT: Signal<Option<KeyboardEvent>> = signal(None);
}

/// Get the last keyboard event
pub fn last_event() -> Option<KeyboardEvent> {
    LAST_EVENT.with(|s| s.get())
}

/// Get the last key pressed
pub fn last_key() -> String {
    last_event().map(|e| e.key).unwrap_or_default()
}

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

#[derive(Default)]
struct HandlerRegistry {
    global_handlers: Vec<(usize, KeyHandler)>,
    key_handlers: HashMap<String, Vec<(usize, KeySpecificHandler)>>,
    focused_handlers: HashMap<usize, Vec<(usize, KeyHandler)>>,
    next_id: usize,
}

impl HandlerRegistry {
    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

thread_local! {
    static REGISTRY: RefCell<HandlerRegistry> = RefCell::new(HandlerRegistry::default());
}

// =============================================================================
// EVENT DISPATCH
// =============================================================================
//
// Handlers are cloned out of the registry before they run, so a handler may
// subscribe or unsubscribe (e.g. unmount a widget) without a double borrow.

/// Dispatch a keyboard event to key-specific and global handlers.
/// Returns true if any handler consumed the event.
pub fn dispatch(event: KeyboardEvent) -> bool {
    LAST_EVENT.with(|s| s.set(Some(event.clone())));

    if !event.is_press() {
        return false;
    }

    dispatch_to_handlers(&event)
}

/// Dispatch to key-specific and global handlers only (not focused).
pub fn dispatch_to_handlers(event: &KeyboardEvent) -> bool {
    let (key_handlers, global_handlers) = REGISTRY.with(|reg| {
        let reg = reg.borrow();
        let key_handlers: Vec<KeySpecificHandler> = if event.paste {
            Vec::new()
        } else {
            reg.key_handlers
                .get(&event.key)
                .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
                .unwrap_or_default()
        };
        let global_handlers: Vec<KeyHandler> =
            reg.global_handlers.iter().map(|(_, h)| h.clone()).collect();
        (key_handlers, global_handlers)
    });

    key_handlers.iter().any(|handler| handler()) || global_handlers.iter().any(|handler| handler(event))
}

/// Dispatch to the handlers of the focused component.
/// Returns true if consumed.
pub fn dispatch_focused(focused_index: Option<usize>, event: &KeyboardEvent) -> bool {
    let Some(index) = focused_index else {
        return false;
    };
    if !event.is_press() {
        return false;
    }

    let handlers: Vec<KeyHandler> = REGISTRY.with(|reg| {
        reg.borrow()
            .focused_handlers
            .get(&index)
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    });

    handlers.iter().any(|handler| handler(event))
}

/// Route an event through the priority chain:
/// focused component, then key-specific handlers, then global handlers.
pub fn route(focused_index: Option<usize>, event: KeyboardEvent) -> bool {
    LAST_EVENT.with(|s| s.set(Some(event.clone())));

    if !event.is_press() {
        return false;
    }

    if dispatch_focused(focused_index, &event) {
        return true;
    }
    dispatch_to_handlers(&event)
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Subscribe to all keyboard events.
/// Return true from handler to consume the event.
/// Returns cleanup function.
pub fn on<F>(handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) -> bool + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.global_handlers.push((id, Rc::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            reg.borrow_mut()
                .global_handlers
                .retain(|(handler_id, _)| *handler_id != id);
        });
    }
}

/// Subscribe to a specific key.
/// Return true to consume the event.
/// Returns cleanup function.
pub fn on_key<F>(key: &str, handler: F) -> impl FnOnce()
where
    F: Fn() -> bool + 'static,
{
    let key = key.to_string();
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.key_handlers
            .entry(key.clone())
            .or_default()
            .push((id, Rc::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(handlers) = reg.key_handlers.get_mut(&key) {
                handlers.retain(|(handler_id, _)| *handler_id != id);
                if handlers.is_empty() {
                    reg.key_handlers.remove(&key);
                }
            }
        });
    }
}

/// Subscribe to events when a specific component has focus.
/// Return true from handler to consume the event.
/// Returns cleanup function.
pub fn on_focused<F>(index: usize, handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) -> bool + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.focused_handlers
            .entry(index)
            .or_default()
            .push((id, Rc::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(handlers) = reg.focused_handlers.get_mut(&index) {
                handlers.retain(|(handler_id, _)| *handler_id != id);
                if handlers.is_empty() {
                    reg.focused_handlers.remove(&index);
                }
            }
        });
    }
}

/// Clean up all focused handlers for a component index.
pub fn cleanup_index(index: usize) {
    REGISTRY.with(|reg| {
        reg.borrow_mut().focused_handlers.remove(&index);
    });
}

/// Reset keyboard state (for testing)
pub fn reset_keyboard_state() {
    REGISTRY.with(|reg| *reg.borrow_mut() = HandlerRegistry::default());
    LAST_EVENT.with(|s| s.set(None));
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn setup() {
        reset_keyboard_state();
    }

    #[test]
    fn test_initial_state() {
        setup();
        assert!(last_event().is_none());
        assert_eq!(last_key(), "");
    }

    #[test]
    fn test_dispatch_updates_state() {
        setup();

        dispatch(KeyboardEvent::new("7"));
        assert_eq!(last_key(), "7");

        dispatch(KeyboardEvent::new("Backspace"));
        assert_eq!(last_key(), "Backspace");
    }

    #[test]
    fn test_printable_char() {
        assert_eq!(KeyboardEvent::new("5").printable_char(), Some('5'));
        assert_eq!(KeyboardEvent::new("a").printable_char(), Some('a'));
        assert_eq!(KeyboardEvent::new("Backspace").printable_char(), None);
        assert_eq!(KeyboardEvent::paste("5").printable_char(), None);
        assert_eq!(
            KeyboardEvent::with_modifiers("c", Modifiers::ctrl()).printable_char(),
            None
        );
        assert_eq!(
            KeyboardEvent::with_modifiers("A", Modifiers::shift()).printable_char(),
            Some('A')
        );
    }

    #[test]
    fn test_focused_before_global() {
        setup();

        let order = Rc::new(RefCell::new(Vec::new()));

        let o = order.clone();
        let _g = on(move |_| {
            o.borrow_mut().push("global");
            false
        });
        let o = order.clone();
        let _f = on_focused(3, move |event| {
            o.borrow_mut().push("focused");
            event.key == "1"
        });

        // Consumed by the focused handler
        assert!(route(Some(3), KeyboardEvent::new("1")));
        assert_eq!(*order.borrow(), vec!["focused"]);

        // Not consumed: falls through to global
        order.borrow_mut().clear();
        assert!(!route(Some(3), KeyboardEvent::new("Tab")));
        assert_eq!(*order.borrow(), vec!["focused", "global"]);

        // Different component focused: focused handler not called
        order.borrow_mut().clear();
        route(Some(4), KeyboardEvent::new("1"));
        assert_eq!(*order.borrow(), vec!["global"]);
    }

    #[test]
    fn test_key_handler_and_cleanup() {
        setup();

        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let cleanup = on_key("Tab", move || {
            c.set(c.get() + 1);
            true
        });

        assert!(dispatch(KeyboardEvent::new("Tab")));
        assert!(!dispatch(KeyboardEvent::new("Enter")));
        assert_eq!(count.get(), 1);

        // Paste text that happens to spell a key name is not that key
        assert!(!dispatch(KeyboardEvent::paste("Tab")));

        cleanup();
        assert!(!dispatch(KeyboardEvent::new("Tab")));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_release_not_dispatched() {
        setup();

        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let _cleanup = on_focused(0, move |_| {
            c.set(c.get() + 1);
            true
        });

        let mut event = KeyboardEvent::new("1");
        event.state = KeyState::Release;
        assert!(!route(Some(0), event));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_handler_may_unsubscribe_itself() {
        setup();

        let slot: Rc<RefCell<Option<Box<dyn FnOnce()>>>> = Rc::new(RefCell::new(None));
        let slot_clone = slot.clone();
        let cleanup = on_focused(1, move |_| {
            if let Some(cleanup) = slot_clone.borrow_mut().take() {
                cleanup();
            }
            true
        });
        *slot.borrow_mut() = Some(Box::new(cleanup));

        assert!(route(Some(1), KeyboardEvent::new("1")));
        assert!(!route(Some(1), KeyboardEvent::new("1")));
    }

    #[test]
    fn test_cleanup_index() {
        setup();

        let _cleanup = on_focused(2, |_| true);
        assert!(dispatch_focused(Some(2), &KeyboardEvent::new("x")));
        cleanup_index(2);
        assert!(!dispatch_focused(Some(2), &KeyboardEvent::new("x")));
        assert!(!dispatch_focused(None, &KeyboardEvent::new("x")));
    }
}
