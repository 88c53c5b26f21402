//! Focus System - Keyboard navigation and focus state
//!
//! Manages focus state and navigation:
//! - `focused_index` signal (currently focused component)
//! - Focus cycling (Tab/Shift+Tab) in tab-index order
//! - Focus callbacks (on_focus/on_blur)
//!
//! Callbacks are allowed to move focus again. The OTP row relies on this: a
//! tap past the first empty slot fires `on_focus`, which redirects focus.
//!
//! # Example
//!
//! ```ignore
//! use spark_otp::state::focus;
//!
//! // Navigate with Tab
//! focus::focus_next();
//! focus::focus_previous();
//!
//! // Focus specific component
//! focus::focus(component_index);
//!
//! // Register callbacks
//! let cleanup = focus::register_callbacks(index, FocusCallbacks {
//!     on_focus: Some(Rc::new(|| tracing::debug!("focused"))),
//!     on_blur: None,
//! });
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use spark_signals::{signal, Signal};

use crate::engine::{get_allocated_indices, get_focusable, get_tab_index, get_visible};

// =============================================================================
// FOCUSED INDEX SIGNAL
// =============================================================================

thread_local! {
    static FOCUSED_INDEX: Signal<Option<usize>> = signal(None);
}

/// Get the currently focused component index
pub fn get_focused_index() -> Option<usize> {
    FOCUSED_INDEX.with(|s| s.get())
}

/// The focused index signal itself, for deriveds that re-render on focus.
pub fn focused_index_signal() -> Signal<Option<usize>> {
    FOCUSED_INDEX.with(|s| s.clone())
}

/// Check if any component is focused
pub fn has_focus() -> bool {
    get_focused_index().is_some()
}

/// Check if specific component is focused
pub fn is_focused(index: usize) -> bool {
    get_focused_index() == Some(index)
}

// =============================================================================
// FOCUS CALLBACKS
// =============================================================================

/// Callbacks fired when focus changes
#[derive(Clone, Default)]
pub struct FocusCallbacks {
    pub on_focus: Option<Rc<dyn Fn()>>,
    pub on_blur: Option<Rc<dyn Fn()>>,
}

#[derive(Default)]
struct CallbackRegistry {
    by_index: HashMap<usize, Vec<(usize, FocusCallbacks)>>,
    next_id: usize,
}

thread_local! {
    static FOCUS_CALLBACK_REGISTRY: RefCell<CallbackRegistry> = RefCell::new(CallbackRegistry::default());
}

/// Register focus callbacks for a component.
/// Returns cleanup function to unregister.
pub fn register_callbacks(index: usize, callbacks: FocusCallbacks) -> impl FnOnce() {
    let callback_id = FOCUS_CALLBACK_REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.by_index.entry(index).or_default().push((id, callbacks));
        id
    });

    move || {
        FOCUS_CALLBACK_REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(list) = reg.by_index.get_mut(&index) {
                list.retain(|(id, _)| *id != callback_id);
                if list.is_empty() {
                    reg.by_index.remove(&index);
                }
            }
        });
    }
}

fn callbacks_for(index: usize) -> Vec<FocusCallbacks> {
    FOCUS_CALLBACK_REGISTRY.with(|reg| {
        reg.borrow()
            .by_index
            .get(&index)
            .map(|list| list.iter().map(|(_, cb)| cb.clone()).collect())
            .unwrap_or_default()
    })
}

/// Set focus and fire callbacks: blur on the old index, then focus on the new.
fn set_focus_with_callbacks(new_index: Option<usize>) {
    let old_index = get_focused_index();

    if old_index == new_index {
        return;
    }

    tracing::debug!(?old_index, ?new_index, "focus moved");

    if let Some(old) = old_index {
        for cb in callbacks_for(old) {
            if let Some(on_blur) = cb.on_blur {
                on_blur();
            }
        }
    }

    FOCUSED_INDEX.with(|s| s.set(new_index));

    if let Some(new) = new_index {
        for cb in callbacks_for(new) {
            // A blur or focus callback above may already have moved focus on.
            if !is_focused(new) {
                break;
            }
            if let Some(on_focus) = cb.on_focus {
                on_focus();
            }
        }
    }
}

// =============================================================================
// FOCUSABLE QUERIES
// =============================================================================

fn can_focus(index: usize) -> bool {
    get_focusable(index) && get_visible(index)
}

/// Get all focusable component indices, sorted by tab index
/// (components with the same tab index keep allocation order).
pub fn get_focusable_indices() -> Vec<usize> {
    let mut result: Vec<usize> = get_allocated_indices()
        .into_iter()
        .filter(|&i| can_focus(i))
        .collect();
    result.sort_by_key(|&i| (get_tab_index(i), i));
    result
}

// =============================================================================
// FOCUS NAVIGATION
// =============================================================================

/// Find the neighbour of `from` in tab order, wrapping at both ends.
fn find_next_focusable(from: Option<usize>, forward: bool) -> Option<usize> {
    let focusables = get_focusable_indices();
    if focusables.is_empty() {
        return None;
    }

    let current_pos = from.and_then(|index| focusables.iter().position(|&i| i == index));
    let len = focusables.len();
    let next_pos = match (current_pos, forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(pos), true) => (pos + 1) % len,
        (Some(pos), false) => (pos + len - 1) % len,
    };
    Some(focusables[next_pos])
}

fn step_focus(forward: bool) -> bool {
    let current = get_focused_index();
    match find_next_focusable(current, forward) {
        Some(next) if Some(next) != current => {
            set_focus_with_callbacks(Some(next));
            true
        }
        _ => false,
    }
}

/// Move focus to next focusable component
pub fn focus_next() -> bool {
    step_focus(true)
}

/// Move focus to previous focusable component
pub fn focus_previous() -> bool {
    step_focus(false)
}

/// Focus a specific component by index.
/// Returns false when the component cannot take focus.
pub fn focus(index: usize) -> bool {
    if !can_focus(index) {
        return false;
    }
    set_focus_with_callbacks(Some(index));
    true
}

/// Clear focus (no component focused)
pub fn blur() {
    set_focus_with_callbacks(None);
}

/// Clear focus only if `index` holds it.
/// Returns true if focus was cleared.
pub fn blur_index(index: usize) -> bool {
    if is_focused(index) {
        set_focus_with_callbacks(None);
        true
    } else {
        false
    }
}

/// Focus the first focusable component
pub fn focus_first() -> bool {
    get_focusable_indices().first().is_some_and(|&i| focus(i))
}

/// Focus the last focusable component
pub fn focus_last() -> bool {
    get_focusable_indices().last().is_some_and(|&i| focus(i))
}

// =============================================================================
// RESET (for testing)
// =============================================================================

/// Reset all focus state (for testing)
pub fn reset_focus_state() {
    FOCUS_CALLBACK_REGISTRY.with(|reg| *reg.borrow_mut() = CallbackRegistry::default());
    FOCUSED_INDEX.with(|s| s.set(None));
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{allocate_index, reset_registry, set_focusable, set_tab_index, set_visible};
    use std::cell::Cell;

    fn setup() {
        reset_registry();
        reset_focus_state();
    }

    fn focusable(tab_index: i32) -> usize {
        let index = allocate_index(None);
        set_focusable(index, true);
        set_tab_index(index, tab_index);
        index
    }

    #[test]
    fn test_initial_state() {
        setup();
        assert_eq!(get_focused_index(), None);
        assert!(!has_focus());
    }

    #[test]
    fn test_focus_single_component() {
        setup();
        let index = focusable(0);

        assert!(focus(index));
        assert_eq!(get_focused_index(), Some(index));
        assert!(has_focus());
        assert!(is_focused(index));
    }

    #[test]
    fn test_focus_non_focusable() {
        setup();
        let index = allocate_index(None);

        assert!(!focus(index));
        assert_eq!(get_focused_index(), None);

        set_focusable(index, true);
        set_visible(index, false);
        assert!(!focus(index));
    }

    #[test]
    fn test_focus_next_previous_wraps() {
        setup();
        let a = focusable(1);
        let b = focusable(2);
        let c = focusable(3);

        assert!(focus_first());
        assert_eq!(get_focused_index(), Some(a));

        assert!(focus_next());
        assert_eq!(get_focused_index(), Some(b));
        assert!(focus_next());
        assert_eq!(get_focused_index(), Some(c));
        assert!(focus_next());
        assert_eq!(get_focused_index(), Some(a));

        assert!(focus_previous());
        assert_eq!(get_focused_index(), Some(c));
    }

    #[test]
    fn test_tab_index_ordering() {
        setup();
        let a = focusable(30);
        let b = focusable(10);
        let c = focusable(20);

        assert_eq!(get_focusable_indices(), vec![b, c, a]);

        focus_last();
        assert_eq!(get_focused_index(), Some(a));
    }

    #[test]
    fn test_focus_callbacks() {
        setup();
        let a = focusable(0);
        let b = focusable(1);

        let focus_count = Rc::new(Cell::new(0));
        let blur_count = Rc::new(Cell::new(0));
        let f = focus_count.clone();
        let bl = blur_count.clone();

        let cleanup = register_callbacks(
            a,
            FocusCallbacks {
                on_focus: Some(Rc::new(move || f.set(f.get() + 1))),
                on_blur: Some(Rc::new(move || bl.set(bl.get() + 1))),
            },
        );

        focus(a);
        assert_eq!((focus_count.get(), blur_count.get()), (1, 0));

        // Re-focusing the focused component fires nothing
        focus(a);
        assert_eq!((focus_count.get(), blur_count.get()), (1, 0));

        focus(b);
        assert_eq!((focus_count.get(), blur_count.get()), (1, 1));

        cleanup();
        focus(a);
        assert_eq!((focus_count.get(), blur_count.get()), (1, 1));
    }

    #[test]
    fn test_callback_may_redirect_focus() {
        setup();
        let a = focusable(0);
        let b = focusable(1);

        let _cleanup = register_callbacks(
            b,
            FocusCallbacks {
                on_focus: Some(Rc::new(move || {
                    focus(a);
                })),
                on_blur: None,
            },
        );

        assert!(focus(b));
        assert_eq!(get_focused_index(), Some(a));
    }

    #[test]
    fn test_blur_index_only_when_focused() {
        setup();
        let a = focusable(0);
        let b = focusable(1);

        focus(a);
        assert!(!blur_index(b));
        assert_eq!(get_focused_index(), Some(a));

        assert!(blur_index(a));
        assert!(!has_focus());

        focus(b);
        blur();
        assert_eq!(get_focused_index(), None);
    }
}
