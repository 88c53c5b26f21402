//! Mouse Module - Hit testing and click-to-focus
//!
//! HitGrid for coordinate-to-component lookup, rebuilt by the frame pipeline.
//! A left press on a component focuses it (or its nearest focusable ancestor),
//! which is how a user "taps" a digit cell in the terminal.
//! Does NOT own stdin (that is the input module).
//!
//! # API
//!
//! - `last_event` - Get last mouse event
//! - `hovered_component` - Component under the pointer
//! - `hit_test(x, y)` - Component at a position
//! - `dispatch(event)` - Dispatch mouse event

use std::cell::RefCell;

use spark_signals::{signal, Signal};

use super::focus;
use super::keyboard::Modifiers;
use crate::engine::{get_focusable, get_parent_index};

// =============================================================================
// TYPES
// =============================================================================

/// Mouse action type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Down,
    Up,
    Move,
    Drag,
    Scroll,
}

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    #[default]
    None,
}

/// Mouse event
#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    pub action: MouseAction,
    pub button: MouseButton,
    /// X coordinate (0-indexed)
    pub x: u16,
    /// Y coordinate (0-indexed)
    pub y: u16,
    pub modifiers: Modifiers,
    /// Component index at this position (filled by dispatch)
    pub component_index: Option<usize>,
}

impl MouseEvent {
    /// Create a new mouse event
    pub fn new(action: MouseAction, button: MouseButton, x: u16, y: u16) -> Self {
        Self {
            action,
            button,
            x,
            y,
            modifiers: Modifiers::default(),
            component_index: None,
        }
    }

    /// Create a mouse down event
    pub fn down(button: MouseButton, x: u16, y: u16) -> Self {
        Self::new(MouseAction::Down, button, x, y)
    }

    /// Create a mouse up event
    pub fn up(button: MouseButton, x: u16, y: u16) -> Self {
        Self::new(MouseAction::Up, button, x, y)
    }
}

// =============================================================================
// HIT GRID
// =============================================================================

/// Grid mapping each terminal cell to the component drawn there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitGrid {
    width: u16,
    height: u16,
    cells: Vec<Option<usize>>,
}

impl HitGrid {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    fn offset(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Fill a rectangle with a component index, clipped to the grid.
    pub fn fill_rect(&mut self, x: u16, y: u16, width: u16, height: u16, index: usize) {
        for cy in y..y.saturating_add(height) {
            for cx in x..x.saturating_add(width) {
                if let Some(offset) = self.offset(cx, cy) {
                    self.cells[offset] = Some(index);
                }
            }
        }
    }

    /// Get the component index at a position.
    pub fn get(&self, x: u16, y: u16) -> Option<usize> {
        self.offset(x, y).and_then(|offset| self.cells[offset])
    }
}

thread_local! {
    static HIT_GRID: RefCell<HitGrid> = RefCell::new(HitGrid::new(0, 0));
}

/// Install the hit grid built for the latest frame.
pub fn set_hit_grid(grid: HitGrid) {
    HIT_GRID.with(|g| *g.borrow_mut() = grid);
}

/// Get the component at a position from the global hit grid.
pub fn hit_test(x: u16, y: u16) -> Option<usize> {
    HIT_GRID.with(|g| g.borrow().get(x, y))
}

// =============================================================================
// REACTIVE STATE
// =============================================================================

thread_local! {
    static LAST_EVENT: Signal<Option<MouseEvent>> = signal(None);
    static HOVERED_COMPONENT: Signal<Option<usize>> = signal(None);
}

/// Get the last mouse event
pub fn last_event() -> Option<MouseEvent> {
    LAST_EVENT.with(|s| s.get())
}

/// Get the component under the pointer
pub fn hovered_component() -> Option<usize> {
    HOVERED_COMPONENT.with(|s| s.get())
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Walk up the parent chain to the first focusable component.
fn focus_target(index: usize) -> Option<usize> {
    let mut current = Some(index);
    while let Some(component) = current {
        if get_focusable(component) {
            return Some(component);
        }
        current = get_parent_index(component);
    }
    None
}

/// Dispatch a mouse event. Returns true if it changed focus.
pub fn dispatch(mut event: MouseEvent) -> bool {
    event.component_index = hit_test(event.x, event.y);

    LAST_EVENT.with(|s| s.set(Some(event.clone())));
    if HOVERED_COMPONENT.with(|s| s.get()) != event.component_index {
        HOVERED_COMPONENT.with(|s| s.set(event.component_index));
    }

    if event.action != MouseAction::Down || event.button != MouseButton::Left {
        return false;
    }

    match event.component_index.and_then(focus_target) {
        Some(target) => {
            tracing::debug!(target, x = event.x, y = event.y, "click focus");
            focus::focus(target)
        }
        None => false,
    }
}

/// Reset mouse state (for testing)
pub fn reset_mouse_state() {
    set_hit_grid(HitGrid::new(0, 0));
    LAST_EVENT.with(|s| s.set(None));
    HOVERED_COMPONENT.with(|s| s.set(None));
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{allocate_index, reset_registry, set_focusable, set_parent_index};

    fn setup() {
        reset_registry();
        focus::reset_focus_state();
        reset_mouse_state();
    }

    #[test]
    fn test_hit_grid_fill_and_clip() {
        let mut grid = HitGrid::new(10, 4);
        grid.fill_rect(8, 2, 5, 5, 7);

        assert_eq!(grid.get(8, 2), Some(7));
        assert_eq!(grid.get(9, 3), Some(7));
        assert_eq!(grid.get(7, 2), None);
        assert_eq!(grid.get(10, 3), None);
    }

    #[test]
    fn test_left_click_focuses_component() {
        setup();
        let cell = allocate_index(None);
        set_focusable(cell, true);

        let mut grid = HitGrid::new(20, 5);
        grid.fill_rect(2, 1, 5, 3, cell);
        set_hit_grid(grid);

        // Right click does nothing
        assert!(!dispatch(MouseEvent::down(MouseButton::Right, 3, 2)));
        assert_eq!(focus::get_focused_index(), None);

        assert!(dispatch(MouseEvent::down(MouseButton::Left, 3, 2)));
        assert_eq!(focus::get_focused_index(), Some(cell));
        assert_eq!(hovered_component(), Some(cell));

        // Empty space
        assert!(!dispatch(MouseEvent::down(MouseButton::Left, 15, 0)));
        assert_eq!(last_event().and_then(|e| e.component_index), None);
    }

    #[test]
    fn test_click_bubbles_to_focusable_parent() {
        setup();
        let parent = allocate_index(None);
        let child = allocate_index(None);
        set_focusable(parent, true);
        set_parent_index(child, Some(parent));

        let mut grid = HitGrid::new(4, 1);
        grid.fill_rect(0, 0, 4, 1, child);
        set_hit_grid(grid);

        assert!(dispatch(MouseEvent::down(MouseButton::Left, 1, 0)));
        assert_eq!(focus::get_focused_index(), Some(parent));
    }
}
