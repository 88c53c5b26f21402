//! State Module - Runtime state management systems
//!
//! The reactive state systems that make the widget interactive:
//!
//! - **Focus** - Focused index signal, Tab cycling, focus/blur callbacks
//! - **Global keys** - Ctrl+C, Tab and Shift+Tab while mounted
//! - **Keyboard** - Event types, focused-first routing, handler registry
//! - **Mouse** - HitGrid and click-to-focus
//! - **Input** - crossterm conversion, polling, routing
//! - **Scheduler** - Keyed deferred tasks run after each event turn

pub mod focus;
pub mod global_keys;
pub mod input;
pub mod keyboard;
pub mod mouse;
pub mod scheduler;

pub use focus::{
    blur, blur_index, focus, focus_next, focus_previous, get_focused_index, is_focused,
    register_callbacks, FocusCallbacks,
};
pub use input::{poll_event, route_event, InputEvent};
pub use keyboard::{KeyState, KeyboardEvent, Modifiers};
pub use mouse::{MouseAction, MouseButton, MouseEvent};
pub use scheduler::{TaskId, TaskKey};
