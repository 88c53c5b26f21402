//! Terminal size state.
//!
//! The frame derived reads these signals, so a resize event re-renders.

use spark_signals::{signal, Signal};

const DEFAULT_WIDTH: u16 = 80;
const DEFAULT_HEIGHT: u16 = 24;

thread_local! {
    static TERMINAL_WIDTH: Signal<u16> = signal(DEFAULT_WIDTH);
    static TERMINAL_HEIGHT: Signal<u16> = signal(DEFAULT_HEIGHT);
}

pub fn terminal_width() -> u16 {
    TERMINAL_WIDTH.with(|s| s.get())
}

pub fn terminal_height() -> u16 {
    TERMINAL_HEIGHT.with(|s| s.get())
}

pub fn terminal_width_signal() -> Signal<u16> {
    TERMINAL_WIDTH.with(|s| s.clone())
}

pub fn terminal_height_signal() -> Signal<u16> {
    TERMINAL_HEIGHT.with(|s| s.clone())
}

/// Set the terminal size. Unchanged dimensions do not notify.
pub fn set_terminal_size(width: u16, height: u16) {
    if terminal_width() != width {
        TERMINAL_WIDTH.with(|s| s.set(width));
    }
    if terminal_height() != height {
        TERMINAL_HEIGHT.with(|s| s.set(height));
    }
    tracing::trace!(width, height, "terminal size");
}

/// Query the real terminal, falling back to 80x24 when there is none.
pub fn detect_terminal_size() -> (u16, u16) {
    let (width, height) = crossterm::terminal::size().unwrap_or((DEFAULT_WIDTH, DEFAULT_HEIGHT));
    set_terminal_size(width, height);
    (width, height)
}

/// Reset to the default size (for testing)
pub fn reset_terminal_state() {
    set_terminal_size(DEFAULT_WIDTH, DEFAULT_HEIGHT);
}
