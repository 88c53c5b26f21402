//! Renderer - Frame buffers and terminal output.
//!
//! The renderer is blind: it knows cells, not components. The frame pipeline
//! fills a [`FrameBuffer`]; [`DiffRenderer`] writes the difference to the
//! terminal.

mod buffer;
mod diff;

pub use buffer::FrameBuffer;
pub use diff::{to_crossterm_color, DiffRenderer};
