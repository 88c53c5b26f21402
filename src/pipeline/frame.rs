//! Frame Derived - Reactive frame computation for one OTP row.
//!
//! Reads the terminal size, every slot signal and the focus signal, lays the
//! row out with taffy and paints a [`FrameBuffer`]. Hit regions are collected
//! as data; the render effect installs them.

use spark_signals::{derived, Derived};

use crate::config::ContainerStyle;
use crate::error::Result;
use crate::layout::compute_otp_layout;
use crate::primitives::{CellView, OtpInput};
use crate::renderer::FrameBuffer;
use crate::state::mouse::HitGrid;
use crate::types::{Attr, BorderStyle, Rect};
use super::terminal::{terminal_height_signal, terminal_width_signal};

/// Cursor drawn in the focused empty cell.
pub const CURSOR_CHAR: char = '_';

// =============================================================================
// Types
// =============================================================================

/// Result of frame computation.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameResult {
    /// The rendered frame buffer.
    pub buffer: FrameBuffer,
    /// Component index under each terminal cell.
    pub hit_grid: HitGrid,
    /// Terminal size at time of render.
    pub terminal_size: (u16, u16),
}

impl FrameResult {
    fn blank(width: u16, height: u16) -> Self {
        Self {
            buffer: FrameBuffer::new(width, height),
            hit_grid: HitGrid::new(width, height),
            terminal_size: (width, height),
        }
    }
}

// =============================================================================
// Painting
// =============================================================================

/// Center of the area inside a border.
fn content_position(rect: Rect, border: BorderStyle) -> (u16, u16) {
    let (top, right, bottom, left) = border.insets();
    let inner_width = rect.width.saturating_sub(left + right);
    let inner_height = rect.height.saturating_sub(top + bottom);
    (
        rect.x + left + inner_width.saturating_sub(1) / 2,
        rect.y + top + inner_height.saturating_sub(1) / 2,
    )
}

fn paint_container(buffer: &mut FrameBuffer, rect: Rect, style: &ContainerStyle) {
    buffer.fill_rect(rect, style.bg);
    buffer.draw_border(rect, style.border, style.border_color);
}

fn paint_cell(buffer: &mut FrameBuffer, rect: Rect, view: &CellView) {
    let style = &view.style;
    buffer.fill_rect(rect, style.bg);
    buffer.draw_border(rect, style.border, view.border_color());

    let (x, y) = content_position(rect, style.border);
    match (view.display, view.focused) {
        (Some(ch), true) => buffer.draw_char(x, y, ch, style.fg, style.attrs | Attr::UNDERLINE),
        (Some(ch), false) => buffer.draw_char(x, y, ch, style.fg, style.attrs),
        (None, true) => buffer.draw_char(x, y, CURSOR_CHAR, view.cursor_color, Attr::BOLD),
        (None, false) => {}
    }
}

/// Paint one frame of `input` at the given terminal size.
pub fn render_frame(input: &OtpInput, width: u16, height: u16) -> Result<FrameResult> {
    let _span = tracing::debug_span!("render_frame", width, height).entered();

    let layout = compute_otp_layout(input.config(), width, height)?;
    let mut frame = FrameResult::blank(width, height);

    let container = layout.container;
    paint_container(&mut frame.buffer, container, &input.config().container_style);
    frame
        .hit_grid
        .fill_rect(container.x, container.y, container.width, container.height, input.index());

    for (view, rect) in input.cell_views().iter().zip(&layout.cells) {
        paint_cell(&mut frame.buffer, *rect, view);
        if let Some(index) = input.cell_index(view.slot) {
            frame.hit_grid.fill_rect(rect.x, rect.y, rect.width, rect.height, index);
        }
    }
    Ok(frame)
}

// =============================================================================
// Frame Derived Factory
// =============================================================================

/// Create the frame derived for a mounted row.
///
/// A layout failure yields a blank frame; it is logged rather than raised
/// because a derived cannot fail.
pub fn create_frame_derived(input: OtpInput) -> Derived<FrameResult> {
    let tw_signal = terminal_width_signal();
    let th_signal = terminal_height_signal();

    derived(move || {
        let width = tw_signal.get();
        let height = th_signal.get();
        match render_frame(&input, width, height) {
            Ok(frame) => frame,
            Err(error) => {
                tracing::warn!(%error, "frame render failed");
                FrameResult::blank(width, height)
            }
        }
    })
}

// =============================================================================
// Tests
// =============================================================================
