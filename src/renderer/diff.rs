//! Differential renderer for fullscreen mode.
//!
//! The DiffRenderer compares the current frame to the previous frame and only
//! outputs cells that have changed.
//!
//! # Algorithm
//!
//! 1. Wrap output in a synchronized update
//! 2. For each cell in the new frame:
//!    - If previous frame exists and cell is unchanged: skip
//!    - Otherwise: queue cursor move, colors, attributes and the character,
//!      skipping whatever the terminal already has
//! 3. Flush the writer once
//! 4. Store current frame as previous for next comparison

use std::io::{self, Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{
    Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{
    BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::queue;

use super::buffer::FrameBuffer;
use crate::types::{Attr, Cell, Rgba};

// =============================================================================
// Color / attribute conversion
// =============================================================================

/// Map a cell color to a crossterm color.
pub fn to_crossterm_color(color: Rgba) -> Color {
    if color.is_terminal_default() || color.is_transparent() {
        Color::Reset
    } else {
        Color::Rgb {
            r: color.r.clamp(0, 255) as u8,
            g: color.g.clamp(0, 255) as u8,
            b: color.b.clamp(0, 255) as u8,
        }
    }
}

const ATTRIBUTES: [(Attr, Attribute); 8] = [
    (Attr::BOLD, Attribute::Bold),
    (Attr::DIM, Attribute::Dim),
    (Attr::ITALIC, Attribute::Italic),
    (Attr::UNDERLINE, Attribute::Underlined),
    (Attr::BLINK, Attribute::SlowBlink),
    (Attr::INVERSE, Attribute::Reverse),
    (Attr::HIDDEN, Attribute::Hidden),
    (Attr::STRIKETHROUGH, Attribute::CrossedOut),
];

// =============================================================================
// Stateful cell writer
// =============================================================================

/// What the terminal currently has set, so redundant sequences are skipped.
#[derive(Debug, Default)]
struct PenState {
    position: Option<(u16, u16)>,
    fg: Option<Rgba>,
    bg: Option<Rgba>,
    attrs: Option<Attr>,
}

impl PenState {
    fn write_cell<W: Write>(&mut self, out: &mut W, x: u16, y: u16, cell: &Cell) -> io::Result<()> {
        if self.position != Some((x, y)) {
            queue!(out, MoveTo(x, y))?;
        }

        // Attribute reset also clears colors, so it goes first
        if self.attrs != Some(cell.attrs) {
            queue!(out, SetAttribute(Attribute::Reset))?;
            for (flag, attribute) in ATTRIBUTES {
                if cell.attrs.contains(flag) {
                    queue!(out, SetAttribute(attribute))?;
                }
            }
            self.attrs = Some(cell.attrs);
            self.fg = None;
            self.bg = None;
        }
        if self.fg != Some(cell.fg) {
            queue!(out, SetForegroundColor(to_crossterm_color(cell.fg)))?;
            self.fg = Some(cell.fg);
        }
        if self.bg != Some(cell.bg) {
            queue!(out, SetBackgroundColor(to_crossterm_color(cell.bg)))?;
            self.bg = Some(cell.bg);
        }

        let ch = char::from_u32(cell.char).unwrap_or(' ');
        queue!(out, Print(ch))?;
        self.position = Some((x.saturating_add(1), y));
        Ok(())
    }
}

// =============================================================================
// DiffRenderer
// =============================================================================

/// Differential renderer for fullscreen mode.
///
/// Keeps track of the previous frame to enable diff-based rendering.
/// Only cells that have changed since the last frame are output.
pub struct DiffRenderer<W: Write = Stdout> {
    out: W,
    previous: Option<FrameBuffer>,
}

impl DiffRenderer<Stdout> {
    /// Create a renderer writing to stdout.
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for DiffRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> DiffRenderer<W> {
    /// Create a renderer over any writer.
    pub fn with_writer(out: W) -> Self {
        Self { out, previous: None }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    /// Render a frame, outputting only changed cells.
    ///
    /// Returns true if any cells were changed.
    pub fn render(&mut self, buffer: &FrameBuffer) -> io::Result<bool> {
        let width = buffer.width();
        let height = buffer.height();
        let comparable = self
            .previous
            .as_ref()
            .filter(|prev| prev.width() == width && prev.height() == height);

        let mut pen = PenState::default();
        let mut changed_cells = 0usize;

        queue!(self.out, BeginSynchronizedUpdate)?;
        for y in 0..height {
            for x in 0..width {
                let Some(cell) = buffer.get(x, y) else {
                    continue;
                };
                let changed = match comparable.and_then(|prev| prev.get(x, y)) {
                    Some(prev_cell) => !cells_equal(cell, prev_cell),
                    None => true,
                };
                if changed {
                    changed_cells += 1;
                    pen.write_cell(&mut self.out, x, y, cell)?;
                }
            }
        }
        queue!(self.out, EndSynchronizedUpdate)?;
        self.out.flush()?;

        tracing::trace!(width, height, changed_cells, "frame rendered");
        self.previous = Some(buffer.clone());
        Ok(changed_cells > 0)
    }

    /// Force a full redraw (no diffing).
    ///
    /// Use this after terminal resize or when the screen is corrupted.
    pub fn render_full(&mut self, buffer: &FrameBuffer) -> io::Result<()> {
        self.invalidate();
        self.render(buffer).map(|_| ())
    }

    /// Invalidate the previous frame.
    ///
    /// Next render will be a full redraw.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    /// Check if we have a previous frame to diff against.
    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// Enter fullscreen mode (alternate screen buffer).
    pub fn enter_fullscreen(&mut self) -> io::Result<()> {
        queue!(self.out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        self.out.flush()?;
        self.invalidate();
        Ok(())
    }

    /// Exit fullscreen mode.
    pub fn exit_fullscreen(&mut self) -> io::Result<()> {
        queue!(
            self.out,
            SetAttribute(Attribute::Reset),
            ResetColor,
            Show,
            LeaveAlternateScreen
        )?;
        self.out.flush()
    }
}

/// Fast cell equality check.
#[inline]
fn cells_equal(a: &Cell, b: &Cell) -> bool {
    a.char == b.char && a.attrs == b.attrs && a.fg == b.fg && a.bg == b.bg
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> DiffRenderer<Vec<u8>> {
        DiffRenderer::with_writer(Vec::new())
    }

    fn output(renderer: &mut DiffRenderer<Vec<u8>>) -> String {
        let text = String::from_utf8_lossy(renderer.writer()).into_owned();
        renderer.writer_mut().clear();
        text
    }

    #[test]
    fn test_cells_equal() {
        let a = Cell {
            char: 'X' as u32,
            fg: Rgba::WHITE,
            bg: Rgba::BLACK,
            attrs: Attr::BOLD,
        };
        let b = a;
        assert!(cells_equal(&a, &b));

        let c = Cell {
            char: 'Y' as u32,
            ..a
        };
        assert!(!cells_equal(&a, &c));
    }

    #[test]
    fn test_first_render_writes_everything() {
        let mut renderer = renderer();
        let mut buffer = FrameBuffer::new(3, 1);
        buffer.draw_text(0, 0, "abc", Rgba::WHITE, Attr::NONE);

        assert!(renderer.render(&buffer).unwrap());
        assert!(renderer.has_previous());
        assert!(output(&mut renderer).contains("abc"));
    }

    #[test]
    fn test_unchanged_frame_writes_no_cells() {
        let mut renderer = renderer();
        let mut buffer = FrameBuffer::new(3, 1);
        buffer.draw_text(0, 0, "abc", Rgba::WHITE, Attr::NONE);
        renderer.render(&buffer).unwrap();
        output(&mut renderer);

        assert!(!renderer.render(&buffer).unwrap());
        assert!(!output(&mut renderer).contains('a'));
    }

    #[test]
    fn test_only_changed_cell_is_written() {
        let mut renderer = renderer();
        let mut buffer = FrameBuffer::new(3, 1);
        buffer.draw_text(0, 0, "abc", Rgba::WHITE, Attr::NONE);
        renderer.render(&buffer).unwrap();
        output(&mut renderer);

        buffer.draw_char(1, 0, 'Z', Rgba::WHITE, Attr::NONE);
        assert!(renderer.render(&buffer).unwrap());
        let text = output(&mut renderer);
        assert!(text.contains('Z'));
        assert!(!text.contains('a'));
        assert!(!text.contains('c'));
    }

    #[test]
    fn test_resize_forces_full_redraw() {
        let mut renderer = renderer();
        let mut small = FrameBuffer::new(2, 1);
        small.draw_text(0, 0, "ab", Rgba::WHITE, Attr::NONE);
        renderer.render(&small).unwrap();
        output(&mut renderer);

        let mut large = FrameBuffer::new(3, 1);
        large.draw_text(0, 0, "abc", Rgba::WHITE, Attr::NONE);
        renderer.render(&large).unwrap();
        assert!(output(&mut renderer).contains("abc"));
    }

    #[test]
    fn test_invalidate() {
        let mut renderer = renderer();
        renderer.render(&FrameBuffer::new(2, 2)).unwrap();
        assert!(renderer.has_previous());

        renderer.invalidate();
        assert!(!renderer.has_previous());
    }

    #[test]
    fn test_color_mapping() {
        assert_eq!(to_crossterm_color(Rgba::TERMINAL_DEFAULT), Color::Reset);
        assert_eq!(
            to_crossterm_color(Rgba::rgb(1, 2, 3)),
            Color::Rgb { r: 1, g: 2, b: 3 }
        );
    }
}
