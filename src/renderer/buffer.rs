//! FrameBuffer - A 2D grid of terminal cells.
//!
//! The frame pipeline draws into a fresh buffer each frame; the diff renderer
//! compares it against the previous one. Writes outside the buffer are clipped.

use crate::types::{Attr, BorderStyle, Cell, Rect, Rgba};

/// A frame of terminal cells, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// A buffer of blank cells.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    fn offset(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.offset(x, y).map(|i| &self.cells[i])
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.offset(x, y) {
            self.cells[i] = cell;
        }
    }

    /// Character at a position, for tests and debugging.
    pub fn char_at(&self, x: u16, y: u16) -> Option<char> {
        self.get(x, y).and_then(|cell| char::from_u32(cell.char))
    }

    /// Fill a rectangle's background. Transparent colors leave cells untouched.
    pub fn fill_rect(&mut self, rect: Rect, bg: Rgba) {
        if bg.is_transparent() {
            return;
        }
        for y in rect.y..rect.y.saturating_add(rect.height) {
            for x in rect.x..rect.x.saturating_add(rect.width) {
                if let Some(i) = self.offset(x, y) {
                    self.cells[i] = Cell {
                        bg,
                        ..Cell::default()
                    };
                }
            }
        }
    }

    /// Draw one character, keeping the background already in place.
    pub fn draw_char(&mut self, x: u16, y: u16, ch: char, fg: Rgba, attrs: Attr) {
        if let Some(i) = self.offset(x, y) {
            let cell = &mut self.cells[i];
            cell.char = ch as u32;
            cell.fg = fg;
            cell.attrs = attrs;
        }
    }

    /// Draw a string left to right, clipped at the right edge.
    pub fn draw_text(&mut self, x: u16, y: u16, text: &str, fg: Rgba, attrs: Attr) {
        for (col, ch) in (x..self.width).zip(text.chars()) {
            self.draw_char(col, y, ch, fg, attrs);
        }
    }

    /// Draw a border along the edges of `rect`.
    pub fn draw_border(&mut self, rect: Rect, style: BorderStyle, color: Rgba) {
        if style == BorderStyle::None || rect.width == 0 || rect.height == 0 {
            return;
        }
        let (h, v, tl, tr, br, bl) = style.chars();
        let right = rect.x + rect.width - 1;
        let bottom = rect.y + rect.height - 1;

        if style == BorderStyle::Underline {
            for x in rect.x..=right {
                self.draw_char(x, bottom, h, color, Attr::NONE);
            }
            return;
        }

        for x in rect.x..=right {
            self.draw_char(x, rect.y, h, color, Attr::NONE);
            self.draw_char(x, bottom, h, color, Attr::NONE);
        }
        for y in rect.y..=bottom {
            self.draw_char(rect.x, y, v, color, Attr::NONE);
            self.draw_char(right, y, v, color, Attr::NONE);
        }
        self.draw_char(rect.x, rect.y, tl, color, Attr::NONE);
        self.draw_char(right, rect.y, tr, color, Attr::NONE);
        self.draw_char(right, bottom, br, color, Attr::NONE);
        self.draw_char(rect.x, bottom, bl, color, Attr::NONE);
    }

    /// Row `y` as a string, for tests and debugging.
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.char_at(x, y))
            .collect()
    }
}
