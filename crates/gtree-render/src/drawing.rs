#![forbid(unsafe_code)]

//! Drawing primitives for the buffer.
//!
//! Helpers on top of `Buffer::set()` for lines, borders, and text. All
//! operations respect the buffer's scissor stack.

use crate::buffer::Buffer;
use crate::cell::Cell;
use crate::char_width;
use gtree_core::geometry::Rect;

/// Characters used to draw a border around a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BorderChars {
    /// Simple box-drawing characters.
    pub const SQUARE: Self = Self {
        top_left: '┌',
        top_right: '┐',
        bottom_left: '└',
        bottom_right: '┘',
        horizontal: '─',
        vertical: '│',
    };

    /// Rounded corners.
    pub const ROUNDED: Self = Self {
        top_left: '╭',
        top_right: '╮',
        bottom_left: '╰',
        bottom_right: '╯',
        horizontal: '─',
        vertical: '│',
    };

    /// Heavy (thick) border.
    pub const HEAVY: Self = Self {
        top_left: '┏',
        top_right: '┓',
        bottom_left: '┗',
        bottom_right: '┛',
        horizontal: '━',
        vertical: '┃',
    };
}

/// Extension trait for drawing on a Buffer.
pub trait Draw {
    /// Draw a horizontal line of cells.
    fn draw_horizontal_line(&mut self, x: u16, y: u16, width: u16, cell: Cell);

    /// Draw a vertical line of cells.
    fn draw_vertical_line(&mut self, x: u16, y: u16, height: u16, cell: Cell);

    /// Print text with a right-side clipping boundary.
    ///
    /// Characters replace the cell content; colors and attributes come from
    /// `base_cell`. Stops before `max_x` (exclusive); a wide character that
    /// would straddle the boundary is not drawn. Returns the x position
    /// after the last character.
    fn print_text_clipped(&mut self, x: u16, y: u16, text: &str, base_cell: Cell, max_x: u16)
    -> u16;

    /// Draw a border along the edges of `rect`.
    fn draw_border(&mut self, rect: Rect, chars: BorderChars, base_cell: Cell);
}

impl Draw for Buffer {
    fn draw_horizontal_line(&mut self, x: u16, y: u16, width: u16, cell: Cell) {
        for i in 0..width {
            self.set(x.saturating_add(i), y, cell);
        }
    }

    fn draw_vertical_line(&mut self, x: u16, y: u16, height: u16, cell: Cell) {
        for i in 0..height {
            self.set(x, y.saturating_add(i), cell);
        }
    }

    fn print_text_clipped(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        base_cell: Cell,
        max_x: u16,
    ) -> u16 {
        let limit = max_x.min(self.width());
        let mut cx = x;
        for c in text.chars() {
            let w = char_width(c) as u16;
            if w == 0 {
                continue;
            }
            if cx.saturating_add(w) > limit {
                break;
            }
            self.set(cx, y, base_cell.with_char(c));
            for tail in 1..w {
                self.set(cx + tail, y, Cell::CONTINUATION);
            }
            cx += w;
        }
        cx
    }

    fn draw_border(&mut self, rect: Rect, chars: BorderChars, base_cell: Cell) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        let right = rect.right() - 1;
        let bottom = rect.bottom() - 1;

        if rect.width > 2 {
            let h = base_cell.with_char(chars.horizontal);
            self.draw_horizontal_line(rect.x + 1, rect.y, rect.width - 2, h);
            self.draw_horizontal_line(rect.x + 1, bottom, rect.width - 2, h);
        }
        if rect.height > 2 {
            let v = base_cell.with_char(chars.vertical);
            self.draw_vertical_line(rect.x, rect.y + 1, rect.height - 2, v);
            self.draw_vertical_line(right, rect.y + 1, rect.height - 2, v);
        }

        self.set(rect.x, rect.y, base_cell.with_char(chars.top_left));
        self.set(right, rect.y, base_cell.with_char(chars.top_right));
        self.set(rect.x, bottom, base_cell.with_char(chars.bottom_left));
        self.set(right, bottom, base_cell.with_char(chars.bottom_right));
    }
}
