#![forbid(unsafe_code)]

//! Presenter: state-tracked ANSI emission.
//!
//! The presenter remembers the last buffer it wrote and only re-emits rows
//! that changed. Within a row it tracks the active style so SGR sequences
//! are emitted only on style transitions. All output for a frame is
//! buffered and flushed once.
//!
//! ```
//! use gtree_render::buffer::Buffer;
//! use gtree_render::cell::Cell;
//! use gtree_render::presenter::Presenter;
//!
//! let mut presenter = Presenter::new(Vec::new());
//! let mut buf = Buffer::new(4, 1);
//! buf.set(0, 0, Cell::from_char('x'));
//! presenter.present(&buf, 0)?;
//! assert!(!presenter.writer().is_empty());
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{
    Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::queue;

use crate::buffer::Buffer;
use crate::cell::{Cell, PackedRgba, StyleFlags};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct CellStyle {
    fg: PackedRgba,
    bg: PackedRgba,
    attrs: StyleFlags,
}

impl CellStyle {
    fn from_cell(cell: &Cell) -> Self {
        Self {
            fg: cell.fg,
            bg: cell.bg,
            attrs: cell.attrs,
        }
    }
}

/// Row-diffing ANSI presenter.
#[derive(Debug)]
pub struct Presenter<W: Write> {
    writer: W,
    last: Option<Buffer>,
    last_origin: u16,
}

impl<W: Write> Presenter<W> {
    /// Create a presenter writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            last: None,
            last_origin: 0,
        }
    }

    /// Borrow the underlying writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Forget the previous frame; the next present redraws every row.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Write `buffer` with its top row at terminal row `origin_y`.
    ///
    /// Only rows that differ from the previously presented buffer are
    /// emitted. A size or origin change redraws everything.
    pub fn present(&mut self, buffer: &Buffer, origin_y: u16) -> io::Result<()> {
        let full = match &self.last {
            Some(prev) => {
                prev.width() != buffer.width()
                    || prev.height() != buffer.height()
                    || self.last_origin != origin_y
            }
            None => true,
        };

        let mut rows_written = 0usize;
        for y in 0..buffer.height() {
            let changed = full
                || self
                    .last
                    .as_ref()
                    .is_none_or(|prev| prev.row(y) != buffer.row(y));
            if changed {
                self.write_row(buffer, y, origin_y.saturating_add(y))?;
                rows_written += 1;
            }
        }
        if rows_written > 0 {
            queue!(self.writer, SetAttribute(Attribute::Reset), ResetColor)?;
        }
        self.writer.flush()?;

        #[cfg(feature = "tracing")]
        tracing::trace!(rows_written, full, "frame presented");

        self.last = Some(buffer.clone());
        self.last_origin = origin_y;
        Ok(())
    }

    /// Move the terminal cursor, e.g. to park it below an inline region.
    pub fn move_cursor(&mut self, x: u16, y: u16) -> io::Result<()> {
        queue!(self.writer, MoveTo(x, y))?;
        self.writer.flush()
    }

    fn write_row(&mut self, buffer: &Buffer, y: u16, screen_y: u16) -> io::Result<()> {
        queue!(
            self.writer,
            MoveTo(0, screen_y),
            SetAttribute(Attribute::Reset),
            ResetColor
        )?;
        let mut current = CellStyle::default();
        for cell in buffer.row(y) {
            if cell.is_continuation() {
                continue;
            }
            let style = CellStyle::from_cell(cell);
            if style != current {
                self.emit_style(style)?;
                current = style;
            }
            queue!(self.writer, Print(cell.ch))?;
        }
        Ok(())
    }

    fn emit_style(&mut self, style: CellStyle) -> io::Result<()> {
        queue!(self.writer, SetAttribute(Attribute::Reset), ResetColor)?;
        if !style.fg.is_transparent() {
            queue!(self.writer, SetForegroundColor(to_color(style.fg)))?;
        }
        if !style.bg.is_transparent() {
            queue!(self.writer, SetBackgroundColor(to_color(style.bg)))?;
        }
        let mapping = [
            (StyleFlags::BOLD, Attribute::Bold),
            (StyleFlags::DIM, Attribute::Dim),
            (StyleFlags::ITALIC, Attribute::Italic),
            (StyleFlags::UNDERLINE, Attribute::Underlined),
            (StyleFlags::REVERSE, Attribute::Reverse),
        ];
        for (flag, attr) in mapping {
            if style.attrs.contains(flag) {
                queue!(self.writer, SetAttribute(attr))?;
            }
        }
        Ok(())
    }
}

fn to_color(c: PackedRgba) -> Color {
    Color::Rgb {
        r: c.r(),
        g: c.g(),
        b: c.b(),
    }
}
