#![forbid(unsafe_code)]

//! Off-screen cell grid.
//!
//! Cells are stored row by row. The dimensions are fixed at construction.
//! Drawing goes through a stack of clip rectangles whose bottom entry is the
//! whole grid; each push narrows the clip and the bottom entry never pops.

use crate::cell::Cell;
use gtree_core::geometry::Rect;

/// Fixed-size grid the widgets draw into.
///
/// # Example
///
/// ```
/// use gtree_render::buffer::Buffer;
/// use gtree_render::cell::Cell;
///
/// let mut buffer = Buffer::new(80, 24);
/// buffer.set(0, 0, Cell::from_char('H'));
/// assert_eq!(buffer.get(0, 0).map(|c| c.ch), Some('H'));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    scissor_stack: Vec<Rect>,
}

impl Buffer {
    /// # Panics
    ///
    /// On a zero dimension.
    pub fn new(width: u16, height: u16) -> Self {
        assert!(width > 0, "buffer width must be > 0");
        assert!(height > 0, "buffer height must be > 0");

        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
            scissor_stack: vec![Rect::from_size(width, height)],
        }
    }

    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Unclipped access.
    #[inline]
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Current clip rectangle.
    #[inline]
    pub fn current_scissor(&self) -> Rect {
        self.scissor_stack
            .last()
            .copied()
            .unwrap_or_else(|| self.bounds())
    }

    /// Write one cell; dropped outside the clip.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if !self.current_scissor().contains(x, y) {
            return;
        }
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    /// Clipped fill.
    pub fn fill(&mut self, rect: Rect, cell: Cell) {
        let clipped = rect.intersection(&self.current_scissor());
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                if let Some(i) = self.index(x, y) {
                    self.cells[i] = cell;
                }
            }
        }
    }

    /// Reset every cell to empty.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Push a clip rectangle; it is intersected with the current one.
    pub fn push_scissor(&mut self, rect: Rect) {
        let next = rect.intersection(&self.current_scissor());
        self.scissor_stack.push(next);
    }

    /// Pop the most recent clip rectangle. The base clip is never popped.
    pub fn pop_scissor(&mut self) {
        if self.scissor_stack.len() > 1 {
            self.scissor_stack.pop();
        }
    }

    /// Borrow one row of cells.
    pub fn row(&self, y: u16) -> &[Cell] {
        if y >= self.height {
            return &[];
        }
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }

    /// Row `y` as plain text, skipping wide-character continuation cells.
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .iter()
            .filter(|c| !c.is_continuation())
            .map(|c| c.ch)
            .collect()
    }
}
