#![forbid(unsafe_code)]

//! What one `view()` call draws into: cells plus clickable regions.
//!
//! `Model::view()` draws into a [`Frame`]. Widgets register hit regions
//! while drawing; the runtime keeps the last frame's [`HitGrid`] so mouse
//! events can be resolved to the widget region under the pointer.
//!
//! ```
//! use gtree_core::geometry::Rect;
//! use gtree_render::frame::{Frame, HitId, HitRegion};
//!
//! let mut frame = Frame::new(20, 5);
//! frame.register_hit(Rect::new(2, 1, 4, 1), HitId::new(7), HitRegion::Button, 42);
//! assert_eq!(frame.hit_test(3, 1), Some((HitId::new(7), HitRegion::Button, 42)));
//! assert_eq!(frame.hit_test(0, 0), None);
//! ```

use crate::buffer::Buffer;
use gtree_core::geometry::Rect;

/// Which widget owns a hit cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HitId(pub u32);

impl HitId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// Opaque user data attached to a hit region.
pub type HitData = u64;

/// Coarse role of a hit cell inside its widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HitRegion {
    #[default]
    None,
    /// Main content area.
    Content,
    /// Clickable button.
    Button,
    /// Custom region tag.
    Custom(u8),
}

/// A single hit cell in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitCell {
    /// Widget that registered this cell, if any.
    pub widget_id: Option<HitId>,
    /// Region tag for the hit area.
    pub region: HitRegion,
    /// Extra data attached to this hit cell.
    pub data: HitData,
}

/// Per-cell lookup from screen position to widget region.
///
/// Later registrations overwrite earlier ones, so widgets drawn on top also
/// win hit tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitGrid {
    width: u16,
    height: u16,
    cells: Vec<HitCell>,
}

impl HitGrid {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![HitCell::default(); width as usize * height as usize],
        }
    }

    /// Register a region; every cell inside `rect` maps to it.
    pub fn register(&mut self, rect: Rect, widget_id: HitId, region: HitRegion, data: HitData) {
        let x_end = (rect.x as usize + rect.width as usize).min(self.width as usize);
        let y_end = (rect.y as usize + rect.height as usize).min(self.height as usize);
        if rect.x as usize >= x_end || rect.y as usize >= y_end {
            return;
        }

        let hit_cell = HitCell {
            widget_id: Some(widget_id),
            region,
            data,
        };
        for y in rect.y as usize..y_end {
            let row_start = y * self.width as usize;
            self.cells[row_start + rect.x as usize..row_start + x_end].fill(hit_cell);
        }
    }

    pub fn hit_test(&self, x: u16, y: u16) -> Option<(HitId, HitRegion, HitData)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let cell = &self.cells[y as usize * self.width as usize + x as usize];
        cell.widget_id.map(|id| (id, cell.region, cell.data))
    }

    pub fn clear(&mut self) {
        self.cells.fill(HitCell::default());
    }
}

/// Render target for one pass of `Model::view()`.
#[derive(Debug, Clone)]
pub struct Frame {
    /// The cell grid.
    pub buffer: Buffer,
    hit_grid: HitGrid,
    cursor: Option<(u16, u16)>,
}

impl Frame {
    /// # Panics
    ///
    /// On a zero dimension, like [`Buffer::new`].
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::new(width, height),
            hit_grid: HitGrid::new(width, height),
            cursor: None,
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.buffer.width()
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.buffer.height()
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.buffer.bounds()
    }

    /// Register a hit region, clipped to the buffer's current scissor.
    pub fn register_hit(&mut self, rect: Rect, id: HitId, region: HitRegion, data: HitData) {
        let clipped = rect.intersection(&self.buffer.current_scissor());
        if !clipped.is_empty() {
            self.hit_grid.register(clipped, id, region, data);
        }
    }

    pub fn hit_test(&self, x: u16, y: u16) -> Option<(HitId, HitRegion, HitData)> {
        self.hit_grid.hit_test(x, y)
    }

    /// Request a visible cursor at `position`, or hide it with `None`.
    pub fn set_cursor(&mut self, position: Option<(u16, u16)>) {
        self.cursor = position;
    }

    /// Requested cursor position.
    pub fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor
    }

    /// Split the frame into its buffer and hit grid.
    pub fn into_parts(self) -> (Buffer, HitGrid) {
        (self.buffer, self.hit_grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_registration_wins() {
        let mut frame = Frame::new(10, 2);
        frame.register_hit(Rect::new(0, 0, 10, 2), HitId::new(1), HitRegion::Content, 1);
        frame.register_hit(Rect::new(4, 0, 2, 1), HitId::new(1), HitRegion::Button, 2);
        assert_eq!(frame.hit_test(4, 0), Some((HitId::new(1), HitRegion::Button, 2)));
        assert_eq!(frame.hit_test(4, 1), Some((HitId::new(1), HitRegion::Content, 1)));
    }

    #[test]
    fn hit_regions_respect_scissor() {
        let mut frame = Frame::new(10, 2);
        frame.buffer.push_scissor(Rect::new(0, 0, 3, 1));
        frame.register_hit(Rect::new(0, 0, 10, 2), HitId::new(9), HitRegion::Content, 0);
        frame.buffer.pop_scissor();
        assert!(frame.hit_test(2, 0).is_some());
        assert!(frame.hit_test(3, 0).is_none());
        assert!(frame.hit_test(0, 1).is_none());
    }

    #[test]
    fn out_of_bounds_hit_is_none() {
        let frame = Frame::new(3, 3);
        assert_eq!(frame.hit_test(100, 100), None);
    }
}
