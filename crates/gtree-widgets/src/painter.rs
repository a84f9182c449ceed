#![forbid(unsafe_code)]

//! Drawing with signed coordinates.
//!
//! Scrolled cards can start left of or above the canvas. [`Painter`] takes
//! `i32` positions and drops whatever falls outside its clip rectangle, so
//! callers never have to pre-clip.

use gtree_core::geometry::Rect;
use gtree_render::cell::Cell;
use gtree_render::char_width;
use gtree_render::drawing::BorderChars;
use gtree_render::frame::{Frame, HitData, HitId, HitRegion};
use gtree_render::style::Style;

/// Clipped drawing surface over a frame.
pub struct Painter<'f> {
    frame: &'f mut Frame,
    clip: Rect,
}

impl<'f> Painter<'f> {
    /// Paint into `frame`, restricted to `clip` (and the frame bounds).
    pub fn new(frame: &'f mut Frame, clip: Rect) -> Self {
        let clip = clip.intersection(&frame.bounds());
        Self { frame, clip }
    }

    #[inline]
    pub fn clip(&self) -> Rect {
        self.clip
    }

    /// The frame underneath, for widgets that draw with `u16` areas.
    pub fn frame(&mut self) -> &mut Frame {
        self.frame
    }

    fn visible(&self, x: i32, y: i32) -> Option<(u16, u16)> {
        let x = u16::try_from(x).ok()?;
        let y = u16::try_from(y).ok()?;
        self.clip.contains(x, y).then_some((x, y))
    }

    /// Intersection of a signed rectangle with the clip.
    pub fn clip_rect(&self, x: i32, y: i32, width: i32, height: i32) -> Option<Rect> {
        let left = x.max(i32::from(self.clip.x));
        let top = y.max(i32::from(self.clip.y));
        let right = (x + width).min(i32::from(self.clip.right()));
        let bottom = (y + height).min(i32::from(self.clip.bottom()));
        if left >= right || top >= bottom {
            return None;
        }
        Some(Rect::new(
            left as u16,
            top as u16,
            (right - left) as u16,
            (bottom - top) as u16,
        ))
    }

    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if let Some((x, y)) = self.visible(x, y) {
            self.frame.buffer.set(x, y, cell);
        }
    }

    pub fn fill(&mut self, x: i32, y: i32, width: i32, height: i32, cell: Cell) {
        if let Some(rect) = self.clip_rect(x, y, width, height) {
            self.frame.buffer.fill(rect, cell);
        }
    }

    pub fn hline(&mut self, x: i32, y: i32, width: i32, cell: Cell) {
        for i in 0..width.max(0) {
            self.set(x + i, y, cell);
        }
    }

    pub fn vline(&mut self, x: i32, y: i32, height: i32, cell: Cell) {
        for i in 0..height.max(0) {
            self.set(x, y + i, cell);
        }
    }

    /// Print text starting at `x`, stopping before `max_x`.
    ///
    /// Returns the x position after the last character. Wide characters
    /// that would straddle `max_x` are not drawn.
    pub fn text(&mut self, x: i32, y: i32, text: &str, style: Style, max_x: i32) -> i32 {
        let base = style.cell(' ');
        let mut cx = x;
        for c in text.chars() {
            let w = char_width(c) as i32;
            if w == 0 {
                continue;
            }
            if cx + w > max_x {
                break;
            }
            self.set(cx, y, base.with_char(c));
            for tail in 1..w {
                self.set(cx + tail, y, Cell::CONTINUATION);
            }
            cx += w;
        }
        cx
    }

    /// Border along the edges of a signed rectangle.
    pub fn border(&mut self, x: i32, y: i32, width: i32, height: i32, chars: BorderChars, style: Style) {
        if width <= 0 || height <= 0 {
            return;
        }
        let right = x + width - 1;
        let bottom = y + height - 1;
        let h = style.cell(chars.horizontal);
        let v = style.cell(chars.vertical);
        self.hline(x + 1, y, width - 2, h);
        self.hline(x + 1, bottom, width - 2, h);
        self.vline(x, y + 1, height - 2, v);
        self.vline(right, y + 1, height - 2, v);
        self.set(x, y, style.cell(chars.top_left));
        self.set(right, y, style.cell(chars.top_right));
        self.set(x, bottom, style.cell(chars.bottom_left));
        self.set(right, bottom, style.cell(chars.bottom_right));
    }

    /// Register the visible part of a signed rectangle as a hit region.
    pub fn hit(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        id: HitId,
        region: HitRegion,
        data: HitData,
    ) {
        if let Some(rect) = self.clip_rect(x, y, width, height) {
            self.frame.register_hit(rect, id, region, data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_positions_are_clipped() {
        let mut frame = Frame::new(6, 2);
        let mut p = Painter::new(&mut frame, Rect::new(1, 0, 4, 2));
        p.text(-2, 0, "abcdefgh", Style::new(), 10);
        p.set(-1, -1, Cell::from_char('x'));
        assert_eq!(frame.buffer.row_text(0), " defg ");
    }

    #[test]
    fn clip_rect_intersects() {
        let mut frame = Frame::new(10, 10);
        let p = Painter::new(&mut frame, Rect::new(2, 2, 5, 5));
        assert_eq!(p.clip_rect(-3, 0, 6, 4), Some(Rect::new(2, 2, 1, 2)));
        assert_eq!(p.clip_rect(8, 8, 3, 3), None);
        assert_eq!(p.clip_rect(3, 3, 0, 2), None);
    }

    #[test]
    fn border_partially_offscreen() {
        let mut frame = Frame::new(4, 3);
        let mut p = Painter::new(&mut frame, Rect::from_size(4, 3));
        p.border(-2, 0, 5, 3, BorderChars::SQUARE, Style::new());
        assert_eq!(frame.buffer.row_text(0), "──┐ ");
        assert_eq!(frame.buffer.row_text(1), "  │ ");
        assert_eq!(frame.buffer.row_text(2), "──┘ ");
    }

    #[test]
    fn hit_is_clipped() {
        let mut frame = Frame::new(5, 5);
        let mut p = Painter::new(&mut frame, Rect::new(0, 0, 3, 3));
        p.hit(-1, -1, 3, 3, HitId::new(1), HitRegion::Content, 7);
        assert_eq!(frame.hit_test(1, 1), Some((HitId::new(1), HitRegion::Content, 7)));
        assert_eq!(frame.hit_test(2, 2), None);
    }
}
