#![forbid(unsafe_code)]

//! Viewport control: zoom, fullscreen, and drag-to-pan scrolling.
//!
//! The controller is a plain state struct mutated only through its methods,
//! so it can be driven without a terminal.
//!
//! # Invariants
//!
//! 1. `MIN_SCALE <= scale <= MAX_SCALE` and `scale % SCALE_STEP == 0`.
//! 2. The fullscreen flag only changes when a request resolves
//!    successfully (or when the host reports a native change through
//!    [`ViewportController::sync_fullscreen`]).
//! 3. Scroll offsets stay within `[0, content - viewport]` on each axis.
//!
//! # Coordinate mapping
//!
//! Content is laid out at 100% and scaled uniformly around its top-center,
//! so zooming never recenters the view. The scrollable extent is the
//! unscaled layout size.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Fallback |
//! |---------|-------|----------|
//! | Fullscreen request fails | Terminal refuses the alternate screen | Logged at warn, flag unchanged |
//! | Multi-touch gesture | Two or more contacts | Ignored |

use std::io;

use gtree_core::event::{TouchEvent, TouchPhase};

use crate::layout::LogicalRect;

/// Smallest zoom level, in percent.
pub const MIN_SCALE: u16 = 30;
/// Largest zoom level, in percent.
pub const MAX_SCALE: u16 = 100;
/// Zoom increment, in percent.
pub const SCALE_STEP: u16 = 10;
/// Scroll distance per cell of pointer travel while dragging.
pub const DRAG_SPEED: f64 = 1.2;
/// Rows scrolled per wheel notch or arrow key.
pub const SCROLL_STEP_Y: i32 = 2;
/// Columns scrolled per horizontal wheel notch or arrow key.
pub const SCROLL_STEP_X: i32 = 4;

/// A pending fullscreen transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenRequest {
    Enter,
    Exit,
}

/// Scroll position after dragging the pointer by `delta` from where the
/// drag started.
///
/// Dragging right or down reveals content to the left or above, so the
/// offset moves against the pointer, amplified by [`DRAG_SPEED`].
///
/// ```
/// use gtree_widgets::viewport::drag_scroll;
///
/// assert_eq!(drag_scroll((100, 50), (20, -10)), (76, 62));
/// ```
pub fn drag_scroll(origin: (i32, i32), delta: (i32, i32)) -> (i32, i32) {
    let step = |o: i32, d: i32| o - (f64::from(d) * DRAG_SPEED).round() as i32;
    (step(origin.0, delta.0), step(origin.1, delta.1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DragAnchor {
    pointer: (i32, i32),
    scroll: (i32, i32),
}

/// Zoom, fullscreen and scroll state of the tree canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportController {
    scale: u16,
    fullscreen: bool,
    pending: Option<FullscreenRequest>,
    fullscreen_error: Option<String>,
    drag: Option<DragAnchor>,
    scroll: (i32, i32),
    content: (i32, i32),
    viewport: (u16, u16),
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportController {
    /// 100% zoom, not fullscreen, scrolled to the top-left.
    pub fn new() -> Self {
        Self {
            scale: MAX_SCALE,
            fullscreen: false,
            pending: None,
            fullscreen_error: None,
            drag: None,
            scroll: (0, 0),
            content: (0, 0),
            viewport: (0, 0),
        }
    }

    // -----------------------------------------------------------------
    // Zoom
    // -----------------------------------------------------------------

    /// Zoom level in percent.
    #[inline]
    pub fn scale(&self) -> u16 {
        self.scale
    }

    /// Zoom level as a factor (`0.3..=1.0`).
    #[inline]
    pub fn scale_factor(&self) -> f64 {
        f64::from(self.scale) / 100.0
    }

    pub fn can_zoom_in(&self) -> bool {
        self.scale < MAX_SCALE
    }

    pub fn can_zoom_out(&self) -> bool {
        self.scale > MIN_SCALE
    }

    /// Step the zoom up. Returns `false` when already at the maximum.
    pub fn zoom_in(&mut self) -> bool {
        if !self.can_zoom_in() {
            return false;
        }
        self.scale += SCALE_STEP;
        gtree_core::debug!(scale = self.scale, "zoom in");
        true
    }

    /// Step the zoom down. Returns `false` when already at the minimum.
    pub fn zoom_out(&mut self) -> bool {
        if !self.can_zoom_out() {
            return false;
        }
        self.scale -= SCALE_STEP;
        gtree_core::debug!(scale = self.scale, "zoom out");
        true
    }

    // -----------------------------------------------------------------
    // Fullscreen
    // -----------------------------------------------------------------

    #[inline]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Request in flight, if any.
    pub fn pending_fullscreen(&self) -> Option<FullscreenRequest> {
        self.pending
    }

    /// Message from the last failed fullscreen request.
    pub fn fullscreen_error(&self) -> Option<&str> {
        self.fullscreen_error.as_deref()
    }

    /// Issue a request to enter fullscreen, or to exit it when active.
    ///
    /// The flag itself does not change until [`Self::resolve_fullscreen`].
    pub fn toggle_fullscreen(&mut self) -> FullscreenRequest {
        let request = if self.fullscreen {
            FullscreenRequest::Exit
        } else {
            FullscreenRequest::Enter
        };
        self.pending = Some(request);
        request
    }

    /// Apply the outcome of a fullscreen request.
    ///
    /// Returns `true` if the flag changed.
    pub fn resolve_fullscreen(&mut self, request: FullscreenRequest, result: io::Result<()>) -> bool {
        if self.pending == Some(request) {
            self.pending = None;
        }
        match result {
            Ok(()) => {
                self.fullscreen_error = None;
                let next = request == FullscreenRequest::Enter;
                let changed = next != self.fullscreen;
                self.fullscreen = next;
                gtree_core::info!(fullscreen = next, "fullscreen changed");
                changed
            }
            Err(err) => {
                gtree_core::warn!(?request, error = %err, "fullscreen request failed");
                self.fullscreen_error = Some(err.to_string());
                false
            }
        }
    }

    /// Adopt a fullscreen state reported by the host outside the request
    /// path.
    pub fn sync_fullscreen(&mut self, active: bool) {
        self.fullscreen = active;
        self.pending = None;
    }

    // -----------------------------------------------------------------
    // Scrolling
    // -----------------------------------------------------------------

    /// Current scroll offsets `(x, y)`.
    #[inline]
    pub fn scroll(&self) -> (i32, i32) {
        self.scroll
    }

    /// Logical content size.
    pub fn content_size(&self) -> (i32, i32) {
        self.content
    }

    /// Visible canvas size.
    pub fn viewport_size(&self) -> (u16, u16) {
        self.viewport
    }

    pub fn set_content_size(&mut self, width: i32, height: i32) {
        self.content = (width.max(0), height.max(0));
        self.set_scroll(self.scroll.0, self.scroll.1);
    }

    pub fn set_viewport_size(&mut self, width: u16, height: u16) {
        self.viewport = (width, height);
        self.set_scroll(self.scroll.0, self.scroll.1);
    }

    /// Largest valid scroll offsets.
    pub fn max_scroll(&self) -> (i32, i32) {
        (
            (self.content.0 - i32::from(self.viewport.0)).max(0),
            (self.content.1 - i32::from(self.viewport.1)).max(0),
        )
    }

    /// Scroll to `(x, y)`, clamped. Returns `true` if the offsets changed.
    pub fn set_scroll(&mut self, x: i32, y: i32) -> bool {
        let (max_x, max_y) = self.max_scroll();
        let next = (x.clamp(0, max_x), y.clamp(0, max_y));
        let changed = next != self.scroll;
        self.scroll = next;
        changed
    }

    /// Scroll by a relative amount, clamped.
    pub fn scroll_by(&mut self, dx: i32, dy: i32) -> bool {
        self.set_scroll(self.scroll.0.saturating_add(dx), self.scroll.1.saturating_add(dy))
    }

    // -----------------------------------------------------------------
    // Drag-to-pan
    // -----------------------------------------------------------------

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Start dragging: remember where the pointer and the scroll were.
    pub fn pointer_down(&mut self, x: u16, y: u16) {
        self.drag = Some(DragAnchor {
            pointer: (i32::from(x), i32::from(y)),
            scroll: self.scroll,
        });
    }

    /// Pan while dragging. Returns `true` if the offsets changed.
    pub fn pointer_move(&mut self, x: u16, y: u16) -> bool {
        let Some(anchor) = self.drag else {
            return false;
        };
        let delta = (
            i32::from(x) - anchor.pointer.0,
            i32::from(y) - anchor.pointer.1,
        );
        let (sx, sy) = drag_scroll(anchor.scroll, delta);
        self.set_scroll(sx, sy)
    }

    /// Stop dragging.
    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    /// Stop dragging because the pointer left the canvas.
    pub fn pointer_leave(&mut self) {
        self.drag = None;
    }

    /// Mirror single-contact touch gestures onto the pointer handlers.
    pub fn touch(&mut self, event: &TouchEvent) -> bool {
        match (event.phase, event.single()) {
            (TouchPhase::Start, Some((x, y))) => {
                self.pointer_down(x, y);
                false
            }
            (TouchPhase::Move, Some((x, y))) => self.pointer_move(x, y),
            (TouchPhase::End, _) => {
                self.pointer_up();
                false
            }
            _ => false,
        }
    }

    // -----------------------------------------------------------------
    // Projection
    // -----------------------------------------------------------------

    /// Left padding that centers content narrower than the viewport.
    fn origin_x(&self) -> i32 {
        ((i32::from(self.viewport.0) - self.content.0) / 2).max(0)
    }

    /// Scaled x position in content space, before scrolling.
    fn scaled_x(&self, x: i32) -> i32 {
        let cx = f64::from(self.content.0) / 2.0;
        (cx + (f64::from(x) - cx) * self.scale_factor()).round() as i32
    }

    fn scaled_y(&self, y: i32) -> i32 {
        (f64::from(y) * self.scale_factor()).round() as i32
    }

    /// Screen x of a logical column, relative to the canvas left edge.
    pub fn project_x(&self, x: i32) -> i32 {
        self.origin_x() + self.scaled_x(x) - self.scroll.0
    }

    /// Screen y of a logical row, relative to the canvas top edge.
    pub fn project_y(&self, y: i32) -> i32 {
        self.scaled_y(y) - self.scroll.1
    }

    /// Scaled width of a logical span (at least one cell).
    pub fn project_width(&self, width: i32) -> i32 {
        ((f64::from(width) * self.scale_factor()).floor() as i32).max(1)
    }

    /// Scroll just enough for `rect` (scaled, `rendered_height` rows tall)
    /// to be visible. Returns `true` if the offsets changed.
    pub fn reveal(&mut self, rect: LogicalRect, rendered_height: i32) -> bool {
        let left = self.origin_x() + self.scaled_x(rect.x);
        let right = left + self.project_width(rect.width);
        let top = self.scaled_y(rect.y);
        let bottom = top + rendered_height;
        let (vw, vh) = (i32::from(self.viewport.0), i32::from(self.viewport.1));
        let (mut sx, mut sy) = self.scroll;
        if right > sx + vw {
            sx = right - vw;
        }
        if left < sx {
            sx = left;
        }
        if bottom > sy + vh {
            sy = bottom - vh;
        }
        if top < sy {
            sy = top;
        }
        self.set_scroll(sx, sy)
    }
}
