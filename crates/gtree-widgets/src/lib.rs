#![forbid(unsafe_code)]

//! Widgets for the genealogy tree viewer.
//!
//! The pieces compose bottom-up:
//!
//! - [`expansion::ExpansionState`] records which node IDs are expanded.
//! - [`layout::TreeLayout`] places visible cards in logical cells at 100%
//!   scale, honoring expansion and filters.
//! - [`viewport::ViewportController`] owns zoom, fullscreen and scrolling,
//!   and maps logical cells to the screen.
//! - [`tree_card::TreeCard`] draws one node; [`popover::DetailPopover`]
//!   draws the floating detail panel.
//! - [`genealogy::GenealogyTree`] renders all of the above into a frame and
//!   [`genealogy::GenealogyState`] turns input into state changes.

pub mod expansion;
pub mod genealogy;
pub mod layout;
pub mod painter;
pub mod popover;
pub mod theme;
pub mod tree_card;
pub mod viewport;

use gtree_core::geometry::Rect;
use gtree_model::NodeId;
use gtree_render::buffer::Buffer;
use gtree_render::drawing::Draw;
use gtree_render::frame::Frame;
use gtree_render::style::Style;

/// A `Widget` is a renderable component.
///
/// Widgets draw into the frame's buffer within `area` and may register hit
/// regions for mouse interaction.
pub trait Widget {
    /// Render the widget into the frame at the given area.
    fn render(&self, area: Rect, frame: &mut Frame);
}

/// Outcome of routing a pointer event to a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseResult {
    /// The event did not concern this widget.
    Ignored,
    /// A node's expansion toggle was activated.
    Toggled(NodeId),
    /// A node was clicked (pressed and released without dragging).
    Selected(NodeId),
    /// The pointer now hovers a different node, or none.
    Hovered(Option<NodeId>),
    /// The canvas was panned or scrolled.
    Scrolled,
}

impl MouseResult {
    /// Whether the event changed anything that needs a redraw.
    pub fn is_handled(self) -> bool {
        !matches!(self, MouseResult::Ignored)
    }
}

/// Draw a styled text span, returning the x position after the last cell.
///
/// Stops at `max_x` (exclusive).
pub(crate) fn draw_text_span(
    buf: &mut Buffer,
    x: u16,
    y: u16,
    content: &str,
    style: Style,
    max_x: u16,
) -> u16 {
    buf.print_text_clipped(x, y, content, style.cell(' '), max_x)
}

/// Fill `area` with blanks in the given style.
pub(crate) fn clear_area(buf: &mut Buffer, area: Rect, style: Style) {
    buf.fill(area, style.cell(' '));
}
