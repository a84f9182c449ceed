#![forbid(unsafe_code)]

//! Floating detail panel for a node.
//!
//! [`place_popover`] positions a panel next to an anchor: on the preferred
//! side when it fits, flipped to the opposite side when it would clip, and
//! then shifted along the perpendicular axis to stay inside the bounds.

use gtree_core::geometry::{Rect, Size};
use gtree_model::{TreeNode, display, plan_label, pv_display, rank_label};
use gtree_render::display_width;
use gtree_render::drawing::{BorderChars, Draw};
use gtree_render::frame::{Frame, HitId, HitRegion};
use gtree_render::truncate_to_width;

use crate::{Widget, clear_area, draw_text_span, theme};

/// Side of the anchor the panel is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    Bottom,
    Top,
    Right,
    Left,
}

impl Placement {
    pub fn opposite(self) -> Self {
        match self {
            Self::Bottom => Self::Top,
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Left => Self::Right,
        }
    }

    fn is_vertical(self) -> bool {
        matches!(self, Self::Bottom | Self::Top)
    }
}

/// Screen rectangle of the anchoring element. Coordinates may be negative
/// when the element is partly scrolled out of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Anchor {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Where a panel ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopoverPlacement {
    pub rect: Rect,
    pub side: Placement,
}

/// Position a `size` panel next to `anchor` inside `bounds`.
///
/// The panel never extends outside `bounds`; it is shrunk if it is larger
/// than the bounds themselves.
pub fn place_popover(anchor: Anchor, size: Size, bounds: Rect, preferred: Placement) -> PopoverPlacement {
    let bx0 = i32::from(bounds.x);
    let by0 = i32::from(bounds.y);
    let bx1 = i32::from(bounds.right());
    let by1 = i32::from(bounds.bottom());
    let w = i32::from(size.width.min(bounds.width));
    let h = i32::from(size.height.min(bounds.height));

    let origin = |side: Placement| -> (i32, i32) {
        match side {
            Placement::Bottom => (anchor.x + (anchor.width - w) / 2, anchor.y + anchor.height),
            Placement::Top => (anchor.x + (anchor.width - w) / 2, anchor.y - h),
            Placement::Right => (anchor.x + anchor.width, anchor.y),
            Placement::Left => (anchor.x - w, anchor.y),
        }
    };
    // Room on the main axis for a given side.
    let fits = |side: Placement| -> bool {
        let (x, y) = origin(side);
        if side.is_vertical() {
            y >= by0 && y + h <= by1
        } else {
            x >= bx0 && x + w <= bx1
        }
    };
    let space = |side: Placement| -> i32 {
        match side {
            Placement::Bottom => by1 - (anchor.y + anchor.height),
            Placement::Top => anchor.y - by0,
            Placement::Right => bx1 - (anchor.x + anchor.width),
            Placement::Left => anchor.x - bx0,
        }
    };

    let side = if fits(preferred) {
        preferred
    } else if fits(preferred.opposite()) {
        preferred.opposite()
    } else if space(preferred.opposite()) > space(preferred) {
        preferred.opposite()
    } else {
        preferred
    };

    let (x, y) = origin(side);
    let x = x.clamp(bx0, (bx1 - w).max(bx0));
    let y = y.clamp(by0, (by1 - h).max(by0));
    PopoverPlacement {
        rect: Rect::new(x as u16, y as u16, w as u16, h as u16),
        side,
    }
}

/// Label column width.
const LABEL_WIDTH: usize = 12;
/// Widest value column before truncation.
const MAX_VALUE_WIDTH: usize = 36;

/// Detail panel listing a member's profile fields.
#[derive(Debug, Clone)]
pub struct DetailPopover<'a> {
    node: &'a TreeNode,
    hit_id: Option<HitId>,
}

impl<'a> DetailPopover<'a> {
    pub fn new(node: &'a TreeNode) -> Self {
        Self { node, hit_id: None }
    }

    /// Register the panel so clicks on it do not fall through to cards.
    #[must_use]
    pub fn hit_id(mut self, id: HitId) -> Self {
        self.hit_id = Some(id);
        self
    }

    /// Label/value rows in display order.
    pub fn lines(&self) -> Vec<(&'static str, String)> {
        let node = self.node;
        vec![
            ("Username", display::or_dash(&node.username).to_string()),
            (
                "Full Name",
                display::or_dash(node.fullname.as_deref().unwrap_or_default()).to_string(),
            ),
            ("Email", display::or_dash(&node.email).to_string()),
            ("Personal PV", pv_display(node.personal_pv.as_ref())),
            ("Plan", plan_label(node.plan.as_deref()).to_string()),
            ("Rank", rank_label(node.rank.as_deref()).to_string()),
        ]
    }

    /// Size of the panel including its border.
    pub fn size(&self) -> Size {
        let value_width = self
            .lines()
            .iter()
            .map(|(_, v)| display_width(v))
            .max()
            .unwrap_or(0)
            .min(MAX_VALUE_WIDTH);
        let width = 2 + LABEL_WIDTH + value_width + 2;
        let height = self.lines().len() + 2;
        Size::new(width as u16, height as u16)
    }
}

impl Widget for DetailPopover<'_> {
    fn render(&self, area: Rect, frame: &mut Frame) {
        if area.width < 4 || area.height < 3 {
            return;
        }
        let buf = &mut frame.buffer;
        clear_area(buf, area, theme::popover());
        buf.draw_border(area, BorderChars::ROUNDED, theme::popover_border().cell(' '));
        draw_text_span(
            buf,
            area.x + 2,
            area.y,
            " Details ",
            theme::popover_border().bold(),
            area.right().saturating_sub(1),
        );

        let inner = Rect::new(area.x + 2, area.y + 1, area.width - 4, area.height - 2);
        let max_x = inner.right();
        for (row, (label, value)) in self.lines().into_iter().enumerate() {
            let y = inner.y + row as u16;
            if y >= inner.bottom() {
                break;
            }
            draw_text_span(buf, inner.x, y, label, theme::popover_label(), max_x);
            let vx = inner.x.saturating_add(LABEL_WIDTH as u16);
            if vx < max_x {
                let room = usize::from(max_x - vx);
                draw_text_span(buf, vx, y, &truncate_to_width(&value, room), theme::popover(), max_x);
            }
        }

        if let Some(id) = self.hit_id {
            frame.register_hit(area, id, HitRegion::Custom(1), self.node.id);
        }
    }
}
