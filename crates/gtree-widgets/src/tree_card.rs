#![forbid(unsafe_code)]

//! Card for one tree member.
//!
//! A card shows the initials avatar, the member's name, the server-side
//! left/right counts and, when the node has children, an expand/collapse
//! control. The control registers as [`HitRegion::Button`] and the rest of
//! the card as [`HitRegion::Content`], both carrying the node id, so a
//! click on the control toggles expansion without reaching the card's own
//! popover handler.
//!
//! How much is drawn depends on the zoom level, see [`DetailLevel`].

use gtree_core::geometry::Rect;
use gtree_model::{TreeNode, display_name, has_children, initials};
use gtree_render::drawing::BorderChars;
use gtree_render::frame::{Frame, HitId, HitRegion};
use gtree_render::truncate_to_width;

use crate::Widget;
use crate::painter::Painter;
use crate::theme;

/// Glyph for an expanded node.
pub const EXPANDED_GLYPH: char = '▾';
/// Glyph for a collapsed node.
pub const COLLAPSED_GLYPH: char = '▸';

/// How much of a card is drawn at a given zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailLevel {
    /// Bordered card with avatar, name, username and counts.
    Full,
    /// Two unbordered lines: avatar and name, then counts.
    Compact,
    /// A single-line initials chip.
    Chip,
}

impl DetailLevel {
    /// Level for a zoom percentage.
    pub fn for_scale(scale: u16) -> Self {
        match scale {
            80.. => Self::Full,
            50..=79 => Self::Compact,
            _ => Self::Chip,
        }
    }

    /// Rows a card occupies on screen.
    pub const fn height(self) -> i32 {
        match self {
            Self::Full => 5,
            Self::Compact => 2,
            Self::Chip => 1,
        }
    }
}

/// Renderer for a single node.
#[derive(Debug, Clone)]
pub struct TreeCard<'a> {
    node: &'a TreeNode,
    expanded: bool,
    has_children: bool,
    focused: bool,
    level: DetailLevel,
    hit_id: Option<HitId>,
}

impl<'a> TreeCard<'a> {
    pub fn new(node: &'a TreeNode) -> Self {
        Self {
            node,
            expanded: false,
            has_children: has_children(node),
            focused: false,
            level: DetailLevel::Full,
            hit_id: None,
        }
    }

    #[must_use]
    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    #[must_use]
    pub fn level(mut self, level: DetailLevel) -> Self {
        self.level = level;
        self
    }

    /// Set a hit ID for mouse interaction.
    #[must_use]
    pub fn hit_id(mut self, id: HitId) -> Self {
        self.hit_id = Some(id);
        self
    }

    /// Directional indicator for the toggle control.
    pub fn indicator(&self) -> char {
        if self.expanded {
            EXPANDED_GLYPH
        } else {
            COLLAPSED_GLYPH
        }
    }

    /// Initials, or `··` when the name yields none.
    fn avatar(&self) -> String {
        let text = initials(self.node.fullname.as_deref());
        if text.is_empty() { "··".to_string() } else { text }
    }

    /// Draw the card with its top-left corner at `(x, y)`, `width` cells wide.
    pub fn paint(&self, painter: &mut Painter<'_>, x: i32, y: i32, width: i32) {
        if width <= 0 {
            return;
        }
        let height = self.level.height();
        if let Some(id) = self.hit_id {
            painter.hit(x, y, width, height, id, HitRegion::Content, self.node.id);
        }
        match self.level {
            DetailLevel::Full => self.paint_full(painter, x, y, width),
            DetailLevel::Compact => self.paint_compact(painter, x, y, width),
            DetailLevel::Chip => self.paint_chip(painter, x, y, width),
        }
    }

    fn paint_full(&self, p: &mut Painter<'_>, x: i32, y: i32, width: i32) {
        let (chars, border) = if self.focused {
            (BorderChars::HEAVY, theme::card_border_focused())
        } else {
            (BorderChars::ROUNDED, theme::card_border())
        };
        p.fill(x, y, width, 5, theme::title().cell(' '));
        p.border(x, y, width, 5, chars, border);

        let inner_x = x + 2;
        let max_x = x + width - 2;
        let after_avatar = p.text(inner_x, y + 1, &self.avatar(), theme::avatar(), max_x);
        let name_room = (max_x - after_avatar - 2).max(0) as usize;
        p.text(
            after_avatar + 2,
            y + 1,
            &truncate_to_width(display_name(self.node), name_room),
            theme::title(),
            max_x,
        );

        if !self.node.username.is_empty() {
            let handle = format!("@{}", self.node.username);
            let room = (max_x - inner_x).max(0) as usize;
            p.text(inner_x, y + 2, &truncate_to_width(&handle, room), theme::subtle(), max_x);
        }

        let left = format!("L {}", self.node.left_count);
        let right = format!("R {}", self.node.right_count);
        p.text(inner_x, y + 3, &left, theme::subtle(), max_x);
        let right_x = (max_x - right.chars().count() as i32).max(inner_x + left.len() as i32 + 1);
        p.text(right_x, y + 3, &right, theme::subtle(), max_x);

        if self.has_children && width >= 5 {
            let control = format!("[{}]", self.indicator());
            let cx = x + (width - 3) / 2;
            p.text(cx, y + 4, &control, theme::toggle(), x + width - 1);
            self.register_toggle(p, cx, y + 4, 3);
        }
    }

    fn paint_compact(&self, p: &mut Painter<'_>, x: i32, y: i32, width: i32) {
        let base = theme::chip(self.focused);
        p.fill(x, y, width, 2, base.cell(' '));
        let end = x + width;
        let control_w = if self.has_children && width >= 6 { 3 } else { 0 };
        let text_end = end - control_w;

        let after_avatar = p.text(x, y, &self.avatar(), base.patch(theme::avatar()), text_end);
        let room = (text_end - after_avatar - 1).max(0) as usize;
        p.text(
            after_avatar + 1,
            y,
            &truncate_to_width(display_name(self.node), room),
            base.bold(),
            text_end,
        );
        if control_w > 0 {
            let cx = end - control_w;
            p.text(cx, y, &format!("[{}]", self.indicator()), base.bold(), end);
            self.register_toggle(p, cx, y, control_w);
        }

        let counts = format!("L {} · R {}", self.node.left_count, self.node.right_count);
        p.text(x, y + 1, &counts, base, end);
    }

    fn paint_chip(&self, p: &mut Painter<'_>, x: i32, y: i32, width: i32) {
        let base = theme::chip(self.focused);
        p.fill(x, y, width, 1, base.cell(' '));
        let end = x + width;
        let control = self.has_children && width >= 2;
        let text_end = if control { end - 1 } else { end };
        p.text(x, y, &self.avatar(), base.bold(), text_end);
        if control {
            p.set(end - 1, y, base.bold().cell(self.indicator()));
            self.register_toggle(p, end - 1, y, 1);
        }
    }

    fn register_toggle(&self, p: &mut Painter<'_>, x: i32, y: i32, width: i32) {
        if let Some(id) = self.hit_id {
            p.hit(x, y, width, 1, id, HitRegion::Button, self.node.id);
        }
    }
}

impl Widget for TreeCard<'_> {
    fn render(&self, area: Rect, frame: &mut Frame) {
        if area.is_empty() {
            return;
        }
        let mut painter = Painter::new(frame, area);
        self.paint(
            &mut painter,
            i32::from(area.x),
            i32::from(area.y),
            i32::from(area.width),
        );
    }
}
