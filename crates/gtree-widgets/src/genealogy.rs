#![forbid(unsafe_code)]

//! The genealogy tree canvas.
//!
//! [`GenealogyTree`] draws a laid-out tree through the viewport: connectors
//! first, then cards in render order, then the detail popover on top.
//! [`GenealogyState`] owns everything the user can change (expansion,
//! zoom/scroll, focus, hover, pinned popover) and is mutated only through
//! its input handlers.
//!
//! # Gestures
//!
//! | Input | Effect |
//! |-------|--------|
//! | Press on a toggle control | Toggle expansion (no drag, no popover) |
//! | Press elsewhere on the canvas | Start drag-to-pan |
//! | Press and release on a card without moving | Pin/unpin its popover |
//! | Pointer motion over a card | Show its popover |
//! | Wheel, arrow keys | Scroll |
//! | `Tab` / `Shift-Tab` | Move keyboard focus |
//! | `Enter` / `Space` | Toggle the focused card |
//! | `+` / `-` | Zoom |
//! | `Esc` | Close the popover |

use gtree_core::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind, TouchEvent};
use gtree_core::geometry::Rect;
use gtree_model::{NodeId, TreeFilter, TreeNode};
use gtree_render::frame::{Frame, HitData, HitId, HitRegion};

use crate::expansion::ExpansionState;
use crate::layout::{LogicalRect, TreeLayout};
use crate::painter::Painter;
use crate::popover::{Anchor, DetailPopover, Placement, place_popover};
use crate::tree_card::{DetailLevel, TreeCard};
use crate::viewport::{SCROLL_STEP_X, SCROLL_STEP_Y, ViewportController};
use crate::{MouseResult, Widget, theme};

/// Hit ID shared by every card on the canvas; hit data is the node id.
pub const CARD_HIT_ID: HitId = HitId::new(1);
/// Hit ID of the detail popover.
pub const POPOVER_HIT_ID: HitId = HitId::new(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Press {
    id: NodeId,
    at: (u16, u16),
    moved: bool,
}

/// Interaction state of the tree canvas.
#[derive(Debug, Clone)]
pub struct GenealogyState {
    expansion: ExpansionState,
    viewport: ViewportController,
    focus: Option<NodeId>,
    hovered: Option<NodeId>,
    pinned: Option<NodeId>,
    press: Option<Press>,
    canvas: Rect,
}

impl GenealogyState {
    /// State for a tree rooted at `root_id`.
    pub fn new(root_id: NodeId) -> Self {
        Self {
            expansion: ExpansionState::new(root_id),
            viewport: ViewportController::new(),
            focus: None,
            hovered: None,
            pinned: None,
            press: None,
            canvas: Rect::default(),
        }
    }

    /// Start over for a newly loaded root. Zoom and fullscreen are kept.
    pub fn reset(&mut self, root_id: NodeId) {
        self.expansion.reset(root_id);
        self.focus = None;
        self.hovered = None;
        self.pinned = None;
        self.press = None;
        self.viewport.pointer_up();
        self.viewport.set_scroll(0, 0);
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportController {
        &mut self.viewport
    }

    /// Flip the expansion of `id`. Returns `true` if it is now expanded.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        let expanded = self.expansion.toggle(id);
        gtree_core::debug!(node = id, expanded, "toggled node");
        expanded
    }

    pub fn focus(&self) -> Option<NodeId> {
        self.focus
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn pinned(&self) -> Option<NodeId> {
        self.pinned
    }

    /// Node whose detail popover is showing: hovered, then pinned, then
    /// focused.
    pub fn popover_target(&self) -> Option<NodeId> {
        self.hovered.or(self.pinned).or(self.focus)
    }

    /// Dismiss the popover. Returns `false` if none was showing.
    pub fn close_popover(&mut self) -> bool {
        let open = self.popover_target().is_some();
        self.hovered = None;
        self.pinned = None;
        self.focus = None;
        open
    }

    /// Screen area of the canvas.
    pub fn canvas(&self) -> Rect {
        self.canvas
    }

    pub fn set_canvas(&mut self, area: Rect) {
        self.canvas = area;
        self.viewport.set_viewport_size(area.width, area.height);
    }

    /// Adopt a freshly computed layout: update the scroll extent and drop
    /// references to cards that are no longer visible.
    pub fn sync_layout(&mut self, layout: &TreeLayout<'_>) {
        self.viewport.set_content_size(layout.width, layout.height);
        let keep = |id: Option<NodeId>| id.filter(|id| layout.contains(*id));
        self.focus = keep(self.focus);
        self.hovered = keep(self.hovered);
        self.pinned = keep(self.pinned);
    }

    fn level(&self) -> DetailLevel {
        DetailLevel::for_scale(self.viewport.scale())
    }

    fn reveal(&mut self, rect: LogicalRect) {
        let height = self.level().height();
        self.viewport.reveal(rect, height);
    }

    /// Move focus to the next (or previous) visible card.
    pub fn focus_next(&mut self, layout: &TreeLayout<'_>, backwards: bool) -> Option<NodeId> {
        self.focus = layout.next_card(self.focus, backwards);
        if let Some(card) = self.focus.and_then(|id| layout.card(id)) {
            let rect = card.rect;
            self.reveal(rect);
        }
        self.focus
    }

    /// Route a mouse event. `hit` is the previous frame's hit test at the
    /// event position.
    pub fn handle_mouse(
        &mut self,
        event: &MouseEvent,
        hit: Option<(HitId, HitRegion, HitData)>,
    ) -> MouseResult {
        let (x, y) = event.position();
        let inside = self.canvas.contains(x, y);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if !inside {
                    return MouseResult::Ignored;
                }
                if let Some((CARD_HIT_ID, HitRegion::Button, id)) = hit {
                    self.toggle(id);
                    return MouseResult::Toggled(id);
                }
                self.viewport.pointer_down(x, y);
                self.press = match hit {
                    Some((CARD_HIT_ID, HitRegion::Content, id)) => Some(Press {
                        id,
                        at: (x, y),
                        moved: false,
                    }),
                    _ => None,
                };
                MouseResult::Ignored
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if !inside {
                    return self.leave();
                }
                if let Some(press) = self.press.as_mut() {
                    press.moved |= press.at != (x, y);
                }
                if self.viewport.pointer_move(x, y) {
                    MouseResult::Scrolled
                } else {
                    MouseResult::Ignored
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.viewport.pointer_up();
                let Some(press) = self.press.take() else {
                    return MouseResult::Ignored;
                };
                match hit {
                    Some((CARD_HIT_ID, HitRegion::Content, id)) if id == press.id && !press.moved => {
                        self.pinned = if self.pinned == Some(id) { None } else { Some(id) };
                        self.focus = Some(id);
                        MouseResult::Selected(id)
                    }
                    _ => MouseResult::Ignored,
                }
            }
            MouseEventKind::Moved => {
                if !inside {
                    return self.leave();
                }
                let next = match hit {
                    Some((CARD_HIT_ID, _, id)) => Some(id),
                    Some((POPOVER_HIT_ID, _, _)) => self.hovered,
                    _ => None,
                };
                if next == self.hovered {
                    MouseResult::Ignored
                } else {
                    self.hovered = next;
                    MouseResult::Hovered(next)
                }
            }
            MouseEventKind::ScrollUp if inside => self.scrolled(0, -SCROLL_STEP_Y),
            MouseEventKind::ScrollDown if inside => self.scrolled(0, SCROLL_STEP_Y),
            MouseEventKind::ScrollLeft if inside => self.scrolled(-SCROLL_STEP_X, 0),
            MouseEventKind::ScrollRight if inside => self.scrolled(SCROLL_STEP_X, 0),
            _ => MouseResult::Ignored,
        }
    }

    /// The pointer left the drawing area entirely.
    pub fn pointer_left(&mut self) -> MouseResult {
        self.leave()
    }

    /// Pointer left the canvas: stop dragging and drop the hover.
    fn leave(&mut self) -> MouseResult {
        self.viewport.pointer_leave();
        self.press = None;
        if self.hovered.take().is_some() {
            MouseResult::Hovered(None)
        } else {
            MouseResult::Ignored
        }
    }

    fn scrolled(&mut self, dx: i32, dy: i32) -> MouseResult {
        if self.viewport.scroll_by(dx, dy) {
            MouseResult::Scrolled
        } else {
            MouseResult::Ignored
        }
    }

    /// Route a touch event; single contacts pan like a mouse drag.
    pub fn handle_touch(&mut self, event: &TouchEvent) -> MouseResult {
        if self.viewport.touch(event) {
            MouseResult::Scrolled
        } else {
            MouseResult::Ignored
        }
    }

    /// Route a key press. Returns `true` if the key was consumed.
    pub fn handle_key(&mut self, key: &KeyEvent, layout: &TreeLayout<'_>) -> bool {
        let (_, vh) = self.viewport.viewport_size();
        let page = i32::from(vh).max(1);
        match key.code {
            KeyCode::Tab => {
                self.focus_next(layout, false);
                true
            }
            KeyCode::BackTab => {
                self.focus_next(layout, true);
                true
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let target = self
                    .focus
                    .and_then(|id| layout.card(id))
                    .filter(|card| card.has_children)
                    .map(|card| card.id());
                match target {
                    Some(id) => {
                        self.toggle(id);
                        true
                    }
                    None => false,
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.viewport.zoom_in(),
            KeyCode::Char('-') | KeyCode::Char('_') => self.viewport.zoom_out(),
            KeyCode::Up => self.viewport.scroll_by(0, -SCROLL_STEP_Y),
            KeyCode::Down => self.viewport.scroll_by(0, SCROLL_STEP_Y),
            KeyCode::Left => self.viewport.scroll_by(-SCROLL_STEP_X, 0),
            KeyCode::Right => self.viewport.scroll_by(SCROLL_STEP_X, 0),
            KeyCode::PageUp => self.viewport.scroll_by(0, -page),
            KeyCode::PageDown => self.viewport.scroll_by(0, page),
            KeyCode::Home => self.viewport.set_scroll(0, 0),
            KeyCode::Escape => self.close_popover(),
            _ => false,
        }
    }
}

/// Canvas widget drawing a tree through a [`GenealogyState`].
#[derive(Debug, Clone)]
pub struct GenealogyTree<'a> {
    root: &'a TreeNode,
    state: &'a GenealogyState,
    filter: &'a TreeFilter,
}

impl<'a> GenealogyTree<'a> {
    pub fn new(root: &'a TreeNode, state: &'a GenealogyState, filter: &'a TreeFilter) -> Self {
        Self {
            root,
            state,
            filter,
        }
    }

    /// Layout this widget draws.
    pub fn layout(&self) -> TreeLayout<'a> {
        TreeLayout::compute(self.root, &self.state.expansion, self.filter)
    }
}

impl Widget for GenealogyTree<'_> {
    fn render(&self, area: Rect, frame: &mut Frame) {
        if area.is_empty() {
            return;
        }
        let layout = self.layout();
        let vp = &self.state.viewport;
        let level = self.state.level();
        let (ox, oy) = (i32::from(area.x), i32::from(area.y));
        let screen = |rect: LogicalRect| -> Anchor {
            Anchor::new(
                ox + vp.project_x(rect.x),
                oy + vp.project_y(rect.y),
                vp.project_width(rect.width),
                level.height(),
            )
        };

        let mut painter = Painter::new(frame, area);
        let stem = theme::connector().cell('│');
        for conn in &layout.connectors {
            let x = ox + vp.project_x(conn.x);
            let top = oy + vp.project_y(conn.card_top) + level.height();
            let bottom = oy + vp.project_y(conn.bottom);
            painter.vline(x, top, bottom - top, stem);
        }

        for card in &layout.cards {
            let at = screen(card.rect);
            TreeCard::new(card.node)
                .expanded(card.expanded)
                .focused(self.state.focus == Some(card.id()))
                .level(level)
                .hit_id(CARD_HIT_ID)
                .paint(&mut painter, at.x, at.y, at.width);
        }

        let target = self
            .state
            .popover_target()
            .and_then(|id| layout.card(id));
        if let Some(card) = target {
            let popover = DetailPopover::new(card.node).hit_id(POPOVER_HIT_ID);
            let placed = place_popover(screen(card.rect), popover.size(), area, Placement::Bottom);
            popover.render(placed.rect, painter.frame());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtree_core::event::{Modifiers, TouchPhase};

    fn tree() -> TreeNode {
        TreeNode::new(1, "root")
            .with_fullname("Root Admin")
            .with_left(TreeNode::new(2, "alice").with_left(TreeNode::new(4, "dave")))
            .with_right(TreeNode::new(3, "bob"))
    }

    fn state(area: Rect) -> GenealogyState {
        let mut state = GenealogyState::new(1);
        state.set_canvas(area);
        state
    }

    fn draw(root: &TreeNode, state: &mut GenealogyState, filter: &TreeFilter) -> Frame {
        let area = state.canvas();
        let layout = TreeLayout::compute(root, state.expansion(), filter);
        state.sync_layout(&layout);
        let mut frame = Frame::new(area.right().max(1), area.bottom().max(1));
        GenealogyTree::new(root, state, filter).render(area, &mut frame);
        frame
    }

    fn mouse(kind: MouseEventKind, x: u16, y: u16) -> MouseEvent {
        MouseEvent::new(kind, x, y)
    }

    fn click(state: &mut GenealogyState, frame: &Frame, x: u16, y: u16) -> MouseResult {
        let hit = frame.hit_test(x, y);
        state.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), x, y), hit);
        state.handle_mouse(&mouse(MouseEventKind::Up(MouseButton::Left), x, y), hit)
    }

    fn find_glyph(frame: &Frame, glyph: char) -> Option<(u16, u16)> {
        (0..frame.height()).find_map(|y| {
            (0..frame.width())
                .find(|&x| frame.buffer.get(x, y).is_some_and(|c| c.ch == glyph))
                .map(|x| (x, y))
        })
    }

    #[test]
    fn renders_root_and_first_level() {
        let root = tree();
        let mut st = state(Rect::new(0, 0, 80, 30));
        let frame = draw(&root, &mut st, &TreeFilter::none());
        let all: String = (0..30).map(|y| frame.buffer.row_text(y)).collect();
        assert!(all.contains("Root Admin"));
        assert!(all.contains("@alice"));
        assert!(all.contains("@bob"));
        assert!(!all.contains("@dave"));
    }

    #[test]
    fn toggle_click_expands_without_popover() {
        let root = tree();
        let mut st = state(Rect::new(0, 0, 80, 30));
        let frame = draw(&root, &mut st, &TreeFilter::none());
        // Alice's collapsed control is the first ▸ on screen.
        let (x, y) = find_glyph(&frame, '▸').unwrap();
        let hit = frame.hit_test(x, y);
        assert_eq!(hit, Some((CARD_HIT_ID, HitRegion::Button, 2)));
        let result = st.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), x, y), hit);
        assert_eq!(result, MouseResult::Toggled(2));
        st.handle_mouse(&mouse(MouseEventKind::Up(MouseButton::Left), x, y), hit);
        assert!(st.expansion().is_expanded(2));
        assert_eq!(st.popover_target(), None);
        assert!(!st.viewport().is_dragging());

        let frame = draw(&root, &mut st, &TreeFilter::none());
        let all: String = (0..30).map(|y| frame.buffer.row_text(y)).collect();
        assert!(all.contains("@dave"));
    }

    #[test]
    fn click_on_body_pins_popover() {
        let root = tree();
        let mut st = state(Rect::new(0, 0, 80, 30));
        let frame = draw(&root, &mut st, &TreeFilter::none());
        let (x, y) = find_glyph(&frame, '@').unwrap();
        let hit = frame.hit_test(x, y);
        let id = hit.map(|(_, _, id)| id).unwrap();
        assert_eq!(click(&mut st, &frame, x, y), MouseResult::Selected(id));
        assert_eq!(st.pinned(), Some(id));
        assert_eq!(st.popover_target(), Some(id));

        let frame = draw(&root, &mut st, &TreeFilter::none());
        let all: String = (0..30).map(|y| frame.buffer.row_text(y)).collect();
        assert!(all.contains("Details"));
        assert!(all.contains("No Rank"));

        assert!(st.close_popover());
        assert_eq!(st.popover_target(), None);
    }

    #[test]
    fn drag_on_card_pans_instead_of_pinning() {
        let root = tree();
        let mut st = state(Rect::new(0, 0, 20, 6));
        let frame = draw(&root, &mut st, &TreeFilter::none());
        let hit = frame.hit_test(14, 2);
        assert_eq!(hit, Some((CARD_HIT_ID, HitRegion::Content, 1)));
        st.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), 14, 2), hit);
        assert!(st.viewport().is_dragging());
        let moved = st.handle_mouse(&mouse(MouseEventKind::Drag(MouseButton::Left), 0, 0), hit);
        assert_eq!(moved, MouseResult::Scrolled);
        assert_eq!(st.viewport().scroll(), (17, 2));
        let up = st.handle_mouse(&mouse(MouseEventKind::Up(MouseButton::Left), 0, 0), hit);
        assert_eq!(up, MouseResult::Ignored);
        assert_eq!(st.pinned(), None);
    }

    #[test]
    fn leaving_canvas_stops_drag() {
        let mut st = state(Rect::new(0, 2, 40, 10));
        st.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), 3, 5), None);
        assert!(st.viewport().is_dragging());
        st.handle_mouse(&mouse(MouseEventKind::Drag(MouseButton::Left), 3, 0), None);
        assert!(!st.viewport().is_dragging());
    }

    #[test]
    fn pointer_left_ends_drag_so_return_does_not_pan() {
        let mut st = state(Rect::new(0, 2, 40, 10));
        st.viewport_mut().set_content_size(400, 400);
        st.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left), 10, 5), None);
        assert!(st.viewport().is_dragging());
        st.pointer_left();
        assert!(!st.viewport().is_dragging());
        let back = st.handle_mouse(&mouse(MouseEventKind::Drag(MouseButton::Left), 2, 3), None);
        assert_eq!(back, MouseResult::Ignored);
        assert_eq!(st.viewport().scroll(), (0, 0));
    }

    #[test]
    fn hover_tracks_cards() {
        let root = tree();
        let mut st = state(Rect::new(0, 0, 80, 30));
        let frame = draw(&root, &mut st, &TreeFilter::none());
        let (x, y) = find_glyph(&frame, '@').unwrap();
        let hit = frame.hit_test(x, y);
        let id = hit.map(|(_, _, id)| id);
        assert_eq!(
            st.handle_mouse(&mouse(MouseEventKind::Moved, x, y), hit),
            MouseResult::Hovered(id)
        );
        assert_eq!(st.popover_target(), id);
        assert_eq!(
            st.handle_mouse(&mouse(MouseEventKind::Moved, 79, 29), None),
            MouseResult::Hovered(None)
        );
    }

    #[test]
    fn keyboard_focus_and_toggle() {
        let root = tree();
        let mut st = state(Rect::new(0, 0, 80, 30));
        let filter = TreeFilter::none();
        let layout = TreeLayout::compute(&root, st.expansion(), &filter);
        assert!(st.handle_key(&KeyEvent::new(KeyCode::Tab), &layout));
        assert_eq!(st.focus(), Some(1));
        st.handle_key(&KeyEvent::new(KeyCode::Tab), &layout);
        assert_eq!(st.focus(), Some(2));
        assert!(st.handle_key(&KeyEvent::new(KeyCode::Enter), &layout));
        assert!(st.expansion().is_expanded(2));

        let layout = TreeLayout::compute(&root, st.expansion(), &filter);
        let back = KeyEvent::new(KeyCode::BackTab).with_modifiers(Modifiers::SHIFT);
        st.handle_key(&back, &layout);
        assert_eq!(st.focus(), Some(1));
        st.handle_key(&back, &layout);
        assert_eq!(st.focus(), Some(3));
        // Leaf: nothing to toggle.
        assert!(!st.handle_key(&KeyEvent::new(KeyCode::Char(' ')), &layout));
    }

    #[test]
    fn zoom_keys_hit_bounds() {
        let mut st = state(Rect::new(0, 0, 80, 30));
        let layout = TreeLayout::default();
        assert!(!st.handle_key(&KeyEvent::new(KeyCode::Char('+')), &layout));
        for _ in 0..7 {
            assert!(st.handle_key(&KeyEvent::new(KeyCode::Char('-')), &layout));
        }
        assert!(!st.handle_key(&KeyEvent::new(KeyCode::Char('-')), &layout));
        assert_eq!(st.viewport().scale(), 30);
    }

    #[test]
    fn chip_level_draws_one_row_cards() {
        let root = tree();
        let mut st = state(Rect::new(0, 0, 60, 20));
        for _ in 0..6 {
            st.viewport_mut().zoom_out();
        }
        let frame = draw(&root, &mut st, &TreeFilter::none());
        assert_eq!(st.viewport().scale(), 40);
        let all: String = (0..20).map(|y| frame.buffer.row_text(y)).collect();
        assert!(all.contains("RA"));
        assert!(!all.contains("@alice"));
    }

    #[test]
    fn connector_drawn_under_left_leg_only() {
        let right_only = TreeNode::new(1, "root").with_right(TreeNode::new(3, "bob"));
        let mut st = state(Rect::new(0, 0, 40, 14));
        let frame = draw(&right_only, &mut st, &TreeFilter::none());
        // Rows between the root card and its child stay blank.
        assert_eq!(frame.buffer.row_text(5).trim(), "");

        let left_only = TreeNode::new(1, "root").with_left(TreeNode::new(2, "amy"));
        let mut st = state(Rect::new(0, 0, 40, 14));
        let frame = draw(&left_only, &mut st, &TreeFilter::none());
        assert_eq!(frame.buffer.row_text(5).trim(), "│");
    }

    #[test]
    fn filtered_root_renders_nothing() {
        let root = tree();
        let mut st = state(Rect::new(0, 0, 40, 10));
        let filter = TreeFilter::none().with_search("zzz");
        let frame = draw(&root, &mut st, &filter);
        for y in 0..10 {
            assert_eq!(frame.buffer.row_text(y).trim(), "");
        }
    }

    #[test]
    fn single_touch_pans() {
        let mut st = state(Rect::new(0, 0, 10, 5));
        st.viewport_mut().set_content_size(100, 100);
        st.handle_touch(&TouchEvent::new(TouchPhase::Start, vec![(5, 4)]));
        let r = st.handle_touch(&TouchEvent::new(TouchPhase::Move, vec![(0, 0)]));
        assert_eq!(r, MouseResult::Scrolled);
        assert_eq!(st.viewport().scroll(), (6, 5));
    }
}
