#![forbid(unsafe_code)]

//! Recursive layout of the binary tree.
//!
//! Positions are logical cells at 100% scale with the origin at the
//! top-left of the content. The viewport maps them to the screen.
//!
//! # Rules
//!
//! 1. A node that fails the filter is skipped along with its whole subtree.
//! 2. Children are laid out only when the node is expanded; the left leg
//!    comes first and the card is centered over its children block.
//! 3. The parent-to-children gap is [`CHILD_GAP_BOTH_LEGS`] when both legs
//!    exist in the data, [`CHILD_GAP`] otherwise.
//! 4. A vertical connector hangs under an expanded node only when it has a
//!    `left` child. A right-only node gets none.

use gtree_model::{NodeId, TreeFilter, TreeNode, has_children};

use crate::expansion::ExpansionState;

/// Card width at 100% scale.
pub const CARD_WIDTH: i32 = 24;
/// Card height at 100% scale.
pub const CARD_HEIGHT: i32 = 5;
/// Horizontal gap between sibling subtrees.
pub const SIBLING_GAP: i32 = 2;
/// Rows between a card and its children when only one leg exists.
pub const CHILD_GAP: i32 = 2;
/// Rows between a card and its children when both legs exist.
pub const CHILD_GAP_BOTH_LEGS: i32 = 4;

/// Rectangle in logical (unscaled) content cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogicalRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl LogicalRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    #[inline]
    pub const fn center_x(&self) -> i32 {
        self.x + self.width / 2
    }
}

/// One card placed by the layout.
#[derive(Debug, Clone, Copy)]
pub struct PlacedCard<'a> {
    pub node: &'a TreeNode,
    pub rect: LogicalRect,
    pub depth: usize,
    pub expanded: bool,
    pub has_children: bool,
}

impl PlacedCard<'_> {
    #[inline]
    pub fn id(&self) -> NodeId {
        self.node.id
    }
}

/// Vertical line under an expanded card, from its bottom edge to the top
/// of the children row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connector {
    pub parent: NodeId,
    pub x: i32,
    /// Parent card top; the line starts below the rendered card.
    pub card_top: i32,
    /// First row of the children (exclusive end of the line).
    pub bottom: i32,
}

/// Result of laying out a tree.
#[derive(Debug, Clone, Default)]
pub struct TreeLayout<'a> {
    /// Cards in render order (pre-order, left leg first).
    pub cards: Vec<PlacedCard<'a>>,
    pub connectors: Vec<Connector>,
    /// Content width in logical cells.
    pub width: i32,
    /// Content height in logical cells.
    pub height: i32,
}

impl<'a> TreeLayout<'a> {
    /// Lay out `root` under the given expansion state and filter.
    pub fn compute(root: &'a TreeNode, expansion: &ExpansionState, filter: &TreeFilter) -> Self {
        let span = gtree_core::debug_span!("tree_layout", root = root.id);
        let _guard = span.enter();

        let ctx = Ctx { expansion, filter };
        let layout = match place(root, 0, 0, &ctx) {
            Some(sub) => Self {
                cards: sub.cards,
                connectors: sub.connectors,
                width: sub.width,
                height: sub.height,
            },
            None => Self::default(),
        };
        gtree_core::trace!(
            cards = layout.cards.len(),
            width = layout.width,
            height = layout.height,
            "layout computed"
        );
        layout
    }

    /// Whether nothing is visible (root filtered out).
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn card(&self, id: NodeId) -> Option<&PlacedCard<'a>> {
        self.cards.iter().find(|c| c.id() == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.card(id).is_some()
    }

    /// Connector hanging under `id`, if one is drawn.
    pub fn connector(&self, id: NodeId) -> Option<&Connector> {
        self.connectors.iter().find(|c| c.parent == id)
    }

    /// Next card in render order after `current`, wrapping around.
    ///
    /// With no current card (or one that is no longer visible) this is the
    /// first card, or the last when moving `backwards`.
    pub fn next_card(&self, current: Option<NodeId>, backwards: bool) -> Option<NodeId> {
        let len = self.cards.len();
        if len == 0 {
            return None;
        }
        let pos = current.and_then(|id| self.cards.iter().position(|c| c.id() == id));
        let idx = match (pos, backwards) {
            (None, false) => 0,
            (None, true) => len - 1,
            (Some(i), false) => (i + 1) % len,
            (Some(i), true) => (i + len - 1) % len,
        };
        Some(self.cards[idx].id())
    }
}

struct Ctx<'s> {
    expansion: &'s ExpansionState,
    filter: &'s TreeFilter,
}

/// Subtree laid out with its left edge at x = 0.
struct Subtree<'a> {
    width: i32,
    height: i32,
    cards: Vec<PlacedCard<'a>>,
    connectors: Vec<Connector>,
}

impl Subtree<'_> {
    fn shift_x(&mut self, dx: i32) {
        for card in &mut self.cards {
            card.rect.x += dx;
        }
        for conn in &mut self.connectors {
            conn.x += dx;
        }
    }
}

fn place<'a>(node: &'a TreeNode, depth: usize, y: i32, ctx: &Ctx<'_>) -> Option<Subtree<'a>> {
    if !ctx.filter.matches(node) {
        return None;
    }
    let expanded = ctx.expansion.is_expanded(node.id);
    let has_children = has_children(node);
    let gap = if node.has_both_legs() {
        CHILD_GAP_BOTH_LEGS
    } else {
        CHILD_GAP
    };
    let child_y = y + CARD_HEIGHT + gap;

    let mut children: Vec<Subtree<'a>> = Vec::new();
    if expanded {
        for (_, child) in node.children() {
            if let Some(sub) = place(child, depth + 1, child_y, ctx) {
                children.push(sub);
            }
        }
    }

    let block_width = if children.is_empty() {
        0
    } else {
        children.iter().map(|c| c.width).sum::<i32>() + SIBLING_GAP * (children.len() as i32 - 1)
    };
    let width = CARD_WIDTH.max(block_width);
    let card_x = (width - CARD_WIDTH) / 2;

    let mut out = Subtree {
        width,
        height: y + CARD_HEIGHT,
        cards: vec![PlacedCard {
            node,
            rect: LogicalRect::new(card_x, y, CARD_WIDTH, CARD_HEIGHT),
            depth,
            expanded,
            has_children,
        }],
        connectors: Vec::new(),
    };

    if expanded && node.left.is_some() {
        out.connectors.push(Connector {
            parent: node.id,
            x: card_x + CARD_WIDTH / 2,
            card_top: y,
            bottom: child_y,
        });
    }

    let mut cursor = (width - block_width) / 2;
    for mut sub in children {
        sub.shift_x(cursor);
        cursor += sub.width + SIBLING_GAP;
        out.height = out.height.max(sub.height);
        out.cards.append(&mut sub.cards);
        out.connectors.append(&mut sub.connectors);
    }
    Some(out)
}
