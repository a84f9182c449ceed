#![forbid(unsafe_code)]

//! The genealogy node shape and its wire format.

use serde::{Deserialize, Deserializer, Serialize};

/// Unique member identifier.
pub type NodeId = u64;

/// Position of a child under its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Leg {
    Left,
    Right,
}

/// Personal PV as sent by the server: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PvValue {
    Number(f64),
    Text(String),
}

impl PvValue {
    /// Coerce to a number the way a loosely typed client would.
    ///
    /// Strings are trimmed and an empty string is `0`. `Infinity` with an
    /// optional sign and `0x`/`0o`/`0b` integers are accepted; `inf`, `nan`
    /// and anything else that is not a plain decimal give `NaN`.
    pub fn as_number(&self) -> f64 {
        match self {
            PvValue::Number(n) => *n,
            PvValue::Text(s) => coerce_text(s.trim()),
        }
    }
}

fn coerce_text(s: &str) -> f64 {
    match s {
        "" => return 0.0,
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        if digits.is_empty() {
            return f64::NAN;
        }
        return digits.chars().try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN);
    }
    if s.chars().any(|c| c.is_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    s.parse().unwrap_or(f64::NAN)
}

/// An explicit `null` PV counts as zero; a missing one stays `None`.
fn null_pv_is_zero<'de, D>(deserializer: D) -> Result<Option<PvValue>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(
        Option::<PvValue>::deserialize(deserializer)?.unwrap_or(PvValue::Number(0.0)),
    ))
}

/// One member of the binary tree.
///
/// Missing display fields deserialize to empty values rather than failing;
/// formatting helpers in [`crate::display`] turn them into placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub email: String,
    /// Descendants on the left leg, aggregated by the server.
    #[serde(default, alias = "leftCount")]
    pub left_count: u64,
    /// Descendants on the right leg, aggregated by the server.
    #[serde(default, alias = "rightCount")]
    pub right_count: u64,
    #[serde(
        default,
        alias = "personalPv",
        deserialize_with = "null_pv_is_zero",
        skip_serializing_if = "Option::is_none"
    )]
    pub personal_pv: Option<PvValue>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub rank: Option<String>,
    /// Generation relative to the requesting member, when the server sends it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Box<TreeNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Box<TreeNode>>,
}

/// True iff the node has a `left` or `right` child.
pub fn has_children(node: &TreeNode) -> bool {
    node.left.is_some() || node.right.is_some()
}

impl TreeNode {
    /// Create a node with only an id and username.
    pub fn new(id: NodeId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            fullname: None,
            email: String::new(),
            left_count: 0,
            right_count: 0,
            personal_pv: None,
            plan: None,
            rank: None,
            generation: None,
            left: None,
            right: None,
        }
    }

    #[must_use]
    pub fn with_fullname(mut self, fullname: impl Into<String>) -> Self {
        self.fullname = Some(fullname.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Set the server-side leg counts.
    #[must_use]
    pub fn with_counts(mut self, left: u64, right: u64) -> Self {
        self.left_count = left;
        self.right_count = right;
        self
    }

    #[must_use]
    pub fn with_pv(mut self, pv: PvValue) -> Self {
        self.personal_pv = Some(pv);
        self
    }

    #[must_use]
    pub fn with_plan(mut self, plan: impl Into<String>) -> Self {
        self.plan = Some(plan.into());
        self
    }

    #[must_use]
    pub fn with_rank(mut self, rank: impl Into<String>) -> Self {
        self.rank = Some(rank.into());
        self
    }

    #[must_use]
    pub fn with_generation(mut self, generation: u32) -> Self {
        self.generation = Some(generation);
        self
    }

    #[must_use]
    pub fn with_left(mut self, child: TreeNode) -> Self {
        self.left = Some(Box::new(child));
        self
    }

    #[must_use]
    pub fn with_right(mut self, child: TreeNode) -> Self {
        self.right = Some(Box::new(child));
        self
    }

    /// Child on the given leg.
    pub fn child(&self, leg: Leg) -> Option<&TreeNode> {
        match leg {
            Leg::Left => self.left.as_deref(),
            Leg::Right => self.right.as_deref(),
        }
    }

    /// Present children in leg order (left first).
    pub fn children(&self) -> impl Iterator<Item = (Leg, &TreeNode)> {
        [Leg::Left, Leg::Right]
            .into_iter()
            .filter_map(move |leg| self.child(leg).map(|c| (leg, c)))
    }

    /// Whether both legs are occupied.
    pub fn has_both_legs(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    /// Pre-order traversal (node, then left subtree, then right subtree).
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// Find a node by id anywhere in this subtree.
    pub fn find(&self, id: NodeId) -> Option<&TreeNode> {
        self.iter().find(|n| n.id == id)
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Largest `generation` value present in the subtree.
    pub fn max_generation(&self) -> Option<u32> {
        self.iter().filter_map(|n| n.generation).max()
    }

    /// Height of the subtree (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .map(|(_, c)| c.depth())
            .max()
            .unwrap_or(0)
    }
}

/// Pre-order iterator over a subtree.
#[derive(Debug)]
pub struct Iter<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(right) = node.right.as_deref() {
            self.stack.push(right);
        }
        if let Some(left) = node.left.as_deref() {
            self.stack.push(left);
        }
        Some(node)
    }
}
