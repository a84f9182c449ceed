#![forbid(unsafe_code)]

//! Generation and username filters.
//!
//! A node that fails the filter is hidden together with its whole subtree;
//! that pruning happens in the layout engine, this module only answers the
//! per-node question.

use std::fmt;

use crate::node::TreeNode;

/// Generation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationFilter {
    /// Every generation passes.
    #[default]
    All,
    /// Only nodes whose `generation` equals the value pass.
    Only(i64),
    /// A selector that did not parse; nothing passes.
    Invalid,
}

impl GenerationFilter {
    /// Parse a selector: `"all"` or a leading integer (`"3"`, `" 2nd"`).
    ///
    /// Trailing garbage after the digits is ignored. Anything without a
    /// leading integer becomes [`GenerationFilter::Invalid`].
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim_start();
        if s == "all" {
            return Self::All;
        }
        let (sign, digits) = match s.as_bytes().first() {
            Some(b'-') => (-1i64, &s[1..]),
            Some(b'+') => (1, &s[1..]),
            _ => (1, s),
        };
        let end = digits
            .bytes()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(digits.len());
        match digits[..end].parse::<i64>() {
            Ok(n) => Self::Only(sign * n),
            Err(_) => Self::Invalid,
        }
    }

    /// Whether `node` passes this selector.
    pub fn matches(&self, node: &TreeNode) -> bool {
        match self {
            Self::All => true,
            Self::Only(n) => node.generation.is_some_and(|g| i64::from(g) == *n),
            Self::Invalid => false,
        }
    }

    /// Next selector in the `all, 1, 2, .., max` cycle.
    pub fn cycle(self, max_generation: u32) -> Self {
        let max = i64::from(max_generation);
        match self {
            Self::All if max >= 1 => Self::Only(1),
            Self::Only(n) if n >= 1 && n < max => Self::Only(n + 1),
            _ => Self::All,
        }
    }
}

impl fmt::Display for GenerationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(n) => write!(f, "{n}"),
            Self::Invalid => f.write_str("invalid"),
        }
    }
}

/// Both filters the viewer applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeFilter {
    pub generation: GenerationFilter,
    pub search: String,
}

impl TreeFilter {
    /// Filter that lets everything through.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_generation(mut self, generation: GenerationFilter) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Whether any filter is narrowing the tree.
    pub fn is_active(&self) -> bool {
        self.generation != GenerationFilter::All || !self.search.is_empty()
    }

    pub fn matches(&self, node: &TreeNode) -> bool {
        matches_filter(node, &self.generation, &self.search)
    }
}

/// True iff `node` passes both the generation selector and the search term.
///
/// The search is a case-insensitive substring match on `username`; an
/// empty term passes.
pub fn matches_filter(node: &TreeNode, generation: &GenerationFilter, search: &str) -> bool {
    if !generation.matches(node) {
        return false;
    }
    search.is_empty()
        || node
            .username
            .to_lowercase()
            .contains(&search.to_lowercase())
}
