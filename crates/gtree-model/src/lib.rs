#![forbid(unsafe_code)]

//! Data model for the binary genealogy tree.
//!
//! A [`TreeNode`] describes one member and exclusively owns its optional
//! `left` and `right` legs, so the structure is a strict binary tree by
//! construction. Descendant counts and PV are opaque server aggregates: the
//! model only carries and formats them.
//!
//! ```
//! use gtree_model::{TreeNode, has_children, matches_filter, GenerationFilter};
//!
//! let root = TreeNode::new(1, "root")
//!     .with_left(TreeNode::new(2, "alice").with_generation(1));
//! assert!(has_children(&root));
//! assert!(matches_filter(&root, &GenerationFilter::All, "ROO"));
//! assert!(!matches_filter(&root, &GenerationFilter::parse("1"), ""));
//! ```

pub mod display;
pub mod filter;
pub mod fixture;
pub mod node;

pub use display::{display_name, initials, or_dash, plan_label, pv_display, rank_label};
pub use fixture::fixture_tree;
pub use filter::{GenerationFilter, TreeFilter, matches_filter};
pub use node::{Leg, NodeId, PvValue, TreeNode, has_children};
