#![forbid(unsafe_code)]

//! Bundled sample tree for offline use and demos.

use crate::node::{PvValue, TreeNode};

/// A small sponsor tree: three generations below the root, with a mix of
/// full, left-only and right-only branches and some incomplete members.
pub fn fixture_tree() -> TreeNode {
    let g3_a = TreeNode::new(8, "liam.k")
        .with_fullname("Liam Kurt")
        .with_email("liam@example.com")
        .with_pv(PvValue::Number(40.0))
        .with_generation(3);
    let g3_b = TreeNode::new(9, "noor")
        .with_email("noor@example.com")
        .with_pv(PvValue::Text("n/a".into()))
        .with_generation(3);
    let g3_c = TreeNode::new(12, "tariq.b")
        .with_fullname("Tariq Bell")
        .with_email("tariq@example.com")
        .with_pv(PvValue::Number(75.0))
        .with_plan("Starter")
        .with_generation(3);

    let g2_a = TreeNode::new(4, "mia.s")
        .with_fullname("Mia Santos")
        .with_email("mia@example.com")
        .with_counts(1, 1)
        .with_pv(PvValue::Number(150.0))
        .with_plan("Silver")
        .with_rank("Bronze")
        .with_generation(2)
        .with_left(g3_a)
        .with_right(g3_b);
    let g2_b = TreeNode::new(5, "owen")
        .with_fullname("Owen")
        .with_email("owen@example.com")
        .with_pv(PvValue::Text("60".into()))
        .with_generation(2);
    let g2_c = TreeNode::new(6, "ava.r")
        .with_fullname("Ava Reyes")
        .with_email("ava@example.com")
        .with_counts(0, 1)
        .with_pv(PvValue::Number(90.0))
        .with_plan("Silver")
        .with_generation(2)
        .with_right(g3_c);
    let g2_d = TreeNode::new(7, "ken.w")
        .with_fullname("Ken Watanabe")
        .with_email("ken@example.com")
        .with_pv(PvValue::Number(0.0))
        .with_generation(2);

    let g1_left = TreeNode::new(2, "alice.m")
        .with_fullname("Alice Moreau")
        .with_email("alice@example.com")
        .with_counts(3, 1)
        .with_pv(PvValue::Number(320.0))
        .with_plan("Gold")
        .with_rank("Silver")
        .with_generation(1)
        .with_left(g2_a)
        .with_right(g2_b);
    let g1_right = TreeNode::new(3, "bruno.c")
        .with_fullname("Bruno Costa")
        .with_email("bruno@example.com")
        .with_counts(2, 2)
        .with_pv(PvValue::Number(210.5))
        .with_plan("Gold")
        .with_generation(1)
        .with_left(g2_c)
        .with_right(g2_d);

    TreeNode::new(1, "root.admin")
        .with_fullname("Root Admin")
        .with_email("admin@example.com")
        .with_counts(4, 4)
        .with_pv(PvValue::Number(1250.0))
        .with_plan("Platinum")
        .with_rank("Diamond")
        .with_generation(0)
        .with_left(g1_left)
        .with_right(g1_right)
}
