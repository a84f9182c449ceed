//! Property tests for the node model and its formatting helpers.

use gtree_model::{GenerationFilter, PvValue, TreeNode, initials, matches_filter, pv_display};
use proptest::prelude::*;

fn arb_tree() -> impl Strategy<Value = TreeNode> {
    let leaf = (any::<u32>(), "[a-z]{0,6}", proptest::option::of(0u32..4)).prop_map(
        |(id, name, generation)| {
            let mut node = TreeNode::new(u64::from(id), name);
            node.generation = generation;
            node
        },
    );
    leaf.prop_recursive(5, 32, 2, |inner| {
        (
            any::<u32>(),
            "[a-z]{0,6}",
            proptest::option::of(inner.clone()),
            proptest::option::of(inner),
        )
            .prop_map(|(id, name, left, right)| {
                let mut node = TreeNode::new(u64::from(id), name);
                node.left = left.map(Box::new);
                node.right = right.map(Box::new);
                node
            })
    })
}

proptest! {
    #[test]
    fn initials_never_panic_and_stay_short(name in proptest::option::of(".{0,40}")) {
        let out = initials(name.as_deref());
        // The first char can uppercase to at most three chars.
        prop_assert!(out.chars().count() <= 4);
        if name.as_deref().is_none_or(str::is_empty) {
            prop_assert!(out.is_empty());
        }
    }

    #[test]
    fn second_initial_keeps_its_case(a in "[a-z][a-z]{0,8}", b in "[a-zA-Z][a-z]{0,8}") {
        let full = format!("{a} {b}");
        let out = initials(Some(&full));
        let mut expected = String::new();
        expected.extend(a.chars().next().map(|c| c.to_ascii_uppercase()));
        expected.extend(b.chars().next());
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn empty_search_and_all_generations_pass_everything(tree in arb_tree()) {
        for node in tree.iter() {
            prop_assert!(matches_filter(node, &GenerationFilter::All, ""));
        }
    }

    #[test]
    fn filter_is_conjunction(tree in arb_tree(), g in 0i64..4, term in "[a-z]{0,2}") {
        let generation = GenerationFilter::Only(g);
        for node in tree.iter() {
            let both = matches_filter(node, &generation, &term);
            let gen_only = matches_filter(node, &generation, "");
            let search_only = matches_filter(node, &GenerationFilter::All, &term);
            prop_assert_eq!(both, gen_only && search_only);
        }
    }

    #[test]
    fn iter_visits_each_node_once(tree in arb_tree()) {
        let count = tree.iter().count();
        prop_assert_eq!(count, tree.node_count());
        prop_assert!(tree.depth() <= count);
    }

    #[test]
    fn numeric_pv_text_matches_number(n in -1_000_000i64..1_000_000) {
        let text = pv_display(Some(&PvValue::Text(n.to_string())));
        let number = pv_display(Some(&PvValue::Number(n as f64)));
        prop_assert_eq!(text, number);
    }

    #[test]
    fn json_round_trip_preserves_structure(tree in arb_tree()) {
        let json = serde_json::to_string(&tree).unwrap();
        let back: TreeNode = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, tree);
    }
}
