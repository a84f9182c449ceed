//! Property-based invariant tests for geometry primitives.
//!
//! 1. Intersection is commutative and fits within both inputs.
//! 2. Contains agrees with intersection.
//! 3. Splitting a rect partitions its rows.
//! 4. No panics on extreme u16 values.

use gtree_core::geometry::{Rect, Sides};
use proptest::prelude::*;

fn small_rect_strategy() -> impl Strategy<Value = Rect> {
    (0u16..=500, 0u16..=500, 0u16..=500, 0u16..=500).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (any::<u16>(), any::<u16>(), any::<u16>(), any::<u16>())
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

proptest! {
    #[test]
    fn intersection_commutative(a in small_rect_strategy(), b in small_rect_strategy()) {
        prop_assert_eq!(a.intersection(&b), b.intersection(&a));
    }

    #[test]
    fn intersection_within_both(a in small_rect_strategy(), b in small_rect_strategy()) {
        if let Some(i) = a.intersection_opt(&b) {
            prop_assert!(a.contains_rect(&i), "{i:?} not in {a:?}");
            prop_assert!(b.contains_rect(&i), "{i:?} not in {b:?}");
        }
    }

    #[test]
    fn contains_agrees_with_intersection(
        a in small_rect_strategy(),
        b in small_rect_strategy(),
        px in 0u16..=1000,
        py in 0u16..=1000,
    ) {
        let both = a.contains(px, py) && b.contains(px, py);
        prop_assert_eq!(both, a.intersection(&b).contains(px, py));
    }

    #[test]
    fn split_top_partitions_rows(r in small_rect_strategy(), rows in 0u16..=600) {
        let (top, rest) = r.split_top(rows);
        prop_assert_eq!(top.height + rest.height, r.height);
        prop_assert_eq!(top.y, r.y);
        prop_assert_eq!(rest.y, r.y + top.height);
    }

    #[test]
    fn extreme_values_do_not_panic(r in rect_strategy(), m in any::<u16>()) {
        let _ = r.right();
        let _ = r.bottom();
        let _ = r.area();
        let _ = r.inner(Sides::all(m));
        let _ = r.split_bottom(m);
    }
}
