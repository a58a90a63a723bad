//! Property tests: random operation sequences checked against `std`'s
//! `BTreeMap` and the tree's own invariant checker.

use std::collections::BTreeMap;

use btree_index::BTree;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(u16, u32),
    Delete(u16),
    PopFirst,
    PopLast,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    // A small key space forces upserts, misses and repeated deletes.
    prop_oneof![
        4 => (0u16..128, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        3 => (0u16..128).prop_map(Op::Delete),
        1 => Just(Op::PopFirst),
        1 => Just(Op::PopLast),
    ]
}

proptest! {
    #[test]
    fn prop_matches_model(
        t in 2usize..6,
        ops in prop::collection::vec(op_strategy(), 1..400),
    ) {
        let mut tree = BTree::new(t).unwrap();
        let mut model = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    prop_assert_eq!(tree.insert(k, v), model.insert(k, v));
                }
                Op::Delete(k) => {
                    prop_assert_eq!(tree.delete(&k), model.remove(&k));
                    prop_assert_eq!(tree.search(&k), None);
                }
                Op::PopFirst => {
                    prop_assert_eq!(tree.pop_first(), model.pop_first());
                }
                Op::PopLast => {
                    prop_assert_eq!(tree.pop_last(), model.pop_last());
                }
            }
            prop_assert!(tree.validate().is_ok(), "{:?}", tree.validate());
            prop_assert_eq!(tree.len(), model.len());
        }

        prop_assert!(tree.iter().eq(model.iter()));
        for (k, v) in &model {
            prop_assert_eq!(tree.search(k), Some(v));
        }
    }

    #[test]
    fn prop_height_is_logarithmic(t in 2usize..8, n in 0usize..2000) {
        let tree: BTree<usize, ()> = {
            let mut tree = BTree::new(t).unwrap();
            tree.extend((0..n).map(|k| (k, ())));
            tree
        };

        // Every non-root node has at least t children below it, so a tree of
        // height h holds at least 2 * t^(h-1) - 1 keys.
        let h = tree.height() as u32;
        if h > 1 {
            prop_assert!(2 * t.pow(h - 1) - 1 <= n);
        }
    }
}
