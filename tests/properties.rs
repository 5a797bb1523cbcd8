use std::collections::BTreeSet;

use proptest::prelude::*;

use sigstring::*;

fn build(sequences: &[String]) -> SuffixTree {
    let mut tree = SuffixTree::new();
    for s in sequences {
        tree.insert_sequence(s.as_bytes()).unwrap();
    }
    tree
}

fn support(tree: &SuffixTree, pattern: &[u8]) -> usize {
    tree.query_substring(pattern)
        .map(|o| o.sequence)
        .collect::<BTreeSet<_>>()
        .len()
}

fn collections() -> impl Strategy<Value = Vec<String>> {
    prop_oneof![
        prop::collection::vec("[ab]{0,16}", 1..5),
        prop::collection::vec("[acgt]{0,24}", 1..5),
        // the same sequences inserted twice
        prop::collection::vec("a{0,6}|[ab]{0,12}", 1..4).prop_map(|v| v.iter().chain(v.iter()).cloned().collect()),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_suffix_is_found(sequences in collections()) {
        let tree = build(&sequences);
        for (i, s) in sequences.iter().enumerate() {
            let id = (i + 1) as SequenceId;
            for k in 0..s.len() {
                let hits: Vec<Occurrence> = tree.query_substring(&s.as_bytes()[k..]).collect();
                prop_assert!(hits.contains(&Occurrence::new(id, k)));
                prop_assert!(tree.is_suffix(&s.as_bytes()[k..]));
            }
        }
    }

    #[test]
    fn internal_nodes_branch(sequences in collections()) {
        let mut tree = SuffixTree::new();
        for s in &sequences {
            tree.insert_sequence(s.as_bytes()).unwrap();
            for node in tree.nodes().filter(|n| n.kind() == NodeKind::Internal && n.id() != tree.root()) {
                prop_assert!(
                    node.children().len() >= 2,
                    "node {} ({:?}) has {} children",
                    node.id(),
                    String::from_utf8_lossy(tree.path(node.id())),
                    node.children().len()
                );
            }
        }
    }

    #[test]
    fn suffix_links_reach_the_root(sequences in collections()) {
        let tree = build(&sequences);
        tree.verify_suffix_links();
        for node in tree.nodes().filter(|n| n.kind() == NodeKind::Internal) {
            let mut current = node.id();
            let mut steps = 0;
            while current != tree.root() {
                let next = tree.next_suffix(current, 1);
                prop_assert_eq!(tree.node(next).depth() + 1, tree.node(current).depth());
                current = next;
                steps += 1;
            }
            prop_assert_eq!(steps, node.depth());
        }
    }

    #[test]
    fn suffix_chains_cover_each_sequence(sequences in collections()) {
        let tree = build(&sequences);
        for (i, s) in sequences.iter().enumerate() {
            let id = (i + 1) as SequenceId;
            let chain: Vec<(usize, NodeId)> = tree.suffix_chain(id).collect();
            prop_assert_eq!(chain.len(), s.len());
            for (offset, terminal) in chain {
                prop_assert_eq!(tree.path(terminal), &s.as_bytes()[offset..]);
                prop_assert!(tree.node(terminal).occurrences().iter().any(|o| *o == Occurrence::new(id, offset)));
            }
        }
    }

    #[test]
    fn aggregation_flows_upwards(sequences in collections()) {
        let mut tree = build(&sequences);
        tree.aggregate();
        prop_assert!(tree.verify_counts());

        for node in tree.nodes() {
            if let Some(parent) = node.parent() {
                let parent = tree.node(parent);
                prop_assert!(node.stringid_num() <= parent.stringid_num());
                for o in node.occurrences().iter() {
                    prop_assert!(parent.occurrences().as_slice().contains(o));
                }
            }
            if node.kind() == NodeKind::Internal && node.id() != tree.root() {
                prop_assert_eq!(node.embedding_num(), tree.query_substring(tree.path(node.id())).len());
            }
        }
    }

    #[test]
    fn paths_agree_with_labels(sequences in collections()) {
        let tree = build(&sequences);
        for node in tree.nodes() {
            prop_assert_eq!(tree.path(node.id()).to_vec(), tree.path_string(node.id()));
            prop_assert_eq!(tree.path(node.id()).len(), node.depth());
        }
    }

    #[test]
    fn closed_mining_is_idempotent(sequences in collections(), min_support in 1usize..3) {
        let mut tree = build(&sequences);
        let closed = mine_closed(mine_frequent(&mut tree, min_support));
        prop_assert_eq!(mine_closed(closed.clone()), closed);
    }

    #[test]
    fn extensions_never_gain_support(sequences in collections()) {
        let tree = build(&sequences);
        for s in &sequences {
            let bytes = s.as_bytes();
            for i in 0..bytes.len() {
                for j in i + 1..bytes.len() {
                    prop_assert!(support(&tree, &bytes[i..=j]) <= support(&tree, &bytes[i..j]));
                }
            }
        }
    }

    #[test]
    fn frequent_nodes_meet_the_support(sequences in collections(), min_support in 1usize..4) {
        let mut tree = build(&sequences);
        for s in mine_frequent(&mut tree, min_support) {
            prop_assert!(s.support >= min_support);
            prop_assert_eq!(s.support, support(&tree, &s.text));
        }
    }
}
