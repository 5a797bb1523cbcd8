use std::collections::{BTreeMap, BTreeSet};

use maplit::btreemap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sigstring::*;

fn build(sequences: &[&[u8]]) -> SuffixTree {
    let mut tree = SuffixTree::new();
    for s in sequences {
        tree.insert_sequence(s).unwrap();
    }
    tree
}

fn occurrences(tree: &SuffixTree, pattern: &[u8]) -> Vec<(SequenceId, usize)> {
    tree.query_substring(pattern).map(|o| (o.sequence, o.start)).collect()
}

fn naive(sequences: &[Vec<u8>], pattern: &[u8]) -> Vec<(SequenceId, usize)> {
    let mut found = Vec::new();
    for (i, s) in sequences.iter().enumerate() {
        if pattern.is_empty() || pattern.len() > s.len() {
            continue;
        }
        for start in 0..=s.len() - pattern.len() {
            if &s[start..start + pattern.len()] == pattern {
                found.push(((i + 1) as SequenceId, start));
            }
        }
    }
    found
}

#[test]
fn two_sequences_share_a_substring() {
    let tree = build(&[b"banana", b"ananas"]);
    assert_eq!(occurrences(&tree, b"ana"), vec![(1, 1), (1, 3), (2, 0), (2, 2)]);
}

#[test]
fn frequent_substrings_of_a_run() {
    let mut tree = build(&[b"aaa"]);
    let found: BTreeMap<Vec<u8>, (usize, usize)> = mine_frequent(&mut tree, 1)
        .into_iter()
        .map(|s| (s.text, (s.support, s.embeddings)))
        .collect();

    assert_eq!(
        found,
        btreemap! {
            b"a".to_vec()   => (1, 3),
            b"aa".to_vec()  => (1, 2),
            b"aaa".to_vec() => (1, 1),
        }
    );
}

#[test]
fn signature_of_the_first_class() {
    let mut tree = build(&[b"aaxyzbb", b"ccxyzdd", b"aaqqbb", b"ccrrdd"]);
    let classes = ClassTable::new(vec![2, 2]).unwrap();
    let found = mine_signatures(&mut tree, &classes).unwrap();

    let xyz = found
        .iter()
        .find(|s| s.text == b"xyz")
        .expect("xyz is a signature");
    assert_eq!(xyz.class, 0);
    assert_eq!(xyz.score, 2.0);
    assert_eq!(xyz.rate, 1.0);
    assert_eq!(xyz.runner_up_rate, 0.0);

    // shared by every class
    assert!(found.iter().find(|s| s.text == b"aa").map_or(true, |s| s.runner_up_rate > 0.0));
}

#[test]
fn frequent_then_closed() {
    let mut tree = build(&[b"xabcy", b"zabcw", b"abq"]);
    let frequent = mine_frequent(&mut tree, 2);
    let closed = mine_closed(frequent.clone());

    let texts: BTreeSet<Vec<u8>> = closed.iter().map(|s| s.text.clone()).collect();
    assert!(texts.contains(&b"abc".to_vec()));
    assert!(texts.contains(&b"ab".to_vec()));
    assert!(!texts.contains(&b"bc".to_vec()));
    assert!(closed.len() < frequent.len());
    for s in &closed {
        assert_eq!(s.support, tree.query_substring(&s.text).map(|o| o.sequence).collect::<BTreeSet<_>>().len());
    }
}

#[test]
fn incremental_insertion_keeps_earlier_answers() {
    let mut tree = build(&[b"gattaca"]);
    assert_eq!(occurrences(&tree, b"a"), vec![(1, 1), (1, 4), (1, 6)]);

    tree.insert_sequence(b"tacata").unwrap();
    assert_eq!(occurrences(&tree, b"aca"), vec![(1, 4), (2, 1)]);
    assert_eq!(occurrences(&tree, b"gatta"), vec![(1, 0)]);
    tree.verify_suffix_links();
}

#[test]
fn matches_a_naive_scan() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..20 {
        let sequences: Vec<Vec<u8>> = (0..rng.gen_range(1..6))
            .map(|_| {
                let len = rng.gen_range(0..40);
                (0..len).map(|_| b"acgt"[rng.gen_range(0..4)]).collect()
            })
            .collect();

        let mut tree = SuffixTree::new();
        for s in &sequences {
            tree.insert_sequence(s).unwrap();
        }
        tree.verify_suffix_links();

        for _ in 0..50 {
            let len = rng.gen_range(1..6);
            let pattern: Vec<u8> = (0..len).map(|_| b"acgt"[rng.gen_range(0..4)]).collect();
            assert_eq!(
                occurrences(&tree, &pattern),
                naive(&sequences, &pattern),
                "pattern {:?} over {:?}",
                String::from_utf8_lossy(&pattern),
                sequences
            );
        }
    }
}
