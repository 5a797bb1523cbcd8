use bio::pattern_matching::horspool::Horspool;
use log::{debug, info};

use crate::classes::ClassTable;
use crate::errors::*;
use crate::node::*;
use crate::sequences::SequenceId;
use crate::tree::SuffixTree;

/// A substring spelled by a node of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substring {
    pub node:       NodeId,
    pub text:       Vec<u8>,
    /// Number of distinct sequences containing the substring
    pub support:    usize,
    /// Total number of occurrences
    pub embeddings: usize,
}

impl Substring {
    pub fn depth(&self) -> usize {
        self.text.len()
    }
}

/// A substring over-represented in one class of sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub node:           NodeId,
    pub text:           Vec<u8>,
    /// 0-based index in the class table
    pub class:          usize,
    /// `rate` scaled back to a number of sequences of `class`
    pub score:          f64,
    pub rate:           f64,
    pub runner_up_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignatureThresholds {
    pub min_instances: usize,
    /// Minimal rate of the dominant class
    pub high_level:    Option<f64>,
    /// Maximal rate of the runner-up class
    pub low_level:     Option<f64>,
}

impl Default for SignatureThresholds {
    fn default() -> Self {
        SignatureThresholds {
            min_instances: 2,
            high_level:    None,
            low_level:     None,
        }
    }
}

impl SuffixTree {
    /// Rebuild the occurrence list of every internal node from its subtree and refresh the
    /// counters of every node.
    pub fn aggregate(&mut self) {
        for id in self.post_order(ROOT) {
            if self.nodes[id].kind == NodeKind::Internal {
                let merged = self.nodes[id]
                    .children
                    .iter()
                    .fold(OccurrenceList::new(), |mut acc, child| {
                        acc.merge_all(self.nodes[child].occurrences.as_slice());
                        acc
                    });
                self.nodes[id].occurrences = merged;
            }
            self.nodes[id].refresh_counts();
        }
        debug!("Occurrences aggregated over {} nodes", self.nodes.len());
    }

    /// Nodes of the subtree of `from`, every node after all its descendants.
    pub(crate) fn post_order(&self, from: NodeId) -> Vec<NodeId> {
        let mut order = self.pre_order(from);
        order.reverse();
        order
    }

    /// Nodes of the subtree of `from`, every node before its children, the children
    /// being visited interleaf first then by increasing byte.
    pub(crate) fn pre_order(&self, from: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id].children.iter().rev());
        }
        order
    }

    /// The nodes, in pre-order, whose substring appears in at least `min_support`
    /// sequences. Only meaningful once the tree is aggregated.
    pub fn find_substring(&self, min_support: usize) -> Vec<NodeId> {
        self.pre_order(ROOT)
            .into_iter()
            .filter(|&id| {
                let node = &self.nodes[id];
                id != ROOT && node.kind != NodeKind::Interleaf && node.stringid_num >= min_support
            })
            .collect()
    }

    pub fn substring(&self, node: NodeId) -> Substring {
        let n = &self.nodes[node];
        Substring {
            node,
            text: self.path(node).to_vec(),
            support: n.stringid_num,
            embeddings: n.embedding_num,
        }
    }

    /// Per-class rates of `node`: the dominant class, its rate and the runner-up rate.
    /// Ties go to the lowest class index.
    fn class_rates(&self, node: NodeId, classes: &ClassTable) -> Result<(usize, f64, f64)> {
        let mut counts = vec![0usize; classes.len()];
        for sequence in self.nodes[node].occurrences.sequences() {
            counts[classes.class_of(sequence)?] += 1;
        }

        let rate = |class: usize| counts[class] as f64 / classes.population(class) as f64;
        let (mut top, mut max, mut runner_up) = (0, rate(0), 0.0);
        for class in 1..counts.len() {
            let r = rate(class);
            if r > max {
                runner_up = max;
                max = r;
                top = class;
            } else if r > runner_up {
                runner_up = r;
            }
        }
        Ok((top, max, runner_up))
    }

    fn signature(
        &self,
        node: NodeId,
        classes: &ClassTable,
        thresholds: &SignatureThresholds,
    ) -> Result<Option<Signature>> {
        let (class, rate, runner_up_rate) = self.class_rates(node, classes)?;
        let score = rate * classes.population(class) as f64;
        let qualifies = score >= thresholds.min_instances as f64
            && thresholds.high_level.map_or(true, |high| rate >= high)
            && thresholds.low_level.map_or(true, |low| runner_up_rate <= low);

        Ok(if qualifies {
            Some(Signature {
                node,
                text: self.path(node).to_vec(),
                class,
                score,
                rate,
                runner_up_rate,
            })
        } else {
            None
        })
    }
}

/// Aggregate `tree` and list every substring shared by at least `min_support` sequences.
pub fn mine_frequent(tree: &mut SuffixTree, min_support: usize) -> Vec<Substring> {
    tree.aggregate();
    let found: Vec<Substring> = tree
        .find_substring(min_support)
        .into_iter()
        .map(|id| tree.substring(id))
        .collect();
    info!("{} substrings found in at least {} sequences", found.len(), min_support);
    found
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.len() >= needle.len() && Horspool::new(needle).find_all(haystack).next().is_some()
}

/// Drop every candidate found inside a longer candidate of the same support, and every
/// repetition of an earlier candidate. The order of the survivors is kept.
pub fn mine_closed(candidates: Vec<Substring>) -> Vec<Substring> {
    let absorbed: Vec<bool> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            candidates.iter().enumerate().any(|(k, other)| {
                k != i
                    && other.support == c.support
                    && if other.text.len() > c.text.len() {
                        contains(&other.text, &c.text)
                    } else {
                        k < i && other.text == c.text
                    }
            })
        })
        .collect();

    let closed: Vec<Substring> = candidates
        .into_iter()
        .zip(absorbed)
        .filter_map(|(c, absorbed)| if absorbed { None } else { Some(c) })
        .collect();
    debug!("{} closed substrings", closed.len());
    closed
}

fn check_classes(tree: &SuffixTree, classes: &ClassTable) -> Result<()> {
    match tree.sequence_count() {
        0 => Ok(()),
        n => classes.class_of(n as SequenceId).map(|_| ()),
    }
}

pub fn mine_signatures(tree: &mut SuffixTree, classes: &ClassTable) -> Result<Vec<Signature>> {
    mine_signatures_with(tree, classes, &SignatureThresholds::default())
}

/// Score every substring of the tree against `classes`, from the root down.
pub fn mine_signatures_with(
    tree: &mut SuffixTree,
    classes: &ClassTable,
    thresholds: &SignatureThresholds,
) -> Result<Vec<Signature>> {
    check_classes(tree, classes)?;
    tree.aggregate();

    let mut found = Vec::new();
    for id in tree.pre_order(ROOT) {
        if id == ROOT || tree.nodes[id].kind == NodeKind::Interleaf {
            continue;
        }
        if let Some(signature) = tree.signature(id, classes, thresholds)? {
            found.push(signature);
        }
    }
    info!("{} signature substrings", found.len());
    Ok(found)
}

/// Bottom-up scoring of the internal nodes, where a reported node hides all its
/// ancestors: only the deepest signature of each branch is kept.
pub fn mine_signatures_pruned(
    tree: &mut SuffixTree,
    classes: &ClassTable,
    thresholds: &SignatureThresholds,
) -> Result<Vec<Signature>> {
    check_classes(tree, classes)?;
    tree.aggregate();

    let mut covered = vec![false; tree.nodes.len()];
    let mut found = Vec::new();
    for id in tree.post_order(ROOT) {
        let node = &tree.nodes[id];
        if node.kind != NodeKind::Internal {
            continue;
        }
        if node.children.iter().any(|c| covered[c]) {
            covered[id] = true;
            continue;
        }
        if id == ROOT {
            continue;
        }
        if let Some(signature) = tree.signature(id, classes, thresholds)? {
            found.push(signature);
            covered[id] = true;
        }
    }
    info!("{} signature substrings after pruning", found.len());
    Ok(found)
}
