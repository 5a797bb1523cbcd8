use log::warn;

use crate::errors::*;
use crate::node::*;
use crate::sequences::SequenceStore;

/// A terminal node about to be attached below a parent.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Draft {
    Leaf { edge: Edge, occurrence: Occurrence },
    Interleaf { end: Edge, occurrence: Occurrence },
}

/// A generalized suffix tree. Nodes live in an arena and refer to each other by index;
/// edge labels are windows into the sequences the tree owns.
#[derive(Debug, Clone)]
pub struct SuffixTree {
    pub(crate) nodes:     Vec<Node>,
    pub(crate) sequences: SequenceStore,
}

impl Default for SuffixTree {
    fn default() -> Self {
        SuffixTree::new()
    }
}

impl SuffixTree {
    pub fn new() -> Self {
        SuffixTree {
            nodes:     vec![Node::root()],
            sequences: SequenceStore::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn sequences(&self) -> &SequenceStore {
        &self.sequences
    }

    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// The bytes on the edge leading to `id`.
    pub fn label(&self, id: NodeId) -> &[u8] {
        let edge = self.nodes[id].edge;
        if edge.len == 0 {
            return &[];
        }
        &self.sequences.slice(edge.sequence)[edge.start..edge.end()]
    }

    /// The root-to-node string of `id`. Every edge label is taken from a sequence in
    /// which the whole path immediately precedes it, so no climbing is needed.
    pub fn path(&self, id: NodeId) -> &[u8] {
        let node = &self.nodes[id];
        if node.depth == 0 {
            return &[];
        }
        let end = node.edge.end();
        &self.sequences.slice(node.edge.sequence)[end - node.depth..end]
    }

    /// Same as `path`, rebuilt by concatenating the labels from the root down.
    pub fn path_string(&self, id: NodeId) -> Vec<u8> {
        let mut labels = Vec::new();
        let mut current = id;
        while current != ROOT {
            labels.push(self.label(current));
            current = self.nodes[current].parent;
        }
        labels.into_iter().rev().flatten().copied().collect()
    }

    pub(crate) fn edge_byte(&self, id: NodeId, offset: usize) -> u8 {
        let edge = self.nodes[id].edge;
        self.sequences.slice(edge.sequence)[edge.start + offset]
    }

    pub(crate) fn alloc(&mut self, mut node: Node) -> Result<NodeId> {
        self.nodes.try_reserve(1)?;
        let id = self.nodes.len();
        node.id = id;
        self.nodes.push(node);
        Ok(id)
    }

    /// Attach a terminal below `parent`. When a terminal with the same label is already
    /// there, the draft occurrence is folded into it instead.
    pub(crate) fn insert_child(&mut self, parent: NodeId, draft: Draft) -> Result<NodeId> {
        let parent_depth = self.nodes[parent].depth;
        match draft {
            Draft::Interleaf { end, occurrence } => {
                if let Some(existing) = self.nodes[parent].children.interleaf() {
                    self.absorb(existing, occurrence)?;
                    return Ok(existing);
                }
                let edge = Edge { len: 0, ..end };
                let node = Node::new(
                    NodeKind::Interleaf,
                    edge,
                    parent_depth,
                    parent,
                    OccurrenceList::single(occurrence),
                );
                let id = self.alloc(node)?;
                self.nodes[parent].children.set_interleaf(id);
                Ok(id)
            }
            Draft::Leaf { edge, occurrence } => {
                let first = self.sequences.slice(edge.sequence)[edge.start];
                if let Some(existing) = self.nodes[parent].children.get(first) {
                    let label = &self.sequences.slice(edge.sequence)[edge.start..edge.end()];
                    assert!(
                        self.nodes[existing].kind == NodeKind::Leaf && self.label(existing) == label,
                        "node {} already holds the slot of byte {:#04x} below node {}",
                        existing,
                        first,
                        parent
                    );
                    self.absorb(existing, occurrence)?;
                    return Ok(existing);
                }
                let node = Node::new(
                    NodeKind::Leaf,
                    edge,
                    parent_depth + edge.len,
                    parent,
                    OccurrenceList::single(occurrence),
                );
                let id = self.alloc(node)?;
                self.nodes[parent].children.insert(first, id);
                Ok(id)
            }
        }
    }

    /// Add an occurrence to an existing terminal.
    pub(crate) fn absorb(&mut self, terminal: NodeId, occurrence: Occurrence) -> Result<()> {
        let node = &mut self.nodes[terminal];
        debug_assert!(node.is_terminal());
        node.occurrences.add_first(occurrence)?;
        node.refresh_counts();
        Ok(())
    }

    /// Break the edge of `child` after `offset` bytes with a new internal node, which is
    /// returned. Splitting at the very end of a leaf turns the leaf into the interleaf of
    /// the new node.
    pub(crate) fn split_edge(&mut self, child: NodeId, offset: usize) -> Result<NodeId> {
        let (parent, edge, kind) = {
            let c = &self.nodes[child];
            (c.parent, c.edge, c.kind)
        };
        assert!(
            offset > 0 && offset <= edge.len,
            "cannot split the edge of node {} at {} (length {})",
            child,
            offset,
            edge.len
        );
        assert!(
            offset < edge.len || kind == NodeKind::Leaf,
            "cannot split node {} at its end",
            child
        );

        let first = self.edge_byte(child, 0);
        let depth = self.nodes[parent].depth + offset;
        let middle = self.alloc(Node::new(
            NodeKind::Internal,
            Edge { len: offset, ..edge },
            depth,
            parent,
            OccurrenceList::new(),
        ))?;
        let replaced = self.nodes[parent].children.insert(first, middle);
        assert_eq!(replaced, Some(child), "node {} is not a child of node {}", child, parent);

        let rest = Edge {
            sequence: edge.sequence,
            start:    edge.start + offset,
            len:      edge.len - offset,
        };
        {
            let c = &mut self.nodes[child];
            c.edge = rest;
            c.parent = middle;
        }
        if rest.len == 0 {
            self.nodes[child].kind = NodeKind::Interleaf;
            self.nodes[middle].children.set_interleaf(child);
        } else {
            let byte = self.edge_byte(child, 0);
            self.nodes[middle].children.insert(byte, child);
        }
        Ok(middle)
    }

    /// Whether the cached counters of `id` agree with its occurrence list.
    pub fn check_integrity(&self, id: NodeId) -> bool {
        let node = &self.nodes[id];
        node.stringid_num == node.occurrences.distinct_sequences()
            && node.embedding_num == node.occurrences.len()
    }

    pub fn verify_counts(&self) -> bool {
        let mut sound = true;
        for node in self.nodes.iter().filter(|n| !self.check_integrity(n.id)) {
            warn!("Sequence count incorrect in node {}", node.id);
            sound = false;
        }
        sound
    }

    /// Walk every suffix-link chain down to the root, panicking on the first broken link.
    pub fn verify_suffix_links(&self) {
        for node in self.nodes.iter().filter(|n| n.kind == NodeKind::Internal) {
            let mut current = node.id;
            let mut steps = 0;
            while current != ROOT {
                let n = &self.nodes[current];
                let link = n
                    .suffix_link
                    .unwrap_or_else(|| panic!("node {} has no suffix link", current));
                let target = &self.nodes[link];
                assert_eq!(target.kind, NodeKind::Internal, "node {} links to a terminal", current);
                assert_eq!(target.depth + 1, n.depth, "node {} links to node {} of wrong depth", current, link);
                assert_eq!(self.path(link), &self.path(current)[1..], "node {} links to the wrong path", current);
                current = link;
                steps += 1;
                assert!(steps <= node.depth, "suffix-link chain from node {} never reaches the root", node.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequences::SequenceId;

    fn tree_with(bytes: &[u8]) -> (SuffixTree, SequenceId) {
        let mut tree = SuffixTree::new();
        let id = tree.sequences.append(bytes).unwrap();
        (tree, id)
    }

    fn leaf(tree: &mut SuffixTree, sequence: SequenceId, start: usize, len: usize, at: usize) -> NodeId {
        tree.insert_child(
            ROOT,
            Draft::Leaf {
                edge:       Edge { sequence, start, len },
                occurrence: Occurrence::new(sequence, at),
            },
        )
        .unwrap()
    }

    #[test]
    fn split_in_the_middle() {
        let (mut tree, id) = tree_with(b"acgt");
        let l = leaf(&mut tree, id, 0, 4, 0);
        let middle = tree.split_edge(l, 2).unwrap();

        assert_eq!(tree.label(middle), b"ac");
        assert_eq!(tree.node(middle).depth(), 2);
        assert_eq!(tree.node(middle).parent(), Some(ROOT));
        assert_eq!(tree.node(ROOT).children().get(b'a'), Some(middle));

        assert_eq!(tree.label(l), b"gt");
        assert_eq!(tree.node(l).depth(), 4);
        assert_eq!(tree.node(l).parent(), Some(middle));
        assert_eq!(tree.node(middle).children().get(b'g'), Some(l));
        assert_eq!(tree.path(l), b"acgt");
        assert_eq!(tree.path_string(l), b"acgt".to_vec());
    }

    #[test]
    fn split_at_the_end_of_a_leaf() {
        let (mut tree, id) = tree_with(b"ac");
        let l = leaf(&mut tree, id, 0, 2, 0);
        let middle = tree.split_edge(l, 2).unwrap();

        assert_eq!(tree.node(l).kind(), NodeKind::Interleaf);
        assert_eq!(tree.node(middle).children().interleaf(), Some(l));
        assert_eq!(tree.node(middle).children().len(), 1);
        assert_eq!(tree.node(l).depth(), 2);
        assert_eq!(tree.path(l), b"ac");
        assert!(tree.label(l).is_empty());
    }

    #[test]
    fn terminals_are_shared() {
        let (mut tree, id) = tree_with(b"gattaca");
        let other = tree.sequences.append(b"ca").unwrap();
        let first = leaf(&mut tree, id, 5, 2, 5);
        let again = leaf(&mut tree, other, 0, 2, 0);

        assert_eq!(first, again);
        assert_eq!(tree.node_count(), 2);
        assert_eq!(tree.node(first).stringid_num(), 2);
        assert!(tree.check_integrity(first));

        let end = Edge { sequence: id, start: 7, len: 0 };
        let a = tree.insert_child(ROOT, Draft::Interleaf { end, occurrence: Occurrence::new(id, 5) }).unwrap();
        let b = tree.insert_child(ROOT, Draft::Interleaf { end, occurrence: Occurrence::new(other, 0) }).unwrap();
        assert_eq!(a, b);
        assert_eq!(tree.node(a).embedding_num(), 2);
    }

    #[test]
    #[should_panic(expected = "already holds the slot")]
    fn conflicting_child() {
        let (mut tree, id) = tree_with(b"acag");
        leaf(&mut tree, id, 0, 4, 0);
        leaf(&mut tree, id, 2, 2, 2);
    }

    #[test]
    fn integrity_detects_stale_counters() {
        let (mut tree, id) = tree_with(b"ac");
        let l = leaf(&mut tree, id, 0, 2, 0);
        assert!(tree.verify_counts());

        tree.nodes[l].stringid_num = 3;
        assert!(!tree.check_integrity(l));
        assert!(!tree.verify_counts());
    }
}
