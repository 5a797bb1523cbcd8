use crate::node::*;
use crate::sequences::SequenceId;
use crate::tree::SuffixTree;

/// A point in the tree: `offset` bytes down the edge leading to `node`. A position whose
/// offset spans the whole edge sits on the node itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub node:   NodeId,
    pub offset: usize,
}

impl Position {
    pub fn root() -> Self {
        Position { node: ROOT, offset: 0 }
    }
}

impl SuffixTree {
    pub fn position_at(&self, node: NodeId) -> Position {
        Position {
            node,
            offset: self.nodes[node].edge.len,
        }
    }

    pub fn is_at_node(&self, at: Position) -> bool {
        at.offset == self.nodes[at.node].edge.len
    }

    /// Follow `text` byte by byte from `start`. With a `sequence` filter, entering a leaf
    /// that does not carry that sequence stops the walk.
    pub fn walk_down(&self, start: NodeId, text: &[u8], sequence: Option<SequenceId>) -> Option<Position> {
        if text.is_empty() {
            return None;
        }

        let mut at = self.position_at(start);
        for &byte in text {
            let node = &self.nodes[at.node];
            at = if at.offset < node.edge.len {
                if self.edge_byte(at.node, at.offset) != byte {
                    return None;
                }
                Position {
                    node:   at.node,
                    offset: at.offset + 1,
                }
            } else {
                let child = node.children.get(byte)?;
                if let Some(sequence) = sequence {
                    let c = &self.nodes[child];
                    if c.kind == NodeKind::Leaf && !c.occurrences.contains_sequence(sequence) {
                        return None;
                    }
                }
                Position { node: child, offset: 1 }
            };
        }
        Some(at)
    }

    /// Descend from `start` along `text`, looking only at the first byte of each edge.
    /// `text` must be spelled by a path starting at `start`.
    pub fn skip_count(&self, start: NodeId, text: &[u8]) -> Position {
        let mut node = start;
        let mut done = 0;
        while done < text.len() {
            let child = self.nodes[node]
                .children
                .get(text[done])
                .unwrap_or_else(|| panic!("skip-count: node {} has no child for byte {:#04x}", node, text[done]));
            let len = self.nodes[child].edge.len;
            let remaining = text.len() - done;
            if remaining < len {
                return Position { node: child, offset: remaining };
            }
            done += len;
            node = child;
        }
        self.position_at(node)
    }

    /// The node one suffix further along: for an internal node its suffix link; for a
    /// terminal, the terminal of the same suffix of `sequence` less its first byte. The
    /// empty suffix is the root.
    ///
    /// A terminal only depends on its path, so `sequence` does not change the result. When
    /// `sequence` does not run through `node`, the returned terminal may not list it.
    pub fn next_suffix(&self, node: NodeId, sequence: SequenceId) -> NodeId {
        let n = &self.nodes[node];
        match n.kind {
            NodeKind::Internal => self.link_of(node),
            NodeKind::Interleaf => match self.link_of(n.parent) {
                ROOT => ROOT,
                target => self.terminal_at(target, sequence),
            },
            NodeKind::Leaf => {
                let label = self.label(node);
                let at = if n.parent == ROOT {
                    if label.len() == 1 {
                        return ROOT;
                    }
                    self.skip_count(ROOT, &label[1..])
                } else {
                    self.skip_count(self.link_of(n.parent), label)
                };
                assert!(
                    self.is_at_node(at),
                    "suffix of leaf {} ends inside the edge of node {}",
                    node,
                    at.node
                );
                match self.nodes[at.node].kind {
                    NodeKind::Leaf => at.node,
                    _ => self.terminal_at(at.node, sequence),
                }
            }
        }
    }

    fn terminal_at(&self, node: NodeId, sequence: SequenceId) -> NodeId {
        self.nodes[node]
            .children
            .interleaf()
            .unwrap_or_else(|| panic!("no suffix of sequence #{} ends at node {}", sequence, node))
    }

    /// The terminal nodes of every suffix of `sequence`, longest first.
    pub fn suffix_chain(&self, sequence: SequenceId) -> SuffixChain<'_> {
        let current = self
            .sequences
            .bytes_of(sequence)
            .and_then(|bytes| self.walk_down(ROOT, bytes, Some(sequence)))
            .map(|at| {
                assert!(self.is_at_node(at), "sequence #{} does not end on a node", sequence);
                match self.nodes[at.node].kind {
                    NodeKind::Leaf => at.node,
                    _ => self.terminal_at(at.node, sequence),
                }
            });

        SuffixChain {
            tree: self,
            sequence,
            current,
            offset: 0,
        }
    }

    /// Every occurrence of `text`, sorted by sequence then offset.
    pub fn query_substring(&self, text: &[u8]) -> Occurrences {
        let mut found = Vec::new();
        if let Some(at) = self.walk_down(ROOT, text, None) {
            let mut stack = vec![at.node];
            while let Some(id) = stack.pop() {
                let node = &self.nodes[id];
                if node.is_terminal() {
                    found.extend_from_slice(node.occurrences.as_slice());
                }
                stack.extend(node.children.iter());
            }
        }
        found.sort_unstable();

        Occurrences {
            inner: found.into_iter(),
        }
    }

    pub fn contains(&self, text: &[u8]) -> bool {
        self.walk_down(ROOT, text, None).is_some()
    }

    /// Whether `text` is a whole suffix of at least one sequence.
    pub fn is_suffix(&self, text: &[u8]) -> bool {
        match self.walk_down(ROOT, text, None) {
            Some(at) if self.is_at_node(at) => {
                let node = &self.nodes[at.node];
                node.kind == NodeKind::Leaf || node.children.interleaf().is_some()
            }
            _ => false,
        }
    }

    /// Every prefix of `text` that is a whole suffix of some sequence, as its length and
    /// the terminal where it ends, shortest first. These are the suffix-prefix overlaps of
    /// `text` with the indexed sequences.
    pub fn suffix_prefix_overlaps(&self, text: &[u8]) -> Vec<(usize, NodeId)> {
        let mut found = Vec::new();
        let mut at = Position::root();
        for (i, &byte) in text.iter().enumerate() {
            let node = &self.nodes[at.node];
            at = if at.offset < node.edge.len {
                if self.edge_byte(at.node, at.offset) != byte {
                    break;
                }
                Position {
                    node:   at.node,
                    offset: at.offset + 1,
                }
            } else {
                match node.children.get(byte) {
                    Some(child) => Position { node: child, offset: 1 },
                    None => break,
                }
            };

            if self.is_at_node(at) {
                let node = &self.nodes[at.node];
                let terminal = match node.kind {
                    NodeKind::Leaf => Some(at.node),
                    _ => node.children.interleaf(),
                };
                if let Some(terminal) = terminal {
                    found.push((i + 1, terminal));
                }
            }
        }
        found
    }
}

pub struct SuffixChain<'a> {
    tree:     &'a SuffixTree,
    sequence: SequenceId,
    current:  Option<NodeId>,
    offset:   usize,
}

impl<'a> Iterator for SuffixChain<'a> {
    /// The start offset of a suffix, and its terminal node.
    type Item = (usize, NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current?;
        let next = self.tree.next_suffix(node, self.sequence);
        self.current = if next == ROOT { None } else { Some(next) };

        let item = (self.offset, node);
        self.offset += 1;
        Some(item)
    }
}

#[derive(Debug, Clone)]
pub struct Occurrences {
    inner: std::vec::IntoIter<Occurrence>,
}

impl Iterator for Occurrences {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Occurrences {}
