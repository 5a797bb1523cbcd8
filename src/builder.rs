use log::{debug, warn};

use crate::errors::*;
use crate::navigation::Position;
use crate::node::*;
use crate::sequences::SequenceId;
use crate::tree::{Draft, SuffixTree};

/// What lies after the active point for the next symbol of a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    /// The symbol is already on the path; the active point moves past it.
    Continue(Position),
    /// The suffix already ends at this terminal, on behalf of other sequences.
    WrongOwner(NodeId),
    Missing,
}

impl SuffixTree {
    /// Add every suffix of `bytes` to the tree and return the id given to the sequence.
    ///
    /// Construction is online: phase `i` makes every suffix of `bytes[..i]` explicit or
    /// implicit in the tree, the last phase closing each suffix with a terminal node.
    ///
    /// Growth of the arena, the sequence store and the occurrence lists is fallible and
    /// surfaces as `Error::Allocation`, after which the tree is in an unspecified state.
    /// Child maps are `BTreeMap`s and abort the process when they cannot allocate.
    pub fn insert_sequence(&mut self, bytes: &[u8]) -> Result<SequenceId> {
        let sequence = self.sequences.append(bytes)?;
        let n = bytes.len();
        if n == 0 {
            warn!("Sequence #{} is empty, nothing to index", sequence);
            return Ok(sequence);
        }
        let before = self.nodes.len();

        let mut active = Position::root();
        let mut lastindex = 0;
        for i in 0..=n {
            let symbol = if i < n { Some(bytes[i]) } else { None };
            let mut pending: Option<NodeId> = None;

            while lastindex <= i {
                if lastindex == n {
                    // Only the empty suffix is left, and it is not indexed
                    if let Some(source) = pending.take() {
                        self.set_suffix_link(source, active.node);
                    }
                    break;
                }
                let j = lastindex;

                let located = match self.probe(active, symbol) {
                    Probe::Continue(next) => {
                        if let Some(source) = pending.take() {
                            self.set_suffix_link(source, active.node);
                        }
                        active = next;
                        break;
                    }
                    Probe::WrongOwner(terminal) => {
                        debug_assert!(!self.nodes[terminal].occurrences.contains_sequence(sequence));
                        if let Some(source) = pending.take() {
                            self.set_suffix_link(source, active.node);
                        }
                        self.absorb(terminal, Occurrence::new(sequence, j))?;
                        active.node
                    }
                    Probe::Missing => {
                        let at = if self.is_at_node(active) && self.nodes[active.node].kind == NodeKind::Internal {
                            if let Some(source) = pending.take() {
                                self.set_suffix_link(source, active.node);
                            }
                            active.node
                        } else {
                            let middle = self.split_edge(active.node, active.offset)?;
                            if let Some(source) = pending.replace(middle) {
                                self.set_suffix_link(source, middle);
                            }
                            middle
                        };

                        let occurrence = Occurrence::new(sequence, j);
                        let draft = match symbol {
                            Some(_) => Draft::Leaf {
                                edge: Edge { sequence, start: i, len: n - i },
                                occurrence,
                            },
                            None => Draft::Interleaf {
                                end: Edge { sequence, start: n, len: 0 },
                                occurrence,
                            },
                        };
                        self.insert_child(at, draft)?;
                        at
                    }
                };

                lastindex = j + 1;
                active = self.shorter_suffix(located);
            }

            assert!(
                pending.is_none(),
                "suffix link of node {:?} unresolved at the end of phase {} of sequence #{}",
                pending,
                i,
                sequence
            );
        }

        debug!(
            "Sequence #{} ({} bytes) indexed, {} new nodes",
            sequence,
            n,
            self.nodes.len() - before
        );
        Ok(sequence)
    }

    fn probe(&self, at: Position, symbol: Option<u8>) -> Probe {
        let node = &self.nodes[at.node];
        if at.offset < node.edge.len {
            return match symbol {
                Some(byte) if self.edge_byte(at.node, at.offset) == byte => Probe::Continue(Position {
                    node:   at.node,
                    offset: at.offset + 1,
                }),
                _ => Probe::Missing,
            };
        }

        match (node.kind, symbol) {
            (NodeKind::Leaf, None) => Probe::WrongOwner(at.node),
            (NodeKind::Leaf, Some(_)) => Probe::Missing,
            (_, None) => node.children.interleaf().map_or(Probe::Missing, Probe::WrongOwner),
            (_, Some(byte)) => match node.children.get(byte) {
                Some(child) => Probe::Continue(Position { node: child, offset: 1 }),
                None => Probe::Missing,
            },
        }
    }

    /// Position of the path of `node` stripped of its first byte.
    fn shorter_suffix(&self, node: NodeId) -> Position {
        if node == ROOT {
            return Position::root();
        }
        let n = &self.nodes[node];
        if let (NodeKind::Internal, Some(link)) = (n.kind, n.suffix_link) {
            return self.position_at(link);
        }

        let label = self.label(node);
        if n.parent == ROOT {
            self.skip_count(ROOT, &label[1..])
        } else {
            self.skip_count(self.link_of(n.parent), label)
        }
    }

    fn set_suffix_link(&mut self, source: NodeId, target: NodeId) {
        debug_assert_eq!(self.nodes[target].kind, NodeKind::Internal);
        debug_assert_eq!(self.nodes[source].depth, self.nodes[target].depth + 1);
        self.nodes[source].suffix_link = Some(target);
    }

    pub(crate) fn link_of(&self, node: NodeId) -> NodeId {
        self.nodes[node]
            .suffix_link
            .unwrap_or_else(|| panic!("node {} has no suffix link", node))
    }
}
