use std::collections::BTreeMap;

use serde_derive::Serialize;
use superslice::Ext;

use crate::errors::*;
use crate::sequences::SequenceId;

pub type NodeId = usize;

/// The root always sits at the start of the arena.
pub const ROOT: NodeId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Internal,
    Leaf,
    Interleaf,
}

/// An edge label, as a window into one of the stored sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Edge {
    pub sequence: SequenceId,
    pub start: usize,
    pub len: usize,
}

impl Edge {
    /// End of the window; a node's path string always ends there in `sequence`.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Occurrence {
    pub sequence: SequenceId,
    pub start: usize,
}

impl Occurrence {
    pub fn new(sequence: SequenceId, start: usize) -> Self {
        Occurrence { sequence, start }
    }
}

/// Occurrences sorted by sequence id, then by start offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceList(Vec<Occurrence>);

impl OccurrenceList {
    pub fn new() -> Self {
        OccurrenceList::default()
    }

    pub fn single(occurrence: Occurrence) -> Self {
        OccurrenceList(vec![occurrence])
    }

    pub fn as_slice(&self) -> &[Occurrence] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Occurrence> {
        self.0.iter()
    }

    pub fn contains_sequence(&self, sequence: SequenceId) -> bool {
        let i = self.0.lower_bound_by_key(&sequence, |o| o.sequence);
        self.0.get(i).map_or(false, |o| o.sequence == sequence)
    }

    /// Add `occurrence` unless its sequence is already listed, in which case only the
    /// smallest start is kept. Returns whether a new sequence id entered the list.
    pub fn add_first(&mut self, occurrence: Occurrence) -> Result<bool> {
        let i = self.0.lower_bound_by_key(&occurrence.sequence, |o| o.sequence);
        match self.0.get_mut(i) {
            Some(existing) if existing.sequence == occurrence.sequence => {
                existing.start = existing.start.min(occurrence.start);
                Ok(false)
            }
            _ => {
                self.0.try_reserve(1)?;
                self.0.insert(i, occurrence);
                Ok(true)
            }
        }
    }

    /// First-occurrence merge: one entry per sequence id.
    pub fn merge_first(&mut self, other: &[Occurrence]) -> Result<()> {
        for &o in other {
            self.add_first(o)?;
        }
        Ok(())
    }

    /// All-occurrence merge: every entry of both lists is kept.
    pub fn merge_all(&mut self, other: &[Occurrence]) {
        if other.is_empty() {
            return;
        }

        let mut merged = Vec::with_capacity(self.0.len() + other.len());
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.len() {
            if self.0[i] <= other[j] {
                merged.push(self.0[i]);
                i += 1;
            } else {
                merged.push(other[j]);
                j += 1;
            }
        }
        merged.extend_from_slice(&self.0[i..]);
        merged.extend_from_slice(&other[j..]);
        self.0 = merged;
    }

    /// The distinct sequence ids, in increasing order.
    pub fn sequences(&self) -> impl Iterator<Item = SequenceId> + '_ {
        let mut last = None;
        self.0.iter().filter_map(move |o| {
            if last == Some(o.sequence) {
                None
            } else {
                last = Some(o.sequence);
                Some(o.sequence)
            }
        })
    }

    pub fn distinct_sequences(&self) -> usize {
        self.sequences().count()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Children indexed by the first byte of their edge, plus the slot of the interleaf.
#[derive(Debug, Clone, Default)]
pub struct Children {
    by_byte: BTreeMap<u8, NodeId>,
    interleaf: Option<NodeId>,
}

impl Children {
    pub fn get(&self, byte: u8) -> Option<NodeId> {
        self.by_byte.get(&byte).copied()
    }

    pub fn interleaf(&self) -> Option<NodeId> {
        self.interleaf
    }

    pub fn len(&self) -> usize {
        self.by_byte.len() + self.interleaf.map_or(0, |_| 1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The interleaf first, then the other children by first byte.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.interleaf
            .into_iter()
            .chain(self.by_byte.values().copied())
    }

    pub(crate) fn insert(&mut self, byte: u8, child: NodeId) -> Option<NodeId> {
        self.by_byte.insert(byte, child)
    }

    pub(crate) fn set_interleaf(&mut self, child: NodeId) {
        assert!(
            self.interleaf.is_none(),
            "interleaf slot already taken by node {:?}",
            self.interleaf
        );
        self.interleaf = Some(child);
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id:            NodeId,
    pub(crate) kind:          NodeKind,
    pub(crate) edge:          Edge,
    pub(crate) depth:         usize,
    pub(crate) parent:        NodeId,
    pub(crate) suffix_link:   Option<NodeId>,
    pub(crate) children:      Children,
    pub(crate) occurrences:   OccurrenceList,
    pub(crate) stringid_num:  usize,
    pub(crate) embedding_num: usize,
}

impl Node {
    pub(crate) fn root() -> Self {
        Node {
            id:            ROOT,
            kind:          NodeKind::Internal,
            edge:          Edge::default(),
            depth:         0,
            parent:        ROOT,
            suffix_link:   Some(ROOT),
            children:      Children::default(),
            occurrences:   OccurrenceList::new(),
            stringid_num:  0,
            embedding_num: 0,
        }
    }

    pub(crate) fn new(
        kind: NodeKind,
        edge: Edge,
        depth: usize,
        parent: NodeId,
        occurrences: OccurrenceList,
    ) -> Self {
        let mut node = Node {
            id: ROOT,
            kind,
            edge,
            depth,
            parent,
            suffix_link: None,
            children: Children::default(),
            occurrences,
            stringid_num: 0,
            embedding_num: 0,
        };
        node.refresh_counts();
        node
    }

    pub(crate) fn refresh_counts(&mut self) {
        self.stringid_num = self.occurrences.distinct_sequences();
        self.embedding_num = self.occurrences.len();
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_terminal(&self) -> bool {
        self.kind != NodeKind::Internal
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    /// Length of the path string from the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<NodeId> {
        if self.id == ROOT {
            None
        } else {
            Some(self.parent)
        }
    }

    pub fn suffix_link(&self) -> Option<NodeId> {
        self.suffix_link
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    pub fn occurrences(&self) -> &OccurrenceList {
        &self.occurrences
    }

    pub fn stringid_num(&self) -> usize {
        self.stringid_num
    }

    pub fn embedding_num(&self) -> usize {
        self.embedding_num
    }
}
