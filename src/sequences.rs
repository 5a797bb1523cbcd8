use crate::errors::*;

/// Sequences are numbered from 1 in insertion order.
pub type SequenceId = u32;

/// Append-only storage for the raw sequences indexed by a tree. Edge labels only ever
/// reference these buffers, they never copy them.
#[derive(Debug, Clone, Default)]
pub struct SequenceStore {
    sequences: Vec<Vec<u8>>,
}

impl SequenceStore {
    pub fn new() -> Self {
        SequenceStore::default()
    }

    /// Store a copy of `bytes` and return its id.
    pub fn append(&mut self, bytes: &[u8]) -> Result<SequenceId> {
        let mut owned = Vec::new();
        owned.try_reserve_exact(bytes.len())?;
        owned.extend_from_slice(bytes);

        self.sequences.try_reserve(1)?;
        self.sequences.push(owned);
        Ok(self.sequences.len() as SequenceId)
    }

    pub fn bytes_of(&self, id: SequenceId) -> Option<&[u8]> {
        if id == 0 {
            return None;
        }
        self.sequences.get(id as usize - 1).map(Vec::as_slice)
    }

    /// Like `bytes_of`, for ids the tree itself handed out.
    pub(crate) fn slice(&self, id: SequenceId) -> &[u8] {
        self.bytes_of(id)
            .unwrap_or_else(|| panic!("sequence #{} is not in the store", id))
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SequenceId, &[u8])> {
        self.sequences
            .iter()
            .enumerate()
            .map(|(i, s)| ((i + 1) as SequenceId, s.as_slice()))
    }
}
